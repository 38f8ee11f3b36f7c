/// Gemini image-edit client
///
/// Wraps a single `generateContent` call against the Gemini image model:
/// the request carries the prompt text and the original image as inline
/// data, the response carries an ordered list of content parts of which
/// the first image-bearing part is taken as the result.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::EncodedImage;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Media type assumed when a returned image part does not declare one
const FALLBACK_MEDIA_TYPE: &str = "image/png";

/// Provider access configuration, resolved once at process start and
/// passed into the client explicitly.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
}

impl ProviderConfig {
    /// Read `GEMINI_API_KEY` (and an optional `GEMINI_MODEL` override)
    /// from the environment.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Ways an edit request can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport, auth, server, or malformed-response failure
    #[error("image service request failed: {0}")]
    Request(String),
    /// The provider answered but no part carried image data: a refusal,
    /// not a crash, and worded accordingly for the user
    #[error("the model processed the request but did not return an image. It may have declined the prompt; try rewording it.")]
    NoImageProduced,
}

// ---- Wire format -------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    #[allow(dead_code)]
    text: Option<String>,
    // The REST API emits camelCase; the alias tolerates snake_case bodies
    #[serde(rename = "inlineData", alias = "inline_data", default)]
    inline_data: Option<InlineData>,
}

// ---- Client ------------------------------------------------------------

/// Client for the Gemini image-edit endpoint.
///
/// Cheap to clone (the underlying HTTP client is reference-counted), so
/// background tasks can own a handle for the duration of a call.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl GeminiClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Submit one edit request and wait for the provider's answer.
    ///
    /// `prompt` must already be validated non-blank by the caller. The
    /// first response part carrying inline image data becomes the result;
    /// later parts, including any further images, are ignored. A part
    /// without a declared media type is treated as PNG.
    pub async fn request_edit(
        &self,
        original: &EncodedImage,
        prompt: &str,
    ) -> Result<EncodedImage, ProviderError> {
        let url = format!("{API_BASE}/{}:generateContent", self.config.model);

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: Some(prompt.to_owned()),
                        inline_data: None,
                    },
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: Some(original.media_type().to_owned()),
                            data: BASE64.encode(original.payload()),
                        }),
                    },
                ],
            }],
        };

        println!("🛰  Requesting edit from {} ...", self.config.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Request(format!("HTTP {status}: {text}")));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(format!("unreadable response: {e}")))?;

        let image = decode_image(first_image_part(payload)?)?;
        println!("✅ Edit complete: {} ({}x{})", image.media_type(), image.width(), image.height());
        Ok(image)
    }
}

/// First-match policy: scan the parts in provider order and take the first
/// one carrying inline image data. This is deliberately not a quality
/// ranking.
fn first_image_part(response: GenerateResponse) -> Result<InlineData, ProviderError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find(|inline| !inline.data.is_empty())
        .ok_or(ProviderError::NoImageProduced)
}

/// Turn a returned inline part into a validated `EncodedImage`
fn decode_image(inline: InlineData) -> Result<EncodedImage, ProviderError> {
    let media_type = inline
        .mime_type
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());

    let bytes = BASE64
        .decode(inline.data.as_bytes())
        .map_err(|e| ProviderError::Request(format!("unreadable image payload: {e}")))?;

    EncodedImage::new(media_type, bytes)
        .map_err(|e| ProviderError::Request(format!("invalid image payload: {e}")))
}
