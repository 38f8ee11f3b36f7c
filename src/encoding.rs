/// Self-describing encoded images
///
/// An `EncodedImage` pairs raw image bytes with their declared media type.
/// The data-URL string form (`data:<media type>;base64,<payload>`) is the
/// only interchange format between the UI, the session state machine and
/// the provider adapter.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, ImageReader};
use thiserror::Error;

/// Errors produced while constructing or parsing an encoded image
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// The string is not of the form `data:<media type>;base64,<payload>`
    #[error("invalid image: expected a data:<media type>;base64,<payload> string")]
    MalformedDataUrl,
    /// The payload segment is not valid standard base64
    #[error("invalid image: payload is not valid base64 ({0})")]
    InvalidBase64(String),
    /// The declared media type is not an image type
    #[error("invalid image: unsupported media type '{0}'")]
    UnsupportedMediaType(String),
    /// The bytes do not form a valid image for the declared media type
    #[error("invalid image: payload does not decode as '{0}'")]
    MalformedPayload(String),
}

/// An immutable image payload together with its declared media type.
///
/// Construction validates that the payload sniffs as a known raster format
/// and that its header yields pixel dimensions, so a value of this type can
/// always be handed to the renderer or the provider as-is.
#[derive(Clone, PartialEq)]
pub struct EncodedImage {
    media_type: String,
    payload: Vec<u8>,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// Validate raw bytes against a declared media type.
    ///
    /// Fails if the media type is not `image/*`, if the bytes do not sniff
    /// as a known raster format, if the sniffed format contradicts a
    /// declared type the `image` crate knows, or if the header cannot be
    /// read for dimensions.
    pub fn new(media_type: impl Into<String>, payload: Vec<u8>) -> Result<Self, EncodingError> {
        let media_type = media_type.into();

        if !media_type.starts_with("image/") {
            return Err(EncodingError::UnsupportedMediaType(media_type));
        }

        let format = image::guess_format(&payload)
            .map_err(|_| EncodingError::MalformedPayload(media_type.clone()))?;

        // Only judge a mismatch when the declared type names a format the
        // image crate can identify (e.g. "image/png" declared, JPEG bytes).
        if let Some(declared) = ImageFormat::from_mime_type(&media_type) {
            if declared != format {
                return Err(EncodingError::MalformedPayload(media_type));
            }
        }

        let (width, height) = ImageReader::with_format(Cursor::new(&payload), format)
            .into_dimensions()
            .map_err(|_| EncodingError::MalformedPayload(media_type.clone()))?;

        Ok(Self {
            media_type,
            payload,
            width,
            height,
        })
    }

    /// Parse a `data:<media type>;base64,<payload>` string.
    ///
    /// Both segments are required and non-empty; anything else is rejected
    /// as malformed before the payload is even decoded.
    pub fn parse(data_url: &str) -> Result<Self, EncodingError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or(EncodingError::MalformedDataUrl)?;

        let (media_type, encoded) = rest
            .split_once(";base64,")
            .ok_or(EncodingError::MalformedDataUrl)?;

        if media_type.is_empty() || encoded.is_empty() {
            return Err(EncodingError::MalformedDataUrl);
        }

        let payload = BASE64
            .decode(encoded)
            .map_err(|e| EncodingError::InvalidBase64(e.to_string()))?;

        Self::new(media_type, payload)
    }

    /// Render back to the data-URL string form.
    ///
    /// Always succeeds for a validly constructed image, and round-trips:
    /// `parse(&x.serialize()) == Ok(x)`.
    pub fn serialize(&self) -> String {
        format!("data:{};base64,{}", self.media_type, BASE64.encode(&self.payload))
    }

    /// The declared media type (e.g. "image/png")
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The raw image bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Pixel width read from the image header
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height read from the image header
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Preferred file extension for exports, derived from the media type
    pub fn file_extension(&self) -> &'static str {
        ImageFormat::from_mime_type(&self.media_type)
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("media_type", &self.media_type)
            .field("bytes", &self.payload.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Shared test fixture: the smallest valid PNG (1x1 transparent pixel)
#[cfg(test)]
pub(crate) mod fixtures {
    use super::EncodedImage;

    pub const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89,
        0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, // IDAT
        0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01,
        0x0D, 0x0A, 0x2D, 0xB4,
        0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND
        0xAE, 0x42, 0x60, 0x82,
    ];

    pub fn tiny_png() -> EncodedImage {
        EncodedImage::new("image/png", TINY_PNG.to_vec()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{tiny_png, TINY_PNG};
    use super::*;

    #[test]
    fn test_construction_reads_dimensions() {
        let image = tiny_png();
        assert_eq!(image.media_type(), "image/png");
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(image.payload(), TINY_PNG);
    }

    #[test]
    fn test_round_trip_law() {
        let image = tiny_png();
        let url = image.serialize();
        assert_eq!(EncodedImage::parse(&url).unwrap(), image);
        // And exactly back to the same string
        assert_eq!(EncodedImage::parse(&url).unwrap().serialize(), url);
    }

    #[test]
    fn test_serialize_shape() {
        let url = tiny_png().serialize();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        let err = EncodedImage::parse("image/png;base64,AAAA").unwrap_err();
        assert_eq!(err, EncodingError::MalformedDataUrl);
    }

    #[test]
    fn test_parse_rejects_missing_base64_marker() {
        let err = EncodedImage::parse("data:image/png,AAAA").unwrap_err();
        assert_eq!(err, EncodingError::MalformedDataUrl);
    }

    #[test]
    fn test_parse_rejects_empty_payload() {
        let err = EncodedImage::parse("data:image/png;base64,").unwrap_err();
        assert_eq!(err, EncodingError::MalformedDataUrl);
    }

    #[test]
    fn test_parse_rejects_empty_media_type() {
        let err = EncodedImage::parse("data:;base64,AAAA").unwrap_err();
        assert_eq!(err, EncodingError::MalformedDataUrl);
    }

    #[test]
    fn test_parse_rejects_invalid_base64() {
        let err = EncodedImage::parse("data:image/png;base64,@@not-base64@@").unwrap_err();
        assert!(matches!(err, EncodingError::InvalidBase64(_)));
    }

    #[test]
    fn test_rejects_non_image_media_type() {
        let err = EncodedImage::new("text/plain", TINY_PNG.to_vec()).unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let err = EncodedImage::new("image/png", b"definitely not pixels".to_vec()).unwrap_err();
        assert!(matches!(err, EncodingError::MalformedPayload(_)));
    }

    #[test]
    fn test_rejects_media_type_payload_mismatch() {
        // Declared JPEG, actual PNG bytes
        let err = EncodedImage::new("image/jpeg", TINY_PNG.to_vec()).unwrap_err();
        assert!(matches!(err, EncodingError::MalformedPayload(_)));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(tiny_png().file_extension(), "png");
    }
}
