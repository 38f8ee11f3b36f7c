/// Generative-image provider integration
///
/// One outbound call: hand the provider an encoded image plus a prompt,
/// get a newly encoded image back (or a typed failure). No retries, no
/// cancellation; those are caller concerns.

pub mod gemini;

pub use gemini::{GeminiClient, ProviderConfig, ProviderError};
