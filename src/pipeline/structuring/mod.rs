pub mod types;
pub mod prompt;
pub mod sanitize;
pub mod gemini;

pub use types::*;
pub use prompt::*;
pub use sanitize::*;
pub use gemini::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuringError {
    #[error("Model provider is not reachable at {0}")]
    ProviderConnection(String),

    #[error("Model provider returned error (status {status}): {body}")]
    ProviderError { status: u16, body: String },

    #[error("No model provider API key configured")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model returned no text content")]
    EmptyResponse,
}
