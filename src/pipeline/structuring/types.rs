use super::StructuringError;

/// Abstraction over the reasoning model (allows mocking in tests).
///
/// Implementations are blocking; async callers run them on
/// `tokio::task::spawn_blocking`.
pub trait LlmClient: Send + Sync {
    /// Generate a completion for `prompt` under the `system` instruction.
    fn generate(&self, system: &str, prompt: &str) -> Result<String, StructuringError>;

    /// Model identifier recorded in the decision response.
    fn model_name(&self) -> &str;
}

/// Abstraction over the vision model used for report OCR.
pub trait VisionClient: Send + Sync {
    /// Send one image with an instruction prompt, returning the reply text.
    fn extract(&self, image: &[u8], mime: &str, prompt: &str) -> Result<String, StructuringError>;

    fn model_name(&self) -> &str;
}
