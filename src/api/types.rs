//! Shared types for the API layer.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::pipeline::correction::CorrectionConfig;
use crate::pipeline::structuring::{GeminiClient, LlmClient, VisionClient};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// Immutable after construction: configuration plus stateless model
/// clients. Nothing here changes between requests.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub corrections: Arc<CorrectionConfig>,
    pub vision: Arc<dyn VisionClient>,
    pub reasoning: Arc<dyn LlmClient>,
}

impl ApiContext {
    /// Context backed by the Gemini provider.
    pub fn new(config: AppConfig) -> Self {
        let vision: Arc<dyn VisionClient> = Arc::new(GeminiClient::for_ocr(&config));
        let reasoning: Arc<dyn LlmClient> = Arc::new(GeminiClient::for_analysis(&config));
        Self::with_clients(config, vision, reasoning)
    }

    /// Context with injected model clients (tests use mocks).
    pub fn with_clients(
        config: AppConfig,
        vision: Arc<dyn VisionClient>,
        reasoning: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            corrections: Arc::new(CorrectionConfig::from_app(&config)),
            config: Arc::new(config),
            vision,
            reasoning,
        }
    }
}
