use std::sync::OnceLock;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::{LlmClient, VisionClient};
use super::StructuringError;
use crate::config::AppConfig;

/// Sampling settings for report OCR: near-deterministic transcription.
const OCR_TEMPERATURE: f32 = 0.1;
const OCR_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Sampling settings for the clinical analysis reply.
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 16384;

/// Google Generative Language `generateContent` client.
///
/// The underlying blocking HTTP client is built on first use so that
/// construction is safe inside the async runtime; requests themselves must
/// run on a blocking thread.
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    client: OnceLock<reqwest::blocking::Client>,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            timeout_secs,
            client: OnceLock::new(),
        }
    }

    /// Client for the OCR stage, using the OCR timeout.
    pub fn for_ocr(config: &AppConfig) -> Self {
        Self::new(
            &config.gemini_base_url,
            config.gemini_api_key.clone(),
            &config.gemini_model,
            config.ocr_timeout_secs,
        )
    }

    /// Client for the reasoning stage, using the analysis timeout.
    pub fn for_analysis(config: &AppConfig) -> Self {
        Self::new(
            &config.gemini_base_url,
            config.gemini_api_key.clone(),
            &config.gemini_model,
            config.analysis_timeout_secs,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn http(&self) -> Result<&reqwest::blocking::Client, StructuringError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;
        Ok(self.client.get_or_init(|| built))
    }

    fn send(&self, body: &GenerateContentRequest<'_>) -> Result<String, StructuringError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(StructuringError::MissingApiKey)?;

        let response = self
            .http()?
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    StructuringError::ProviderConnection(self.base_url.clone())
                } else if e.is_timeout() {
                    StructuringError::Timeout(self.timeout_secs)
                } else {
                    StructuringError::HttpClient(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.without_url().to_string()))?;

        extract_candidate_text(parsed)
    }
}

impl LlmClient for GeminiClient {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, StructuringError> {
        let _span = tracing::info_span!(
            "gemini_generate",
            model = %self.model,
            prompt_len = prompt.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt }],
            }],
            system_instruction: Some(Content {
                parts: vec![Part::Text { text: system }],
            }),
            generation_config: GenerationConfig {
                temperature: ANALYSIS_TEMPERATURE,
                max_output_tokens: ANALYSIS_MAX_OUTPUT_TOKENS,
                response_mime_type: Some("application/json"),
            },
        };

        let text = self.send(&body)?;
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            reply_len = text.len(),
            "Analysis reply received"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl VisionClient for GeminiClient {
    fn extract(&self, image: &[u8], mime: &str, prompt: &str) -> Result<String, StructuringError> {
        let _span = tracing::info_span!(
            "gemini_vision",
            model = %self.model,
            image_size = image.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let data = base64::engine::general_purpose::STANDARD.encode(image);
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime,
                            data,
                        },
                    },
                ],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: OCR_TEMPERATURE,
                max_output_tokens: OCR_MAX_OUTPUT_TOKENS,
                response_mime_type: None,
            },
        };

        let text = self.send(&body)?;
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            reply_len = text.len(),
            "OCR reply received"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ProviderErrorBody>,
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
    text: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Concatenate the text parts of the first candidate.
fn extract_candidate_text(response: GenerateContentResponse) -> Result<String, StructuringError> {
    if let Some(err) = response.error {
        return Err(StructuringError::ProviderError {
            status: err.code,
            body: err.message,
        });
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(StructuringError::EmptyResponse);
    }
    Ok(text)
}

// ──────────────────────────────────────────────
// Mock
// ──────────────────────────────────────────────

/// Mock model client for testing. Returns a configurable reply or failure.
pub struct MockLlmClient {
    response: Result<String, StructuringError>,
    model: String,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            model: "mock-model".to_string(),
        }
    }

    /// A client whose every call fails with `error`.
    pub fn failing(error: StructuringError) -> Self {
        Self {
            response: Err(error),
            model: "mock-model".to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _system: &str, _prompt: &str) -> Result<String, StructuringError> {
        self.response.clone()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

impl VisionClient for MockLlmClient {
    fn extract(
        &self,
        _image: &[u8],
        _mime: &str,
        _prompt: &str,
    ) -> Result<String, StructuringError> {
        self.response.clone()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
