//! Gemini `generateContent` provider.
//!
//! Talks to the Generative Language REST API:
//! `POST {api_base_url}/models/{model}:generateContent` with the key in the
//! `x-goog-api-key` header. Wire types are private to this module.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::llm::{CompletionRequest, LlmResponse, LlmUsage, ModelRates, ProviderError};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
    max_output_tokens: u32,
    rates: ModelRates,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        max_output_tokens: u32,
        timeout_seconds: u64,
        rates: ModelRates,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, max_output_tokens, rates, api_key })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn rates(&self) -> ModelRates {
        self.rates
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model)
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, ProviderError> {
        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(request.prompt.clone()) }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens.unwrap_or(self.max_output_tokens),
            },
        };

        let url = self.endpoint();
        debug!(
            model = %self.model,
            temperature = request.temperature,
            prompt_len = request.prompt.len(),
            "calling Gemini"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full Gemini request payload");
        }

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, timeout = e.is_timeout(), "Gemini HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize Gemini response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        let text = parsed.text();
        debug!(
            candidates = parsed.candidates.len(),
            text_len = text.len(),
            "Gemini response received"
        );

        if text.trim().is_empty() {
            if let Some(reason) = parsed.block_reason() {
                warn!(%reason, "Gemini blocked the prompt");
                return Err(ProviderError::Request(format!("prompt blocked: {reason}")));
            }
            return Err(ProviderError::EmptyResponse);
        }

        let usage = parsed.usage_metadata.map(|u| LlmUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(LlmResponse { text, usage })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

// Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => {
            let tag = env.error.status.map(|s| format!(" [{s}]")).unwrap_or_default();
            format!("HTTP {status}{tag}: {}", env.error.message)
        }
        Err(_) => format!("HTTP {status}: {body}"),
    };

    error!(%status, %message, "Gemini request returned HTTP error");
    Err(ProviderError::Request(message))
}
