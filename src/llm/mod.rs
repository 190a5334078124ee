//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! The `complete` method is `async fn` on the enum so callers need no
//! trait-object machinery.

pub mod providers;

use serde::Serialize;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0} not configured")]
    MissingApiKey(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider returned no text")]
    EmptyResponse,
    #[error("No AI service available")]
    Unavailable,
}

// ── Request / response ────────────────────────────────────────────────────────

/// One single-turn completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    /// `None` falls back to the provider's configured limit.
    pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self { prompt: prompt.into(), temperature, max_output_tokens: None }
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// Token usage as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LlmUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl LlmUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Estimated cost. Rates are per 1K characters; one token is taken as
    /// four characters.
    pub fn cost_usd(&self, rates: &ModelRates) -> f64 {
        let input_chars = self.input_tokens as f64 * CHARS_PER_TOKEN;
        let output_chars = self.output_tokens as f64 * CHARS_PER_TOKEN;
        input_chars / 1000.0 * rates.input_per_1k_chars_usd
            + output_chars / 1000.0 * rates.output_per_1k_chars_usd
    }
}

const CHARS_PER_TOKEN: f64 = 4.0;

/// Character-based pricing for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelRates {
    pub input_per_1k_chars_usd: f64,
    pub output_per_1k_chars_usd: f64,
}

/// Text reply plus optional usage.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<LlmUsage>,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Gemini(providers::gemini::GeminiProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// Send one prompt and return the reply text.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, ProviderError> {
        match self {
            LlmProvider::Gemini(p) => p.complete(request).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(request).await,
            LlmProvider::Dummy(p) => p.complete(request).await,
        }
    }

    /// Model name reported back to API callers.
    pub fn model_name(&self) -> &str {
        match self {
            LlmProvider::Gemini(p) => p.model(),
            LlmProvider::OpenAiCompatible(p) => p.model(),
            LlmProvider::Dummy(p) => p.model(),
        }
    }

    /// Pricing used to estimate request cost.
    pub fn rates(&self) -> ModelRates {
        match self {
            LlmProvider::Gemini(p) => p.rates(),
            LlmProvider::OpenAiCompatible(p) => p.rates(),
            LlmProvider::Dummy(_) => ModelRates::default(),
        }
    }
}
