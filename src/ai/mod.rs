//! AI service: provider routing and the per-step generation calls.
//!
//! [`AiService`] owns at most one Gemini and one OpenAI provider. Every
//! public generation method returns a [`GenerationResponse`] rather than a
//! `Result`; provider failures become `success = false` with `error` set so
//! the pipeline can decide whether to fall back.

pub mod content;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod schema;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm::{providers, CompletionRequest, LlmProvider, ProviderError};

use schema::{BusinessAnalysis, DesignSpecs};

const DEFAULT_TEMPERATURE: f32 = 0.7;
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const DESIGN_TEMPERATURE: f32 = 0.4;
const CODE_TEMPERATURE: f32 = 0.7;

// ── Request / response types ──────────────────────────────────────────────────

/// Model family a request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ModelChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelChoice::Gemini => "gemini",
            ModelChoice::Gemini25Flash => "gemini-2.5-flash",
            ModelChoice::OpenAi => "openai",
        }
    }

    pub fn is_gemini(self) -> bool {
        matches!(self, ModelChoice::Gemini | ModelChoice::Gemini25Flash)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gemini" => Some(ModelChoice::Gemini),
            "gemini-2.5-flash" => Some(ModelChoice::Gemini25Flash),
            "openai" => Some(ModelChoice::OpenAi),
            _ => None,
        }
    }
}

/// Optional hints folded into the enhanced prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationContext {
    pub business_type: Option<String>,
    pub target_audience: Option<String>,
    pub color_scheme: Option<String>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub context: GenerationContext,
    pub model: ModelChoice,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: GenerationContext::default(),
            model: ModelChoice::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn model(mut self, model: ModelChoice) -> Self {
        self.model = model;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn context(mut self, context: GenerationContext) -> Self {
        self.context = context;
        self
    }
}

/// Outcome of one generation call, success or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    pub content: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Provider reply with accounting, before it is shaped into a response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCompletion {
    pub text: String,
    pub model: String,
    pub tokens_used: u64,
    pub cost: f64,
}

impl GenerationResponse {
    pub fn failure(model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            model: model.into(),
            tokens_used: None,
            cost: None,
            error: Some(error.into()),
        }
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// Routes generation requests to the configured providers.
///
/// Cheap to clone: providers share their HTTP clients.
#[derive(Debug, Clone)]
pub struct AiService {
    gemini: Option<LlmProvider>,
    openai: Option<LlmProvider>,
    step_model: ModelChoice,
}

impl Default for AiService {
    fn default() -> Self {
        Self::with_providers(None, None)
    }
}

impl AiService {
    /// Gemini is enabled when `GOOGLE_AI_API_KEY` is set, the OpenAI fallback
    /// when `OPENAI_API_KEY` is set.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let gemini = config
            .gemini_api_key
            .clone()
            .map(|key| providers::build("gemini", &config.llm, Some(key)))
            .transpose()?;
        let openai = config
            .openai_api_key
            .clone()
            .map(|key| providers::build("openai", &config.llm, Some(key)))
            .transpose()?;

        info!(
            gemini = gemini.is_some(),
            openai = openai.is_some(),
            "AI service initialised"
        );
        Ok(Self::with_providers(gemini, openai))
    }

    /// Wire providers directly (tests, embedding).
    pub fn with_providers(gemini: Option<LlmProvider>, openai: Option<LlmProvider>) -> Self {
        Self { gemini, openai, step_model: ModelChoice::Gemini25Flash }
    }

    /// Model family used by the pipeline steps. Defaults to `gemini-2.5-flash`.
    pub fn with_step_model(mut self, model: ModelChoice) -> Self {
        self.step_model = model;
        self
    }

    pub fn step_model(&self) -> ModelChoice {
        self.step_model
    }

    pub fn is_available(&self) -> bool {
        self.gemini.is_some() || self.openai.is_some()
    }

    /// Model families that can currently be served.
    pub fn available_models(&self) -> Vec<&'static str> {
        let mut models = Vec::new();
        if self.gemini.is_some() {
            models.push(ModelChoice::Gemini.as_str());
        }
        if self.openai.is_some() {
            models.push(ModelChoice::OpenAi.as_str());
        }
        models
    }

    /// Gemini-family requests go to Gemini when it is configured; everything
    /// else, and Gemini requests without a Gemini key, goes to OpenAI.
    fn route(&self, model: ModelChoice) -> Option<&LlmProvider> {
        match (&self.gemini, &self.openai) {
            (Some(g), _) if model.is_gemini() => Some(g),
            (_, Some(o)) => Some(o),
            _ => None,
        }
    }

    /// Send `prompt` as-is to the provider serving `model`.
    async fn complete_with(
        &self,
        model: ModelChoice,
        completion: CompletionRequest,
    ) -> Result<RawCompletion, ProviderError> {
        let Some(provider) = self.route(model) else {
            warn!(model = model.as_str(), "no provider configured for request");
            return Err(ProviderError::Unavailable);
        };
        let resp = provider.complete(&completion).await.inspect_err(|e| {
            warn!(model = provider.model_name(), error = %e, "generation failed");
        })?;
        let rates = provider.rates();
        debug!(text_len = resp.text.len(), model = provider.model_name(), "generation succeeded");
        Ok(RawCompletion {
            text: resp.text,
            model: provider.model_name().to_string(),
            tokens_used: resp.usage.map(|u| u.total_tokens()).unwrap_or(0),
            cost: resp.usage.map(|u| u.cost_usd(&rates)).unwrap_or(0.0),
        })
    }

    /// Wrap the prompt with [`prompt::build_enhanced_prompt`] and send it.
    pub async fn generate_code(&self, request: GenerationRequest) -> GenerationResponse {
        let enhanced = prompt::build_enhanced_prompt(&request.prompt, &request.context);
        debug!(enhanced_len = enhanced.len(), "enhanced prompt built");

        let mut completion = CompletionRequest::new(enhanced, request.temperature);
        completion.max_output_tokens = request.max_tokens;
        self.respond(request.model, completion).await
    }

    async fn respond(&self, model: ModelChoice, completion: CompletionRequest) -> GenerationResponse {
        let model_name = self
            .route(model)
            .map(|p| p.model_name().to_string())
            .unwrap_or_else(|| model.as_str().to_string());

        match self.complete_with(model, completion).await {
            Ok(raw) => GenerationResponse {
                success: true,
                content: raw.text,
                model: raw.model,
                tokens_used: Some(raw.tokens_used),
                cost: Some(raw.cost),
                error: None,
            },
            Err(e) => GenerationResponse::failure(model_name, e.to_string()),
        }
    }

    /// Pipeline step prompts are complete on their own and go out unwrapped.
    async fn generate_step(&self, prompt: String, temperature: f32) -> GenerationResponse {
        self.respond(self.step_model, CompletionRequest::new(prompt, temperature))
            .await
    }

    /// Step 1: structured business analysis of a free-text description.
    pub async fn generate_business_analysis(&self, description: &str) -> GenerationResponse {
        self.generate_step(prompt::business_analysis_prompt(description), ANALYSIS_TEMPERATURE)
            .await
    }

    /// Step 2: design specification derived from the analysis.
    pub async fn generate_design_specs(&self, analysis: &BusinessAnalysis) -> GenerationResponse {
        self.generate_step(prompt::design_specs_prompt(analysis), DESIGN_TEMPERATURE)
            .await
    }

    /// Step 3: the website itself.
    pub async fn generate_website_code(
        &self,
        analysis: &BusinessAnalysis,
        design: &DesignSpecs,
    ) -> GenerationResponse {
        self.generate_step(prompt::website_code_prompt(analysis, design), CODE_TEMPERATURE)
            .await
    }

    /// Single-shot generation used when the chain is skipped or has failed.
    pub async fn generate_direct_website(&self, description: &str) -> GenerationResponse {
        self.generate_step(prompt::direct_website_prompt(description), CODE_TEMPERATURE)
            .await
    }

    /// Raw completion without the enhanced-prompt wrapper. Used by prompt
    /// chains whose templates are complete prompts already.
    pub async fn complete_raw(
        &self,
        model: ModelChoice,
        prompt: String,
        temperature: f32,
    ) -> Result<RawCompletion, ProviderError> {
        self.complete_with(model, CompletionRequest::new(prompt, temperature)).await
    }
}
