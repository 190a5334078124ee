//! LLM provider implementations.
//!
//! `build(kind, config, api_key)` is the factory, called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::config::{GEMINI_API_KEY_ENV, OPENAI_API_KEY_ENV};
use crate::llm::{LlmProvider, ModelRates, ProviderError};

/// Construct an `LlmProvider` of the given kind.
///
/// `kind` is `"gemini"` or `"openai"`; both require `api_key`. The dummy
/// provider is wired directly through [`LlmProvider::Dummy`].
pub fn build(kind: &str, config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match kind {
        "gemini" => {
            let key = api_key.ok_or_else(|| ProviderError::MissingApiKey(GEMINI_API_KEY_ENV.into()))?;
            let g = &config.gemini;
            let p = gemini::GeminiProvider::new(
                g.api_base_url.clone(),
                g.model.clone(),
                g.max_output_tokens,
                g.timeout_seconds,
                ModelRates {
                    input_per_1k_chars_usd: g.input_per_1k_chars_usd,
                    output_per_1k_chars_usd: g.output_per_1k_chars_usd,
                },
                key,
            )?;
            Ok(LlmProvider::Gemini(p))
        }
        "openai" => {
            let key = api_key.ok_or_else(|| ProviderError::MissingApiKey(OPENAI_API_KEY_ENV.into()))?;
            let o = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                o.api_base_url.clone(),
                o.model.clone(),
                o.max_output_tokens,
                o.timeout_seconds,
                ModelRates {
                    input_per_1k_chars_usd: o.input_per_1k_chars_usd,
                    output_per_1k_chars_usd: o.output_per_1k_chars_usd,
                },
                Some(key),
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
