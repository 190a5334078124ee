//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory (or
//! an explicit `-f` path), then applies `FUSIONSPACE_LOG_LEVEL` and
//! `FUSIONSPACE_BIND` overrides. Provider API keys come from the environment
//! only (`GOOGLE_AI_API_KEY`, `OPENAI_API_KEY`) and are never read from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::ai::ModelChoice;
use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const GEMINI_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Gemini `generateContent` provider configuration (`[llm.gemini]`).
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub api_base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    pub input_per_1k_chars_usd: f64,
    pub output_per_1k_chars_usd: f64,
}

/// OpenAI / OpenAI-compatible provider configuration (`[llm.openai]`).
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
    pub input_per_1k_chars_usd: f64,
    pub output_per_1k_chars_usd: f64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model family used when a request does not name one. Also the family
    /// the CLI `generate` pipeline runs on.
    pub default_model: ModelChoice,
    pub gemini: GeminiConfig,
    pub openai: OpenAiConfig,
}

/// HTTP API configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Upper bound for one `/api/generate` run, covering the whole chain.
    pub request_timeout_seconds: u64,
}

/// Generation quota (`[credits]`).
#[derive(Debug, Clone)]
pub struct CreditsConfig {
    pub daily_limit: u32,
    pub monthly_limit: u32,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub log_level: String,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub credits: CreditsConfig,
    /// From `GOOGLE_AI_API_KEY`. Gemini is unavailable when `None`.
    pub gemini_api_key: Option<String>,
    /// From `OPENAI_API_KEY`. The OpenAI fallback is unavailable when `None`.
    pub openai_api_key: Option<String>,
}

impl Config {
    /// `true` when at least one provider has a key.
    pub fn has_any_provider(&self) -> bool {
        self.gemini_api_key.is_some() || self.openai_api_key.is_some()
    }
}

/// Values taken from the process environment. Tests build this directly
/// instead of mutating env vars.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub log_level: Option<String>,
    pub bind: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("FUSIONSPACE_LOG_LEVEL").ok(),
            bind: env::var("FUSIONSPACE_BIND").ok(),
            gemini_api_key: non_empty_env(GEMINI_API_KEY_ENV),
            openai_api_key: non_empty_env(OPENAI_API_KEY_ENV),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    credits: RawCredits,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_app_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self { name: default_app_name(), log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_model")]
    default_model: String,
    #[serde(default)]
    gemini: RawGemini,
    #[serde(default)]
    openai: RawOpenAi,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self {
            default_model: default_llm_model(),
            gemini: RawGemini::default(),
            openai: RawOpenAi::default(),
        }
    }
}

#[derive(Deserialize)]
struct RawGemini {
    #[serde(default = "default_gemini_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_gemini_model")]
    model: String,
    #[serde(default = "default_max_output_tokens")]
    max_output_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_input_rate")]
    input_per_1k_chars_usd: f64,
    #[serde(default = "default_output_rate")]
    output_per_1k_chars_usd: f64,
}

impl Default for RawGemini {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_timeout_seconds(),
            input_per_1k_chars_usd: default_input_rate(),
            output_per_1k_chars_usd: default_output_rate(),
        }
    }
}

#[derive(Deserialize)]
struct RawOpenAi {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_max_output_tokens")]
    max_output_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_openai_input_rate")]
    input_per_1k_chars_usd: f64,
    #[serde(default = "default_openai_output_rate")]
    output_per_1k_chars_usd: f64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_timeout_seconds(),
            input_per_1k_chars_usd: default_openai_input_rate(),
            output_per_1k_chars_usd: default_openai_output_rate(),
        }
    }
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_request_timeout_seconds")]
    request_timeout_seconds: u64,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind(), request_timeout_seconds: default_request_timeout_seconds() }
    }
}

#[derive(Deserialize)]
struct RawCredits {
    #[serde(default = "default_daily_limit")]
    daily_limit: u32,
    #[serde(default = "default_monthly_limit")]
    monthly_limit: u32,
}

impl Default for RawCredits {
    fn default() -> Self {
        Self { daily_limit: default_daily_limit(), monthly_limit: default_monthly_limit() }
    }
}

fn default_app_name() -> String {
    "fusionspace".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_model() -> String {
    "gemini".to_string()
}

fn default_gemini_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_timeout_seconds() -> u64 {
    120
}

// Gemini list price per 1K characters.
fn default_input_rate() -> f64 {
    0.000075
}

fn default_output_rate() -> f64 {
    0.0003
}

fn default_openai_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_input_rate() -> f64 {
    0.0000375
}

fn default_openai_output_rate() -> f64 {
    0.00015
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    600
}

fn default_daily_limit() -> u32 {
    10
}

fn default_monthly_limit() -> u32 {
    100
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from `config_path`, or `config/default.toml`, then apply env overrides.
///
/// If no path is given and the default file does not exist, the built-in
/// defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = EnvOverrides::from_env();
    match config_path {
        Some(path) => load_from(Path::new(path), &overrides),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_from(&default_path, &overrides)
            } else {
                load_from_str("", "<built-in defaults>", &overrides)
            }
        }
    }
}

/// Load from an explicit file path.
pub fn load_from(path: &Path, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    load_from_str(&raw, &path.display().to_string(), overrides)
}

/// Parse TOML text and resolve it against `overrides`. `source` is only used
/// in error messages.
pub fn load_from_str(raw: &str, source: &str, overrides: &EnvOverrides) -> Result<Config, AppError> {
    let parsed: RawConfig = toml::from_str(raw)
        .map_err(|e| AppError::Config(format!("parse error in {source}: {e}")))?;

    let raw_model = parsed.llm.default_model;
    let default_model = ModelChoice::parse(&raw_model).ok_or_else(|| {
        AppError::Config(format!("unknown llm.default '{raw_model}' in {source} (expected gemini or openai)"))
    })?;

    let credits = parsed.credits;
    if credits.daily_limit == 0 || credits.monthly_limit == 0 {
        return Err(AppError::Config(format!("credit limits must be positive in {source}")));
    }

    let g = parsed.llm.gemini;
    let o = parsed.llm.openai;

    Ok(Config {
        app_name: parsed.app.name,
        log_level: overrides.log_level.clone().unwrap_or(parsed.app.log_level),
        llm: LlmConfig {
            default_model,
            gemini: GeminiConfig {
                api_base_url: g.api_base_url.trim_end_matches('/').to_string(),
                model: g.model,
                max_output_tokens: g.max_output_tokens,
                timeout_seconds: g.timeout_seconds,
                input_per_1k_chars_usd: g.input_per_1k_chars_usd,
                output_per_1k_chars_usd: g.output_per_1k_chars_usd,
            },
            openai: OpenAiConfig {
                api_base_url: o.api_base_url,
                model: o.model,
                max_output_tokens: o.max_output_tokens,
                timeout_seconds: o.timeout_seconds,
                input_per_1k_chars_usd: o.input_per_1k_chars_usd,
                output_per_1k_chars_usd: o.output_per_1k_chars_usd,
            },
        },
        server: ServerConfig {
            bind: overrides.bind.clone().unwrap_or(parsed.server.bind),
            request_timeout_seconds: parsed.server.request_timeout_seconds,
        },
        credits: CreditsConfig {
            daily_limit: credits.daily_limit,
            monthly_limit: credits.monthly_limit,
        },
        gemini_api_key: overrides.gemini_api_key.clone(),
        openai_api_key: overrides.openai_api_key.clone(),
    })
}

impl Config {
    /// Built-in defaults with no API keys. Used by tests and by callers that
    /// wire providers by hand.
    pub fn defaults() -> Result<Self, AppError> {
        load_from_str("", "<built-in defaults>", &EnvOverrides::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[app]
name = "fs-test"
log_level = "warn"

[llm]
default = "gemini"

[llm.gemini]
model = "gemini-2.5-pro"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.app_name, "fs-test");
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.llm.gemini.model, "gemini-2.5-pro");
        assert_eq!(cfg.llm.gemini.max_output_tokens, 8192);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.app_name, "fusionspace");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.llm.default_model, ModelChoice::Gemini);
        assert_eq!(cfg.llm.gemini.api_base_url, "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(cfg.llm.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.llm.gemini.max_output_tokens, 8192);
        assert_eq!(cfg.llm.gemini.timeout_seconds, 120);
        assert_eq!(cfg.llm.gemini.input_per_1k_chars_usd, 0.000075);
        assert_eq!(cfg.llm.gemini.output_per_1k_chars_usd, 0.0003);
        assert_eq!(cfg.llm.openai.api_base_url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(cfg.llm.openai.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.openai.input_per_1k_chars_usd, 0.0000375);
        assert_eq!(cfg.llm.openai.output_per_1k_chars_usd, 0.00015);
        assert_eq!(cfg.server.bind, "127.0.0.1:3000");
        assert_eq!(cfg.server.request_timeout_seconds, 600);
        assert_eq!((cfg.credits.daily_limit, cfg.credits.monthly_limit), (10, 100));
        assert!(!cfg.has_any_provider());
    }

    #[test]
    fn trailing_slash_trimmed_from_gemini_base() {
        let toml = "[llm.gemini]\napi_base_url = \"http://localhost:9999/v1beta/\"\n";
        let cfg = load_from_str(toml, "<t>", &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.llm.gemini.api_base_url, "http://localhost:9999/v1beta");
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &EnvOverrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn unknown_default_model_rejected() {
        let result = load_from_str("[llm]\ndefault = \"claude\"\n", "<t>", &EnvOverrides::default());
        assert!(result.unwrap_err().to_string().contains("unknown llm.default"));
    }

    #[test]
    fn default_model_parsed_into_choice() {
        let cfg = load_from_str("[llm]\ndefault = \"openai\"\n", "<t>", &EnvOverrides::default()).unwrap();
        assert_eq!(cfg.llm.default_model, ModelChoice::OpenAi);
    }

    #[test]
    fn zero_credit_limit_rejected() {
        let result = load_from_str("[credits]\ndaily_limit = 0\n", "<t>", &EnvOverrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let overrides = EnvOverrides {
            log_level: Some("debug".into()),
            bind: Some("0.0.0.0:8080".into()),
            gemini_api_key: Some("g-key".into()),
            openai_api_key: None,
        };
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.gemini_api_key.as_deref(), Some("g-key"));
        assert!(cfg.has_any_provider());
    }

    #[test]
    fn api_keys_never_read_from_toml() {
        let toml = "[llm.gemini]\napi_key = \"leaked\"\n";
        let cfg = load_from_str(toml, "<t>", &EnvOverrides::default()).unwrap();
        assert!(cfg.gemini_api_key.is_none());
    }
}
