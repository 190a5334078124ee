//! Prompt-chain catalog and runner.
//!
//! A chain is an ordered list of prompt steps. [`execute_chain`] fills each
//! step's `{name}` placeholders from the user input, the caller's context
//! and the replies of earlier steps, then sends the prompt through
//! [`AiService::complete_raw`].
//!
//! When a reply is a JSON object its top-level string fields are exposed as
//! variables too, so `{businessType}` resolves after a business-analysis
//! step without the caller supplying it. Caller context always wins.

mod catalog;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ai::extract::extract_json_from_markdown;
use crate::ai::{AiService, ModelChoice};

pub use catalog::CHAINS;

const STEP_TEMPERATURE: f32 = 0.7;
const USER_INPUT_VAR: &str = "userInput";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").expect("placeholder pattern compiles")
});

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStep {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
    pub required: bool,
    pub order: u32,
    /// Variable name the step's reply is stored under.
    pub output_key: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptChain {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub estimated_tokens: u32,
    /// Estimated USD cost of one run.
    pub cost: f64,
    pub steps: &'static [PromptStep],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRun {
    pub chain_id: String,
    pub results: Vec<StepResult>,
    pub tokens_used: u64,
    pub cost: f64,
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Prompt chain not found: {0}")]
    NotFound(String),
    #[error("step {step}: no value for {{{name}}}")]
    MissingVariable { step: String, name: String },
    #[error("step {step} failed: {error}")]
    StepFailed { step: String, error: String },
}

// ── Catalog queries ───────────────────────────────────────────────────────────

pub fn get_chain(id: &str) -> Option<&'static PromptChain> {
    CHAINS.iter().find(|c| c.id == id)
}

pub fn chains_by_category(category: &str) -> Vec<&'static PromptChain> {
    CHAINS.iter().filter(|c| c.category == category).collect()
}

/// Estimated cost of one run; `0.0` for an unknown chain.
pub fn estimate_chain_cost(id: &str) -> f64 {
    get_chain(id).map(|c| c.cost).unwrap_or(0.0)
}

pub fn total_estimated_cost<'a, I>(ids: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter().map(estimate_chain_cost).sum()
}

// ── Runner ────────────────────────────────────────────────────────────────────

pub async fn execute_chain(
    service: &AiService,
    id: &str,
    user_input: &str,
    context: &HashMap<String, String>,
) -> Result<ChainRun, ChainError> {
    let chain = get_chain(id).ok_or_else(|| ChainError::NotFound(id.to_string()))?;

    let mut steps: Vec<&PromptStep> = chain.steps.iter().collect();
    steps.sort_by_key(|s| s.order);

    let mut vars = context.clone();
    vars.insert(USER_INPUT_VAR.to_string(), user_input.to_string());

    info!(chain_id = chain.id, steps = steps.len(), "prompt chain started");

    let mut run = ChainRun {
        chain_id: chain.id.to_string(),
        results: Vec::with_capacity(steps.len()),
        tokens_used: 0,
        cost: 0.0,
    };

    for step in steps {
        let prompt = match fill(step.prompt, &vars) {
            Ok(p) => p,
            Err(name) if step.required => {
                warn!(chain_id = chain.id, step = step.id, %name, "required step is missing a variable");
                return Err(ChainError::MissingVariable { step: step.id.to_string(), name });
            }
            Err(name) => {
                debug!(chain_id = chain.id, step = step.id, %name, "optional step skipped");
                run.results.push(skipped(step, format!("no value for {{{name}}}")));
                continue;
            }
        };

        match service.complete_raw(ModelChoice::Gemini, prompt, STEP_TEMPERATURE).await {
            Ok(raw) => {
                run.tokens_used += raw.tokens_used;
                run.cost += raw.cost;
                expose_json_fields(&raw.text, &mut vars);
                vars.insert(step.output_key.to_string(), raw.text.clone());
                debug!(chain_id = chain.id, step = step.id, output_len = raw.text.len(), "step completed");
                run.results.push(StepResult {
                    step_id: step.id.to_string(),
                    status: StepStatus::Completed,
                    output: Some(raw.text),
                    error: None,
                });
            }
            Err(e) if step.required => {
                warn!(chain_id = chain.id, step = step.id, error = %e, "required step failed");
                return Err(ChainError::StepFailed { step: step.id.to_string(), error: e.to_string() });
            }
            Err(e) => {
                warn!(chain_id = chain.id, step = step.id, error = %e, "optional step failed, skipping");
                run.results.push(skipped(step, e.to_string()));
            }
        }
    }

    info!(chain_id = chain.id, tokens = run.tokens_used, cost = run.cost, "prompt chain finished");
    Ok(run)
}

fn skipped(step: &PromptStep, error: String) -> StepResult {
    StepResult {
        step_id: step.id.to_string(),
        status: StepStatus::Skipped,
        output: None,
        error: Some(error),
    }
}

/// Replace every `{name}`. `Err` carries the first name with no value.
fn fill(template: &str, vars: &HashMap<String, String>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = vars.get(name.as_str()).ok_or_else(|| name.as_str().to_string())?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

fn expose_json_fields(text: &str, vars: &mut HashMap<String, String>) {
    let Ok(serde_json::Value::Object(map)) = extract_json_from_markdown(text) else {
        return;
    };
    for (key, value) in map {
        if let serde_json::Value::String(s) = value {
            vars.entry(key).or_insert(s);
        }
    }
}
