//! Dummy LLM provider.
//!
//! With no script it echoes the prompt back prefixed with `[echo]`. With a
//! script it replays the queued replies in order, then falls back to echo.
//! Every prompt is recorded so tests can assert on call count and content.
//! [`DummyProvider::with_delay`] makes each reply wait on the tokio clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::llm::{CompletionRequest, LlmResponse, LlmUsage, ModelRates, ProviderError};

const DUMMY_MODEL: &str = "dummy";

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl DummyProvider {
    /// Provider that answers with `replies` in order.
    pub fn scripted<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ProviderError>>,
    {
        Self {
            script: Arc::new(Mutex::new(replies.into_iter().collect())),
            seen: Arc::default(),
            delay: None,
        }
    }

    /// Hold every reply back for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, ProviderError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().ok().and_then(|mut q| q.pop_front());
        let text = match next {
            Some(reply) => reply?,
            None => format!("[echo] {}", request.prompt),
        };
        let usage = LlmUsage {
            input_tokens: approx_tokens(&request.prompt),
            output_tokens: approx_tokens(&text),
        };
        Ok(LlmResponse { text, usage: Some(usage) })
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn model(&self) -> &str {
        DUMMY_MODEL
    }

    pub fn rates(&self) -> ModelRates {
        ModelRates::default()
    }
}

fn approx_tokens(text: &str) -> u64 {
    text.chars().count().div_ceil(4) as u64
}
