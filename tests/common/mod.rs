//! Mock Gemini and OpenAI endpoints served by axum on ephemeral ports.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use fusionspace::llm::providers::gemini::GeminiProvider;
use fusionspace::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use fusionspace::llm::{LlmProvider, ModelRates};

pub const TEST_KEY: &str = "test-key";
pub const MODEL: &str = "gemini-2.5-flash";

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

pub type Responder = Arc<dyn Fn(&str) -> (StatusCode, Value) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    responder: Responder,
    seen: Arc<Mutex<Vec<Seen>>>,
}

pub struct MockGemini {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockGemini {
    /// Serve `responder(prompt)` for every `generateContent` call.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { responder: Arc::new(responder), seen: seen.clone() };
        let app = Router::new()
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/v1beta"), seen }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn provider(&self) -> GeminiProvider {
        let rates = ModelRates { input_per_1k_chars_usd: 0.000075, output_per_1k_chars_usd: 0.0003 };
        GeminiProvider::new(self.base_url.clone(), MODEL.into(), 8192, 5, rates, TEST_KEY.into()).unwrap()
    }

    pub fn llm(&self) -> LlmProvider {
        LlmProvider::Gemini(self.provider())
    }
}

async fn generate_content(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
    state.seen.lock().unwrap().push(Seen {
        path: uri.path().to_string(),
        api_key: headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()).map(String::from),
        body,
    });
    let (status, reply) = (state.responder)(&prompt);
    (status, Json(reply))
}

/// Mock of an OpenAI-compatible `/v1/chat/completions` endpoint. `api_key`
/// in [`Seen`] holds the raw `Authorization` header.
pub struct MockOpenAi {
    pub url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockOpenAi {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, Value) + Send + Sync + 'static,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { responder: Arc::new(responder), seen: seen.clone() };
        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{addr}/v1/chat/completions"), seen }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn provider(&self, model: &str, api_key: Option<&str>) -> OpenAiCompatibleProvider {
        let rates = ModelRates { input_per_1k_chars_usd: 0.00015, output_per_1k_chars_usd: 0.0006 };
        OpenAiCompatibleProvider::new(self.url.clone(), model.into(), 4096, 5, rates, api_key.map(String::from))
            .unwrap()
    }
}

async fn chat_completions(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
    state.seen.lock().unwrap().push(Seen {
        path: uri.path().to_string(),
        api_key: headers.get("authorization").and_then(|v| v.to_str().ok()).map(String::from),
        body,
    });
    let (status, reply) = (state.responder)(&prompt);
    (status, Json(reply))
}

/// A successful chat-completion body.
pub fn chat_reply(text: &str) -> Value {
    json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }],
        "usage": { "prompt_tokens": 80, "completion_tokens": 40, "total_tokens": 120 }
    })
}

/// A successful `generateContent` body.
pub fn reply(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }],
        "usageMetadata": { "promptTokenCount": 100, "candidatesTokenCount": 50, "totalTokenCount": 150 }
    })
}

/// A Google API error envelope.
pub fn api_error(code: u16, status: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message, "status": status } })
}
