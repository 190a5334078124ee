//! Axum handlers for `/api/*` routes.
//!
//! Error bodies always have the shape `{"success": false, "error": "..."}`.

use std::collections::HashMap;
use std::future::Future;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::ai::content::ContentRequest;
use crate::ai::pipeline::WebsiteGenerator;
use crate::ai::{GenerationContext, GenerationRequest, GenerationResponse, ModelChoice};
use crate::chains::{self, ChainError};
use crate::credits::CreditReservation;
use crate::templates::{self, TemplateCategory};

use super::{API_VERSION, AppState};

const NO_PROVIDER: &str =
    "No AI provider configured. Set GOOGLE_AI_API_KEY (or OPENAI_API_KEY) in the environment.";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct GenerateRequest {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    direct: bool,
}

#[derive(Deserialize)]
pub(super) struct CodeRequest {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    context: GenerationContext,
    #[serde(default)]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
pub(super) struct ChainQuery {
    category: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct TemplateQuery {
    category: Option<String>,
    q: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct RunChainRequest {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    context: HashMap<String, String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn json_error(msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "success": false, "error": format!("{msg}") }))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn resolve_model(state: &AppState, name: Option<&str>) -> Result<ModelChoice, Response> {
    match name {
        None => Ok(state.default_model),
        Some(name) => ModelChoice::parse(name).ok_or_else(|| {
            (StatusCode::BAD_REQUEST, json_error(format!("Unsupported model: {name}"))).into_response()
        }),
    }
}

/// Availability and quota gate shared by every endpoint that calls a provider.
/// The returned reservation refunds its credit unless committed.
fn precheck(state: &AppState) -> Result<CreditReservation<'_>, Response> {
    if !state.service.is_available() {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, json_error(NO_PROVIDER)).into_response());
    }
    state
        .credits
        .reserve()
        .map_err(|e| (StatusCode::TOO_MANY_REQUESTS, json_error(e)).into_response())
}

async fn within_timeout<F: Future>(state: &AppState, what: &str, work: F) -> Result<F::Output, Response> {
    tokio::time::timeout(state.request_timeout, work).await.map_err(|_| {
        warn!(timeout_secs = state.request_timeout.as_secs(), what, "request timed out");
        (StatusCode::GATEWAY_TIMEOUT, json_error(format!("{what} timed out"))).into_response()
    })
}

/// 500 for a failed generation. On success the credit is kept and the
/// common success body is returned for the caller to extend.
fn completed(resp: GenerationResponse, credit: CreditReservation<'_>) -> Result<Value, Response> {
    if !resp.success {
        let error = resp.error.unwrap_or_else(|| "Generation failed".to_string());
        return Err((StatusCode::INTERNAL_SERVER_ERROR, json_error(error)).into_response());
    }
    credit.commit();
    Ok(json!({
        "success": true,
        "content": resp.content,
        "model": resp.model,
        "tokensUsed": resp.tokens_used,
        "cost": resp.cost,
    }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Response {
    let body = json!({
        "status": "ok",
        "version": API_VERSION,
        "providers": state.service.available_models(),
        "credits": state.credits.balance(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/generate
pub(super) async fn generate_info(State(state): State<AppState>) -> Response {
    let body = json!({
        "message": "AI Website Generator API",
        "version": API_VERSION,
        "defaultModel": state.default_model.as_str(),
        "supportedModels": [ModelChoice::Gemini.as_str(), ModelChoice::OpenAi.as_str()],
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/generate
pub(super) async fn generate(State(state): State<AppState>, Json(req): Json<GenerateRequest>) -> Response {
    let Some(prompt) = non_empty(req.prompt.as_deref()) else {
        return (StatusCode::BAD_REQUEST, json_error("Prompt is required")).into_response();
    };
    let model = match resolve_model(&state, req.model.as_deref()) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let credit = match precheck(&state) {
        Ok(credit) => credit,
        Err(resp) => return resp,
    };

    info!(model = model.as_str(), direct = req.direct, prompt_len = prompt.len(), "generate request");

    let generator = WebsiteGenerator::new(state.service.clone().with_step_model(model)).direct_only(req.direct);
    let outcome = match within_timeout(&state, "Generation", generator.generate(prompt)).await {
        Ok(outcome) => outcome,
        Err(resp) => return resp,
    };

    match completed(outcome.response, credit) {
        Ok(mut body) => {
            body["path"] = json!(outcome.path);
            body["fallbackReason"] = json!(outcome.fallback_reason);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(resp) => resp,
    }
}

/// POST /api/generate/code
pub(super) async fn generate_code(State(state): State<AppState>, Json(req): Json<CodeRequest>) -> Response {
    let Some(prompt) = non_empty(req.prompt.as_deref()) else {
        return (StatusCode::BAD_REQUEST, json_error("Prompt is required")).into_response();
    };
    let model = match resolve_model(&state, req.model.as_deref()) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let credit = match precheck(&state) {
        Ok(credit) => credit,
        Err(resp) => return resp,
    };

    let mut request = GenerationRequest::new(prompt).model(model).context(req.context);
    if let Some(t) = req.temperature {
        request = request.temperature(t.clamp(0.0, 2.0));
    }
    info!(model = model.as_str(), business_type = ?request.context.business_type, "code request");

    let resp = match within_timeout(&state, "Generation", state.service.generate_code(request)).await {
        Ok(resp) => resp,
        Err(resp) => return resp,
    };
    match completed(resp, credit) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(resp) => resp,
    }
}

/// POST /api/generate/content
pub(super) async fn generate_content(
    State(state): State<AppState>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, json_error(format!("Invalid request data: {}", rejection.body_text())))
                .into_response();
        }
    };
    if req.business_type.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("Business type is required")).into_response();
    }
    let credit = match precheck(&state) {
        Ok(credit) => credit,
        Err(resp) => return resp,
    };

    let resp = match within_timeout(&state, "Generation", state.service.generate_content(&req)).await {
        Ok(resp) => resp,
        Err(resp) => return resp,
    };
    match completed(resp, credit) {
        Ok(mut body) => {
            body["section"] = json!(req.section);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(resp) => resp,
    }
}

/// GET /api/chains[?category=]
pub(super) async fn chains(Query(q): Query<ChainQuery>) -> Response {
    let list = match non_empty(q.category.as_deref()) {
        Some(category) => chains::chains_by_category(category),
        None => chains::CHAINS.iter().collect(),
    };
    (StatusCode::OK, Json(json!({ "chains": list }))).into_response()
}

/// GET /api/chains/{id}
pub(super) async fn chain_detail(Path(id): Path<String>) -> Response {
    match chains::get_chain(&id) {
        Some(chain) => (StatusCode::OK, Json(json!(chain))).into_response(),
        None => (StatusCode::NOT_FOUND, json_error(ChainError::NotFound(id))).into_response(),
    }
}

/// POST /api/chains/{id}/run
pub(super) async fn run_chain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RunChainRequest>,
) -> Response {
    if chains::get_chain(&id).is_none() {
        return (StatusCode::NOT_FOUND, json_error(ChainError::NotFound(id))).into_response();
    }
    let Some(input) = non_empty(req.input.as_deref()) else {
        return (StatusCode::BAD_REQUEST, json_error("Input is required")).into_response();
    };
    let credit = match precheck(&state) {
        Ok(credit) => credit,
        Err(resp) => return resp,
    };

    let run = match within_timeout(
        &state,
        "Chain run",
        chains::execute_chain(&state.service, &id, input, &req.context),
    )
    .await
    {
        Ok(run) => run,
        Err(resp) => return resp,
    };

    match run {
        Ok(run) => {
            credit.commit();
            (StatusCode::OK, Json(json!({ "success": true, "run": run }))).into_response()
        }
        Err(e) => {
            warn!(chain_id = %id, error = %e, "chain run failed");
            let status = match e {
                ChainError::NotFound(_) => StatusCode::NOT_FOUND,
                ChainError::MissingVariable { .. } => StatusCode::BAD_REQUEST,
                ChainError::StepFailed { .. } => StatusCode::BAD_GATEWAY,
            };
            (status, json_error(e)).into_response()
        }
    }
}

/// GET /api/templates[?category=&q=]
pub(super) async fn templates(Query(q): Query<TemplateQuery>) -> Response {
    let mut list: Vec<_> = match non_empty(q.category.as_deref()) {
        None => templates::TEMPLATES.iter().collect(),
        Some(name) => match TemplateCategory::parse(name) {
            Some(category) => templates::templates_by_category(category),
            None => {
                return (StatusCode::BAD_REQUEST, json_error(format!("Unknown template category: {name}")))
                    .into_response();
            }
        },
    };
    if let Some(query) = non_empty(q.q.as_deref()) {
        let hits = templates::search_templates(query);
        list.retain(|t| hits.iter().any(|h| h.id == t.id));
    }
    (StatusCode::OK, Json(json!({ "templates": list }))).into_response()
}

/// GET /api/templates/{id}
pub(super) async fn template_detail(Path(id): Path<String>) -> Response {
    match templates::get_template(&id) {
        Some(template) => (StatusCode::OK, Json(json!(template))).into_response(),
        None => (StatusCode::NOT_FOUND, json_error(format!("Template not found: {id}"))).into_response(),
    }
}
