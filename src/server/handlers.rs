use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::AppState;
use super::error::ApiError;
use crate::llm::ChatCompletion;
use crate::rag::RagResponse;
use crate::search::WebSearch;

/// Body of `POST /preguntar`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    /// Model override; resolved against the allowed set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "AI-RAG API OK" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /preguntar
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/preguntar \
///   -H 'content-type: application/json' \
///   -d '{"query":"Who won Best Picture in 2024?"}'
/// ```
pub async fn preguntar<S, C>(
    State(state): State<Arc<AppState<S, C>>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<RagResponse>, ApiError>
where
    S: WebSearch + 'static,
    C: ChatCompletion + 'static,
{
    let Json(request) = payload?;
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::EmptyQuery);
    }

    info!(query, "preguntar");
    let outcome = state.rag.answer(query, request.model.as_deref()).await;
    Ok(Json(outcome.into()))
}
