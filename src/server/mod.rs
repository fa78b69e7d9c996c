//! HTTP surface: `/`, `/health`, `POST /preguntar`.

mod error;
pub(crate) mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use handlers::AskRequest;

use crate::llm::ChatCompletion;
use crate::rag::Rag;
use crate::search::WebSearch;

pub struct AppState<S, C> {
    pub rag: Rag<S, C>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub fn router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
    S: WebSearch + 'static,
    C: ChatCompletion + 'static,
{
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/preguntar", post(handlers::preguntar::<S, C>))
        .layer(TraceLayer::new_for_http())
        // The browser front end is served from another origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until Ctrl+C.
pub async fn serve<S, C>(addr: SocketAddr, state: Arc<AppState<S, C>>) -> Result<(), ServerError>
where
    S: WebSearch + 'static,
    C: ChatCompletion + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::rag::RagResponse;
    use crate::rag::tests::{MockLlm, rag, rag_sources};
    use crate::search::engine::tests::MockSearch;
    use reqwest::{Client, StatusCode};

    async fn spawn(search: MockSearch, llm: MockLlm) -> String {
        let state = Arc::new(AppState {
            rag: rag(search, llm),
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn default_server() -> String {
        spawn(
            MockSearch::with_pages(vec![rag_sources(), rag_sources()]),
            MockLlm::replying("Fake answer [1]"),
        )
        .await
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let base = default_server().await;
        let resp = Client::new().get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn root_has_message() {
        let base = default_server().await;
        let resp = Client::new().get(&base).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn blank_queries_are_400() {
        let base = default_server().await;
        let client = Client::new();
        for query in ["", " ", "\t\n  "] {
            let resp = client
                .post(format!("{base}/preguntar"))
                .json(&serde_json::json!({ "query": query }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {query:?}");
            let body: serde_json::Value = resp.json().await.unwrap();
            assert_eq!(body["detail"], "Query cannot be empty");
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_422() {
        let base = default_server().await;
        let client = Client::new();
        for body in [
            serde_json::json!({}),
            serde_json::json!({ "model": "x" }),
            serde_json::json!({ "query": 42 }),
        ] {
            let resp = client
                .post(format!("{base}/preguntar"))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "body {body}");
        }

        let resp = client
            .post(format!("{base}/preguntar"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn answer_includes_http_sources() {
        let base = default_server().await;
        let resp = Client::new()
            .post(format!("{base}/preguntar"))
            .json(&AskRequest {
                query: "¿Qué es RAG?".into(),
                model: None,
            })
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let data: RagResponse = resp.json().await.unwrap();
        assert_eq!(data.respuesta, "Fake answer [1]");
        assert_eq!(data.status, "success");
        assert!(data.sources.len() >= 2);
        for source in &data.sources {
            assert!(source.url.starts_with("http"));
            assert!(!source.title.is_empty());
        }
    }

    #[tokio::test]
    async fn no_results_still_200_with_answer() {
        let base = spawn(
            MockSearch::with_pages(vec![vec![], vec![]]),
            MockLlm::replying("General knowledge answer"),
        )
        .await;
        let resp = Client::new()
            .post(format!("{base}/preguntar"))
            .json(&serde_json::json!({ "query": "test question" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let data: RagResponse = resp.json().await.unwrap();
        assert!(!data.respuesta.is_empty());
        assert!(data.sources.is_empty());
    }
}
