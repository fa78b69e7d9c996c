//! Command-line client for a running server: posts the question to
//! `{API_URL}/preguntar` and renders the answer with its sources.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::markdown::source_list;
use crate::rag::{PIPELINE_DEADLINE, RagResponse};
use crate::server::AskRequest;

/// Outlasts the server's own pipeline deadline so its apology still arrives.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(PIPELINE_DEADLINE.as_secs() + 30);

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("please enter a question")]
    EmptyQuestion,

    #[error("backend error {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub async fn ask(
    http: &Client,
    api_url: &str,
    question: &str,
    model: Option<String>,
) -> Result<RagResponse, AskError> {
    let query = question.trim();
    if query.is_empty() {
        return Err(AskError::EmptyQuestion);
    }

    let url = format!("{}/preguntar", api_url.trim_end_matches('/'));
    debug!(%url, "asking backend");

    let response = http
        .post(&url)
        .json(&AskRequest {
            query: query.to_string(),
            model,
        })
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "backend returned an error");
        return Err(AskError::Backend {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

pub fn format_answer(response: &RagResponse) -> String {
    let answer = match response.respuesta.trim() {
        "" => "(no answer)",
        a => a,
    };
    let mut output = format!("## Answer\n\n{answer}\n");
    if !response.sources.is_empty() {
        output.push_str("\n## Sources\n\n");
        output.push_str(&source_list(&response.sources));
    }
    output
}
