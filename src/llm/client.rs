use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::{ApiKey, LlmConfig, Provider};

pub(crate) const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 800;
const REFERER: &str = "http://localhost:8080";
const APP_TITLE: &str = "AI-RAG Assistant";

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("{provider} error ({status}): {body}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("Generation error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Generation error: response contained no choices")]
    EmptyChoices,
}

/// Chat-completion seam. `ChatClient` in production; mocks in tests.
pub trait ChatCompletion: Send + Sync {
    fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

/// OpenAI-compatible `/chat/completions` client.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    provider: Provider,
    api_key: ApiKey,
    url: String,
}

impl ChatClient {
    pub fn new(http: Client, llm: &LlmConfig) -> Self {
        Self {
            http,
            provider: llm.provider,
            api_key: llm.api_key.clone(),
            url: format!("{}/chat/completions", llm.base_url),
        }
    }
}

impl ChatCompletion for ChatClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut builder = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .timeout(COMPLETION_TIMEOUT);
        if self.provider == Provider::OpenRouter {
            builder = builder
                .header("HTTP-Referer", REFERER)
                .header("X-Title", APP_TITLE);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = error_body(&text);
            warn!(provider = %self.provider, status = %status, "completion request failed");
            return Err(CompletionError::Api {
                provider: self.provider,
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::EmptyChoices)?;

        debug!(model, chars = content.len(), "completion received");
        Ok(content)
    }
}

/// JSON error bodies are re-serialized compactly; anything else is wrapped as `{"raw": ...}`.
fn error_body(text: &str) -> String {
    let value = serde_json::from_str::<serde_json::Value>(text)
        .unwrap_or_else(|_| serde_json::json!({ "raw": text }));
    value.to_string()
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, provider: Provider) -> ChatClient {
        let config = Config::for_tests(provider, &server.uri(), "http://search.test");
        ChatClient::new(Client::new(), &config.llm)
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::system("sys"), ChatMessage::user("hi")]
    }

    #[tokio::test]
    async fn complete_success_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("X-Title", APP_TITLE))
            .and(body_partial_json(serde_json::json!({
                "model": "google/gemma-2-9b-it",
                "max_tokens": 800,
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello"}}]
            })))
            .mount(&server)
            .await;

        let result = client(&server, Provider::OpenRouter)
            .complete("google/gemma-2-9b-it", &messages())
            .await
            .unwrap();
        assert_eq!(result, "Hello");
    }

    #[tokio::test]
    async fn complete_401_with_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "No auth credentials found"}
            })))
            .mount(&server)
            .await;

        let err = client(&server, Provider::OpenRouter)
            .complete("m", &messages())
            .await
            .unwrap_err();
        match &err {
            CompletionError::Api { status: 401, body, .. } => {
                assert!(body.contains("No auth credentials found"));
            }
            other => panic!("expected Api(401), got: {other:?}"),
        }
        assert!(err.to_string().starts_with("OpenRouter error (401)"));
    }

    #[tokio::test]
    async fn complete_500_with_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server, Provider::Groq)
            .complete("m", &messages())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Groq error (500): {"raw":"bad gateway"}"#);
    }

    #[tokio::test]
    async fn complete_without_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = client(&server, Provider::OpenAi)
            .complete("m", &messages())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::EmptyChoices));
    }

    #[tokio::test]
    async fn complete_network_failure_is_generation_error() {
        let config =
            Config::for_tests(Provider::OpenAi, "http://127.0.0.1:9", "http://search.test");
        let err = ChatClient::new(Client::new(), &config.llm)
            .complete("m", &messages())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Generation error:"));
    }
}
