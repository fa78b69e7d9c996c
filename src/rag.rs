//! Request pipeline: search, language detection, prompt, completion.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::LlmConfig;
use crate::llm::client::COMPLETION_TIMEOUT;
use crate::llm::{ChatCompletion, resolve_model};
use crate::prompt::{PromptContext, build_messages};
use crate::search::duckduckgo::SEARCH_TIMEOUT;
use crate::search::engine::adaptive_search;
use crate::search::{Lang, Source, WebSearch};

/// Slack on top of the stage timeouts for prompt building and response parsing.
const DEADLINE_MARGIN: Duration = Duration::from_secs(10);
/// Whole-pipeline deadline: two search passes, one completion, plus margin.
pub const PIPELINE_DEADLINE: Duration = Duration::from_secs(
    2 * SEARCH_TIMEOUT.as_secs() + COMPLETION_TIMEOUT.as_secs() + DEADLINE_MARGIN.as_secs(),
);
/// Contexts shorter than this are treated as no context at all.
pub const MIN_CONTEXT_CHARS: usize = 40;

pub const NO_WEB_CONTEXT: &str = "No relevant results were found on the web.";
const APOLOGY_CONTEXT: &str = "No se pudo obtener contexto web debido a un error técnico.";
const APOLOGY_ANSWER: &str = "Lo siento, hubo un error procesando tu pregunta. \
     Por favor intenta con una pregunta diferente. / \
     Sorry, there was an error processing your question. Please try a different question.";

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("pipeline exceeded {}s deadline", .0.as_secs())]
    Timeout(Duration),

    #[error("pipeline panicked: {0}")]
    Panicked(String),
}

/// Completion outcome: model text, or a readable description of why there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Generated(String),
    Unavailable(String),
}

impl Answer {
    pub fn text(&self) -> &str {
        match self {
            Answer::Generated(t) | Answer::Unavailable(t) => t,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Answer::Generated(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RagOutcome {
    pub context: String,
    pub answer: Answer,
    pub sources: Vec<Source>,
}

impl RagOutcome {
    fn apology() -> Self {
        Self {
            context: APOLOGY_CONTEXT.to_string(),
            answer: Answer::Unavailable(APOLOGY_ANSWER.to_string()),
            sources: Vec::new(),
        }
    }
}

/// Wire shape of `POST /preguntar`.
#[derive(Debug, Clone, Serialize, serde::Deserialize, PartialEq)]
pub struct RagResponse {
    pub contexto: String,
    pub respuesta: String,
    pub sources: Vec<Source>,
    pub status: String,
}

impl From<RagOutcome> for RagResponse {
    fn from(outcome: RagOutcome) -> Self {
        Self {
            respuesta: outcome.answer.text().to_string(),
            contexto: outcome.context,
            sources: outcome.sources,
            status: "success".to_string(),
        }
    }
}

pub struct Rag<S, C> {
    search: S,
    llm: C,
    llm_config: LlmConfig,
    deadline: Duration,
}

impl<S: WebSearch, C: ChatCompletion> Rag<S, C> {
    pub fn new(search: S, llm: C, llm_config: LlmConfig) -> Self {
        Self {
            search,
            llm,
            llm_config,
            deadline: PIPELINE_DEADLINE,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Never fails: timeouts and panics become a fixed bilingual apology.
    pub async fn answer(&self, query: &str, model: Option<&str>) -> RagOutcome {
        match self.run_guarded(query, model).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "pipeline failed, returning apology");
                RagOutcome::apology()
            }
        }
    }

    async fn run_guarded(&self, query: &str, model: Option<&str>) -> Result<RagOutcome, RagError> {
        let guarded = tokio::time::timeout(self.deadline, self.run(query, model));
        match AssertUnwindSafe(guarded).catch_unwind().await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Err(RagError::Timeout(self.deadline)),
            Err(payload) => Err(RagError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    async fn run(&self, query: &str, model: Option<&str>) -> RagOutcome {
        let web = adaptive_search(&self.search, query).await;
        let lang = Lang::detect(query);
        let model_id = resolve_model(model, &self.llm_config);

        let without_context = web.context_chars() < MIN_CONTEXT_CHARS;
        let prompt_context = if without_context {
            debug!(chars = web.context_chars(), "near-empty web context, answering without it");
            PromptContext::Empty
        } else if web.results.is_empty() {
            PromptContext::Plain(&web.context)
        } else {
            PromptContext::Cited(&web.results)
        };

        let messages = build_messages(query, &prompt_context, lang);
        let answer = match self.llm.complete(&model_id, &messages).await {
            Ok(text) => Answer::Generated(text),
            Err(e) => {
                warn!(error = %e, model = %model_id, "completion failed");
                Answer::Unavailable(e.to_string())
            }
        };

        info!(
            lang = lang.code(),
            model = %model_id,
            sources = web.results.len(),
            web_context = !without_context,
            generated = answer.is_generated(),
            "question answered"
        );

        if without_context {
            RagOutcome {
                context: NO_WEB_CONTEXT.to_string(),
                answer,
                sources: Vec::new(),
            }
        } else {
            let sources = web.sources();
            RagOutcome {
                context: web.context,
                answer,
                sources,
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
