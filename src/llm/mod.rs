//! Chat-completion adapter for OpenAI-compatible endpoints (OpenRouter, OpenAI, Groq).

pub(crate) mod client;
mod model;
pub(crate) mod types;

pub use client::{ChatClient, ChatCompletion};
pub use model::resolve_model;
pub use types::ChatMessage;
