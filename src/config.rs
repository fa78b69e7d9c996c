//! Process-wide configuration, read once at startup.

use std::env;
use std::fmt;

const DEFAULT_SEARCH_BASE: &str = "https://html.duckduckgo.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no LLM API key set: export OPENROUTER_API_KEY, OPENAI_API_KEY or GROQ_API_KEY")]
    ApiKeyNotSet,

    #[error("invalid base URL for {var} ({url}): {source}")]
    InvalidBaseUrl {
        var: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// OpenAI-compatible chat-completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenRouter,
    OpenAi,
    Groq,
}

impl Provider {
    /// Lookup order when several keys are present.
    const PRECEDENCE: [Provider; 3] = [Provider::OpenRouter, Provider::OpenAi, Provider::Groq];

    fn key_var(self) -> &'static str {
        match self {
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }

    fn base_url_var(self) -> &'static str {
        match self {
            Provider::OpenRouter => "OPENROUTER_BASE_URL",
            Provider::OpenAi => "OPENAI_BASE_URL",
            Provider::Groq => "GROQ_BASE_URL",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Model used whenever the requested one is missing, a placeholder, or not allowed.
    pub fn fallback_model(self) -> &'static str {
        match self {
            Provider::OpenRouter => "google/gemma-2-9b-it",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Groq => "meta-llama/llama-4-scout-17b-16e-instruct",
        }
    }

    pub fn builtin_models(self) -> &'static [&'static str] {
        match self {
            Provider::OpenRouter => &["google/gemma-2-9b-it"],
            Provider::OpenAi => &["gpt-4o-mini", "gpt-4o"],
            Provider::Groq => &[
                "meta-llama/llama-4-scout-17b-16e-instruct",
                "llama-3.3-70b-versatile",
            ],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenRouter => "OpenRouter",
            Provider::OpenAi => "OpenAI",
            Provider::Groq => "Groq",
        })
    }
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: ApiKey,
    /// Base URL without trailing slash; `/chat/completions` is appended.
    pub base_url: String,
    /// `LLM_MODEL`, if set.
    pub default_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub search_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (provider, key) = Provider::PRECEDENCE
            .iter()
            .find_map(|p| non_blank(p.key_var()).map(|k| (*p, k)))
            .ok_or(ConfigError::ApiKeyNotSet)?;

        let base_var = provider.base_url_var();
        let base_url = non_blank(base_var)
            .unwrap_or_else(|| provider.default_base_url().to_string());
        let base_url = checked_base_url(base_var, &base_url)?;

        let search_base_url = non_blank("SEARCH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SEARCH_BASE.to_string());
        let search_base_url = checked_base_url("SEARCH_BASE_URL", &search_base_url)?;

        Ok(Self {
            llm: LlmConfig {
                provider,
                api_key: ApiKey(key),
                base_url,
                default_model: non_blank("LLM_MODEL"),
            },
            search_base_url,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(provider: Provider, llm_base: &str, search_base: &str) -> Self {
        Self {
            llm: LlmConfig {
                provider,
                api_key: ApiKey("test-key".to_string()),
                base_url: llm_base.trim_end_matches('/').to_string(),
                default_model: None,
            },
            search_base_url: search_base.trim_end_matches('/').to_string(),
        }
    }
}

fn checked_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    url::Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
        var,
        url: raw.to_string(),
        source,
    })?;
    Ok(raw.trim_end_matches('/').to_string())
}
