use tracing::debug;

use crate::config::LlmConfig;

/// Swagger-style clients send the schema placeholder as the value.
const PLACEHOLDER_MODEL: &str = "string";

/// Picks the model id for a request. Blank and placeholder requests count as
/// absent and take the configured default; unknown names fall back to the
/// provider's hard-coded model.
pub fn resolve_model(requested: Option<&str>, llm: &LlmConfig) -> String {
    let candidate = requested
        .map(str::trim)
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case(PLACEHOLDER_MODEL))
        .or(llm.default_model.as_deref())
        .unwrap_or_default()
        .trim();

    let allowed = llm.provider.builtin_models().contains(&candidate)
        || llm.default_model.as_deref() == Some(candidate);

    if candidate.is_empty() || candidate.eq_ignore_ascii_case(PLACEHOLDER_MODEL) || !allowed {
        let fallback = llm.provider.fallback_model();
        if !candidate.is_empty() {
            debug!(requested = candidate, fallback, "model not allowed, using fallback");
        }
        return fallback.to_string();
    }

    candidate.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Provider};

    fn llm(provider: Provider, default_model: Option<&str>) -> LlmConfig {
        let mut config = Config::for_tests(provider, "http://llm.test", "http://search.test").llm;
        config.default_model = default_model.map(str::to_string);
        config
    }

    #[test]
    fn none_uses_fallback() {
        let cfg = llm(Provider::OpenRouter, None);
        assert_eq!(resolve_model(None, &cfg), "google/gemma-2-9b-it");
    }

    #[test]
    fn placeholder_is_rejected() {
        let cfg = llm(Provider::OpenRouter, None);
        assert_eq!(resolve_model(Some("String"), &cfg), "google/gemma-2-9b-it");
        assert_eq!(resolve_model(Some("  "), &cfg), "google/gemma-2-9b-it");
    }

    #[test]
    fn unknown_model_is_rejected() {
        let cfg = llm(Provider::OpenAi, None);
        assert_eq!(resolve_model(Some("made-up/model"), &cfg), "gpt-4o-mini");
    }

    #[test]
    fn builtin_model_is_kept() {
        let cfg = llm(Provider::OpenAi, None);
        assert_eq!(resolve_model(Some(" gpt-4o "), &cfg), "gpt-4o");
    }

    #[test]
    fn configured_default_is_allowed() {
        let cfg = llm(Provider::OpenRouter, Some("anthropic/claude-3-haiku"));
        assert_eq!(resolve_model(None, &cfg), "anthropic/claude-3-haiku");
        assert_eq!(
            resolve_model(Some("anthropic/claude-3-haiku"), &cfg),
            "anthropic/claude-3-haiku"
        );
    }

    #[test]
    fn blank_request_uses_configured_default() {
        let cfg = llm(Provider::OpenRouter, Some("anthropic/claude-3-haiku"));
        for requested in ["", "   ", "string"] {
            assert_eq!(
                resolve_model(Some(requested), &cfg),
                "anthropic/claude-3-haiku",
                "requested {requested:?}"
            );
        }
    }

    #[test]
    fn request_overrides_default() {
        let cfg = llm(Provider::Groq, Some("llama-3.3-70b-versatile"));
        assert_eq!(
            resolve_model(Some("meta-llama/llama-4-scout-17b-16e-instruct"), &cfg),
            "meta-llama/llama-4-scout-17b-16e-instruct"
        );
    }
}
