use tracing::{debug, warn};

use super::duckduckgo::WebSearch;
use super::html::to_plain_text;
use super::types::{SearchResult, WebContext};
use crate::prompt::truncate_chars;

pub const FIRST_PASS_RESULTS: usize = 6;
pub const WIDE_PASS_RESULTS: usize = 10;
/// A first pass shorter than this is widened.
pub const WIDEN_BELOW_CHARS: usize = 800;
pub const MAX_CONTEXT_CHARS: usize = 7500;
const MIN_SNIPPET_CHARS: usize = 10;

/// One search pass. Provider failures degrade to an empty context.
pub async fn search_web(provider: &impl WebSearch, query: &str, max_results: usize) -> WebContext {
    let hits = match provider.search(query, max_results).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!(error = %e, "search failed, continuing without web context");
            return WebContext::default();
        }
    };

    let mut texts = Vec::new();
    let mut results = Vec::new();

    for hit in hits {
        if is_unusable_body(&hit.body_html) {
            continue;
        }

        let snippet = to_plain_text(&hit.body_html);
        if snippet.chars().count() > MIN_SNIPPET_CHARS {
            texts.push(snippet.clone());
        }

        let title = hit.title.trim();
        let url = hit.href.trim();
        if !title.is_empty() && !url.is_empty() && !url.starts_with("javascript:") {
            results.push(SearchResult {
                title: title.to_string(),
                url: url.to_string(),
                snippet,
            });
        }
    }

    let context = truncate_chars(&texts.join("\n\n"), MAX_CONTEXT_CHARS).to_string();
    debug!(
        max_results,
        snippets = texts.len(),
        results = results.len(),
        chars = context.chars().count(),
        "web context assembled"
    );
    WebContext { context, results }
}

/// Small first pass; a wider one only when the first comes back thin.
/// The longer context wins.
pub async fn adaptive_search(provider: &impl WebSearch, query: &str) -> WebContext {
    let first = search_web(provider, query, FIRST_PASS_RESULTS).await;
    if first.context_chars() >= WIDEN_BELOW_CHARS {
        return first;
    }

    debug!(chars = first.context_chars(), "thin context, widening search");
    let wide = search_web(provider, query, WIDE_PASS_RESULTS).await;
    if wide.context_chars() > first.context_chars() {
        wide
    } else {
        first
    }
}

fn is_unusable_body(body: &str) -> bool {
    body.is_empty() || body.to_lowercase().contains("javascript") || body.contains("d.js")
}
