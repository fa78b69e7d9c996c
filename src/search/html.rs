//! DuckDuckGo HTML result-page scraping and snippet text extraction.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::types::SearchHit;

/// Extracts up to `max` organic hits from a DuckDuckGo `/html/` result page.
/// Sponsored results and entries without a title are skipped.
pub fn parse_results(page: &str, max: usize) -> Vec<SearchHit> {
    let (Ok(result_sel), Ok(title_sel), Ok(snippet_sel)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(page);
    let mut hits = Vec::new();

    for result in document.select(&result_sel) {
        if hits.len() >= max {
            break;
        }
        if result.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(anchor) = result.select(&title_sel).next() else {
            continue;
        };
        let title = collapse_whitespace(&element_text(&anchor));
        if title.is_empty() {
            continue;
        }

        let href = anchor
            .value()
            .attr("href")
            .and_then(decode_href)
            .unwrap_or_default();
        let body_html = result
            .select(&snippet_sel)
            .next()
            .map(|s| s.inner_html())
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            href,
            body_html,
        });
    }

    debug!(hits = hits.len(), "parsed result page");
    hits
}

/// Resolves DuckDuckGo's `/l/?uddg=` redirect links to the target URL.
/// Protocol-relative links are made `https:`.
pub(crate) fn decode_href(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let absolute = if raw.starts_with("//") {
        format!("https:{raw}")
    } else if raw.starts_with('/') {
        format!("https://duckduckgo.com{raw}")
    } else {
        raw.to_string()
    };

    let parsed = url::Url::parse(&absolute).ok()?;
    let is_redirect = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        && parsed.path().starts_with("/l/");

    if is_redirect {
        parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    } else {
        Some(absolute)
    }
}

/// Strips markup from a snippet fragment. Entities are decoded by the parser.
pub fn to_plain_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    collapse_whitespace(&element_text(&parsed.root_element()))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
