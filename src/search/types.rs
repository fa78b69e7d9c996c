use serde::{Deserialize, Serialize};

/// One organic result as scraped from the provider, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    /// Snippet markup as served by the provider.
    pub body_html: String,
}

/// A citable result: has a title and an http(s) URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Plain-text snippet, possibly empty.
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

impl From<&SearchResult> for Source {
    fn from(result: &SearchResult) -> Self {
        Source {
            title: result.title.clone(),
            url: result.url.clone(),
        }
    }
}

/// Text context assembled for one question, plus what it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebContext {
    pub context: String,
    pub results: Vec<SearchResult>,
}

impl WebContext {
    pub fn context_chars(&self) -> usize {
        self.context.chars().count()
    }

    pub fn sources(&self) -> Vec<Source> {
        self.results.iter().map(Source::from).collect()
    }
}
