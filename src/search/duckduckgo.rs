use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::html::parse_results;
use super::types::SearchHit;

pub(crate) const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
/// The HTML endpoint serves an empty page to obvious bots.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search provider throttled the request")]
    Throttled,

    #[error("search provider returned status {0}")]
    Status(u16),

    #[error("invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Web search seam. `DuckDuckGoClient` in production; mocks in tests.
pub trait WebSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;
}

#[derive(Clone)]
pub struct DuckDuckGoClient {
    http: Client,
    base_url: String,
}

impl DuckDuckGoClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, query: &str) -> Result<url::Url, SearchError> {
        let url = url::Url::parse_with_params(&format!("{}/html/", self.base_url), [("q", query)])?;
        Ok(url)
    }
}

impl WebSearch for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let url = self.search_url(query)?;

        let response = self
            .http
            .get(url)
            .header("User-Agent", BROWSER_USER_AGENT)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        // 202 carries the anomaly/captcha page instead of results.
        if status == StatusCode::ACCEPTED || status == StatusCode::TOO_MANY_REQUESTS {
            warn!(status = %status, "search provider throttled");
            return Err(SearchError::Throttled);
        }
        if !status.is_success() {
            warn!(status = %status, "search provider error");
            return Err(SearchError::Status(status.as_u16()));
        }

        let page = response.text().await?;
        let hits = parse_results(&page, max_results);
        debug!(query, max_results, hits = hits.len(), "search complete");
        Ok(hits)
    }
}
