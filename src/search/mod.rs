//! Web search: DuckDuckGo scraping, snippet filtering, adaptive widening, and the
//! language heuristic used to pick the answer language.

pub(crate) mod duckduckgo;
pub(crate) mod engine;
pub(crate) mod html;
mod lang;
pub(crate) mod types;

pub use duckduckgo::{DuckDuckGoClient, WebSearch};
pub use lang::Lang;
pub use types::{SearchResult, Source};
