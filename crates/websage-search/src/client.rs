//! Search client over the Google Custom Search JSON API.
//!
//! Failures never cross this boundary: a provider or network error is
//! reported as a single synthetic result record, and a single failure is
//! terminal for that call (no retries).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use websage_core::SearchResult;

/// Provider cap on results per request.
pub const MAX_RESULTS: usize = 10;

/// A web-search provider.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch up to `count` results for `query`, in provider order.
    ///
    /// Infallible by contract: on failure the returned sequence contains
    /// exactly one record with title "Error" and the failure description
    /// in the snippet.
    async fn search(&self, query: &str, count: usize) -> Vec<SearchResult>;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Deserialize)]
struct CseItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

impl From<CseItem> for SearchResult {
    fn from(item: CseItem) -> Self {
        SearchResult {
            title: item.title,
            link: item.link,
            snippet: item.snippet,
        }
    }
}

// =============================================================================
// GoogleSearchClient
// =============================================================================

/// Client for the Google Custom Search JSON API.
#[derive(Clone)]
pub struct GoogleSearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl GoogleSearchClient {
    pub fn new(endpoint: &str, api_key: &str, engine_id: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
        }
    }

    async fn fetch(
        &self,
        query: &str,
        count: usize,
    ) -> std::result::Result<Vec<SearchResult>, reqwest::Error> {
        let num = count.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: CseResponse = response.json().await?;
        Ok(body.items.into_iter().map(SearchResult::from).collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
        let count = count.clamp(1, MAX_RESULTS);
        match self.fetch(query, count).await {
            Ok(results) => {
                debug!(query = %query, count = results.len(), "Search completed");
                results
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search provider call failed");
                vec![SearchResult::error(e.to_string())]
            }
        }
    }
}
