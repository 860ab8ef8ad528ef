//! Keyword search feeding the batch scraper.
//!
//! Queries the Google Custom Search JSON API for recent articles, then runs
//! the hits through [`scrape_many`]. Search problems never surface as
//! errors: a missing key, a network failure or a bad response all yield an
//! empty [`SearchOutcome`], which callers treat as "no search data".

use crate::batch::{BatchConfig, scrape_many};
use crate::fetcher::{FetchConfig, FetchPage, Fetcher};
use crate::models::{SearchHit, SearchOutcome};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Google Custom Search JSON API.
pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
/// The API refuses to return more than this per request.
pub const MAX_RESULTS_PER_REQUEST: usize = 10;

/// Options for [`search_and_scrape`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub api_key: Option<String>,
    pub search_engine_id: Option<String>,
    /// Requested hit count, capped at [`MAX_RESULTS_PER_REQUEST`].
    pub max_results: usize,
    /// The caller will fall back to model-side search grounding when this
    /// bridge finds nothing. Only affects logging here.
    pub fallback_to_grounding: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            search_engine_id: None,
            max_results: MAX_RESULTS_PER_REQUEST,
            fallback_to_grounding: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("search API returned HTTP {0}")]
    Status(u16),
    #[error("could not decode search response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    display_link: String,
}

impl From<SearchItem> for SearchHit {
    fn from(item: SearchItem) -> Self {
        SearchHit {
            url: item.link,
            title: item.title,
            snippet: item.snippet,
            display_link: item.display_link,
        }
    }
}

/// Thin client for the search API.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: String,
}

impl SearchClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self::with_endpoint(client, SEARCH_ENDPOINT))
    }

    /// Point the client at a different endpoint, e.g. a local mock.
    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Up to `min(max_results, 10)` hits from the last month, newest first.
    #[instrument(level = "info", skip(self, api_key, search_engine_id))]
    pub async fn search(
        &self,
        query: &str,
        api_key: &str,
        search_engine_id: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let num = max_results.min(MAX_RESULTS_PER_REQUEST);
        if num == 0 {
            return Ok(Vec::new());
        }
        let num = num.to_string();

        info!("Performing custom search");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", api_key),
                ("cx", search_engine_id),
                ("q", query),
                ("num", num.as_str()),
                ("sort", "date"),
                ("dateRestrict", "m1"),
            ])
            .send()
            .await
            .map_err(SearchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await.map_err(SearchError::Decode)?;
        let hits: Vec<SearchHit> = body.items.into_iter().map(SearchHit::from).collect();
        if hits.is_empty() {
            warn!("No search results found");
        } else {
            info!(count = hits.len(), "Found search results");
        }
        Ok(hits)
    }
}

/// Search client plus the fetcher and batch settings used for the hits.
#[derive(Debug, Clone)]
pub struct SearchBridge<F = Fetcher> {
    search: SearchClient,
    fetcher: F,
    batch: BatchConfig,
}

impl SearchBridge<Fetcher> {
    /// Bridge against the real search API with default scraping settings.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_parts(
            SearchClient::new()?,
            Fetcher::new(&FetchConfig::default())?,
            BatchConfig::default(),
        ))
    }
}

impl<F: FetchPage> SearchBridge<F> {
    pub fn with_parts(search: SearchClient, fetcher: F, batch: BatchConfig) -> Self {
        Self {
            search,
            fetcher,
            batch,
        }
    }

    /// Search for `query` and scrape whatever comes back.
    #[instrument(level = "info", skip(self, options))]
    pub async fn search_and_scrape(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        let (Some(api_key), Some(engine_id)) = (&options.api_key, &options.search_engine_id) else {
            info!("Search API credentials not provided, skipping custom search");
            log_no_results(options);
            return SearchOutcome::default();
        };

        let hits = match self
            .search
            .search(query, api_key, engine_id, options.max_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                error!(error = %e, "Error performing custom search");
                Vec::new()
            }
        };

        if hits.is_empty() {
            log_no_results(options);
            return SearchOutcome::default();
        }

        let urls: Vec<String> = hits.iter().map(|hit| hit.url.clone()).collect();
        info!(count = urls.len(), "Attempting to scrape search result URLs");
        debug!(?urls, "Search result URLs");

        let batch = scrape_many(&self.fetcher, &urls, &self.batch).await;
        if batch.successful.is_empty() && !batch.failed.is_empty() {
            warn!("All search result URLs failed to scrape; consider different search terms or sources");
        }

        SearchOutcome::from_batch(hits, batch)
    }
}

fn log_no_results(options: &SearchOptions) {
    if options.fallback_to_grounding {
        warn!("No results from custom search; rely on model search grounding instead");
    } else {
        warn!("No results from custom search");
    }
}

/// Search for `query` and scrape the hits with default settings.
///
/// Without both an API key and an engine id this returns an empty outcome
/// and makes no network calls.
pub async fn search_and_scrape(query: &str, options: &SearchOptions) -> SearchOutcome {
    if options.api_key.is_none() || options.search_engine_id.is_none() {
        info!("Search API credentials not provided, skipping custom search");
        log_no_results(options);
        return SearchOutcome::default();
    }

    match SearchBridge::new() {
        Ok(bridge) => bridge.search_and_scrape(query, options).await,
        Err(e) => {
            error!(error = %e, "Could not build HTTP client for search");
            SearchOutcome::default()
        }
    }
}
