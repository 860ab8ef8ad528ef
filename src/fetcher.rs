//! Single-page HTTP fetching with failure classification.
//!
//! [`Fetcher`] issues one GET per URL with browser-like headers, a per-request
//! timeout and bounded redirect following. Any response with a status in
//! `[200, 400)` is a page; everything else becomes a [`FetchError`] that knows
//! which [`ErrorType`] it belongs to. There are no retries at this layer.

use crate::models::ErrorType;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS,
};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Desktop Chrome User-Agent; many news sites serve bots a stripped page or a 403.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Tuning for [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout, body included.
    pub timeout: Duration,
    /// Redirect hops followed before giving up.
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_redirects: 5,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// A page body as returned by the server.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

/// Why a single fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Request failed with status code {code}")]
    Status { code: u16, reason: String },
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// Map this error onto the reporting taxonomy.
    pub fn error_type(&self) -> ErrorType {
        match self {
            FetchError::Status { code: 404, .. } => ErrorType::NotFound,
            FetchError::Status { code: 403, .. } => ErrorType::Forbidden,
            FetchError::Status { .. } | FetchError::InvalidUrl { .. } => ErrorType::General,
            FetchError::Request(e) | FetchError::Body(e) => {
                if e.is_timeout() {
                    ErrorType::Timeout
                } else if is_dns_failure(e) {
                    ErrorType::Dns
                } else {
                    ErrorType::General
                }
            }
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::Status { code, .. } => Some(*code),
            FetchError::Request(e) | FetchError::Body(e) => e.status().map(|s| s.as_u16()),
            FetchError::InvalidUrl { .. } => None,
        }
    }

    /// HTTP reason phrase, or `"unknown"`.
    pub fn status_text(&self) -> String {
        match self {
            FetchError::Status { reason, .. } => reason.clone(),
            _ => "unknown".to_string(),
        }
    }
}

/// Walk the source chain looking for a resolver failure.
///
/// The HTTP stack reports DNS problems as a connect error wrapping the
/// resolver's own error, so the only stable signal is the message text.
fn is_dns_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let msg = e.to_string().to_ascii_lowercase();
        if msg.contains("dns error")
            || msg.contains("failed to lookup address")
            || msg.contains("name or service not known")
            || msg.contains("no such host")
        {
            return true;
        }
        current = e.source();
    }
    false
}

/// Anything that can turn a URL into a [`RawPage`].
///
/// The batch coordinator is generic over this so it can be driven without a
/// network.
pub trait FetchPage {
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError>;
}

/// reqwest-backed [`FetchPage`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher with its own HTTP client.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        // Accept-Encoding is added by reqwest itself while gzip/deflate are
        // enabled; setting it here would switch off transparent decoding.
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

impl FetchPage for Fetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !(200..400).contains(&status.as_u16()) {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(FetchError::Body)?;
        debug!(status = status.as_u16(), %final_url, bytes = body.len(), "Fetched page");

        Ok(RawPage {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}
