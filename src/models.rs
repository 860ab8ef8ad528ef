//! Data models for scrape results and their batch aggregates.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`ScrapeResult`]: per-URL outcome, either a [`ScrapedArticle`] or a [`ScrapeFailure`]
//! - [`ErrorType`]: the flat failure taxonomy used for reporting
//! - [`BatchStats`] and [`BatchOutcome`]: what one batch call returns
//! - [`SearchHit`] and [`SearchOutcome`]: what the search bridge returns
//!
//! Everything here serializes to camelCase JSON so the output can be handed
//! to the article-generation step unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification label attached to every failed scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum ErrorType {
    #[serde(rename = "404_not_found")]
    NotFound,
    #[serde(rename = "403_forbidden")]
    Forbidden,
    #[serde(rename = "dns_error")]
    Dns,
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "insufficient_content")]
    InsufficientContent,
    #[serde(rename = "general_error")]
    General,
}

impl ErrorType {
    /// The wire label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NotFound => "404_not_found",
            ErrorType::Forbidden => "403_forbidden",
            ErrorType::Dns => "dns_error",
            ErrorType::Timeout => "timeout",
            ErrorType::InsufficientContent => "insufficient_content",
            ErrorType::General => "general_error",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article successfully fetched and extracted from one URL.
///
/// `content` is normalized and at least
/// [`MIN_ARTICLE_CHARS`](crate::batch::MIN_ARTICLE_CHARS) characters long.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedArticle {
    /// The URL that was requested.
    pub url: String,
    /// Best-effort headline; may be empty.
    pub title: String,
    /// Normalized article body.
    pub content: String,
    /// Publish date as found on the page (free-form); may be empty.
    pub publish_date: String,
    /// Byline as found on the page; may be empty.
    pub author: String,
    /// Whitespace-separated word count of `content`.
    pub word_count: usize,
    /// When the scrape finished.
    pub scraped_at: DateTime<Utc>,
}

/// A URL that could not be turned into an article.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeFailure {
    pub url: String,
    /// Human-readable cause.
    pub error: String,
    /// HTTP status when a response was received; `"unknown"` in JSON otherwise.
    #[serde(with = "status_or_unknown")]
    pub http_status: Option<u16>,
    /// HTTP reason phrase, or `"unknown"`.
    pub status_text: String,
    pub error_type: ErrorType,
    pub scraped_at: DateTime<Utc>,
}

impl ScrapeFailure {
    /// The HTTP status as text, `"unknown"` when no response was received.
    pub fn status_label(&self) -> String {
        self.http_status
            .map(|code| code.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Outcome of scraping one URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status")]
pub enum ScrapeResult {
    #[serde(rename = "success")]
    Success(ScrapedArticle),
    #[serde(rename = "failed")]
    Failure(ScrapeFailure),
}

impl ScrapeResult {
    /// The URL this result belongs to, whichever variant it is.
    pub fn url(&self) -> &str {
        match self {
            ScrapeResult::Success(article) => &article.url,
            ScrapeResult::Failure(failure) => &failure.url,
        }
    }
}

/// Running totals for one batch call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: BTreeMap<ErrorType, usize>,
}

impl BatchStats {
    /// Fresh accumulator for a batch of `total` URLs.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, error_type: ErrorType) {
        self.failed += 1;
        *self.errors.entry(error_type).or_insert(0) += 1;
    }

    /// Whole-number success percentage, rounded half up; `0` for an empty batch.
    pub fn success_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.successful as f64 / self.total as f64) * 100.0).round() as u32
    }

    /// `"404_not_found: 2, timeout: 1"` style breakdown of failure causes.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|(error_type, count)| format!("{error_type}: {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything one batch call produced.
///
/// Within each list, entries of the same group appear in completion order;
/// groups themselves appear in input order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BatchOutcome {
    pub successful: Vec<ScrapedArticle>,
    pub failed: Vec<ScrapeFailure>,
    pub stats: BatchStats,
}

/// A single hit returned by the keyword search API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub display_link: String,
}

/// Search hits together with the batch outcome of scraping them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub search_results: Vec<SearchHit>,
    pub scraped_content: Vec<ScrapedArticle>,
    pub failed_urls: Vec<ScrapeFailure>,
    pub stats: BatchStats,
}

impl SearchOutcome {
    pub fn from_batch(search_results: Vec<SearchHit>, batch: BatchOutcome) -> Self {
        Self {
            search_results,
            scraped_content: batch.successful,
            failed_urls: batch.failed,
            stats: batch.stats,
        }
    }
}

/// Serializes `Option<u16>` as the number or the string `"unknown"`.
mod status_or_unknown {
    use serde::{Deserialize, Deserializer, Serializer};

    const UNKNOWN: &str = "unknown";

    pub fn serialize<S: Serializer>(status: &Option<u16>, serializer: S) -> Result<S::Ok, S::Error> {
        match status {
            Some(code) => serializer.serialize_u16(*code),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Code(u16),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u16>, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Some(code),
            Raw::Text(_) => None,
        })
    }
}
