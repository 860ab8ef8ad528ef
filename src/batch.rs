//! Batch coordination: fetch and extract many URLs politely.
//!
//! URLs are processed in fixed-size groups. Every URL in a group is fetched
//! and extracted concurrently; the next group starts only once the whole
//! group has settled, after a short pause. Per-URL failures are recorded as
//! data and never stop the batch.
//!
//! Statistics are only touched here, in the coordinating flow, after each
//! group completes. The per-URL futures own their results outright.

use crate::extractor::extract_from_html;
use crate::fetcher::{FetchConfig, FetchError, FetchPage, Fetcher};
use crate::models::{BatchOutcome, BatchStats, ErrorType, ScrapeFailure, ScrapeResult, ScrapedArticle};
use crate::utils::{char_len, truncate_for_log, word_count};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Extracted bodies shorter than this are reported as `insufficient_content`.
pub const MIN_ARTICLE_CHARS: usize = 100;

/// Group sizing and pacing for [`scrape_many`].
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// URLs fetched at once; also the concurrency cap.
    pub group_size: usize,
    /// Pause between consecutive groups.
    pub pacing: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            group_size: 3,
            pacing: Duration::from_secs(1),
        }
    }
}

/// Fetch and extract a single URL.
///
/// Always produces a result: fetch failures and thin pages come back as
/// [`ScrapeResult::Failure`].
#[instrument(level = "info", skip(fetcher))]
pub async fn scrape_url<F: FetchPage>(fetcher: &F, url: &str) -> ScrapeResult {
    debug!("Scraping");
    match fetcher.fetch(url).await {
        Ok(page) => article_from_html(url, &page.body),
        Err(e) => {
            let failure = failure_from_fetch(url, &e);
            match failure.error_type {
                ErrorType::NotFound => error!(%url, "404 Not Found"),
                ErrorType::Forbidden => error!(%url, "403 Forbidden"),
                ErrorType::Dns => error!(%url, error = %e, "DNS error"),
                ErrorType::Timeout => error!(%url, "Timeout"),
                _ => error!(%url, error = %e, "Error scraping"),
            }
            ScrapeResult::Failure(failure)
        }
    }
}

/// Turn a fetched page body into a result, enforcing [`MIN_ARTICLE_CHARS`].
pub fn article_from_html(url: &str, html: &str) -> ScrapeResult {
    let extracted = extract_from_html(html);
    let chars = char_len(&extracted.content);

    if chars < MIN_ARTICLE_CHARS {
        warn!(
            %url,
            chars,
            preview = %truncate_for_log(&extracted.content, 80),
            "Insufficient content extracted"
        );
        return ScrapeResult::Failure(ScrapeFailure {
            url: url.to_string(),
            error: "Insufficient content extracted".to_string(),
            http_status: None,
            status_text: "unknown".to_string(),
            error_type: ErrorType::InsufficientContent,
            scraped_at: Utc::now(),
        });
    }

    info!(%url, chars, tier = ?extracted.tier, "Successfully scraped");
    ScrapeResult::Success(ScrapedArticle {
        url: url.to_string(),
        title: extracted.title,
        word_count: word_count(&extracted.content),
        content: extracted.content,
        publish_date: extracted.publish_date,
        author: extracted.author,
        scraped_at: Utc::now(),
    })
}

fn failure_from_fetch(url: &str, e: &FetchError) -> ScrapeFailure {
    ScrapeFailure {
        url: url.to_string(),
        error: e.to_string(),
        http_status: e.http_status(),
        status_text: e.status_text(),
        error_type: e.error_type(),
        scraped_at: Utc::now(),
    }
}

/// Scrape every URL in `urls`, in groups of `config.group_size`.
///
/// Returns exactly one classified entry per input URL. Groups run in input
/// order with `config.pacing` between them; inside a group, entries land in
/// the order their fetches complete.
#[instrument(level = "info", skip_all, fields(total = urls.len()))]
pub async fn scrape_many<F: FetchPage>(
    fetcher: &F,
    urls: &[String],
    config: &BatchConfig,
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        stats: BatchStats::new(urls.len()),
        ..BatchOutcome::default()
    };
    info!("Starting to scrape {} URLs", urls.len());

    let group_size = config.group_size.max(1);
    let groups = urls.len().div_ceil(group_size);

    for (index, group) in urls.chunks(group_size).enumerate() {
        if index > 0 {
            sleep(config.pacing).await;
        }

        let results: Vec<ScrapeResult> = stream::iter(group)
            .map(|url| scrape_url(fetcher, url))
            .buffer_unordered(group_size)
            .collect()
            .await;

        for result in results {
            match result {
                ScrapeResult::Success(article) => {
                    outcome.stats.record_success();
                    outcome.successful.push(article);
                }
                ScrapeResult::Failure(failure) => {
                    outcome.stats.record_failure(failure.error_type);
                    outcome.failed.push(failure);
                }
            }
        }
        debug!(group = index + 1, groups, "Group settled");
    }

    log_summary(&outcome);
    outcome
}

fn log_summary(outcome: &BatchOutcome) {
    let stats = &outcome.stats;
    info!(
        successful = stats.successful,
        failed = stats.failed,
        total = stats.total,
        success_rate = stats.success_rate(),
        "Scraping results"
    );

    if stats.failed > 0 {
        info!(breakdown = %stats.error_summary(), "Error breakdown");
        for failed in &outcome.failed {
            warn!(
                url = %failed.url,
                error = %failed.error,
                status = %failed.status_label(),
                error_type = %failed.error_type,
                "Failed URL"
            );
        }
    }
}

/// A reqwest-backed fetcher bundled with its batch settings.
#[derive(Debug, Clone)]
pub struct Scraper {
    fetcher: Fetcher,
    config: BatchConfig,
}

impl Scraper {
    /// Scraper with the default fetch and batch settings.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(&FetchConfig::default(), BatchConfig::default())
    }

    pub fn with_config(fetch: &FetchConfig, batch: BatchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            fetcher: Fetcher::new(fetch)?,
            config: batch,
        })
    }

    pub async fn scrape_url(&self, url: &str) -> ScrapeResult {
        scrape_url(&self.fetcher, url).await
    }

    pub async fn scrape_many(&self, urls: &[String]) -> BatchOutcome {
        scrape_many(&self.fetcher, urls, &self.config).await
    }
}
