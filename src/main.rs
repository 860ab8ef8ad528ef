//! # news_scrape
//!
//! Command-line front end for the scraping pipeline: scrape the URLs given
//! on the command line, or search for recent articles and scrape the hits.
//! The outcome is summarized in the log and optionally written as JSON.
//!
//! ## Usage
//!
//! ```sh
//! news_scrape -o ./json https://example.com/a https://example.com/b
//! news_scrape --query "storm damage" --google-api-key KEY --search-engine-id CX
//! ```

use clap::Parser;
use news_scrape::batch::Scraper;
use news_scrape::models::BatchStats;
use news_scrape::outputs::json;
use news_scrape::search::{SearchOptions, search_and_scrape};
use news_scrape::utils::ensure_writable_dir;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    // A missing .env is normal; keys may come from flags or the real environment
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    debug!(urls = args.urls.len(), query = ?args.query, ?args.json_output_dir, "Parsed CLI arguments");

    if args.urls.is_empty() && args.query.is_none() {
        error!("Nothing to do: pass one or more URLs or --query");
        return Err("no URLs or query given".into());
    }

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    if let Some(query) = &args.query {
        let options = SearchOptions {
            api_key: args.google_api_key.clone(),
            search_engine_id: args.search_engine_id.clone(),
            max_results: args.max_results,
            fallback_to_grounding: !args.no_grounding_fallback,
        };
        info!(%query, max_results = options.max_results, "Starting search");
        let outcome = search_and_scrape(query, &options).await;
        info!(
            search_results = outcome.search_results.len(),
            successful_scrapes = outcome.scraped_content.len(),
            failed_scrapes = outcome.failed_urls.len(),
            success_rate = %format!("{}%", outcome.stats.success_rate()),
            "Search summary"
        );

        if let Some(dir) = &args.json_output_dir {
            json::write_outcome(&outcome, dir, "search").await?;
        }
    } else {
        info!(count = args.urls.len(), "Processing URLs");
        let scraper = Scraper::new()?;
        let outcome = scraper.scrape_many(&args.urls).await;

        if outcome.successful.is_empty() {
            warn!("{}", no_content_message(&outcome.stats));
        } else {
            for article in &outcome.successful {
                info!(
                    url = %article.url,
                    title = %article.title,
                    words = article.word_count,
                    "Source"
                );
            }
        }
        info!(
            total = outcome.stats.total,
            successful = outcome.stats.successful,
            failed = outcome.stats.failed,
            success_rate = %format!("{}%", outcome.stats.success_rate()),
            "Scraping stats"
        );

        if let Some(dir) = &args.json_output_dir {
            json::write_outcome(&outcome, dir, "scrape").await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Message reported when not a single URL yielded an article.
fn no_content_message(stats: &BatchStats) -> String {
    let mut message = "No content could be extracted from the provided URLs".to_string();
    if stats.failed > 0 {
        message.push_str(&format!(
            ". Failed URLs ({}): {}",
            stats.failed,
            stats.error_summary()
        ));
    }
    message
}
