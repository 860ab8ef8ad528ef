//! # news_scrape
//!
//! Fetches news pages from arbitrary URLs, finds the article text inside
//! whatever markup each site uses, and reports per-URL successes and failures
//! for a downstream article-synthesis step.
//!
//! ## Pipeline
//!
//! 1. **Fetching** ([`fetcher`]): one GET per URL with browser-like headers,
//!    a 15 second timeout and at most 5 redirects
//! 2. **Extraction** ([`extractor`]): title, author, date and body located by
//!    ordered selector cascades with three body fallbacks
//! 3. **Batching** ([`batch`]): groups of 3 URLs at a time with a 1 second
//!    pause between groups, failures classified and counted
//! 4. **Search** ([`search`]): optional keyword search whose hits are fed
//!    through the same batch scraper
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), reqwest::Error> {
//! use news_scrape::batch::Scraper;
//!
//! let scraper = Scraper::new()?;
//! let outcome = scraper
//!     .scrape_many(&["https://example.com/news/story".to_string()])
//!     .await;
//! for article in &outcome.successful {
//!     println!("{} ({} words)", article.title, article.word_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod extractor;
pub mod fetcher;
pub mod models;
pub mod outputs;
pub mod search;
pub mod utils;

pub use batch::{BatchConfig, Scraper, scrape_many, scrape_url};
pub use models::{
    BatchOutcome, BatchStats, ErrorType, ScrapeFailure, ScrapeResult, ScrapedArticle, SearchHit,
    SearchOutcome,
};
pub use search::{SearchOptions, search_and_scrape};
