//! Command-line interface definitions for news_scrape.
//!
//! All credentials can come from flags, environment variables, or a `.env`
//! file in the working directory.

use clap::Parser;

/// Command-line arguments for the news_scrape binary.
///
/// # Examples
///
/// ```sh
/// # Scrape a handful of URLs and print the summary
/// news_scrape https://example.com/a https://example.com/b
///
/// # Save the full outcome as JSON
/// news_scrape -o ./json https://example.com/a
///
/// # Search for recent coverage and scrape the hits
/// news_scrape --query "premier league transfer news" -n 5
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article URLs to scrape
    pub urls: Vec<String>,

    /// Search for recent articles instead of scraping given URLs
    #[arg(short, long, conflicts_with = "urls")]
    pub query: Option<String>,

    /// Maximum number of search results to scrape (the API caps this at 10)
    #[arg(short = 'n', long, default_value_t = 10)]
    pub max_results: usize,

    /// Google Custom Search API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Google Custom Search engine ID
    #[arg(long, env = "GOOGLE_SEARCH_ENGINE_ID")]
    pub search_engine_id: Option<String>,

    /// Don't suggest search grounding when the search finds nothing
    #[arg(long)]
    pub no_grounding_fallback: bool,

    /// Output directory for the JSON outcome file
    #[arg(short = 'o', long)]
    pub json_output_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_urls() {
        let cli = Cli::parse_from([
            "news_scrape",
            "https://example.com/a",
            "https://example.com/b",
            "-o",
            "./json",
        ]);

        assert_eq!(cli.urls, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(cli.json_output_dir.as_deref(), Some("./json"));
        assert!(cli.query.is_none());
        assert_eq!(cli.max_results, 10);
    }

    #[test]
    fn test_cli_parses_search_flags() {
        let cli = Cli::parse_from([
            "news_scrape",
            "--query",
            "election results",
            "-n",
            "5",
            "--google-api-key",
            "key",
            "--search-engine-id",
            "cx",
            "--no-grounding-fallback",
        ]);

        assert_eq!(cli.query.as_deref(), Some("election results"));
        assert_eq!(cli.max_results, 5);
        assert_eq!(cli.google_api_key.as_deref(), Some("key"));
        assert_eq!(cli.search_engine_id.as_deref(), Some("cx"));
        assert!(cli.no_grounding_fallback);
        assert!(cli.urls.is_empty());
    }

    #[test]
    fn test_cli_rejects_query_with_urls() {
        let result = Cli::try_parse_from(["news_scrape", "https://example.com/a", "-q", "news"]);
        assert!(result.is_err());
    }
}
