//! JSON output for scrape runs.
//!
//! Each run writes one file, grouped into a directory per local date:
//! `{json_output_dir}/{YYYY-MM-DD}/{kind}_{HHMMSS}.json`.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Where a run of `kind` started at `at` is written.
pub fn output_path(json_output_dir: &str, kind: &str, at: DateTime<Local>) -> PathBuf {
    PathBuf::from(json_output_dir)
        .join(at.format("%Y-%m-%d").to_string())
        .join(format!("{}_{}.json", kind, at.format("%H%M%S")))
}

/// Serialize `value` as pretty JSON under `json_output_dir`.
///
/// Creates the date directory if needed and returns the written path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, kind = %kind))]
pub async fn write_outcome<T: Serialize>(
    value: &T,
    json_output_dir: &str,
    kind: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    let path = output_path(json_output_dir, kind, Local::now());

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON output");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchOutcome, BatchStats};
    use chrono::TimeZone;

    #[test]
    fn test_output_path_layout() {
        let at = Local.with_ymd_and_hms(2025, 5, 6, 8, 15, 2).unwrap();
        let path = output_path("/tmp/out", "scrape", at);
        assert_eq!(path, PathBuf::from("/tmp/out/2025-05-06/scrape_081502.json"));
    }

    #[tokio::test]
    async fn test_write_outcome_round_trips() {
        let dir = std::env::temp_dir().join(format!("news_scrape_json_{}", std::process::id()));
        let outcome = BatchOutcome {
            stats: BatchStats::new(0),
            ..BatchOutcome::default()
        };

        let path = write_outcome(&outcome, &dir.to_string_lossy(), "scrape")
            .await
            .unwrap();
        let written: BatchOutcome =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, outcome);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
