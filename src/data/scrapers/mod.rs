//! Web scrapers for ranking and player profile data

pub mod atp;
pub mod fetch;
pub mod profile;

pub use atp::{AtpRankingsScraper, PlayerLink};
pub use fetch::PageFetcher;
pub use profile::{AtpProfileScraper, PlayerProfile};

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::import::RankingRow;
use crate::{Result, TennisError};

/// One scraped ranking week
#[derive(Debug, Clone, PartialEq)]
pub struct RankingSnapshot {
    pub date: NaiveDate,
    pub rows: Vec<RankingRow>,
}

impl RankingSnapshot {
    /// Write the snapshot as `<dir>/<YYYY-MM-DD>.json`
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.date.format("%Y-%m-%d")));
        std::fs::write(&path, serde_json::to_string_pretty(&self.rows)?)?;
        Ok(path)
    }
}

/// Trait for ranking scrapers
pub trait RankingScraper {
    /// Fetch the current ranking week
    fn fetch_latest(&self) -> Result<RankingSnapshot>;
}

/// Retry a scraper operation with exponential backoff
pub fn with_retry<T, F>(mut operation: F, max_attempts: u32) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error = None;
    for attempt in 0..max_attempts.max(1) {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                log::warn!("Attempt {} failed: {}", attempt + 1, e);
                last_error = Some(e);
                if attempt + 1 < max_attempts {
                    let delay = std::time::Duration::from_millis(100 * 2u64.pow(attempt));
                    std::thread::sleep(delay);
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| TennisError::Scraper {
        message: "no attempts made".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_with_retry_recovers() {
        let calls = Cell::new(0);
        let result = with_retry(
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 2 {
                    Err(TennisError::Scraper {
                        message: "flaky".to_string(),
                    })
                } else {
                    Ok(42)
                }
            },
            3,
        );
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_with_retry_gives_up() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(
            || {
                calls.set(calls.get() + 1);
                Err(TennisError::Scraper {
                    message: "down".to_string(),
                })
            },
            2,
        );
        assert!(matches!(result, Err(TennisError::Scraper { .. })));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_snapshot_save() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot = RankingSnapshot {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            rows: vec![RankingRow {
                rank: Some("1".to_string()),
                player: Some("Jannik Sinner".to_string()),
                ..Default::default()
            }],
        };
        let path = snapshot.save(dir.path().join("ATP")).unwrap();
        assert!(path.ends_with("ATP/2025-03-10.json"));

        let rows: Vec<RankingRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows, snapshot.rows);
    }
}
