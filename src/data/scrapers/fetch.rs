//! HTTP page fetching with an optional HTML cache

use std::path::{Path, PathBuf};

use super::with_retry;
use crate::{Result, ScraperConfig, TennisError};

/// Blocking page fetcher shared by the ATP scrapers
pub struct PageFetcher {
    client: reqwest::blocking::Client,
    max_attempts: u32,
    /// Optional cache directory for offline HTML files
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl PageFetcher {
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(PageFetcher {
            client,
            max_attempts: config.max_attempts,
            cache_dir: None,
            offline_only: false,
        })
    }

    /// Create fetcher with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| {
            let filename = url
                .replace("https://", "")
                .replace("http://", "")
                .replace(['/', '?', '&', '='], "_")
                + ".html";
            dir.join(filename)
        })
    }

    fn load_from_cache(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    pub(crate) fn save_to_cache(&self, url: &str, html: &str) -> Result<()> {
        if let Some(path) = self.cache_path(url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, html)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }

    /// Fetch a page, preferring the cache
    pub fn fetch(&self, url: &str) -> Result<String> {
        if let Some(html) = self.load_from_cache(url) {
            return Ok(html);
        }
        if self.offline_only {
            return Err(TennisError::Scraper {
                message: format!("No cached data for {} (offline mode)", url),
            });
        }

        log::info!("Fetching {}", url);
        let html = with_retry(
            || {
                let resp = self.client.get(url).send()?;
                if !resp.status().is_success() {
                    return Err(TennisError::Scraper {
                        message: format!("{} returned {}", url, resp.status()),
                    });
                }
                Ok(resp.text()?)
            },
            self.max_attempts,
        )?;

        if let Err(e) = self.save_to_cache(url, &html) {
            log::warn!("Failed to cache {}: {}", url, e);
        }
        Ok(html)
    }
}

/// `scheme://host` part of a URL
pub fn site_root(url: &str) -> &str {
    let start = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[start..].find('/') {
        Some(end) => &url[..start + end],
        None => url,
    }
}

/// Resolve a link found on a page against the page's site
pub fn absolute_url(page_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", site_root(page_url), href)
    } else {
        let base = page_url.split(['?', '#']).next().unwrap_or(page_url);
        match base.rfind('/') {
            Some(i) => format!("{}/{}", &base[..i], href),
            None => href.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn test_url_resolution() {
        let page = "https://www.atptour.com/en/rankings/singles?rankRange=0-5000";
        assert_eq!(site_root(page), "https://www.atptour.com");
        assert_eq!(
            absolute_url(page, "/en/players/jannik-sinner/s0ag/overview"),
            "https://www.atptour.com/en/players/jannik-sinner/s0ag/overview"
        );
        assert_eq!(
            absolute_url("https://www.atptour.com/en/players/jannik-sinner/s0ag/overview", "player-stats"),
            "https://www.atptour.com/en/players/jannik-sinner/s0ag/player-stats"
        );
        assert_eq!(absolute_url(page, "https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn test_offline_fetch_reads_cache_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let fetcher = PageFetcher::from_config(&Config::default().scraper)
            .unwrap()
            .with_cache(dir.path())
            .offline_only(true);
        let url = "https://www.atptour.com/en/players/a/b/overview";

        assert!(matches!(fetcher.fetch(url), Err(TennisError::Scraper { .. })));
        fetcher.save_to_cache(url, "<html></html>").unwrap();
        assert_eq!(fetcher.fetch(url).unwrap(), "<html></html>");
    }
}
