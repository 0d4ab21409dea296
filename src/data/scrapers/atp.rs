//! ATP singles rankings scraper
//!
//! Parses the weekly rankings table from atptour.com into ranking rows
//! in the same shape the JSON importer reads.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::fetch::{absolute_url, PageFetcher};
use super::{RankingScraper, RankingSnapshot};
use crate::data::import::RankingRow;
use crate::{Result, ScraperConfig, TennisError};

/// Scraper for the ATP rankings page
pub struct AtpRankingsScraper {
    fetcher: PageFetcher,
    url: String,
}

/// Profile link of a ranked player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLink {
    pub name: String,
    pub url: String,
}

impl AtpRankingsScraper {
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(AtpRankingsScraper {
            fetcher: PageFetcher::from_config(config)?,
            url: config.rankings_url.clone(),
        })
    }

    /// Create scraper with a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.fetcher = self.fetcher.with_cache(cache_dir);
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.fetcher = self.fetcher.offline_only(offline);
        self
    }

    /// Profile links of every player in the rankings table
    pub fn fetch_player_links(&self) -> Result<Vec<PlayerLink>> {
        let html = self.fetcher.fetch(&self.url)?;
        parse_player_links(&html, &self.url)
    }
}

impl RankingScraper for AtpRankingsScraper {
    fn fetch_latest(&self) -> Result<RankingSnapshot> {
        let html = self.fetcher.fetch(&self.url)?;
        parse_rankings(&html)
    }
}

pub(super) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| TennisError::Scraper {
        message: format!("bad selector {}: {}", css, e),
    })
}

/// Text nodes directly under an element, ignoring nested markup
pub(super) fn own_text(element: ElementRef) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(super) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse the rankings page into a snapshot
pub fn parse_rankings(html: &str) -> Result<RankingSnapshot> {
    let document = Html::parse_document(html);

    let date_sel = selector("#dateWeek-filter option")?;
    let raw_date = document
        .select(&date_sel)
        .next()
        .map(|option| collapse_whitespace(&option.text().collect::<String>()))
        .ok_or_else(|| TennisError::Scraper {
            message: "rankings page has no week selector".to_string(),
        })?;
    let date = NaiveDate::parse_from_str(&raw_date.replace('.', "-"), "%Y-%m-%d").map_err(|_| {
        TennisError::Scraper {
            message: format!("unrecognised ranking week '{}'", raw_date),
        }
    })?;

    let row_sel = selector("table.mega-table tbody tr.lower-row")?;
    let rank_sel = selector("td.rank")?;
    let change_sel = selector("li.rank span[class*='rank-']")?;
    let name_sel = selector("td.player li.name a span")?;
    let age_sel = selector("td.age")?;
    let points_sel = selector("td.points a")?;
    let earn_drop_sel = selector("td.pointsMove")?;
    let tourns_sel = selector("td.tourns")?;
    let drop_sel = selector("td.drop")?;
    let best_sel = selector("td.best")?;
    let flag_sel = selector("li.avatar use")?;

    let cell = |row: ElementRef, sel: &Selector| row.select(sel).next().map(own_text).and_then(non_empty);
    let nested = |row: ElementRef, sel: &Selector| {
        row.select(sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .and_then(non_empty)
    };

    let mut rows = Vec::new();
    for row in document.select(&row_sel) {
        let country = row
            .select(&flag_sel)
            .next()
            .and_then(|el| el.value().attr("href").or_else(|| el.value().attr("xlink:href")))
            .and_then(|href| href.rsplit('-').next())
            .map(|code| code.to_uppercase());

        rows.push(RankingRow {
            rank: cell(row, &rank_sel),
            rank_change: nested(row, &change_sel),
            player: nested(row, &name_sel),
            age: cell(row, &age_sel),
            points: nested(row, &points_sel).map(|p| p.replace(',', "")),
            earn_drop: cell(row, &earn_drop_sel),
            tournaments: cell(row, &tourns_sel),
            dropping: cell(row, &drop_sel),
            next_best: cell(row, &best_sel),
            country,
        });
    }

    if rows.is_empty() {
        return Err(TennisError::Scraper {
            message: "no ranking rows found".to_string(),
        });
    }

    log::info!("Parsed {} ranking rows for {}", rows.len(), date);
    Ok(RankingSnapshot { date, rows })
}

/// Collect player profile links from the rankings table
pub fn parse_player_links(html: &str, page_url: &str) -> Result<Vec<PlayerLink>> {
    let document = Html::parse_document(html);
    let link_sel = selector("table.mega-table tbody tr.lower-row td.player li.name a")?;

    let links: Vec<PlayerLink> = document
        .select(&link_sel)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let name = non_empty(collapse_whitespace(&a.text().collect::<String>()))?;
            Some(PlayerLink {
                name,
                url: absolute_url(page_url, href),
            })
        })
        .collect();

    if links.is_empty() {
        return Err(TennisError::Scraper {
            message: "no player links found".to_string(),
        });
    }
    log::info!("Found {} player profile links", links.len());
    Ok(links)
}
