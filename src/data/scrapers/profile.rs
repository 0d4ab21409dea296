//! ATP player profile scraper
//!
//! Reads a player's overview page and its `player-stats` page into the
//! profile object the players importer consumes: raw `Overview`, `Stats`,
//! `YTD` and `Career` blocks plus the normalized bio fields.

use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use super::atp::{collapse_whitespace, non_empty, selector, PlayerLink};
use super::fetch::{absolute_url, PageFetcher};
use crate::data::import::{normalize_name, parse_birth_date, parse_career_high, parse_height, parse_weight};
use crate::{Result, ScraperConfig, TennisError};

/// One scraped player, in the players.json shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub url: String,
    #[serde(rename = "Overview")]
    pub overview: Value,
    #[serde(rename = "Stats")]
    pub stats: Value,
    #[serde(rename = "YTD")]
    pub ytd: Value,
    #[serde(rename = "Career")]
    pub career: Value,
    pub birth_date: Option<NaiveDate>,
    pub weight_lbs: Option<u32>,
    pub weight_kg: Option<u32>,
    pub height_feet: Option<u32>,
    pub height_inches: Option<u32>,
    pub height_cm: Option<u32>,
    pub career_high_rank: Option<u32>,
    pub career_high_rank_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlayerProfile {
    /// Placeholder kept when a profile could not be scraped
    pub fn failed(link: &PlayerLink, error: &TennisError) -> Self {
        let mut profile = Self::empty(link);
        profile.error = Some(error.to_string());
        profile
    }

    fn empty(link: &PlayerLink) -> Self {
        PlayerProfile {
            name: normalize_name(&link.name),
            url: link.url.clone(),
            overview: missing(),
            stats: missing(),
            ytd: missing(),
            career: missing(),
            birth_date: None,
            weight_lbs: None,
            weight_kg: None,
            height_feet: None,
            height_inches: None,
            height_cm: None,
            career_high_rank: None,
            career_high_rank_date: None,
            error: None,
        }
    }
}

fn missing() -> Value {
    Value::String("-".to_string())
}

fn block(map: Map<String, Value>) -> Value {
    if map.is_empty() {
        missing()
    } else {
        Value::Object(map)
    }
}

/// Write profiles as a pretty JSON array
pub fn save_profiles<P: AsRef<Path>>(path: P, profiles: &[PlayerProfile]) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path.as_ref(), serde_json::to_string_pretty(profiles)?)?;
    Ok(())
}

/// Scraper for ATP player profile pages
pub struct AtpProfileScraper {
    fetcher: PageFetcher,
}

impl AtpProfileScraper {
    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(AtpProfileScraper {
            fetcher: PageFetcher::from_config(config)?,
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

    /// Scrape one profile; a missing stats page leaves the stats blocks empty
    pub fn scrape_player(&self, link: &PlayerLink) -> Result<PlayerProfile> {
        let overview = self.fetcher.fetch(&link.url)?;
        let stats_url = absolute_url(&link.url, "player-stats");
        let stats = match self.fetcher.fetch(&stats_url) {
            Ok(html) => Some(html),
            Err(e) => {
                log::warn!("No stats page for {}: {}", link.name, e);
                None
            }
        };
        parse_profile(link, &overview, stats.as_deref())
    }

    /// Scrape every profile, keeping a placeholder entry for failures
    pub fn scrape_all(&self, links: &[PlayerLink]) -> Vec<PlayerProfile> {
        links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                log::info!("Scraping {} ({}/{})", link.name, i + 1, links.len());
                self.scrape_player(link).unwrap_or_else(|e| {
                    log::warn!("Failed for {} ({}): {}", link.name, link.url, e);
                    PlayerProfile::failed(link, &e)
                })
            })
            .collect()
    }
}

/// Key/value pairs from the first two spans of each item
fn span_pairs<'a>(items: impl Iterator<Item = ElementRef<'a>>) -> Result<Map<String, Value>> {
    let span_sel = selector("span")?;
    let mut map = Map::new();
    for item in items {
        let mut spans = item
            .select(&span_sel)
            .map(|s| collapse_whitespace(&s.text().collect::<String>()));
        if let (Some(key), Some(value)) = (spans.next(), spans.next()) {
            if !key.is_empty() {
                map.insert(key, Value::String(value));
            }
        }
    }
    Ok(map)
}

/// Label/value blocks of a `player-stats-details` panel
fn detail_blocks(panel: ElementRef) -> Result<Map<String, Value>> {
    let label_sel = selector(".stat-label")?;
    let mut map = Map::new();
    for stat in panel.children().filter_map(ElementRef::wrap) {
        let Some(label) = stat.select(&label_sel).next() else {
            continue;
        };
        let key = collapse_whitespace(&label.text().collect::<String>());
        if key.is_empty() {
            continue;
        }
        let full = collapse_whitespace(&stat.text().collect::<String>());
        let value = full.replacen(&key, "", 1).trim().to_string();
        let value = non_empty(value).unwrap_or_else(|| "-".to_string());
        map.insert(key, Value::String(value));
    }
    Ok(map)
}

/// Parse a profile from its overview page and, when available, its stats page
pub fn parse_profile(link: &PlayerLink, overview_html: &str, stats_html: Option<&str>) -> Result<PlayerProfile> {
    let document = Html::parse_document(overview_html);
    let mut profile = PlayerProfile::empty(link);

    let name_sel = selector("div.player_name span")?;
    if let Some(name) = document
        .select(&name_sel)
        .next()
        .and_then(|el| non_empty(collapse_whitespace(&el.text().collect::<String>())))
    {
        profile.name = normalize_name(&name);
    }

    let overview_sel = selector("ul.pd_left li, ul.pd_right li")?;
    let overview = span_pairs(document.select(&overview_sel))?;
    let text = |key: &str| overview.get(key).and_then(Value::as_str);
    profile.birth_date = text("Age").and_then(parse_birth_date);
    if let Some((lbs, kg)) = text("Weight").and_then(parse_weight) {
        profile.weight_lbs = Some(lbs);
        profile.weight_kg = Some(kg);
    }
    if let Some((feet, inches, cm)) = text("Height").and_then(parse_height) {
        profile.height_feet = Some(feet);
        profile.height_inches = Some(inches);
        profile.height_cm = Some(cm);
    }
    profile.overview = block(overview);

    let Some(stats_html) = stats_html else {
        return Ok(profile);
    };
    let stats_doc = Html::parse_document(stats_html);

    let section_sel = selector("div.statistics_content > div")?;
    let title_sel = selector("h3")?;
    let item_sel = selector("li.stats_items")?;
    let mut stats = Map::new();
    for section in stats_doc.select(&section_sel) {
        let Some(title) = section
            .select(&title_sel)
            .next()
            .and_then(|h| non_empty(collapse_whitespace(&h.text().collect::<String>())))
        else {
            continue;
        };
        stats.insert(title, Value::Object(span_pairs(section.select(&item_sel))?));
    }
    profile.stats = block(stats);

    let panel_sel = selector("div.player-stats-details")?;
    let mut panels = stats_doc.select(&panel_sel);
    if let Some(ytd) = panels.next() {
        profile.ytd = block(detail_blocks(ytd)?);
    }
    if let Some(career) = panels.next() {
        let mut career = detail_blocks(career)?;
        let high_key = career
            .keys()
            .find(|key| key.starts_with("Career High Rank"))
            .cloned();
        if let Some(key) = high_key {
            let value = career.remove(&key);
            let raw = value.as_ref().and_then(Value::as_str).unwrap_or("");
            if let Some((rank, date)) = parse_career_high(&key, raw) {
                profile.career_high_rank = rank;
                profile.career_high_rank_date = date;
            }
        }
        profile.career = block(career);
    }

    Ok(profile)
}
