//! JSON import of player bios and weekly ranking snapshots
//!
//! Players come from a single JSON array of scraped profiles. Rankings come
//! from a folder of `YYYY-MM-DD.json` files, one per weekly snapshot.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::database::Database;
use super::models::{age_on, PlayerBio, PlayerRecord, PlayerStats, RankingEntry, Season};
use crate::{Result, TennisError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of a ranking snapshot file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    #[serde(rename = "Rank", default, deserialize_with = "lenient_text")]
    pub rank: Option<String>,
    #[serde(rename = "Rank_change", default, deserialize_with = "lenient_text")]
    pub rank_change: Option<String>,
    #[serde(rename = "Player", default, deserialize_with = "lenient_text")]
    pub player: Option<String>,
    #[serde(rename = "Age", default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(rename = "Points", default, deserialize_with = "lenient_text")]
    pub points: Option<String>,
    #[serde(rename = "Earn_Drop", default, deserialize_with = "lenient_text")]
    pub earn_drop: Option<String>,
    #[serde(rename = "Tournaments", default, deserialize_with = "lenient_text")]
    pub tournaments: Option<String>,
    #[serde(rename = "Dropping", default, deserialize_with = "lenient_text")]
    pub dropping: Option<String>,
    #[serde(rename = "Next Best", default, deserialize_with = "lenient_text")]
    pub next_best: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
}

/// Accept strings or numbers, dropping anything else
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_text))
}

/// Counts from an import run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub players: usize,
    pub rankings: usize,
    pub files: usize,
}

// ==================== Value Cleaning ====================

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_blank(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s == "-"
}

/// Text field with `""` and `"-"` mapped to none
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !is_blank(s)).map(|s| s.trim().to_string())
}

/// Integer with thousands separators, percent signs and a tie marker removed
pub fn to_int(raw: Option<&str>) -> Option<i64> {
    let raw = raw.filter(|s| !is_blank(s))?;
    let cleaned = raw.replace([',', '%'], "");
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_suffix('T').unwrap_or(cleaned);
    cleaned.parse().ok()
}

pub fn to_float(raw: Option<&str>) -> Option<f64> {
    let raw = raw.filter(|s| !is_blank(s))?;
    raw.replace([',', '%'], "").trim().parse().ok()
}

pub fn to_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.filter(|s| !is_blank(s))?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn to_u32(raw: Option<&str>) -> Option<u32> {
    to_int(raw).and_then(|n| u32::try_from(n).ok())
}

/// Trim and title-case a name ("o'connor" -> "O'Connor")
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut after_letter = false;
    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

// ==================== Bio Normalization ====================

static HEIGHT_IMPERIAL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\d+)'\s*(\d+)").ok());
static HEIGHT_METRIC: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\((\d+)cm\)").ok());
static WEIGHT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*lbs\s*\((\d+)kg\)").ok());
static BIRTH_DATE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\((\d{4}/\d{2}/\d{2})\)").ok());
static CAREER_HIGH_DATE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\(([\d.]+)\)").ok());

/// Parse `6' 2" (188cm)` into (feet, inches, cm)
pub fn parse_height(raw: &str) -> Option<(u32, u32, u32)> {
    let feet = HEIGHT_IMPERIAL.as_ref()?.captures(raw.trim())?;
    let cm = HEIGHT_METRIC.as_ref()?.captures(raw)?;
    Some((feet[1].parse().ok()?, feet[2].parse().ok()?, cm[1].parse().ok()?))
}

/// Parse `183 lbs (83kg)` into (lbs, kg)
pub fn parse_weight(raw: &str) -> Option<(u32, u32)> {
    let caps = WEIGHT.as_ref()?.captures(raw.trim())?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Parse the birth date out of `36 (1987/05/22)`
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let caps = BIRTH_DATE.as_ref()?.captures(raw)?;
    NaiveDate::parse_from_str(&caps[1], "%Y/%m/%d").ok()
}

/// Parse a `Career High Rank (2016.11.07)` key and its value
pub fn parse_career_high(key: &str, value: &str) -> Option<(Option<u32>, Option<NaiveDate>)> {
    if !key.starts_with("Career High Rank") {
        return None;
    }
    let date = CAREER_HIGH_DATE
        .as_ref()?
        .captures(key)
        .and_then(|caps| NaiveDate::parse_from_str(&caps[1], "%Y.%m.%d").ok());
    let rank = value.trim().parse().ok();
    Some((rank, date))
}

// ==================== Players ====================

fn section<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

fn field(map: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    map.and_then(|m| m.get(key)).and_then(value_text)
}

fn bio_from_json(row: &Value, name: String) -> PlayerBio {
    let top = row.as_object();
    let overview = section(row, "Overview");
    let career = section(row, "Career");
    let top_text = |key: &str| field(top, key);

    let mut bio = PlayerBio {
        name,
        url: clean_text(top_text("url").as_deref()),
        birth_date: to_date(top_text("birth_date").as_deref()),
        country: clean_text(field(overview, "Country").as_deref()),
        birthplace: clean_text(field(overview, "Birthplace").as_deref()),
        plays: clean_text(field(overview, "Plays").as_deref()),
        coach: clean_text(field(overview, "Coach").as_deref()),
        turned_pro: to_int(field(overview, "Turned pro").as_deref()).map(|y| y as i32),
        weight_lbs: to_u32(top_text("weight_lbs").as_deref()),
        weight_kg: to_u32(top_text("weight_kg").as_deref()),
        height_cm: to_u32(top_text("height_cm").as_deref()),
        height_feet: to_u32(top_text("height_feet").as_deref()),
        height_inches: to_u32(top_text("height_inches").as_deref()),
        career_high_rank: to_u32(top_text("career_high_rank").as_deref()),
        career_high_rank_date: to_date(top_text("career_high_rank_date").as_deref()),
    };

    // Profiles that were never normalized still carry the raw overview strings
    if bio.birth_date.is_none() {
        bio.birth_date = field(overview, "Age").as_deref().and_then(parse_birth_date);
    }
    if bio.height_cm.is_none() {
        if let Some((feet, inches, cm)) = field(overview, "Height").as_deref().and_then(parse_height) {
            bio.height_feet = Some(feet);
            bio.height_inches = Some(inches);
            bio.height_cm = Some(cm);
        }
    }
    if bio.weight_kg.is_none() {
        if let Some((lbs, kg)) = field(overview, "Weight").as_deref().and_then(parse_weight) {
            bio.weight_lbs = Some(lbs);
            bio.weight_kg = Some(kg);
        }
    }
    if bio.career_high_rank.is_none() {
        let high = career.into_iter().flatten().find_map(|(key, value)| {
            parse_career_high(key, value_text(value).as_deref().unwrap_or(""))
        });
        if let Some((rank, date)) = high {
            bio.career_high_rank = rank;
            bio.career_high_rank_date = date;
        }
    }

    bio
}

fn stats_from_json(row: &Value) -> PlayerStats {
    let stats = row.get("Stats").unwrap_or(&Value::Null);
    let serve = section(stats, "Serve");
    let ret = section(stats, "Return");
    let int = |m: Option<&Map<String, Value>>, k: &str| to_int(field(m, k).as_deref());
    let float = |m: Option<&Map<String, Value>>, k: &str| to_float(field(m, k).as_deref());

    PlayerStats {
        aces: int(serve, "Aces"),
        double_faults: int(serve, "Double Faults"),
        first_serve_pct: float(serve, "1st Serve"),
        first_serve_points_won: float(serve, "1st Serve Points Won"),
        second_serve_points_won: float(serve, "2nd Serve Points Won"),
        break_points_faced: int(serve, "Break Points Faced"),
        break_points_saved: float(serve, "Break Points Saved"),
        service_games_played: int(serve, "Service Games Played"),
        service_games_won: float(serve, "Service Games Won"),
        total_service_points_won: float(serve, "Total Service Points Won"),
        first_serve_return_points_won: float(ret, "1st Serve Return Points Won"),
        second_serve_return_points_won: float(ret, "2nd Serve Return Points Won"),
        break_points_opportunities: int(ret, "Break Points Opportunities"),
        break_points_converted: float(ret, "Break Points Converted"),
        return_games_played: int(ret, "Return Games Played"),
        return_games_won: float(ret, "Return Games Won"),
        return_points_won: float(ret, "Return Points Won"),
        total_points_won: float(ret, "Total Points Won"),
    }
}

fn records_from_json(row: &Value) -> [PlayerRecord; 2] {
    let ytd = section(row, "YTD");
    let career = section(row, "Career");
    [
        PlayerRecord {
            season: Season::YearToDate,
            rank: to_u32(field(ytd, "Rank").as_deref()),
            movement: clean_text(field(ytd, "Move").as_deref()),
            wl_record: clean_text(field(ytd, "W-L").as_deref()),
            titles: to_u32(field(ytd, "Titles").as_deref()),
            prize_money: clean_text(field(ytd, "Prize Money").as_deref()),
        },
        PlayerRecord {
            season: Season::Career,
            rank: None,
            movement: None,
            wl_record: clean_text(field(career, "W-L").as_deref()),
            titles: to_u32(field(career, "Titles").as_deref()),
            prize_money: clean_text(
                field(career, "Prize Money Singles & Doubles Combined").as_deref(),
            ),
        },
    ]
}

/// Import player bios, stats and records from a JSON array
pub fn import_players<P: AsRef<Path>>(db: &Database, path: P) -> Result<usize> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let rows: Vec<Value> = serde_json::from_str(&content)?;

    db.transaction(|db| {
        let mut imported = 0;
        for row in &rows {
            let Some(name) = row.get("name").and_then(Value::as_str).filter(|n| !is_blank(n)) else {
                log::warn!("Skipping player entry without a name");
                continue;
            };

            let player = db.upsert_player(&bio_from_json(row, normalize_name(name)))?;
            db.upsert_stats(&player.id, &stats_from_json(row))?;
            for record in records_from_json(row) {
                db.upsert_record(&player.id, &record)?;
            }
            imported += 1;
        }
        Ok(imported)
    })
}

// ==================== Rankings ====================

/// Snapshot date encoded in a `YYYY-MM-DD.json` file name
pub fn snapshot_date(path: &Path) -> Option<NaiveDate> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

/// Ranking snapshot files in a folder, oldest first
pub fn ranking_files<P: AsRef<Path>>(folder: P) -> Result<Vec<(NaiveDate, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder.as_ref())? {
        let path = entry?.path();
        match snapshot_date(&path) {
            Some(date) => files.push((date, path)),
            None => log::debug!("Ignoring {}", path.display()),
        }
    }
    files.sort();
    Ok(files)
}

/// Import one snapshot file in a single transaction
pub fn import_ranking_file<P: AsRef<Path>>(db: &Database, path: P) -> Result<usize> {
    let path = path.as_ref();
    let date = snapshot_date(path).ok_or_else(|| {
        TennisError::Parse(format!(
            "ranking file name must be YYYY-MM-DD.json: {}",
            path.display()
        ))
    })?;

    let content = std::fs::read_to_string(path)?;
    let rows: Vec<RankingRow> = serde_json::from_str(&content)?;
    import_ranking_rows(db, date, &rows)
}

/// Store the rows of one snapshot
pub fn import_ranking_rows(db: &Database, date: NaiveDate, rows: &[RankingRow]) -> Result<usize> {
    db.transaction(|db| {
        let mut imported = 0;
        for row in rows {
            let Some(name) = row.player.as_deref().filter(|n| !is_blank(n)) else {
                log::warn!("Skipping ranking row without a player on {}", date);
                continue;
            };
            let country = clean_text(row.country.as_deref());
            let player = db.get_or_create_player(&normalize_name(name), country.as_deref())?;

            let entry = RankingEntry {
                rank: to_u32(row.rank.as_deref()),
                rank_change: clean_text(row.rank_change.as_deref()),
                age: player
                    .bio
                    .birth_date
                    .and_then(|birth| age_on(birth, date))
                    .or_else(|| to_u32(row.age.as_deref())),
                points: to_u32(row.points.as_deref()),
                earn_drop: clean_text(row.earn_drop.as_deref()),
                tournaments: to_u32(row.tournaments.as_deref()),
                dropping: clean_text(row.dropping.as_deref()),
                next_best: clean_text(row.next_best.as_deref()),
                country,
            };
            db.upsert_ranking(&player.id, date, &entry)?;
            imported += 1;
        }
        log::info!("Imported {} rankings for {}", imported, date);
        Ok(imported)
    })
}

/// Import every snapshot in a folder
pub fn import_rankings<P: AsRef<Path>>(db: &Database, folder: P) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for (_, path) in ranking_files(folder)? {
        summary.rankings += import_ranking_file(db, &path)?;
        summary.files += 1;
    }
    Ok(summary)
}

/// Import only the newest snapshot in a folder
pub fn import_latest_ranking<P: AsRef<Path>>(db: &Database, folder: P) -> Result<ImportSummary> {
    let folder = folder.as_ref();
    let (date, path) = ranking_files(folder)?.pop().ok_or_else(|| {
        TennisError::InvalidInput(format!("no ranking files in {}", folder.display()))
    })?;

    log::info!("Importing latest ranking {}", date);
    Ok(ImportSummary {
        players: 0,
        rankings: import_ranking_file(db, &path)?,
        files: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_value_cleaning() {
        assert_eq!(to_int(Some("1,234")), Some(1234));
        assert_eq!(to_int(Some("12T")), Some(12));
        assert_eq!(to_int(Some("65%")), Some(65));
        assert_eq!(to_int(Some("-")), None);
        assert_eq!(to_int(Some("")), None);
        assert_eq!(to_int(None), None);
        assert_eq!(to_int(Some("abc")), None);

        assert_eq!(to_float(Some("64.5%")), Some(64.5));
        assert_eq!(to_float(Some("1,024.5")), Some(1024.5));
        assert_eq!(to_float(Some("-")), None);

        assert_eq!(to_date(Some("2001-08-16")), Some(date(2001, 8, 16)));
        assert_eq!(to_date(Some("16/08/2001")), None);

        assert_eq!(clean_text(Some("-")), None);
        assert_eq!(clean_text(Some(" +2 ")), Some("+2".to_string()));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  novak DJOKOVIC "), "Novak Djokovic");
        assert_eq!(normalize_name("felix auger-aliassime"), "Felix Auger-Aliassime");
        assert_eq!(normalize_name("o'connell"), "O'Connell");
    }

    #[test]
    fn test_bio_normalization_helpers() {
        assert_eq!(parse_height("6' 2\" (188cm)"), Some((6, 2, 188)));
        assert_eq!(parse_height("188cm"), None);
        assert_eq!(parse_weight("183 lbs (83kg)"), Some((183, 83)));
        assert_eq!(parse_birth_date("37 (1987/05/22)"), Some(date(1987, 5, 22)));
        assert_eq!(
            parse_career_high("Career High Rank (2016.11.07)", "1"),
            Some((Some(1), Some(date(2016, 11, 7))))
        );
        assert_eq!(parse_career_high("Titles", "3"), None);
    }

    #[test]
    fn test_bio_patterns_compile_once_and_are_reused() {
        for pattern in [&HEIGHT_IMPERIAL, &HEIGHT_METRIC, &WEIGHT, &BIRTH_DATE, &CAREER_HIGH_DATE] {
            assert!(pattern.is_some());
        }
        let before = HEIGHT_METRIC.as_ref().map(|r| r as *const Regex);
        for _ in 0..3 {
            assert_eq!(parse_height("6' 6\" (198cm)"), Some((6, 6, 198)));
        }
        assert_eq!(HEIGHT_METRIC.as_ref().map(|r| r as *const Regex), before);
    }

    #[test]
    fn test_import_players() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("players.json");
        std::fs::write(
            &path,
            r#"[
                {
                    "name": "jannik sinner",
                    "url": "https://example.org/sinner",
                    "birth_date": "2001-08-16",
                    "height_cm": "191",
                    "weight_kg": "-",
                    "Overview": {
                        "Country": "Italy",
                        "Plays": "Right-Handed, Two-Handed Backhand",
                        "Turned pro": "2018",
                        "Weight": "170 lbs (77kg)"
                    },
                    "Stats": {
                        "Serve": {"Aces": "1,234", "1st Serve": "62%"},
                        "Return": {"Break Points Converted": "42%"}
                    },
                    "YTD": {"Rank": "1", "Move": "-", "W-L": "73-6", "Titles": "8"},
                    "Career": {"W-L": "250-80", "Titles": "19", "Career High Rank (2024.06.10)": "1"}
                },
                {
                    "name": "Qualifier Player",
                    "Overview": "-",
                    "Stats": "-",
                    "YTD": "-",
                    "Career": null
                },
                {"url": "missing-name"}
            ]"#,
        )
        .unwrap();

        let db = Database::in_memory().unwrap();
        assert_eq!(import_players(&db, &path).unwrap(), 2);

        let sinner = db.find_player_by_name("Jannik Sinner").unwrap().unwrap();
        assert_eq!(sinner.bio.height_cm, Some(191));
        assert_eq!(sinner.bio.weight_kg, Some(77));
        assert_eq!(sinner.bio.turned_pro, Some(2018));
        assert_eq!(sinner.bio.career_high_rank, Some(1));
        assert_eq!(sinner.bio.career_high_rank_date, Some(date(2024, 6, 10)));

        let stats = db.get_stats_for(&sinner.id).unwrap().unwrap();
        assert_eq!(stats.aces, Some(1234));
        assert_eq!(stats.first_serve_pct, Some(62.0));
        assert_eq!(stats.break_points_converted, Some(42.0));

        let ytd = db.get_record(&sinner.id, Season::YearToDate).unwrap().unwrap();
        assert_eq!(ytd.rank, Some(1));
        assert_eq!(ytd.movement, None);
        assert_eq!(ytd.titles, Some(8));

        let qualifier = db.find_player_by_name("Qualifier Player").unwrap().unwrap();
        assert_eq!(qualifier.bio.country, None);
        assert!(db.get_stats_for(&qualifier.id).unwrap().is_some());

        // Re-import overwrites instead of duplicating
        import_players(&db, &path).unwrap();
        assert_eq!(db.get_stats().unwrap().player_count, 2);
    }

    #[test]
    fn test_import_rankings_folder_and_latest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("2024-06-03.json"),
            r#"[
                {"Rank": "1", "Player": "novak djokovic", "Age": "37", "Points": "9,960",
                 "Rank_change": "-", "Tournaments": "17", "Country": "SRB"},
                {"Rank": "2T", "Player": "Jannik Sinner", "Points": "8770", "Country": "ITA"}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("2024-06-10.json"),
            r#"[
                {"Rank": 1, "Player": "Jannik Sinner", "Points": 9525, "Rank_change": "+1"},
                {"Rank": "2", "Player": "Novak Djokovic", "Points": "8360"}
            ]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let db = Database::in_memory().unwrap();
        let summary = import_rankings(&db, dir.path()).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.rankings, 4);
        assert_eq!(db.get_stats().unwrap().player_count, 2);

        let djokovic = db.find_player_by_name("Novak Djokovic").unwrap().unwrap();
        assert_eq!(djokovic.bio.country.as_deref(), Some("SRB"));
        let latest = db.latest_ranking(&djokovic.id).unwrap().unwrap();
        assert_eq!(latest.rank, Some(2));
        assert_eq!(latest.points, Some(8360));

        let first_week = db.rankings_on(Some(date(2024, 6, 3)), None).unwrap();
        assert_eq!(first_week[0].1.entry.age, Some(37));
        assert_eq!(first_week[0].1.entry.tournaments, Some(17));
        assert_eq!(first_week[0].1.entry.rank_change, None);
        assert_eq!(first_week[1].1.entry.rank, Some(2));

        let fresh = Database::in_memory().unwrap();
        let latest_only = import_latest_ranking(&fresh, dir.path()).unwrap();
        assert_eq!(latest_only.rankings, 2);
        assert_eq!(fresh.ranking_dates().unwrap(), vec![date(2024, 6, 10)]);
    }

    #[test]
    fn test_ranking_age_from_birth_date() {
        let db = Database::in_memory().unwrap();
        db.upsert_player(&PlayerBio {
            birth_date: Some(date(2003, 5, 5)),
            ..PlayerBio::named("Carlos Alcaraz")
        })
        .unwrap();

        let rows = vec![RankingRow {
            rank: Some("3".to_string()),
            player: Some("carlos alcaraz".to_string()),
            age: Some("99".to_string()),
            ..Default::default()
        }];
        import_ranking_rows(&db, date(2024, 6, 10), &rows).unwrap();

        let player = db.find_player_by_name("Carlos Alcaraz").unwrap().unwrap();
        assert_eq!(db.latest_ranking(&player.id).unwrap().unwrap().age, Some(21));
    }

    #[test]
    fn test_bad_file_name_and_empty_folder() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("latest.json");
        std::fs::write(&bad, "[]").unwrap();

        let db = Database::in_memory().unwrap();
        assert!(matches!(import_ranking_file(&db, &bad), Err(TennisError::Parse(_))));
        assert!(matches!(
            import_latest_ranking(&db, dir.path()),
            Err(TennisError::InvalidInput(_))
        ));
    }
}
