//! ATP player tracking and match outcome prediction
//!
//! Player bios and weekly rankings are imported into SQLite, and a trained
//! classifier predicts head-to-head win probabilities from a feature row that
//! is always presented to the model in canonical (better-ranked first) order.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rank recorded for a player with no current ranking
pub const UNRANKED: u32 = 999;
/// Height used when a player's bio has none
pub const DEFAULT_HEIGHT_CM: u32 = 180;
/// Age used when a player's birth date is unknown
pub const DEFAULT_AGE: u32 = 25;
/// Draw size assumed when the caller gives none
pub const DEFAULT_DRAW_SIZE: u32 = 128;

/// Unique identifier for a player (5 uppercase alphanumerics)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dominant hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Hand {
    Right,
    Left,
    #[default]
    Unknown,
}

impl Hand {
    /// Interpret a free-text "Plays" field such as "Right-Handed, Two-Handed Backhand"
    pub fn from_plays(plays: Option<&str>) -> Self {
        match plays {
            Some(p) if p.contains("Right") => Hand::Right,
            Some(p) if p.contains("Left") => Hand::Left,
            _ => Hand::Unknown,
        }
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Hand::Right)
    }
}

/// Court surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Hard,
    Clay,
    Grass,
    Carpet,
}

impl Surface {
    pub const ALL: [Surface; 4] = [Surface::Hard, Surface::Clay, Surface::Grass, Surface::Carpet];

    pub fn name(&self) -> &'static str {
        match self {
            Surface::Hard => "Hard",
            Surface::Clay => "Clay",
            Surface::Grass => "Grass",
            Surface::Carpet => "Carpet",
        }
    }

    /// One-hot column carrying this surface
    pub fn column(&self) -> String {
        format!("surface_{}", self.name())
    }
}

impl FromStr for Surface {
    type Err = TennisError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().trim_start_matches("surface_").to_lowercase();
        Surface::ALL
            .into_iter()
            .find(|surface| surface.name().to_lowercase() == key)
            .ok_or_else(|| TennisError::InvalidInput(format!("unknown surface: {}", s)))
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tournament level as coded in ATP match data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TourneyLevel {
    Atp,
    DavisCup,
    TourFinals,
    GrandSlam,
    Masters,
    Olympics,
}

impl TourneyLevel {
    pub const ALL: [TourneyLevel; 6] = [
        TourneyLevel::Atp,
        TourneyLevel::DavisCup,
        TourneyLevel::TourFinals,
        TourneyLevel::GrandSlam,
        TourneyLevel::Masters,
        TourneyLevel::Olympics,
    ];

    /// Single-letter level code
    pub fn code(&self) -> &'static str {
        match self {
            TourneyLevel::Atp => "A",
            TourneyLevel::DavisCup => "D",
            TourneyLevel::TourFinals => "F",
            TourneyLevel::GrandSlam => "G",
            TourneyLevel::Masters => "M",
            TourneyLevel::Olympics => "O",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TourneyLevel::Atp => "ATP",
            TourneyLevel::DavisCup => "Davis Cup",
            TourneyLevel::TourFinals => "Tour Finals",
            TourneyLevel::GrandSlam => "Grand Slam",
            TourneyLevel::Masters => "Masters",
            TourneyLevel::Olympics => "Olympics",
        }
    }

    /// One-hot column carrying this level
    pub fn column(&self) -> String {
        format!("tourney_level_{}", self.code())
    }
}

impl FromStr for TourneyLevel {
    type Err = TennisError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().trim_start_matches("tourney_level_");
        TourneyLevel::ALL
            .into_iter()
            .find(|level| {
                level.code().eq_ignore_ascii_case(key) || level.label().eq_ignore_ascii_case(key)
            })
            .ok_or_else(|| TennisError::InvalidInput(format!("unknown tourney level: {}", s)))
    }
}

impl fmt::Display for TourneyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Match format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BestOf {
    Three,
    Five,
}

impl BestOf {
    pub fn sets(&self) -> u32 {
        match self {
            BestOf::Three => 3,
            BestOf::Five => 5,
        }
    }

    pub fn from_sets(sets: i64) -> Result<Self> {
        match sets {
            3 => Ok(BestOf::Three),
            5 => Ok(BestOf::Five),
            other => Err(TennisError::InvalidInput(format!(
                "best_of must be 3 or 5, got {}",
                other
            ))),
        }
    }
}

/// Ordinal round of a draw, 1 (round of 128) through 6 (final)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Round(u8);

impl Round {
    pub const FIRST: u8 = 1;
    pub const FINAL: u8 = 6;

    pub fn new(ordinal: i64) -> Result<Self> {
        if (Self::FIRST as i64..=Self::FINAL as i64).contains(&ordinal) {
            Ok(Round(ordinal as u8))
        } else {
            Err(TennisError::InvalidInput(format!(
                "round must be between {} and {}, got {}",
                Self::FIRST,
                Self::FINAL,
                ordinal
            )))
        }
    }

    pub fn ordinal(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Round of 128",
            2 => "Round of 64",
            3 => "Round of 32",
            4 => "Quarterfinal",
            5 => "Semifinal",
            _ => "Final",
        }
    }
}

/// A player as seen at prediction time: bio joined with the latest ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Current rank, or [`UNRANKED`]
    pub rank: u32,
    pub points: u32,
    pub height_cm: u32,
    pub age: u32,
    pub hand: Hand,
    pub seed: u32,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        PlayerSnapshot {
            rank: UNRANKED,
            points: 0,
            height_cm: DEFAULT_HEIGHT_CM,
            age: DEFAULT_AGE,
            hand: Hand::Unknown,
            seed: 0,
        }
    }
}

impl PlayerSnapshot {
    pub fn is_ranked(&self) -> bool {
        self.rank != UNRANKED
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

/// Conditions of the match being predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchContext {
    pub tourney_level: TourneyLevel,
    pub surface: Surface,
    pub round: Round,
    pub best_of: BestOf,
    pub draw_size: u32,
}

/// Win probabilities in the caller's (Player 1, Player 2) orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub p1_win_probability: f64,
    pub p2_win_probability: f64,
}

impl PredictionResult {
    /// Build from Player 1's win probability, clamped into [0, 1]
    pub fn from_p1(p1_win: f64) -> Self {
        let p1 = p1_win.clamp(0.0, 1.0);
        PredictionResult {
            p1_win_probability: p1,
            p2_win_probability: (1.0 - p1).clamp(0.0, 1.0),
        }
    }

    /// True when Player 1 is the predicted winner
    pub fn p1_favoured(&self) -> bool {
        self.p1_win_probability >= 0.5
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum TennisError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Player not found with ID: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("Scraper failed: {message}")]
    Scraper { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, TennisError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub predict: PredictConfig,
    pub scraper: ScraperConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
    /// Model artifact path without extension
    pub model_path: String,
    /// JSON array of feature column names
    pub schema_path: String,
    /// Folder of dated ranking snapshots
    pub rankings_dir: String,
    /// Scraped player profiles
    #[serde(default = "default_players_path")]
    pub players_path: String,
}

fn default_players_path() -> String {
    "data/players.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_dims: Vec<usize>,
    pub dropout: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub label_column: String,
    /// Trailing share of the (chronological) dataset held out for validation
    pub validation_fraction: f64,
    /// Epochs without validation improvement before stopping
    pub early_stopping_patience: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// Only players ranked at or above this are offered for prediction
    pub max_listed_rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub rankings_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/tennis.db".to_string(),
                model_path: "model/tennis_model".to_string(),
                schema_path: "model/model_features.json".to_string(),
                rankings_dir: "data/rankings/ATP".to_string(),
                players_path: default_players_path(),
            },
            model: ModelConfig {
                hidden_dims: vec![64, 32],
                dropout: 0.1,
            },
            training: TrainingConfig {
                epochs: 200,
                learning_rate: 1e-3,
                label_column: "target".to_string(),
                validation_fraction: 0.2,
                early_stopping_patience: 25,
            },
            predict: PredictConfig {
                max_listed_rank: 300,
            },
            scraper: ScraperConfig {
                rankings_url: "https://www.atptour.com/en/rankings/singles?rankRange=0-5000"
                    .to_string(),
                user_agent: "tennis-predict/0.1".to_string(),
                timeout_secs: 30,
                max_attempts: 3,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TennisError::Configuration(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| TennisError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            TennisError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_from_plays() {
        assert_eq!(
            Hand::from_plays(Some("Right-Handed, Two-Handed Backhand")),
            Hand::Right
        );
        assert_eq!(Hand::from_plays(Some("Left-Handed")), Hand::Left);
        assert_eq!(Hand::from_plays(None), Hand::Unknown);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("surface_Clay".parse::<Surface>().unwrap(), Surface::Clay);
        assert_eq!("grass".parse::<Surface>().unwrap(), Surface::Grass);
        assert!("sand".parse::<Surface>().is_err());

        assert_eq!(
            "tourney_level_G".parse::<TourneyLevel>().unwrap(),
            TourneyLevel::GrandSlam
        );
        assert_eq!("masters".parse::<TourneyLevel>().unwrap(), TourneyLevel::Masters);
        assert_eq!(TourneyLevel::DavisCup.column(), "tourney_level_D");
    }

    #[test]
    fn test_round_and_best_of_domains() {
        assert_eq!(Round::new(6).unwrap().label(), "Final");
        assert!(Round::new(0).is_err());
        assert!(Round::new(7).is_err());
        assert_eq!(BestOf::from_sets(5).unwrap(), BestOf::Five);
        assert!(BestOf::from_sets(4).is_err());
    }

    #[test]
    fn test_prediction_result_clamps() {
        let result = PredictionResult::from_p1(1.0000001);
        assert_eq!(result.p1_win_probability, 1.0);
        assert_eq!(result.p2_win_probability, 0.0);

        let result = PredictionResult::from_p1(0.3);
        assert!((result.p1_win_probability + result.p2_win_probability - 1.0).abs() < 1e-12);
        assert!(!result.p1_favoured());
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.predict.max_listed_rank, 300);
        assert_eq!(parsed.data.schema_path, config.data.schema_path);
    }
}
