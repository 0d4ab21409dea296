//! Data ingestion and storage
//!
//! Player and ranking models, the SQLite store, JSON import and the
//! rankings scraper.

pub mod database;
pub mod import;
pub mod models;
pub mod repository;
pub mod scrapers;

pub use database::{Database, DatabaseStats};
pub use import::{ImportSummary, RankingRow};
pub use models::{Player, PlayerBio, PlayerRecord, PlayerStats, RankedPlayer, Ranking, RankingEntry, Season};
pub use repository::PlayerRepository;
