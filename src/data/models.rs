//! Stored player entities

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Hand, PlayerId};

/// Biographical attributes of a player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerBio {
    pub name: String,
    pub url: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub birthplace: Option<String>,
    /// Free text such as "Right-Handed, Two-Handed Backhand"
    pub plays: Option<String>,
    pub coach: Option<String>,
    pub turned_pro: Option<i32>,
    pub weight_lbs: Option<u32>,
    pub weight_kg: Option<u32>,
    pub height_cm: Option<u32>,
    pub height_feet: Option<u32>,
    pub height_inches: Option<u32>,
    pub career_high_rank: Option<u32>,
    pub career_high_rank_date: Option<NaiveDate>,
}

impl PlayerBio {
    pub fn named(name: &str) -> Self {
        PlayerBio {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// A stored player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub bio: PlayerBio,
}

impl Player {
    pub fn name(&self) -> &str {
        &self.bio.name
    }

    pub fn hand(&self) -> Hand {
        Hand::from_plays(self.bio.plays.as_deref())
    }

    /// Age in whole years on `date`, if the birth date is known
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        self.bio.birth_date.and_then(|birth| age_on(birth, date))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.bio.name, self.id)
    }
}

/// Whole years between `birth` and `date`; None if `date` is before birth
pub fn age_on(birth: NaiveDate, date: NaiveDate) -> Option<u32> {
    let had_birthday = (date.month(), date.day()) >= (birth.month(), birth.day());
    let years = date.year() - birth.year() - if had_birthday { 0 } else { 1 };
    u32::try_from(years).ok()
}

/// Serve and return statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub aces: Option<i64>,
    pub double_faults: Option<i64>,
    pub first_serve_pct: Option<f64>,
    pub first_serve_points_won: Option<f64>,
    pub second_serve_points_won: Option<f64>,
    pub break_points_faced: Option<i64>,
    pub break_points_saved: Option<f64>,
    pub service_games_played: Option<i64>,
    pub service_games_won: Option<f64>,
    pub total_service_points_won: Option<f64>,
    pub first_serve_return_points_won: Option<f64>,
    pub second_serve_return_points_won: Option<f64>,
    pub break_points_opportunities: Option<i64>,
    pub break_points_converted: Option<f64>,
    pub return_games_played: Option<i64>,
    pub return_games_won: Option<f64>,
    pub return_points_won: Option<f64>,
    pub total_points_won: Option<f64>,
}

/// Season a win/loss record covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    YearToDate,
    Career,
}

impl Season {
    pub fn code(&self) -> &'static str {
        match self {
            Season::YearToDate => "YTD",
            Season::Career => "Career",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "YTD" => Some(Season::YearToDate),
            "Career" => Some(Season::Career),
            _ => None,
        }
    }
}

/// Win/loss summary for a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub season: Season,
    pub rank: Option<u32>,
    pub movement: Option<String>,
    pub wl_record: Option<String>,
    pub titles: Option<u32>,
    pub prize_money: Option<String>,
}

/// One row of a weekly ranking snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: Option<u32>,
    pub rank_change: Option<String>,
    pub age: Option<u32>,
    pub points: Option<u32>,
    pub earn_drop: Option<String>,
    pub tournaments: Option<u32>,
    pub dropping: Option<String>,
    pub next_best: Option<String>,
    pub country: Option<String>,
}

/// A ranking entry with its snapshot date and player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub player_id: PlayerId,
    pub date: NaiveDate,
    pub entry: RankingEntry,
}

/// A player with their latest ranking, as listed for prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player: Player,
    pub rank: u32,
    pub points: Option<u32>,
}
