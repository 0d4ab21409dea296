//! Request-level prediction entry point
//!
//! Validates a matchup request, resolves both players through the
//! repository and runs the symmetric predictor.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::inference::Predictor;
use crate::data::repository::snapshot_of;
use crate::data::PlayerRepository;
use crate::model::Classifier;
use crate::{
    BestOf, MatchContext, PlayerId, PlayerSnapshot, Result, Round, Surface, TennisError, TourneyLevel,
    DEFAULT_DRAW_SIZE,
};

/// A matchup as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    /// Level code or label, e.g. "G" or "tourney_level_G"
    pub tourney_level: String,
    /// Surface name, e.g. "Clay" or "surface_Clay"
    pub surface: String,
    pub round: i64,
    pub best_of: i64,
    #[serde(default)]
    pub draw_size: Option<i64>,
    #[serde(default)]
    pub player1_seed: Option<i64>,
    #[serde(default)]
    pub player2_seed: Option<i64>,
}

/// Validated request fields
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub context: MatchContext,
    pub player1_seed: u32,
    pub player2_seed: u32,
}

fn seed(value: Option<i64>, which: &str) -> Result<u32> {
    match value {
        None => Ok(0),
        Some(s) => u32::try_from(s)
            .map_err(|_| TennisError::InvalidInput(format!("{} seed must be >= 0, got {}", which, s))),
    }
}

impl PredictionRequest {
    /// Check every field against its domain
    pub fn validate(&self) -> Result<ValidatedRequest> {
        if self.player1_id.as_str().trim().is_empty() || self.player2_id.as_str().trim().is_empty() {
            return Err(TennisError::InvalidInput("both players are required".to_string()));
        }
        if self.player1_id == self.player2_id {
            return Err(TennisError::InvalidInput(
                "a player cannot play against themselves".to_string(),
            ));
        }

        let draw_size = match self.draw_size {
            None => DEFAULT_DRAW_SIZE,
            Some(n) if n > 0 => u32::try_from(n)
                .map_err(|_| TennisError::InvalidInput(format!("draw size too large: {}", n)))?,
            Some(n) => {
                return Err(TennisError::InvalidInput(format!(
                    "draw size must be positive, got {}",
                    n
                )))
            }
        };

        Ok(ValidatedRequest {
            context: MatchContext {
                tourney_level: self.tourney_level.parse::<TourneyLevel>()?,
                surface: self.surface.parse::<Surface>()?,
                round: Round::new(self.round)?,
                best_of: BestOf::from_sets(self.best_of)?,
                draw_size,
            },
            player1_seed: seed(self.player1_seed, "player 1")?,
            player2_seed: seed(self.player2_seed, "player 2")?,
        })
    }
}

/// Named win probabilities returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupPrediction {
    pub p1_name: String,
    pub p2_name: String,
    pub p1_win_probability: f64,
    pub p2_win_probability: f64,
}

/// Prediction entry point over a player repository and a classifier
pub struct PredictionService<R: PlayerRepository, C: Classifier> {
    repository: R,
    predictor: Predictor<C>,
}

impl<R: PlayerRepository, C: Classifier> PredictionService<R, C> {
    pub fn new(repository: R, predictor: Predictor<C>) -> Self {
        PredictionService {
            repository,
            predictor,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Predict using today's date for player ages
    pub fn predict(&self, request: &PredictionRequest) -> Result<MatchupPrediction> {
        self.predict_as_of(request, chrono::Local::now().date_naive())
    }

    /// Predict with player ages computed on `today`
    pub fn predict_as_of(
        &self,
        request: &PredictionRequest,
        today: NaiveDate,
    ) -> Result<MatchupPrediction> {
        let validated = request.validate()?;

        let (p1, p1_snapshot) = self.lookup(&request.player1_id, today)?;
        let (p2, p2_snapshot) = self.lookup(&request.player2_id, today)?;
        let p1_snapshot = p1_snapshot.with_seed(validated.player1_seed);
        let p2_snapshot = p2_snapshot.with_seed(validated.player2_seed);

        let result = self
            .predictor
            .predict(&p1_snapshot, &p2_snapshot, &validated.context)?;
        log::info!(
            "{} vs {}: {:.3} / {:.3}",
            p1,
            p2,
            result.p1_win_probability,
            result.p2_win_probability
        );

        Ok(MatchupPrediction {
            p1_name: p1,
            p2_name: p2,
            p1_win_probability: result.p1_win_probability,
            p2_win_probability: result.p2_win_probability,
        })
    }

    /// Player name and snapshot, reading the player record once
    fn lookup(&self, id: &PlayerId, today: NaiveDate) -> Result<(String, PlayerSnapshot)> {
        let player = self
            .repository
            .player(id)?
            .ok_or_else(|| TennisError::PlayerNotFound(id.clone()))?;
        let ranking = self.repository.latest_ranking(id)?;
        let snapshot = snapshot_of(&player, ranking.as_ref(), today);
        Ok((player.bio.name, snapshot))
    }
}
