//! Feature row construction from two player snapshots and a match context

use std::path::Path;
use std::sync::Arc;

use super::row::FeatureRow;
use super::schema::{self, FeatureSchema, Role};
use crate::{MatchContext, PlayerSnapshot, Result, TennisError};

/// Head-to-head win rate used while no match history is tracked
pub const NEUTRAL_H2H_WINRATE: f64 = 0.5;

/// Writes player and context attributes into schema-ordered rows
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    schema: Arc<FeatureSchema>,
}

impl FeatureBuilder {
    pub fn new(schema: Arc<FeatureSchema>) -> Result<Self> {
        if schema.is_empty() {
            return Err(TennisError::Configuration(
                "cannot build features against an empty schema".to_string(),
            ));
        }
        Ok(FeatureBuilder { schema })
    }

    /// Load the schema from disk and build on it
    pub fn from_schema_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(Arc::new(FeatureSchema::load(path)?))
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Build the raw (caller-ordered) row for `p1` vs `p2`
    pub fn build(&self, p1: &PlayerSnapshot, p2: &PlayerSnapshot, ctx: &MatchContext) -> FeatureRow {
        let mut row = FeatureRow::zeros(self.schema.clone());

        write_player(&mut row, Role::Player1, p1);
        write_player(&mut row, Role::Player2, p2);

        row.set(schema::DRAW_SIZE, ctx.draw_size as f64);
        row.set(schema::BEST_OF, ctx.best_of.sets() as f64);
        row.set(schema::ROUND, ctx.round.ordinal() as f64);
        if !row.set(&ctx.surface.column(), 1.0) {
            log::debug!("Surface {} has no schema column; all surface flags stay 0", ctx.surface);
        }
        if !row.set(&ctx.tourney_level.column(), 1.0) {
            log::debug!(
                "Tourney level {} has no schema column; all level flags stay 0",
                ctx.tourney_level
            );
        }

        if p1.is_ranked() && p2.is_ranked() {
            let r1 = p1.rank as f64;
            let r2 = p2.rank as f64;
            row.set(schema::RANK_DIFF, r1 - r2);
            row.set(schema::POINTS_DIFF, p1.points as f64 - p2.points as f64);
            if r1 + r2 != 0.0 {
                row.set(schema::RELATIVE_RANK_STRENGTH, (r1 - r2) / (r1 + r2));
            }
        }

        row.set(schema::HEIGHT_DIFF, p1.height_cm as f64 - p2.height_cm as f64);
        row.set(schema::H2H_P1_WINRATE, NEUTRAL_H2H_WINRATE);

        row
    }
}

fn write_player(row: &mut FeatureRow, role: Role, player: &PlayerSnapshot) {
    row.set(&role.column(schema::RANK), player.rank as f64);
    row.set(&role.column(schema::RANK_POINTS), player.points as f64);
    row.set(&role.column(schema::HEIGHT), player.height_cm as f64);
    row.set(&role.column(schema::AGE), player.age as f64);
    row.set(&role.column(schema::SEED), player.seed as f64);
    row.set(
        &role.column(schema::HAND_RIGHT),
        if player.hand.is_right() { 1.0 } else { 0.0 },
    );
    // Alternate entry types (qualifier, wildcard, ...) are not modelled
    row.set(&role.column(schema::ENTRY_DIRECT), 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BestOf, Hand, Round, Surface, TourneyLevel, UNRANKED};

    fn builder() -> FeatureBuilder {
        FeatureBuilder::new(Arc::new(FeatureSchema::standard())).unwrap()
    }

    fn context() -> MatchContext {
        MatchContext {
            tourney_level: TourneyLevel::GrandSlam,
            surface: Surface::Clay,
            round: Round::new(4).unwrap(),
            best_of: BestOf::Five,
            draw_size: 128,
        }
    }

    fn player(rank: u32, points: u32, height_cm: u32) -> PlayerSnapshot {
        PlayerSnapshot {
            rank,
            points,
            height_cm,
            age: 27,
            hand: Hand::Right,
            seed: 0,
        }
    }

    #[test]
    fn test_player_columns_written_by_role() {
        let p1 = player(1, 11000, 188);
        let p2 = PlayerSnapshot {
            hand: Hand::Left,
            seed: 7,
            ..player(50, 900, 183)
        };
        let row = builder().build(&p1, &p2, &context());

        assert_eq!(row.get("Player1_rank"), Some(1.0));
        assert_eq!(row.get("Player2_rank"), Some(50.0));
        assert_eq!(row.get("Player1_rank_points"), Some(11000.0));
        assert_eq!(row.get("Player1_hand_R"), Some(1.0));
        assert_eq!(row.get("Player2_hand_R"), Some(0.0));
        assert_eq!(row.get("Player2_seed"), Some(7.0));
        assert_eq!(row.get("Player1_entry_Direct"), Some(1.0));
        assert_eq!(row.get("Player2_entry_Direct"), Some(1.0));
    }

    #[test]
    fn test_context_and_one_hot_columns() {
        let row = builder().build(&player(3, 0, 180), &player(9, 0, 180), &context());

        assert_eq!(row.get("draw_size"), Some(128.0));
        assert_eq!(row.get("best_of"), Some(5.0));
        assert_eq!(row.get("round_encoded"), Some(4.0));
        assert_eq!(row.get("surface_Clay"), Some(1.0));
        assert_eq!(row.get("surface_Hard"), Some(0.0));
        assert_eq!(row.get("tourney_level_G"), Some(1.0));
        assert_eq!(row.get("tourney_level_M"), Some(0.0));
    }

    #[test]
    fn test_engineered_columns_for_ranked_players() {
        let row = builder().build(&player(1, 9000, 190), &player(50, 1000, 185), &context());

        assert_eq!(row.get("rank_diff"), Some(-49.0));
        assert_eq!(row.get("points_diff"), Some(8000.0));
        assert_eq!(row.get("relative_rank_strength"), Some(-49.0 / 51.0));
        assert_eq!(row.get("height_diff"), Some(5.0));
        assert_eq!(row.get("h2h_p1_winrate"), Some(0.5));
    }

    #[test]
    fn test_unranked_player_leaves_rank_features_at_default() {
        let unranked = PlayerSnapshot::default();
        let row = builder().build(&player(12, 2500, 196), &unranked, &context());

        assert_eq!(row.get("Player2_rank"), Some(UNRANKED as f64));
        assert_eq!(row.get("rank_diff"), Some(0.0));
        assert_eq!(row.get("points_diff"), Some(0.0));
        assert_eq!(row.get("relative_rank_strength"), Some(0.0));
        // Height is still compared, against the 180cm default
        assert_eq!(row.get("height_diff"), Some(16.0));
    }

    #[test]
    fn test_tied_ranks_give_zero_strength() {
        let row = builder().build(&player(5, 3000, 180), &player(5, 3000, 180), &context());
        assert_eq!(row.get("relative_rank_strength"), Some(0.0));
        assert_eq!(row.get("rank_diff"), Some(0.0));
    }

    #[test]
    fn test_every_schema_column_present_for_custom_schema() {
        let schema = FeatureSchema::from_columns(
            ["Player1_rank", "Player2_rank", "surface_Hard", "elo_diff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();
        let builder = FeatureBuilder::new(Arc::new(schema)).unwrap();
        let row = builder.build(&player(2, 0, 180), &player(4, 0, 180), &context());

        assert_eq!(row.values().len(), 4);
        assert_eq!(row.get("elo_diff"), Some(0.0));
        // Clay has no column here, so the surface family stays at 0
        assert_eq!(row.get("surface_Hard"), Some(0.0));
        assert_eq!(row.get("rank_diff"), None);
    }

    #[test]
    fn test_missing_schema_file_fails_configuration() {
        let err = FeatureBuilder::from_schema_file("/nonexistent/model_features.json").unwrap_err();
        assert!(matches!(err, TennisError::Configuration(_)));
    }
}
