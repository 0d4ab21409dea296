//! Canonical player ordering
//!
//! The classifier was fit on rows where Player1 is the better-ranked entrant.
//! Rows built in caller order are relabeled so the model always sees that
//! orientation, and directional columns are flipped to match.

use super::row::FeatureRow;
use super::schema::{self, Role, COMPLEMENT_COLUMNS, DIRECTIONAL_COLUMNS};
use crate::{Result, TennisError};

/// True when Player1's rank is numerically higher (worse) than Player2's.
///
/// Two unranked players (999 vs 999) keep their original order.
pub fn rank_order_swaps(p1_rank: u32, p2_rank: u32) -> bool {
    p1_rank > p2_rank
}

/// Swap decision read from a row's rank columns.
///
/// A schema without both rank columns cannot be ordered and is rejected.
pub fn needs_swap(row: &FeatureRow) -> Result<bool> {
    let rank1 = Role::Player1.column(schema::RANK);
    let rank2 = Role::Player2.column(schema::RANK);
    match (row.get(&rank1), row.get(&rank2)) {
        (Some(r1), Some(r2)) => Ok(r1 > r2),
        _ => Err(TennisError::Configuration(format!(
            "feature schema needs both {} and {} to order players",
            rank1, rank2
        ))),
    }
}

/// Exchange the Player1/Player2 roles of a row.
///
/// Produces a new row: every role column takes its partner's value read from
/// the untouched input, directional columns are negated and Player1-share
/// columns complemented. Applying it twice yields the original row.
pub fn swap_roles(row: &FeatureRow) -> FeatureRow {
    let schema = row.schema().clone();
    let source = row.values();

    let values = (0..schema.len())
        .map(|i| match schema.partner(i) {
            Some(j) => source[j],
            None => source[i],
        })
        .collect();
    let mut swapped = FeatureRow::from_values(schema, values);

    for column in DIRECTIONAL_COLUMNS {
        swapped.update(column, |x| -x);
    }
    for column in COMPLEMENT_COLUMNS {
        swapped.update(column, |x| 1.0 - x);
    }
    swapped
}

/// A row in the orientation the classifier expects
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub row: FeatureRow,
    /// Whether the caller's players were exchanged to reach canonical order
    pub swapped: bool,
}

/// Apply an already-made swap decision to a caller-ordered row
pub fn orient(row: FeatureRow, swap: bool) -> CanonicalRow {
    if swap {
        CanonicalRow {
            row: swap_roles(&row),
            swapped: true,
        }
    } else {
        CanonicalRow {
            row,
            swapped: false,
        }
    }
}

/// Put a caller-ordered row into canonical order using its rank columns
pub fn canonicalize(row: FeatureRow) -> Result<CanonicalRow> {
    let swap = needs_swap(&row)?;
    Ok(orient(row, swap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureBuilder, FeatureSchema};
    use crate::{BestOf, Hand, MatchContext, PlayerSnapshot, Round, Surface, TourneyLevel, UNRANKED};
    use std::sync::Arc;

    fn context() -> MatchContext {
        MatchContext {
            tourney_level: TourneyLevel::Masters,
            surface: Surface::Hard,
            round: Round::new(3).unwrap(),
            best_of: BestOf::Three,
            draw_size: 96,
        }
    }

    fn snapshot(rank: u32, points: u32, height_cm: u32, hand: Hand, age: u32) -> PlayerSnapshot {
        PlayerSnapshot {
            rank,
            points,
            height_cm,
            age,
            hand,
            seed: 0,
        }
    }

    fn build(p1: &PlayerSnapshot, p2: &PlayerSnapshot) -> FeatureRow {
        FeatureBuilder::new(Arc::new(FeatureSchema::standard()))
            .unwrap()
            .build(p1, p2, &context())
    }

    #[test]
    fn test_no_swap_when_player1_better_ranked() {
        let row = build(
            &snapshot(1, 10000, 188, Hand::Right, 37),
            &snapshot(50, 1100, 185, Hand::Left, 24),
        );
        let canonical = canonicalize(row.clone()).unwrap();
        assert!(!canonical.swapped);
        assert_eq!(canonical.row, row);
        assert_eq!(canonical.row.get("rank_diff"), Some(-49.0));
    }

    #[test]
    fn test_swap_relabels_and_flips() {
        let underdog = snapshot(80, 700, 193, Hand::Left, 22);
        let favourite = snapshot(3, 7000, 185, Hand::Right, 26);
        let raw = build(&underdog, &favourite);
        assert_eq!(raw.get("rank_diff"), Some(77.0));

        let canonical = canonicalize(raw.clone()).unwrap();
        assert!(canonical.swapped);
        let row = &canonical.row;

        assert_eq!(row.get("Player1_rank"), Some(3.0));
        assert_eq!(row.get("Player2_rank"), Some(80.0));
        assert_eq!(row.get("Player1_rank_points"), Some(7000.0));
        assert_eq!(row.get("Player1_hand_R"), Some(1.0));
        assert_eq!(row.get("Player2_hand_R"), Some(0.0));
        assert_eq!(row.get("Player1_age"), Some(26.0));
        assert_eq!(row.get("Player2_ht"), Some(193.0));

        assert_eq!(row.get("rank_diff"), Some(-77.0));
        assert_eq!(row.get("points_diff"), Some(6300.0));
        assert_eq!(row.get("height_diff"), Some(-8.0));
        assert_eq!(
            row.get("relative_rank_strength"),
            Some(-raw.get("relative_rank_strength").unwrap())
        );
        assert_eq!(row.get("h2h_p1_winrate"), Some(0.5));

        // Role-free columns are untouched
        for column in ["draw_size", "best_of", "round_encoded", "surface_Hard", "tourney_level_M"] {
            assert_eq!(row.get(column), raw.get(column), "{}", column);
        }
    }

    #[test]
    fn test_swapped_row_matches_row_built_in_canonical_order() {
        let a = snapshot(80, 700, 193, Hand::Left, 22);
        let b = snapshot(3, 7000, 185, Hand::Right, 26);
        let swapped = swap_roles(&build(&a, &b));
        let direct = build(&b, &a);
        for (column, value) in direct.iter() {
            let got = swapped.get(column).unwrap();
            assert!((got - value).abs() < 1e-12, "{}: {} vs {}", column, got, value);
        }
    }

    #[test]
    fn test_swap_is_an_involution() {
        let mut row = build(
            &snapshot(42, 1500, 178, Hand::Right, 30),
            &snapshot(7, 4100, 198, Hand::Unknown, 21),
        );
        row.set("h2h_p1_winrate", 0.25);

        let once = swap_roles(&row);
        assert!(!needs_swap(&once).unwrap());
        assert_eq!(once.get("h2h_p1_winrate"), Some(0.75));

        let twice = swap_roles(&once);
        assert_eq!(twice, row);
    }

    #[test]
    fn test_canonicalize_is_stable() {
        let row = build(
            &snapshot(60, 900, 180, Hand::Right, 25),
            &snapshot(10, 3000, 180, Hand::Right, 25),
        );
        let first = canonicalize(row).unwrap();
        let second = canonicalize(first.row.clone()).unwrap();
        assert!(first.swapped);
        assert!(!second.swapped);
        assert_eq!(second.row, first.row);
    }

    #[test]
    fn test_both_unranked_keeps_caller_order() {
        let row = build(&PlayerSnapshot::default(), &PlayerSnapshot::default());
        assert!(!needs_swap(&row).unwrap());
        assert!(!canonicalize(row).unwrap().swapped);
        assert!(!rank_order_swaps(UNRANKED, UNRANKED));
    }

    #[test]
    fn test_rank_order_swaps() {
        assert!(rank_order_swaps(80, 3));
        assert!(!rank_order_swaps(3, 80));
        assert!(!rank_order_swaps(5, 5));
    }

    #[test]
    fn test_row_without_rank_columns_rejected() {
        let schema = Arc::new(
            FeatureSchema::from_columns(vec![
                "Player1_ht".to_string(),
                "Player2_ht".to_string(),
                "height_diff".to_string(),
            ])
            .unwrap(),
        );
        let row = FeatureRow::from_named(schema, [("Player1_ht", 190.0), ("Player2_ht", 180.0)]);
        assert!(matches!(needs_swap(&row), Err(TennisError::Configuration(_))));
        assert!(matches!(canonicalize(row), Err(TennisError::Configuration(_))));
    }
}
