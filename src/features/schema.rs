//! Ordered model input columns
//!
//! The schema is fixed when the classifier is trained and is the sole
//! authority on the shape and order of a feature row.

use crate::{Result, Surface, TennisError, TourneyLevel};
use std::collections::HashMap;
use std::path::Path;

pub const PLAYER1_PREFIX: &str = "Player1_";
pub const PLAYER2_PREFIX: &str = "Player2_";

pub const RANK: &str = "rank";
pub const RANK_POINTS: &str = "rank_points";
pub const HEIGHT: &str = "ht";
pub const AGE: &str = "age";
pub const SEED: &str = "seed";
pub const HAND_RIGHT: &str = "hand_R";
pub const ENTRY_DIRECT: &str = "entry_Direct";

pub const DRAW_SIZE: &str = "draw_size";
pub const BEST_OF: &str = "best_of";
pub const ROUND: &str = "round_encoded";

pub const RANK_DIFF: &str = "rank_diff";
pub const POINTS_DIFF: &str = "points_diff";
pub const HEIGHT_DIFF: &str = "height_diff";
pub const RELATIVE_RANK_STRENGTH: &str = "relative_rank_strength";
pub const H2H_P1_WINRATE: &str = "h2h_p1_winrate";

/// Per-player fields, in the order the standard schema lists them
pub const PLAYER_FIELDS: [&str; 7] = [RANK, RANK_POINTS, HEIGHT, AGE, SEED, HAND_RIGHT, ENTRY_DIRECT];

/// Columns whose sign depends on which player is Player1
pub const DIRECTIONAL_COLUMNS: [&str; 4] = [RANK_DIFF, POINTS_DIFF, HEIGHT_DIFF, RELATIVE_RANK_STRENGTH];

/// Columns expressed as Player1's share, complemented on a role swap
pub const COMPLEMENT_COLUMNS: [&str; 1] = [H2H_P1_WINRATE];

/// Which side of the matchup a column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Player1,
    Player2,
}

impl Role {
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::Player1 => PLAYER1_PREFIX,
            Role::Player2 => PLAYER2_PREFIX,
        }
    }

    pub fn other(&self) -> Role {
        match self {
            Role::Player1 => Role::Player2,
            Role::Player2 => Role::Player1,
        }
    }

    /// Column name for a per-player field, e.g. `Player2_rank_points`
    pub fn column(&self, field: &str) -> String {
        format!("{}{}", self.prefix(), field)
    }

    /// Role and field of a role-prefixed column
    pub fn split(column: &str) -> Option<(Role, &str)> {
        if let Some(field) = column.strip_prefix(PLAYER1_PREFIX) {
            Some((Role::Player1, field))
        } else {
            column
                .strip_prefix(PLAYER2_PREFIX)
                .map(|field| (Role::Player2, field))
        }
    }
}

/// Authoritative ordered list of feature columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    /// For each column, the index of its opposite-role column (role-free columns map to None)
    partners: Vec<Option<usize>>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty, duplicate or unpaired role columns
    pub fn from_columns(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(TennisError::Configuration(
                "feature schema has no columns".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(TennisError::Configuration(format!(
                    "feature schema column {} is blank",
                    i
                )));
            }
            if index.insert(column.clone(), i).is_some() {
                return Err(TennisError::Configuration(format!(
                    "feature schema lists {} twice",
                    column
                )));
            }
        }

        let mut partners = Vec::with_capacity(columns.len());
        for column in &columns {
            let partner = match Role::split(column) {
                Some((role, field)) => {
                    let other = role.other().column(field);
                    match index.get(&other) {
                        Some(&j) => Some(j),
                        None => {
                            return Err(TennisError::Configuration(format!(
                                "feature schema has {} without {}",
                                column, other
                            )))
                        }
                    }
                }
                None => None,
            };
            partners.push(partner);
        }

        Ok(FeatureSchema {
            columns,
            index,
            partners,
        })
    }

    /// Load a schema from a JSON array of column names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TennisError::Configuration(format!(
                "cannot read feature schema {}: {}",
                path.display(),
                e
            ))
        })?;
        let columns: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            TennisError::Configuration(format!(
                "cannot parse feature schema {}: {}",
                path.display(),
                e
            ))
        })?;
        let schema = Self::from_columns(columns)?;
        log::debug!("Loaded {} feature columns from {}", schema.len(), path.display());
        Ok(schema)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.columns)?)?;
        Ok(())
    }

    /// The column layout produced by the ATP match preprocessing
    pub fn standard() -> Self {
        let mut columns = Vec::new();
        for role in [Role::Player1, Role::Player2] {
            columns.extend(PLAYER_FIELDS.iter().map(|field| role.column(field)));
        }
        columns.extend([DRAW_SIZE, BEST_OF, ROUND].map(String::from));
        columns.extend(Surface::ALL.iter().map(Surface::column));
        columns.extend(TourneyLevel::ALL.iter().map(TourneyLevel::column));
        columns.extend(
            [RANK_DIFF, POINTS_DIFF, RELATIVE_RANK_STRENGTH, HEIGHT_DIFF, H2H_P1_WINRATE]
                .map(String::from),
        );
        // The fixed list above is well-formed, so this cannot fail
        Self::from_columns(columns).unwrap_or_else(|e| unreachable!("standard schema: {}", e))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Index of the opposite-role column for the column at `i`
    pub fn partner(&self, i: usize) -> Option<usize> {
        self.partners.get(i).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_schema_is_configuration_error() {
        let err = FeatureSchema::from_columns(vec![]).unwrap_err();
        assert!(matches!(err, TennisError::Configuration(_)));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = FeatureSchema::from_columns(cols(&["draw_size", "draw_size"])).unwrap_err();
        assert!(matches!(err, TennisError::Configuration(_)));
    }

    #[test]
    fn test_unpaired_role_column_rejected() {
        let err =
            FeatureSchema::from_columns(cols(&["Player1_rank", "Player2_ht", "Player1_ht"]))
                .unwrap_err();
        assert!(err.to_string().contains("Player2_rank"));
    }

    #[test]
    fn test_partners_pair_roles() {
        let schema = FeatureSchema::from_columns(cols(&[
            "Player1_rank",
            "best_of",
            "Player2_rank",
        ]))
        .unwrap();
        assert_eq!(schema.partner(0), Some(2));
        assert_eq!(schema.partner(2), Some(0));
        assert_eq!(schema.partner(1), None);
    }

    #[test]
    fn test_standard_schema_layout() {
        let schema = FeatureSchema::standard();
        assert_eq!(schema.columns()[0], "Player1_rank");
        assert!(schema.contains("surface_Carpet"));
        assert!(schema.contains("tourney_level_O"));
        assert!(schema.contains(H2H_P1_WINRATE));
        assert_eq!(schema.len(), 2 * PLAYER_FIELDS.len() + 3 + 4 + 6 + 5);
    }

    #[test]
    fn test_load_rejects_unreadable_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = FeatureSchema::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, TennisError::Configuration(_)));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"not\": \"a list\"}").unwrap();
        assert!(matches!(
            FeatureSchema::load(&bad).unwrap_err(),
            TennisError::Configuration(_)
        ));

        let good = dir.path().join("good.json");
        FeatureSchema::standard().save(&good).unwrap();
        assert_eq!(FeatureSchema::load(&good).unwrap(), FeatureSchema::standard());
    }
}
