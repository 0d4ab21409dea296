//! Historical match dataset
//!
//! Rows come from a CSV with one column per feature plus a 0/1 label
//! (1 when Player 1 won). Each row is reindexed onto the feature schema and
//! put into canonical order, flipping the label when the players swap, so
//! training sees the same orientation the predictor uses.

use std::path::Path;
use std::sync::Arc;

use crate::features::{canonicalize, FeatureRow, FeatureSchema};
use crate::{Result, TennisError};

/// One canonical training row
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: Vec<f32>,
    /// 1.0 when the canonical Player 1 won
    pub label: f32,
}

/// Dataset of canonical examples in file (chronological) order
#[derive(Debug, Clone)]
pub struct MatchDataset {
    schema: Arc<FeatureSchema>,
    examples: Vec<TrainingExample>,
    swapped: usize,
}

/// Parse a CSV cell; pandas writes one-hot flags as True/False
fn parse_cell(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw {
        "" => None,
        "True" | "true" => Some(1.0),
        "False" | "false" => Some(0.0),
        _ => raw.parse().ok(),
    }
}

impl MatchDataset {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        MatchDataset {
            schema,
            examples: Vec::new(),
            swapped: 0,
        }
    }

    /// Add a caller-ordered row and its label
    pub fn push(&mut self, row: FeatureRow, p1_won: bool) -> Result<()> {
        let canonical = canonicalize(row)?;
        let label = if canonical.swapped {
            self.swapped += 1;
            !p1_won
        } else {
            p1_won
        };
        self.examples.push(TrainingExample {
            features: canonical.row.to_f32(),
            label: if label { 1.0 } else { 0.0 },
        });
        Ok(())
    }

    /// Load from a CSV file
    pub fn from_csv<P: AsRef<Path>>(
        path: P,
        schema: Arc<FeatureSchema>,
        label_column: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let label_idx = headers
            .iter()
            .position(|h| h == label_column)
            .ok_or_else(|| {
                TennisError::InvalidInput(format!(
                    "{} has no label column '{}'",
                    path.display(),
                    label_column
                ))
            })?;

        let unused: Vec<&str> = headers
            .iter()
            .filter(|h| *h != label_column && !schema.contains(h))
            .collect();
        if !unused.is_empty() {
            log::debug!("Ignoring {} columns not in schema: {:?}", unused.len(), unused);
        }

        let mut dataset = Self::new(schema.clone());
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let label = record
                .get(label_idx)
                .and_then(parse_cell)
                .ok_or_else(|| {
                    TennisError::Parse(format!("row {}: missing or invalid label", line + 2))
                })?;

            let row = FeatureRow::from_named(
                schema.clone(),
                headers
                    .iter()
                    .zip(record.iter())
                    .enumerate()
                    .filter(|(i, _)| *i != label_idx)
                    .filter_map(|(_, (column, raw))| parse_cell(raw).map(|v| (column, v))),
            );
            dataset.push(row, label >= 0.5)?;
        }

        log::info!(
            "Loaded {} matches from {} ({} reoriented)",
            dataset.len(),
            path.display(),
            dataset.swapped
        );
        Ok(dataset)
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Number of rows that had to be reoriented
    pub fn swapped(&self) -> usize {
        self.swapped
    }

    /// Split into (train, validation), holding out the trailing fraction
    pub fn split_chronological(&self, val_fraction: f64) -> (&[TrainingExample], &[TrainingExample]) {
        let val_fraction = val_fraction.clamp(0.0, 1.0);
        let val_len = (self.examples.len() as f64 * val_fraction).round() as usize;
        let split = self.examples.len() - val_len.min(self.examples.len());
        self.examples.split_at(split)
    }
}
