//! A single model input row keyed by schema columns

use std::fmt;
use std::sync::Arc;

use super::schema::FeatureSchema;

/// One value per schema column, in schema order.
///
/// Rows are created zero-filled from their schema, so every column is always
/// present and no column outside the schema can be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureRow {
    /// A row with every column at the schema default (0)
    pub fn zeros(schema: Arc<FeatureSchema>) -> Self {
        let values = vec![0.0; schema.len()];
        FeatureRow { schema, values }
    }

    /// Reindex named values onto the schema: missing columns become 0, unknown names are dropped
    pub fn from_named<'a, I>(schema: Arc<FeatureSchema>, named: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut row = Self::zeros(schema);
        for (column, value) in named {
            row.set(column, value);
        }
        row
    }

    pub(crate) fn from_values(schema: Arc<FeatureSchema>, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        FeatureRow { schema, values }
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        &self.schema
    }

    /// Value of a column, or None if the schema does not carry it
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.values[i])
    }

    /// Assign a column; returns false (and stores nothing) if the schema lacks it
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match self.schema.position(column) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => {
                log::trace!("Column {} not in feature schema, ignored", column);
                false
            }
        }
    }

    /// Apply `f` to a column in place if present
    pub fn update(&mut self, column: &str, f: impl FnOnce(f64) -> f64) {
        if let Some(i) = self.schema.position(column) {
            self.values[i] = f(self.values[i]);
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values in schema order as model input
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl fmt::Display for FeatureRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (column, value) in self.iter() {
            writeln!(f, "{:<28} {}", column, value)?;
        }
        Ok(())
    }
}
