//! Symmetric match prediction
//!
//! The caller's player order is arbitrary; the model only ever sees the
//! canonical orientation, and its answer is mapped back to the caller's
//! Player 1.

use std::sync::Arc;

use crate::features::{
    canonicalize, orient, rank_order_swaps, CanonicalRow, FeatureBuilder, FeatureRow, FeatureSchema,
};
use crate::model::Classifier;
use crate::{MatchContext, PlayerSnapshot, PredictionResult, Result, TennisError};

/// Predictor over a loaded schema and classifier.
///
/// Both are read-only after construction, so one predictor can serve
/// concurrent requests.
pub struct Predictor<C: Classifier> {
    builder: FeatureBuilder,
    classifier: Arc<C>,
}

impl<C: Classifier> Predictor<C> {
    /// Create a predictor; the classifier must consume exactly the schema's columns
    pub fn new(schema: Arc<FeatureSchema>, classifier: Arc<C>) -> Result<Self> {
        if classifier.input_dim() != schema.len() {
            return Err(TennisError::Configuration(format!(
                "classifier expects {} features but schema has {}",
                classifier.input_dim(),
                schema.len()
            )));
        }
        Ok(Predictor {
            builder: FeatureBuilder::new(schema)?,
            classifier,
        })
    }

    pub fn schema(&self) -> &Arc<FeatureSchema> {
        self.builder.schema()
    }

    /// Predict `p1` vs `p2` in the caller's orientation.
    ///
    /// The order is decided from the snapshots' ranks, so it holds whether or
    /// not the schema carries rank columns.
    pub fn predict(
        &self,
        p1: &PlayerSnapshot,
        p2: &PlayerSnapshot,
        context: &MatchContext,
    ) -> Result<PredictionResult> {
        let row = self.builder.build(p1, p2, context);
        self.infer(orient(row, rank_order_swaps(p1.rank, p2.rank)))
    }

    /// Predict from a caller-ordered feature row; the schema must carry both rank columns
    pub fn predict_row(&self, row: FeatureRow) -> Result<PredictionResult> {
        self.infer(canonicalize(row)?)
    }

    fn infer(&self, canonical: CanonicalRow) -> Result<PredictionResult> {
        let class1 = self.classifier.predict_proba(&canonical.row.to_f32())?;
        if !class1.is_finite() {
            return Err(TennisError::Inference(format!(
                "classifier returned {}",
                class1
            )));
        }

        let class1 = class1 as f64;
        let p1_win = if canonical.swapped { 1.0 - class1 } else { class1 };
        log::debug!(
            "class-1 probability {:.4} (swapped: {}) -> p1 {:.4}",
            class1,
            canonical.swapped,
            p1_win
        );

        Ok(PredictionResult::from_p1(p1_win))
    }
}

/// Format a prediction for display
pub fn format_prediction(result: &PredictionResult, p1_name: &str, p2_name: &str) -> String {
    let (winner, win_prob) = if result.p1_favoured() {
        (p1_name, result.p1_win_probability)
    } else {
        (p2_name, result.p2_win_probability)
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}
├─────────────────────────────────────────────────┤
│  {:<24} {:>6.2}%
│  {:<24} {:>6.2}%
│  Favourite:  {} ({:.1}%)
└─────────────────────────────────────────────────┘
"#,
        p1_name,
        p2_name,
        p1_name,
        result.p1_win_probability * 100.0,
        p2_name,
        result.p2_win_probability * 100.0,
        winner,
        win_prob * 100.0
    )
}
