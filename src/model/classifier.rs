//! Classifier seam between the predictor and a trained model

use std::sync::Arc;

use crate::Result;

/// A binary classifier over a fixed-width feature row.
///
/// Implementations must be safe to share across threads; a model that cannot
/// run concurrent inference serializes calls internally.
pub trait Classifier: Send + Sync {
    /// Number of features the model expects
    fn input_dim(&self) -> usize;

    /// Probability of class 1 (Player1 wins) for one canonical row
    fn predict_proba(&self, features: &[f32]) -> Result<f32>;
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn input_dim(&self) -> usize {
        (**self).input_dim()
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f32> {
        (**self).predict_proba(features)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn input_dim(&self) -> usize {
        (**self).input_dim()
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f32> {
        (**self).predict_proba(features)
    }
}
