//! Prediction and inference
//!
//! Symmetric prediction over a loaded schema and classifier, and the
//! request-level service the CLI calls.

pub mod inference;
pub mod service;

pub use inference::{format_prediction, Predictor};
pub use service::{MatchupPrediction, PredictionRequest, PredictionService};
