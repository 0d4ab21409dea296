//! Win classifier
//!
//! - Classifier: trait the predictor depends on
//! - MLP: burn feed-forward network with z-score input normalization
//! - Artifact: weights plus metadata sidecar on disk

pub mod artifact;
pub mod classifier;
pub mod mlp;
pub mod normalize;

pub use artifact::{MlpClassifier, ModelMetadata};
pub use classifier::Classifier;
pub use mlp::{MLPConfig, MLPModel};
pub use normalize::FeatureNormalization;

/// Backend used for inference from the CLI
pub type InferenceBackend = burn::backend::NdArray<f32>;
