//! Model training
//!
//! Dataset loading, the full-batch training loop, and metrics tracking.

pub mod dataset;
pub mod metrics;
pub mod trainer;

pub use dataset::{MatchDataset, TrainingExample};
pub use metrics::{Metrics, TrainingHistory};
pub use trainer::{TrainedModel, Trainer};
