//! Full-batch trainer for the MLP win classifier

use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};
use chrono::Utc;

use super::dataset::{MatchDataset, TrainingExample};
use super::metrics::{Metrics, TrainingHistory};
use crate::model::{FeatureNormalization, MLPConfig, MLPModel, ModelMetadata};
use crate::{ModelConfig, Result, TennisError, TrainingConfig};

/// Result of a training run, on the inference backend
pub struct TrainedModel<B: Backend> {
    pub model: MLPModel<B>,
    pub metadata: ModelMetadata,
    pub history: TrainingHistory,
}

/// Trainer for the MLP model
pub struct Trainer<B: AutodiffBackend> {
    training: TrainingConfig,
    model: ModelConfig,
    device: B::Device,
}

fn feature_tensor<B: Backend>(
    examples: &[TrainingExample],
    dim: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let flat: Vec<f32> = examples
        .iter()
        .flat_map(|e| e.features.iter().copied())
        .collect();
    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([examples.len(), dim])
}

fn labels(examples: &[TrainingExample]) -> Vec<f32> {
    examples.iter().map(|e| e.label).collect()
}

fn probabilities<B: Backend>(logits: Tensor<B, 2>) -> Result<Vec<f32>> {
    sigmoid(logits)
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| TennisError::Inference(format!("{:?}", e)))
}

/// Mean binary cross-entropy on probabilities
fn binary_cross_entropy<B: Backend>(probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let eps = 1e-7;
    let probs_clamped = probs.clamp(eps, 1.0 - eps);
    let loss = targets.clone().neg() * probs_clamped.clone().log()
        - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
    loss.mean()
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(training: TrainingConfig, model: ModelConfig, device: B::Device) -> Self {
        Trainer {
            training,
            model,
            device,
        }
    }

    /// Train on the dataset and return the best model by validation loss
    pub fn fit(&self, dataset: &MatchDataset) -> Result<TrainedModel<B::InnerBackend>> {
        let dim = dataset.schema().len();
        let (train, val) = dataset.split_chronological(self.training.validation_fraction);
        if train.is_empty() {
            return Err(TennisError::InvalidInput(
                "dataset has no training rows".to_string(),
            ));
        }

        let normalization = FeatureNormalization::from_rows(
            &train.iter().map(|e| e.features.clone()).collect::<Vec<_>>(),
            dim,
        );

        let x_train = normalization.normalize(feature_tensor::<B>(train, dim, &self.device));
        let y_train_vec = labels(train);
        let y_train = Tensor::<B, 1>::from_floats(y_train_vec.as_slice(), &self.device)
            .reshape([train.len(), 1]);
        let x_val = (!val.is_empty()).then(|| {
            normalization.normalize(feature_tensor::<B::InnerBackend>(val, dim, &self.device))
        });
        let y_val = labels(val);

        let config = MLPConfig::from_model_config(dim, &self.model);
        let mut model = MLPModel::<B>::new(&self.device, &config);
        let mut optimizer = AdamConfig::new().init();
        let mut history = TrainingHistory::new();
        let mut best_model = model.valid();
        let epochs = self.training.epochs;

        log::info!(
            "Training on {} rows, validating on {} ({} epochs)",
            train.len(),
            val.len(),
            epochs
        );

        for epoch in 0..epochs {
            let logits = model.forward(x_train.clone());
            let probs = sigmoid(logits.clone());
            let loss = binary_cross_entropy(probs, y_train.clone());
            let loss_value: f32 = loss.clone().into_scalar().elem();

            let train_metrics = Metrics::evaluate(&probabilities(logits)?, &y_train_vec);

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(self.training.learning_rate, model, grads);

            let valid_model = model.valid();
            let val_metrics = match &x_val {
                Some(x) => Some(Metrics::evaluate(
                    &probabilities(valid_model.forward(x.clone()))?,
                    &y_val,
                )),
                None => None,
            };

            let improved = history.record_epoch(epoch, train_metrics, val_metrics);
            if improved || val_metrics.is_none() {
                best_model = valid_model;
            }

            if epoch % 10 == 0 || epoch + 1 == epochs {
                match val_metrics {
                    Some(v) => log::info!(
                        "Epoch {}/{}: loss={:.4} | Train: {} | Val: {}",
                        epoch + 1,
                        epochs,
                        loss_value,
                        train_metrics,
                        v
                    ),
                    None => log::info!(
                        "Epoch {}/{}: loss={:.4} | Train: {}",
                        epoch + 1,
                        epochs,
                        loss_value,
                        train_metrics
                    ),
                }
            }

            if history.should_early_stop(self.training.early_stopping_patience) {
                log::info!(
                    "Early stopping at epoch {} (best was epoch {})",
                    epoch + 1,
                    history.best_epoch + 1
                );
                break;
            }
        }

        let metadata = ModelMetadata {
            columns: dataset.schema().columns().to_vec(),
            hidden_dims: config.hidden_dims.clone(),
            dropout: config.dropout,
            normalization,
            trained_at: Utc::now(),
            epochs: history.epochs(),
            train_samples: train.len(),
            val_accuracy: history.best_val().map(|m| m.accuracy),
        };

        Ok(TrainedModel {
            model: best_model,
            metadata,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureRow, FeatureSchema};
    use crate::model::{Classifier, MlpClassifier};
    use crate::predict::Predictor;
    use crate::{BestOf, MatchContext, PlayerSnapshot, Round, Surface, TourneyLevel};
    use burn::backend::{Autodiff, NdArray};
    use std::sync::Arc;

    type TrainBackend = Autodiff<NdArray<f32>>;
    type InferBackend = NdArray<f32>;

    fn dataset(schema: &Arc<FeatureSchema>) -> MatchDataset {
        let mut dataset = MatchDataset::new(schema.clone());
        for i in 0..60u32 {
            let better = 1 + i % 20;
            let worse = better + 5 + (i * 7) % 40;
            let gap = (worse - better) as f64;
            let row = FeatureRow::from_named(
                schema.clone(),
                [
                    ("Player1_rank", better as f64),
                    ("Player2_rank", worse as f64),
                    ("rank_diff", -gap),
                ],
            );
            // Favourite wins when the rank gap is wide
            dataset.push(row, gap > 20.0).unwrap();
        }
        dataset
    }

    fn training_config(epochs: usize) -> TrainingConfig {
        TrainingConfig {
            epochs,
            learning_rate: 0.01,
            label_column: "target".to_string(),
            validation_fraction: 0.25,
            early_stopping_patience: 0,
        }
    }

    fn model_config() -> ModelConfig {
        ModelConfig {
            hidden_dims: vec![8],
            dropout: 0.0,
        }
    }

    #[test]
    fn test_fit_reduces_training_loss() {
        let schema = Arc::new(FeatureSchema::standard());
        let trainer =
            Trainer::<TrainBackend>::new(training_config(60), model_config(), Default::default());
        let trained = trainer.fit(&dataset(&schema)).unwrap();

        let history = &trained.history;
        assert_eq!(history.epochs(), 60);
        assert_eq!(history.val.len(), 60);
        assert!(history.train[59].log_loss < history.train[0].log_loss);
        assert_eq!(trained.metadata.train_samples, 45);
        assert_eq!(trained.metadata.columns, schema.columns());
        assert!(trained.metadata.val_accuracy.is_some());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let schema = Arc::new(FeatureSchema::standard());
        let trainer =
            Trainer::<TrainBackend>::new(training_config(5), model_config(), Default::default());
        assert!(matches!(
            trainer.fit(&MatchDataset::new(schema)),
            Err(TennisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_trained_model_serves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model").to_string_lossy().to_string();
        let schema = Arc::new(FeatureSchema::standard());

        let trainer =
            Trainer::<TrainBackend>::new(training_config(10), model_config(), Default::default());
        let trained = trainer.fit(&dataset(&schema)).unwrap();
        let classifier = MlpClassifier::<InferBackend>::new(
            trained.model,
            trained.metadata.normalization.clone(),
            Default::default(),
        )
        .unwrap();
        classifier.save(&model_path, &trained.metadata).unwrap();

        let loaded = MlpClassifier::<InferBackend>::load(&model_path, &schema, Default::default())
            .unwrap();
        assert_eq!(loaded.input_dim(), schema.len());

        let predictor = Predictor::new(schema, Arc::new(loaded)).unwrap();
        let context = MatchContext {
            tourney_level: TourneyLevel::Masters,
            surface: Surface::Hard,
            round: Round::new(3).unwrap(),
            best_of: BestOf::Three,
            draw_size: 96,
        };
        let a = PlayerSnapshot {
            rank: 4,
            ..Default::default()
        };
        let b = PlayerSnapshot {
            rank: 40,
            ..Default::default()
        };
        let ab = predictor.predict(&a, &b, &context).unwrap();
        let ba = predictor.predict(&b, &a, &context).unwrap();
        assert!((ab.p1_win_probability - (1.0 - ba.p1_win_probability)).abs() < 1e-6);
    }
}
