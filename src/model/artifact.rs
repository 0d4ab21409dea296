//! Trained classifier artifacts
//!
//! A trained model lives in two files next to each other:
//! `<model_path>.mpk` holds the burn weights and `<model_path>_meta.json`
//! records the feature columns, architecture and input normalization it was
//! trained with.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::mlp::{MLPConfig, MLPModel};
use super::normalize::FeatureNormalization;
use crate::features::FeatureSchema;
use crate::{Result, TennisError};

/// Sidecar describing how a model was trained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Feature columns in the order the model consumes them
    pub columns: Vec<String>,
    pub hidden_dims: Vec<usize>,
    pub dropout: f64,
    pub normalization: FeatureNormalization,
    pub trained_at: DateTime<Utc>,
    pub epochs: usize,
    pub train_samples: usize,
    pub val_accuracy: Option<f64>,
}

impl ModelMetadata {
    pub fn mlp_config(&self) -> MLPConfig {
        MLPConfig::new(self.columns.len(), self.hidden_dims.clone(), self.dropout)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TennisError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            TennisError::ModelUnavailable(format!("malformed {}: {}", path.display(), e))
        })
    }

    /// Check that the model was trained on exactly this schema
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        if self.columns.as_slice() != schema.columns() {
            let missing: Vec<&str> = schema
                .columns()
                .iter()
                .filter(|c| !self.columns.contains(c))
                .map(String::as_str)
                .collect();
            return Err(TennisError::Configuration(format!(
                "model was trained on {} columns but schema has {} (not in model: {:?})",
                self.columns.len(),
                schema.len(),
                missing
            )));
        }
        Ok(())
    }
}

/// Path of the weights file for a model path
pub fn weights_path(model_path: &str) -> PathBuf {
    PathBuf::from(format!("{}.mpk", model_path))
}

/// Path of the metadata sidecar for a model path
pub fn metadata_path(model_path: &str) -> PathBuf {
    PathBuf::from(format!("{}_meta.json", model_path))
}

/// MLP win classifier with its input normalization
pub struct MlpClassifier<B: Backend> {
    /// Burn modules are not shared across threads for inference; held only around forward
    model: Mutex<MLPModel<B>>,
    normalization: FeatureNormalization,
    device: B::Device,
    input_dim: usize,
}

impl<B: Backend> MlpClassifier<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new(
        model: MLPModel<B>,
        normalization: FeatureNormalization,
        device: B::Device,
    ) -> Result<Self> {
        if !normalization.is_consistent() {
            return Err(TennisError::ModelUnavailable(
                "feature normalization is malformed".to_string(),
            ));
        }
        let input_dim = normalization.dim();
        Ok(MlpClassifier {
            model: Mutex::new(model),
            normalization,
            device,
            input_dim,
        })
    }

    /// Load weights and metadata, verifying them against the feature schema
    pub fn load(model_path: &str, schema: &FeatureSchema, device: B::Device) -> Result<Self> {
        let weights = weights_path(model_path);
        if !weights.exists() {
            return Err(TennisError::ModelUnavailable(format!(
                "no model weights at {}",
                weights.display()
            )));
        }

        let metadata = ModelMetadata::load(metadata_path(model_path))?;
        metadata.check_schema(schema)?;
        if metadata.normalization.dim() != metadata.columns.len() {
            return Err(TennisError::ModelUnavailable(format!(
                "normalization covers {} columns, model has {}",
                metadata.normalization.dim(),
                metadata.columns.len()
            )));
        }

        let model = MLPModel::load(&device, model_path, &metadata.mlp_config())?;
        log::info!(
            "Loaded classifier from {} ({} features, hidden {:?})",
            weights.display(),
            metadata.columns.len(),
            metadata.hidden_dims
        );
        Self::new(model, metadata.normalization, device)
    }

    /// Persist weights and metadata
    pub fn save(&self, model_path: &str, metadata: &ModelMetadata) -> Result<()> {
        if let Some(parent) = Path::new(model_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let model = self
            .model
            .lock()
            .map_err(|_| TennisError::Inference("model lock poisoned".to_string()))?;
        model.save(model_path)?;
        metadata.save(metadata_path(model_path))?;
        Ok(())
    }
}

impl<B: Backend> Classifier for MlpClassifier<B> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f32> {
        if features.len() != self.input_dim {
            return Err(TennisError::Inference(format!(
                "expected {} features, got {}",
                self.input_dim,
                features.len()
            )));
        }

        let x = Tensor::<B, 1>::from_floats(features, &self.device).reshape([1, self.input_dim]);
        let x = self.normalization.normalize(x);

        let logits = {
            let model = self
                .model
                .lock()
                .map_err(|_| TennisError::Inference("model lock poisoned".to_string()))?;
            model.forward(x)
        };

        let probs = sigmoid(logits)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| TennisError::Inference(format!("{:?}", e)))?;

        match probs.first() {
            Some(p) if p.is_finite() => Ok(*p),
            Some(p) => Err(TennisError::Inference(format!("model produced {}", p))),
            None => Err(TennisError::Inference("model produced no output".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn metadata(schema: &FeatureSchema) -> ModelMetadata {
        ModelMetadata {
            columns: schema.columns().to_vec(),
            hidden_dims: vec![8],
            dropout: 0.0,
            normalization: FeatureNormalization::identity(schema.len()),
            trained_at: Utc::now(),
            epochs: 0,
            train_samples: 0,
            val_accuracy: None,
        }
    }

    #[test]
    fn test_predict_proba_in_unit_interval() {
        let device = Default::default();
        let schema = FeatureSchema::standard();
        let meta = metadata(&schema);
        let model = MLPModel::<TestBackend>::new(&device, &meta.mlp_config());
        let classifier = MlpClassifier::new(model, meta.normalization, device).unwrap();

        let p = classifier.predict_proba(&vec![0.5; schema.len()]).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_shape_mismatch_is_inference_error() {
        let device = Default::default();
        let model = MLPModel::<TestBackend>::new(&device, &MLPConfig::new(3, vec![], 0.0));
        let classifier =
            MlpClassifier::new(model, FeatureNormalization::identity(3), device).unwrap();

        let err = classifier.predict_proba(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, TennisError::Inference(_)));
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing").to_string_lossy().to_string();
        let err = MlpClassifier::<TestBackend>::load(
            &path,
            &FeatureSchema::standard(),
            Default::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, TennisError::ModelUnavailable(_)));
    }

    #[test]
    fn test_save_and_load_reproduces_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").to_string_lossy().to_string();
        let device = Default::default();
        let schema = FeatureSchema::standard();
        let meta = metadata(&schema);

        let model = MLPModel::<TestBackend>::new(&device, &meta.mlp_config());
        let classifier = MlpClassifier::new(model, meta.normalization.clone(), device).unwrap();
        classifier.save(&path, &meta).unwrap();

        let loaded = MlpClassifier::<TestBackend>::load(&path, &schema, Default::default()).unwrap();
        let input: Vec<f32> = (0..schema.len()).map(|i| i as f32 / 10.0).collect();
        let a = classifier.predict_proba(&input).unwrap();
        let b = loaded.predict_proba(&input).unwrap();
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_schema_mismatch_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").to_string_lossy().to_string();
        let device = Default::default();
        let schema = FeatureSchema::standard();
        let meta = metadata(&schema);
        let model = MLPModel::<TestBackend>::new(&device, &meta.mlp_config());
        MlpClassifier::new(model, meta.normalization.clone(), device)
            .unwrap()
            .save(&path, &meta)
            .unwrap();

        let other = FeatureSchema::from_columns(vec!["draw_size".to_string()]).unwrap();
        let err = MlpClassifier::<TestBackend>::load(&path, &other, Default::default())
            .err()
            .unwrap();
        assert!(matches!(err, TennisError::Configuration(_)));
    }
}
