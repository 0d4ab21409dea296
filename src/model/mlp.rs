//! Feed-forward win classifier
//!
//! Architecture: Input(n_features) → [Linear → ReLU → Dropout] × hidden_dims
//!                                  → win_head(1)

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::{Result, TennisError};

/// Configuration for the MLP model
#[derive(Debug, Clone, PartialEq)]
pub struct MLPConfig {
    /// Input dimension (feature schema width)
    pub input_dim: usize,
    /// Hidden layer widths, e.g. [64, 32]
    pub hidden_dims: Vec<usize>,
    pub dropout: f64,
}

impl MLPConfig {
    pub fn new(input_dim: usize, hidden_dims: Vec<usize>, dropout: f64) -> Self {
        MLPConfig {
            input_dim,
            hidden_dims,
            dropout,
        }
    }

    pub fn from_model_config(input_dim: usize, config: &crate::ModelConfig) -> Self {
        Self::new(input_dim, config.hidden_dims.clone(), config.dropout)
    }
}

/// A single hidden layer block: Linear → ReLU → Dropout
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
    dropout: Dropout,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn new(device: &B::Device, in_dim: usize, out_dim: usize, dropout: f64) -> Self {
        HiddenBlock {
            linear: LinearConfig::new(in_dim, out_dim).init(device),
            dropout: DropoutConfig::new(dropout).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.linear.forward(x);
        let x = relu(x);
        self.dropout.forward(x)
    }
}

/// Multi-layer perceptron producing a single win logit
#[derive(Module, Debug)]
pub struct MLPModel<B: Backend> {
    hidden: Vec<HiddenBlock<B>>,
    win_head: Linear<B>,
}

impl<B: Backend> MLPModel<B> {
    pub fn new(device: &B::Device, config: &MLPConfig) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(HiddenBlock::new(device, in_dim, out_dim, config.dropout));
            in_dim = out_dim;
        }

        MLPModel {
            hidden,
            win_head: LinearConfig::new(in_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Normalized feature rows [batch, input_dim]
    ///
    /// # Returns
    /// Win logits [batch, 1]; apply sigmoid for P(Player1 wins)
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(features, |x, block| block.forward(x));
        self.win_head.forward(x)
    }

    /// Save model weights to `<path>.mpk`
    pub fn save(&self, path: &str) -> Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| TennisError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load model weights saved by [`MLPModel::save`]
    pub fn load(device: &B::Device, path: &str, config: &MLPConfig) -> Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.into(), device)
            .map_err(|e| TennisError::ModelUnavailable(format!("{}: {}", path, e)))?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}
