//! Z-score feature normalization fitted on training rows

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// Per-column mean and standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNormalization {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl FeatureNormalization {
    /// Leaves inputs unchanged
    pub fn identity(dim: usize) -> Self {
        FeatureNormalization {
            mean: vec![0.0; dim],
            std: vec![1.0; dim],
        }
    }

    /// Compute from training rows of equal width
    pub fn from_rows(rows: &[Vec<f32>], dim: usize) -> Self {
        if rows.is_empty() {
            return Self::identity(dim);
        }

        let mut sum = vec![0.0f64; dim];
        let mut sum_sq = vec![0.0f64; dim];
        for row in rows {
            for (j, &v) in row.iter().take(dim).enumerate() {
                sum[j] += v as f64;
                sum_sq[j] += v as f64 * v as f64;
            }
        }

        let n = rows.len() as f64;
        let mean: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let std = sum_sq
            .iter()
            .zip(mean.iter())
            // Constant columns (e.g. entry_Direct) would divide by zero
            .map(|(sq, m)| ((sq / n - m * m).max(0.0).sqrt()).max(1e-3) as f32)
            .collect();

        FeatureNormalization {
            mean: mean.into_iter().map(|m| m as f32).collect(),
            std,
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.mean.len() == self.std.len() && self.std.iter().all(|s| s.is_finite() && *s > 0.0)
    }

    /// Normalize a [batch, dim] tensor: (x - mean) / std
    pub fn normalize<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = x.device();
        let mean = Tensor::<B, 1>::from_floats(self.mean.as_slice(), &device).unsqueeze_dim(0);
        let std = Tensor::<B, 1>::from_floats(self.std.as_slice(), &device).unsqueeze_dim(0);
        (x - mean) / std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_from_rows() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let norm = FeatureNormalization::from_rows(&rows, 2);
        assert_eq!(norm.mean, vec![2.0, 5.0]);
        assert!((norm.std[0] - 1.0).abs() < 1e-6);
        // Constant column gets a floor instead of zero
        assert!(norm.std[1] > 0.0);
        assert!(norm.is_consistent());
    }

    #[test]
    fn test_normalize_tensor() {
        let device = Default::default();
        let norm = FeatureNormalization {
            mean: vec![2.0, 0.0],
            std: vec![2.0, 1.0],
        };
        let x = Tensor::<TestBackend, 1>::from_floats([4.0, -1.0].as_slice(), &device)
            .reshape([1, 2]);
        let out = norm.normalize(x).into_data().to_vec::<f32>().unwrap();
        assert_eq!(out, vec![1.0, -1.0]);
    }
}
