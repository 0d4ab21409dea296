//! Training metrics and evaluation

use std::fmt;

const EPS: f64 = 1e-7;

/// Classification metrics over one pass of a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub samples: usize,
    /// Share of rows where the 0.5 threshold picks the actual winner
    pub accuracy: f64,
    /// Mean binary cross-entropy
    pub log_loss: f64,
    /// Mean squared error of the probability
    pub brier: f64,
}

impl Metrics {
    /// Evaluate class-1 probabilities against 0/1 labels
    pub fn evaluate(probs: &[f32], labels: &[f32]) -> Self {
        let n = probs.len().min(labels.len());
        if n == 0 {
            return Metrics::default();
        }

        let mut correct = 0usize;
        let mut log_loss = 0.0;
        let mut brier = 0.0;
        for (&p, &y) in probs.iter().zip(labels.iter()) {
            let p = (p as f64).clamp(EPS, 1.0 - EPS);
            let y = y as f64;
            if (p >= 0.5) == (y >= 0.5) {
                correct += 1;
            }
            log_loss -= y * p.ln() + (1.0 - y) * (1.0 - p).ln();
            brier += (p - y).powi(2);
        }

        Metrics {
            samples: n,
            accuracy: correct as f64 / n as f64,
            log_loss: log_loss / n as f64,
            brier: brier / n as f64,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.4} | Acc: {:.2}% | Brier: {:.4}",
            self.log_loss,
            self.accuracy * 100.0,
            self.brier
        )
    }
}

/// Training history for tracking progress
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub train: Vec<Metrics>,
    pub val: Vec<Metrics>,
    pub best_val_loss: f64,
    pub best_epoch: usize,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self {
            best_val_loss: f64::INFINITY,
            ..Default::default()
        }
    }

    /// Record metrics for an epoch; returns true if validation loss improved
    pub fn record_epoch(&mut self, epoch: usize, train: Metrics, val: Option<Metrics>) -> bool {
        self.train.push(train);
        let Some(val) = val else {
            return false;
        };
        self.val.push(val);

        if val.log_loss < self.best_val_loss {
            self.best_val_loss = val.log_loss;
            self.best_epoch = epoch;
            true
        } else {
            false
        }
    }

    /// Check if we should early stop
    pub fn should_early_stop(&self, patience: usize) -> bool {
        if patience == 0 || self.val.len() < patience {
            return false;
        }
        let current_epoch = self.val.len() - 1;
        current_epoch - self.best_epoch >= patience
    }

    pub fn epochs(&self) -> usize {
        self.train.len()
    }

    /// Validation metrics of the best epoch
    pub fn best_val(&self) -> Option<&Metrics> {
        self.val.get(self.best_epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        let metrics = Metrics::evaluate(&[0.9, 0.2, 0.6, 0.4], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(metrics.samples, 4);
        assert!((metrics.accuracy - 0.75).abs() < 1e-9);
        let brier = (0.01 + 0.04 + 0.36 + 0.16) / 4.0;
        assert!((metrics.brier - brier).abs() < 1e-6);
        assert!(metrics.log_loss > 0.0);
    }

    #[test]
    fn test_evaluate_extremes_stay_finite() {
        let metrics = Metrics::evaluate(&[0.0, 1.0], &[1.0, 0.0]);
        assert!(metrics.log_loss.is_finite());
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(Metrics::evaluate(&[], &[]), Metrics::default());
    }

    #[test]
    fn test_early_stopping() {
        let mut history = TrainingHistory::new();
        let at = |loss| Metrics {
            samples: 1,
            log_loss: loss,
            ..Default::default()
        };

        assert!(history.record_epoch(0, at(0.7), Some(at(0.6))));
        assert!(!history.record_epoch(1, at(0.6), Some(at(0.65))));
        assert!(!history.should_early_stop(2));
        assert!(!history.record_epoch(2, at(0.5), Some(at(0.61))));
        assert!(history.should_early_stop(2));
        assert!(!history.should_early_stop(0));
        assert_eq!(history.best_val().unwrap().log_loss, 0.6);
        assert_eq!(history.epochs(), 3);
    }
}
