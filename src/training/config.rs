//! Training configuration

use crate::error::{NetclassError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters of the decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTreeConfig {
    /// Maximum number of node levels on a root-to-leaf path (0 = empty tree)
    pub max_depth: usize,
    /// Splits gaining less information than this become leaves
    pub min_info_gain: f64,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_info_gain: 0.1,
        }
    }
}

impl DecisionTreeConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_info_gain(mut self, min_info_gain: f64) -> Self {
        self.min_info_gain = min_info_gain;
        self
    }
}

/// Hyperparameters of the softmax classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftmaxConfig {
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Number of update steps; there is no early stopping
    pub epochs: usize,
    /// Samples drawn (without replacement) per update
    pub batch_size: usize,
    /// Log the monitoring loss every 100 epochs
    pub verbose: bool,
    /// Seed for weight initialization and batch sampling (None = OS entropy)
    pub random_state: Option<u64>,
}

impl Default for SoftmaxConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epochs: 1000,
            batch_size: 32,
            verbose: false,
            random_state: None,
        }
    }
}

impl SoftmaxConfig {
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Check the hyperparameters against a dataset of `n_samples` rows.
    pub fn validate(&self, n_samples: usize) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetclassError::invalid_parameter(
                "learning_rate",
                self.learning_rate,
                "must be a positive finite number",
            ));
        }
        if self.batch_size == 0 {
            return Err(NetclassError::invalid_parameter(
                "batch_size",
                self.batch_size,
                "must be at least 1",
            ));
        }
        if self.batch_size > n_samples {
            return Err(NetclassError::invalid_parameter(
                "batch_size",
                self.batch_size,
                format!(
                    "cannot sample without replacement from {} samples",
                    n_samples
                ),
            ));
        }
        Ok(())
    }
}

/// End-to-end training run settings used by the CLI driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub tree: DecisionTreeConfig,
    pub softmax: SoftmaxConfig,
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Keep class proportions in the train/test split
    pub stratify: bool,
    /// Standardize features before fitting the softmax classifier
    pub scale_features: bool,
    /// Seed for the train/test split
    pub random_state: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            tree: DecisionTreeConfig::default(),
            softmax: SoftmaxConfig::default().with_epochs(500),
            test_size: 0.2,
            stratify: true,
            scale_features: true,
            random_state: None,
        }
    }
}

impl TrainingConfig {
    /// Load a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(NetclassError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.tree.min_info_gain < 0.0 {
            return Err(NetclassError::ConfigError(format!(
                "tree.min_info_gain must be >= 0, got {}",
                self.tree.min_info_gain
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.tree.max_depth, 5);
        assert_eq!(config.tree.min_info_gain, 0.1);
        assert_eq!(config.softmax.learning_rate, 0.01);
        assert_eq!(config.softmax.batch_size, 32);
        assert!(config.softmax.random_state.is_none());
    }

    #[test]
    fn test_batch_size_validation() {
        let config = SoftmaxConfig::default().with_batch_size(64);
        assert!(matches!(
            config.validate(10),
            Err(NetclassError::InvalidParameter { .. })
        ));
        assert!(config.validate(64).is_ok());
        assert!(SoftmaxConfig::default().with_batch_size(0).validate(10).is_err());
    }

    #[test]
    fn test_partial_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tree": {{"max_depth": 3}}, "softmax": {{"epochs": 50, "random_state": 9}}}}"#).unwrap();

        let config = TrainingConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.tree.max_depth, 3);
        assert_eq!(config.tree.min_info_gain, 0.1);
        assert_eq!(config.softmax.epochs, 50);
        assert_eq!(config.softmax.random_state, Some(9));
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_invalid_test_size() {
        let config = TrainingConfig::default().with_test_size(1.5);
        assert!(matches!(config.validate(), Err(NetclassError::ConfigError(_))));
    }
}
