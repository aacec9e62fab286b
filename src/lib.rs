//! netclass - from-scratch classifiers for network traffic logs
//!
//! This crate provides:
//! - An entropy-driven decision tree with strided threshold search
//! - A softmax (multinomial logistic regression) classifier trained by
//!   mini-batch gradient descent
//! - Traffic preprocessing: IP and flow duration decoding, encoders,
//!   scaling and stratified splitting
//! - Evaluation metrics and a command-line driver
//!
//! # Modules
//!
//! - [`training`] - Classifiers, impurity measures and metrics
//! - [`preprocessing`] - Feature decoding, encoding and splitting
//! - [`utils`] - CSV and label file loading
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{NetclassError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{NetclassError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        argmax_rows, one_hot, train_test_split, LabelEncoder, OneHotEncoder, StandardScaler,
        TrainTestSplit,
    };

    // Training
    pub use crate::training::{
        accuracy, ClassificationReport, DecisionTree, DecisionTreeConfig, SoftmaxClassifier,
        SoftmaxConfig, TrainingConfig,
    };

    // Data loading
    pub use crate::utils::{load_labels, LoadOptions, TrafficDataset};
}
