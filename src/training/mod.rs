//! Model training module
//!
//! Provides the two from-scratch classifiers and what they need to be scored:
//! - Entropy-driven decision tree (`decision_tree`)
//! - Softmax logistic regression trained by mini-batch gradient descent (`softmax`)
//! - Impurity measures shared by split search (`impurity`)
//! - Accuracy, confusion matrix and per-class reports (`metrics`)

mod config;
pub mod decision_tree;
pub mod impurity;
pub mod metrics;
pub mod softmax;

pub use config::{DecisionTreeConfig, SoftmaxConfig, TrainingConfig};
pub use decision_tree::{DecisionTree, DecisionTreeNode, MAX_SPLIT_CANDIDATES};
pub use impurity::{gini_impurity, shannon_entropy};
pub use metrics::{accuracy, confusion_matrix, ClassificationReport, ClassMetrics};
pub use softmax::{cross_entropy_loss, softmax, SoftmaxClassifier};
