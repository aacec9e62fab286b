//! Entropy-driven decision tree classifier
//!
//! Splits are axis-aligned (`value <= threshold` goes left). For each column only a
//! bounded, evenly strided subset of the sorted distinct values is tried as a
//! threshold, which keeps split search cheap on wide-range numeric features such as
//! IP octets and byte counters.

use super::config::DecisionTreeConfig;
use super::impurity::{class_probabilities, partition_entropy, shannon_entropy};
use crate::error::{NetclassError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, info};

/// Upper bound used to derive the stride over a column's sorted distinct values.
pub const MAX_SPLIT_CANDIDATES: usize = 20;

/// One decision point of a fitted tree.
///
/// Every node records the best split found for the samples that reached it, even
/// when it ended up a leaf; children are absent on leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeNode<L> {
    /// Column compared at this node
    pub column: usize,
    /// Samples with `row[column] <= threshold` go left
    pub threshold: f64,
    /// Entropy of the labels reaching this node
    pub entropy: f64,
    /// Weighted child entropy of the chosen split
    pub split_entropy: f64,
    /// `entropy - split_entropy`
    pub info_gain: f64,
    /// Number of training samples reaching this node
    pub n_samples: usize,
    /// Class -> empirical frequency among the samples reaching this node
    pub probs: BTreeMap<L, f64>,
    /// Majority class
    pub prediction: L,
    pub left: Option<Box<DecisionTreeNode<L>>>,
    pub right: Option<Box<DecisionTreeNode<L>>>,
}

impl<L> DecisionTreeNode<L> {
    /// A node without children
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn depth(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |n| n.depth());
        let right = self.right.as_ref().map_or(0, |n| n.depth());
        1 + left.max(right)
    }

    fn count_leaves(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.left.as_ref().map_or(0, |n| n.count_leaves())
            + self.right.as_ref().map_or(0, |n| n.count_leaves())
    }

    fn count_nodes(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.count_nodes())
            + self.right.as_ref().map_or(0, |n| n.count_nodes())
    }
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    column: usize,
    threshold: f64,
    entropy: f64,
}

/// Decision tree classifier over class identifiers of type `L`
#[derive(Debug, Clone)]
pub struct DecisionTree<L = usize> {
    /// Hyperparameters
    pub config: DecisionTreeConfig,
    /// Tree root; `None` before fit and after a fit with `max_depth == 0`
    root: Option<DecisionTreeNode<L>>,
    /// Number of features seen during fit
    n_features: usize,
    /// Gain-weighted split usage per column, normalized
    feature_importances: Option<Array1<f64>>,
    is_fitted: bool,
}

impl<L> Default for DecisionTree<L> {
    fn default() -> Self {
        Self::new(DecisionTreeConfig::default())
    }
}

impl<L> DecisionTree<L> {
    /// Create an unfitted tree
    pub fn new(config: DecisionTreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
            feature_importances: None,
            is_fitted: false,
        }
    }

    /// Set maximum depth (number of node levels on any root-to-leaf path)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the minimum information gain required to keep splitting
    pub fn with_min_info_gain(mut self, min_info_gain: f64) -> Self {
        self.config.min_info_gain = min_info_gain;
        self
    }

    /// Root node, if the tree has one
    pub fn root(&self) -> Option<&DecisionTreeNode<L>> {
        self.root.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Number of node levels on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.count_leaves())
    }

    pub fn n_nodes(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.count_nodes())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }
}

impl<L: Ord + Clone + Debug> DecisionTree<L> {
    /// Fit the tree, replacing any previously fitted one.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[L]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(NetclassError::InvalidInput(
                "cannot fit a decision tree on zero samples".to_string(),
            ));
        }
        if n_features == 0 {
            return Err(NetclassError::InvalidInput(
                "cannot fit a decision tree on zero features".to_string(),
            ));
        }
        if n_samples != y.len() {
            return Err(NetclassError::shape(
                format!("y length = {}", n_samples),
                format!("y length = {}", y.len()),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(NetclassError::InvalidInput(
                "feature matrix contains non-finite values".to_string(),
            ));
        }
        if self.config.min_info_gain < 0.0 || self.config.min_info_gain.is_nan() {
            return Err(NetclassError::invalid_parameter(
                "min_info_gain",
                self.config.min_info_gain,
                "must be >= 0",
            ));
        }

        info!(
            n_samples,
            n_features,
            max_depth = self.config.max_depth,
            min_info_gain = self.config.min_info_gain,
            "Fitting decision tree"
        );

        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();
        let root = self.build_node(x, y, &indices, 0, &mut importances)?;

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.root = root;
        self.n_features = n_features;
        self.feature_importances = Some(Array1::from_vec(importances));
        self.is_fitted = true;

        info!(
            depth = self.depth(),
            n_leaves = self.n_leaves(),
            "Decision tree fitted"
        );
        Ok(self)
    }

    fn build_node(
        &self,
        x: &Array2<f64>,
        y: &[L],
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
    ) -> Result<Option<DecisionTreeNode<L>>> {
        if depth >= self.config.max_depth {
            return Ok(None);
        }

        let probs = class_probabilities(indices.iter().map(|&i| &y[i]));
        let prediction = majority_class(&probs).ok_or_else(|| {
            NetclassError::InvalidInput("cannot build a tree node from zero samples".to_string())
        })?;
        let node_probs: Vec<f64> = probs.values().copied().collect();
        let entropy = shannon_entropy(&node_probs);

        let split = self.best_split(x, y, indices);
        let info_gain = entropy - split.entropy;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, split.column]] <= split.threshold);

        let mut node = DecisionTreeNode {
            column: split.column,
            threshold: split.threshold,
            entropy,
            split_entropy: split.entropy,
            info_gain,
            n_samples: indices.len(),
            probs,
            prediction,
            left: None,
            right: None,
        };

        let stop = depth + 1 >= self.config.max_depth
            || info_gain < self.config.min_info_gain
            || entropy == 0.0
            || left_indices.is_empty()
            || right_indices.is_empty();

        if stop {
            debug!(depth, n_samples = node.n_samples, entropy, info_gain, "Leaf");
            return Ok(Some(node));
        }

        debug!(
            depth,
            column = split.column,
            threshold = split.threshold,
            info_gain,
            left = left_indices.len(),
            right = right_indices.len(),
            "Split"
        );
        importances[split.column] += indices.len() as f64 * info_gain;

        node.left = self
            .build_node(x, y, &left_indices, depth + 1, importances)?
            .map(Box::new);
        node.right = self
            .build_node(x, y, &right_indices, depth + 1, importances)?
            .map(Box::new);

        Ok(Some(node))
    }

    /// Column-then-threshold scan for the lowest weighted child entropy; the first
    /// candidate wins ties.
    fn best_split(&self, x: &Array2<f64>, y: &[L], indices: &[usize]) -> BestSplit {
        let mut best = BestSplit {
            column: 0,
            threshold: x[[indices[0], 0]],
            entropy: f64::INFINITY,
        };

        for column in 0..x.ncols() {
            for threshold in candidate_thresholds(x, indices, column) {
                let mut left: Vec<&L> = Vec::with_capacity(indices.len());
                let mut right: Vec<&L> = Vec::with_capacity(indices.len());
                for &i in indices {
                    if x[[i, column]] <= threshold {
                        left.push(&y[i]);
                    } else {
                        right.push(&y[i]);
                    }
                }

                let entropy = partition_entropy(&[&left[..], &right[..]]);
                if entropy < best.entropy {
                    best = BestSplit {
                        column,
                        threshold,
                        entropy,
                    };
                }
            }
        }

        best
    }

    /// Predict the class of a single row.
    pub fn predict_one(&self, row: ArrayView1<f64>) -> Result<L> {
        if !self.is_fitted {
            return Err(NetclassError::NotFitted);
        }
        let root = self.root.as_ref().ok_or(NetclassError::EmptyTree)?;
        if row.len() != self.n_features {
            return Err(NetclassError::shape(
                format!("{} features", self.n_features),
                format!("{} features", row.len()),
            ));
        }

        let mut node = root;
        loop {
            let next = if row[node.column] <= node.threshold {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
            match next {
                Some(child) => node = child,
                None => return Ok(node.prediction.clone()),
            }
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<L>> {
        let predictions = x
            .rows()
            .into_iter()
            .map(|row| self.predict_one(row))
            .collect::<Result<Vec<L>>>()?;
        // An empty batch still has to report an unfit or empty tree
        if predictions.is_empty() {
            if !self.is_fitted {
                return Err(NetclassError::NotFitted);
            }
            if self.root.is_none() {
                return Err(NetclassError::EmptyTree);
            }
        }
        Ok(Array1::from_vec(predictions))
    }
}

/// Every `stride`-th sorted distinct value of `column` among `indices`, with
/// `stride = max(distinct / MAX_SPLIT_CANDIDATES, 1)`.
fn candidate_thresholds(x: &Array2<f64>, indices: &[usize], column: usize) -> Vec<f64> {
    let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, column]]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();

    let stride = (values.len() / MAX_SPLIT_CANDIDATES).max(1);
    values.into_iter().step_by(stride).collect()
}

/// Most frequent class; equal frequencies resolve to the smallest class.
fn majority_class<L: Ord + Clone>(probs: &BTreeMap<L, f64>) -> Option<L> {
    let mut best: Option<(&L, f64)> = None;
    for (class, &p) in probs {
        if best.map_or(true, |(_, best_p)| p > best_p) {
            best = Some((class, p));
        }
    }
    best.map(|(class, _)| class.clone())
}
