//! Multinomial (softmax) logistic regression
//!
//! Trained with plain mini-batch gradient descent on cross-entropy. Every epoch
//! runs a full forward pass to record the monitoring loss, then updates the
//! parameters from a fresh batch of rows sampled without replacement.

use super::config::SoftmaxConfig;
use crate::error::{NetclassError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand::seq::index;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

/// Half-width of the uniform range the parameters are initialized from.
pub const INIT_RANGE: f64 = 0.01;

/// Added inside the log of the cross-entropy to keep it finite.
pub const LOG_EPSILON: f64 = 1e-8;

/// Row-wise softmax with the row maximum subtracted before exponentiating.
pub fn softmax(logits: &Array2<f64>) -> Array2<f64> {
    let mut out = logits.to_owned();
    for mut row in out.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

/// Mean over rows of `-Σ y·ln(p + ε)`.
pub fn cross_entropy_loss(y: &Array2<f64>, probs: &Array2<f64>) -> f64 {
    let log_probs = probs.mapv(|p| (p + LOG_EPSILON).ln());
    let per_row = (y * &log_probs).sum_axis(Axis(1));
    -per_row.mean().unwrap_or(0.0)
}

/// Index of the largest entry; the first one wins ties.
pub fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// Softmax classifier with a dense `n_features x n_classes` weight matrix
#[derive(Debug, Clone, Default)]
pub struct SoftmaxClassifier {
    /// Hyperparameters
    pub config: SoftmaxConfig,
    weights: Option<Array2<f64>>,
    bias: Option<Array1<f64>>,
    loss_history: Vec<f64>,
}

impl SoftmaxClassifier {
    /// Create an unfitted classifier
    pub fn new(config: SoftmaxConfig) -> Self {
        Self {
            config,
            weights: None,
            bias: None,
            loss_history: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.weights.is_some() && self.bias.is_some()
    }

    /// Fitted weights (`n_features x n_classes`)
    pub fn weights(&self) -> Option<&Array2<f64>> {
        self.weights.as_ref()
    }

    /// Fitted bias (`n_classes`)
    pub fn bias(&self) -> Option<&Array1<f64>> {
        self.bias.as_ref()
    }

    /// Per-epoch monitoring loss of the last fit
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    pub fn n_classes(&self) -> Option<usize> {
        self.bias.as_ref().map(|b| b.len())
    }

    /// Fit on a one-hot label matrix and return the per-epoch loss history.
    ///
    /// Uses a generator seeded from `config.random_state`, or OS entropy when no
    /// seed is configured.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Array1<f64>> {
        match self.config.random_state {
            Some(seed) => {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                self.fit_with_rng(x, y, &mut rng)
            }
            None => {
                let mut rng = StdRng::from_entropy();
                self.fit_with_rng(x, y, &mut rng)
            }
        }
    }

    /// Fit drawing initial parameters and mini-batches from `rng`.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        rng: &mut R,
    ) -> Result<Array1<f64>> {
        let targets = self.validate_fit_input(x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_classes = y.ncols();
        let SoftmaxConfig {
            learning_rate,
            epochs,
            batch_size,
            verbose,
            ..
        } = self.config.clone();

        info!(
            n_samples,
            n_features,
            n_classes,
            learning_rate,
            epochs,
            batch_size,
            "Fitting softmax classifier"
        );

        let mut weights = Array2::from_shape_fn((n_features, n_classes), |_| {
            rng.gen_range(-INIT_RANGE..=INIT_RANGE)
        });
        let mut bias = Array1::from_shape_fn(n_classes, |_| rng.gen_range(-INIT_RANGE..=INIT_RANGE));
        let mut losses = Array1::zeros(epochs);

        for epoch in 0..epochs {
            let probs = forward(x, &weights, &bias);
            let loss = cross_entropy_loss(y, &probs);
            losses[epoch] = loss;

            if verbose && epoch % 100 == 0 {
                info!(epoch, loss, "Softmax training loss");
            }

            let batch = index::sample(&mut *rng, n_samples, batch_size).into_vec();
            let x_batch = x.select(Axis(0), &batch);
            let mut delta = probs.select(Axis(0), &batch);
            for (row, &i) in batch.iter().enumerate() {
                delta[[row, targets[i]]] -= 1.0;
            }

            let dw = x_batch.t().dot(&delta) / batch_size as f64;
            let db = delta.sum_axis(Axis(0)) / batch_size as f64;

            weights.scaled_add(-learning_rate, &dw);
            bias.scaled_add(-learning_rate, &db);
        }

        let loss_history = losses.to_vec();
        if let Some(&final_loss) = loss_history.last() {
            info!(final_loss, "Softmax classifier fitted");
        }

        self.weights = Some(weights);
        self.bias = Some(bias);
        self.loss_history = loss_history;
        Ok(losses)
    }

    /// Check shapes, finiteness and one-hot rows; returns each row's true class.
    fn validate_fit_input(&self, x: &Array2<f64>, y: &Array2<f64>) -> Result<Vec<usize>> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(NetclassError::InvalidInput(format!(
                "cannot fit on a {}x{} feature matrix",
                x.nrows(),
                x.ncols()
            )));
        }
        if y.nrows() != x.nrows() {
            return Err(NetclassError::shape(
                format!("{} label rows", x.nrows()),
                format!("{} label rows", y.nrows()),
            ));
        }
        if y.ncols() == 0 {
            return Err(NetclassError::InvalidInput(
                "label matrix has no class columns".to_string(),
            ));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(NetclassError::InvalidInput(
                "feature matrix contains non-finite values".to_string(),
            ));
        }
        self.config.validate(x.nrows())?;

        y.rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let ones = row.iter().filter(|&&v| v == 1.0).count();
                let zeros = row.iter().filter(|&&v| v == 0.0).count();
                if ones == 1 && ones + zeros == row.len() {
                    Ok(argmax(row))
                } else {
                    Err(NetclassError::InvalidInput(format!(
                        "label row {} is not one-hot encoded",
                        i
                    )))
                }
            })
            .collect()
    }

    fn parameters(&self, x: &Array2<f64>) -> Result<(&Array2<f64>, &Array1<f64>)> {
        let (weights, bias) = match (&self.weights, &self.bias) {
            (Some(w), Some(b)) => (w, b),
            _ => return Err(NetclassError::NotFitted),
        };
        if x.ncols() != weights.nrows() {
            return Err(NetclassError::shape(
                format!("{} features", weights.nrows()),
                format!("{} features", x.ncols()),
            ));
        }
        Ok((weights, bias))
    }

    /// Class probabilities, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (weights, bias) = self.parameters(x)?;
        Ok(forward(x, weights, bias))
    }

    /// Index of the most probable class per sample
    pub fn predict_classes(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let probs = self.predict_proba(x)?;
        Ok(probs.rows().into_iter().map(argmax).collect())
    }

    /// One-hot rows with a single 1 at the most probable class
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let classes = self.predict_classes(x)?;
        let n_classes = self.n_classes().ok_or(NetclassError::NotFitted)?;
        let mut out = Array2::zeros((x.nrows(), n_classes));
        for (row, &class) in classes.iter().enumerate() {
            out[[row, class]] = 1.0;
        }
        debug!(n_rows = x.nrows(), "Softmax prediction");
        Ok(out)
    }
}

fn forward(x: &Array2<f64>, weights: &Array2<f64>, bias: &Array1<f64>) -> Array2<f64> {
    let logits = x.dot(weights) + bias;
    softmax(&logits)
}
