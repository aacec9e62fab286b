//! Label and one-hot encoding of traffic class names

use crate::error::{NetclassError, Result};
use crate::training::softmax::argmax;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Maps class names to indices in sorted name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the sorted set of distinct labels
    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<&mut Self> {
        if labels.is_empty() {
            return Err(NetclassError::InvalidInput(
                "cannot fit a label encoder on zero labels".to_string(),
            ));
        }
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        self.classes = classes;
        Ok(self)
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Class names; index `i` is encoded as `i`
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        if !self.is_fitted() {
            return Err(NetclassError::NotFitted);
        }
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.classes
                    .binary_search_by(|c| c.as_str().cmp(label))
                    .map_err(|_| NetclassError::InvalidInput(format!("unseen label '{}'", label)))
            })
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Vec<usize>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    pub fn inverse_transform(&self, indices: &[usize]) -> Result<Vec<String>> {
        if !self.is_fitted() {
            return Err(NetclassError::NotFitted);
        }
        indices
            .iter()
            .map(|&i| {
                self.classes.get(i).cloned().ok_or_else(|| {
                    NetclassError::InvalidInput(format!(
                        "class index {} out of range for {} classes",
                        i,
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }
}

/// Encodes class names as one-hot rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    labels: LabelEncoder,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<&mut Self> {
        self.labels.fit(labels)?;
        Ok(self)
    }

    /// Category names in column order
    pub fn categories(&self) -> &[String] {
        self.labels.classes()
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Array2<f64>> {
        let indices = self.labels.transform(labels)?;
        one_hot(&indices, self.labels.n_classes())
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<Array2<f64>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    /// Names of the argmax column of every row
    pub fn inverse_transform(&self, encoded: &Array2<f64>) -> Result<Vec<String>> {
        if !self.labels.is_fitted() {
            return Err(NetclassError::NotFitted);
        }
        if encoded.ncols() != self.labels.n_classes() {
            return Err(NetclassError::shape(
                format!("{} columns", self.labels.n_classes()),
                format!("{} columns", encoded.ncols()),
            ));
        }
        self.labels.inverse_transform(&argmax_rows(encoded))
    }
}

/// One-hot matrix with `n_classes` columns
pub fn one_hot(indices: &[usize], n_classes: usize) -> Result<Array2<f64>> {
    let mut out = Array2::zeros((indices.len(), n_classes));
    for (row, &class) in indices.iter().enumerate() {
        if class >= n_classes {
            return Err(NetclassError::InvalidInput(format!(
                "class index {} out of range for {} classes",
                class, n_classes
            )));
        }
        out[[row, class]] = 1.0;
    }
    Ok(out)
}

/// Column of the largest entry per row
pub fn argmax_rows(matrix: &Array2<f64>) -> Vec<usize> {
    matrix.rows().into_iter().map(argmax).collect()
}
