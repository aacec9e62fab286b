//! Shuffled, optionally stratified train/test splitting

use crate::error::{NetclassError, Result};
use ndarray::{Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;

/// Rows and labels on each side of a split
#[derive(Debug, Clone)]
pub struct TrainTestSplit<L> {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Vec<L>,
    pub y_test: Vec<L>,
}

/// Hold out `test_size` of the rows for evaluation.
///
/// With `stratify`, every class is split separately so class proportions carry
/// over; a class with at least two samples keeps one on each side.
pub fn train_test_split<L: Ord + Clone>(
    x: &Array2<f64>,
    y: &[L],
    test_size: f64,
    stratify: bool,
    seed: Option<u64>,
) -> Result<TrainTestSplit<L>> {
    match seed {
        Some(seed) => {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            split_with_rng(x, y, test_size, stratify, &mut rng)
        }
        None => split_with_rng(x, y, test_size, stratify, &mut StdRng::from_entropy()),
    }
}

fn split_with_rng<L: Ord + Clone, R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &[L],
    test_size: f64,
    stratify: bool,
    rng: &mut R,
) -> Result<TrainTestSplit<L>> {
    let n = x.nrows();
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(NetclassError::invalid_parameter(
            "test_size",
            test_size,
            "must be in (0, 1)",
        ));
    }
    if n != y.len() {
        return Err(NetclassError::shape(
            format!("y length = {}", n),
            format!("y length = {}", y.len()),
        ));
    }
    if n < 2 {
        return Err(NetclassError::InvalidInput(format!(
            "need at least 2 samples to split, got {}",
            n
        )));
    }

    let (mut train_indices, mut test_indices) = if stratify {
        let mut class_indices: BTreeMap<&L, Vec<usize>> = BTreeMap::new();
        for (i, label) in y.iter().enumerate() {
            class_indices.entry(label).or_default().push(i);
        }

        let mut train = Vec::with_capacity(n);
        let mut test = Vec::new();
        for indices in class_indices.values_mut() {
            indices.shuffle(rng);
            let n_test = if indices.len() < 2 {
                0
            } else {
                ((indices.len() as f64 * test_size).round() as usize).clamp(1, indices.len() - 1)
            };
            test.extend_from_slice(&indices[..n_test]);
            train.extend_from_slice(&indices[n_test..]);
        }
        (train, test)
    } else {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        let n_test = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);
        let train = indices.split_off(n_test);
        (train, indices)
    };

    if train_indices.is_empty() || test_indices.is_empty() {
        return Err(NetclassError::DataError(
            "split resulted in an empty train or test set".to_string(),
        ));
    }

    train_indices.shuffle(rng);
    test_indices.shuffle(rng);

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: train_indices.iter().map(|&i| y[i].clone()).collect(),
        y_test: test_indices.iter().map(|&i| y[i].clone()).collect(),
    })
}
