//! Impurity measures over empirical class distributions
//!
//! Both measures take class probabilities rather than raw labels so they can be
//! shared between split search and node bookkeeping.

use std::collections::BTreeMap;

/// Shannon entropy in bits: `-Σ p·log2(p)`.
///
/// Zero probabilities contribute nothing (`0·log0 := 0`).
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    -probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

/// Gini impurity: `1 - Σ p²`.
pub fn gini_impurity(probabilities: &[f64]) -> f64 {
    1.0 - probabilities.iter().map(|&p| p * p).sum::<f64>()
}

/// Count how often each class appears, ordered by class.
pub fn class_counts<'a, L, I>(labels: I) -> BTreeMap<L, usize>
where
    L: Ord + Clone + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(label.clone()).or_insert(0) += 1;
    }
    counts
}

/// Empirical class frequencies, ordered by class. Empty input yields an empty map.
pub fn class_probabilities<'a, L, I>(labels: I) -> BTreeMap<L, f64>
where
    L: Ord + Clone + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let counts = class_counts(labels);
    let total: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(class, count)| (class, count as f64 / total as f64))
        .collect()
}

/// Entropy of a set of labels.
pub fn label_entropy<'a, L, I>(labels: I) -> f64
where
    L: Ord + Clone + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let probs: Vec<f64> = class_probabilities(labels).into_values().collect();
    shannon_entropy(&probs)
}

/// Sample-count-weighted entropy of a partition.
pub fn partition_entropy<L: Ord + Clone>(subsets: &[&[&L]]) -> f64 {
    let total: usize = subsets.iter().map(|s| s.len()).sum();
    if total == 0 {
        return 0.0;
    }
    subsets
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.len() as f64 / total as f64 * label_entropy(s.iter().copied()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_pure_is_zero() {
        assert_eq!(shannon_entropy(&[1.0]), 0.0);
        let labels = vec![3u8; 17];
        assert_eq!(label_entropy(labels.iter()), 0.0);
    }

    #[test]
    fn test_entropy_balanced_binary_is_one() {
        assert!((shannon_entropy(&[0.5, 0.5]) - 1.0).abs() < 1e-12);
        let labels: Vec<u8> = (0..40).map(|i| (i % 2) as u8).collect();
        assert!((label_entropy(labels.iter()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_ignores_zero_probabilities() {
        assert!((shannon_entropy(&[0.5, 0.0, 0.5]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini_impurity(&[1.0]), 0.0);
        for k in 2..6 {
            let uniform = vec![1.0 / k as f64; k];
            assert!((gini_impurity(&uniform) - (1.0 - 1.0 / k as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_class_probabilities_ordered() {
        let labels = vec!["b", "a", "b", "c"];
        let probs = class_probabilities(labels.iter());
        let keys: Vec<_> = probs.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(probs["b"], 0.5);
    }

    #[test]
    fn test_partition_entropy_weighted() {
        let (a, b) = (0, 1);
        let left = [&a, &a];
        let right = [&a, &b];
        // 2/4 * 0 + 2/4 * 1
        assert!((partition_entropy(&[&left[..], &right[..]]) - 0.5).abs() < 1e-12);
    }
}
