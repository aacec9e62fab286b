//! Classification metrics for evaluating fitted models

use crate::error::{NetclassError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_lengths(n_true: usize, n_pred: usize) -> Result<()> {
    if n_true != n_pred {
        return Err(NetclassError::shape(
            format!("{} predictions", n_true),
            format!("{} predictions", n_pred),
        ));
    }
    if n_true == 0 {
        return Err(NetclassError::InvalidInput(
            "cannot score an empty prediction set".to_string(),
        ));
    }
    Ok(())
}

/// Fraction of predictions equal to the true label
pub fn accuracy<L: PartialEq>(y_true: &[L], y_pred: &[L]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// `n_classes x n_classes` counts; rows are true classes, columns predictions.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Result<Array2<usize>> {
    check_lengths(y_true.len(), y_pred.len())?;
    let mut matrix = Array2::zeros((n_classes, n_classes));
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        if t >= n_classes || p >= n_classes {
            return Err(NetclassError::InvalidInput(format!(
                "class index {} out of range for {} classes",
                t.max(p),
                n_classes
            )));
        }
        matrix[[t, p]] += 1;
    }
    Ok(matrix)
}

/// Precision, recall and F1 of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Per-class and averaged scores over a set of predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub n_samples: usize,
    pub confusion_matrix: Array2<usize>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationReport {
    /// Score class-index predictions; `class_names[i]` names class `i`.
    pub fn new(y_true: &[usize], y_pred: &[usize], class_names: &[String]) -> Result<Self> {
        let n_classes = class_names.len();
        let cm = confusion_matrix(y_true, y_pred, n_classes)?;
        let n_samples = y_true.len();

        let classes: Vec<ClassMetrics> = class_names
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let tp = cm[[c, c]];
                let predicted = cm.column(c).sum();
                let support = cm.row(c).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    name: name.clone(),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let k = n_classes.max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / k,
        };

        let weight = |c: &ClassMetrics| c.support as f64 / n_samples as f64;
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|c| weight(c) * c.precision).sum(),
            recall: classes.iter().map(|c| weight(c) * c.recall).sum(),
            f1_score: classes.iter().map(|c| weight(c) * c.f1_score).sum(),
        };

        let accuracy = ratio(cm.diag().sum(), n_samples);

        Ok(Self {
            classes,
            accuracy,
            macro_avg,
            weighted_avg,
            n_samples,
            confusion_matrix: cm,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.name, c.precision, c.recall, c.f1_score, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.n_samples
        )?;
        for (label, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, avg.precision, avg.recall, avg.f1_score, self.n_samples
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class_{}", i)).collect()
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap(), 0.75);
        assert!(matches!(accuracy::<u8>(&[], &[]), Err(NetclassError::InvalidInput(_))));
        assert!(matches!(accuracy(&[1], &[1, 2]), Err(NetclassError::ShapeError { .. })));
    }

    #[test]
    fn test_confusion_matrix() {
        let cm = confusion_matrix(&[0, 0, 1, 2, 2], &[0, 1, 1, 2, 0], 3).unwrap();
        assert_eq!(cm, array![[1, 1, 0], [0, 1, 0], [1, 0, 1]]);
        assert!(confusion_matrix(&[3], &[0], 3).is_err());
    }

    #[test]
    fn test_report_values() {
        let report = ClassificationReport::new(&[0, 0, 1, 1], &[0, 1, 1, 1], &names(2)).unwrap();

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.classes[0].precision, 1.0);
        assert_eq!(report.classes[0].recall, 0.5);
        assert!((report.classes[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.classes[1].recall, 1.0);
        assert_eq!(report.classes[1].support, 2);
        assert!((report.macro_avg.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_report_unpredicted_class_scores_zero() {
        let report = ClassificationReport::new(&[0, 1, 2], &[0, 0, 0], &names(3)).unwrap();
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[2].f1_score, 0.0);
    }

    #[test]
    fn test_report_display_lists_classes() {
        let report = ClassificationReport::new(&[0, 1], &[0, 1], &names(2)).unwrap();
        let text = report.to_string();
        assert!(text.contains("class_0"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("1.00"));
    }
}
