//! Integration test: classifiers end-to-end

use ndarray::{array, Array2, Axis};
use netclass::error::NetclassError;
use netclass::preprocessing::{argmax_rows, one_hot, train_test_split, StandardScaler};
use netclass::training::{
    accuracy, ClassificationReport, DecisionTree, DecisionTreeConfig, SoftmaxClassifier,
    SoftmaxConfig,
};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Two square clusters centred on (-2, -2) and (2, 2)
fn two_blobs(n_per_class: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let n = n_per_class * 2;
    let mut x = Array2::zeros((n, 2));
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let class = i % 2;
        let centre = if class == 0 { -2.0 } else { 2.0 };
        x[[i, 0]] = centre + rng.gen_range(-1.0..1.0);
        x[[i, 1]] = centre + rng.gen_range(-1.0..1.0);
        y.push(class);
    }
    (x, y)
}

fn noisy_dataset(n: usize, n_features: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, n_features), |_| rng.gen_range(0.0..255.0));
    let y = (0..n).map(|_| rng.gen_range(0..4)).collect();
    (x, y)
}

#[test]
fn test_tree_splits_between_classes() {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = vec![0usize, 0, 1, 1];

    let mut tree = DecisionTree::new(
        DecisionTreeConfig::default()
            .with_max_depth(2)
            .with_min_info_gain(0.01),
    );
    tree.fit(&x, &y).unwrap();

    let root = tree.root().unwrap();
    assert_eq!(root.column, 0);
    assert!(root.threshold >= 1.0 && root.threshold < 2.0);

    let left = root.left.as_ref().unwrap();
    let right = root.right.as_ref().unwrap();
    assert_eq!(left.entropy, 0.0);
    assert_eq!(right.entropy, 0.0);

    let predictions = tree.predict(&array![[0.5], [2.5]]).unwrap();
    assert_eq!(predictions.to_vec(), vec![0, 1]);
}

#[test]
fn test_tree_depth_never_exceeds_limit() {
    let (x, y) = noisy_dataset(300, 4, 11);
    for max_depth in [1, 2, 3, 5, 8] {
        let mut tree = DecisionTree::new(
            DecisionTreeConfig::default()
                .with_max_depth(max_depth)
                .with_min_info_gain(0.0),
        );
        tree.fit(&x, &y).unwrap();
        assert!(
            tree.depth() <= max_depth,
            "depth {} exceeds max_depth {}",
            tree.depth(),
            max_depth
        );
    }
}

#[test]
fn test_tree_fit_is_deterministic() {
    let (x, y) = noisy_dataset(200, 3, 5);
    let mut a = DecisionTree::new(DecisionTreeConfig::default());
    let mut b = DecisionTree::new(DecisionTreeConfig::default());
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();

    assert_eq!(a.root(), b.root());
    assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
}

#[test]
fn test_tree_refit_replaces_previous_model() {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let mut tree = DecisionTree::new(DecisionTreeConfig::default().with_min_info_gain(0.01));

    tree.fit(&x, &[0usize, 0, 1, 1]).unwrap();
    tree.fit(&x, &[1usize, 1, 0, 0]).unwrap();

    let predictions = tree.predict(&array![[0.5], [2.5]]).unwrap();
    assert_eq!(predictions.to_vec(), vec![1, 0]);
}

#[test]
fn test_tree_with_string_labels() {
    let x = array![[1.0, 0.0], [2.0, 0.0], [8.0, 1.0], [9.0, 1.0]];
    let y = vec!["benign", "benign", "malicious", "malicious"];

    let mut tree = DecisionTree::new(DecisionTreeConfig::default().with_min_info_gain(0.01));
    tree.fit(&x, &y).unwrap();

    assert_eq!(tree.predict(&array![[1.5, 0.0]]).unwrap()[0], "benign");
    assert_eq!(tree.predict(&array![[8.5, 1.0]]).unwrap()[0], "malicious");
}

#[test]
fn test_tree_learns_blobs() {
    let (x, y) = two_blobs(100, 3);
    let split = train_test_split(&x, &y, 0.2, true, Some(3)).unwrap();

    let mut tree = DecisionTree::new(DecisionTreeConfig::default());
    tree.fit(&split.x_train, &split.y_train).unwrap();
    let predictions = tree.predict(&split.x_test).unwrap();

    let acc = accuracy(&split.y_test, &predictions.to_vec()).unwrap();
    assert!(acc >= 0.95, "tree accuracy {}", acc);
}

#[test]
fn test_unfitted_models_fail_to_predict() {
    let x = array![[1.0, 2.0]];

    let tree: DecisionTree = DecisionTree::default();
    assert!(matches!(tree.predict(&x), Err(NetclassError::NotFitted)));

    let model = SoftmaxClassifier::default();
    assert!(matches!(model.predict(&x), Err(NetclassError::NotFitted)));
    assert!(matches!(model.predict_proba(&x), Err(NetclassError::NotFitted)));
}

#[test]
fn test_softmax_separates_blobs() {
    let (x, y) = two_blobs(150, 42);
    let split = train_test_split(&x, &y, 0.2, true, Some(42)).unwrap();
    let y_train = one_hot(&split.y_train, 2).unwrap();

    let config = SoftmaxConfig::default()
        .with_learning_rate(0.01)
        .with_epochs(500)
        .with_batch_size(32)
        .with_random_state(42);
    let mut model = SoftmaxClassifier::new(config);
    let losses = model.fit(&split.x_train, &y_train).unwrap();
    assert_eq!(losses.len(), 500);
    assert!(losses[499] < losses[0]);

    let predicted = model.predict(&split.x_test).unwrap();
    let acc = accuracy(&split.y_test, &argmax_rows(&predicted)).unwrap();
    assert!(acc >= 0.9, "softmax accuracy {}", acc);
}

#[test]
fn test_softmax_outputs_are_distributions_and_one_hot() {
    let (x, y) = two_blobs(40, 7);
    let x = StandardScaler::new().fit_transform(&x).unwrap();
    let y = one_hot(&y, 2).unwrap();

    let mut model = SoftmaxClassifier::new(
        SoftmaxConfig::default()
            .with_epochs(50)
            .with_batch_size(16)
            .with_random_state(1),
    );
    model.fit(&x, &y).unwrap();

    let probs = model.predict_proba(&x).unwrap();
    for sum in probs.sum_axis(Axis(1)).iter() {
        assert!((sum - 1.0).abs() < 1e-9);
    }

    let predicted = model.predict(&x).unwrap();
    assert_eq!(predicted.dim(), (80, 2));
    for row in predicted.rows() {
        assert_eq!(row.iter().filter(|&&v| v == 1.0).count(), 1);
        assert_eq!(row.iter().filter(|&&v| v == 0.0).count(), 1);
    }
}

#[test]
fn test_softmax_seeded_fit_is_reproducible() {
    let (x, y) = two_blobs(30, 9);
    let y = one_hot(&y, 2).unwrap();
    let config = SoftmaxConfig::default()
        .with_epochs(100)
        .with_batch_size(8)
        .with_random_state(17);

    let mut a = SoftmaxClassifier::new(config.clone());
    let mut b = SoftmaxClassifier::new(config);
    let la = a.fit(&x, &y).unwrap();
    let lb = b.fit(&x, &y).unwrap();

    assert_eq!(la, lb);
    assert_eq!(a.weights(), b.weights());
}

#[test]
fn test_softmax_rejects_oversized_batch() {
    let (x, y) = two_blobs(5, 1);
    let y = one_hot(&y, 2).unwrap();
    let mut model = SoftmaxClassifier::new(SoftmaxConfig::default().with_batch_size(32));

    assert!(matches!(
        model.fit(&x, &y),
        Err(NetclassError::InvalidParameter { .. })
    ));
    assert!(!model.is_fitted());
}

#[test]
fn test_classification_report_for_tree() {
    let (x, y) = two_blobs(50, 21);
    let mut tree = DecisionTree::new(DecisionTreeConfig::default());
    tree.fit(&x, &y).unwrap();
    let predictions = tree.predict(&x).unwrap().to_vec();

    let names = vec!["low".to_string(), "high".to_string()];
    let report = ClassificationReport::new(&y, &predictions, &names).unwrap();
    assert_eq!(report.n_samples, 100);
    assert_eq!(report.classes.len(), 2);
    assert_eq!(report.confusion_matrix.sum(), 100);

    let text = report.to_string();
    assert!(text.contains("low"));
    assert!(text.contains("high"));
}
