//! netclass CLI module
//!
//! Command-line driver that loads a traffic log, trains one of the classifiers
//! on a stratified split and prints an evaluation report.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::preprocessing::{one_hot, train_test_split, LabelEncoder, StandardScaler};
use crate::training::{ClassificationReport, DecisionTree, SoftmaxClassifier, TrainingConfig};
use crate::utils::{load_labels, LoadOptions, TrafficDataset};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "netclass")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decision tree and softmax classifiers for network traffic")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Input and split options shared by every command
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Traffic CSV file with a header row
    #[arg(short, long)]
    pub data: PathBuf,

    /// Label file: a header line, then one class per CSV row
    #[arg(short, long, conflicts_with = "target")]
    pub labels: Option<PathBuf>,

    /// Label column inside the CSV
    #[arg(short, long)]
    pub target: Option<String>,

    /// JSON training config; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,

    /// Seed for the split and the softmax classifier
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train and evaluate the decision tree
    Tree {
        #[command(flatten)]
        data: DataArgs,

        /// Maximum number of node levels
        #[arg(long)]
        max_depth: Option<usize>,

        /// Minimum information gain to keep splitting
        #[arg(long)]
        min_info_gain: Option<f64>,
    },

    /// Train and evaluate the softmax classifier
    Softmax {
        #[command(flatten)]
        data: DataArgs,

        /// Gradient descent step size
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Number of epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Mini-batch size
        #[arg(long)]
        batch_size: Option<usize>,

        /// Log the training loss every 100 epochs
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show dataset shape and class distribution
    Info {
        #[command(flatten)]
        data: DataArgs,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

fn load_config(args: &DataArgs) -> anyhow::Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(test_size) = args.test_size {
        config.test_size = test_size;
    }
    if let Some(seed) = args.seed {
        config.random_state = Some(seed);
        config.softmax.random_state = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Load features and their string labels from either a target column or a label file
pub fn load_dataset(args: &DataArgs) -> anyhow::Result<(TrafficDataset, Vec<String>)> {
    let mut options = LoadOptions::default();
    if let Some(target) = &args.target {
        options = options.with_target(target.clone());
    }

    let start = Instant::now();
    let mut dataset = TrafficDataset::load_csv(&args.data, &options)?;

    let labels = match (dataset.labels.take(), &args.labels) {
        (Some(labels), _) => labels,
        (None, Some(path)) => load_labels(path)?,
        (None, None) => anyhow::bail!("either --target or --labels is required"),
    };
    if labels.len() != dataset.n_samples() {
        anyhow::bail!(
            "{} labels for {} rows in {}",
            labels.len(),
            dataset.n_samples(),
            args.data.display()
        );
    }

    step_ok(&format!(
        "Loaded {} rows × {} features in {:?}",
        dataset.n_samples(),
        dataset.n_features(),
        start.elapsed()
    ));
    Ok((dataset, labels))
}

fn print_report(report: &ClassificationReport) {
    section("Report");
    for line in report.to_string().lines() {
        println!("  {}", line);
    }

    section("Confusion matrix");
    for row in report.confusion_matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>6}", v)).collect();
        println!("  {}", cells.join(""));
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_tree(
    args: &DataArgs,
    max_depth: Option<usize>,
    min_info_gain: Option<f64>,
) -> anyhow::Result<()> {
    section("Decision tree");

    let mut config = load_config(args)?;
    if let Some(depth) = max_depth {
        config.tree.max_depth = depth;
    }
    if let Some(gain) = min_info_gain {
        config.tree.min_info_gain = gain;
    }

    let (dataset, labels) = load_dataset(args)?;
    let mut encoder = LabelEncoder::new();
    let y = encoder.fit_transform(&labels)?;

    let split = train_test_split(
        &dataset.features,
        &y,
        config.test_size,
        config.stratify,
        config.random_state,
    )?;

    let start = Instant::now();
    let mut tree = DecisionTree::new(config.tree.clone());
    tree.fit(&split.x_train, &split.y_train)?;
    step_ok(&format!(
        "Fitted depth {} tree with {} nodes ({} leaves) in {:?}",
        tree.depth(),
        tree.n_nodes(),
        tree.n_leaves(),
        start.elapsed()
    ));

    let predictions = tree.predict(&split.x_test)?;
    let report = ClassificationReport::new(&split.y_test, &predictions.to_vec(), encoder.classes())?;
    print_report(&report);
    Ok(())
}

pub fn cmd_softmax(
    args: &DataArgs,
    learning_rate: Option<f64>,
    epochs: Option<usize>,
    batch_size: Option<usize>,
    verbose: bool,
) -> anyhow::Result<()> {
    section("Softmax classifier");

    let mut config = load_config(args)?;
    if let Some(lr) = learning_rate {
        config.softmax.learning_rate = lr;
    }
    if let Some(epochs) = epochs {
        config.softmax.epochs = epochs;
    }
    if let Some(batch_size) = batch_size {
        config.softmax.batch_size = batch_size;
    }
    config.softmax.verbose |= verbose;

    let (dataset, labels) = load_dataset(args)?;
    let mut encoder = LabelEncoder::new();
    let y = encoder.fit_transform(&labels)?;

    let split = train_test_split(
        &dataset.features,
        &y,
        config.test_size,
        config.stratify,
        config.random_state,
    )?;

    let (x_train, x_test) = if config.scale_features {
        let mut scaler = StandardScaler::new();
        (scaler.fit_transform(&split.x_train)?, scaler.transform(&split.x_test)?)
    } else {
        (split.x_train, split.x_test)
    };
    let y_train = one_hot(&split.y_train, encoder.n_classes())?;

    let start = Instant::now();
    let mut model = SoftmaxClassifier::new(config.softmax.clone());
    let losses = model.fit(&x_train, &y_train)?;
    step_ok(&format!(
        "Fitted {} epochs in {:?} (final loss {:.4})",
        losses.len(),
        start.elapsed(),
        losses.iter().last().copied().unwrap_or(f64::NAN)
    ));

    let predictions = model.predict_classes(&x_test)?;
    let report = ClassificationReport::new(&split.y_test, &predictions.to_vec(), encoder.classes())?;
    print_report(&report);
    Ok(())
}

pub fn cmd_info(args: &DataArgs) -> anyhow::Result<()> {
    section("Dataset");

    let (dataset, labels) = load_dataset(args)?;
    println!("  {}", dataset.feature_names.join(", "));

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in &labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }

    section("Classes");
    for (label, count) in counts {
        println!(
            "  {:<24} {:>8} {}",
            label,
            count,
            dim(&format!("{:.1}%", 100.0 * count as f64 / labels.len() as f64))
        );
    }
    Ok(())
}
