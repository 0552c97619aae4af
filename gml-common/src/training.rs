//! Model training and evaluation
//!
//! Holds out a stratified test split, fits the category mapping on the labeled corpus,
//! trains a balanced logistic regression on the training split and reports metrics on
//! the held-out rows.

use crate::dataset::TrainingExample;
use crate::features::{self, CategoryMapping, FEATURE_NAMES};
use crate::model::{LogisticModel, LogisticTrainer, TrainerParams};
use crate::scorer::{Classifier, DECISION_THRESHOLD};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Split and optimizer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Share of each class held out for evaluation
    pub test_fraction: f64,
    pub seed: u64,
    pub trainer: TrainerParams,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            trainer: TrainerParams::default(),
        }
    }
}

/// Held-out confusion counts (positive class = nominated)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }
}

/// Fitted coefficient of one feature, on the original feature scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCoefficient {
    pub feature: String,
    pub coefficient: f64,
}

/// Held-out evaluation of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Absent when the test split holds only one class
    pub roc_auc: Option<f64>,
    pub confusion: ConfusionMatrix,
    pub coefficients: Vec<FeatureCoefficient>,
    pub intercept: f64,
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model: LogisticModel,
    pub mapping: CategoryMapping,
    pub evaluation: EvaluationReport,
}

/// Indices of the training and test rows, each class split separately
///
/// Each class with at least two members contributes at least one test row and keeps
/// at least one training row. Both index lists come back sorted.
pub fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [false, true] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, label)| **label == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let held_out = if members.len() < 2 {
            0
        } else {
            ((members.len() as f64 * test_fraction).round() as usize).clamp(1, members.len() - 1)
        };
        test.extend_from_slice(&members[..held_out]);
        train.extend_from_slice(&members[held_out..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Train and evaluate on a labeled corpus
///
/// # Errors
/// - `Error::MissingData` if the corpus or the held-out split is empty
/// - `Error::InvalidInput` if the training split lacks one of the classes
pub fn train(corpus: &[TrainingExample], params: &TrainingParams) -> Result<TrainedModel> {
    if corpus.is_empty() {
        return Err(Error::MissingData("labeled training corpus is empty".to_string()));
    }

    let mapping = features::fit(corpus)?;
    let rows = corpus
        .iter()
        .map(|ex| features::encode(&ex.entry, &mapping).map(|v| v.to_array().to_vec()))
        .collect::<Result<Vec<_>>>()?;
    let labels: Vec<bool> = corpus.iter().map(|ex| ex.is_nominated).collect();

    let (train_idx, test_idx) = stratified_split(&labels, params.test_fraction, params.seed);
    if test_idx.is_empty() {
        return Err(Error::MissingData(
            "held-out split is empty; corpus too small to evaluate".to_string(),
        ));
    }
    debug!(train = train_idx.len(), test = test_idx.len(), "Stratified split");

    let pick_rows = |idx: &[usize]| idx.iter().map(|i| rows[*i].clone()).collect::<Vec<_>>();
    let pick_labels = |idx: &[usize]| idx.iter().map(|i| labels[*i]).collect::<Vec<_>>();

    let model = LogisticTrainer::new(params.trainer).fit(&pick_rows(&train_idx), &pick_labels(&train_idx))?;
    let evaluation = evaluate(&model, &pick_rows(&test_idx), &pick_labels(&test_idx), train_idx.len());

    info!(
        accuracy = %format!("{:.3}", evaluation.accuracy),
        precision = %format!("{:.3}", evaluation.precision),
        recall = %format!("{:.3}", evaluation.recall),
        f1 = %format!("{:.3}", evaluation.f1),
        roc_auc = ?evaluation.roc_auc,
        "Evaluated model on held-out split"
    );

    Ok(TrainedModel {
        model,
        mapping,
        evaluation,
    })
}

/// Metrics of `model` over held-out rows
pub fn evaluate(
    model: &LogisticModel,
    rows: &[Vec<f64>],
    labels: &[bool],
    train_size: usize,
) -> EvaluationReport {
    let probabilities: Vec<f64> = rows.iter().map(|r| model.predict_probability(r)).collect();

    let mut confusion = ConfusionMatrix::default();
    for (p, actual) in probabilities.iter().zip(labels) {
        match (*p >= DECISION_THRESHOLD, *actual) {
            (true, true) => confusion.true_positives += 1,
            (true, false) => confusion.false_positives += 1,
            (false, true) => confusion.false_negatives += 1,
            (false, false) => confusion.true_negatives += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let accuracy = ratio(
        confusion.true_positives + confusion.true_negatives,
        confusion.total(),
    );
    let precision = ratio(
        confusion.true_positives,
        confusion.true_positives + confusion.false_positives,
    );
    let recall = ratio(
        confusion.true_positives,
        confusion.true_positives + confusion.false_negatives,
    );
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    let coefficients = FEATURE_NAMES
        .iter()
        .zip(model.raw_coefficients())
        .map(|(feature, coefficient)| FeatureCoefficient {
            feature: feature.to_string(),
            coefficient,
        })
        .collect();

    EvaluationReport {
        train_size,
        test_size: rows.len(),
        accuracy,
        precision,
        recall,
        f1,
        roc_auc: roc_auc(&probabilities, labels),
        confusion,
        coefficients,
        intercept: model.intercept(),
    }
}

/// Area under the ROC curve via the rank-sum statistic; ties count half
fn roc_auc(probabilities: &[f64], labels: &[bool]) -> Option<f64> {
    let positives: Vec<f64> = probabilities
        .iter()
        .zip(labels)
        .filter(|(_, l)| **l)
        .map(|(p, _)| *p)
        .collect();
    let negatives: Vec<f64> = probabilities
        .iter()
        .zip(labels)
        .filter(|(_, l)| !**l)
        .map(|(p, _)| *p)
        .collect();
    if positives.is_empty() || negatives.is_empty() {
        return None;
    }

    let mut wins = 0.0;
    for p in &positives {
        for n in &negatives {
            if p > n {
                wins += 1.0;
            } else if p == n {
                wins += 0.5;
            }
        }
    }
    Some(wins / (positives.len() * negatives.len()) as f64)
}
