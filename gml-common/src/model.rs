//! Balanced-class logistic regression, the default classifier
//!
//! Inputs are standardized with statistics taken from the training rows; the means
//! and scales travel with the coefficients so scoring applies the same transform.
//! Fitting is full-batch gradient descent from zero weights, so the same rows always
//! give the same model.

use crate::scorer::Classifier;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Fitted logistic regression parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    coefficients: Vec<f64>,
    intercept: f64,
    feature_means: Vec<f64>,
    feature_scales: Vec<f64>,
}

impl LogisticModel {
    /// Coefficients on standardized inputs
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn feature_means(&self) -> &[f64] {
        &self.feature_means
    }

    pub fn feature_scales(&self) -> &[f64] {
        &self.feature_scales
    }

    /// Coefficients on the original (unstandardized) feature scale
    pub fn raw_coefficients(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.feature_scales)
            .map(|(c, s)| c / s)
            .collect()
    }

    fn linear(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .zip(self.feature_means.iter().zip(&self.feature_scales))
            .fold(self.intercept, |acc, ((c, x), (m, s))| acc + c * (x - m) / s)
    }
}

impl Classifier for LogisticModel {
    fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.linear(features))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Hyperparameters for [`LogisticTrainer`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerParams {
    /// Inverse L2 regularization strength (larger = weaker penalty)
    pub regularization: f64,
    pub learning_rate: f64,
    pub max_iterations: usize,
    /// Stop once every gradient component is below this
    pub tolerance: f64,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self {
            regularization: 1.0,
            learning_rate: 0.5,
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Fits [`LogisticModel`] with class weights inversely proportional to class frequency
#[derive(Debug, Clone, Default)]
pub struct LogisticTrainer {
    params: TrainerParams,
}

impl LogisticTrainer {
    pub fn new(params: TrainerParams) -> Self {
        Self { params }
    }

    /// Fit on `rows` (all of equal width) with boolean `labels`
    ///
    /// # Errors
    /// `Error::InvalidInput` if rows and labels disagree in length, rows have unequal
    /// widths, or only one class is present.
    pub fn fit(&self, rows: &[Vec<f64>], labels: &[bool]) -> Result<LogisticModel> {
        if rows.is_empty() {
            return Err(Error::MissingData("no training rows".to_string()));
        }
        if rows.len() != labels.len() {
            return Err(Error::InvalidInput(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let width = rows[0].len();
        if rows.iter().any(|r| r.len() != width) {
            return Err(Error::InvalidInput("training rows differ in width".to_string()));
        }

        let n = rows.len() as f64;
        let positives = labels.iter().filter(|l| **l).count() as f64;
        let negatives = n - positives;
        if positives == 0.0 || negatives == 0.0 {
            return Err(Error::InvalidInput(
                "training labels must contain both classes".to_string(),
            ));
        }

        // Balanced weights: n / (classes * class_count)
        let positive_weight = n / (2.0 * positives);
        let negative_weight = n / (2.0 * negatives);
        let weights: Vec<f64> = labels
            .iter()
            .map(|l| if *l { positive_weight } else { negative_weight })
            .collect();

        let (means, scales) = standardization(rows, width);
        let standardized: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| {
                r.iter()
                    .zip(means.iter().zip(&scales))
                    .map(|(x, (m, s))| (x - m) / s)
                    .collect()
            })
            .collect();

        let mut coefficients = vec![0.0; width];
        let mut intercept = 0.0;
        let penalty = 1.0 / (self.params.regularization * n);
        let mut iterations = 0;

        for iteration in 0..self.params.max_iterations {
            iterations = iteration + 1;
            let mut gradient = vec![0.0; width];
            let mut intercept_gradient = 0.0;

            for ((row, label), weight) in standardized.iter().zip(labels).zip(&weights) {
                let z = row
                    .iter()
                    .zip(&coefficients)
                    .fold(intercept, |acc, (x, c)| acc + x * c);
                let error = weight * (sigmoid(z) - if *label { 1.0 } else { 0.0 });
                for (g, x) in gradient.iter_mut().zip(row) {
                    *g += error * x;
                }
                intercept_gradient += error;
            }

            let mut largest: f64 = (intercept_gradient / n).abs();
            for (g, c) in gradient.iter_mut().zip(&coefficients) {
                *g = *g / n + penalty * c;
                largest = largest.max(g.abs());
            }

            for (c, g) in coefficients.iter_mut().zip(&gradient) {
                *c -= self.params.learning_rate * g;
            }
            intercept -= self.params.learning_rate * intercept_gradient / n;

            if largest < self.params.tolerance {
                debug!(iteration, "Logistic regression converged");
                break;
            }
        }

        info!(
            rows = rows.len(),
            positives = positives as usize,
            iterations,
            "Trained balanced logistic regression"
        );

        Ok(LogisticModel {
            coefficients,
            intercept,
            feature_means: means,
            feature_scales: scales,
        })
    }
}

fn standardization(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut means = vec![0.0; width];
    for row in rows {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x / n;
        }
    }
    let mut scales = vec![0.0; width];
    for row in rows {
        for ((s, x), m) in scales.iter_mut().zip(row).zip(&means) {
            *s += (x - m).powi(2) / n;
        }
    }
    for s in scales.iter_mut() {
        *s = s.sqrt();
        // Constant column: leave it unscaled
        if *s < 1e-12 {
            *s = 1.0;
        }
    }
    (means, scales)
}
