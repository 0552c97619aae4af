//! Terminal formatting of training results

use gml_common::dataset::{DataSource, Dataset};
use gml_common::training::EvaluationReport;
use gml_common::Prediction;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Formats dataset, evaluation and prediction summaries for the terminal
pub struct CliFormatter;

impl CliFormatter {
    pub fn format_dataset(dataset: &Dataset) -> String {
        let mut output = String::new();
        output.push_str("\nDataset:\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "Historical award rows: {}\n",
            dataset.count_by_source(DataSource::AwardHistorical)
        ));
        output.push_str(&format!(
            "Synthetic negatives:   {}\n",
            dataset.count_by_source(DataSource::SyntheticNegative)
        ));
        output.push_str(&format!(
            "Current chart entries: {}\n",
            dataset.count_by_source(DataSource::ChartCurrent)
        ));

        output.push_str("\nNull rates before imputation:\n");
        for (feature, rate) in &dataset.quality.null_rates {
            let flagged = dataset
                .quality
                .warnings
                .iter()
                .any(|w| &w.feature == feature);
            output.push_str(&format!(
                "  [{}] {:<26} {:>5.1}%\n",
                if flagged { "⚠" } else { "✓" },
                feature,
                rate * 100.0
            ));
        }
        output
    }

    /// Example: `Accuracy:  0.750`
    pub fn format_evaluation(report: &EvaluationReport) -> String {
        let mut output = String::new();
        output.push_str("\nModel performance (held-out split):\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "Train / test rows: {} / {}\n",
            report.train_size, report.test_size
        ));
        output.push_str(&format!("Accuracy:  {:.3}\n", report.accuracy));
        output.push_str(&format!("Precision: {:.3}\n", report.precision));
        output.push_str(&format!("Recall:    {:.3}\n", report.recall));
        output.push_str(&format!("F1 score:  {:.3}\n", report.f1));
        match report.roc_auc {
            Some(auc) => output.push_str(&format!("ROC AUC:   {:.3}\n", auc)),
            None => output.push_str("ROC AUC:   n/a (single class in test split)\n"),
        }

        let c = &report.confusion;
        output.push_str("\nConfusion matrix (rows: actual, columns: predicted):\n");
        output.push_str("              not nom.  nominated\n");
        output.push_str(&format!(
            "  not nom.    {:>8}  {:>9}\n",
            c.true_negatives, c.false_positives
        ));
        output.push_str(&format!(
            "  nominated   {:>8}  {:>9}\n",
            c.false_negatives, c.true_positives
        ));

        output.push_str("\nCoefficients:\n");
        for coefficient in &report.coefficients {
            output.push_str(&format!(
                "  {:<26} {:>+9.4}\n",
                coefficient.feature, coefficient.coefficient
            ));
        }
        output.push_str(&format!("  {:<26} {:>+9.4}\n", "(intercept)", report.intercept));
        output
    }

    /// Ranked list, at most `limit` rows
    pub fn format_predictions(predictions: &[Prediction], limit: usize) -> String {
        let mut output = String::new();
        output.push_str("\nCurrent chart predictions:\n");
        output.push_str(RULE);
        output.push('\n');
        for (position, p) in predictions.iter().take(limit).enumerate() {
            output.push_str(&format!(
                "{:>3}. [{}] {} by {} - {:.1}%\n",
                position + 1,
                if p.label { "✓" } else { "✗" },
                p.song_title,
                p.artist_name,
                p.probability * 100.0
            ));
            output.push_str(&format!("       {}\n", p.verdict));
        }
        if predictions.len() > limit {
            output.push_str(&format!("  ... {} more\n", predictions.len() - limit));
        }
        let likely = predictions.iter().filter(|p| p.label).count();
        output.push_str(&format!(
            "\n{} of {} entries predicted as likely nominees\n",
            likely,
            predictions.len()
        ));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gml_common::explain::VerdictBand;
    use gml_common::training::{ConfusionMatrix, FeatureCoefficient};

    fn prediction(song: &str, probability: f64) -> Prediction {
        let band = VerdictBand::for_probability(probability);
        Prediction {
            song_title: song.to_string(),
            artist_name: "SZA".to_string(),
            current_rank: Some(1),
            probability,
            label: probability >= 0.5,
            explanation: Vec::new(),
            verdict_band: band,
            verdict: band.summary().to_string(),
        }
    }

    #[test]
    fn test_format_predictions_marks_labels_and_truncates() {
        let predictions = vec![
            prediction("Snooze", 0.91),
            prediction("Saturn", 0.42),
            prediction("Kill Bill", 0.12),
        ];
        let output = CliFormatter::format_predictions(&predictions, 2);

        assert!(output.contains("  1. [✓] Snooze by SZA - 91.0%"));
        assert!(output.contains("  2. [✗] Saturn by SZA - 42.0%"));
        assert!(!output.contains("Kill Bill"));
        assert!(output.contains("... 1 more"));
        assert!(output.contains("1 of 3 entries predicted as likely nominees"));
    }

    #[test]
    fn test_format_evaluation_without_auc() {
        let report = EvaluationReport {
            train_size: 16,
            test_size: 4,
            accuracy: 0.75,
            precision: 1.0,
            recall: 0.5,
            f1: 2.0 / 3.0,
            roc_auc: None,
            confusion: ConfusionMatrix {
                true_negatives: 2,
                false_positives: 0,
                false_negatives: 1,
                true_positives: 1,
            },
            coefficients: vec![FeatureCoefficient {
                feature: "peak_position".to_string(),
                coefficient: -0.25,
            }],
            intercept: 0.5,
        };
        let output = CliFormatter::format_evaluation(&report);

        assert!(output.contains("Accuracy:  0.750"));
        assert!(output.contains("F1 score:  0.667"));
        assert!(output.contains("ROC AUC:   n/a"));
        assert!(output.contains("peak_position"));
        assert!(output.contains("-0.2500"));
    }
}
