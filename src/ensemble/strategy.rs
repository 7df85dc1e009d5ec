//! Selection strategies for combining per-model predictions.
//!
//! A strategy is a pure function from a non-empty ordered sequence of
//! prediction records to a base decision. The strategy is chosen once at
//! coordinator construction and dispatched as an enum, never re-parsed per
//! call.

use crate::core::errors::ScanError;
use crate::ensemble::record::PredictionRecord;
use std::str::FromStr;

/// The decision policies available for combining predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Pick the single prediction with the highest confidence.
    MaxConfidence,
    /// Unweighted mean of all tumor probabilities and confidences.
    Average,
    /// Majority vote on tumor / no-tumor, ties resolving to no-tumor.
    Voting,
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectionStrategy::MaxConfidence => "max_confidence",
            SelectionStrategy::Average => "average",
            SelectionStrategy::Voting => "voting",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SelectionStrategy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_confidence" => Ok(SelectionStrategy::MaxConfidence),
            "average" => Ok(SelectionStrategy::Average),
            "voting" => Ok(SelectionStrategy::Voting),
            other => Err(ScanError::config_error(format!(
                "unknown strategy: {other}"
            ))),
        }
    }
}

/// The base decision produced by a strategy.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Identifier of the selected model, or a synthetic ensemble label.
    pub selected_model: String,
    /// Selected tumor probability.
    pub tumor_probability: f32,
    /// Selected confidence.
    pub confidence: f32,
    /// Binary decision derived from the selected probability.
    pub has_tumor: bool,
    /// Human-readable rationale for the selection.
    pub selection_reason: String,
}

impl SelectionStrategy {
    /// Applies this strategy to a non-empty sequence of records.
    ///
    /// All strategies tolerate a single record: its own values pass
    /// through for max-confidence and average, and a single voter always
    /// wins its own side.
    pub fn select(&self, predictions: &[PredictionRecord]) -> Selection {
        debug_assert!(!predictions.is_empty(), "select requires at least one record");
        match self {
            SelectionStrategy::MaxConfidence => select_max_confidence(predictions),
            SelectionStrategy::Average => select_average(predictions),
            SelectionStrategy::Voting => select_voting(predictions),
        }
    }
}

/// Picks the record with the highest confidence; the first maximum wins.
fn select_max_confidence(predictions: &[PredictionRecord]) -> Selection {
    let mut best = &predictions[0];
    for p in &predictions[1..] {
        if p.confidence > best.confidence {
            best = p;
        }
    }

    let tumor_probability = best.tumor_probability;
    Selection {
        selected_model: best.model_name.clone(),
        tumor_probability,
        confidence: best.confidence,
        has_tumor: tumor_probability > 0.5,
        selection_reason: format!("Highest confidence: {:.4}", best.confidence),
    }
}

/// Averages probabilities and confidences across all records.
fn select_average(predictions: &[PredictionRecord]) -> Selection {
    let n = predictions.len() as f32;
    let tumor_probability = predictions.iter().map(|p| p.tumor_probability).sum::<f32>() / n;
    let confidence = predictions.iter().map(|p| p.confidence).sum::<f32>() / n;

    let model_names: Vec<&str> = predictions.iter().map(|p| p.model_name.as_str()).collect();

    Selection {
        selected_model: format!("Ensemble({})", model_names.join(", ")),
        tumor_probability,
        confidence,
        has_tumor: tumor_probability > 0.5,
        selection_reason: format!("Average of {} models", predictions.len()),
    }
}

/// Majority vote on tumor / no-tumor.
///
/// A strict majority is required, so an even split resolves to no-tumor.
/// The final probability is the mean over the records that voted with the
/// winning side; the confidence is the normalized vote margin.
fn select_voting(predictions: &[PredictionRecord]) -> Selection {
    let total_votes = predictions.len();
    let tumor_votes = predictions
        .iter()
        .filter(|p| p.tumor_probability > 0.5)
        .count();

    let has_tumor = 2 * tumor_votes > total_votes;

    let winning_probs: Vec<f32> = predictions
        .iter()
        .map(|p| p.tumor_probability)
        .filter(|&p| if has_tumor { p > 0.5 } else { p <= 0.5 })
        .collect();
    let tumor_probability = if winning_probs.is_empty() {
        0.5
    } else {
        winning_probs.iter().sum::<f32>() / winning_probs.len() as f32
    };

    let no_tumor_votes = total_votes - tumor_votes;
    let confidence = (tumor_votes as f32 - no_tumor_votes as f32).abs() / total_votes as f32;

    Selection {
        selected_model: format!("Voting({tumor_votes}/{total_votes})"),
        tumor_probability,
        confidence,
        has_tumor,
        selection_reason: format!("Majority vote: {tumor_votes}/{total_votes} for tumor"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, tumor_probability: f32) -> PredictionRecord {
        PredictionRecord {
            model_name: name.to_string(),
            tumor_probability,
            confidence: tumor_probability.max(1.0 - tumor_probability),
            predicted_label: None,
            class_probabilities: None,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["max_confidence", "average", "voting"] {
            let strategy: SelectionStrategy = s.parse().unwrap();
            assert_eq!(strategy.to_string(), s);
        }
        assert!("majority".parse::<SelectionStrategy>().is_err());
    }

    #[test]
    fn test_max_confidence_selects_highest() {
        let records = vec![record("a", 0.9), record("b", 0.2)];
        let selection = SelectionStrategy::MaxConfidence.select(&records);

        assert_eq!(selection.selected_model, "a");
        assert!((selection.confidence - 0.9).abs() < 1e-6);
        assert!(selection.has_tumor);
    }

    #[test]
    fn test_max_confidence_tie_keeps_first() {
        // Both records have confidence 0.8 (0.8 and 0.2 are equidistant
        // from the boundary); the first encountered must win.
        let records = vec![record("first", 0.2), record("second", 0.8)];
        let selection = SelectionStrategy::MaxConfidence.select(&records);

        assert_eq!(selection.selected_model, "first");
        assert!(!selection.has_tumor);
    }

    #[test]
    fn test_average_exact_boundary_is_not_tumor() {
        let records = vec![record("a", 0.9), record("b", 0.1)];
        let selection = SelectionStrategy::Average.select(&records);

        assert!((selection.tumor_probability - 0.5).abs() < 1e-6);
        assert!(!selection.has_tumor);
        assert_eq!(selection.selected_model, "Ensemble(a, b)");
    }

    #[test]
    fn test_voting_majority_tumor() {
        let records = vec![record("a", 0.9), record("b", 0.8), record("c", 0.3)];
        let selection = SelectionStrategy::Voting.select(&records);

        assert!(selection.has_tumor);
        assert!((selection.tumor_probability - 0.85).abs() < 1e-6);
        assert!((selection.confidence - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(selection.selected_model, "Voting(2/3)");
    }

    #[test]
    fn test_voting_even_split_resolves_to_no_tumor() {
        let records = vec![
            record("a", 0.9),
            record("b", 0.8),
            record("c", 0.3),
            record("d", 0.2),
        ];
        let selection = SelectionStrategy::Voting.select(&records);

        assert!(!selection.has_tumor);
        assert!((selection.tumor_probability - 0.25).abs() < 1e-6);
        assert!(selection.confidence.abs() < 1e-6);
    }

    #[test]
    fn test_single_record_passes_through() {
        let records = vec![record("only", 0.7)];

        let max = SelectionStrategy::MaxConfidence.select(&records);
        assert!((max.tumor_probability - 0.7).abs() < 1e-6);
        assert_eq!(max.selected_model, "only");

        let avg = SelectionStrategy::Average.select(&records);
        assert!((avg.tumor_probability - 0.7).abs() < 1e-6);

        let vote = SelectionStrategy::Voting.select(&records);
        assert!(vote.has_tumor);
        assert!((vote.tumor_probability - 0.7).abs() < 1e-6);
        assert!((vote.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_has_tumor_matches_probability_for_all_strategies() {
        let cases = vec![
            vec![record("a", 0.6), record("b", 0.4)],
            vec![record("a", 0.1), record("b", 0.95), record("c", 0.55)],
            vec![record("a", 0.5)],
        ];
        for records in cases {
            for strategy in [
                SelectionStrategy::MaxConfidence,
                SelectionStrategy::Average,
                SelectionStrategy::Voting,
            ] {
                let selection = strategy.select(&records);
                assert_eq!(
                    selection.has_tumor,
                    selection.tumor_probability > 0.5,
                    "{strategy} violated the has_tumor invariant"
                );
            }
        }
    }
}
