//! Result records for ensemble prediction.
//!
//! These types are serialized directly by the service layer, so field names
//! match the wire format consumed by the backend.

use crate::ensemble::strategy::SelectionStrategy;
use crate::models::ModelPrediction;
use std::collections::BTreeMap;

/// One model's contribution to an ensemble call.
///
/// Created fresh per inference call; immutable once produced.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PredictionRecord {
    /// Name of the contributing model.
    pub model_name: String,
    /// Estimated tumor probability in [0, 1].
    pub tumor_probability: f32,
    /// Distance from the 0.5 decision boundary: max(p, 1-p).
    pub confidence: f32,
    /// Predicted class label, when the model distinguishes classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<String>,
    /// Full class-probability mapping, when the model produces one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_probabilities: Option<BTreeMap<String, f32>>,
    /// Opaque per-model metadata.
    pub metadata: serde_json::Value,
}

impl PredictionRecord {
    /// Builds a record from a model's prediction, computing the confidence
    /// from the tumor probability.
    pub fn from_prediction(model_name: &str, prediction: ModelPrediction) -> Self {
        let p = prediction.tumor_probability;
        Self {
            model_name: model_name.to_string(),
            tumor_probability: p,
            confidence: p.max(1.0 - p),
            predicted_label: prediction.predicted_label,
            class_probabilities: prediction.class_probabilities,
            metadata: prediction.metadata,
        }
    }
}

/// The reconciled decision of an ensemble call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnsembleResult {
    /// Identifier of the selected model, or a synthetic ensemble label.
    pub selected_model: String,
    /// Final tumor probability in [0, 1].
    pub tumor_probability: f32,
    /// Final confidence score.
    pub confidence: f32,
    /// Binary decision; always exactly `tumor_probability > 0.5`.
    pub has_tumor: bool,
    /// Human-readable diagnosis string.
    pub diagnosis: String,
    /// Resolved class label, when any model produced class probabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<String>,
    /// Class probabilities averaged across the models that produced them.
    pub class_probabilities: BTreeMap<String, f32>,
    /// Every surviving model's contribution, in adapter order.
    pub all_predictions: Vec<PredictionRecord>,
    /// The strategy used for selection.
    pub strategy: SelectionStrategy,
    /// Number of models that successfully produced a prediction.
    pub num_models: usize,
    /// Why the strategy selected this decision.
    pub selection_reason: String,
}

/// Observable readiness of the ensemble.
///
/// Distinguishes "no model ever loaded" from "ready but running with fewer
/// adapters than configured".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// No model is loaded; predictions will fail.
    NotReady,
    /// Some configured models failed to load; predictions run degraded.
    Degraded {
        /// Number of models currently loaded.
        loaded: usize,
        /// Number of models configured.
        configured: usize,
    },
    /// Every configured model is loaded.
    Ready,
}
