//! The ensemble coordinator.
//!
//! Fans a single decoded image out to every loaded model adapter, absorbs
//! per-adapter failures, harmonizes the heterogeneous outputs into a common
//! probability representation, and applies the configured selection
//! strategy to produce one reconciled verdict.

use crate::core::artifact::ArtifactProvider;
use crate::core::errors::{ScanError, ScanResult};
use crate::ensemble::diagnosis::{format_diagnosis, is_generic_label};
use crate::ensemble::record::{EnsembleResult, PredictionRecord, Readiness};
use crate::ensemble::strategy::SelectionStrategy;
use crate::models::{
    FixedInputClassifier, FixedInputClassifierConfig, ModelInfo, NormalizedTensorClassifier,
    NormalizedTensorClassifierConfig, TumorClassifier,
};
use image::DynamicImage;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Ensemble predictor that combines multiple tumor classifiers and selects
/// the best prediction according to a strategy chosen at construction.
///
/// Adapters are read-only after loading, so a shared `EnsemblePredictor`
/// can serve concurrent requests without additional locking.
#[derive(Debug)]
pub struct EnsemblePredictor {
    models: Vec<Box<dyn TumorClassifier>>,
    strategy: SelectionStrategy,
}

impl EnsemblePredictor {
    /// Creates an ensemble over the given models.
    ///
    /// Unloaded models stay listed for introspection but are skipped during
    /// prediction.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `models` is empty.
    pub fn new(
        models: Vec<Box<dyn TumorClassifier>>,
        strategy: SelectionStrategy,
    ) -> ScanResult<Self> {
        if models.is_empty() {
            return Err(ScanError::config_error(
                "at least one model must be provided",
            ));
        }
        info!(
            "ensemble initialized with {} models, strategy: {}",
            models.len(),
            strategy
        );
        Ok(Self { models, strategy })
    }

    /// Returns the strategy this ensemble dispatches to.
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    /// Predicts a diagnosis for one decoded image.
    ///
    /// Every loaded adapter runs against the image; an adapter that fails
    /// is logged and dropped for this call only. The surviving predictions
    /// are combined by the configured strategy. When any adapter produced
    /// class probabilities, the per-class means across those adapters
    /// resolve the final class label; the mean is deliberately unweighted
    /// even when the strategy trusts a single model's scalar decision.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::EnsembleExhausted` when no adapter produced a
    /// prediction.
    pub fn predict(&self, image: &DynamicImage) -> ScanResult<EnsembleResult> {
        let mut records: Vec<PredictionRecord> = Vec::with_capacity(self.models.len());
        let mut attempted = 0usize;

        for model in self.models.iter().filter(|m| m.is_loaded()) {
            attempted += 1;
            match model.predict(image) {
                Ok(prediction) => {
                    let record = PredictionRecord::from_prediction(model.name(), prediction);
                    info!(
                        "{}: tumor_prob={:.4}, confidence={:.4}",
                        record.model_name, record.tumor_probability, record.confidence
                    );
                    records.push(record);
                }
                Err(e) => {
                    error!("error predicting with {}: {}", model.name(), e);
                }
            }
        }

        if records.is_empty() {
            return Err(ScanError::EnsembleExhausted { attempted });
        }

        let class_probabilities = average_class_probabilities(&records);
        let selection = self.strategy.select(&records);

        let predicted_label = resolve_class_label(&class_probabilities);
        let diagnosis = format_diagnosis(predicted_label.as_deref(), selection.has_tumor);

        Ok(EnsembleResult {
            selected_model: selection.selected_model,
            tumor_probability: selection.tumor_probability,
            confidence: selection.confidence,
            has_tumor: selection.has_tumor,
            diagnosis,
            predicted_label,
            class_probabilities,
            num_models: records.len(),
            all_predictions: records,
            strategy: self.strategy,
            selection_reason: selection.selection_reason,
        })
    }

    /// Returns introspection data for every configured model.
    pub fn get_model_info(&self) -> Vec<ModelInfo> {
        self.models.iter().map(|m| m.info()).collect()
    }

    /// Returns the observable readiness of the ensemble.
    pub fn readiness(&self) -> Readiness {
        let configured = self.models.len();
        let loaded = self.models.iter().filter(|m| m.is_loaded()).count();
        if loaded == 0 {
            Readiness::NotReady
        } else if loaded < configured {
            Readiness::Degraded { loaded, configured }
        } else {
            Readiness::Ready
        }
    }
}

/// Averages the class-probability maps across the records that carry one.
///
/// Each class's probability is summed over the contributing records and
/// divided by the number of contributors. Binary-only adapters are skipped
/// here but still participate in strategy selection through their scalar
/// probability.
fn average_class_probabilities(records: &[PredictionRecord]) -> BTreeMap<String, f32> {
    let mut sums: BTreeMap<String, f32> = BTreeMap::new();
    let mut contributors = 0usize;

    for record in records {
        if let Some(map) = &record.class_probabilities {
            contributors += 1;
            for (label, probability) in map {
                *sums.entry(label.clone()).or_insert(0.0) += probability;
            }
        }
    }

    if contributors > 0 {
        let n = contributors as f32;
        for value in sums.values_mut() {
            *value /= n;
        }
    }
    sums
}

/// Resolves the final class label from the aggregated class map.
///
/// Fine-grained tumor-type labels are preferred over generic binary labels
/// because they are more clinically informative; generic labels are used
/// only when no specific label exists. Returns `None` for an empty map.
fn resolve_class_label(class_probabilities: &BTreeMap<String, f32>) -> Option<String> {
    if class_probabilities.is_empty() {
        return None;
    }

    let best_specific = max_label(
        class_probabilities
            .iter()
            .filter(|(label, _)| !is_generic_label(label)),
    );
    best_specific
        .or_else(|| max_label(class_probabilities.iter()))
        .map(|label| label.to_string())
}

/// Returns the label with the strictly greatest probability; the first
/// maximum in iteration order wins ties.
fn max_label<'a>(iter: impl Iterator<Item = (&'a String, &'a f32)>) -> Option<&'a String> {
    let mut best: Option<(&String, f32)> = None;
    for (label, &p) in iter {
        match best {
            Some((_, bp)) if p <= bp => {}
            _ => best = Some((label, p)),
        }
    }
    best.map(|(label, _)| label)
}

/// Builder that constructs and loads an ensemble from adapter configs.
///
/// Model loading is an expensive one-time startup operation; the builder
/// performs it eagerly so inference traffic is only served once readiness
/// is observable. A model whose artifact cannot be resolved is kept in the
/// ensemble unloaded and the failure is logged, leaving the service able to
/// start degraded.
#[derive(Debug, Default)]
pub struct EnsembleBuilder {
    strategy: Option<SelectionStrategy>,
    fixed_input: Vec<FixedInputClassifierConfig>,
    normalized_tensor: Vec<NormalizedTensorClassifierConfig>,
}

impl EnsembleBuilder {
    /// Creates a builder with the given selection strategy.
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy: Some(strategy),
            fixed_input: Vec::new(),
            normalized_tensor: Vec::new(),
        }
    }

    /// Adds a fixed-input binary classifier to the ensemble.
    pub fn fixed_input(mut self, config: FixedInputClassifierConfig) -> Self {
        self.fixed_input.push(config);
        self
    }

    /// Adds a normalized-tensor multi-class classifier to the ensemble.
    pub fn normalized_tensor(mut self, config: NormalizedTensorClassifierConfig) -> Self {
        self.normalized_tensor.push(config);
        self
    }

    /// Sets the selection strategy.
    pub fn strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Constructs every configured adapter, loads each through the
    /// provider, and builds the predictor.
    ///
    /// Configuration errors are fatal; load failures are logged and leave
    /// the affected adapter unloaded.
    pub fn build(self, provider: &dyn ArtifactProvider) -> ScanResult<EnsemblePredictor> {
        let strategy = self.strategy.unwrap_or(SelectionStrategy::MaxConfidence);
        let mut models: Vec<Box<dyn TumorClassifier>> = Vec::new();

        for config in self.fixed_input {
            let mut model = FixedInputClassifier::new(config)?;
            load_or_log(&mut model, provider);
            models.push(Box::new(model));
        }
        for config in self.normalized_tensor {
            let mut model = NormalizedTensorClassifier::new(config)?;
            load_or_log(&mut model, provider);
            models.push(Box::new(model));
        }

        EnsemblePredictor::new(models, strategy)
    }
}

/// Loads one model, logging instead of propagating a failure.
fn load_or_log(model: &mut dyn TumorClassifier, provider: &dyn ArtifactProvider) {
    if let Err(e) = model.load(provider) {
        error!(
            "error loading {}: {} - continuing without it",
            model.name(),
            e
        );
    }
}
