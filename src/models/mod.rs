//! Model adapters for brain tumor classification.
//!
//! Each adapter wraps one trained classifier behind the uniform
//! [`TumorClassifier`] contract so the ensemble coordinator never branches
//! on a concrete architecture. Two adapters exist:
//!
//! - [`FixedInputClassifier`] - binary tumor / no-tumor classifier with a
//!   softmax (or single-sigmoid) head, trained on OpenCV-style BGR frames
//!   scaled to [0, 1]
//! - [`NormalizedTensorClassifier`] - multi-class tumor-type classifier
//!   trained on torchvision-style RGB tensors with ImageNet
//!   mean/standard-deviation normalization

pub mod fixed_input;
pub mod normalized;

pub use fixed_input::{FixedInputClassifier, FixedInputClassifierConfig};
pub use normalized::{NormalizedTensorClassifier, NormalizedTensorClassifierConfig};

use crate::core::artifact::ArtifactProvider;
use crate::core::errors::ScanResult;
use crate::core::Tensor4D;
use image::DynamicImage;
use std::collections::BTreeMap;

/// The output of a single model's prediction.
///
/// Regardless of adapter type, the metadata bag always includes the model
/// name, input shape, and either the raw output vector or the full
/// class-probability mapping, so downstream aggregation has comparable
/// data.
#[derive(Debug, Clone)]
pub struct ModelPrediction {
    /// Estimated probability that the image shows a tumor, in [0, 1].
    pub tumor_probability: f32,
    /// Predicted class label, when the model distinguishes classes.
    pub predicted_label: Option<String>,
    /// Full class-probability mapping (label -> probability, sums to 1),
    /// when the model produces one.
    pub class_probabilities: Option<BTreeMap<String, f32>>,
    /// Opaque per-model metadata.
    pub metadata: serde_json::Value,
}

/// Introspection data for one model in the ensemble.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelInfo {
    /// Name of the model.
    pub model_name: String,
    /// Whether the model has been loaded successfully.
    pub is_loaded: bool,
    /// Expected input size (height, width).
    pub input_size: (u32, u32),
}

/// Uniform contract over one trained classifier: load, preprocess, predict.
///
/// Lifecycle: an adapter is constructed unloaded, `load` materializes the
/// model from an artifact provider, and `predict` is usable only after a
/// successful `load`. Adapters are read-only after `load`, so concurrent
/// predictions are safe; serialization against the underlying runtime
/// happens inside the inference engine.
pub trait TumorClassifier: Send + Sync + std::fmt::Debug {
    /// Returns the name identifying this model.
    fn name(&self) -> &str;

    /// Returns true once `load` has succeeded.
    fn is_loaded(&self) -> bool;

    /// Returns the expected input size (height, width).
    fn input_size(&self) -> (u32, u32);

    /// Resolves the model artifact(s) and materializes a usable in-memory
    /// model.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ArtifactNotFound` if neither the primary nor the
    /// fallback artifact exists, or a load error if the artifact cannot be
    /// turned into a session.
    fn load(&mut self, provider: &dyn ArtifactProvider) -> ScanResult<()>;

    /// Converts a decoded image into this model's input tensor.
    ///
    /// Resizes to the fixed input size, expands single-channel images to 3
    /// channels, applies the model's color order, pixel scaling, and (where
    /// configured) per-channel normalization, and adds a batch dimension of
    /// size 1.
    fn preprocess(&self, image: &DynamicImage) -> ScanResult<Tensor4D>;

    /// Runs preprocessing and inference for one image.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::ModelNotLoaded` if invoked before `load`
    /// succeeds, or a prediction error if inference fails.
    fn predict(&self, image: &DynamicImage) -> ScanResult<ModelPrediction>;

    /// Returns introspection data for this model.
    fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.name().to_string(),
            is_loaded: self.is_loaded(),
            input_size: self.input_size(),
        }
    }
}
