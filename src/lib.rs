//! # NeuroScan
//!
//! A Rust library that classifies brain MRI scans using an ensemble of
//! independently trained ONNX models.
//!
//! ## Features
//!
//! - Uniform adapter contract over heterogeneous classifier architectures
//! - Binary (tumor / no-tumor) and multi-class (tumor type) model support
//! - Pluggable decision fusion: max-confidence, average, majority voting
//! - Partial-failure tolerance: one crashing model does not fail a request
//! - Readiness introspection for degraded-startup scenarios
//! - ONNX Runtime integration for fast inference
//!
//! ## Components
//!
//! - **Model adapters**: per-architecture wrappers exposing `{load,
//!   preprocess, predict}` over a trained classifier
//! - **Ensemble predictor**: fans one image out to every loaded adapter and
//!   reconciles the results into a single clinical decision
//! - **Selection strategies**: interchangeable policies for combining
//!   per-model predictions
//! - **Diagnosis formatting**: maps predicted class labels to human-readable
//!   diagnosis strings
//!
//! ## Modules
//!
//! * [`core`] - Error handling, artifact resolution, and the inference engine
//! * [`models`] - The classifier trait and concrete model adapters
//! * [`ensemble`] - Ensemble coordination, strategies, and result types
//! * [`processors`] - Image normalization and classification post-processing
//! * [`utils`] - Image loading and conversion helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neuroscan::prelude::*;
//! use neuroscan::core::artifact::{ArtifactLocator, LocalArtifactStore};
//! use neuroscan::models::{FixedInputClassifierConfig, NormalizedTensorClassifierConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalArtifactStore::new("/var/cache/models");
//!
//! let binary = FixedInputClassifierConfig {
//!     model_name: "cnn_binary".to_string(),
//!     artifacts: ArtifactLocator::new("brain_tumor/cnn/model.onnx"),
//!     ..Default::default()
//! };
//! let multiclass = NormalizedTensorClassifierConfig {
//!     model_name: "resnet18_multiclass".to_string(),
//!     artifacts: ArtifactLocator::new("brain_tumor/resnet18/model.onnx"),
//!     ..Default::default()
//! };
//!
//! let predictor = EnsembleBuilder::new(SelectionStrategy::MaxConfidence)
//!     .fixed_input(binary)
//!     .normalized_tensor(multiclass)
//!     .build(&store)?;
//!
//! let image = load_image(std::path::Path::new("scan.jpg"))?;
//! let result = predictor.predict(&image.into())?;
//! println!("{}: p={:.4}", result.diagnosis, result.tumor_probability);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod ensemble;
pub mod models;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use neuroscan::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - Ensemble entry points (`EnsemblePredictor`, `EnsembleBuilder`)
/// - Strategies and results (`SelectionStrategy`, `EnsembleResult`)
/// - Essential error and result types (`ScanError`, `ScanResult`)
/// - Basic image loading (`load_image`)
///
/// For advanced customization (adapter configs, artifact providers,
/// processors), import directly from the respective modules.
pub mod prelude {
    pub use crate::ensemble::{
        EnsembleBuilder, EnsemblePredictor, EnsembleResult, PredictionRecord, Readiness,
        SelectionStrategy,
    };

    pub use crate::core::{ScanError, ScanResult};

    pub use crate::utils::load_image;
}
