//! Error types for the prediction engine.
//!
//! This module defines the errors that can occur while loading model
//! artifacts, preprocessing images, running inference, and combining
//! per-model predictions. It also provides utility constructors for
//! creating these errors with appropriate context.

use std::path::PathBuf;
use thiserror::Error;

/// Enum representing the errors that can occur in the prediction engine.
///
/// The taxonomy separates startup failures (missing artifacts), sequencing
/// defects (predicting before loading), per-request adapter failures
/// (absorbed by the ensemble), and request-fatal failures (every adapter
/// failed).
#[derive(Error, Debug)]
pub enum ScanError {
    /// No model artifact could be resolved for the given key.
    ///
    /// Fatal at startup for the affected adapter; the ensemble may still
    /// start in a degraded state with the remaining adapters.
    #[error("model artifact not found: {key}")]
    ArtifactNotFound {
        /// The artifact key that failed to resolve.
        key: String,
    },

    /// A model was asked to predict before being loaded.
    ///
    /// This is a sequencing defect, never an expected runtime condition.
    #[error("model '{model_name}' is not loaded")]
    ModelNotLoaded {
        /// Name of the model that was not loaded.
        model_name: String,
    },

    /// A single adapter failed during prediction.
    ///
    /// Non-fatal at the ensemble level: the adapter's contribution is
    /// dropped for the current call only.
    #[error("prediction failed for model '{model_name}': {context}")]
    Prediction {
        /// Name of the model whose prediction failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Every adapter failed to produce a prediction for this image.
    ///
    /// Fatal for the current request only.
    #[error("all {attempted} models failed to produce a prediction")]
    EnsembleExhausted {
        /// Number of adapters that were attempted.
        attempted: usize,
    },

    /// Error occurred while loading a model artifact into a session.
    #[error("failed to load model from {path}: {context}")]
    ModelLoad {
        /// Path of the artifact that failed to load.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for prediction-engine operations.
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// Creates an error for an unresolvable artifact key.
    pub fn artifact_not_found(key: impl Into<String>) -> Self {
        Self::ArtifactNotFound { key: key.into() }
    }

    /// Creates an error for a model used before loading.
    pub fn model_not_loaded(model_name: impl Into<String>) -> Self {
        Self::ModelNotLoaded {
            model_name: model_name.into(),
        }
    }

    /// Creates an error wrapping an adapter prediction failure.
    ///
    /// # Arguments
    ///
    /// * `model_name` - Name of the model whose prediction failed.
    /// * `context` - Additional context about the failure.
    /// * `error` - The underlying error that caused this error.
    pub fn prediction(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Prediction {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an error for a model artifact that failed to load.
    pub fn model_load(
        path: impl Into<PathBuf>,
        context: &str,
        error: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelLoad {
            path: path.into(),
            context: context.to_string(),
            source: error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for an invalid configuration.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// A simple error type for wrapping a message where a source error is
/// required but none exists.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_not_found_display() {
        let err = ScanError::artifact_not_found("models/brain_tumor/model.onnx");
        assert_eq!(
            err.to_string(),
            "model artifact not found: models/brain_tumor/model.onnx"
        );
    }

    #[test]
    fn test_prediction_error_preserves_source() {
        let err = ScanError::prediction(
            "cnn_binary",
            "inference failed",
            SimpleError::new("session crashed"),
        );
        assert!(err.to_string().contains("cnn_binary"));
        let source = std::error::Error::source(&err).expect("source should be set");
        assert_eq!(source.to_string(), "session crashed");
    }

    #[test]
    fn test_ensemble_exhausted_display() {
        let err = ScanError::EnsembleExhausted { attempted: 2 };
        assert_eq!(
            err.to_string(),
            "all 2 models failed to produce a prediction"
        );
    }
}
