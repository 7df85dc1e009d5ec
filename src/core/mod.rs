//! The core module of the prediction engine.
//!
//! This module contains the fundamental components shared by the model
//! adapters and the ensemble coordinator:
//! - Error handling
//! - Model artifact resolution
//! - ONNX Runtime inference engine integration
//! - Tensor type aliases
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod artifact;
pub mod errors;
pub mod inference;

pub use artifact::{ArtifactLocator, ArtifactProvider, LocalArtifactStore};
pub use errors::{ScanError, ScanResult};
pub use inference::OrtInfer;

/// A 2D tensor of f32 values (batch_size x num_classes).
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of f32 values (batch_size x channels/height x height/width x width/channels).
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
