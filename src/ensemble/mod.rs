//! Ensemble coordination over heterogeneous classifiers.
//!
//! This module contains the ensemble predictor that fans a single image out
//! to every loaded model adapter and reconciles the per-model outputs into
//! one clinical decision, the interchangeable selection strategies, the
//! result records, and diagnosis formatting.

pub mod diagnosis;
pub mod predictor;
pub mod record;
pub mod strategy;

pub use diagnosis::format_diagnosis;
pub use predictor::{EnsembleBuilder, EnsemblePredictor};
pub use record::{EnsembleResult, PredictionRecord, Readiness};
pub use strategy::{Selection, SelectionStrategy};
