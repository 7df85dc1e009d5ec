//! Image processing and classification post-processing.
//!
//! This module contains the preprocessing primitives the model adapters are
//! built from (pixel normalization with configurable channel and color
//! order) and the post-processing helpers that turn raw classifier outputs
//! into probabilities and labeled class maps.

pub mod normalization;
pub mod postprocess;
pub mod types;

pub use normalization::NormalizeImage;
pub use postprocess::{argmax, class_probability_map, softmax};
pub use types::{ChannelOrder, ColorOrder};
