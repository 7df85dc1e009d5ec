//! Fixed-size-input binary classifier adapter.
//!
//! Wraps a Keras-style CNN exported to ONNX: fixed input size, BGR color
//! order in HWC layout, pixels scaled to [0, 1], and a binary head that is
//! either a two-value softmax over [no-tumor, tumor] or a single sigmoid
//! unit.

use crate::core::artifact::{ArtifactLocator, ArtifactProvider};
use crate::core::errors::{ScanError, ScanResult};
use crate::core::{OrtInfer, Tensor4D};
use crate::models::{ModelPrediction, TumorClassifier};
use crate::processors::{ChannelOrder, ColorOrder, NormalizeImage};
use image::{imageops::FilterType, DynamicImage};
use tracing::info;

/// Configuration for the fixed-input binary classifier.
#[derive(Debug, Clone)]
pub struct FixedInputClassifierConfig {
    /// Name identifying this model in results and logs.
    pub model_name: String,
    /// Artifact key(s) for the ONNX export.
    pub artifacts: ArtifactLocator,
    /// Input shape (height, width).
    pub input_shape: (u32, u32),
    /// Resizing filter to use.
    pub resize_filter: FilterType,
    /// Color order the model was trained on.
    pub color_order: ColorOrder,
    /// Pixel scaling factor applied before inference.
    pub scale: f32,
    /// Session pool size for ONNX Runtime.
    pub session_pool_size: usize,
}

impl Default for FixedInputClassifierConfig {
    fn default() -> Self {
        Self {
            model_name: "fixed_input_classifier".to_string(),
            artifacts: ArtifactLocator::default(),
            input_shape: (224, 224),
            // The original pipeline resized with OpenCV's default bilinear
            // interpolation.
            resize_filter: FilterType::Triangle,
            color_order: ColorOrder::Bgr,
            scale: 1.0 / 255.0,
            session_pool_size: 1,
        }
    }
}

impl FixedInputClassifierConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> ScanResult<()> {
        if self.model_name.is_empty() {
            return Err(ScanError::config_error("model_name must not be empty"));
        }
        if self.artifacts.primary.is_empty() {
            return Err(ScanError::config_error(
                "artifacts.primary must not be empty",
            ));
        }
        let (h, w) = self.input_shape;
        if h == 0 || w == 0 {
            return Err(ScanError::config_error(format!(
                "input_shape dimensions must be positive, got {h}x{w}"
            )));
        }
        if self.scale <= 0.0 {
            return Err(ScanError::config_error("scale must be greater than 0"));
        }
        Ok(())
    }
}

/// Binary tumor / no-tumor classifier with a fixed input size.
#[derive(Debug)]
pub struct FixedInputClassifier {
    config: FixedInputClassifierConfig,
    normalizer: NormalizeImage,
    inference: Option<OrtInfer>,
}

impl FixedInputClassifier {
    /// Creates an unloaded classifier from a validated configuration.
    pub fn new(config: FixedInputClassifierConfig) -> ScanResult<Self> {
        config.validate()?;
        let normalizer = NormalizeImage::new(
            Some(config.scale),
            None,
            None,
            Some(ChannelOrder::HWC),
            Some(config.color_order),
        )?;
        Ok(Self {
            config,
            normalizer,
            inference: None,
        })
    }

    /// Extracts the tumor probability from one output row.
    ///
    /// A single-value row is a sigmoid tumor probability; a two-value row
    /// is a softmax over [no-tumor, tumor].
    fn tumor_probability(&self, row: &[f32]) -> ScanResult<f32> {
        let p = match row.len() {
            0 => {
                return Err(ScanError::invalid_input(format!(
                    "model '{}' produced an empty output row",
                    self.config.model_name
                )))
            }
            1 => row[0],
            _ => row[1],
        };
        Ok(p.clamp(0.0, 1.0))
    }
}

impl TumorClassifier for FixedInputClassifier {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    fn is_loaded(&self) -> bool {
        self.inference.is_some()
    }

    fn input_size(&self) -> (u32, u32) {
        self.config.input_shape
    }

    fn load(&mut self, provider: &dyn ArtifactProvider) -> ScanResult<()> {
        let path = self.config.artifacts.resolve(provider)?;
        let inference = OrtInfer::with_pool(&path, None, self.config.session_pool_size)?;
        info!(
            "{} loaded successfully from {}",
            self.config.model_name,
            path.display()
        );
        self.inference = Some(inference);
        Ok(())
    }

    fn preprocess(&self, image: &DynamicImage) -> ScanResult<Tensor4D> {
        let (height, width) = self.config.input_shape;
        let rgb = image.to_rgb8();
        let resized = if rgb.dimensions() != (width, height) {
            image::imageops::resize(&rgb, width, height, self.config.resize_filter)
        } else {
            rgb
        };
        self.normalizer.normalize_to(&resized)
    }

    fn predict(&self, image: &DynamicImage) -> ScanResult<ModelPrediction> {
        let inference = self
            .inference
            .as_ref()
            .ok_or_else(|| ScanError::model_not_loaded(&self.config.model_name))?;

        let batch = self.preprocess(image)?;
        let output = inference.infer_2d(&batch)?;
        let row: Vec<f32> = output
            .outer_iter()
            .next()
            .map(|r| r.to_vec())
            .ok_or_else(|| {
                ScanError::invalid_input(format!(
                    "model '{}' produced an empty output batch",
                    self.config.model_name
                ))
            })?;

        let tumor_probability = self.tumor_probability(&row)?;

        let mut metadata = serde_json::json!({
            "model_name": self.config.model_name,
            "input_shape": [self.config.input_shape.0, self.config.input_shape.1],
            "raw_prediction": &row,
            "tumor_probability": tumor_probability,
        });
        if row.len() >= 2 {
            metadata["no_tumor_probability"] = serde_json::json!(row[0]);
        }

        Ok(ModelPrediction {
            tumor_probability,
            predicted_label: None,
            class_probabilities: None,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> FixedInputClassifierConfig {
        FixedInputClassifierConfig {
            artifacts: ArtifactLocator::new("brain_tumor/cnn/model.onnx"),
            ..Default::default()
        }
    }

    #[test]
    fn test_predict_before_load_fails() {
        let classifier = FixedInputClassifier::new(test_config()).unwrap();
        let image = DynamicImage::new_rgb8(64, 64);

        let err = classifier.predict(&image).unwrap_err();
        assert!(matches!(err, ScanError::ModelNotLoaded { .. }));
    }

    #[test]
    fn test_preprocess_shape_and_batch_dimension() {
        let classifier = FixedInputClassifier::new(test_config()).unwrap();
        let image = DynamicImage::new_rgb8(512, 300);

        let tensor = classifier.preprocess(&image).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_preprocess_expands_grayscale() {
        let classifier = FixedInputClassifier::new(test_config()).unwrap();
        let gray = image::GrayImage::from_pixel(224, 224, image::Luma([255u8]));
        let tensor = classifier
            .preprocess(&DynamicImage::ImageLuma8(gray))
            .unwrap();

        for c in 0..3 {
            assert!((tensor[[0, 0, 0, c]] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_head_uses_tumor_channel() {
        let classifier = FixedInputClassifier::new(test_config()).unwrap();
        let p = classifier.tumor_probability(&[0.3, 0.7]).unwrap();
        assert!((p - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_sigmoid_head_uses_single_value() {
        let classifier = FixedInputClassifier::new(test_config()).unwrap();
        let p = classifier.tumor_probability(&[0.42]).unwrap();
        assert!((p - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_config_rejects_missing_artifact_key() {
        let config = FixedInputClassifierConfig::default();
        assert!(FixedInputClassifier::new(config).is_err());
    }

    #[test]
    fn test_config_rejects_zero_input_shape() {
        let config = FixedInputClassifierConfig {
            input_shape: (0, 224),
            ..test_config()
        };
        assert!(FixedInputClassifier::new(config).is_err());
    }
}
