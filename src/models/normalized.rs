//! Normalized-tensor multi-class classifier adapter.
//!
//! Wraps a PyTorch-style network (e.g. a fine-tuned ResNet18) exported to
//! ONNX: RGB color order in CHW layout, pixels scaled to [0, 1] and then
//! normalized with per-channel ImageNet statistics, and a multi-class head
//! over tumor types. The tumor probability is derived as 1 minus the
//! probability of the no-tumor class.

use crate::core::artifact::{ArtifactLocator, ArtifactProvider};
use crate::core::errors::{ScanError, ScanResult};
use crate::core::{OrtInfer, Tensor4D};
use crate::models::{ModelPrediction, TumorClassifier};
use crate::processors::{argmax, class_probability_map, softmax, ChannelOrder, ColorOrder, NormalizeImage};
use image::{imageops::FilterType, DynamicImage};
use tracing::{info, warn};

/// Label spellings recognized as the no-tumor class.
const NO_TUMOR_SYNONYMS: [&str; 5] = ["notumor", "no_tumor", "no-tumor", "no", "none"];

/// Configuration for the normalized-tensor multi-class classifier.
#[derive(Debug, Clone)]
pub struct NormalizedTensorClassifierConfig {
    /// Name identifying this model in results and logs.
    pub model_name: String,
    /// Artifact key(s) for the ONNX export.
    pub artifacts: ArtifactLocator,
    /// Input shape (height, width).
    pub input_shape: (u32, u32),
    /// Resizing filter to use.
    pub resize_filter: FilterType,
    /// Per-channel mean values (RGB order).
    pub mean: Vec<f32>,
    /// Per-channel standard deviation values (RGB order).
    pub std: Vec<f32>,
    /// Class labels in training order.
    pub class_labels: Vec<String>,
    /// Index of the no-tumor class in `class_labels`.
    ///
    /// When unset, the index is inferred by case-insensitive synonym match
    /// and falls back to the last class with a warning. Configure it
    /// explicitly when the training label order is known.
    pub no_tumor_class: Option<usize>,
    /// Whether the exported head ends at logits and needs a softmax.
    pub apply_softmax: bool,
    /// Session pool size for ONNX Runtime.
    pub session_pool_size: usize,
}

impl Default for NormalizedTensorClassifierConfig {
    fn default() -> Self {
        Self {
            model_name: "normalized_tensor_classifier".to_string(),
            artifacts: ArtifactLocator::default(),
            input_shape: (224, 224),
            resize_filter: FilterType::Triangle,
            mean: vec![0.485, 0.456, 0.406],
            std: vec![0.229, 0.224, 0.225],
            class_labels: vec![
                "glioma".to_string(),
                "meningioma".to_string(),
                "notumor".to_string(),
                "pituitary".to_string(),
            ],
            no_tumor_class: None,
            apply_softmax: true,
            session_pool_size: 1,
        }
    }
}

impl NormalizedTensorClassifierConfig {
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
        if self.class_labels.is_empty() {
            return Err(ScanError::config_error("class_labels must not be empty"));
        }
        if let Some(idx) = self.no_tumor_class {
            if idx >= self.class_labels.len() {
                return Err(ScanError::config_error(format!(
                    "no_tumor_class index {idx} is out of range for {} labels",
                    self.class_labels.len()
                )));
            }
        }
        Ok(())
    }
}

/// Multi-class tumor-type classifier over normalized tensors.
#[derive(Debug)]
pub struct NormalizedTensorClassifier {
    config: NormalizedTensorClassifierConfig,
    normalizer: NormalizeImage,
    no_tumor_index: usize,
    inference: Option<OrtInfer>,
}

impl NormalizedTensorClassifier {
    /// Creates an unloaded classifier from a validated configuration.
    ///
    /// The no-tumor class index is resolved once here: an explicitly
    /// configured index wins, then a case-insensitive synonym match, then
    /// the last class in the label list with a warning.
    pub fn new(config: NormalizedTensorClassifierConfig) -> ScanResult<Self> {
        config.validate()?;
        let normalizer = NormalizeImage::new(
            None,
            Some(config.mean.clone()),
            Some(config.std.clone()),
            Some(ChannelOrder::CHW),
            Some(ColorOrder::Rgb),
        )?;
        let no_tumor_index = resolve_no_tumor_index(
            &config.model_name,
            &config.class_labels,
            config.no_tumor_class,
        );
        Ok(Self {
            config,
            normalizer,
            no_tumor_index,
            inference: None,
        })
    }

    /// Returns the resolved index of the no-tumor class.
    pub fn no_tumor_index(&self) -> usize {
        self.no_tumor_index
    }
}

/// Resolves the no-tumor class index for a label list.
fn resolve_no_tumor_index(model_name: &str, labels: &[String], explicit: Option<usize>) -> usize {
    if let Some(idx) = explicit {
        return idx;
    }

    for (i, label) in labels.iter().enumerate() {
        let lowered = label.to_lowercase();
        if NO_TUMOR_SYNONYMS.contains(&lowered.as_str()) {
            return i;
        }
    }

    let fallback = labels.len() - 1;
    warn!(
        "{}: no class label matched a no-tumor synonym, assuming '{}' (index {}) is the no-tumor class",
        model_name, labels[fallback], fallback
    );
    fallback
}

impl TumorClassifier for NormalizedTensorClassifier {
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

        if row.len() != self.config.class_labels.len() {
            return Err(ScanError::invalid_input(format!(
                "model '{}' produced {} outputs but {} class labels are configured",
                self.config.model_name,
                row.len(),
                self.config.class_labels.len()
            )));
        }

        let probabilities = if self.config.apply_softmax {
            softmax(&row)
        } else {
            row.clone()
        };

        let class_probabilities =
            class_probability_map(&self.config.class_labels, &probabilities);
        let tumor_probability = (1.0 - probabilities[self.no_tumor_index]).clamp(0.0, 1.0);
        let predicted_label = argmax(&probabilities)
            .map(|i| self.config.class_labels[i].clone());

        let metadata = serde_json::json!({
            "model_name": self.config.model_name,
            "input_shape": [self.config.input_shape.0, self.config.input_shape.1],
            "class_probabilities": &class_probabilities,
            "no_tumor_label": self.config.class_labels[self.no_tumor_index],
            "tumor_probability": tumor_probability,
        });

        Ok(ModelPrediction {
            tumor_probability,
            predicted_label,
            class_probabilities: Some(class_probabilities),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> NormalizedTensorClassifierConfig {
        NormalizedTensorClassifierConfig {
            artifacts: ArtifactLocator::new("brain_tumor/resnet18/model.onnx"),
            ..Default::default()
        }
    }

    #[test]
    fn test_predict_before_load_fails() {
        let classifier = NormalizedTensorClassifier::new(test_config()).unwrap();
        let image = DynamicImage::new_rgb8(64, 64);

        let err = classifier.predict(&image).unwrap_err();
        assert!(matches!(err, ScanError::ModelNotLoaded { .. }));
    }

    #[test]
    fn test_preprocess_is_chw_with_batch_dimension() {
        let classifier = NormalizedTensorClassifier::new(test_config()).unwrap();
        let image = DynamicImage::new_rgb8(640, 480);

        let tensor = classifier.preprocess(&image).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_preprocess_applies_imagenet_statistics() {
        let classifier = NormalizedTensorClassifier::new(test_config()).unwrap();
        let white = image::RgbImage::from_pixel(224, 224, image::Rgb([255, 255, 255]));
        let tensor = classifier
            .preprocess(&DynamicImage::ImageRgb8(white))
            .unwrap();

        let expected = [
            (1.0 - 0.485) / 0.229,
            (1.0 - 0.456) / 0.224,
            (1.0 - 0.406) / 0.225,
        ];
        for (c, &e) in expected.iter().enumerate() {
            assert!((tensor[[0, c, 100, 100]] - e).abs() < 1e-5);
        }
    }

    #[test]
    fn test_no_tumor_index_from_synonym() {
        for synonym in ["notumor", "no_tumor", "no-tumor", "no", "none", "NoTumor"] {
            let labels = vec![
                "glioma".to_string(),
                synonym.to_string(),
                "pituitary".to_string(),
            ];
            assert_eq!(resolve_no_tumor_index("m", &labels, None), 1, "{synonym}");
        }
    }

    #[test]
    fn test_no_tumor_index_explicit_wins_over_synonym() {
        let labels = vec!["notumor".to_string(), "glioma".to_string()];
        assert_eq!(resolve_no_tumor_index("m", &labels, Some(1)), 1);
    }

    #[test]
    fn test_no_tumor_index_falls_back_to_last() {
        let labels = vec!["glioma".to_string(), "meningioma".to_string()];
        assert_eq!(resolve_no_tumor_index("m", &labels, None), 1);
    }

    #[test]
    fn test_config_rejects_out_of_range_no_tumor_index() {
        let config = NormalizedTensorClassifierConfig {
            no_tumor_class: Some(4),
            ..test_config()
        };
        assert!(NormalizedTensorClassifier::new(config).is_err());
    }

    #[test]
    fn test_config_rejects_empty_labels() {
        let config = NormalizedTensorClassifierConfig {
            class_labels: vec![],
            ..test_config()
        };
        assert!(NormalizedTensorClassifier::new(config).is_err());
    }
}
