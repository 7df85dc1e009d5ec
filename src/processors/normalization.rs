//! Image normalization for classifier input.
//!
//! This module provides functionality to normalize a decoded image into the
//! batched tensor a specific model was trained on: pixel scaling, optional
//! per-channel mean/standard-deviation normalization, channel ordering
//! (CHW or HWC), and color ordering (RGB or BGR).

use crate::core::errors::{ScanError, ScanResult};
use crate::core::Tensor4D;
use crate::processors::types::{ChannelOrder, ColorOrder};
use image::RgbImage;

/// Normalizes images into model input tensors.
///
/// This struct encapsulates the parameters needed to normalize images,
/// including scaling factors, mean values, standard deviations, channel
/// ordering, and color ordering. Internally the scale/mean/std triple is
/// folded into per-channel affine coefficients applied per pixel.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: Vec<f32>,
    /// Offset values for each channel (beta = -mean / std)
    pub beta: Vec<f32>,
    /// Channel ordering (CHW or HWC)
    pub order: ChannelOrder,
    /// Color ordering of the values fed to the model
    pub color: ColorOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values for each channel (defaults to [0.0, 0.0, 0.0])
    /// * `std` - Optional standard deviation values for each channel (defaults to [1.0, 1.0, 1.0])
    /// * `order` - Optional channel ordering (defaults to CHW)
    /// * `color` - Optional color ordering (defaults to RGB)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Scale is less than or equal to 0
    /// * Mean or std vectors don't have exactly 3 elements
    /// * Any standard deviation value is less than or equal to 0
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
        color: Option<ColorOrder>,
    ) -> ScanResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or_else(|| vec![0.0, 0.0, 0.0]);
        let std = std.unwrap_or_else(|| vec![1.0, 1.0, 1.0]);
        let order = order.unwrap_or(ChannelOrder::CHW);
        let color = color.unwrap_or(ColorOrder::Rgb);

        if scale <= 0.0 {
            return Err(ScanError::config_error("scale must be greater than 0"));
        }

        if mean.len() != 3 {
            return Err(ScanError::config_error(
                "mean must have exactly 3 elements for RGB",
            ));
        }

        if std.len() != 3 {
            return Err(ScanError::config_error(
                "std must have exactly 3 elements for RGB",
            ));
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ScanError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let alpha: Vec<f32> = std.iter().map(|s| scale / s).collect();
        let beta: Vec<f32> = mean.iter().zip(&std).map(|(m, s)| -m / s).collect();

        Ok(Self {
            alpha,
            beta,
            order,
            color,
        })
    }

    /// Creates a normalizer that only scales pixels to [0, 1].
    ///
    /// This matches training pipelines that divide by 255 without
    /// mean/standard-deviation normalization.
    pub fn scale_only(order: ChannelOrder, color: ColorOrder) -> ScanResult<Self> {
        Self::new(None, None, None, Some(order), Some(color))
    }

    /// Creates a normalizer with ImageNet statistics.
    ///
    /// Scale 1/255, mean [0.485, 0.456, 0.406], std [0.229, 0.224, 0.225],
    /// CHW, RGB. This matches torchvision-style training pipelines.
    pub fn imagenet() -> ScanResult<Self> {
        Self::new(
            None,
            Some(vec![0.485, 0.456, 0.406]),
            Some(vec![0.229, 0.224, 0.225]),
            Some(ChannelOrder::CHW),
            Some(ColorOrder::Rgb),
        )
    }

    /// Normalizes a single image and returns it as a 4D tensor with a batch
    /// dimension of 1.
    ///
    /// # Arguments
    ///
    /// * `img` - The RGB image to normalize. Channel reordering for BGR
    ///   models happens here.
    ///
    /// # Returns
    ///
    /// The normalized image as a (1, C, H, W) or (1, H, W, C) tensor
    /// depending on the configured channel order.
    pub fn normalize_to(&self, img: &RgbImage) -> ScanResult<Tensor4D> {
        let (width, height) = img.dimensions();
        let (width, height) = (width as usize, height as usize);
        let channels = 3usize;

        let mut result = vec![0.0f32; channels * height * width];

        match self.order {
            ChannelOrder::CHW => {
                for c in 0..channels {
                    let src_c = self.color.source_channel(c);
                    for y in 0..height {
                        for x in 0..width {
                            let pixel = img.get_pixel(x as u32, y as u32);
                            let value = pixel[src_c] as f32;
                            result[c * height * width + y * width + x] =
                                value * self.alpha[c] + self.beta[c];
                        }
                    }
                }

                Ok(Tensor4D::from_shape_vec(
                    (1, channels, height, width),
                    result,
                )?)
            }
            ChannelOrder::HWC => {
                for y in 0..height {
                    for x in 0..width {
                        let pixel = img.get_pixel(x as u32, y as u32);
                        for c in 0..channels {
                            let src_c = self.color.source_channel(c);
                            let value = pixel[src_c] as f32;
                            result[y * width * channels + x * channels + c] =
                                value * self.alpha[c] + self.beta[c];
                        }
                    }
                }

                Ok(Tensor4D::from_shape_vec(
                    (1, height, width, channels),
                    result,
                )?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(r: u8, g: u8, b: u8) -> RgbImage {
        RgbImage::from_pixel(2, 2, image::Rgb([r, g, b]))
    }

    #[test]
    fn test_rejects_invalid_scale() {
        let result = NormalizeImage::new(Some(0.0), None, None, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_wrong_mean_length() {
        let result = NormalizeImage::new(None, Some(vec![0.5, 0.5]), None, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_positive_std() {
        let result = NormalizeImage::new(None, None, Some(vec![1.0, 0.0, 1.0]), None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_scale_only_maps_255_to_one() {
        let norm = NormalizeImage::scale_only(ChannelOrder::HWC, ColorOrder::Rgb).unwrap();
        let tensor = norm.normalize_to(&solid_image(255, 0, 255)).unwrap();

        assert_eq!(tensor.shape(), &[1, 2, 2, 3]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 0, 0, 1]].abs() < 1e-6);
        assert!((tensor[[0, 0, 0, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bgr_swaps_red_and_blue() {
        let norm = NormalizeImage::scale_only(ChannelOrder::HWC, ColorOrder::Bgr).unwrap();
        let tensor = norm.normalize_to(&solid_image(255, 0, 0)).unwrap();

        // Red pixel lands in the last (R) position of a BGR tensor.
        assert!(tensor[[0, 0, 0, 0]].abs() < 1e-6);
        assert!(tensor[[0, 0, 0, 1]].abs() < 1e-6);
        assert!((tensor[[0, 0, 0, 2]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_chw_layout_places_channels_first() {
        let norm = NormalizeImage::scale_only(ChannelOrder::CHW, ColorOrder::Rgb).unwrap();
        let tensor = norm.normalize_to(&solid_image(255, 127, 0)).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert!((tensor[[0, 0, 1, 1]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 1, 1]] - 127.0 / 255.0).abs() < 1e-6);
        assert!(tensor[[0, 2, 1, 1]].abs() < 1e-6);
    }

    #[test]
    fn test_imagenet_statistics() {
        let norm = NormalizeImage::imagenet().unwrap();
        let tensor = norm.normalize_to(&solid_image(255, 255, 255)).unwrap();

        // (1.0 - mean) / std per channel.
        let expected = [
            (1.0 - 0.485) / 0.229,
            (1.0 - 0.456) / 0.224,
            (1.0 - 0.406) / 0.225,
        ];
        for (c, &e) in expected.iter().enumerate() {
            assert!((tensor[[0, c, 0, 0]] - e).abs() < 1e-5);
        }
    }
}
