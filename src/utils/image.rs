//! Utility functions for image loading and conversion.
//!
//! The prediction engine itself never performs file or network I/O; these
//! helpers exist for callers (and tests) that start from a file path or
//! from raw pixel data.

use crate::core::errors::{ScanError, ScanResult};
use image::{DynamicImage, ImageBuffer, RgbImage};

/// Converts a DynamicImage to an RgbImage.
///
/// Single-channel (grayscale) images are expanded to 3 channels, which is
/// what every classifier in the ensemble expects.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Errors
///
/// Returns `ScanError::ImageLoad` if the image cannot be loaded from the
/// specified path.
pub fn load_image(path: &std::path::Path) -> ScanResult<RgbImage> {
    let img = image::open(path).map_err(ScanError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Creates an RgbImage from raw pixel data.
///
/// The data must be in RGB format (3 bytes per pixel) and the length must
/// match the specified width and height.
///
/// # Returns
///
/// * `Some(RgbImage)` - The created RGB image if the data is valid
/// * `None` - If the data length doesn't match the specified dimensions
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    if data.len() != (width * height * 3) as usize {
        return None;
    }

    ImageBuffer::from_raw(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rgb_image_validates_length() {
        assert!(create_rgb_image(2, 2, vec![0u8; 12]).is_some());
        assert!(create_rgb_image(2, 2, vec![0u8; 11]).is_none());
    }

    #[test]
    fn test_grayscale_expands_to_three_channels() {
        let gray = image::GrayImage::from_pixel(4, 4, image::Luma([128u8]));
        let rgb = dynamic_to_rgb(DynamicImage::ImageLuma8(gray));
        let pixel = rgb.get_pixel(0, 0);
        assert_eq!(pixel.0, [128, 128, 128]);
    }
}
