//! Types used in image preprocessing operations.
//!
//! This module defines the enums that describe how a model expects its
//! input tensor to be laid out. Getting either of these wrong does not
//! raise an error anywhere downstream; it silently degrades accuracy, so
//! the adapters carry them as explicit configuration.

/// Specifies the order of channels in an image tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (common in PyTorch)
    CHW,
    /// Height, Width, Channel order (common in TensorFlow)
    HWC,
}

/// Specifies the color order of the pixel values fed to the model.
///
/// Models trained on OpenCV-decoded frames expect BGR; models trained with
/// torchvision-style pipelines expect RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorOrder {
    /// Red, Green, Blue
    Rgb,
    /// Blue, Green, Red
    Bgr,
}

impl ColorOrder {
    /// Maps a destination channel index to the source channel index in an
    /// RGB pixel.
    pub(crate) fn source_channel(&self, channel: usize) -> usize {
        match self {
            ColorOrder::Rgb => channel,
            ColorOrder::Bgr => 2 - channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgr_reverses_channels() {
        assert_eq!(ColorOrder::Bgr.source_channel(0), 2);
        assert_eq!(ColorOrder::Bgr.source_channel(1), 1);
        assert_eq!(ColorOrder::Bgr.source_channel(2), 0);
    }

    #[test]
    fn test_rgb_is_identity() {
        for c in 0..3 {
            assert_eq!(ColorOrder::Rgb.source_channel(c), c);
        }
    }
}
