//! Placeholder codec for cells with no backing format

use image::Rgba;

use crate::error::GfxError;
use crate::pixels::{DirectPixels, PixelBuffer};

/// Zero-storage codec that decodes to a constant fill color.
///
/// Used as the default for arranger cells that have not been assigned a
/// real codec yet. Encoding is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankCodec {
    width: u32,
    height: u32,
    fill: Rgba<u8>,
}

impl BlankCodec {
    pub const DEFAULT_FILL: Rgba<u8> = Rgba([0, 0, 0, 255]);

    pub fn new(width: u32, height: u32, fill: Rgba<u8>) -> Result<Self, GfxError> {
        if width == 0 || height == 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "blank codec dimensions {}x{} must be positive",
                width, height
            )));
        }
        Ok(BlankCodec {
            width,
            height,
            fill,
        })
    }

    /// A blank of the given size with the default opaque-black fill.
    pub fn with_size(width: u32, height: u32) -> Result<Self, GfxError> {
        Self::new(width, height, Self::DEFAULT_FILL)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill(&self) -> Rgba<u8> {
        self.fill
    }

    pub fn decode(&self) -> PixelBuffer {
        PixelBuffer::Direct(DirectPixels::filled(self.width, self.height, self.fill))
    }

    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fills_constant_color() {
        let codec = BlankCodec::new(4, 2, Rgba([9, 8, 7, 255])).unwrap();
        let buffer = codec.decode();
        assert_eq!(buffer.width(), 4);
        assert_eq!(buffer.height(), 2);
        match buffer {
            PixelBuffer::Direct(pixels) => {
                assert!(pixels.pixels().iter().all(|&p| p == Rgba([9, 8, 7, 255])));
            }
            _ => panic!("expected direct buffer"),
        }
    }

    #[test]
    fn test_encode_is_empty() {
        let codec = BlankCodec::with_size(8, 8).unwrap();
        assert!(codec.encode().is_empty());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            BlankCodec::with_size(0, 8),
            Err(GfxError::DimensionMismatch(_))
        ));
    }
}
