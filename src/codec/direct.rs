//! Direct-color fixed formats

use crate::bitstream::{BitReader, BitWriter};
use crate::color::{pack, unpack, ColorModel};
use crate::error::GfxError;
use crate::pixels::{DirectPixels, PixelBuffer};

/// PSX 24bpp direct-color codec: three bytes R,G,B per pixel, stored
/// sequentially row-major with no packing.
///
/// Runtime-resizable in 1-pixel increments; full-image layout. Alpha is
/// forced opaque on decode and discarded on encode, so round-tripping the
/// stored bytes is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Psx24Codec {
    width: u32,
    height: u32,
}

impl Psx24Codec {
    pub const DEFAULT_WIDTH: u32 = 64;
    pub const DEFAULT_HEIGHT: u32 = 64;

    pub fn new(width: u32, height: u32) -> Result<Self, GfxError> {
        if width == 0 || height == 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "psx24 codec dimensions {}x{} must be positive",
                width, height
            )));
        }
        Ok(Psx24Codec { width, height })
    }

    /// Resize to new pixel dimensions.
    pub fn with_size(&self, width: u32, height: u32) -> Result<Self, GfxError> {
        Psx24Codec::new(width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn storage_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * 24
    }

    pub fn decode(&self, data: &[u8]) -> Result<PixelBuffer, GfxError> {
        let mut reader = BitReader::new(data, self.storage_size())?;
        let mut pixels = DirectPixels::new(self.width, self.height);

        for y in 0..self.height {
            for x in 0..self.width {
                let foreign = reader.read_bits(24)?;
                pixels.set(x, y, unpack(foreign, ColorModel::Psx24))?;
            }
        }

        Ok(PixelBuffer::Direct(pixels))
    }

    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, GfxError> {
        let pixels = match buffer {
            PixelBuffer::Direct(p) => p,
            PixelBuffer::Indexed(_) => {
                return Err(GfxError::DimensionMismatch(
                    "psx24 codec requires a direct-color pixel buffer".to_string(),
                ))
            }
        };
        if pixels.width() != self.width || pixels.height() != self.height {
            return Err(GfxError::DimensionMismatch(format!(
                "pixel buffer {}x{} does not match codec {}x{}",
                pixels.width(),
                pixels.height(),
                self.width,
                self.height
            )));
        }

        let mut writer = BitWriter::new(self.storage_size());
        for y in 0..self.height {
            for x in 0..self.width {
                let foreign = pack(pixels.get(x, y)?, ColorModel::Psx24);
                writer.write_bits(foreign, 24)?;
            }
        }

        Ok(writer.into_bytes())
    }
}

impl Default for Psx24Codec {
    fn default() -> Self {
        Psx24Codec {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}
