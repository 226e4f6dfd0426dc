//! Generalized descriptor-driven indexed codec
//!
//! Most historical indexed tile formats differ only in color depth, row
//! interlacing, and the order pixels land within a row. Those three facts
//! form an [`IndexedFormat`] descriptor, and one parametrized codec covers
//! the whole family instead of one codec type per console format.

use serde::{Deserialize, Serialize};

use crate::bitstream::{BitReader, BitWriter};
use crate::error::GfxError;
use crate::palette::Palette;
use crate::pixels::{IndexedPixels, PixelBuffer};

/// Declarative description of an indexed pixel layout.
///
/// `row_pixel_pattern` is broadcast across the row: decoded slot `i` lands
/// in column `(i / p) * p + pattern[i % p]` where `p` is the pattern
/// length. It must be a permutation of `0..p` so encoding has an inverse.
/// With `row_interlace`, even output rows are stored consecutively in the
/// first half of the element's region and odd rows in the second half.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFormat {
    pub color_depth: u8,
    #[serde(default)]
    pub row_interlace: bool,
    pub row_pixel_pattern: Vec<u32>,
}

impl IndexedFormat {
    /// Plain packed layout: sequential pixels, no interlace.
    pub fn packed(color_depth: u8) -> Self {
        IndexedFormat {
            color_depth,
            row_interlace: false,
            row_pixel_pattern: vec![0],
        }
    }
}

/// Indexed codec driven by an [`IndexedFormat`] descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedCodec {
    name: String,
    width: u32,
    height: u32,
    format: IndexedFormat,
}

impl IndexedCodec {
    /// Validate the descriptor against the element dimensions.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: IndexedFormat,
    ) -> Result<Self, GfxError> {
        if width == 0 || height == 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "indexed codec dimensions {}x{} must be positive",
                width, height
            )));
        }
        if format.color_depth < 1 || format.color_depth > 8 {
            return Err(GfxError::DimensionMismatch(format!(
                "color depth {} outside supported range 1-8",
                format.color_depth
            )));
        }

        let pattern = &format.row_pixel_pattern;
        if pattern.is_empty() {
            return Err(GfxError::DimensionMismatch(
                "row pixel pattern must not be empty".to_string(),
            ));
        }
        if width as usize % pattern.len() != 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "width {} is not a multiple of the pixel pattern length {}",
                width,
                pattern.len()
            )));
        }
        // Must be a permutation of 0..len so encode can invert it
        let mut seen = vec![false; pattern.len()];
        for &slot in pattern {
            let valid = (slot as usize) < pattern.len() && !seen[slot as usize];
            if !valid {
                return Err(GfxError::DimensionMismatch(format!(
                    "row pixel pattern {:?} is not a permutation of 0..{}",
                    pattern,
                    pattern.len()
                )));
            }
            seen[slot as usize] = true;
        }

        Ok(IndexedCodec {
            name: name.into(),
            width,
            height,
            format,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_depth(&self) -> u8 {
        self.format.color_depth
    }

    pub fn format(&self) -> &IndexedFormat {
        &self.format
    }

    pub fn storage_size(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.color_depth as u64
    }

    /// Bit offset of output row `y` within the element's storage region.
    fn row_bit_offset(&self, y: u32) -> u64 {
        let row_bits = self.width as u64 * self.format.color_depth as u64;
        let storage_row = if self.format.row_interlace {
            // Even rows pack into the first half, odd rows into the second
            let even_rows = (self.height as u64).div_ceil(2);
            if y % 2 == 0 {
                y as u64 / 2
            } else {
                even_rows + y as u64 / 2
            }
        } else {
            y as u64
        };
        storage_row * row_bits
    }

    /// Output column for decoded slot `i` of a row.
    fn slot_column(&self, i: u32) -> u32 {
        let p = self.format.row_pixel_pattern.len() as u32;
        (i / p) * p + self.format.row_pixel_pattern[(i % p) as usize]
    }

    pub fn decode(&self, palette: &Palette, data: &[u8]) -> Result<PixelBuffer, GfxError> {
        let depth = self.format.color_depth as u32;
        let mut reader = BitReader::new(data, self.storage_size())?;
        let mut pixels = IndexedPixels::new(self.width, self.height);

        for y in 0..self.height {
            reader.seek_abs(self.row_bit_offset(y))?;
            for i in 0..self.width {
                let index = reader.read_bits(depth)?;
                if index as usize >= palette.len() {
                    return Err(GfxError::IndexOverflow {
                        index,
                        len: palette.len(),
                    });
                }
                pixels.set(self.slot_column(i), y, index as u8)?;
            }
        }

        Ok(PixelBuffer::Indexed(pixels))
    }

    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, GfxError> {
        let pixels = match buffer {
            PixelBuffer::Indexed(p) => p,
            PixelBuffer::Direct(_) => {
                return Err(GfxError::DimensionMismatch(format!(
                    "codec '{}' requires an indexed pixel buffer",
                    self.name
                )))
            }
        };
        if pixels.width() != self.width || pixels.height() != self.height {
            return Err(GfxError::DimensionMismatch(format!(
                "pixel buffer {}x{} does not match codec '{}' {}x{}",
                pixels.width(),
                pixels.height(),
                self.name,
                self.width,
                self.height
            )));
        }

        let depth = self.format.color_depth as u32;
        let capacity = 1u32 << depth;
        let mut writer = BitWriter::new(self.storage_size());

        for y in 0..self.height {
            writer.seek_abs(self.row_bit_offset(y))?;
            for i in 0..self.width {
                let index = pixels.get(self.slot_column(i), y)? as u32;
                if index >= capacity {
                    return Err(GfxError::IndexOverflow {
                        index,
                        len: capacity as usize,
                    });
                }
                writer.write_bits(index, depth)?;
            }
        }

        Ok(writer.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorModel;

    fn gray(depth: u8) -> Palette {
        Palette::grayscale("gray", ColorModel::Rgb15, depth)
    }

    fn codec(width: u32, height: u32, format: IndexedFormat) -> IndexedCodec {
        IndexedCodec::new("test", width, height, format).unwrap()
    }

    #[test]
    fn test_packed_4bpp_decode() {
        let c = codec(4, 1, IndexedFormat::packed(4));
        let data = [0x12, 0x34];
        let buffer = c.decode(&gray(4), &data).unwrap();
        match buffer {
            PixelBuffer::Indexed(p) => assert_eq!(p.pixels(), &[1, 2, 3, 4]),
            _ => panic!("expected indexed buffer"),
        }
    }

    #[test]
    fn test_zero_buffer_decodes_to_index_zero() {
        let c = codec(8, 8, IndexedFormat::packed(4));
        assert_eq!(c.storage_size(), 256);
        let data = [0u8; 32];
        let buffer = c.decode(&gray(4), &data).unwrap();
        match &buffer {
            PixelBuffer::Indexed(p) => assert!(p.pixels().iter().all(|&i| i == 0)),
            _ => panic!("expected indexed buffer"),
        }
        assert_eq!(c.encode(&buffer).unwrap(), data);
    }

    #[test]
    fn test_pixel_pattern_permutes_columns() {
        let format = IndexedFormat {
            color_depth: 4,
            row_interlace: false,
            row_pixel_pattern: vec![1, 0],
        };
        let c = codec(4, 1, format);
        let data = [0x12, 0x34];
        let buffer = c.decode(&gray(4), &data).unwrap();
        match &buffer {
            PixelBuffer::Indexed(p) => assert_eq!(p.pixels(), &[2, 1, 4, 3]),
            _ => panic!("expected indexed buffer"),
        }
        // Inverse placement restores the original bytes
        assert_eq!(c.encode(&buffer).unwrap(), data);
    }

    #[test]
    fn test_row_interlace_splits_halves() {
        // 2x4 element, 8bpp: rows 0,2 stored first, rows 1,3 second
        let format = IndexedFormat {
            color_depth: 8,
            row_interlace: true,
            row_pixel_pattern: vec![0],
        };
        let c = codec(2, 4, format);
        let data = [0, 1, 4, 5, 2, 3, 6, 7];
        let buffer = c.decode(&gray(8), &data).unwrap();
        match &buffer {
            PixelBuffer::Indexed(p) => {
                assert_eq!(p.pixels(), &[0, 1, 2, 3, 4, 5, 6, 7]);
            }
            _ => panic!("expected indexed buffer"),
        }
        assert_eq!(c.encode(&buffer).unwrap(), data);
    }

    #[test]
    fn test_interlaced_roundtrip_odd_height() {
        let format = IndexedFormat {
            color_depth: 2,
            row_interlace: true,
            row_pixel_pattern: vec![0],
        };
        let c = codec(4, 5, format);
        let data: Vec<u8> = (0..c.storage_size().div_ceil(8)).map(|i| i as u8 * 41).collect();
        let buffer = c.decode(&gray(2), &data).unwrap();
        assert_eq!(c.encode(&buffer).unwrap(), data);
    }

    #[test]
    fn test_short_buffer_fails() {
        let c = codec(8, 8, IndexedFormat::packed(4));
        assert!(matches!(
            c.decode(&gray(4), &[0u8; 31]),
            Err(GfxError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_palette_overflow_is_detected() {
        let c = codec(2, 1, IndexedFormat::packed(4));
        let small = Palette::grayscale("small", ColorModel::Rgb15, 2);
        // 0x2F: slot 0 -> 2 (in range), slot 1 -> 15 (out of the 4-entry palette)
        assert!(matches!(
            c.decode(&small, &[0x2F]),
            Err(GfxError::IndexOverflow { index: 15, len: 4 })
        ));
    }

    #[test]
    fn test_encode_rejects_out_of_depth_index() {
        let c = codec(2, 1, IndexedFormat::packed(2));
        let mut pixels = IndexedPixels::new(2, 1);
        pixels.set(0, 0, 9).unwrap();
        assert!(matches!(
            c.encode(&PixelBuffer::Indexed(pixels)),
            Err(GfxError::IndexOverflow { index: 9, len: 4 })
        ));
    }

    #[test]
    fn test_invalid_descriptors_rejected() {
        let bad_pattern = IndexedFormat {
            color_depth: 4,
            row_interlace: false,
            row_pixel_pattern: vec![0, 0],
        };
        assert!(IndexedCodec::new("t", 4, 4, bad_pattern).is_err());

        let bad_width = IndexedFormat {
            color_depth: 4,
            row_interlace: false,
            row_pixel_pattern: vec![0, 1, 2],
        };
        assert!(IndexedCodec::new("t", 4, 4, bad_width).is_err());

        assert!(IndexedCodec::new("t", 4, 4, IndexedFormat::packed(9)).is_err());
        assert!(IndexedCodec::new("t", 0, 4, IndexedFormat::packed(4)).is_err());
    }
}
