//! Graphics codecs: the pluggable bits-to-pixels transforms
//!
//! The codec set is closed and config-driven, so it is a tagged sum type
//! rather than an open trait hierarchy:
//! - [`BlankCodec`] - zero-storage placeholder fill
//! - [`Psx24Codec`] - direct-color 24bpp byte triplets
//! - [`IndexedCodec`] - descriptor-driven generalized indexed formats
//!
//! Decoding is a pure function of the input bits plus the codec/palette
//! configuration; encoding is the exact inverse bit placement, so
//! `encode(decode(bits)) == bits` for any buffer whose length matches the
//! codec's storage size.

mod blank;
mod direct;
mod indexed;

pub use blank::BlankCodec;
pub use direct::Psx24Codec;
pub use indexed::{IndexedCodec, IndexedFormat};

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::GfxError;
use crate::palette::Palette;
use crate::pixels::PixelBuffer;

/// How a codec's elements tile within an arranger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLayout {
    /// Elements occupy a uniform grid
    Tiled,
    /// One element spans the entire arranger
    Single,
}

/// Whether decoded pixels are palette indices or direct colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorType {
    Indexed,
    Direct,
}

/// A concrete graphics codec.
#[derive(Debug, Clone, PartialEq)]
pub enum Codec {
    Blank(BlankCodec),
    Psx24(Psx24Codec),
    Indexed(IndexedCodec),
}

impl Codec {
    /// Human-readable format name.
    pub fn name(&self) -> &str {
        match self {
            Codec::Blank(_) => "Blank",
            Codec::Psx24(_) => "PSX 24bpp",
            Codec::Indexed(c) => c.name(),
        }
    }

    /// Decoded element width in pixels.
    pub fn width(&self) -> u32 {
        match self {
            Codec::Blank(c) => c.width(),
            Codec::Psx24(c) => c.width(),
            Codec::Indexed(c) => c.width(),
        }
    }

    /// Decoded element height in pixels.
    pub fn height(&self) -> u32 {
        match self {
            Codec::Blank(c) => c.height(),
            Codec::Psx24(c) => c.height(),
            Codec::Indexed(c) => c.height(),
        }
    }

    pub fn layout(&self) -> ImageLayout {
        match self {
            Codec::Blank(_) => ImageLayout::Tiled,
            Codec::Psx24(_) => ImageLayout::Single,
            Codec::Indexed(_) => ImageLayout::Tiled,
        }
    }

    pub fn color_type(&self) -> ColorType {
        match self {
            Codec::Blank(_) => ColorType::Direct,
            Codec::Psx24(_) => ColorType::Direct,
            Codec::Indexed(_) => ColorType::Indexed,
        }
    }

    /// Bits per decoded pixel.
    pub fn color_depth(&self) -> u8 {
        match self {
            Codec::Blank(_) => 0,
            Codec::Psx24(_) => 24,
            Codec::Indexed(c) => c.color_depth(),
        }
    }

    /// Total bits one element consumes in the resource.
    pub fn storage_size(&self) -> u64 {
        match self {
            Codec::Blank(_) => 0,
            Codec::Psx24(c) => c.storage_size(),
            Codec::Indexed(c) => c.storage_size(),
        }
    }

    /// Decode one element's bits into a pixel buffer.
    ///
    /// `data` must hold at least `storage_size` bits starting at bit 0;
    /// shorter input fails with [`GfxError::InsufficientData`]. Indexed
    /// pixels are validated against `palette`.
    pub fn decode(&self, palette: &Palette, data: &[u8]) -> Result<PixelBuffer, GfxError> {
        match self {
            Codec::Blank(c) => Ok(c.decode()),
            Codec::Psx24(c) => c.decode(data),
            Codec::Indexed(c) => c.decode(palette, data),
        }
    }

    /// Encode a pixel buffer back into element bits.
    ///
    /// Fails with [`GfxError::DimensionMismatch`] if the buffer's shape or
    /// color type does not match this codec.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, GfxError> {
        match self {
            Codec::Blank(c) => Ok(c.encode()),
            Codec::Psx24(c) => c.encode(buffer),
            Codec::Indexed(c) => c.encode(buffer),
        }
    }
}

/// Serializable codec descriptor.
///
/// Project config persists codecs as data, not code; a spec builds into a
/// validated [`Codec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CodecSpec {
    Blank {
        width: u32,
        height: u32,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        fill: Option<[u8; 4]>,
    },
    Psx24 {
        width: u32,
        height: u32,
    },
    Indexed {
        name: String,
        width: u32,
        height: u32,
        color_depth: u8,
        #[serde(default)]
        row_interlace: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        row_pixel_pattern: Option<Vec<u32>>,
    },
}

impl CodecSpec {
    /// Build and validate the concrete codec this descriptor names.
    pub fn build(self) -> Result<Codec, GfxError> {
        match self {
            CodecSpec::Blank {
                width,
                height,
                fill,
            } => {
                let fill = fill.map(Rgba).unwrap_or(Rgba([0, 0, 0, 255]));
                Ok(Codec::Blank(BlankCodec::new(width, height, fill)?))
            }
            CodecSpec::Psx24 { width, height } => {
                Ok(Codec::Psx24(Psx24Codec::new(width, height)?))
            }
            CodecSpec::Indexed {
                name,
                width,
                height,
                color_depth,
                row_interlace,
                row_pixel_pattern,
            } => {
                let format = IndexedFormat {
                    color_depth,
                    row_interlace,
                    row_pixel_pattern: row_pixel_pattern.unwrap_or_else(|| vec![0]),
                };
                Ok(Codec::Indexed(IndexedCodec::new(name, width, height, format)?))
            }
        }
    }

    /// Look up a built-in format by name.
    ///
    /// `psx24` plus `packed-1bpp` through `packed-8bpp` (8x8 tiles, identity
    /// pixel pattern, no interlace).
    pub fn builtin(name: &str) -> Option<CodecSpec> {
        match name {
            "psx24" => Some(CodecSpec::Psx24 {
                width: 64,
                height: 64,
            }),
            "blank" => Some(CodecSpec::Blank {
                width: 8,
                height: 8,
                fill: None,
            }),
            _ => {
                let depth = name.strip_prefix("packed-")?.strip_suffix("bpp")?;
                let depth: u8 = depth.parse().ok()?;
                if depth < 1 || depth > 8 {
                    return None;
                }
                Some(CodecSpec::Indexed {
                    name: name.to_string(),
                    width: 8,
                    height: 8,
                    color_depth: depth,
                    row_interlace: false,
                    row_pixel_pattern: None,
                })
            }
        }
    }

    /// Names accepted by [`CodecSpec::builtin`].
    pub fn builtin_names() -> Vec<String> {
        let mut names = vec!["psx24".to_string(), "blank".to_string()];
        names.extend((1..=8).map(|d| format!("packed-{}bpp", d)));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builds_and_roundtrips_serde() {
        let spec = CodecSpec::Indexed {
            name: "nes-ish".to_string(),
            width: 8,
            height: 8,
            color_depth: 2,
            row_interlace: true,
            row_pixel_pattern: Some(vec![1, 0]),
        };
        let json = serde_json::to_string(&spec).unwrap();
        let parsed: CodecSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, parsed);

        let codec = parsed.build().unwrap();
        assert_eq!(codec.color_depth(), 2);
        assert_eq!(codec.storage_size(), 8 * 8 * 2);
        assert_eq!(codec.color_type(), ColorType::Indexed);
    }

    #[test]
    fn test_spec_defaults() {
        let json = r#"{"kind": "indexed", "name": "g4", "width": 8, "height": 8, "color_depth": 4}"#;
        let spec: CodecSpec = serde_json::from_str(json).unwrap();
        let codec = spec.build().unwrap();
        assert_eq!(codec.storage_size(), 256);
        assert_eq!(codec.layout(), ImageLayout::Tiled);
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(CodecSpec::builtin("psx24").is_some());
        assert!(CodecSpec::builtin("packed-4bpp").is_some());
        assert!(CodecSpec::builtin("packed-9bpp").is_none());
        assert!(CodecSpec::builtin("snes-mode7").is_none());
        for name in CodecSpec::builtin_names() {
            assert!(CodecSpec::builtin(&name).is_some());
        }
    }
}
