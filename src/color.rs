//! Color model conversion between canonical RGBA and foreign encodings
//!
//! The canonical color is `image::Rgba<u8>`: four independent 8-bit
//! channels regardless of source model. A [`ColorModel`] names a foreign
//! bit-packing scheme; [`pack`] and [`unpack`] convert between the two.
//!
//! Supported layouts (low bits first):
//! - `Rgb15`: R bits 0-4, G 5-9, B 10-14, no alpha
//! - `Bgr15`: B bits 0-4, G 5-9, R 10-14, no alpha
//! - `Abgr16`: `Bgr15` plus a 1-bit alpha in bit 15
//! - `Psx24`: big-endian byte triplet R,G,B, alpha forced opaque
//!
//! 5-bit channels scale to 8 bits by a left shift of 3. That is a deliberate
//! lossy per-format contract: `pack(unpack(v)) == v` holds exactly for every
//! foreign value, while `unpack(pack(c))` truncates the low 3 bits of each
//! channel.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::GfxError;

/// A foreign (on-disk) color bit-packing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    Rgb15,
    Bgr15,
    Abgr16,
    Psx24,
}

impl ColorModel {
    /// Bits a foreign value of this model occupies.
    pub fn bit_width(&self) -> u32 {
        match self {
            ColorModel::Rgb15 => 15,
            ColorModel::Bgr15 => 15,
            ColorModel::Abgr16 => 16,
            ColorModel::Psx24 => 24,
        }
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorModel::Rgb15 => "rgb15",
            ColorModel::Bgr15 => "bgr15",
            ColorModel::Abgr16 => "abgr16",
            ColorModel::Psx24 => "psx24",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ColorModel {
    type Err = GfxError;

    fn from_str(s: &str) -> Result<Self, GfxError> {
        match s.to_ascii_lowercase().as_str() {
            "rgb15" => Ok(ColorModel::Rgb15),
            "bgr15" => Ok(ColorModel::Bgr15),
            "abgr16" => Ok(ColorModel::Abgr16),
            "psx24" => Ok(ColorModel::Psx24),
            other => Err(GfxError::UnsupportedColorModel(other.to_string())),
        }
    }
}

/// Reconstruct a canonical color from a foreign encoding.
///
/// # Examples
///
/// ```
/// use romgfx::color::{unpack, ColorModel};
///
/// let c = unpack(0x7FFF, ColorModel::Rgb15);
/// assert_eq!(c, image::Rgba([248, 248, 248, 255]));
/// ```
pub fn unpack(foreign: u32, model: ColorModel) -> Rgba<u8> {
    match model {
        ColorModel::Rgb15 => Rgba([
            channel5(foreign),
            channel5(foreign >> 5),
            channel5(foreign >> 10),
            0xFF,
        ]),
        ColorModel::Bgr15 => Rgba([
            channel5(foreign >> 10),
            channel5(foreign >> 5),
            channel5(foreign),
            0xFF,
        ]),
        ColorModel::Abgr16 => {
            let alpha = if foreign & 0x8000 != 0 { 0xFF } else { 0x00 };
            Rgba([
                channel5(foreign >> 10),
                channel5(foreign >> 5),
                channel5(foreign),
                alpha,
            ])
        }
        ColorModel::Psx24 => Rgba([
            (foreign >> 16) as u8,
            (foreign >> 8) as u8,
            foreign as u8,
            0xFF,
        ]),
    }
}

/// Produce a foreign encoding from a canonical color.
pub fn pack(color: Rgba<u8>, model: ColorModel) -> u32 {
    let Rgba([r, g, b, a]) = color;
    match model {
        ColorModel::Rgb15 => (r as u32 >> 3) | ((g as u32 >> 3) << 5) | ((b as u32 >> 3) << 10),
        ColorModel::Bgr15 => (b as u32 >> 3) | ((g as u32 >> 3) << 5) | ((r as u32 >> 3) << 10),
        ColorModel::Abgr16 => {
            (b as u32 >> 3)
                | ((g as u32 >> 3) << 5)
                | ((r as u32 >> 3) << 10)
                | ((a as u32 >> 7) << 15)
        }
        ColorModel::Psx24 => ((r as u32) << 16) | ((g as u32) << 8) | b as u32,
    }
}

/// Extract a 5-bit channel and scale it to 8 bits.
fn channel5(value: u32) -> u8 {
    ((value & 0x1F) << 3) as u8
}
