//! Palettes mapping indexed pixel values to foreign colors
//!
//! A palette is an ordered table of foreign-encoded colors plus the
//! [`ColorModel`] that packs them and an optional "index zero is
//! transparent" flag. Entries are addressed by index; the consuming codec's
//! color depth bounds how many entries it can ever reference.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::color::{pack, unpack, ColorModel};
use crate::error::GfxError;

/// An ordered table of foreign-encoded colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    name: String,
    color_model: ColorModel,
    entries: Vec<u32>,
    zero_transparent: bool,
}

impl Palette {
    /// Create a palette from foreign-encoded entries.
    pub fn new(
        name: impl Into<String>,
        color_model: ColorModel,
        entries: Vec<u32>,
        zero_transparent: bool,
    ) -> Self {
        Palette {
            name: name.into(),
            color_model,
            entries,
            zero_transparent,
        }
    }

    /// Generate an evenly spaced grayscale ramp covering `2^color_depth`
    /// entries, packed in the given model. The usual default when a source
    /// region has no palette of its own.
    pub fn grayscale(name: impl Into<String>, color_model: ColorModel, color_depth: u8) -> Self {
        let count = 1usize << color_depth.min(8);
        let entries = (0..count)
            .map(|i| {
                let level = (i * 255 / (count - 1).max(1)) as u8;
                pack(Rgba([level, level, level, 0xFF]), color_model)
            })
            .collect();
        Palette {
            name: name.into(),
            color_model,
            entries,
            zero_transparent: false,
        }
    }

    /// Palette name, used in error messages only.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model the entries are packed in.
    pub fn color_model(&self) -> ColorModel {
        self.color_model
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether index 0 decodes as fully transparent.
    pub fn zero_transparent(&self) -> bool {
        self.zero_transparent
    }

    /// Whether every index of `color_depth`-bit pixels is within this palette.
    pub fn covers_depth(&self, color_depth: u8) -> bool {
        self.entries.len() >= 1usize << color_depth.min(8)
    }

    /// Foreign-encoded entry at `index`.
    pub fn foreign_color(&self, index: u32) -> Result<u32, GfxError> {
        self.entries
            .get(index as usize)
            .copied()
            .ok_or(GfxError::IndexOverflow {
                index,
                len: self.entries.len(),
            })
    }

    /// Canonical color at `index`, honoring the zero-transparent flag.
    pub fn native_color(&self, index: u32) -> Result<Rgba<u8>, GfxError> {
        let foreign = self.foreign_color(index)?;
        let mut color = unpack(foreign, self.color_model);
        if index == 0 && self.zero_transparent {
            color.0[3] = 0;
        }
        Ok(color)
    }

    /// Replace the entry at `index` with a canonical color, packing it into
    /// this palette's model.
    pub fn set_color(&mut self, index: u32, color: Rgba<u8>) -> Result<(), GfxError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index as usize)
            .ok_or(GfxError::IndexOverflow { index, len })?;
        *entry = pack(color, self.color_model);
        Ok(())
    }

    /// Index of the entry nearest to `color` by squared RGB distance.
    ///
    /// Used when importing RGBA images into indexed formats; an empty
    /// palette is an overflow error.
    pub fn nearest_index(&self, color: Rgba<u8>) -> Result<u32, GfxError> {
        if self.entries.is_empty() {
            return Err(GfxError::IndexOverflow { index: 0, len: 0 });
        }
        let mut best = 0u32;
        let mut best_dist = u32::MAX;
        for index in 0..self.entries.len() as u32 {
            let candidate = self.native_color(index)?;
            let dist = color_distance(color, candidate);
            if dist < best_dist {
                best_dist = dist;
                best = index;
            }
        }
        Ok(best)
    }
}

/// Squared Euclidean distance over R, G, B.
fn color_distance(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    let dr = a.0[0] as i32 - b.0[0] as i32;
    let dg = a.0[1] as i32 - b.0[1] as i32;
    let db = a.0[2] as i32 - b.0[2] as i32;
    (dr * dr + dg * dg + db * db) as u32
}
