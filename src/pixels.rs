//! Decoded pixel grids
//!
//! Codecs decode into a [`PixelBuffer`]: indexed formats produce a grid of
//! palette indices and direct formats a grid of canonical colors. Keeping
//! indices (rather than resolved colors) is what makes re-encoding an
//! indexed element bit-exact. Rendering to RGBA is a separate step.

use image::{Rgba, RgbaImage};

use crate::error::GfxError;
use crate::palette::Palette;

/// A rectangular grid of palette indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPixels {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl IndexedPixels {
    /// Create a zero-filled index grid.
    pub fn new(width: u32, height: u32) -> Self {
        IndexedPixels {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Result<u8, GfxError> {
        self.check_bounds(x, y)?;
        Ok(self.pixels[(y * self.width + x) as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, index: u8) -> Result<(), GfxError> {
        self.check_bounds(x, y)?;
        self.pixels[(y * self.width + x) as usize] = index;
        Ok(())
    }

    /// Render through a palette into an RGBA image.
    pub fn to_rgba(&self, palette: &Palette) -> Result<RgbaImage, GfxError> {
        let mut image = RgbaImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let index = self.pixels[(y * self.width + x) as usize];
                image.put_pixel(x, y, palette.native_color(index as u32)?);
            }
        }
        Ok(image)
    }

    /// Build an index grid from an RGBA image by nearest-palette-color
    /// matching. Exact palette colors map to their own index.
    pub fn from_rgba(image: &RgbaImage, palette: &Palette) -> Result<Self, GfxError> {
        let mut grid = IndexedPixels::new(image.width(), image.height());
        for y in 0..image.height() {
            for x in 0..image.width() {
                let index = palette.nearest_index(*image.get_pixel(x, y))?;
                grid.pixels[(y * grid.width + x) as usize] = index as u8;
            }
        }
        Ok(grid)
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), GfxError> {
        if x >= self.width || y >= self.height {
            return Err(GfxError::Bounds(format!(
                "pixel ({}, {}) outside {}x{} grid",
                x, y, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A rectangular grid of canonical colors, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectPixels {
    width: u32,
    height: u32,
    pixels: Vec<Rgba<u8>>,
}

impl DirectPixels {
    /// Create a grid filled with `fill`.
    pub fn filled(width: u32, height: u32, fill: Rgba<u8>) -> Self {
        DirectPixels {
            width,
            height,
            pixels: vec![fill; (width * height) as usize],
        }
    }

    /// Create a transparent-black grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba([0, 0, 0, 0]))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba<u8>] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Result<Rgba<u8>, GfxError> {
        self.check_bounds(x, y)?;
        Ok(self.pixels[(y * self.width + x) as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Rgba<u8>) -> Result<(), GfxError> {
        self.check_bounds(x, y)?;
        self.pixels[(y * self.width + x) as usize] = color;
        Ok(())
    }

    pub fn to_rgba(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                image.put_pixel(x, y, self.pixels[(y * self.width + x) as usize]);
            }
        }
        image
    }

    pub fn from_rgba(image: &RgbaImage) -> Self {
        let mut grid = DirectPixels::new(image.width(), image.height());
        for y in 0..image.height() {
            for x in 0..image.width() {
                grid.pixels[(y * grid.width + x) as usize] = *image.get_pixel(x, y);
            }
        }
        grid
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), GfxError> {
        if x >= self.width || y >= self.height {
            return Err(GfxError::Bounds(format!(
                "pixel ({}, {}) outside {}x{} grid",
                x, y, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// The decoded form of one element: indices for indexed codecs, canonical
/// colors for direct codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelBuffer {
    Indexed(IndexedPixels),
    Direct(DirectPixels),
}

impl PixelBuffer {
    pub fn width(&self) -> u32 {
        match self {
            PixelBuffer::Indexed(p) => p.width(),
            PixelBuffer::Direct(p) => p.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            PixelBuffer::Indexed(p) => p.height(),
            PixelBuffer::Direct(p) => p.height(),
        }
    }

    /// Render to RGBA, resolving indices through `palette` when indexed.
    pub fn to_rgba(&self, palette: &Palette) -> Result<RgbaImage, GfxError> {
        match self {
            PixelBuffer::Indexed(p) => p.to_rgba(palette),
            PixelBuffer::Direct(p) => Ok(p.to_rgba()),
        }
    }
}
