//! Arrangers: 2-D element grids forming one logical image
//!
//! An arranger maps between three coordinate spaces: pixels across the
//! whole image, element-grid cells, and the (resource, bit address, codec,
//! palette) tuple needed to decode one element. Tiled arrangers hold a
//! uniform resizable grid; single-layout arrangers hold one element
//! spanning the whole image (full-image formats).

use std::rc::Rc;

use image::RgbaImage;

use crate::address::BitAddress;
use crate::codec::{BlankCodec, Codec, ColorType, ImageLayout};
use crate::datafile::DataFile;
use crate::element::Element;
use crate::error::GfxError;
use crate::palette::Palette;

/// A warning raised while compositing an arranger; the failed element is
/// skipped rather than aborting the whole render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Warning {
            message: message.into(),
        }
    }
}

/// An ordered 2-D grid of elements.
#[derive(Debug, Clone)]
pub struct Arranger {
    name: String,
    layout: ImageLayout,
    color_type: ColorType,
    grid_width: u32,
    grid_height: u32,
    element_width: u32,
    element_height: u32,
    /// Row-major, `grid_width * grid_height` entries
    elements: Vec<Element>,
}

impl Arranger {
    /// Lay a grid of identical elements over consecutive regions of one
    /// resource, advancing by the codec's storage size per cell.
    ///
    /// Single-layout codecs span the whole arranger, so the grid must be
    /// 1x1 for them. The resource must be long enough for every cell.
    pub fn sequential(
        name: impl Into<String>,
        grid_width: u32,
        grid_height: u32,
        data_file: Rc<DataFile>,
        start: BitAddress,
        codec: Rc<Codec>,
        palette: Rc<Palette>,
    ) -> Result<Self, GfxError> {
        let name = name.into();
        if grid_width == 0 || grid_height == 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "arranger '{}' grid {}x{} must be positive",
                name, grid_width, grid_height
            )));
        }
        if codec.layout() == ImageLayout::Single && (grid_width != 1 || grid_height != 1) {
            return Err(GfxError::DimensionMismatch(format!(
                "arranger '{}' uses a single-layout codec; grid must be 1x1, got {}x{}",
                name, grid_width, grid_height
            )));
        }

        let cells = grid_width as u64 * grid_height as u64;
        let needed = start.total_bits() + cells * codec.storage_size();
        let available = data_file.len_bits()?;
        if needed > available {
            return Err(GfxError::InsufficientData { needed, available });
        }

        let mut elements = Vec::with_capacity(cells as usize);
        let mut address = start;
        for row in 0..grid_height {
            for col in 0..grid_width {
                elements.push(Element::new(
                    col * codec.width(),
                    row * codec.height(),
                    Rc::clone(&data_file),
                    address,
                    Rc::clone(&codec),
                    Rc::clone(&palette),
                ));
                address = address + codec.storage_size();
            }
        }

        Ok(Arranger {
            name,
            layout: codec.layout(),
            color_type: codec.color_type(),
            grid_width,
            grid_height,
            element_width: codec.width(),
            element_height: codec.height(),
            elements,
        })
    }

    /// Create a tiled arranger with explicit per-element placement; every
    /// cell starts as a Blank codec until assigned.
    pub fn scattered(
        name: impl Into<String>,
        grid_width: u32,
        grid_height: u32,
        element_width: u32,
        element_height: u32,
        color_type: ColorType,
    ) -> Result<Self, GfxError> {
        let name = name.into();
        if grid_width == 0 || grid_height == 0 || element_width == 0 || element_height == 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "arranger '{}' grid {}x{} of {}x{} pixel elements must be positive",
                name, grid_width, grid_height, element_width, element_height
            )));
        }

        let mut elements = Vec::with_capacity((grid_width * grid_height) as usize);
        for row in 0..grid_height {
            for col in 0..grid_width {
                elements.push(blank_element(
                    col * element_width,
                    row * element_height,
                    element_width,
                    element_height,
                )?);
            }
        }

        Ok(Arranger {
            name,
            layout: ImageLayout::Tiled,
            color_type,
            grid_width,
            grid_height,
            element_width,
            element_height,
            elements,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> ImageLayout {
        self.layout
    }

    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    /// Grid size in elements.
    pub fn grid_size(&self) -> (u32, u32) {
        (self.grid_width, self.grid_height)
    }

    /// Per-element size in pixels.
    pub fn element_pixel_size(&self) -> (u32, u32) {
        (self.element_width, self.element_height)
    }

    /// Whole-arranger width in pixels.
    pub fn pixel_width(&self) -> u32 {
        self.grid_width * self.element_width
    }

    /// Whole-arranger height in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.grid_height * self.element_height
    }

    /// Element at grid cell (col, row).
    pub fn element(&self, col: u32, row: u32) -> Result<&Element, GfxError> {
        self.check_cell(col, row)?;
        Ok(&self.elements[(row * self.grid_width + col) as usize])
    }

    /// Replace the element at grid cell (col, row).
    ///
    /// The incoming element's pixel size must match the arranger's element
    /// size, and its color type must match unless it is a Blank placeholder.
    pub fn set_element(&mut self, element: Element, col: u32, row: u32) -> Result<(), GfxError> {
        self.check_cell(col, row)?;
        if self.layout != ImageLayout::Tiled {
            return Err(GfxError::DimensionMismatch(format!(
                "arranger '{}' is not a tiled layout",
                self.name
            )));
        }
        if element.width() != self.element_width || element.height() != self.element_height {
            return Err(GfxError::DimensionMismatch(format!(
                "element size {}x{} does not match arranger '{}' element size {}x{}",
                element.width(),
                element.height(),
                self.name,
                self.element_width,
                self.element_height
            )));
        }
        let is_blank = matches!(element.codec(), Codec::Blank(_));
        if !is_blank && element.codec().color_type() != self.color_type {
            return Err(GfxError::DimensionMismatch(format!(
                "element color type {:?} does not match arranger '{}' color type {:?}",
                element.codec().color_type(),
                self.name,
                self.color_type
            )));
        }

        let located = element.with_location(col * self.element_width, row * self.element_height);
        self.elements[(row * self.grid_width + col) as usize] = located;
        Ok(())
    }

    /// Element whose bounding box contains pixel (x, y).
    pub fn element_at_pixel(&self, x: u32, y: u32) -> Result<&Element, GfxError> {
        if x >= self.pixel_width() || y >= self.pixel_height() {
            return Err(GfxError::Bounds(format!(
                "pixel ({}, {}) outside arranger '{}' extents {}x{}",
                x,
                y,
                self.name,
                self.pixel_width(),
                self.pixel_height()
            )));
        }
        match self.layout {
            ImageLayout::Single => Ok(&self.elements[0]),
            ImageLayout::Tiled => {
                self.element(x / self.element_width, y / self.element_height)
            }
        }
    }

    /// All elements whose bounding boxes intersect the pixel rectangle, in
    /// row-major order (top-to-bottom, left-to-right).
    ///
    /// Ordering is a contract: bulk copy and rendering both assume it. The
    /// returned iterator is lazy and can be cloned to restart.
    pub fn elements_by_pixel(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<ElementRange<'_>, GfxError> {
        if width == 0 || height == 0 {
            return Err(GfxError::Bounds(format!(
                "empty {}x{} pixel rectangle",
                width, height
            )));
        }
        // Compare in u64: near-u32::MAX coordinates must report Bounds, not wrap
        if x as u64 + width as u64 > self.pixel_width() as u64
            || y as u64 + height as u64 > self.pixel_height() as u64
        {
            return Err(GfxError::Bounds(format!(
                "pixel rectangle ({}, {}) {}x{} outside arranger '{}' extents {}x{}",
                x,
                y,
                width,
                height,
                self.name,
                self.pixel_width(),
                self.pixel_height()
            )));
        }

        let (start_col, start_row, end_col, end_row) = match self.layout {
            ImageLayout::Single => (0, 0, 0, 0),
            ImageLayout::Tiled => (
                x / self.element_width,
                y / self.element_height,
                (x + width - 1) / self.element_width,
                (y + height - 1) / self.element_height,
            ),
        };

        Ok(ElementRange {
            arranger: self,
            start_col,
            end_col,
            end_row,
            col: start_col,
            row: start_row,
        })
    }

    /// Resize the grid, retaining elements still inside and Blank-filling
    /// new cells. Tiled layouts only.
    pub fn resize(&mut self, grid_width: u32, grid_height: u32) -> Result<(), GfxError> {
        if self.layout != ImageLayout::Tiled {
            return Err(GfxError::DimensionMismatch(format!(
                "arranger '{}' is not a tiled layout and cannot be resized",
                self.name
            )));
        }
        if grid_width == 0 || grid_height == 0 {
            return Err(GfxError::DimensionMismatch(format!(
                "arranger '{}' cannot be resized to {}x{}",
                self.name, grid_width, grid_height
            )));
        }

        let mut elements = Vec::with_capacity((grid_width * grid_height) as usize);
        for row in 0..grid_height {
            for col in 0..grid_width {
                if col < self.grid_width && row < self.grid_height {
                    let kept = self.elements[(row * self.grid_width + col) as usize].clone();
                    elements.push(kept);
                } else {
                    elements.push(blank_element(
                        col * self.element_width,
                        row * self.element_height,
                        self.element_width,
                        self.element_height,
                    )?);
                }
            }
        }

        self.grid_width = grid_width;
        self.grid_height = grid_height;
        self.elements = elements;
        Ok(())
    }

    /// Independent copy of a rectangular element range. Elements share
    /// resource/codec/palette references but the grid itself is new; the
    /// clone keeps the source's layout.
    pub fn clone_region(
        &self,
        col: u32,
        row: u32,
        width: u32,
        height: u32,
    ) -> Result<Arranger, GfxError> {
        if width == 0
            || height == 0
            || col as u64 + width as u64 > self.grid_width as u64
            || row as u64 + height as u64 > self.grid_height as u64
        {
            return Err(GfxError::Bounds(format!(
                "element rectangle ({}, {}) {}x{} outside arranger '{}' grid {}x{}",
                col, row, width, height, self.name, self.grid_width, self.grid_height
            )));
        }

        let mut elements = Vec::with_capacity((width * height) as usize);
        for r in 0..height {
            for c in 0..width {
                let el = self.elements[((row + r) * self.grid_width + col + c) as usize]
                    .with_location(c * self.element_width, r * self.element_height);
                elements.push(el);
            }
        }

        Ok(Arranger {
            name: format!("{}-clone", self.name),
            layout: self.layout,
            color_type: self.color_type,
            grid_width: width,
            grid_height: height,
            element_width: self.element_width,
            element_height: self.element_height,
            elements,
        })
    }

    /// Decode and composite every element into one RGBA image.
    ///
    /// Elements that fail to decode (short data, palette overflow, closed
    /// resource) are left transparent and reported as warnings; the pass
    /// itself never aborts.
    pub fn render(&self) -> (RgbaImage, Vec<Warning>) {
        let mut image = RgbaImage::new(self.pixel_width(), self.pixel_height());
        let mut warnings = Vec::new();

        for element in &self.elements {
            let rendered = element
                .decode()
                .and_then(|buffer| buffer.to_rgba(element.palette()));
            match rendered {
                Ok(tile) => {
                    for ty in 0..tile.height() {
                        for tx in 0..tile.width() {
                            image.put_pixel(
                                element.x1() + tx,
                                element.y1() + ty,
                                *tile.get_pixel(tx, ty),
                            );
                        }
                    }
                }
                Err(err) => warnings.push(Warning::new(format!(
                    "element at ({}, {}) in arranger '{}' skipped: {}",
                    element.x1(),
                    element.y1(),
                    self.name,
                    err
                ))),
            }
        }

        (image, warnings)
    }

    fn check_cell(&self, col: u32, row: u32) -> Result<(), GfxError> {
        if col >= self.grid_width || row >= self.grid_height {
            return Err(GfxError::Bounds(format!(
                "element ({}, {}) outside arranger '{}' grid {}x{}",
                col, row, self.name, self.grid_width, self.grid_height
            )));
        }
        Ok(())
    }
}

/// Placeholder element for unassigned cells.
fn blank_element(x: u32, y: u32, width: u32, height: u32) -> Result<Element, GfxError> {
    let codec = Rc::new(Codec::Blank(BlankCodec::with_size(width, height)?));
    let file = Rc::new(DataFile::from_memory("<blank>", Vec::new()));
    let palette = Rc::new(Palette::grayscale(
        "<blank>",
        crate::color::ColorModel::Rgb15,
        1,
    ));
    Ok(Element::new(
        x,
        y,
        file,
        BitAddress::default(),
        codec,
        palette,
    ))
}

/// Lazy row-major iterator over the elements intersecting a pixel rectangle.
#[derive(Debug, Clone)]
pub struct ElementRange<'a> {
    arranger: &'a Arranger,
    start_col: u32,
    end_col: u32,
    end_row: u32,
    col: u32,
    row: u32,
}

impl<'a> Iterator for ElementRange<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        if self.row > self.end_row {
            return None;
        }
        let index = self.row * self.arranger.grid_width + self.col;
        let element = &self.arranger.elements[index as usize];

        if self.col == self.end_col {
            self.col = self.start_col;
            self.row += 1;
        } else {
            self.col += 1;
        }
        Some(element)
    }
}
