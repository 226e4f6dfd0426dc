//! Elements: the unit of decode/encode within an arranger
//!
//! An element binds together everything needed to decode one grid cell: the
//! backing resource, the bit address of its first bit, the codec, and the
//! palette. Elements are value-like - every `with_*` builder returns a new
//! element - so reusing one codec or palette across a whole arranger never
//! aliases mutable state.

use std::rc::Rc;

use crate::address::BitAddress;
use crate::codec::Codec;
use crate::datafile::DataFile;
use crate::error::GfxError;
use crate::palette::Palette;
use crate::pixels::PixelBuffer;

/// One rectangular decode/encode unit mapping a grid cell to a resource region.
#[derive(Debug, Clone)]
pub struct Element {
    data_file: Rc<DataFile>,
    address: BitAddress,
    codec: Rc<Codec>,
    palette: Rc<Palette>,
    /// Left edge within the arranger, in pixels
    x: u32,
    /// Top edge within the arranger, in pixels
    y: u32,
}

impl Element {
    pub fn new(
        x: u32,
        y: u32,
        data_file: Rc<DataFile>,
        address: BitAddress,
        codec: Rc<Codec>,
        palette: Rc<Palette>,
    ) -> Self {
        Element {
            data_file,
            address,
            codec,
            palette,
            x,
            y,
        }
    }

    pub fn data_file(&self) -> &Rc<DataFile> {
        &self.data_file
    }

    pub fn address(&self) -> BitAddress {
        self.address
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn codec_rc(&self) -> &Rc<Codec> {
        &self.codec
    }

    pub fn palette(&self) -> &Rc<Palette> {
        &self.palette
    }

    /// Width in pixels, determined by the codec.
    pub fn width(&self) -> u32 {
        self.codec.width()
    }

    /// Height in pixels, determined by the codec.
    pub fn height(&self) -> u32 {
        self.codec.height()
    }

    /// Left edge within the arranger, inclusive.
    pub fn x1(&self) -> u32 {
        self.x
    }

    /// Top edge within the arranger, inclusive.
    pub fn y1(&self) -> u32 {
        self.y
    }

    /// Right edge within the arranger, inclusive.
    pub fn x2(&self) -> u32 {
        self.x + self.width() - 1
    }

    /// Bottom edge within the arranger, inclusive.
    pub fn y2(&self) -> u32 {
        self.y + self.height() - 1
    }

    pub fn with_location(&self, x: u32, y: u32) -> Element {
        let mut el = self.clone();
        el.x = x;
        el.y = y;
        el
    }

    pub fn with_address(&self, address: BitAddress) -> Element {
        let mut el = self.clone();
        el.address = address;
        el
    }

    pub fn with_palette(&self, palette: Rc<Palette>) -> Element {
        let mut el = self.clone();
        el.palette = palette;
        el
    }

    pub fn with_codec(&self, codec: Rc<Codec>) -> Element {
        let mut el = self.clone();
        el.codec = codec;
        el
    }

    pub fn with_target(
        &self,
        data_file: Rc<DataFile>,
        address: BitAddress,
        codec: Rc<Codec>,
        palette: Rc<Palette>,
    ) -> Element {
        Element::new(self.x, self.y, data_file, address, codec, palette)
    }

    /// Read this element's bits from the resource and decode them.
    ///
    /// Checks the resource length against `address + storage_size` before
    /// reading, so undersized files fail with `InsufficientData` instead of
    /// mis-rendering. Never leaves partial state behind.
    pub fn decode(&self) -> Result<PixelBuffer, GfxError> {
        let storage = self.codec.storage_size();
        if storage == 0 {
            return self.codec.decode(&self.palette, &[]);
        }

        let available = self.data_file.len_bits()?;
        if self.address.total_bits() + storage > available {
            return Err(GfxError::InsufficientData {
                needed: self.address.total_bits() + storage,
                available,
            });
        }

        let data = self.data_file.read_bits(self.address, storage)?;
        self.codec.decode(&self.palette, &data)
    }

    /// Encode a pixel buffer and write it back to the resource.
    ///
    /// Encoding is validated fully before any byte is written; a failed
    /// encode leaves the resource untouched.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<(), GfxError> {
        let storage = self.codec.storage_size();
        let encoded = self.codec.encode(buffer)?;
        if storage == 0 {
            return Ok(());
        }
        self.data_file.write_bits(self.address, &encoded, storage)?;
        self.data_file.flush()
    }
}
