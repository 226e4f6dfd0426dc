//! Shared byte-addressable resources backing element pixel data
//!
//! A [`DataFile`] is opened once and shared by every element addressing it
//! (via `Rc`, never by duplicating the handle). Access is single-threaded
//! and synchronous; interior mutability covers the seek position of the
//! underlying handle. After [`DataFile::close`], every operation fails with
//! [`GfxError::ResourceClosed`].
//!
//! Reads and writes are bit-shifted: a read at a non-byte-aligned
//! [`BitAddress`] returns bytes realigned so the requested first bit is the
//! MSB of byte 0, and a write at such an address merges into the existing
//! surrounding bits rather than clobbering them.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::address::BitAddress;
use crate::bitstream::{BitReader, BitWriter};
use crate::error::GfxError;

enum Backing {
    File(File),
    Memory(Vec<u8>),
}

/// A readable/writable byte-addressable resource.
pub struct DataFile {
    name: String,
    backing: RefCell<Option<Backing>>,
}

impl DataFile {
    /// Open a file on disk for read/write access.
    pub fn open(name: impl Into<String>, path: &Path) -> Result<Self, GfxError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(DataFile {
            name: name.into(),
            backing: RefCell::new(Some(Backing::File(file))),
        })
    }

    /// Wrap an in-memory buffer. Used for tests and scratch resources.
    pub fn from_memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        DataFile {
            name: name.into(),
            backing: RefCell::new(Some(Backing::Memory(bytes))),
        }
    }

    /// Resource name, used in error messages only.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total length in bits.
    pub fn len_bits(&self) -> Result<u64, GfxError> {
        let mut backing = self.backing.borrow_mut();
        match backing.as_mut() {
            Some(Backing::File(file)) => Ok(file.metadata()?.len() * 8),
            Some(Backing::Memory(bytes)) => Ok(bytes.len() as u64 * 8),
            None => Err(GfxError::ResourceClosed(self.name.clone())),
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.backing.borrow().is_none()
    }

    /// Read `bit_len` bits starting at `address`, realigned so the first
    /// requested bit is the MSB of the first returned byte.
    pub fn read_bits(&self, address: BitAddress, bit_len: u64) -> Result<Vec<u8>, GfxError> {
        let total = self.len_bits()?;
        if address.total_bits() + bit_len > total {
            return Err(GfxError::InsufficientData {
                needed: address.total_bits() + bit_len,
                available: total,
            });
        }

        let span_bits = address.bit_offset() as u64 + bit_len;
        let raw = self.read_span(address.byte_offset(), span_bits.div_ceil(8) as usize)?;

        if address.is_byte_aligned() {
            return Ok(raw);
        }

        // Realign: shift the span left so bit 0 of the result is the
        // element's first bit
        let mut reader = BitReader::new(&raw, span_bits)?;
        reader.seek_abs(address.bit_offset() as u64)?;
        let mut writer = BitWriter::new(bit_len);
        let mut left = bit_len;
        while left > 0 {
            let chunk = left.min(32) as u32;
            writer.write_bits(reader.read_bits(chunk)?, chunk)?;
            left -= chunk as u64;
        }
        Ok(writer.into_bytes())
    }

    /// Write `bit_len` bits from `data` (MSB-first from byte 0) at
    /// `address`, preserving surrounding bits of partially covered bytes.
    pub fn write_bits(
        &self,
        address: BitAddress,
        data: &[u8],
        bit_len: u64,
    ) -> Result<(), GfxError> {
        let total = self.len_bits()?;
        if address.total_bits() + bit_len > total {
            return Err(GfxError::Bounds(format!(
                "write of {} bits at bit {} past resource '{}' length {}",
                bit_len,
                address.total_bits(),
                self.name,
                total
            )));
        }
        if data.len() as u64 * 8 < bit_len {
            return Err(GfxError::InsufficientData {
                needed: bit_len,
                available: data.len() as u64 * 8,
            });
        }

        if address.is_byte_aligned() && bit_len % 8 == 0 {
            return self.write_span(address.byte_offset(), &data[..(bit_len / 8) as usize]);
        }

        // Read-modify-write the covered span, merging at the bit level
        let span_bits = address.bit_offset() as u64 + bit_len;
        let span_bytes = span_bits.div_ceil(8) as usize;
        let existing = self.read_span(address.byte_offset(), span_bytes)?;

        let mut writer = BitWriter::new(span_bytes as u64 * 8);
        for &byte in &existing {
            writer.write_byte(byte)?;
        }
        writer.seek_abs(address.bit_offset() as u64)?;

        let mut reader = BitReader::new(data, bit_len)?;
        let mut left = bit_len;
        while left > 0 {
            let chunk = left.min(32) as u32;
            writer.write_bits(reader.read_bits(chunk)?, chunk)?;
            left -= chunk as u64;
        }

        self.write_span(address.byte_offset(), &writer.into_bytes())
    }

    /// Flush pending writes to the underlying storage.
    pub fn flush(&self) -> Result<(), GfxError> {
        let mut backing = self.backing.borrow_mut();
        match backing.as_mut() {
            Some(Backing::File(file)) => Ok(file.flush()?),
            Some(Backing::Memory(_)) => Ok(()),
            None => Err(GfxError::ResourceClosed(self.name.clone())),
        }
    }

    /// Release the underlying handle. Subsequent operations fail with
    /// `ResourceClosed`.
    pub fn close(&self) {
        *self.backing.borrow_mut() = None;
    }

    fn read_span(&self, byte_offset: u64, len: usize) -> Result<Vec<u8>, GfxError> {
        let mut backing = self.backing.borrow_mut();
        match backing.as_mut() {
            Some(Backing::File(file)) => {
                let mut buf = vec![0u8; len];
                file.seek(SeekFrom::Start(byte_offset))?;
                file.read_exact(&mut buf)?;
                Ok(buf)
            }
            Some(Backing::Memory(bytes)) => {
                let start = byte_offset as usize;
                let end = start + len;
                if end > bytes.len() {
                    return Err(GfxError::InsufficientData {
                        needed: end as u64 * 8,
                        available: bytes.len() as u64 * 8,
                    });
                }
                Ok(bytes[start..end].to_vec())
            }
            None => Err(GfxError::ResourceClosed(self.name.clone())),
        }
    }

    fn write_span(&self, byte_offset: u64, data: &[u8]) -> Result<(), GfxError> {
        let mut backing = self.backing.borrow_mut();
        match backing.as_mut() {
            Some(Backing::File(file)) => {
                file.seek(SeekFrom::Start(byte_offset))?;
                file.write_all(data)?;
                Ok(())
            }
            Some(Backing::Memory(bytes)) => {
                let start = byte_offset as usize;
                let end = start + data.len();
                if end > bytes.len() {
                    return Err(GfxError::Bounds(format!(
                        "write of {} bytes at offset {} past resource '{}' length {}",
                        data.len(),
                        start,
                        self.name,
                        bytes.len()
                    )));
                }
                bytes[start..end].copy_from_slice(data);
                Ok(())
            }
            None => Err(GfxError::ResourceClosed(self.name.clone())),
        }
    }
}

impl std::fmt::Debug for DataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFile")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}
