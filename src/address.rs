//! Bit-granular addressing within a byte-addressable resource
//!
//! A [`BitAddress`] is a byte offset plus a bit offset, normalized so the
//! bit offset is always 0-7. All codec addressing bottoms out here: element
//! placement, sequential arranger layout, and read/write positioning are
//! expressed as bit addresses so sub-byte-packed formats address exactly.

use std::ops::Add;

/// A normalized byte-plus-bit offset into a resource.
///
/// Two addresses are equal iff their normalized forms are equal, and
/// ordering agrees with total bit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BitAddress {
    byte_offset: u64,
    bit_offset: u8,
}

impl BitAddress {
    /// Create an address from a byte offset and a bit offset.
    ///
    /// The bit offset is normalized: excess bits carry into the byte
    /// offset, so `BitAddress::new(0, 13) == BitAddress::new(1, 5)`.
    pub fn new(byte_offset: u64, bit_offset: u64) -> Self {
        BitAddress {
            byte_offset: byte_offset + bit_offset / 8,
            bit_offset: (bit_offset % 8) as u8,
        }
    }

    /// Create an address from a total bit count from the start of the resource.
    pub fn from_bits(total_bits: u64) -> Self {
        BitAddress {
            byte_offset: total_bits / 8,
            bit_offset: (total_bits % 8) as u8,
        }
    }

    /// Byte component of the address.
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Bit component of the address, always 0-7.
    pub fn bit_offset(&self) -> u8 {
        self.bit_offset
    }

    /// Total bits from the start of the resource.
    pub fn total_bits(&self) -> u64 {
        self.byte_offset * 8 + self.bit_offset as u64
    }

    /// Address advanced by `bits`.
    pub fn offset(&self, bits: u64) -> Self {
        BitAddress::from_bits(self.total_bits() + bits)
    }

    /// Whether the address lies on a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_offset == 0
    }
}

impl Add<u64> for BitAddress {
    type Output = BitAddress;

    fn add(self, bits: u64) -> BitAddress {
        self.offset(bits)
    }
}
