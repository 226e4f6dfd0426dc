//! Sequential bit-granular readers and writers over byte buffers
//!
//! Bit order is most-significant-bit-first within each byte for both
//! directions, so decoding a region and re-encoding it reproduces the
//! original bytes exactly. Both streams carry an explicit bit-length
//! ceiling: reading past it is an [`GfxError::InsufficientData`] failure
//! rather than silent zeros, which is how undersized or corrupt source
//! regions are detected. Re-seeking is always permitted; codecs re-decode
//! the same region many times.

use crate::error::GfxError;

/// Reads bits sequentially from a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_len: u64,
    position: u64,
}

impl<'a> BitReader<'a> {
    /// Open a reader over `data`, exposing the first `bit_len` bits.
    ///
    /// Fails if `data` holds fewer than `bit_len` bits.
    pub fn new(data: &'a [u8], bit_len: u64) -> Result<Self, GfxError> {
        let available = data.len() as u64 * 8;
        if bit_len > available {
            return Err(GfxError::InsufficientData {
                needed: bit_len,
                available,
            });
        }
        Ok(BitReader {
            data,
            bit_len,
            position: 0,
        })
    }

    /// Bits remaining before the declared ceiling.
    pub fn remaining(&self) -> u64 {
        self.bit_len - self.position
    }

    /// Current bit position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move to an absolute bit position within the stream.
    pub fn seek_abs(&mut self, bit_position: u64) -> Result<(), GfxError> {
        if bit_position > self.bit_len {
            return Err(GfxError::Bounds(format!(
                "seek to bit {} past stream length {}",
                bit_position, self.bit_len
            )));
        }
        self.position = bit_position;
        Ok(())
    }

    /// Read the next `count` bits (1-32) as an unsigned integer, MSB-first.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, GfxError> {
        assert!(count >= 1 && count <= 32, "bit count must be 1-32");

        if self.position + count as u64 > self.bit_len {
            return Err(GfxError::InsufficientData {
                needed: count as u64,
                available: self.remaining(),
            });
        }

        let mut value = 0u32;
        let mut left = count;

        // Fast path for whole aligned bytes
        while left >= 8 && self.position % 8 == 0 {
            value = (value << 8) | self.data[(self.position / 8) as usize] as u32;
            self.position += 8;
            left -= 8;
        }

        for _ in 0..left {
            let byte = self.data[(self.position / 8) as usize];
            let bit = (byte >> (7 - (self.position % 8) as u32)) & 1;
            value = (value << 1) | bit as u32;
            self.position += 1;
        }

        Ok(value)
    }

    /// Read the next 8 bits as a byte.
    pub fn read_byte(&mut self) -> Result<u8, GfxError> {
        Ok(self.read_bits(8)? as u8)
    }
}

/// Writes bits sequentially into an owned buffer with a fixed bit ceiling.
#[derive(Debug, Clone)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_len: u64,
    position: u64,
}

impl BitWriter {
    /// Open a zeroed writer able to hold `bit_len` bits.
    pub fn new(bit_len: u64) -> Self {
        let byte_len = bit_len.div_ceil(8) as usize;
        BitWriter {
            data: vec![0; byte_len],
            bit_len,
            position: 0,
        }
    }

    /// Current bit position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move to an absolute bit position within the stream.
    pub fn seek_abs(&mut self, bit_position: u64) -> Result<(), GfxError> {
        if bit_position > self.bit_len {
            return Err(GfxError::Bounds(format!(
                "seek to bit {} past stream length {}",
                bit_position, self.bit_len
            )));
        }
        self.position = bit_position;
        Ok(())
    }

    /// Write the low `count` bits (1-32) of `value`, MSB-first.
    pub fn write_bits(&mut self, value: u32, count: u32) -> Result<(), GfxError> {
        assert!(count >= 1 && count <= 32, "bit count must be 1-32");

        if self.position + count as u64 > self.bit_len {
            return Err(GfxError::Bounds(format!(
                "write of {} bits at position {} past stream length {}",
                count, self.position, self.bit_len
            )));
        }

        for i in (0..count).rev() {
            let bit = ((value >> i) & 1) as u8;
            let byte_index = (self.position / 8) as usize;
            let shift = 7 - (self.position % 8) as u32;
            self.data[byte_index] = (self.data[byte_index] & !(1 << shift)) | (bit << shift);
            self.position += 1;
        }

        Ok(())
    }

    /// Write one byte.
    pub fn write_byte(&mut self, value: u8) -> Result<(), GfxError> {
        self.write_bits(value as u32, 8)
    }

    /// Consume the writer and return the backing bytes.
    ///
    /// The buffer length is the byte ceiling of the declared bit length;
    /// bits never written remain zero.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_msb_first() {
        let data = [0b1011_0010, 0b0100_0001];
        let mut reader = BitReader::new(&data, 16).unwrap();
        assert_eq!(reader.read_bits(1).unwrap(), 1);
        assert_eq!(reader.read_bits(3).unwrap(), 0b011);
        assert_eq!(reader.read_bits(4).unwrap(), 0b0010);
        assert_eq!(reader.read_byte().unwrap(), 0b0100_0001);
    }

    #[test]
    fn test_read_spanning_byte_boundary() {
        let data = [0b0000_0011, 0b1100_0000];
        let mut reader = BitReader::new(&data, 16).unwrap();
        reader.seek_abs(6).unwrap();
        assert_eq!(reader.read_bits(4).unwrap(), 0b1111);
    }

    #[test]
    fn test_read_past_length_fails() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data, 6).unwrap();
        assert_eq!(reader.read_bits(6).unwrap(), 0b111111);
        let err = reader.read_bits(1).unwrap_err();
        assert!(matches!(
            err,
            GfxError::InsufficientData {
                needed: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn test_open_shorter_than_declared_fails() {
        let data = [0xFF];
        assert!(matches!(
            BitReader::new(&data, 9),
            Err(GfxError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_reseek_and_redecode() {
        let data = [0xA5];
        let mut reader = BitReader::new(&data, 8).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0xA5);
        reader.seek_abs(0).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0xA5);
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let mut writer = BitWriter::new(20);
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0xAB, 8).unwrap();
        writer.write_bits(0b1_1111_0001, 9).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 3);

        let mut reader = BitReader::new(&bytes, 20).unwrap();
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
        assert_eq!(reader.read_bits(9).unwrap(), 0b1_1111_0001);
    }

    #[test]
    fn test_write_past_ceiling_fails() {
        let mut writer = BitWriter::new(8);
        writer.write_byte(0x42).unwrap();
        assert!(matches!(writer.write_bits(0, 1), Err(GfxError::Bounds(_))));
    }

    #[test]
    fn test_writer_overwrite_after_seek() {
        let mut writer = BitWriter::new(8);
        writer.write_byte(0xFF).unwrap();
        writer.seek_abs(4).unwrap();
        writer.write_bits(0b0000, 4).unwrap();
        assert_eq!(writer.into_bytes(), vec![0xF0]);
    }
}
