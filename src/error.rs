//! Shared error taxonomy for the codec and addressing engine
//!
//! Expected failure conditions (bad geometry, short buffers, closed
//! resources) are reported as `Result` values carrying one of these
//! variants. Bulk operations validate their whole request up front, so a
//! returned error always means no mutation took place.

use thiserror::Error;

/// Error type for codec, addressing, and copy failures
#[derive(Debug, Error)]
pub enum GfxError {
    /// Coordinate, rectangle, or stream position outside the valid extent
    #[error("out of bounds: {0}")]
    Bounds(String),

    /// Source region shorter than the bits the operation needs
    #[error("insufficient data: needed {needed} bits, had {available}")]
    InsufficientData { needed: u64, available: u64 },

    /// Pixel grid, element, or copy geometry does not match
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Indexed pixel value exceeds the palette length
    #[error("palette index {index} exceeds palette length {len}")]
    IndexOverflow { index: u32, len: usize },

    /// Operation attempted on a resource after it was closed
    #[error("resource '{0}' has been closed")]
    ResourceClosed(String),

    /// Conversion requested for a color model this engine does not handle
    #[error("unsupported color model '{0}'")]
    UnsupportedColorModel(String),

    /// Underlying I/O failure from the backing resource
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
