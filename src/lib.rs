//! Romgfx - codec and addressing engine for retro-console graphics
//!
//! This library provides functionality to:
//! - Interpret an arbitrary binary region of a ROM/disk image as a
//!   rectangular pixel grid, and write edits back losslessly
//! - Express historically divergent bit-packed pixel encodings (direct
//!   truecolor, packed indexed, interlaced layouts) through declarative
//!   codec descriptors
//! - Address resources with byte- and sub-byte precision
//! - Arrange decoded elements into tiled or full-image grids and copy
//!   between them with up-front validation

pub mod address;
pub mod arranger;
pub mod bitstream;
pub mod cli;
pub mod codec;
pub mod color;
pub mod copier;
pub mod datafile;
pub mod element;
pub mod error;
pub mod palette;
pub mod pixels;
