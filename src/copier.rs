//! Validated bulk transfer between grids
//!
//! Both copy paths follow the same validate-then-execute shape: the whole
//! request is checked before anything is touched, so a failing copy
//! performs zero mutations. Element copies move whole elements (codec,
//! palette, and address transfer with the cell); pixel copies move
//! per-pixel values between decoded buffers.

use crate::arranger::Arranger;
use crate::codec::ImageLayout;
use crate::error::GfxError;
use crate::pixels::PixelBuffer;

/// Check whether a `copy_width` x `copy_height` element rectangle can move
/// from `source` at `source_start` to `dest` at `dest_start`.
///
/// Returns the first violated invariant: rectangles inside both grids,
/// matching element pixel sizes, tiled destination, matching color types.
pub fn can_copy_elements(
    source: &Arranger,
    dest: &Arranger,
    source_start: (u32, u32),
    dest_start: (u32, u32),
    copy_width: u32,
    copy_height: u32,
) -> Result<(), GfxError> {
    let (source_cols, source_rows) = source.grid_size();
    let (dest_cols, dest_rows) = dest.grid_size();

    // Rectangle arithmetic in u64 so near-u32::MAX starts report Bounds
    // instead of wrapping past the check
    if source_start.0 as u64 + copy_width as u64 > source_cols as u64 {
        return Err(GfxError::Bounds(format!(
            "source arranger '{}' with width {} is insufficient to copy {} elements starting from column {}",
            source.name(),
            source_cols,
            copy_width,
            source_start.0
        )));
    }
    if source_start.1 as u64 + copy_height as u64 > source_rows as u64 {
        return Err(GfxError::Bounds(format!(
            "source arranger '{}' with height {} is insufficient to copy {} elements starting from row {}",
            source.name(),
            source_rows,
            copy_height,
            source_start.1
        )));
    }
    if dest_start.0 as u64 + copy_width as u64 > dest_cols as u64 {
        return Err(GfxError::Bounds(format!(
            "destination arranger '{}' with width {} is insufficient to copy {} elements starting from column {}",
            dest.name(),
            dest_cols,
            copy_width,
            dest_start.0
        )));
    }
    if dest_start.1 as u64 + copy_height as u64 > dest_rows as u64 {
        return Err(GfxError::Bounds(format!(
            "destination arranger '{}' with height {} is insufficient to copy {} elements starting from row {}",
            dest.name(),
            dest_rows,
            copy_height,
            dest_start.1
        )));
    }
    if source.element_pixel_size() != dest.element_pixel_size() {
        let (sw, sh) = source.element_pixel_size();
        let (dw, dh) = dest.element_pixel_size();
        return Err(GfxError::DimensionMismatch(format!(
            "source arranger '{}' element size ({}, {}) does not match destination arranger '{}' element size ({}, {})",
            source.name(),
            sw,
            sh,
            dest.name(),
            dw,
            dh
        )));
    }
    if dest.layout() != ImageLayout::Tiled {
        return Err(GfxError::DimensionMismatch(format!(
            "destination arranger '{}' is not a tiled layout",
            dest.name()
        )));
    }
    if source.color_type() != dest.color_type() {
        return Err(GfxError::DimensionMismatch(format!(
            "source arranger '{}' color type {:?} does not match destination arranger '{}' color type {:?}",
            source.name(),
            source.color_type(),
            dest.name(),
            dest.color_type()
        )));
    }

    Ok(())
}

/// Copy whole elements row-major from `source` into `dest`.
///
/// Validates with [`can_copy_elements`] first; on failure the destination
/// is untouched.
pub fn copy_elements(
    source: &Arranger,
    dest: &mut Arranger,
    source_start: (u32, u32),
    dest_start: (u32, u32),
    copy_width: u32,
    copy_height: u32,
) -> Result<(), GfxError> {
    can_copy_elements(source, dest, source_start, dest_start, copy_width, copy_height)?;

    for row in 0..copy_height {
        for col in 0..copy_width {
            let element = source
                .element(source_start.0 + col, source_start.1 + row)?
                .clone();
            dest.set_element(element, dest_start.0 + col, dest_start.1 + row)?;
        }
    }

    Ok(())
}

/// Check whether a pixel rectangle can move between two decoded buffers:
/// rectangles inside both, matching color types.
pub fn can_copy_pixels(
    source: &PixelBuffer,
    dest: &PixelBuffer,
    source_start: (u32, u32),
    dest_start: (u32, u32),
    copy_width: u32,
    copy_height: u32,
) -> Result<(), GfxError> {
    if source_start.0 as u64 + copy_width as u64 > source.width() as u64
        || source_start.1 as u64 + copy_height as u64 > source.height() as u64
    {
        return Err(GfxError::Bounds(format!(
            "source rectangle ({}, {}) {}x{} outside {}x{} buffer",
            source_start.0,
            source_start.1,
            copy_width,
            copy_height,
            source.width(),
            source.height()
        )));
    }
    if dest_start.0 as u64 + copy_width as u64 > dest.width() as u64
        || dest_start.1 as u64 + copy_height as u64 > dest.height() as u64
    {
        return Err(GfxError::Bounds(format!(
            "destination rectangle ({}, {}) {}x{} outside {}x{} buffer",
            dest_start.0,
            dest_start.1,
            copy_width,
            copy_height,
            dest.width(),
            dest.height()
        )));
    }
    match (source, dest) {
        (PixelBuffer::Indexed(_), PixelBuffer::Indexed(_)) => Ok(()),
        (PixelBuffer::Direct(_), PixelBuffer::Direct(_)) => Ok(()),
        _ => Err(GfxError::DimensionMismatch(
            "source and destination buffers have different color types".to_string(),
        )),
    }
}

/// Copy per-pixel values row-major between two decoded buffers.
pub fn copy_pixels(
    source: &PixelBuffer,
    dest: &mut PixelBuffer,
    source_start: (u32, u32),
    dest_start: (u32, u32),
    copy_width: u32,
    copy_height: u32,
) -> Result<(), GfxError> {
    can_copy_pixels(source, dest, source_start, dest_start, copy_width, copy_height)?;

    for y in 0..copy_height {
        for x in 0..copy_width {
            let (sx, sy) = (source_start.0 + x, source_start.1 + y);
            let (dx, dy) = (dest_start.0 + x, dest_start.1 + y);
            match (&source, &mut *dest) {
                (PixelBuffer::Indexed(s), PixelBuffer::Indexed(d)) => {
                    d.set(dx, dy, s.get(sx, sy)?)?;
                }
                (PixelBuffer::Direct(s), PixelBuffer::Direct(d)) => {
                    d.set(dx, dy, s.get(sx, sy)?)?;
                }
                _ => unreachable!("color types validated by can_copy_pixels"),
            }
        }
    }

    Ok(())
}
