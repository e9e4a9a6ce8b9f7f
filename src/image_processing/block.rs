use image::{Rgb, Rgba};

use super::buffer::{with_alpha, PixelBuffer};
use super::error::{EffectError, Result};

pub fn validate_block_size(block_size: u32) -> Result<()> {
    if block_size == 0 {
        return Err(EffectError::InvalidBlockSize(block_size));
    }
    Ok(())
}

/// Top-left corners of the `block_size` grid covering the buffer, row-major.
pub fn block_origins(buffer: &PixelBuffer, block_size: u32) -> impl Iterator<Item = (u32, u32)> {
    let (width, height) = buffer.dimensions();
    let step = block_size.max(1) as usize;
    (0..height)
        .step_by(step)
        .flat_map(move |row| (0..width).step_by(step).map(move |col| (row, col)))
}

/// Rows and columns of the block at `(origin_row, origin_col)`, clipped to the buffer.
fn block_extent(
    buffer: &PixelBuffer,
    origin_row: u32,
    origin_col: u32,
    block_size: u32,
) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
    let row_end = origin_row.saturating_add(block_size).min(buffer.height());
    let col_end = origin_col.saturating_add(block_size).min(buffer.width());
    (origin_row..row_end, origin_col..col_end)
}

/// Integer-truncated mean of R, G and B over a block, clipped to the buffer.
///
/// Alpha does not take part. The origin must lie inside the buffer, so the
/// clipped block always holds at least one pixel.
pub fn average_block(
    buffer: &PixelBuffer,
    origin_row: u32,
    origin_col: u32,
    block_size: u32,
) -> Rgb<u8> {
    assert!(
        buffer.contains(origin_row, origin_col),
        "block origin ({}, {}) outside {}x{} buffer",
        origin_row,
        origin_col,
        buffer.width(),
        buffer.height()
    );

    let (rows, cols) = block_extent(buffer, origin_row, origin_col, block_size.max(1));
    let mut sums = [0u64; 3];
    let mut count = 0u64;

    for row in rows {
        for col in cols.clone() {
            let Rgba([r, g, b, _]) = buffer.get(row, col);
            sums[0] += r as u64;
            sums[1] += g as u64;
            sums[2] += b as u64;
            count += 1;
        }
    }

    Rgb([
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
    ])
}

/// Paint a block with `color`, giving every pixel the alpha of the origin pixel.
pub fn fill_block(
    buffer: &mut PixelBuffer,
    origin_row: u32,
    origin_col: u32,
    block_size: u32,
    color: Rgb<u8>,
) {
    let Rgba([_, _, _, alpha]) = buffer.get(origin_row, origin_col);
    fill_block_rgba(
        buffer,
        origin_row,
        origin_col,
        block_size,
        with_alpha(color, alpha),
    );
}

pub fn fill_block_rgba(
    buffer: &mut PixelBuffer,
    origin_row: u32,
    origin_col: u32,
    block_size: u32,
    pixel: Rgba<u8>,
) {
    let (rows, cols) = block_extent(buffer, origin_row, origin_col, block_size);
    for row in rows {
        for col in cols.clone() {
            buffer.set(row, col, pixel);
        }
    }
}
