use super::buffer::PixelBuffer;
use super::error::{EffectError, Result};

/// Index of the first buffer with the strictly largest area.
pub fn largest_index(buffers: &[PixelBuffer]) -> Option<usize> {
    let mut largest: Option<(usize, u64)> = None;
    for (i, buffer) in buffers.iter().enumerate() {
        let area = buffer.area();
        if largest.map_or(true, |(_, best)| area > best) {
            largest = Some((i, area));
        }
    }
    largest.map(|(i, _)| i)
}

/// Layer every other buffer onto `buffers[base]`, in list order.
///
/// Each layer pixel with non-zero alpha overwrites the base pixel at the same
/// `(row, col)`; layers are not scaled, and cells outside the base are skipped.
/// Later layers win where opaque pixels overlap.
pub fn merge_composite(buffers: &mut [PixelBuffer], base: usize) -> Result<()> {
    let count = buffers.len();
    if base >= count {
        return Err(EffectError::BaseIndexOutOfRange { index: base, count });
    }

    for i in (0..count).filter(|&i| i != base) {
        let (base_buffer, layer) = if i < base {
            let (left, right) = buffers.split_at_mut(base);
            (&mut right[0], &left[i])
        } else {
            let (left, right) = buffers.split_at_mut(i);
            (&mut left[base], &right[0])
        };
        overlay(base_buffer, layer);
    }

    Ok(())
}

/// Composite a list of layers onto the largest one and return it.
pub fn merge_layers(mut buffers: Vec<PixelBuffer>) -> Result<PixelBuffer> {
    let base = largest_index(&buffers).ok_or(EffectError::NoInputs)?;
    merge_composite(&mut buffers, base)?;
    Ok(buffers.swap_remove(base))
}

fn overlay(base: &mut PixelBuffer, layer: &PixelBuffer) {
    for (row, col, pixel) in layer.pixels() {
        if pixel[3] != 0 && base.contains(row, col) {
            base.set(row, col, pixel);
        }
    }
}
