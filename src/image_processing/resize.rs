use super::buffer::PixelBuffer;
use super::error::{EffectError, Result};

/// Nearest-neighbour downscale by an integer factor.
///
/// Output pixel `(y, x)` is input pixel `(y * factor, x * factor)`; there is no
/// interpolation or anti-aliasing. The output is `(width / factor) ×
/// (height / factor)`, so a factor larger than either side is an error.
pub fn scale(src: &PixelBuffer, factor: u32) -> Result<PixelBuffer> {
    if factor == 0 {
        return Err(EffectError::InvalidScaleFactor(factor));
    }

    let (src_width, src_height) = src.dimensions();
    let mut scaled = PixelBuffer::new(src_width / factor, src_height / factor)?;
    let (width, height) = scaled.dimensions();

    for y in 0..height {
        for x in 0..width {
            scaled.set(y, x, src.get(y * factor, x * factor));
        }
    }

    Ok(scaled)
}

/// Like [`scale`], but hands the buffer back untouched for a factor of 1.
pub fn scale_owned(src: PixelBuffer, factor: u32) -> Result<PixelBuffer> {
    if factor == 1 {
        return Ok(src);
    }
    scale(&src, factor)
}
