//! Diagonal channel staining
//!
//! Walks the image along anti-diagonals (`row + col = k` for growing `k`) and
//! ORs a fixed color into every cell it visits. Repeating the walk with a
//! growing stop value on the same buffer produces the frames of a stain that
//! sweeps from the top-left corner; assembling them into an animation happens
//! outside this tool.

use image::Rgb;

use super::buffer::PixelBuffer;

/// Number of frames a full sweep is cut into.
pub const STAIN_FRAMES: u32 = 30;

/// OR `color` into cells along anti-diagonals until the walk reaches row `stop`.
///
/// Within diagonal `k` cells are visited from `(k, 0)` towards `(0, k)`. The
/// walk ends right after visiting the first cell whose row equals `stop`, which
/// is `(stop, 0)`: every cell with `row + col < stop` is stained, plus
/// `(stop, 0)` when that row exists. A `stop` past the last diagonal stains
/// the whole buffer.
pub fn mix_channels_diagonal(buffer: &mut PixelBuffer, color: Rgb<u8>, stop: u32) {
    let (width, height) = buffer.dimensions();
    let last_diagonal = width + height - 2;

    for k in 0..=last_diagonal {
        for col in 0..=k {
            let row = k - col;
            if row < height && col < width {
                let mut pixel = buffer.get(row, col);
                pixel[0] |= color[0];
                pixel[1] |= color[1];
                pixel[2] |= color[2];
                buffer.set(row, col, pixel);
            }
            if row == stop {
                return;
            }
        }
    }
}

/// Stop values for a frame sequence over a `width × height` buffer.
///
/// The step is `(width + height) / 30`, at least 1, and stops run while they
/// are below `width + height`.
pub fn stain_schedule(width: u32, height: u32) -> Vec<u32> {
    let span = width + height;
    let step = (span / STAIN_FRAMES).max(1);
    (step..span).step_by(step as usize).collect()
}
