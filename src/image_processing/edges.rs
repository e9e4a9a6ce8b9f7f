//! Sobel edge detection.
//!
//! - Convolves the 3×3 Sobel pair with the window whose top-left corner is the
//!   output pixel, so only the top-left `(w-2) × (h-2)` region is written; the
//!   last two rows and columns keep whatever the output buffers started with
//!   (a copy of the source).
//! - Greyscale mode reads each neighbour as its intensity and uses the gradient
//!   magnitude `sqrt(gx² + gy²)`.
//! - Color mode convolves R, G and B separately. Its default magnitude is the
//!   legacy `sqrt(gx² + gy + gy)` computed from the stored byte components; the
//!   Euclidean form can be selected with [`MagnitudeFormula::Euclidean`].
//!
//! Gradient components are stored as bytes, i.e. modulo 256.
use image::Rgba;
use strum::{Display, EnumString};

use super::buffer::PixelBuffer;
use super::tone::{grey_pixel, intensity, ColorMode};

pub type Kernel3 = [[i32; 3]; 3];

pub const SOBEL_KERNEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
pub const SOBEL_KERNEL_Y: Kernel3 = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// How color mode combines the per-channel components into a magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MagnitudeFormula {
    /// `sqrt(gx² + gy + gy)` over the stored byte components.
    #[default]
    Legacy,
    /// `sqrt(gx² + gy²)` over the raw components, saturated to 255.
    Euclidean,
}

/// Magnitude and component images produced together by [`sobel_edges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeBuffers {
    pub magnitude: PixelBuffer,
    pub gx: PixelBuffer,
    pub gy: PixelBuffer,
}

impl EdgeBuffers {
    /// Width and height of the region the convolution writes.
    pub fn valid_region(&self) -> (u32, u32) {
        let (width, height) = self.magnitude.dimensions();
        (width.saturating_sub(2), height.saturating_sub(2))
    }

    pub fn into_array(self) -> [PixelBuffer; 3] {
        [self.magnitude, self.gx, self.gy]
    }
}

/// Textbook gradient magnitude, saturated to the byte range.
#[inline]
pub fn euclidean_magnitude(gx: i32, gy: i32) -> u8 {
    let (gx, gy) = (gx as f64, gy as f64);
    (gx * gx + gy * gy).sqrt() as u8
}

/// Legacy per-channel magnitude: `sqrt(gx² + gy + gy)` over stored bytes.
#[inline]
pub fn legacy_channel_magnitude(gx: u8, gy: u8) -> u8 {
    let (gx, gy) = (gx as f64, gy as f64);
    (gx * gx + gy + gy).sqrt() as u8
}

/// Component value as held in a byte channel.
#[inline]
fn stored_byte(value: i32) -> u8 {
    value as u8
}

fn convolve_intensity(src: &PixelBuffer, kernel: &Kernel3, row: u32, col: u32) -> i32 {
    let mut acc = 0;
    for (i, kernel_row) in kernel.iter().enumerate() {
        for (j, &weight) in kernel_row.iter().enumerate() {
            let pixel = src.get(row + i as u32, col + j as u32);
            acc += intensity(pixel) as i32 * weight;
        }
    }
    acc
}

fn convolve_channel(
    src: &PixelBuffer,
    kernel: &Kernel3,
    row: u32,
    col: u32,
    channel: usize,
) -> i32 {
    let mut acc = 0;
    for (i, kernel_row) in kernel.iter().enumerate() {
        for (j, &weight) in kernel_row.iter().enumerate() {
            let pixel = src.get(row + i as u32, col + j as u32);
            acc += pixel[channel] as i32 * weight;
        }
    }
    acc
}

/// Sobel edges with the default formula for `mode`.
pub fn sobel_edges(src: &PixelBuffer, mode: ColorMode) -> EdgeBuffers {
    sobel_edges_with(src, mode, MagnitudeFormula::default())
}

/// Sobel edges; `formula` only affects color mode.
pub fn sobel_edges_with(
    src: &PixelBuffer,
    mode: ColorMode,
    formula: MagnitudeFormula,
) -> EdgeBuffers {
    let mut edges = EdgeBuffers {
        magnitude: src.clone(),
        gx: src.clone(),
        gy: src.clone(),
    };
    let (valid_width, valid_height) = edges.valid_region();

    for row in 0..valid_height {
        for col in 0..valid_width {
            let alpha = src.get(row, col)[3];
            match mode {
                ColorMode::Greyscale => {
                    let gx = convolve_intensity(src, &SOBEL_KERNEL_X, row, col);
                    let gy = convolve_intensity(src, &SOBEL_KERNEL_Y, row, col);

                    edges
                        .magnitude
                        .set(row, col, grey_pixel(euclidean_magnitude(gx, gy), alpha));
                    edges.gx.set(row, col, grey_pixel(stored_byte(gx), alpha));
                    edges.gy.set(row, col, grey_pixel(stored_byte(gy), alpha));
                }
                ColorMode::Color => {
                    let mut magnitude = Rgba([0, 0, 0, alpha]);
                    let mut gx_pixel = Rgba([0, 0, 0, alpha]);
                    let mut gy_pixel = Rgba([0, 0, 0, alpha]);

                    for channel in 0..3 {
                        let gx = convolve_channel(src, &SOBEL_KERNEL_X, row, col, channel);
                        let gy = convolve_channel(src, &SOBEL_KERNEL_Y, row, col, channel);
                        gx_pixel[channel] = stored_byte(gx);
                        gy_pixel[channel] = stored_byte(gy);
                        magnitude[channel] = match formula {
                            MagnitudeFormula::Legacy => {
                                legacy_channel_magnitude(gx_pixel[channel], gy_pixel[channel])
                            }
                            MagnitudeFormula::Euclidean => euclidean_magnitude(gx, gy),
                        };
                    }

                    edges.magnitude.set(row, col, magnitude);
                    edges.gx.set(row, col, gx_pixel);
                    edges.gy.set(row, col, gy_pixel);
                }
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left half dark, right half bright: a vertical edge.
    fn vertical_edge(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height).unwrap();
        for row in 0..height {
            for col in 0..width {
                let v = if col < width / 2 { 10 } else { 40 };
                buffer.set(row, col, Rgba([v, v, v, 255]));
            }
        }
        buffer
    }

    #[test]
    fn test_flat_image_has_no_gradient() {
        let src = PixelBuffer::filled(5, 5, Rgba([80, 80, 80, 255])).unwrap();
        let edges = sobel_edges(&src, ColorMode::Greyscale);
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(edges.magnitude.get(row, col), Rgba([0, 0, 0, 255]));
                assert_eq!(edges.gx.get(row, col), Rgba([0, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn test_greyscale_vertical_edge() {
        let src = vertical_edge(4, 3);
        let edges = sobel_edges(&src, ColorMode::Greyscale);
        // Window at (0,0) spans columns 0..3: 10, 10, 40 -> gx = 4 * 30 = 120
        assert_eq!(edges.gx.get(0, 0), grey_pixel(120, 255));
        assert_eq!(edges.gy.get(0, 0), grey_pixel(0, 255));
        assert_eq!(edges.magnitude.get(0, 0), grey_pixel(120, 255));
        // Window at (0,1) spans 10, 40, 40 -> gx = 120 as well
        assert_eq!(edges.magnitude.get(0, 1), grey_pixel(120, 255));
    }

    #[test]
    fn test_border_is_not_written() {
        let src = vertical_edge(4, 3);
        let edges = sobel_edges(&src, ColorMode::Greyscale);
        assert_eq!(edges.valid_region(), (2, 1));
        for row in 0..3 {
            for col in 0..4 {
                if row >= 1 || col >= 2 {
                    assert_eq!(edges.magnitude.get(row, col), src.get(row, col));
                    assert_eq!(edges.gy.get(row, col), src.get(row, col));
                }
            }
        }
    }

    #[test]
    fn test_components_stored_modulo_256() {
        // Bright-to-dark edge gives a negative gx of -120, stored as 136
        let mut src = vertical_edge(4, 3);
        for row in 0..3 {
            for col in 0..4 {
                let v = if col < 2 { 40 } else { 10 };
                src.set(row, col, Rgba([v, v, v, 255]));
            }
        }
        let edges = sobel_edges(&src, ColorMode::Greyscale);
        assert_eq!(edges.gx.get(0, 0), grey_pixel(136, 255));
        assert_eq!(edges.magnitude.get(0, 0), grey_pixel(120, 255));
    }

    #[test]
    fn test_magnitude_saturates() {
        assert_eq!(euclidean_magnitude(1020, 1020), 255);
        assert_eq!(euclidean_magnitude(3, -4), 5);
    }

    #[test]
    fn test_legacy_color_formula() {
        assert_eq!(legacy_channel_magnitude(120, 0), 120);
        // sqrt(3^2 + 8 + 8) = 5
        assert_eq!(legacy_channel_magnitude(3, 8), 5);
        assert_eq!(legacy_channel_magnitude(255, 255), 255);
    }

    #[test]
    fn test_color_mode_uses_legacy_formula_by_default() {
        // Red channel varies along rows, so gy carries the gradient
        let mut src = PixelBuffer::new(3, 3).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                src.set(row, col, Rgba([(row * 2) as u8, 0, 0, 200]));
            }
        }
        // gy for red: (4 - 0) * (1 + 2 + 1) = 16, gx = 0
        let legacy = sobel_edges(&src, ColorMode::Color);
        assert_eq!(legacy.gy.get(0, 0), Rgba([16, 0, 0, 200]));
        // sqrt(0 + 16 + 16) = 5.65 -> 5
        assert_eq!(legacy.magnitude.get(0, 0), Rgba([5, 0, 0, 200]));

        let euclidean = sobel_edges_with(&src, ColorMode::Color, MagnitudeFormula::Euclidean);
        assert_eq!(euclidean.magnitude.get(0, 0), Rgba([16, 0, 0, 200]));
    }

    #[test]
    fn test_tiny_buffer_has_empty_valid_region() {
        let src = PixelBuffer::filled(2, 5, Rgba([1, 2, 3, 4])).unwrap();
        let edges = sobel_edges(&src, ColorMode::Color);
        assert_eq!(edges.valid_region(), (0, 3));
        assert_eq!(edges.magnitude, src);
    }
}
