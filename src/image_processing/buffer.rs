use image::{Rgb, Rgba, RgbaImage};

use super::error::{EffectError, Result};

/// Owned RGBA pixel grid shared by every transform.
///
/// Pixels live in one contiguous row-major allocation. Access is by
/// `(row, col)`; indexing outside the grid is a programming error and panics
/// rather than clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Create a zero-initialized (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EffectError::InvalidDimensions { width, height });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Create a buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Rgba<u8>) -> Result<Self> {
        let mut buffer = Self::new(width, height)?;
        buffer.image.pixels_mut().for_each(|p| *p = pixel);
        Ok(buffer)
    }

    /// Wrap a decoded image.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EffectError::InvalidDimensions { width, height });
        }
        Ok(Self { image })
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row < self.height() && col < self.width()
    }

    #[inline]
    pub fn get(&self, row: u32, col: u32) -> Rgba<u8> {
        self.check_bounds(row, col);
        *self.image.get_pixel(col, row)
    }

    #[inline]
    pub fn set(&mut self, row: u32, col: u32, pixel: Rgba<u8>) {
        self.check_bounds(row, col);
        self.image.put_pixel(col, row, pixel);
    }

    /// Overwrite the color channels of a pixel, keeping its alpha.
    #[inline]
    pub fn set_rgb(&mut self, row: u32, col: u32, color: Rgb<u8>) {
        let Rgba([_, _, _, a]) = self.get(row, col);
        self.set(row, col, with_alpha(color, a));
    }

    /// Iterate `(row, col, pixel)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba<u8>)> + '_ {
        self.image
            .enumerate_pixels()
            .map(|(col, row, pixel)| (row, col, *pixel))
    }

    /// Apply `f` to every pixel in place.
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(Rgba<u8>) -> Rgba<u8>,
    {
        for pixel in self.image.pixels_mut() {
            *pixel = f(*pixel);
        }
    }

    #[inline]
    fn check_bounds(&self, row: u32, col: u32) {
        assert!(
            self.contains(row, col),
            "pixel (row {}, col {}) out of bounds for {}x{} buffer",
            row,
            col,
            self.width(),
            self.height()
        );
    }
}

/// Color channels of a pixel.
#[inline]
pub fn rgb_of(pixel: Rgba<u8>) -> Rgb<u8> {
    let Rgba([r, g, b, _]) = pixel;
    Rgb([r, g, b])
}

#[inline]
pub fn with_alpha(color: Rgb<u8>, alpha: u8) -> Rgba<u8> {
    let Rgb([r, g, b]) = color;
    Rgba([r, g, b, alpha])
}
