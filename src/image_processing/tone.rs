use image::Rgba;
use strum::{Display, EnumString};

use super::buffer::PixelBuffer;
use super::error::{EffectError, Result};

/// Whether an operation works on a single intensity value or on each of R, G, B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ColorMode {
    Greyscale,
    Color,
}

/// Integer arithmetic used to map a value into the stretched range.
///
/// `Legacy` divides before multiplying, `(v - min) / (max - min) * 255`, so
/// only the maximum survives as 255 and everything below it drops to 0.
/// `Scaled` multiplies first and keeps the intermediate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum NormalizeArithmetic {
    #[default]
    Legacy,
    Scaled,
}

impl NormalizeArithmetic {
    #[inline]
    fn stretch(self, value: u8, min: u8, max: u8) -> u8 {
        let offset = (value - min) as u32;
        let range = (max - min) as u32;
        match self {
            NormalizeArithmetic::Legacy => (offset / range * 255) as u8,
            NormalizeArithmetic::Scaled => (offset * 255 / range) as u8,
        }
    }
}

const CHANNEL_NAMES: [&str; 3] = ["red", "green", "blue"];

/// Plain mean of R, G and B, truncated.
#[inline]
pub fn intensity(pixel: Rgba<u8>) -> u8 {
    let Rgba([r, g, b, _]) = pixel;
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

#[inline]
pub fn grey_pixel(value: u8, alpha: u8) -> Rgba<u8> {
    Rgba([value, value, value, alpha])
}

/// Set R = G = B to the pixel's intensity; alpha is untouched.
pub fn greyscale(buffer: &mut PixelBuffer) {
    buffer.map_in_place(|pixel| grey_pixel(intensity(pixel), pixel[3]));
}

/// Linear contrast stretch of the observed value range onto `[0, 255]`.
///
/// Color mode stretches R, G and B independently; greyscale mode stretches the
/// intensity and writes it to all three channels. A channel whose minimum
/// equals its maximum cannot be stretched and yields
/// [`EffectError::DegenerateRange`], leaving the buffer untouched.
///
/// Uses [`NormalizeArithmetic::Legacy`].
pub fn min_max_normalize(buffer: &mut PixelBuffer, mode: ColorMode) -> Result<()> {
    min_max_normalize_with(buffer, mode, NormalizeArithmetic::default())
}

/// [`min_max_normalize`] with an explicit arithmetic.
pub fn min_max_normalize_with(
    buffer: &mut PixelBuffer,
    mode: ColorMode,
    arithmetic: NormalizeArithmetic,
) -> Result<()> {
    match mode {
        ColorMode::Color => normalize_color(buffer, arithmetic),
        ColorMode::Greyscale => normalize_greyscale(buffer, arithmetic),
    }
}

fn normalize_color(buffer: &mut PixelBuffer, arithmetic: NormalizeArithmetic) -> Result<()> {
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];

    for (_, _, pixel) in buffer.pixels() {
        for channel in 0..3 {
            min[channel] = min[channel].min(pixel[channel]);
            max[channel] = max[channel].max(pixel[channel]);
        }
    }

    for channel in 0..3 {
        if min[channel] == max[channel] {
            return Err(EffectError::DegenerateRange {
                channel: CHANNEL_NAMES[channel],
                value: min[channel],
            });
        }
    }

    buffer.map_in_place(|mut pixel| {
        for channel in 0..3 {
            pixel[channel] = arithmetic.stretch(pixel[channel], min[channel], max[channel]);
        }
        pixel
    });
    Ok(())
}

fn normalize_greyscale(buffer: &mut PixelBuffer, arithmetic: NormalizeArithmetic) -> Result<()> {
    let (min, max) = buffer
        .pixels()
        .map(|(_, _, pixel)| intensity(pixel))
        .fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min == max {
        return Err(EffectError::DegenerateRange {
            channel: "intensity",
            value: min,
        });
    }

    buffer.map_in_place(|pixel| {
        grey_pixel(arithmetic.stretch(intensity(pixel), min, max), pixel[3])
    });
    Ok(())
}
