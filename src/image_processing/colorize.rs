//! Palette quantization
//!
//! Three ways of mapping an image onto a palette:
//! - per pixel: every pixel is matched on its own
//! - block average: each block's mean color is matched and the block painted
//! - block sample: each block's top-left pixel is matched (skips averaging)
//!
//! Block variants give the block the alpha of its origin pixel.

use image::Rgba;
use strum::{Display, EnumString};

use super::block::{average_block, block_origins, fill_block, validate_block_size};
use super::buffer::{rgb_of, with_alpha, PixelBuffer};
use super::error::{EffectError, Result};
use super::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ColorizeVariant {
    BlockAverage,
    BlockSample,
    PerPixel,
}

pub fn colorize(
    buffer: &mut PixelBuffer,
    palette: &Palette,
    variant: ColorizeVariant,
    block_size: u32,
) -> Result<()> {
    match variant {
        ColorizeVariant::BlockAverage => colorize_block_average(buffer, palette, block_size),
        ColorizeVariant::BlockSample => colorize_block_sample(buffer, palette, block_size),
        ColorizeVariant::PerPixel => colorize_per_pixel(buffer, palette),
    }
}

pub fn colorize_per_pixel(buffer: &mut PixelBuffer, palette: &Palette) -> Result<()> {
    if palette.is_empty() {
        return Err(EffectError::EmptyPalette);
    }

    let (width, height) = buffer.dimensions();
    for row in 0..height {
        for col in 0..width {
            let pixel = buffer.get(row, col);
            let Rgba([_, _, _, alpha]) = pixel;
            let color = palette.nearest(rgb_of(pixel))?;
            buffer.set(row, col, with_alpha(color, alpha));
        }
    }
    Ok(())
}

pub fn colorize_block_average(
    buffer: &mut PixelBuffer,
    palette: &Palette,
    block_size: u32,
) -> Result<()> {
    validate_block_size(block_size)?;

    let origins: Vec<_> = block_origins(buffer, block_size).collect();
    for (row, col) in origins {
        let average = average_block(buffer, row, col, block_size);
        let color = palette.nearest(average)?;
        fill_block(buffer, row, col, block_size, color);
    }
    Ok(())
}

pub fn colorize_block_sample(
    buffer: &mut PixelBuffer,
    palette: &Palette,
    block_size: u32,
) -> Result<()> {
    validate_block_size(block_size)?;

    let origins: Vec<_> = block_origins(buffer, block_size).collect();
    for (row, col) in origins {
        let color = palette.nearest(rgb_of(buffer.get(row, col)))?;
        fill_block(buffer, row, col, block_size, color);
    }
    Ok(())
}
