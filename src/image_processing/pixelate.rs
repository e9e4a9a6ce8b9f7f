use strum::{Display, EnumString};

use super::block::{average_block, block_origins, fill_block, fill_block_rgba, validate_block_size};
use super::buffer::PixelBuffer;
use super::error::Result;

/// How a block picks the color it is flattened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PixelateVariant {
    /// Top-left pixel of the block
    Sample,
    /// Mean color of the block
    Average,
}

pub fn pixelate(buffer: &mut PixelBuffer, variant: PixelateVariant, block_size: u32) -> Result<()> {
    match variant {
        PixelateVariant::Sample => pixelate_sample(buffer, block_size),
        PixelateVariant::Average => pixelate_average(buffer, block_size),
    }
}

/// Block pixelation: every pixel of a block copies the block's top-left pixel.
///
/// Cheap and choppy. Running it twice with the same block size changes nothing.
pub fn pixelate_sample(buffer: &mut PixelBuffer, block_size: u32) -> Result<()> {
    validate_block_size(block_size)?;

    let origins: Vec<_> = block_origins(buffer, block_size).collect();
    for (row, col) in origins {
        let origin = buffer.get(row, col);
        fill_block_rgba(buffer, row, col, block_size, origin);
    }
    Ok(())
}

/// Block pixelation using the block's mean color, with the origin pixel's alpha.
pub fn pixelate_average(buffer: &mut PixelBuffer, block_size: u32) -> Result<()> {
    validate_block_size(block_size)?;

    let origins: Vec<_> = block_origins(buffer, block_size).collect();
    for (row, col) in origins {
        let average = average_block(buffer, row, col, block_size);
        fill_block(buffer, row, col, block_size, average);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height).unwrap();
        for row in 0..height {
            for col in 0..width {
                let v = (row * width + col) as u8;
                buffer.set(row, col, Rgba([v, v.wrapping_mul(3), 255 - v, 100 + v]));
            }
        }
        buffer
    }

    #[test]
    fn test_sample_copies_block_origin() {
        let original = gradient(5, 5);
        let mut buffer = original.clone();
        pixelate_sample(&mut buffer, 2).unwrap();

        for (row, col, pixel) in buffer.pixels() {
            let origin = original.get(row / 2 * 2, col / 2 * 2);
            assert_eq!(pixel, origin, "pixel ({}, {})", row, col);
        }
    }

    #[test]
    fn test_sample_is_idempotent() {
        let mut once = gradient(7, 4);
        pixelate_sample(&mut once, 3).unwrap();
        let mut twice = once.clone();
        pixelate_sample(&mut twice, 3).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_average_uniform_input_is_fixed_point() {
        let original = PixelBuffer::filled(4, 4, Rgba([100, 150, 200, 255])).unwrap();
        let mut buffer = original.clone();
        pixelate_average(&mut buffer, 2).unwrap();
        assert_eq!(buffer, original);
    }

    #[test]
    fn test_average_paints_mean_and_origin_alpha() {
        let mut buffer = PixelBuffer::new(2, 2).unwrap();
        buffer.set(0, 0, Rgba([0, 0, 0, 255]));
        buffer.set(0, 1, Rgba([100, 0, 0, 0]));
        buffer.set(1, 0, Rgba([0, 100, 0, 0]));
        buffer.set(1, 1, Rgba([0, 0, 101, 0]));
        pixelate_average(&mut buffer, 2).unwrap();
        assert!(buffer.pixels().all(|(_, _, p)| p == Rgba([25, 25, 25, 255])));
    }

    #[test]
    fn test_block_size_one_is_identity() {
        let original = gradient(3, 3);
        let mut sample = original.clone();
        let mut average = original.clone();
        pixelate_sample(&mut sample, 1).unwrap();
        pixelate_average(&mut average, 1).unwrap();
        assert_eq!(sample, original);
        assert_eq!(average, original);
    }

    #[test]
    fn test_variant_dispatch_and_names() {
        let original = gradient(4, 4);
        let mut via_variant = original.clone();
        let mut direct = original.clone();
        pixelate(&mut via_variant, PixelateVariant::Average, 2).unwrap();
        pixelate_average(&mut direct, 2).unwrap();
        assert_eq!(via_variant, direct);

        assert_eq!(PixelateVariant::Sample.to_string(), "sample");
        assert_eq!("average".parse::<PixelateVariant>().unwrap(), PixelateVariant::Average);
    }

    #[test]
    fn test_zero_block_size_is_error() {
        let mut buffer = gradient(2, 2);
        assert!(pixelate_sample(&mut buffer, 0).is_err());
        assert!(pixelate_average(&mut buffer, 0).is_err());
    }
}
