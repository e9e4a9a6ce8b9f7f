use image::{ImageError, ImageFormat, ImageReader};
use std::path::Path;

use super::buffer::PixelBuffer;
use super::error::{EffectError, Result};

/// Decode an image file into an 8-bit RGBA buffer.
///
/// The file must carry an alpha channel; any alpha color type (grey-alpha or
/// RGBA, 8 or 16 bit) is accepted and converted.
pub fn load_rgba(path: &Path) -> Result<PixelBuffer> {
    let decode_error = |source: ImageError| EffectError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let img = ImageReader::open(path)
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;

    if !img.color().has_alpha() {
        return Err(EffectError::MissingAlpha {
            path: path.to_path_buf(),
            color_type: format!("{:?}", img.color()),
        });
    }

    PixelBuffer::from_image(img.to_rgba8())
}

/// Encode a buffer as an 8-bit RGBA PNG.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    buffer
        .as_image()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| EffectError::Encode {
            path: path.to_path_buf(),
            source,
        })
}
