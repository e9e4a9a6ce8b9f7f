//! Error types for the effects engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EffectError>;

/// Errors raised by the pixel transforms, the palette lookup and the codec.
#[derive(Debug, Error)]
pub enum EffectError {
    /// A buffer would have a zero width or height.
    #[error("invalid buffer dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Block-based transforms need a block of at least one pixel.
    #[error("invalid block size {0}: must be at least 1")]
    InvalidBlockSize(u32),

    #[error("invalid scale factor {0}: must be at least 1")]
    InvalidScaleFactor(u32),

    /// Nearest-color lookup against a palette with no colors.
    #[error("palette is empty, nothing to match against")]
    EmptyPalette,

    #[error("unknown palette '{0}' (built-in palettes are keyed 1 to 8)")]
    UnknownPalette(String),

    #[error("invalid hex color '{0}': expected #RRGGBB")]
    InvalidHexColor(String),

    /// Min-max normalization over a channel whose minimum equals its maximum.
    #[error("cannot normalize {channel} channel: every value is {value}, range is empty")]
    DegenerateRange { channel: &'static str, value: u8 },

    #[error("{path} has no alpha channel (color type {color_type}); RGBA input is required")]
    MissingAlpha { path: PathBuf, color_type: String },

    #[error("base index {index} out of range for {count} layers")]
    BaseIndexOutOfRange { index: usize, count: usize },

    #[error("no input images given")]
    NoInputs,

    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
