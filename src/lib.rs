// Library exports for the binary and integration tests
pub mod cli;
pub mod config_file;
pub mod image_processing;
pub mod json_output;
pub mod utils;

// Re-export commonly used types
pub use cli::{Args, ColorizeMethod, Mode, PixelateMethod};
pub use image_processing::{
    EffectError, EffectRequest, PaletteSelection, PixelBuffer, ProcessingConfig,
    ProcessingEngine, ProcessingResult,
};
pub use json_output::JsonMessage;
