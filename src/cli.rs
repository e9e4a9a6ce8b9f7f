use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::image_processing::palette::parse_hex_color;
use crate::image_processing::{
    ColorMode, ColorizeVariant, EffectRequest, MagnitudeFormula, NormalizeArithmetic, Palette,
    PaletteSelection, PixelateVariant,
};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Mode {
    /// Map the image onto one or more reference palettes
    #[value(name = "colorize")]
    Colorize,
    /// Flatten square blocks to a single color
    #[value(name = "pixelate")]
    Pixelate,
    /// Replace every pixel by its intensity
    #[value(name = "greyscale")]
    Greyscale,
    /// Sobel edge detection (writes magnitude, gx and gy images)
    #[value(name = "edges")]
    Edges,
    /// Diagonal stain animation frames (needs --hex-value)
    #[value(name = "mix-channels")]
    MixChannels,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ColorizeMethod {
    /// Match the mean color of each block
    #[value(name = "average")]
    Average,
    /// Match the top-left pixel of each block
    #[value(name = "sample")]
    Sample,
    /// Match every pixel on its own
    #[value(name = "pixel")]
    Pixel,
}

impl From<ColorizeMethod> for ColorizeVariant {
    fn from(method: ColorizeMethod) -> Self {
        match method {
            ColorizeMethod::Average => ColorizeVariant::BlockAverage,
            ColorizeMethod::Sample => ColorizeVariant::BlockSample,
            ColorizeMethod::Pixel => ColorizeVariant::PerPixel,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PixelateMethod {
    #[value(name = "sample")]
    Sample,
    #[value(name = "average")]
    Average,
}

impl From<PixelateMethod> for PixelateVariant {
    fn from(method: PixelateMethod) -> Self {
        match method {
            PixelateMethod::Sample => PixelateVariant::Sample,
            PixelateMethod::Average => PixelateVariant::Average,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "png-effects",
    about = "Palette, pixelation and edge effects for RGBA PNG images",
    long_about = "
PNG Effects

Applies one effect to an RGBA PNG and writes the results as numbered PNG files
named {width}x{height}--{timestamp}--{suffix}--{n}.png.

Example Usage:
  # Every built-in palette, block size 12
  png-effects --file photo.png --out-file photo

  # Palette 3 over block sizes 4 to 15, halving the image first
  png-effects --file photo.png --palette 3 --from 4 --to 16 --scale 2

  # Custom palette, matched per pixel
  png-effects --file photo.png --palette-hex '#000000,#FFFFFF' --colorize pixel

  # Greyscale Sobel edges
  png-effects --file photo.png --mode edges --greyscale

  # Stain animation frames
  png-effects --file photo.png --mode mix-channels --hex-value '#FF0000'

  # Layer several images onto the largest one
  png-effects --merge base.png,overlay.png"
)]
pub struct Args {
    /// Input RGBA PNG
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Comma-separated list of PNGs to layer onto the largest one (selects merge mode)
    #[arg(
        long = "merge",
        value_delimiter = ',',
        value_name = "FILE,FILE,...",
        conflicts_with = "file"
    )]
    pub merge: Vec<PathBuf>,

    /// Effect to apply
    #[arg(short = 'm', long = "mode", default_value = "colorize")]
    pub mode: Mode,

    /// Suffix embedded in every output file name
    #[arg(long = "out-file", default_value = "out", value_name = "SUFFIX")]
    pub out_file: String,

    /// Directory the output files are written to
    #[arg(short = 'o', long = "output-dir", default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Block edge length for block-based effects
    #[arg(short = 'b', long = "block-size", default_value = "12", value_name = "PIXELS")]
    pub block_size: u32,

    /// Integer downscale factor applied before the effect
    #[arg(short = 's', long = "scale", default_value = "1", value_name = "FACTOR")]
    pub scale: u32,

    /// First block size of a range (inclusive)
    #[arg(long = "from", requires = "to", value_name = "PIXELS")]
    pub from: Option<u32>,

    /// End of a block-size range (exclusive)
    #[arg(long = "to", requires = "from", value_name = "PIXELS")]
    pub to: Option<u32>,

    /// Built-in palette key, 1 to 8 (default: all of them)
    #[arg(long = "palette", value_name = "KEY")]
    pub palette: Option<String>,

    /// Custom palette as comma-separated hex colors, e.g. #000000,#FFFFFF
    #[arg(long = "palette-hex", conflicts_with = "palette", value_name = "COLORS")]
    pub palette_hex: Option<String>,

    /// How colorize picks the color each block is matched with
    #[arg(long = "colorize", default_value = "average", value_name = "METHOD")]
    pub colorize: ColorizeMethod,

    /// How pixelate picks the color of each block
    #[arg(long = "pixelate", default_value = "sample", value_name = "METHOD")]
    pub pixelate: PixelateMethod,

    /// Run edge detection on intensities
    #[arg(long = "greyscale")]
    pub greyscale: bool,

    /// Run edge detection per color channel (default)
    #[arg(long = "color", conflicts_with = "greyscale")]
    pub color: bool,

    /// Use sqrt(gx² + gy²) for color edge magnitudes
    #[arg(long = "euclidean-color-edges")]
    pub euclidean_color_edges: bool,

    /// Normalize edge magnitudes as (v - min) * 255 / (max - min) instead of
    /// dividing first
    #[arg(long = "scaled-normalize")]
    pub scaled_normalize: bool,

    /// Stain color for mix-channels, e.g. #FF0000
    #[arg(long = "hex-value", value_name = "COLOR")]
    pub hex_value: Option<String>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Run every step but do not write any files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Emit progress as JSON lines instead of styled output
    #[arg(long = "json-progress")]
    pub json_progress: bool,
}

impl Args {
    /// Block sizes to run: the `--from`/`--to` range, or just `--block-size`.
    pub fn block_sizes(&self) -> Result<Vec<u32>, String> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                if from == 0 {
                    return Err("Block size range must start at 1 or more".to_string());
                }
                if from >= to {
                    return Err(format!(
                        "Empty block size range: --from {} must be below --to {}",
                        from, to
                    ));
                }
                Ok((from..to).collect())
            }
            (None, None) => Ok(vec![self.block_size]),
            _ => Err("--from and --to must be given together".to_string()),
        }
    }

    pub fn edge_mode(&self) -> ColorMode {
        if self.greyscale {
            ColorMode::Greyscale
        } else {
            ColorMode::Color
        }
    }

    pub fn magnitude_formula(&self) -> MagnitudeFormula {
        if self.euclidean_color_edges {
            MagnitudeFormula::Euclidean
        } else {
            MagnitudeFormula::Legacy
        }
    }

    pub fn normalize_arithmetic(&self) -> NormalizeArithmetic {
        if self.scaled_normalize {
            NormalizeArithmetic::Scaled
        } else {
            NormalizeArithmetic::Legacy
        }
    }

    pub fn palette_selection(&self) -> Result<PaletteSelection> {
        if let Some(list) = &self.palette_hex {
            return Ok(PaletteSelection::Custom(Palette::from_hex_list(list)?));
        }
        Ok(match &self.palette {
            Some(key) => PaletteSelection::Key(key.trim().to_string()),
            None => PaletteSelection::All,
        })
    }

    /// Build the engine request described by the flags.
    pub fn to_request(&self) -> Result<EffectRequest> {
        if !self.merge.is_empty() {
            return Ok(EffectRequest::Merge {
                inputs: self.merge.clone(),
            });
        }

        let input = self
            .file
            .clone()
            .ok_or_else(|| anyhow!("--file is required unless --merge is given"))?;

        let request = match self.mode {
            Mode::Colorize => EffectRequest::Colorize {
                input,
                palettes: self.palette_selection()?,
                variant: self.colorize.into(),
                block_sizes: self.block_sizes().map_err(|e| anyhow!(e))?,
            },
            Mode::Pixelate => EffectRequest::Pixelate {
                input,
                variant: self.pixelate.into(),
                block_sizes: self.block_sizes().map_err(|e| anyhow!(e))?,
            },
            Mode::Greyscale => EffectRequest::Greyscale { input },
            Mode::Edges => EffectRequest::Edges {
                input,
                mode: self.edge_mode(),
                formula: self.magnitude_formula(),
                normalize: self.normalize_arithmetic(),
            },
            Mode::MixChannels => {
                let hex = self
                    .hex_value
                    .as_deref()
                    .ok_or_else(|| anyhow!("--hex-value is required for mix-channels"))?;
                EffectRequest::MixChannels {
                    input,
                    color: parse_hex_color(hex)?,
                }
            }
        };
        Ok(request)
    }
}


// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            file: None,
            merge: vec![],
            mode: Mode::Colorize,
            out_file: "out".to_string(),
            output_dir: PathBuf::from("."),
            block_size: 12,
            scale: 1,
            from: None,
            to: None,
            palette: None,
            palette_hex: None,
            colorize: ColorizeMethod::Average,
            pixelate: PixelateMethod::Sample,
            greyscale: false,
            color: false,
            euclidean_color_edges: false,
            scaled_normalize: false,
            hex_value: None,
            config_file: None,
            verbose: false,
            dry_run: false,
            json_progress: false,
        }
    }
}
