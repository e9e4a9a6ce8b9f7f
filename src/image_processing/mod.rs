pub mod block;
pub mod buffer;
pub mod colorize;
pub mod combine;
pub mod edges;
pub mod error;
pub mod io;
pub mod mix;
pub mod palette;
pub mod pixelate;
pub mod resize;
pub mod tone;

use anyhow::{bail, Context, Result};
use image::Rgb;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

use crate::utils::{current_timestamp, output_filename, sanitize_suffix, verbose_println};

pub use buffer::PixelBuffer;
pub use colorize::ColorizeVariant;
pub use edges::{EdgeBuffers, MagnitudeFormula};
pub use error::EffectError;
pub use palette::{Palette, PaletteRegistry};
pub use pixelate::PixelateVariant;
pub use tone::{ColorMode, NormalizeArithmetic};

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Integer downscale factor applied after loading (all modes but merge)
    pub scale: u32,
    /// Free-form tag embedded in every output file name
    pub output_suffix: String,
    pub output_dir: PathBuf,
    pub verbose: bool,
    /// Run the whole pipeline but skip writing files
    pub dry_run: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            scale: 1,
            output_suffix: "out".to_string(),
            output_dir: PathBuf::from("."),
            verbose: false,
            dry_run: false,
        }
    }
}

/// Which palettes a colorize request runs against.
#[derive(Debug, Clone)]
pub enum PaletteSelection {
    /// Every built-in palette, in key order
    All,
    /// One built-in palette by key ("1" to "8")
    Key(String),
    Custom(Palette),
}

/// One effects run, as chosen on the command line.
#[derive(Debug, Clone)]
pub enum EffectRequest {
    Colorize {
        input: PathBuf,
        palettes: PaletteSelection,
        variant: ColorizeVariant,
        block_sizes: Vec<u32>,
    },
    Pixelate {
        input: PathBuf,
        variant: PixelateVariant,
        block_sizes: Vec<u32>,
    },
    Greyscale {
        input: PathBuf,
    },
    Edges {
        input: PathBuf,
        mode: ColorMode,
        formula: MagnitudeFormula,
        normalize: NormalizeArithmetic,
    },
    MixChannels {
        input: PathBuf,
        color: Rgb<u8>,
    },
    Merge {
        inputs: Vec<PathBuf>,
    },
}

impl EffectRequest {
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Colorize { .. } => "colorize",
            Self::Pixelate { .. } => "pixelate",
            Self::Greyscale { .. } => "greyscale",
            Self::Edges { .. } => "edges",
            Self::MixChannels { .. } => "mix-channels",
            Self::Merge { .. } => "merge",
        }
    }

    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            Self::Colorize { input, .. }
            | Self::Pixelate { input, .. }
            | Self::Greyscale { input }
            | Self::Edges { input, .. }
            | Self::MixChannels { input, .. } => vec![input.as_path()],
            Self::Merge { inputs } => inputs.iter().map(PathBuf::as_path).collect(),
        }
    }
}

/// A written (or, in dry-run mode, planned) output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

pub struct ProcessingEngine {
    config: ProcessingConfig,
    registry: PaletteRegistry,
    suffix: String,
    timestamp: String,
    sequence: usize,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        if config.scale == 0 {
            return Err(EffectError::InvalidScaleFactor(config.scale).into());
        }

        let suffix = sanitize_suffix(&config.output_suffix);
        Ok(Self {
            config,
            registry: PaletteRegistry::builtin(),
            suffix,
            timestamp: current_timestamp(),
            sequence: 0,
        })
    }

    /// Pin the timestamp used in output names.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Number of files `request` will produce.
    pub fn planned_outputs(&self, request: &EffectRequest) -> Result<u64> {
        let count = match request {
            EffectRequest::Colorize {
                palettes,
                variant,
                block_sizes,
                ..
            } => {
                let palette_count = match palettes {
                    PaletteSelection::All => self.registry.len(),
                    PaletteSelection::Key(_) | PaletteSelection::Custom(_) => 1,
                };
                (palette_count * block_passes(*variant, block_sizes).len()) as u64
            }
            EffectRequest::Pixelate { block_sizes, .. } => block_sizes.len() as u64,
            EffectRequest::Greyscale { .. } | EffectRequest::Merge { .. } => 1,
            EffectRequest::Edges { .. } => 3,
            EffectRequest::MixChannels { input, .. } => {
                let (width, height) = image::image_dimensions(input)
                    .with_context(|| format!("Failed to read image header: {}", input.display()))?;
                let scale = self.config.scale;
                mix::stain_schedule(width / scale, height / scale).len() as u64
            }
        };
        Ok(count)
    }

    /// Run a request, advancing `progress` once per output.
    pub fn run_with_progress(
        &mut self,
        request: &EffectRequest,
        progress: &ProgressBar,
    ) -> Result<Vec<ProcessingResult>> {
        progress.set_message(format!("Running {}", request.mode_name()));
        self.run(request, |result| {
            progress.inc(1);
            if let Some(name) = result.path.file_name().and_then(|n| n.to_str()) {
                progress.set_message(name.to_string());
            }
        })
    }

    /// Run a request, calling `on_output` after each file is written.
    pub fn run<F>(&mut self, request: &EffectRequest, mut on_output: F) -> Result<Vec<ProcessingResult>>
    where
        F: FnMut(&ProcessingResult),
    {
        verbose_println(
            self.config.verbose,
            &format!("Mode: {}, scale: {}", request.mode_name(), self.config.scale),
        );

        let mut results = Vec::new();
        let mut sink = OutputSink {
            results: &mut results,
            on_output: &mut on_output,
        };

        match request {
            EffectRequest::Colorize {
                input,
                palettes,
                variant,
                block_sizes,
            } => self.run_colorize(input, palettes, *variant, block_sizes, &mut sink)?,
            EffectRequest::Pixelate {
                input,
                variant,
                block_sizes,
            } => self.run_pixelate(input, *variant, block_sizes, &mut sink)?,
            EffectRequest::Greyscale { input } => self.run_greyscale(input, &mut sink)?,
            EffectRequest::Edges {
                input,
                mode,
                formula,
                normalize,
            } => self.run_edges(input, *mode, *formula, *normalize, &mut sink)?,
            EffectRequest::MixChannels { input, color } => {
                self.run_mix_channels(input, *color, &mut sink)?
            }
            EffectRequest::Merge { inputs } => self.run_merge(inputs, &mut sink)?,
        }

        Ok(results)
    }

    fn run_colorize(
        &mut self,
        input: &Path,
        palettes: &PaletteSelection,
        variant: ColorizeVariant,
        block_sizes: &[u32],
        sink: &mut OutputSink<'_>,
    ) -> Result<()> {
        let passes = block_passes(variant, block_sizes);
        validate_block_sizes(passes)?;

        let selected: Vec<(String, Palette)> = match palettes {
            PaletteSelection::All => self
                .registry
                .iter()
                .map(|(key, palette)| (key.to_string(), palette.clone()))
                .collect(),
            PaletteSelection::Key(key) => {
                vec![(key.clone(), self.registry.require(key)?.clone())]
            }
            PaletteSelection::Custom(palette) => vec![("custom".to_string(), palette.clone())],
        };
        if let Some((key, _)) = selected.iter().find(|(_, p)| p.is_empty()) {
            return Err(EffectError::EmptyPalette).with_context(|| format!("Palette {}", key));
        }

        let source = self.load_scaled(input)?;
        for &block_size in passes {
            for (key, palette) in &selected {
                verbose_println(
                    self.config.verbose,
                    &format!(
                        "Colorizing ({}) with palette {} ({} colors), block size {}",
                        variant,
                        key,
                        palette.len(),
                        block_size
                    ),
                );
                let mut frame = source.clone();
                colorize::colorize(&mut frame, palette, variant, block_size)?;
                self.write_output(&frame, sink)?;
            }
        }
        Ok(())
    }

    fn run_pixelate(
        &mut self,
        input: &Path,
        variant: PixelateVariant,
        block_sizes: &[u32],
        sink: &mut OutputSink<'_>,
    ) -> Result<()> {
        validate_block_sizes(block_sizes)?;

        let source = self.load_scaled(input)?;
        for &block_size in block_sizes {
            verbose_println(
                self.config.verbose,
                &format!("Pixelating ({}) with block size {}", variant, block_size),
            );
            let mut frame = source.clone();
            pixelate::pixelate(&mut frame, variant, block_size)?;
            self.write_output(&frame, sink)?;
        }
        Ok(())
    }

    fn run_greyscale(&mut self, input: &Path, sink: &mut OutputSink<'_>) -> Result<()> {
        let mut buffer = self.load_scaled(input)?;
        tone::greyscale(&mut buffer);
        self.write_output(&buffer, sink)
    }

    /// Color mode skips the greyscale passes over the source and the three
    /// outputs; only greyscale mode applies them.
    fn run_edges(
        &mut self,
        input: &Path,
        mode: ColorMode,
        formula: MagnitudeFormula,
        normalize: NormalizeArithmetic,
        sink: &mut OutputSink<'_>,
    ) -> Result<()> {
        let mut source = self.load_scaled(input)?;
        if mode == ColorMode::Greyscale {
            tone::greyscale(&mut source);
        }

        let mut edges = edges::sobel_edges_with(&source, mode, formula);
        tone::min_max_normalize_with(&mut edges.magnitude, mode, normalize)
            .context("Failed to normalize edge magnitude")?;

        let (valid_width, valid_height) = edges.valid_region();
        verbose_println(
            self.config.verbose,
            &format!(
                "Sobel ({} mode, {} formula, {} normalize) over a {}x{} region",
                mode, formula, normalize, valid_width, valid_height
            ),
        );

        for mut buffer in edges.into_array() {
            if mode == ColorMode::Greyscale {
                tone::greyscale(&mut buffer);
            }
            self.write_output(&buffer, sink)?;
        }
        Ok(())
    }

    fn run_mix_channels(
        &mut self,
        input: &Path,
        color: Rgb<u8>,
        sink: &mut OutputSink<'_>,
    ) -> Result<()> {
        let mut buffer = self.load_scaled(input)?;
        let (width, height) = buffer.dimensions();
        let schedule = mix::stain_schedule(width, height);
        verbose_println(
            self.config.verbose,
            &format!(
                "Staining with #{:02X}{:02X}{:02X} over {} frames",
                color[0],
                color[1],
                color[2],
                schedule.len()
            ),
        );

        for stop in schedule {
            mix::mix_channels_diagonal(&mut buffer, color, stop);
            self.write_output(&buffer, sink)?;
        }
        Ok(())
    }

    fn run_merge(&mut self, inputs: &[PathBuf], sink: &mut OutputSink<'_>) -> Result<()> {
        if inputs.is_empty() {
            return Err(EffectError::NoInputs.into());
        }

        let layers = inputs
            .iter()
            .map(|path| self.load(path))
            .collect::<Result<Vec<_>>>()?;

        if let Some(base) = combine::largest_index(&layers) {
            verbose_println(
                self.config.verbose,
                &format!(
                    "Merging {} layers onto {}",
                    layers.len(),
                    inputs[base].display()
                ),
            );
        }

        let merged = combine::merge_layers(layers)?;
        self.write_output(&merged, sink)
    }

    fn load(&self, path: &Path) -> Result<PixelBuffer> {
        verbose_println(self.config.verbose, &format!("Loading: {}", path.display()));
        let buffer = io::load_rgba(path)
            .with_context(|| format!("Failed to load image: {}", path.display()))?;
        verbose_println(
            self.config.verbose,
            &format!("Loaded {}x{}", buffer.width(), buffer.height()),
        );
        Ok(buffer)
    }

    fn load_scaled(&self, path: &Path) -> Result<PixelBuffer> {
        let buffer = self.load(path)?;
        let scaled = resize::scale_owned(buffer, self.config.scale)
            .with_context(|| format!("Failed to scale {} by {}", path.display(), self.config.scale))?;
        if self.config.scale > 1 {
            verbose_println(
                self.config.verbose,
                &format!("Scaled to {}x{}", scaled.width(), scaled.height()),
            );
        }
        Ok(scaled)
    }

    fn write_output(&mut self, buffer: &PixelBuffer, sink: &mut OutputSink<'_>) -> Result<()> {
        self.sequence += 1;
        let (width, height) = buffer.dimensions();
        let path = self.config.output_dir.join(output_filename(
            width,
            height,
            &self.timestamp,
            &self.suffix,
            self.sequence,
        ));

        if self.config.dry_run {
            verbose_println(
                self.config.verbose,
                &format!("Dry run: would write {}", path.display()),
            );
        } else {
            io::save_png(buffer, &path)
                .with_context(|| format!("Failed to save PNG: {}", path.display()))?;
            verbose_println(self.config.verbose, &format!("Wrote {}", path.display()));
        }

        let result = ProcessingResult {
            path,
            width,
            height,
        };
        (sink.on_output)(&result);
        sink.results.push(result);
        Ok(())
    }
}

struct OutputSink<'a> {
    results: &'a mut Vec<ProcessingResult>,
    on_output: &'a mut dyn FnMut(&ProcessingResult),
}

/// Block sizes a colorize request actually iterates; per-pixel runs once.
fn block_passes(variant: ColorizeVariant, block_sizes: &[u32]) -> &[u32] {
    match variant {
        ColorizeVariant::PerPixel => &block_sizes[..block_sizes.len().min(1)],
        _ => block_sizes,
    }
}

fn validate_block_sizes(block_sizes: &[u32]) -> Result<()> {
    if block_sizes.is_empty() {
        bail!("No block sizes requested");
    }
    for &block_size in block_sizes {
        block::validate_block_size(block_size)?;
    }
    Ok(())
}
