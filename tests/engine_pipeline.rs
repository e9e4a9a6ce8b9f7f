//! End-to-end runs through the engine against real PNG files.

use clap::Parser;
use image::{Rgb, RgbImage, Rgba};
use std::path::{Path, PathBuf};

use png_effects::image_processing::io::{load_rgba, save_png};
use png_effects::image_processing::{
    ColorMode, ColorizeVariant, MagnitudeFormula, NormalizeArithmetic, Palette,
};
use png_effects::{
    Args, EffectError, EffectRequest, PaletteSelection, PixelBuffer, ProcessingConfig,
    ProcessingEngine,
};

fn engine(output_dir: &Path) -> ProcessingEngine {
    ProcessingEngine::new(ProcessingConfig {
        output_dir: output_dir.to_path_buf(),
        output_suffix: "it".to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn save(dir: &Path, name: &str, buffer: &PixelBuffer) -> PathBuf {
    let path = dir.join(name);
    save_png(buffer, &path).unwrap();
    path
}

/// Left half dark, right half light, fully opaque.
fn split_image(width: u32, height: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(width, height).unwrap();
    for row in 0..height {
        for col in 0..width {
            let v = if col < width / 2 { 10 } else { 240 };
            buffer.set(row, col, Rgba([v, v, v, 255]));
        }
    }
    buffer
}

#[test]
fn test_black_white_palette_per_pixel() {
    let dir = tempfile::tempdir().unwrap();
    let input = save(
        dir.path(),
        "dark.png",
        &PixelBuffer::filled(3, 3, Rgba([10, 10, 10, 255])).unwrap(),
    );

    let request = EffectRequest::Colorize {
        input,
        palettes: PaletteSelection::Custom(Palette::from_triples(&[(0, 0, 0), (255, 255, 255)])),
        variant: ColorizeVariant::PerPixel,
        block_sizes: vec![12],
    };
    let results = engine(dir.path()).run(&request, |_| {}).unwrap();

    let written = load_rgba(&results[0].path).unwrap();
    assert!(written.pixels().all(|(_, _, p)| p == Rgba([0, 0, 0, 255])));
}

#[test]
fn test_block_average_over_halves() {
    let dir = tempfile::tempdir().unwrap();
    let input = save(dir.path(), "split.png", &split_image(4, 2));

    let request = EffectRequest::Colorize {
        input,
        palettes: PaletteSelection::Custom(Palette::from_triples(&[(0, 0, 0), (255, 255, 255)])),
        variant: ColorizeVariant::BlockAverage,
        block_sizes: vec![2],
    };
    let results = engine(dir.path()).run(&request, |_| {}).unwrap();

    let written = load_rgba(&results[0].path).unwrap();
    assert_eq!(written.get(1, 1), Rgba([0, 0, 0, 255]));
    assert_eq!(written.get(0, 2), Rgba([255, 255, 255, 255]));
}

#[test]
fn test_opaque_input_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("opaque.png");
    RgbImage::from_pixel(4, 4, Rgb([50, 60, 70])).save(&input).unwrap();

    let err = engine(dir.path())
        .run(&EffectRequest::Greyscale { input }, |_| {})
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EffectError>(),
        Some(EffectError::MissingAlpha { .. })
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_black_image_edges_fail_normalization() {
    // Zero gradient and a black border leave nothing to stretch
    let dir = tempfile::tempdir().unwrap();
    let input = save(
        dir.path(),
        "flat.png",
        &PixelBuffer::filled(5, 5, Rgba([0, 0, 0, 255])).unwrap(),
    );

    let request = EffectRequest::Edges {
        input,
        mode: ColorMode::Greyscale,
        formula: MagnitudeFormula::Legacy,
        normalize: NormalizeArithmetic::Legacy,
    };
    let err = engine(dir.path()).run(&request, |_| {}).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EffectError>(),
        Some(EffectError::DegenerateRange { .. })
    ));
}

#[test]
fn test_greyscale_edges_find_the_split() {
    let dir = tempfile::tempdir().unwrap();
    let input = save(dir.path(), "split.png", &split_image(6, 4));

    let request = EffectRequest::Edges {
        input,
        mode: ColorMode::Greyscale,
        formula: MagnitudeFormula::Legacy,
        normalize: NormalizeArithmetic::Legacy,
    };
    let results = engine(dir.path()).run(&request, |_| {}).unwrap();
    assert_eq!(results.len(), 3);

    let magnitude = load_rgba(&results[0].path).unwrap();
    // Window at column 1 straddles the split; column 3 sits wholly on the light side
    assert_eq!(magnitude.get(0, 1), Rgba([255, 255, 255, 255]));
    assert_eq!(magnitude.get(0, 3)[0], 0);
}

#[test]
fn test_scaled_normalize_keeps_edge_midtones() {
    // Edges saturate to 255; the copied border keeps intensities 10, 100 and 240
    let dir = tempfile::tempdir().unwrap();
    let mut source = split_image(6, 4);
    for row in 0..4 {
        source.set(row, 2, Rgba([100, 100, 100, 255]));
    }
    let input = save(dir.path(), "band.png", &source);

    let run = |normalize| {
        let request = EffectRequest::Edges {
            input: input.clone(),
            mode: ColorMode::Greyscale,
            formula: MagnitudeFormula::Legacy,
            normalize,
        };
        let results = engine(dir.path()).run(&request, |_| {}).unwrap();
        load_rgba(&results[0].path).unwrap()
    };

    let legacy = run(NormalizeArithmetic::Legacy);
    let scaled = run(NormalizeArithmetic::Scaled);

    // Divide-first leaves only the extremes
    assert!(legacy.pixels().all(|(_, _, p)| p[0] == 0 || p[0] == 255));
    assert!(scaled.pixels().any(|(_, _, p)| p[0] != 0 && p[0] != 255));
}

#[test]
fn test_zero_block_size_rejected_by_engine() {
    let dir = tempfile::tempdir().unwrap();
    let input = save(dir.path(), "split.png", &split_image(4, 4));

    let request = EffectRequest::Pixelate {
        input,
        variant: png_effects::image_processing::PixelateVariant::Sample,
        block_sizes: vec![0],
    };
    let err = engine(dir.path()).run(&request, |_| {}).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EffectError>(),
        Some(EffectError::InvalidBlockSize(0))
    ));
}

#[test]
fn test_mix_channels_last_frame_is_fully_stained() {
    let dir = tempfile::tempdir().unwrap();
    let input = save(
        dir.path(),
        "black.png",
        &PixelBuffer::filled(4, 3, Rgba([0, 0, 0, 255])).unwrap(),
    );

    let request = EffectRequest::MixChannels {
        input,
        color: Rgb([0, 128, 0]),
    };
    let results = engine(dir.path()).run(&request, |_| {}).unwrap();
    assert_eq!(results.len(), 6);

    let first = load_rgba(&results[0].path).unwrap();
    assert_eq!(first.get(0, 0), Rgba([0, 128, 0, 255]));
    assert_eq!(first.get(2, 3), Rgba([0, 0, 0, 255]));

    let last = load_rgba(&results[5].path).unwrap();
    assert!(last.pixels().all(|(_, _, p)| p == Rgba([0, 128, 0, 255])));
}

#[test]
fn test_merge_transparent_base_takes_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let base = save(
        dir.path(),
        "base.png",
        &PixelBuffer::filled(3, 3, Rgba([0, 0, 0, 0])).unwrap(),
    );
    let overlay = save(
        dir.path(),
        "overlay.png",
        &PixelBuffer::filled(3, 3, Rgba([255, 0, 0, 255])).unwrap(),
    );

    let results = engine(dir.path())
        .run(
            &EffectRequest::Merge {
                inputs: vec![base, overlay],
            },
            |_| {},
        )
        .unwrap();
    let merged = load_rgba(&results[0].path).unwrap();
    assert!(merged.pixels().all(|(_, _, p)| p == Rgba([255, 0, 0, 255])));
}

#[test]
fn test_cli_flags_drive_a_pixelate_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = save(dir.path(), "split.png", &split_image(8, 8));
    let out_dir = dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();

    let args = Args::try_parse_from([
        "png-effects",
        "--file",
        input.to_str().unwrap(),
        "--mode",
        "pixelate",
        "--pixelate",
        "average",
        "--from",
        "2",
        "--to",
        "5",
        "--scale",
        "2",
        "--out-file",
        "run/1",
    ])
    .unwrap();
    let request = args.to_request().unwrap();

    let mut engine = ProcessingEngine::new(ProcessingConfig {
        scale: args.scale,
        output_suffix: args.out_file.clone(),
        output_dir: out_dir.clone(),
        ..Default::default()
    })
    .unwrap();
    let results = engine.run(&request, |_| {}).unwrap();

    assert_eq!(results.len(), 3);
    for (i, result) in results.iter().enumerate() {
        let name = result.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("4x4--"));
        assert!(name.ends_with(&format!("--run_1--{}.png", i + 1)));
        assert_eq!(result.path.parent().unwrap(), out_dir);
    }
}
