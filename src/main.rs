use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::time::Instant;

use png_effects::cli::Args;
use png_effects::image_processing::{
    EffectRequest, ProcessingConfig, ProcessingEngine, ProcessingResult,
};
use png_effects::json_output::JsonMessage;
use png_effects::utils::{
    create_progress_bar, error_println, format_duration, validate_inputs, verbose_println,
};

fn main() {
    let mut args = Args::parse();
    let json = args.json_progress;

    if let Err(e) = run(&mut args) {
        if json {
            JsonMessage::summary(0, 0, 1, 0.0);
        } else {
            error_println(&format!("{:#}", e));
        }
        std::process::exit(1);
    }
}

fn run(args: &mut Args) -> Result<()> {
    let start_time = Instant::now();
    args.load_and_merge_config()?;
    let json = args.json_progress;

    if !json {
        println!("{}", style("PNG Effects").bold().blue());
        println!("{}", style("Palette, pixelation and edge effects").dim());
        println!();
    }

    validate_inputs(args)?;
    let request = args.to_request()?;

    let config = ProcessingConfig {
        scale: args.scale,
        output_suffix: args.out_file.clone(),
        output_dir: args.output_dir.clone(),
        verbose: args.verbose && !json,
        dry_run: args.dry_run,
    };

    if config.verbose {
        println!("{}", style("Configuration:").bold());
        println!("  Mode: {}", request.mode_name());
        for input in request.inputs() {
            println!("  Input: {}", input.display());
        }
        println!("  Scale: {}", config.scale);
        println!("  Output suffix: {}", config.output_suffix);
        println!("  Output directory: {}", config.output_dir.display());
        if config.dry_run {
            println!("  Dry run mode: enabled (simulation only - no files will be created)");
        }
        println!();
    }

    // Create output directory (skip in dry-run mode)
    if !config.dry_run {
        std::fs::create_dir_all(&config.output_dir).context("Failed to create output directory")?;
    } else {
        verbose_println(config.verbose, "Dry run mode: Skipping output directory creation");
    }

    let dry_run_mode = config.dry_run;
    let mut engine = ProcessingEngine::new(config)?;
    let total = engine.planned_outputs(&request)?;

    let results = if json {
        run_json(&mut engine, &request, total as usize, start_time)?
    } else {
        let progress = create_progress_bar(total);
        let results = engine.run_with_progress(&request, &progress);
        match &results {
            Ok(_) => progress.finish_with_message("✓ Processing complete!"),
            Err(_) => progress.abandon_with_message("✗ Processing stopped"),
        }
        results?
    };

    if !json {
        print_summary(&results, &args.output_dir, dry_run_mode, start_time);
    }
    Ok(())
}

fn run_json(
    engine: &mut ProcessingEngine,
    request: &EffectRequest,
    total: usize,
    start_time: Instant,
) -> Result<Vec<ProcessingResult>> {
    let mut written = 0;
    let outcome = engine.run(request, |result| {
        written += 1;
        JsonMessage::file_written(result);
        JsonMessage::progress(written, total, request.mode_name());
    });

    match outcome {
        Ok(results) => {
            JsonMessage::summary(
                request.inputs().len(),
                results.len(),
                0,
                start_time.elapsed().as_secs_f64(),
            );
            Ok(results)
        }
        Err(e) => {
            for input in request.inputs() {
                JsonMessage::file_failed(input, format!("{:#}", e));
            }
            Err(e)
        }
    }
}

fn print_summary(
    results: &[ProcessingResult],
    output_dir: &std::path::Path,
    dry_run_mode: bool,
    start_time: Instant,
) {
    let total_time = start_time.elapsed();
    println!();

    let header = if dry_run_mode {
        style("Dry Run Results Summary:").bold().cyan()
    } else {
        style("Results Summary:").bold().green()
    };
    println!("{}", header);

    let written_label = if dry_run_mode {
        "Would be written"
    } else {
        "Files written"
    };
    println!("  {}: {}", written_label, style(results.len()).bold().green());

    for (i, result) in results.iter().enumerate() {
        let filename = result
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown");
        println!(
            "  {}: {} [{}x{}]",
            style(format!("#{}", i + 1)).dim(),
            style(filename).bold(),
            result.width,
            result.height
        );
    }

    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total processing time: {}",
        style(format_duration(total_time)).bold()
    );

    println!();
    let location_label = if dry_run_mode {
        "Would be saved to"
    } else {
        "Output directory"
    };
    println!("  {}: {}", location_label, output_dir.display());

    if dry_run_mode {
        println!();
        println!("{}", style("Dry Run Mode:").bold().yellow());
        println!("  • No files were created during this simulation");
        println!("  • Remove --dry-run to write the images");
    }
}
