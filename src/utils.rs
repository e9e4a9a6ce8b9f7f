use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::Args;

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    let inputs = args.file.iter().chain(args.merge.iter());
    for input in inputs {
        if !input.is_file() {
            return Err(anyhow::anyhow!(
                "Input file does not exist: {}",
                input.display()
            ));
        }
    }

    if args.scale == 0 {
        return Err(anyhow::anyhow!("Scale factor must be at least 1"));
    }

    if !args.dry_run && args.output_dir.exists() && !args.output_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Output path is not a directory: {}",
            args.output_dir.display()
        ));
    }

    Ok(())
}

/// Timestamp as it appears in output names: `YYYY-MM-DTHH:MM:SS`.
///
/// The day of month is not zero-padded.
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%-dT%H:%M:%S").to_string()
}

pub fn current_timestamp() -> String {
    format_timestamp(&Local::now().naive_local())
}

/// `{width}x{height}--{timestamp}--{suffix}--{sequence}.png`
pub fn output_filename(
    width: u32,
    height: u32,
    timestamp: &str,
    suffix: &str,
    sequence: usize,
) -> String {
    format!(
        "{}x{}--{}--{}--{}.png",
        width, height, timestamp, suffix, sequence
    )
}

/// Make a user-supplied suffix safe to embed in a file name.
///
/// Path separators, reserved characters and control characters become `_`,
/// runs of `_` collapse into one, and leading or trailing `_` are dropped.
/// An empty result falls back to `out`.
pub fn sanitize_suffix(suffix: &str) -> String {
    let mut result = String::with_capacity(suffix.len());
    let mut prev_was_underscore = false;

    for ch in suffix.trim().chars() {
        let ch = match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        };
        if ch == '_' {
            if !prev_was_underscore {
                result.push(ch);
            }
            prev_was_underscore = true;
        } else {
            result.push(ch);
            prev_was_underscore = false;
        }
    }

    let trimmed = result.trim_matches('_');
    if trimmed.is_empty() {
        "out".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}
