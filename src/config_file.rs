use crate::cli::{Args, ColorizeMethod, Mode, PixelateMethod};
use crate::utils::warn_println;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Saved run configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: EffectsConfigJson,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsConfigJson {
    pub file: Option<String>,
    pub merge: Option<Vec<String>>,
    pub mode: Option<String>,
    pub out_file: Option<String>,
    pub output_dir: Option<String>,
    pub block_size: Option<u32>,
    pub scale: Option<u32>,
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub palette: Option<String>,
    pub palette_hex: Option<String>,
    pub colorize: Option<String>,
    pub pixelate: Option<String>,
    pub greyscale: Option<bool>,
    pub euclidean_color_edges: Option<bool>,
    pub scaled_normalize: Option<bool>,
    pub hex_value: Option<String>,
    pub verbose: Option<bool>,
    pub dry_run: Option<bool>,
}

/// True when any of `flags` appears on the command line, as `--flag value` or `--flag=value`.
fn flag_given(cli_args: &[String], flags: &[&str]) -> bool {
    cli_args.iter().any(|arg| {
        flags.iter().any(|flag| {
            arg == flag
                || arg
                    .strip_prefix(flag)
                    .is_some_and(|rest| rest.starts_with('='))
        })
    })
}

/// Parse a config enum value; unknown values are recorded in `warnings` and skipped.
fn parse_choice<T: ValueEnum>(value: &str, key: &str, warnings: &mut Vec<String>) -> Option<T> {
    match T::from_str(value, true) {
        Ok(choice) => Some(choice),
        Err(_) => {
            warnings.push(format!(
                "Ignoring unknown {} '{}' in config file",
                key, value
            ));
            None
        }
    }
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            let cli_args = std::env::args().collect::<Vec<_>>();
            let warnings = self.merge_from_config(config.config, &cli_args);

            // Styled lines would corrupt the JSON-lines stream
            if !self.json_progress {
                for warning in &warnings {
                    warn_println(warning);
                }
            }

            if self.verbose && !self.json_progress {
                eprintln!("Loaded configuration from: {:?}", config_path);
                if let Some(name) = config.name {
                    eprintln!("  Preset: {}", name);
                }
            }
        }
        Ok(())
    }

    /// Apply config values for every option not given in `cli_args`.
    ///
    /// Returns a warning for each config value that was ignored.
    pub fn merge_from_config(
        &mut self,
        config: EffectsConfigJson,
        cli_args: &[String],
    ) -> Vec<String> {
        let given = |flags: &[&str]| flag_given(cli_args, flags);
        let mut warnings = Vec::new();

        // Inputs: either given on the CLI wins over both config inputs
        if !given(&["-f", "--file", "--merge"]) {
            if let Some(file) = config.file {
                self.file = Some(PathBuf::from(file));
            }
            if let Some(merge) = config.merge {
                self.merge = merge.into_iter().map(PathBuf::from).collect();
            }
        }

        if !given(&["-m", "--mode"]) {
            if let Some(mode) = config
                .mode
                .as_deref()
                .and_then(|m| parse_choice::<Mode>(m, "mode", &mut warnings))
            {
                self.mode = mode;
            }
        }

        if !given(&["--out-file"]) {
            if let Some(out_file) = config.out_file {
                self.out_file = out_file;
            }
        }

        if !given(&["-o", "--output-dir"]) {
            if let Some(output_dir) = config.output_dir {
                self.output_dir = PathBuf::from(output_dir);
            }
        }

        if !given(&["-b", "--block-size"]) {
            if let Some(block_size) = config.block_size {
                self.block_size = block_size;
            }
        }

        if !given(&["-s", "--scale"]) {
            if let Some(scale) = config.scale {
                self.scale = scale;
            }
        }

        // The range is taken as a pair
        if !given(&["--from", "--to"]) {
            if let (Some(from), Some(to)) = (config.from, config.to) {
                self.from = Some(from);
                self.to = Some(to);
            }
        }

        if !given(&["--palette", "--palette-hex"]) {
            if config.palette_hex.is_some() {
                self.palette_hex = config.palette_hex;
                self.palette = None;
            } else if config.palette.is_some() {
                self.palette = config.palette;
            }
        }

        if !given(&["--colorize"]) {
            if let Some(method) = config
                .colorize
                .as_deref()
                .and_then(|m| parse_choice::<ColorizeMethod>(m, "colorize method", &mut warnings))
            {
                self.colorize = method;
            }
        }

        if !given(&["--pixelate"]) {
            if let Some(method) = config
                .pixelate
                .as_deref()
                .and_then(|m| parse_choice::<PixelateMethod>(m, "pixelate method", &mut warnings))
            {
                self.pixelate = method;
            }
        }

        if !given(&["--hex-value"]) {
            if let Some(hex) = config.hex_value {
                self.hex_value = Some(hex);
            }
        }

        // Boolean flags - only apply if currently false (default)
        if !self.greyscale && !self.color {
            self.greyscale = config.greyscale.unwrap_or(false);
        }

        if !self.euclidean_color_edges {
            self.euclidean_color_edges = config.euclidean_color_edges.unwrap_or(false);
        }

        if !self.scaled_normalize {
            self.scaled_normalize = config.scaled_normalize.unwrap_or(false);
        }

        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }

        if !self.dry_run {
            self.dry_run = config.dry_run.unwrap_or(false);
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_parse_config_file() {
        let json = r##"{
            "name": "night run",
            "config": {
                "file": "in.png",
                "mode": "pixelate",
                "blockSize": 6,
                "paletteHex": "#000000,#FFFFFF",
                "dryRun": true
            }
        }"##;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(config.name.as_deref(), Some("night run"));
        assert_eq!(config.config.block_size, Some(6));
        assert_eq!(config.config.palette_hex.as_deref(), Some("#000000,#FFFFFF"));
        assert_eq!(config.config.dry_run, Some(true));
    }

    #[test]
    fn test_config_fills_unset_options() {
        let mut args = Args::default();
        let config = EffectsConfigJson {
            file: Some("photo.png".to_string()),
            mode: Some("mix-channels".to_string()),
            scale: Some(3),
            hex_value: Some("#FF00FF".to_string()),
            greyscale: Some(true),
            ..Default::default()
        };
        args.merge_from_config(config, &cli(&["png-effects"]));

        assert_eq!(args.file, Some(PathBuf::from("photo.png")));
        assert_eq!(args.mode, Mode::MixChannels);
        assert_eq!(args.scale, 3);
        assert_eq!(args.hex_value.as_deref(), Some("#FF00FF"));
        assert!(args.greyscale);
    }

    #[test]
    fn test_cli_flags_take_precedence() {
        let mut args = Args {
            scale: 2,
            block_size: 8,
            ..Default::default()
        };
        let config = EffectsConfigJson {
            scale: Some(5),
            block_size: Some(20),
            out_file: Some("from-config".to_string()),
            ..Default::default()
        };
        args.merge_from_config(
            config,
            &cli(&["png-effects", "--scale", "2", "--block-size=8"]),
        );

        assert_eq!(args.scale, 2);
        assert_eq!(args.block_size, 8);
        assert_eq!(args.out_file, "from-config");
    }

    #[test]
    fn test_color_flag_blocks_config_greyscale() {
        let mut args = Args {
            color: true,
            ..Default::default()
        };
        let config = EffectsConfigJson {
            greyscale: Some(true),
            ..Default::default()
        };
        args.merge_from_config(config, &cli(&["png-effects", "--color"]));
        assert!(!args.greyscale);
    }

    #[test]
    fn test_unknown_mode_is_ignored() {
        let mut args = Args::default();
        let config = EffectsConfigJson {
            mode: Some("sepia".to_string()),
            ..Default::default()
        };
        let warnings = args.merge_from_config(config, &cli(&["png-effects"]));
        assert_eq!(args.mode, Mode::Colorize);
        assert_eq!(warnings, vec!["Ignoring unknown mode 'sepia' in config file"]);
    }

    #[test]
    fn test_unknown_choices_are_returned_not_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        fs::write(
            &path,
            r#"{"name": null, "config": {"colorize": "dither", "pixelate": "median", "scaledNormalize": true}}"#,
        )
        .unwrap();

        let mut args = Args {
            config_file: Some(path),
            json_progress: true,
            ..Default::default()
        };
        args.load_and_merge_config().unwrap();
        assert_eq!(args.colorize, ColorizeMethod::Average);
        assert_eq!(args.pixelate, PixelateMethod::Sample);
        assert!(args.scaled_normalize);

        let config = EffectsConfigJson {
            colorize: Some("dither".to_string()),
            pixelate: Some("median".to_string()),
            ..Default::default()
        };
        let warnings = Args::default().merge_from_config(config, &cli(&["png-effects"]));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("colorize method 'dither'"));
        assert!(warnings[1].contains("pixelate method 'median'"));
    }

    #[test]
    fn test_flag_given_matches_exact_and_assignment_forms() {
        let args = cli(&["png-effects", "--to=9", "--fromage"]);
        assert!(flag_given(&args, &["--to"]));
        assert!(!flag_given(&args, &["--from"]));
    }
}
