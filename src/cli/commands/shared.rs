//! Shared components for CLI commands
//!
//! Logging setup, dataset loading from a directory or a saved file, and the
//! report helpers used by more than one command.

use crate::cli::args::{Args, InputArgs};
use crate::config::SmpsConfig;
use crate::constants::DATASET_FILE_EXTENSION;
use crate::dataset::{Dataset, Overlap};
use crate::loader::DirectoryLoader;
use crate::parser::ReadOptions;
use crate::persistence::load_dataset;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Set up structured logging for all commands
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("smps_processor={}", log_level)));

    if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Parser options from the global flags and the input arguments
pub fn read_options(args: &Args, input: &InputArgs) -> ReadOptions {
    let options = ReadOptions::default().with_metadata(!args.no_metadata);
    match &input.time_zone {
        Some(time_zone) => options.with_time_zone(time_zone.clone()),
        None => options,
    }
}

/// Whether the input names a dataset saved by the `save` command
pub fn is_saved_dataset(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DATASET_FILE_EXTENSION))
}

/// Processing configuration for the input arguments
pub fn input_config(args: &Args, input: &InputArgs) -> SmpsConfig {
    let config = SmpsConfig::default().with_file_pattern(&input.pattern);
    if args.quiet {
        config
    } else {
        config.with_progress()
    }
}

/// Load the input as a sorted dataset, reporting any overlapping records
pub fn load_input(args: &Args, input: &InputArgs) -> Result<Dataset> {
    load_input_with(args, input, input_config(args, input))
}

/// Load the input with an explicit configuration, reporting any overlapping records
pub fn load_input_with(args: &Args, input: &InputArgs, config: SmpsConfig) -> Result<Dataset> {
    let (dataset, overlaps) = load_sorted_with(args, input, config)?;
    if !args.quiet {
        print_overlaps(&overlaps);
    }
    Ok(dataset)
}

/// Load the input as a sorted dataset together with its overlapping records
pub fn load_sorted(args: &Args, input: &InputArgs) -> Result<(Dataset, Vec<Overlap>)> {
    load_sorted_with(args, input, input_config(args, input))
}

fn load_sorted_with(
    args: &Args,
    input: &InputArgs,
    config: SmpsConfig,
) -> Result<(Dataset, Vec<Overlap>)> {
    let path = &input.input;

    let mut dataset = if is_saved_dataset(path) {
        if input.time_zone.is_some() {
            warn!("--time-zone is ignored for saved datasets; records keep their stored zone");
        }
        info!("Loading saved dataset from {}", path.display());
        load_dataset(path)
            .with_context(|| format!("Failed to load dataset from '{}'", path.display()))?
    } else {
        config.validate().context("Invalid loader configuration")?;

        let loader = DirectoryLoader::with_config(path, config);
        let records = loader
            .load(&read_options(args, input))
            .with_context(|| format!("Failed to load SMPS exports from '{}'", path.display()))?;
        Dataset::from(records)
    };

    let overlaps = dataset.sort_by_time();
    Ok((dataset, overlaps))
}

/// Print overlapping record pairs as warnings on stderr
pub fn print_overlaps(overlaps: &[Overlap]) {
    for overlap in overlaps {
        eprintln!(
            "{} {} (ends {}) overlaps {} (starts {})",
            "Warning:".yellow().bold(),
            overlap.earlier,
            overlap.earlier_end,
            overlap.later,
            overlap.later_start
        );
    }
}

/// Format a byte count in human-readable form
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
