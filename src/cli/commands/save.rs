//! Save command: persist a loaded directory as one dataset file

use super::shared::{format_size, load_input};
use crate::cli::args::{Args, SaveArgs};
use crate::persistence::save_dataset;
use anyhow::{Context, Result};
use colored::Colorize;

/// Run the save command
pub fn run_save(args: &Args, save_args: &SaveArgs) -> Result<()> {
    let dataset = load_input(args, &save_args.input)?;

    save_dataset(&dataset, &save_args.output)
        .with_context(|| format!("Failed to save dataset to '{}'", save_args.output.display()))?;

    if !args.quiet {
        let size = std::fs::metadata(&save_args.output)
            .map(|meta| meta.len())
            .unwrap_or(0);
        println!(
            "{} {} records to {} ({})",
            "Saved".green(),
            dataset.len(),
            save_args.output.display(),
            format_size(size)
        );
    }
    Ok(())
}
