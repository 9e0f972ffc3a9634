//! Export command: write a dataset to Parquet

use super::shared::{format_size, load_input};
use crate::cli::args::{Args, ExportArgs};
use crate::export::export_parquet;
use anyhow::{Context, Result};
use colored::Colorize;

/// Run the export command
pub fn run_export(args: &Args, export_args: &ExportArgs) -> Result<()> {
    let dataset = load_input(args, &export_args.input)?;

    let rows = export_parquet(&dataset, &export_args.output).with_context(|| {
        format!(
            "Failed to export Parquet to '{}'",
            export_args.output.display()
        )
    })?;

    if !args.quiet {
        if rows == 0 {
            println!("{}", "Dataset is empty; nothing exported".yellow());
        } else {
            let size = std::fs::metadata(&export_args.output)
                .map(|meta| meta.len())
                .unwrap_or(0);
            println!(
                "{} {} scans to {} ({})",
                "Exported".green(),
                rows,
                export_args.output.display(),
                format_size(size)
            );
        }
    }
    Ok(())
}
