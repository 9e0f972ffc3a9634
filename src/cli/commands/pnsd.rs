//! Pnsd command: one size-distribution plot per record

use super::shared::load_input;
use crate::cli::args::{Args, PnsdArgs};
use crate::render::render_pnsd;
use anyhow::{Context, Result};
use colored::Colorize;

/// Run the pnsd command
pub fn run_pnsd(args: &Args, pnsd_args: &PnsdArgs) -> Result<()> {
    let dataset = load_input(args, &pnsd_args.input)?;

    for record in &dataset {
        let path = render_pnsd(record, pnsd_args.output_dir.as_deref())
            .with_context(|| format!("Failed to plot {}", record.source_name()))?;
        if !args.quiet {
            println!("{} {}", "Saved".green(), path.display());
        }
    }
    Ok(())
}
