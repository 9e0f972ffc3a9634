//! Command implementations for the SMPS processor CLI
//!
//! Each command is implemented in its own module and loads its input through
//! [`shared::load_input`], so directories and saved datasets are accepted
//! everywhere.

pub mod export;
pub mod heatmap;
pub mod pnsd;
pub mod save;
pub mod shared;
pub mod summary;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Main command runner for the SMPS processor
///
/// Installs logging, then dispatches to the subcommand handler.
pub fn run(args: Args) -> Result<()> {
    shared::setup_logging(&args);

    match &args.command {
        Some(Commands::Summary(summary_args)) => summary::run_summary(&args, summary_args),
        Some(Commands::Heatmap(heatmap_args)) => heatmap::run_heatmap(&args, heatmap_args),
        Some(Commands::Pnsd(pnsd_args)) => pnsd::run_pnsd(&args, pnsd_args),
        Some(Commands::Save(save_args)) => save::run_save(&args, save_args),
        Some(Commands::Export(export_args)) => export::run_export(&args, export_args),
        None => Ok(()),
    }
}
