//! Command-line argument definitions for the SMPS processor
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::constants::{HEATMAP_COLOR_MAX, HEATMAP_COLOR_MIN, SMPS_FILE_PATTERN};
use crate::error::Result;
use crate::time_range::TimeSelector;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the SMPS data processor
///
/// Reads Scanning Mobility Particle Sizer CSV exports into time-indexed
/// size distributions and renders them as heatmaps and scan plots.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "smps_processor",
    version,
    about = "Read SMPS particle sizer CSV exports, query them by time and render heatmaps",
    long_about = "Reads Scanning Mobility Particle Sizer (SMPS) CSV exports, keeps normal scans, \
                  indexes them by sample start time and narrows the size-resolved columns to the \
                  range actually scanned. Directories of exports are aggregated into a dataset \
                  that can be summarised, rendered as a time by diameter heatmap, saved for \
                  later, or exported to Parquet."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Skip the free-form metadata block at the top of each export
    #[arg(
        long = "no-metadata",
        global = true,
        help = "Do not read the metadata block of each export"
    )]
    pub no_metadata: bool,
}

impl Args {
    /// Get the appropriate log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands for the SMPS processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Print the time range and scan count of every record
    Summary(SummaryArgs),
    /// Render a time by diameter concentration heatmap
    Heatmap(HeatmapArgs),
    /// Plot every scan of each record as a size distribution
    Pnsd(PnsdArgs),
    /// Load a directory of exports and save it as one dataset file
    Save(SaveArgs),
    /// Export a dataset to a Parquet file
    Export(ExportArgs),
}

/// Where a dataset comes from and how its timestamps are interpreted
#[derive(Debug, Clone, clap::Args)]
pub struct InputArgs {
    /// Directory of SMPS exports, or a dataset saved with `save`
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// IANA time zone the sample start times are recorded in
    #[arg(
        long = "time-zone",
        value_name = "TZ",
        help = "Time zone of the sample start times (e.g. Asia/Tokyo)"
    )]
    pub time_zone: Option<String>,

    /// File name pattern matched inside the input directory
    #[arg(
        long = "pattern",
        value_name = "GLOB",
        default_value = SMPS_FILE_PATTERN,
        help = "File name pattern of exports inside the input directory"
    )]
    pub pattern: String,
}

/// Arguments for the summary command
#[derive(Debug, Clone, Parser)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format for the summary
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for the summary"
    )]
    pub format: OutputFormat,

    /// Show each record's metadata, or only the named keys
    #[arg(
        long = "metadata",
        value_name = "KEY",
        num_args = 0..,
        help = "Show record metadata; follow with keys to show only those entries"
    )]
    pub metadata: Option<Vec<String>>,

    /// Show each record's diameter columns
    #[arg(long = "columns", help = "Show the diameter columns of each record")]
    pub columns: bool,
}

/// Arguments for the heatmap command
#[derive(Debug, Clone, Parser)]
pub struct HeatmapArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Show a single calendar day
    #[arg(
        long = "date",
        value_name = "DATE",
        conflicts_with_all = ["from", "to"],
        help = "Single day to show (YYYY-MM-DD)"
    )]
    pub date: Option<String>,

    /// Start of the time range
    #[arg(
        long = "from",
        value_name = "TIME",
        requires = "to",
        help = "Range start (YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS])"
    )]
    pub from: Option<String>,

    /// End of the time range
    #[arg(
        long = "to",
        value_name = "TIME",
        requires = "from",
        help = "Range end (YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS])"
    )]
    pub to: Option<String>,

    /// Directory the image is written to
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "PATH",
        help = "Directory for the heatmap image (default: current directory)"
    )]
    pub output_dir: Option<PathBuf>,

    /// Zone the time axis is shown in
    #[arg(
        long = "output-time-zone",
        value_name = "TZ",
        help = "Time zone of the time axis; required when records carry different zones"
    )]
    pub output_time_zone: Option<String>,

    /// Lower end of the colour scale
    #[arg(
        long = "color-min",
        value_name = "CONC",
        default_value_t = HEATMAP_COLOR_MIN,
        help = "Concentration at the bottom of the colour scale"
    )]
    pub color_min: f64,

    /// Upper end of the colour scale
    #[arg(
        long = "color-max",
        value_name = "CONC",
        default_value_t = HEATMAP_COLOR_MAX,
        help = "Concentration at the top of the colour scale"
    )]
    pub color_max: f64,
}

impl HeatmapArgs {
    /// Build the time selector from the date or range arguments
    pub fn selector(&self) -> Result<TimeSelector> {
        match (&self.date, &self.from, &self.to) {
            (Some(date), _, _) => TimeSelector::from_parts(&[date]),
            (None, Some(from), Some(to)) => TimeSelector::from_parts(&[from, to]),
            _ => Ok(TimeSelector::All),
        }
    }
}

/// Arguments for the pnsd command
#[derive(Debug, Clone, Parser)]
pub struct PnsdArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory the images are written to
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "PATH",
        help = "Directory for the scan plots (default: current directory)"
    )]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the save command
#[derive(Debug, Clone, Parser)]
pub struct SaveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Dataset file to write
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Dataset file to write (JSON)"
    )]
    pub output: PathBuf,
}

/// Arguments for the export command
#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Parquet file to write
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help = "Parquet file to write"
    )]
    pub output: PathBuf,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colours
    Human,
    /// JSON output for scripting
    Json,
}
