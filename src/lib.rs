//! SMPS Processor Library
//!
//! A Rust library for reading Scanning Mobility Particle Sizer (SMPS) CSV
//! exports into time-indexed particle size distributions.
//!
//! This library provides tools for:
//! - Parsing instrument exports: preamble metadata, normal-scan filtering and
//!   narrowing of the size-resolved columns to the scanned range
//! - Loading every export in a directory into an ordered [`Dataset`]
//! - Resolving date and time-range selections across records with differing
//!   time zones
//! - Rendering concentration heatmaps and per-scan size distributions as PNG
//! - Saving datasets and exporting them to Parquet
//!
//! ```no_run
//! use smps_processor::{Dataset, ReadOptions, TimeSelector, resolve};
//! use std::path::Path;
//!
//! # fn main() -> smps_processor::Result<()> {
//! let mut dataset = Dataset::read_from_dir(Path::new("data"), &ReadOptions::default())?;
//! dataset.sort_by_time();
//! let selector: TimeSelector = "2024-01-02".parse()?;
//! let resolution = resolve(&dataset, &selector, None)?;
//! println!("{}", resolution.subtitle(&dataset));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod export;
pub mod header;
pub mod loader;
pub mod mobility;
pub mod models;
pub mod parser;
pub mod persistence;
pub mod render;
pub mod time_range;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{HeatmapConfig, SmpsConfig};
pub use dataset::{Dataset, Overlap, RecordSpan};
pub use error::{Result, SmpsError};
pub use loader::{DirectoryLoader, list_records};
pub use models::{HeaderMetadata, MetadataValue, Record, RecordMetadata, SampleTable};
pub use parser::{ReadOptions, RecordParser, read_record};
pub use time_range::{Resolution, TimeSelector, resolve};
