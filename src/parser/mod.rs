//! SMPS export parser
//!
//! Turns one instrument CSV export into a [`Record`](crate::models::Record).
//!
//! ## Architecture
//!
//! - [`record_parser`] - File reading, status filtering and record assembly
//! - [`column_layout`] - Column-group analysis and diameter block boundaries
//! - [`field_parsers`] - Sample start times, numeric cells and diameter labels
//! - [`stats`] - Parse statistics and non-fatal diagnostics
//!
//! The export layout is fixed: free-form `key,value` metadata in the first
//! 45 lines, column-group labels on line 52 and column names on line 53
//! (one-based), scan rows after that.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use smps_processor::parser::{ReadOptions, read_record};
//!
//! # fn example() -> smps_processor::Result<()> {
//! let options = ReadOptions::default().with_time_zone("Asia/Tokyo");
//! let record = read_record(std::path::Path::new("20240101_SMPS.csv"), &options)?;
//! println!("{} scans from {}", record.len(), record.source_name());
//! # Ok(())
//! # }
//! ```

pub mod column_layout;
pub mod field_parsers;
pub mod record_parser;
pub mod stats;

#[cfg(test)]
mod tests;

pub use column_layout::{ColumnLayout, EndBoundary};
pub use record_parser::RecordParser;
pub use stats::{Diagnostic, ParseResult, ParseStats};

use crate::error::Result;
use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to read from each export, and how to interpret its timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Merge the free-form header block into the record metadata
    pub read_metadata: bool,

    /// Read the raw time-series block (not available yet)
    pub read_rawdata: bool,

    /// IANA zone the sample start times are expressed in
    pub time_zone: Option<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            read_metadata: true,
            read_rawdata: false,
            time_zone: None,
        }
    }
}

impl ReadOptions {
    pub fn with_metadata(mut self, read_metadata: bool) -> Self {
        self.read_metadata = read_metadata;
        self
    }

    pub fn with_rawdata(mut self, read_rawdata: bool) -> Self {
        self.read_rawdata = read_rawdata;
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }
}

/// Parse one export with the default layout
pub fn read_record(path: &Path, options: &ReadOptions) -> Result<Record> {
    RecordParser::default()
        .parse_file(path, options)
        .map(|result| result.record)
}
