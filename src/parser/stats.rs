//! Parse results, statistics and non-fatal diagnostics
//!
//! Data-quality problems never abort a parse. They are collected here so
//! callers can inspect them after the record has been built.

use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal condition found while parsing one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Sample start timestamps that no known format could parse
    UnparsedTimestamps {
        /// One-based line numbers in the source file
        lines: Vec<u64>,
    },

    /// Requested time zone is not in the IANA database
    UnknownTimeZone { name: String },

    /// Neither raw-data sentinel was found; diameters run to the last column
    UnrecognizedRawFormat,

    /// Raw data was requested but cannot be read yet
    RawDataUnavailable,

    /// No row passed the status filter, so no size range could be derived
    NoNormalScans,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnparsedTimestamps { lines } => write!(
                f,
                "{} entries failed to parse as sample start times (lines {:?})",
                lines.len(),
                lines
            ),
            Diagnostic::UnknownTimeZone { name } => {
                write!(f, "time zone '{}' not found, no time zone assigned", name)
            }
            Diagnostic::UnrecognizedRawFormat => {
                write!(f, "new raw data format detected, diameter columns extend to the last column")
            }
            Diagnostic::RawDataUnavailable => write!(f, "raw data reading is not available yet"),
            Diagnostic::NoNormalScans => write!(f, "no normal scans found"),
        }
    }
}

/// Parsed record with statistics
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed record
    pub record: Record,

    /// Row counts and diagnostics
    pub stats: ParseStats,
}

/// Row statistics and diagnostics for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data rows found below the column header
    pub total_rows: usize,

    /// Rows that passed the status filter
    pub rows_kept: usize,

    /// Rows dropped by the status filter
    pub rows_discarded: usize,

    /// Diameter labels between the column-group boundaries
    pub diameters_found: usize,

    /// Diameter labels inside the observed size range
    pub diameters_kept: usize,

    /// Non-fatal conditions, in the order found
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of rows kept by the status filter
    pub fn kept_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_kept as f64 / self.total_rows as f64) * 100.0
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Check whether a diagnostic of the same kind was recorded
    pub fn has(&self, kind: &Diagnostic) -> bool {
        self.diagnostics
            .iter()
            .any(|found| std::mem::discriminant(found) == std::mem::discriminant(kind))
    }
}
