//! Error handling for SMPS processing operations.
//!
//! Structural problems with an export file, configuration mistakes and
//! inconsistent time-zone state are fatal and surface here. Data-quality
//! issues (bad timestamps, unknown zones, unknown raw-data layouts) are not
//! errors; the parser records them as [`crate::parser::Diagnostic`]s.

use plotters::drawing::DrawingAreaErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plotting error: {message}")]
    Plot { message: String },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Invalid SMPS export format in file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Required column '{column}' not found in file: {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error(
        "Column count mismatch in file {path}: column-group line maps position {position}, data has {found} columns"
    )]
    ColumnCountMismatch {
        path: PathBuf,
        position: usize,
        found: usize,
    },

    #[error("Table shape error: {reason}")]
    TableShape { reason: String },

    #[error("Invalid time range selector: {reason}")]
    InvalidSelector { reason: String },

    #[error("Start time {start} must be earlier than end time {end}")]
    InvalidTimeRange { start: String, end: String },

    #[error("Time zone conflict: {reason}")]
    TimeZoneConflict { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Mobility calculation failed: {reason}")]
    Mobility { reason: String },
}

impl SmpsError {
    /// Create an invalid format error for a file
    pub fn invalid_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing column error for a file
    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }

    /// Create a time zone conflict error
    pub fn zone_conflict(reason: impl Into<String>) -> Self {
        Self::TimeZoneConflict {
            reason: reason.into(),
        }
    }

    /// Create an invalid selector error
    pub fn invalid_selector(reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            reason: reason.into(),
        }
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for SmpsError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::Plot {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmpsError>;
