//! Column layout analysis for SMPS exports
//!
//! The data header names every column, but only the column-group line above
//! it says where the size-resolved blocks begin. Both lines are read with the
//! sample start column removed so their positions line up with the columns
//! that remain once the timestamp becomes the row index.

use super::field_parsers::parse_diameter_label;
use crate::constants::{columns, sentinels};
use crate::error::{Result, SmpsError};
use crate::models::DiameterBin;
use csv::StringRecord;
use std::path::Path;
use tracing::debug;

/// Rule for locating the end of the concentration-by-size block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBoundary {
    /// The raw concentration group starts where the concentrations end
    RawConcentrationGroup,
    /// The column before the raw time-series block is not a diameter
    RawDataTimeColumn,
    /// No raw-data marker: diameters run to the last column
    LastColumn,
}

impl EndBoundary {
    /// Strategies in the order they are tried; the last always applies
    pub const ORDER: [EndBoundary; 3] = [
        EndBoundary::RawConcentrationGroup,
        EndBoundary::RawDataTimeColumn,
        EndBoundary::LastColumn,
    ];

    /// Exclusive end position, or `None` when the rule does not apply
    fn locate(self, group_labels: &[String], data_columns: &[String]) -> Option<usize> {
        match self {
            EndBoundary::RawConcentrationGroup => group_labels
                .iter()
                .position(|label| label == sentinels::RAW_CONCENTRATION_START),
            EndBoundary::RawDataTimeColumn => data_columns
                .iter()
                .position(|name| name == columns::RAW_DATA_TIME)
                .map(|position| position.saturating_sub(1)),
            EndBoundary::LastColumn => Some(data_columns.len()),
        }
    }

    /// Whether taking this boundary is worth a diagnostic
    pub fn is_fallback(self) -> bool {
        self == EndBoundary::LastColumn
    }
}

/// Positions of every column the parser reads, in full-row coordinates
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    /// Column names with the sample start column removed
    pub data_columns: Vec<String>,

    /// Position of the sample start column in a raw row
    pub sample_start: usize,

    pub detector_status: usize,
    pub classifier_errors: usize,
    pub lower_size: usize,
    pub upper_size: usize,

    /// Every diameter between the group boundaries, in column order
    pub diameters: Vec<DiameterBin>,

    /// Raw-row positions of `diameters`
    pub diameter_positions: Vec<usize>,

    /// Raw-row positions and names of the per-scan auxiliary columns
    pub scan_columns: Vec<(usize, String)>,

    /// Which rule ended the diameter block
    pub end_boundary: EndBoundary,
}

impl ColumnLayout {
    /// Analyze the data header against the column-group labels
    pub fn analyze(headers: &StringRecord, group_labels: &[String], file_path: &Path) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|name| name.trim().to_string()).collect();
        let find = |column: &str| {
            names
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| SmpsError::missing_column(file_path, column))
        };

        let sample_start = find(columns::SAMPLE_START)?;
        let detector_status = find(columns::DETECTOR_STATUS)?;
        let classifier_errors = find(columns::CLASSIFIER_ERRORS)?;
        let lower_size = find(columns::LOWER_SIZE)?;
        let upper_size = find(columns::UPPER_SIZE)?;

        let data_columns = without_position(&names, sample_start);
        let group_labels = without_position(group_labels, sample_start);

        let start = group_labels
            .iter()
            .position(|label| label == sentinels::CONCENTRATION_START)
            .ok_or_else(|| {
                SmpsError::invalid_format(
                    file_path,
                    format!("column-group line has no '{}' label", sentinels::CONCENTRATION_START),
                )
            })?;
        if start >= data_columns.len() {
            return Err(SmpsError::ColumnCountMismatch {
                path: file_path.to_path_buf(),
                position: start,
                found: data_columns.len(),
            });
        }

        let (end_boundary, end) = EndBoundary::ORDER
            .iter()
            .find_map(|rule| rule.locate(&group_labels, &data_columns).map(|end| (*rule, end)))
            .unwrap_or((EndBoundary::LastColumn, data_columns.len()));
        if end > data_columns.len() {
            return Err(SmpsError::ColumnCountMismatch {
                path: file_path.to_path_buf(),
                position: end,
                found: data_columns.len(),
            });
        }
        if end < start {
            return Err(SmpsError::invalid_format(
                file_path,
                format!("diameter block ends (column {}) before it starts (column {})", end, start),
            ));
        }

        let mut diameters = Vec::with_capacity(end - start);
        for label in &data_columns[start..end] {
            let diameter_nm = parse_diameter_label(label).ok_or_else(|| {
                SmpsError::invalid_format(
                    file_path,
                    format!("column '{}' inside the diameter block is not a diameter", label),
                )
            })?;
            diameters.push(DiameterBin::new(label.clone(), diameter_nm));
        }

        // Map reduced positions back onto raw rows, which still hold the timestamp
        let raw_position = |reduced: usize| if reduced >= sample_start { reduced + 1 } else { reduced };
        let diameter_positions = (start..end).map(raw_position).collect();
        let scan_columns = (0..start)
            .map(|reduced| (raw_position(reduced), data_columns[reduced].clone()))
            .collect();

        debug!(
            "Column layout: {} columns, diameters at {}..{} ({:?})",
            names.len(),
            start,
            end,
            end_boundary
        );

        Ok(Self {
            data_columns,
            sample_start,
            detector_status,
            classifier_errors,
            lower_size,
            upper_size,
            diameters,
            diameter_positions,
            scan_columns,
            end_boundary,
        })
    }

    /// Mean log10 spacing of all diameters in the block, before narrowing
    pub fn log_bin_width(&self) -> Option<f64> {
        if self.diameters.len() < 2 {
            return None;
        }
        let logs: Vec<f64> = self.diameters.iter().map(|bin| bin.diameter_nm.log10()).collect();
        let steps: Vec<f64> = logs.windows(2).map(|pair| pair[1] - pair[0]).collect();
        Some(steps.iter().sum::<f64>() / steps.len() as f64)
    }
}

fn without_position(values: &[String], position: usize) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != position)
        .map(|(_, value)| value.clone())
        .collect()
}
