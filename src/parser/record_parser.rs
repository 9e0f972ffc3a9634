//! Core SMPS export parser
//!
//! Reads one instrument export into a [`Record`]: splits the preamble from
//! the scan table, keeps only normal scans, indexes them by sample start
//! time and narrows the size-resolved columns to the range actually scanned.

use super::column_layout::ColumnLayout;
use super::field_parsers::{parse_cell, parse_sample_start};
use super::stats::{Diagnostic, ParseResult, ParseStats};
use super::ReadOptions;
use crate::config::SmpsConfig;
use crate::error::Result;
use crate::header::{Preamble, parse_group_labels, parse_metadata_block};
use crate::models::{DiameterBin, HeaderMetadata, Record, SampleTable, ScanMetadataTable};
use crate::time_range::zone::resolve_zone_name;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info, warn};

/// Kept scan rows before column narrowing
struct ScanRows {
    index: Vec<Option<NaiveDateTime>>,
    records: Vec<StringRecord>,
    unparsed_lines: Vec<u64>,
    lower_size: Option<f64>,
    upper_size: Option<f64>,
}

/// Parser for SMPS instrument exports
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    config: SmpsConfig,
}

impl RecordParser {
    /// Create a parser with a custom layout configuration
    pub fn new(config: SmpsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmpsConfig {
        &self.config
    }

    /// Parse an export file into a record with statistics
    pub fn parse_file(&self, file_path: &Path, options: &ReadOptions) -> Result<ParseResult> {
        info!("Parsing SMPS export: {}", file_path.display());

        let bytes = std::fs::read(file_path)?;
        let content = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = content.lines().collect();

        let preamble = Preamble::locate(
            &lines,
            self.config.metadata_lines,
            self.config.group_label_line,
            self.config.data_header_line,
            file_path,
        )?;

        let mut stats = ParseStats::new();
        let data_section = lines[self.config.data_header_line..].join("\n");
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data_section.as_bytes());

        let headers = csv_reader.headers()?.clone();
        let group_labels = parse_group_labels(preamble.group_label_line)?;
        let layout = ColumnLayout::analyze(&headers, &group_labels, file_path)?;
        if layout.end_boundary.is_fallback() {
            warn!(
                "New raw data format detected in {}; diameter columns extend to the last column",
                file_path.display()
            );
            stats.diagnostics.push(Diagnostic::UnrecognizedRawFormat);
        }

        let rows = self.read_scan_rows(&mut csv_reader, &layout, &mut stats)?;
        if !rows.unparsed_lines.is_empty() {
            warn!(
                "{} entries in {} failed to parse as sample start times (lines {:?})",
                rows.unparsed_lines.len(),
                file_path.display(),
                rows.unparsed_lines
            );
            stats.diagnostics.push(Diagnostic::UnparsedTimestamps {
                lines: rows.unparsed_lines.clone(),
            });
        }

        let time_zone = self.resolve_time_zone(options, &mut stats);

        let size_bounds = rows.lower_size.zip(rows.upper_size);
        if size_bounds.is_none() {
            debug!("No size bounds in {}; no diameter column is kept", file_path.display());
            if rows.records.is_empty() {
                stats.diagnostics.push(Diagnostic::NoNormalScans);
            }
        }

        let (bins, positions) = narrow_diameters(&layout, size_bounds);
        stats.diameters_found = layout.diameters.len();
        stats.diameters_kept = bins.len();

        let sample_rows = rows
            .records
            .iter()
            .map(|record| {
                positions
                    .iter()
                    .map(|&position| record.get(position).and_then(parse_cell))
                    .collect()
            })
            .collect();
        let sample_table = SampleTable::new(rows.index.clone(), bins, sample_rows)?;

        let scan_names = layout.scan_columns.iter().map(|(_, name)| name.clone()).collect();
        let scan_rows = rows
            .records
            .iter()
            .map(|record| {
                layout
                    .scan_columns
                    .iter()
                    .map(|(position, _)| record.get(*position).unwrap_or_default().trim().to_string())
                    .collect()
            })
            .collect();
        let scan_metadata = ScanMetadataTable::new(rows.index, scan_names, scan_rows)?;

        let header = if options.read_metadata {
            parse_metadata_block(preamble.metadata_lines)?
        } else {
            HeaderMetadata::new()
        };

        if options.read_rawdata {
            warn!("Raw data reading is not available yet; no raw data read from {}", file_path.display());
            stats.diagnostics.push(Diagnostic::RawDataUnavailable);
        }

        let source_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());

        let record = Record::from_parts(
            source_name,
            time_zone,
            sample_table,
            scan_metadata,
            layout.log_bin_width(),
            size_bounds,
            header,
        )?;

        info!(
            "Parsed {} scans ({} discarded) with {} of {} diameters from {}",
            stats.rows_kept,
            stats.rows_discarded,
            stats.diameters_kept,
            stats.diameters_found,
            record.source_name()
        );

        Ok(ParseResult { record, stats })
    }

    /// Read data rows, keeping those both status columns mark as normal
    fn read_scan_rows(
        &self,
        csv_reader: &mut csv::Reader<&[u8]>,
        layout: &ColumnLayout,
        stats: &mut ParseStats,
    ) -> Result<ScanRows> {
        let mut rows = ScanRows {
            index: Vec::new(),
            records: Vec::new(),
            unparsed_lines: Vec::new(),
            lower_size: None,
            upper_size: None,
        };
        let normal = self.config.normal_scan_status.as_str();
        let field = |record: &StringRecord, position: usize| {
            record.get(position).map(str::trim).unwrap_or_default().to_string()
        };

        for result in csv_reader.records() {
            let record = result?;
            if record.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            stats.total_rows += 1;

            if field(&record, layout.detector_status) != normal
                || field(&record, layout.classifier_errors) != normal
            {
                stats.rows_discarded += 1;
                continue;
            }
            stats.rows_kept += 1;

            let sample_start = parse_sample_start(&field(&record, layout.sample_start));
            if sample_start.is_none() {
                let line = record
                    .position()
                    .map(|position| position.line() + self.config.data_header_line as u64)
                    .unwrap_or_default();
                rows.unparsed_lines.push(line);
            }

            if let Some(lower) = record.get(layout.lower_size).and_then(parse_cell) {
                rows.lower_size = Some(rows.lower_size.map_or(lower, |min| min.min(lower)));
            }
            if let Some(upper) = record.get(layout.upper_size).and_then(parse_cell) {
                rows.upper_size = Some(rows.upper_size.map_or(upper, |max| max.max(upper)));
            }

            rows.index.push(sample_start);
            rows.records.push(record);
        }

        Ok(rows)
    }

    fn resolve_time_zone(&self, options: &ReadOptions, stats: &mut ParseStats) -> Option<Tz> {
        let name = options.time_zone.as_deref()?;
        let zone = resolve_zone_name(name);
        if zone.is_none() {
            stats.diagnostics.push(Diagnostic::UnknownTimeZone {
                name: name.to_string(),
            });
        }
        zone
    }
}

/// Diameters inside the observed size bounds, with their raw-row positions
fn narrow_diameters(
    layout: &ColumnLayout,
    size_bounds: Option<(f64, f64)>,
) -> (Vec<DiameterBin>, Vec<usize>) {
    let Some((lower, upper)) = size_bounds else {
        return (Vec::new(), Vec::new());
    };

    layout
        .diameters
        .iter()
        .zip(&layout.diameter_positions)
        .filter(|(bin, _)| lower <= bin.diameter_nm && bin.diameter_nm <= upper)
        .map(|(bin, position)| (bin.clone(), *position))
        .unzip()
}
