//! Core data structures for SMPS processing.
//!
//! A [`Record`] is the parsed form of one instrument export: a concentration
//! table indexed by scan start time, a row-aligned table of per-scan
//! auxiliary fields, and typed file-level metadata with a free-form side
//! mapping for the header block.

use crate::constants::metadata_keys;
use crate::error::{Result, SmpsError};
use crate::time_range::zone::sort_key;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value from the free-form header block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    Missing,
}

impl MetadataValue {
    /// Interpret a raw header field: empty is missing, a finite number is a
    /// number, anything else (including `NaN` and `inf`) stays text
    pub fn from_field(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            _ if trimmed.is_empty() => MetadataValue::Missing,
            Ok(number) if number.is_finite() => MetadataValue::Number(number),
            _ => MetadataValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MetadataValue::Missing)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(text) => write!(f, "{}", text),
            MetadataValue::Number(number) => write!(f, "{}", number),
            MetadataValue::Missing => write!(f, ""),
        }
    }
}

/// Insertion-ordered key/value pairs from the header block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderMetadata {
    entries: Vec<(String, MetadataValue)>,
}

impl HeaderMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-level metadata with typed access to the derived fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Earliest parsed scan start (wall clock in the record's zone)
    pub start_time: Option<NaiveDateTime>,

    /// Latest parsed scan start (wall clock in the record's zone)
    pub end_time: Option<NaiveDateTime>,

    /// Number of kept scans
    pub sample_count: usize,

    /// Smallest per-scan lower size bound (nm)
    pub lower_size_nm: Option<f64>,

    /// Largest per-scan upper size bound (nm)
    pub upper_size_nm: Option<f64>,

    /// Free-form pairs from the header block
    pub header: HeaderMetadata,
}

impl RecordMetadata {
    /// All metadata as display pairs, derived entries first
    pub fn display_entries(&self) -> Vec<(String, String)> {
        let fmt_time = |time: Option<NaiveDateTime>| {
            time.map(|t| t.to_string()).unwrap_or_default()
        };
        let fmt_size = |size: Option<f64>| size.map(|s| s.to_string()).unwrap_or_default();

        let mut entries = vec![
            (metadata_keys::START_TIME.to_string(), fmt_time(self.start_time)),
            (metadata_keys::END_TIME.to_string(), fmt_time(self.end_time)),
            (
                metadata_keys::SAMPLE_COUNT.to_string(),
                self.sample_count.to_string(),
            ),
            (metadata_keys::LOWER_SIZE.to_string(), fmt_size(self.lower_size_nm)),
            (metadata_keys::UPPER_SIZE.to_string(), fmt_size(self.upper_size_nm)),
        ];
        entries.extend(
            self.header
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        entries
    }

    /// Display value of one derived or header entry
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.display_entries()
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Name the operator gave the measurement campaign, if recorded
    pub fn dataset_name(&self) -> Option<String> {
        self.header
            .get(metadata_keys::DATASET_NAME)
            .filter(|value| !value.is_missing())
            .map(MetadataValue::to_string)
    }
}

/// One particle-size column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiameterBin {
    /// Column label as written in the export
    pub label: String,

    /// Midpoint diameter (nm)
    pub diameter_nm: f64,
}

impl DiameterBin {
    pub fn new(label: impl Into<String>, diameter_nm: f64) -> Self {
        Self {
            label: label.into(),
            diameter_nm,
        }
    }
}

/// Concentration by diameter, one row per scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleTable {
    index: Vec<Option<NaiveDateTime>>,
    bins: Vec<DiameterBin>,
    rows: Vec<Vec<Option<f64>>>,
}

impl SampleTable {
    /// Build a table; every row must have one cell per bin
    pub fn new(
        index: Vec<Option<NaiveDateTime>>,
        bins: Vec<DiameterBin>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if index.len() != rows.len() {
            return Err(SmpsError::TableShape {
                reason: format!("{} index values for {} rows", index.len(), rows.len()),
            });
        }
        if let Some((position, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != bins.len())
        {
            return Err(SmpsError::TableShape {
                reason: format!(
                    "row {} has {} cells, expected {}",
                    position,
                    row.len(),
                    bins.len()
                ),
            });
        }
        Ok(Self { index, bins, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self) -> &[Option<NaiveDateTime>] {
        &self.index
    }

    pub fn bins(&self) -> &[DiameterBin] {
        &self.bins
    }

    pub fn diameters(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.diameter_nm).collect()
    }

    pub fn row(&self, position: usize) -> Option<&[Option<f64>]> {
        self.rows.get(position).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<f64>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|cells| cells.get(column).copied().flatten())
    }

    /// Earliest and latest parsed index values
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut times = self.index.iter().flatten();
        let first = *times.next()?;
        Some(times.fold((first, first), |(min, max), &t| (min.min(t), max.max(t))))
    }
}

/// Per-scan auxiliary fields preceding the concentration columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadataTable {
    index: Vec<Option<NaiveDateTime>>,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ScanMetadataTable {
    pub fn new(
        index: Vec<Option<NaiveDateTime>>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        if index.len() != rows.len() {
            return Err(SmpsError::TableShape {
                reason: format!("{} index values for {} metadata rows", index.len(), rows.len()),
            });
        }
        if rows.iter().any(|row| row.len() != columns.len()) {
            return Err(SmpsError::TableShape {
                reason: format!("metadata rows must have {} fields", columns.len()),
            });
        }
        Ok(Self {
            index,
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self) -> &[Option<NaiveDateTime>] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let position = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row).map(|fields| fields[position].as_str())
    }

    pub fn numeric(&self, row: usize, column: &str) -> Option<f64> {
        self.value(row, column)
            .and_then(|field| field.trim().parse::<f64>().ok())
    }
}

/// One parsed instrument export file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    metadata: RecordMetadata,
    sample_table: SampleTable,
    scan_metadata: ScanMetadataTable,
    log_bin_width: Option<f64>,
    time_zone: Option<Tz>,
    source_name: String,
}

impl Record {
    /// Assemble a record, deriving start/end time and sample count.
    ///
    /// `size_bounds` are the observed lower/upper diameters; `header` is the
    /// free-form metadata block.
    pub fn from_parts(
        source_name: impl Into<String>,
        time_zone: Option<Tz>,
        sample_table: SampleTable,
        scan_metadata: ScanMetadataTable,
        log_bin_width: Option<f64>,
        size_bounds: Option<(f64, f64)>,
        header: HeaderMetadata,
    ) -> Result<Self> {
        if sample_table.index() != scan_metadata.index() {
            return Err(SmpsError::TableShape {
                reason: "sample table and scan metadata must share one index".to_string(),
            });
        }

        let bounds = sample_table.time_bounds();
        let metadata = RecordMetadata {
            start_time: bounds.map(|(start, _)| start),
            end_time: bounds.map(|(_, end)| end),
            sample_count: sample_table.len(),
            lower_size_nm: size_bounds.map(|(lower, _)| lower),
            upper_size_nm: size_bounds.map(|(_, upper)| upper),
            header,
        };

        Ok(Self {
            metadata,
            sample_table,
            scan_metadata,
            log_bin_width,
            time_zone,
            source_name: source_name.into(),
        })
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    pub fn sample_table(&self) -> &SampleTable {
        &self.sample_table
    }

    pub fn scan_metadata(&self) -> &ScanMetadataTable {
        &self.scan_metadata
    }

    /// Mean log10 spacing of the instrument's diameter bins (dlogDp)
    pub fn log_bin_width(&self) -> Option<f64> {
        self.log_bin_width
    }

    pub fn time_zone(&self) -> Option<Tz> {
        self.time_zone
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn len(&self) -> usize {
        self.metadata.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.sample_count == 0
    }

    /// Start time as an instant comparable across records
    pub fn start_key(&self) -> Option<NaiveDateTime> {
        self.metadata
            .start_time
            .and_then(|start| sort_key(start, self.time_zone))
    }

    /// End time as an instant comparable across records
    pub fn end_key(&self) -> Option<NaiveDateTime> {
        self.metadata
            .end_time
            .and_then(|end| sort_key(end, self.time_zone))
    }

    /// Format an index value for reports, with the zone when one is attached
    pub fn format_time(&self, time: Option<NaiveDateTime>) -> String {
        match (time, self.time_zone) {
            (Some(time), Some(tz)) => format!("{} {}", time, tz.name()),
            (Some(time), None) => time.to_string(),
            (None, _) => "NaT".to_string(),
        }
    }
}
