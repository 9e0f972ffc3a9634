//! SMPS export preamble parsing.
//!
//! The instrument writes a fixed-size preamble before the scan table: a
//! block of `key,value` metadata lines at the top, and a column-group line
//! directly above the data header whose labels mark where each block of
//! size-resolved columns begins.

use crate::error::{Result, SmpsError};
use crate::models::{HeaderMetadata, MetadataValue};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::debug;

/// Split a single preamble line into fields, honouring CSV quoting
fn split_fields(line: &str) -> Result<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

/// Extract the free-form metadata block from the first lines of an export
pub fn parse_metadata_block(lines: &[&str]) -> Result<HeaderMetadata> {
    let mut builder = HeaderMetadataBuilder::new();
    for line in lines {
        builder.parse_line(line)?;
    }
    let header = builder.build();
    debug!("Parsed {} metadata entries", header.len());
    Ok(header)
}

/// Read the column-group labels, trimmed, one per data column position
pub fn parse_group_labels(line: &str) -> Result<Vec<String>> {
    Ok(split_fields(line)?
        .iter()
        .map(|label| label.trim().to_string())
        .collect())
}

/// Preamble lines of one export, borrowed from the file content
#[derive(Debug)]
pub struct Preamble<'a> {
    pub metadata_lines: &'a [&'a str],
    pub group_label_line: &'a str,
}

impl<'a> Preamble<'a> {
    /// Locate the preamble lines, failing if the file is too short to hold them
    pub fn locate(
        lines: &'a [&'a str],
        metadata_lines: usize,
        group_label_line: usize,
        data_header_line: usize,
        file_path: &Path,
    ) -> Result<Self> {
        if lines.len() <= data_header_line {
            return Err(SmpsError::invalid_format(
                file_path,
                format!(
                    "expected a {}-line preamble followed by a column header, found {} lines",
                    data_header_line,
                    lines.len()
                ),
            ));
        }

        Ok(Self {
            metadata_lines: &lines[..metadata_lines.min(lines.len())],
            group_label_line: lines[group_label_line],
        })
    }
}

/// Builder accumulating `key,value` pairs in file order
struct HeaderMetadataBuilder {
    header: HeaderMetadata,
}

impl HeaderMetadataBuilder {
    fn new() -> Self {
        Self {
            header: HeaderMetadata::new(),
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        let fields = split_fields(line)?;
        let key = fields.get(0).map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Ok(());
        }

        // A key with no value column is kept as missing
        let value = fields
            .get(1)
            .map(MetadataValue::from_field)
            .unwrap_or(MetadataValue::Missing);
        self.header.insert(key, value);
        Ok(())
    }

    fn build(self) -> HeaderMetadata {
        self.header
    }
}
