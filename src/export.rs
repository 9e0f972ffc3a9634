//! Parquet export for datasets
//!
//! Each record becomes one wide frame: identifying columns followed by one
//! `Float64` column per diameter label. Records scanned over different size
//! ranges have different diameter columns, so the frames are concatenated
//! diagonally and missing diameters are filled with nulls.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::Record;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

pub const SOURCE_NAME_COLUMN: &str = "source_name";
pub const TIME_ZONE_COLUMN: &str = "time_zone";
pub const SCAN_START_COLUMN: &str = "scan_start";

/// Build the wide frame for one record
pub fn record_to_frame(record: &Record) -> Result<DataFrame> {
    let table = record.sample_table();
    let height = table.len();

    let zone_name = record.time_zone().map(|tz| tz.name().to_string());
    let scan_start: Vec<Option<i64>> = table
        .index()
        .iter()
        .map(|time| time.map(|t| t.and_utc().timestamp_millis()))
        .collect();

    let mut columns = vec![
        Column::new(
            SOURCE_NAME_COLUMN.into(),
            vec![record.source_name().to_string(); height],
        ),
        Column::new(TIME_ZONE_COLUMN.into(), vec![zone_name; height]),
        Column::new(SCAN_START_COLUMN.into(), scan_start)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
    ];

    for (position, bin) in table.bins().iter().enumerate() {
        let values: Vec<Option<f64>> = table
            .rows()
            .map(|row| row.get(position).copied().flatten())
            .collect();
        columns.push(Column::new(bin.label.as_str().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Write every record of a dataset to one Parquet file, returning the row count
pub fn export_parquet(dataset: &Dataset, path: &Path) -> Result<usize> {
    if dataset.is_empty() {
        warn!("Dataset is empty; nothing written to {}", path.display());
        return Ok(0);
    }

    let frames = dataset
        .iter()
        .map(|record| record_to_frame(record).map(IntoLazy::lazy))
        .collect::<Result<Vec<LazyFrame>>>()?;
    debug!("Concatenating {} record frames", frames.len());

    let mut combined = concat_lf_diagonal(frames, UnionArgs::default())?.collect()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut combined)?;

    let rows = combined.height();
    info!(
        "Wrote {} rows x {} columns to {}",
        rows,
        combined.width(),
        path.display()
    );
    Ok(rows)
}
