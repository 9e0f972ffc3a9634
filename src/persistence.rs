//! Save and load whole datasets.
//!
//! A dataset is written as one JSON document. Loading it back yields a
//! value-equal dataset, including time zones, diameters and header metadata.

use crate::dataset::Dataset;
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write a dataset to `path`, replacing any existing file
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;

    info!(
        "Saved {} records ({} scans) to {}",
        dataset.len(),
        dataset.sample_count(),
        path.display()
    );
    Ok(())
}

/// Read a dataset previously written by [`save_dataset`]
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let reader = BufReader::new(File::open(path)?);
    let dataset: Dataset = serde_json::from_reader(reader)?;
    info!("Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmpsError;
    use crate::models::{
        DiameterBin, HeaderMetadata, MetadataValue, Record, SampleTable, ScanMetadataTable,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_dataset() -> Dataset {
        let index = vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            None,
        ];
        let table = SampleTable::new(
            index.clone(),
            vec![DiameterBin::new("14.1", 14.1), DiameterBin::new("20.0", 20.0)],
            vec![vec![Some(1.5), None], vec![None, Some(2.25)]],
        )
        .unwrap();
        let scans = ScanMetadataTable::new(
            index,
            vec!["Scan Number".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        )
        .unwrap();
        let mut header = HeaderMetadata::new();
        header.insert("Dataset Name", MetadataValue::Text("campaign".to_string()));
        header.insert("Comment", MetadataValue::Missing);

        let record = Record::from_parts(
            "a_SMPS.csv",
            Some(chrono_tz::Asia::Tokyo),
            table,
            scans,
            Some(0.0152),
            Some((12.0, 30.0)),
            header,
        )
        .unwrap();
        Dataset::from(vec![record])
    }

    #[test]
    fn test_round_trip_preserves_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("saved").join("dataset.json");
        let dataset = sample_dataset();

        save_dataset(&dataset, &path).unwrap();
        let loaded = load_dataset(&path).unwrap();

        assert_eq!(loaded, dataset);
        assert_eq!(loaded[0].time_zone(), Some(chrono_tz::Asia::Tokyo));
    }

    #[test]
    fn test_load_rejects_other_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.json");
        std::fs::write(&path, "{\"not\": \"a dataset\"}").unwrap();
        assert!(matches!(load_dataset(&path), Err(SmpsError::Json(_))));
    }
}
