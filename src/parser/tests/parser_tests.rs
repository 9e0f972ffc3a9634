//! Tests for the record parser

use super::*;
use crate::error::SmpsError;
use crate::models::MetadataValue;
use crate::parser::{Diagnostic, ReadOptions, RecordParser, read_record};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

const ABNORMAL: (&str, &str) = ("Normal Scan", "Flow Error");

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn standard_rows(layout: RawLayout) -> Vec<String> {
    vec![
        scan_row(1, "01/01/2024 10:00:00", (12.0, 30.0), NORMAL, 100.0, layout),
        scan_row(2, "01/01/2024 10:05:00", (13.0, 29.0), ABNORMAL, 200.0, layout),
        scan_row(3, "01/01/24 10:10:00", (12.5, 29.5), NORMAL, 300.0, layout),
    ]
}

fn write_standard(dir: &TempDir, layout: RawLayout) -> std::path::PathBuf {
    let contents = export_text(&default_metadata(), &standard_rows(layout), layout);
    write_export(dir.path(), "20240101_SMPS.csv", &contents)
}

#[test]
fn test_parse_standard_export() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::RawConcentration);

    let result = RecordParser::default()
        .parse_file(&path, &ReadOptions::default())
        .unwrap();
    let record = result.record;

    assert_eq!(record.source_name(), "20240101_SMPS.csv");
    assert_eq!(record.len(), 2);
    assert_eq!(record.sample_table().len(), record.scan_metadata().len());
    assert_eq!(
        record.sample_table().index(),
        &[Some(at(1, 10, 0)), Some(at(1, 10, 10))]
    );
    assert_eq!(record.metadata().start_time, Some(at(1, 10, 0)));
    assert_eq!(record.metadata().end_time, Some(at(1, 10, 10)));
    assert_eq!(record.metadata().sample_count, 2);
    assert_eq!(record.metadata().lower_size_nm, Some(12.0));
    assert_eq!(record.metadata().upper_size_nm, Some(30.0));
    assert_eq!(record.time_zone(), None);

    // Only 14.1, 20.0 and 28.3 fall inside [12, 30]
    let labels: Vec<&str> = record
        .sample_table()
        .bins()
        .iter()
        .map(|bin| bin.label.as_str())
        .collect();
    assert_eq!(labels, vec!["14.1", "20.0", "28.3"]);
    assert_eq!(record.sample_table().value(0, 0), Some(101.0));
    assert_eq!(record.sample_table().value(1, 2), Some(303.0));

    // Bin width comes from all five labels, not the narrowed three
    let expected = (40.0f64.log10() - 10.0f64.log10()) / 4.0;
    assert!((record.log_bin_width().unwrap() - expected).abs() < 1e-12);

    assert_eq!(
        record.scan_metadata().columns(),
        &[
            "Scan Number",
            "Sample Temp (C)",
            "Sample Pressure (kPa)",
            "Lower Size (nm)",
            "Upper Size (nm)",
            "Detector Status",
            "Classifier Errors"
        ]
    );
    assert_eq!(record.scan_metadata().numeric(1, "Scan Number"), Some(3.0));

    let header = &record.metadata().header;
    assert_eq!(
        header.get("Dataset Name"),
        Some(&MetadataValue::Text("campaign_a".to_string()))
    );
    assert_eq!(header.get("Sheath Flow (L/min)"), Some(&MetadataValue::Number(3.0)));
    assert!(header.get("Comment").unwrap().is_missing());

    assert_eq!(result.stats.total_rows, 3);
    assert_eq!(result.stats.rows_kept, 2);
    assert_eq!(result.stats.rows_discarded, 1);
    assert_eq!(result.stats.diameters_found, 5);
    assert_eq!(result.stats.diameters_kept, 3);
    assert!(!result.stats.has_diagnostics());
}

#[test]
fn test_parse_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::RawConcentration);

    let first = read_record(&path, &ReadOptions::default()).unwrap();
    let second = read_record(&path, &ReadOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_raw_time_layout() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::RawTime);

    let result = RecordParser::default()
        .parse_file(&path, &ReadOptions::default())
        .unwrap();
    assert_eq!(result.stats.diameters_found, 5);
    assert!(!result.stats.has(&Diagnostic::UnrecognizedRawFormat));
}

#[test]
fn test_unknown_layout_falls_back_with_diagnostic() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::Unknown);

    let result = RecordParser::default()
        .parse_file(&path, &ReadOptions::default())
        .unwrap();
    assert_eq!(result.stats.diameters_found, 5);
    assert!(result.stats.has(&Diagnostic::UnrecognizedRawFormat));
    assert_eq!(result.record.len(), 2);
}

#[test]
fn test_unparseable_timestamp_keeps_row() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RawLayout::RawConcentration;
    let rows = vec![
        scan_row(1, "garbage", (12.0, 30.0), NORMAL, 1.0, layout),
        scan_row(2, "02/01/2024 00:00:00", (12.0, 30.0), NORMAL, 1.0, layout),
    ];
    let path = write_export(
        temp_dir.path(),
        "bad_SMPS.csv",
        &export_text(&default_metadata(), &rows, layout),
    );

    let result = RecordParser::default()
        .parse_file(&path, &ReadOptions::default())
        .unwrap();

    assert_eq!(result.record.len(), 2);
    assert_eq!(result.record.sample_table().index()[0], None);
    assert_eq!(result.record.metadata().start_time, Some(at(2, 0, 0)));
    // Scan rows begin on line 54 of the file
    assert_eq!(
        result.stats.diagnostics,
        vec![Diagnostic::UnparsedTimestamps { lines: vec![54] }]
    );
}

#[test]
fn test_time_zone_is_attached() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::RawConcentration);

    let record = read_record(&path, &ReadOptions::default().with_time_zone("Asia/Tokyo")).unwrap();
    assert_eq!(record.time_zone(), Some(chrono_tz::Asia::Tokyo));
    // Wall clock is kept; the zone only changes how it is interpreted
    assert_eq!(record.metadata().start_time, Some(at(1, 10, 0)));
    assert_eq!(record.start_key(), Some(at(1, 1, 0)));
}

#[test]
fn test_unknown_time_zone_degrades_to_naive() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::RawConcentration);

    let result = RecordParser::default()
        .parse_file(&path, &ReadOptions::default().with_time_zone("Nowhere/Land"))
        .unwrap();
    assert_eq!(result.record.time_zone(), None);
    assert_eq!(
        result.stats.diagnostics,
        vec![Diagnostic::UnknownTimeZone {
            name: "Nowhere/Land".to_string()
        }]
    );
}

#[test]
fn test_metadata_and_rawdata_options() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_standard(&temp_dir, RawLayout::RawConcentration);

    let options = ReadOptions::default().with_metadata(false).with_rawdata(true);
    let result = RecordParser::default().parse_file(&path, &options).unwrap();

    assert!(result.record.metadata().header.is_empty());
    assert_eq!(result.record.metadata().sample_count, 2);
    assert!(result.stats.has(&Diagnostic::RawDataUnavailable));
}

#[test]
fn test_no_normal_scans_keeps_no_diameters() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RawLayout::RawConcentration;
    let rows = vec![scan_row(1, "01/01/2024 00:00:00", (10.0, 40.0), ABNORMAL, 1.0, layout)];
    let path = write_export(
        temp_dir.path(),
        "idle_SMPS.csv",
        &export_text(&default_metadata(), &rows, layout),
    );

    let result = RecordParser::default()
        .parse_file(&path, &ReadOptions::default())
        .unwrap();

    assert!(result.record.is_empty());
    assert!(result.record.sample_table().bins().is_empty());
    assert_eq!(result.record.metadata().start_time, None);
    assert_eq!(result.record.metadata().lower_size_nm, None);
    assert!(result.stats.has(&Diagnostic::NoNormalScans));
}

#[test]
fn test_structural_failures() {
    let temp_dir = TempDir::new().unwrap();

    let short = write_export(temp_dir.path(), "short_SMPS.csv", "Instrument Name,SMPS\n");
    assert!(matches!(
        read_record(&short, &ReadOptions::default()),
        Err(SmpsError::InvalidFormat { .. })
    ));

    let contents = export_text(&default_metadata(), &standard_rows(RawLayout::RawTime), RawLayout::RawTime)
        .replace(crate::constants::sentinels::CONCENTRATION_START, "Something Else");
    let no_sentinel = write_export(temp_dir.path(), "nosentinel_SMPS.csv", &contents);
    assert!(matches!(
        read_record(&no_sentinel, &ReadOptions::default()),
        Err(SmpsError::InvalidFormat { .. })
    ));

    let missing = temp_dir.path().join("missing_SMPS.csv");
    assert!(matches!(
        read_record(&missing, &ReadOptions::default()),
        Err(SmpsError::Io(_))
    ));
}

#[test]
fn test_non_finite_values_survive_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let layout = RawLayout::RawConcentration;

    // Column 9 is the 14.1 nm bin, the first one inside [12, 30]
    let mut fields: Vec<String> =
        scan_row(1, "01/01/2024 10:00:00", (12.0, 30.0), NORMAL, 100.0, layout)
            .split(',')
            .map(String::from)
            .collect();
    fields[9] = "inf".to_string();
    let mut metadata = default_metadata();
    metadata.push(("Sheath Temp", "NaN"));
    let contents = export_text(&metadata, &[fields.join(",")], layout);
    let path = write_export(temp_dir.path(), "20240101_SMPS.csv", &contents);

    let record = read_record(&path, &ReadOptions::default()).unwrap();
    assert_eq!(
        record.metadata().header.get("Sheath Temp"),
        Some(&MetadataValue::Text("NaN".to_string()))
    );
    assert_eq!(record.sample_table().value(0, 0), None);
    assert_eq!(record.sample_table().value(0, 1), Some(102.0));

    let dataset = crate::dataset::Dataset::from(vec![record]);
    let saved = temp_dir.path().join("dataset.json");
    crate::persistence::save_dataset(&dataset, &saved).unwrap();
    let loaded = crate::persistence::load_dataset(&saved).unwrap();
    assert_eq!(loaded, dataset);
}
