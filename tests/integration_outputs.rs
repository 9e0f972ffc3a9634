//! Integration tests for the output artifacts: heatmaps, scan plots and
//! Parquet exports written from fixture directories.

mod common;

use common::{DIAMETERS, ExportBuilder};
use polars::prelude::*;
use smps_processor::export::{SCAN_START_COLUMN, export_parquet};
use smps_processor::render::{render_heatmap, render_pnsd};
use smps_processor::{Dataset, HeatmapConfig, ReadOptions, TimeSelector, resolve};
use tempfile::TempDir;

fn two_day_dataset(dir: &TempDir) -> Dataset {
    ExportBuilder::new().hourly(1, 24, 120.0).write(dir.path(), "day1_SMPS.csv");
    ExportBuilder::new()
        .hourly(2, 12, 800.0)
        .scan_with_status("02/01/2024 12:30:00", 800.0, "Flow Error")
        .write(dir.path(), "day2_SMPS.csv");

    let mut dataset = Dataset::read_from_dir(dir.path(), &ReadOptions::default()).unwrap();
    dataset.sort_by_time();
    dataset
}

#[test]
fn test_parquet_export_has_one_row_per_scan() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = two_day_dataset(&temp_dir);
    let output = temp_dir.path().join("exports").join("dataset.parquet");

    let rows = export_parquet(&dataset, &output).unwrap();
    assert_eq!(rows, 36);
    assert_eq!(rows, dataset.sample_count());

    let file = std::fs::File::open(&output).unwrap();
    let frame = ParquetReader::new(file).finish().unwrap();
    assert_eq!(frame.height(), 36);
    assert!(frame.column(SCAN_START_COLUMN).is_ok());
    assert!(frame.column(DIAMETERS[0]).is_ok());
    // Only scanned diameters become columns
    assert!(frame.column(DIAMETERS[5]).is_err());
}

#[test]
fn test_empty_dataset_exports_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("empty.parquet");
    assert_eq!(export_parquet(&Dataset::new(), &output).unwrap(), 0);
    assert!(!output.exists());
}

#[test]
fn test_heatmap_for_date_range() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = two_day_dataset(&temp_dir);
    let figures = temp_dir.path().join("figures");

    let selector = TimeSelector::from_parts(&["2024-01-01", "2024-01-02"]).unwrap();
    let resolution = resolve(&dataset, &selector, None).unwrap();
    assert_eq!(resolution.subtitle(&dataset), "Date Range: 2024-01-01 to 2024-01-02");

    let config = HeatmapConfig::default().with_dimensions(600, 300);
    let path = render_heatmap(&dataset, &resolution, &config, Some(&figures)).unwrap();
    assert_eq!(path, figures.join("heatmap_20240101_20240102.png"));

    let image = image::open(&path).unwrap();
    assert_eq!((image.width(), image.height()), (600, 300));
}

#[test]
fn test_heatmap_single_day_selects_that_day_only() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = two_day_dataset(&temp_dir);

    let selector: TimeSelector = "2024-01-02".parse().unwrap();
    let resolution = resolve(&dataset, &selector, None).unwrap();
    let selected: Vec<usize> = dataset
        .iter()
        .map(|record| resolution.select_rows(record).len())
        .collect();
    assert_eq!(selected, vec![0, 12]);
    assert_eq!(resolution.subtitle(&dataset), "Date: 2024-01-02");

    let config = HeatmapConfig::default().with_dimensions(600, 300);
    let path = render_heatmap(&dataset, &resolution, &config, Some(temp_dir.path())).unwrap();
    assert!(path.ends_with("heatmap_2024-01-02.png"));
}

#[test]
fn test_scan_plot_per_record() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = two_day_dataset(&temp_dir);
    let plots = temp_dir.path().join("plots");

    for record in &dataset {
        let path = render_pnsd(record, Some(&plots)).unwrap();
        assert!(path.exists());
    }
    assert!(plots.join("simple_scan_day1_SMPS.csv.png").exists());
    assert!(plots.join("simple_scan_day2_SMPS.csv.png").exists());
}
