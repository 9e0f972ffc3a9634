//! Test modules for the SMPS export parser

mod parser_tests;

use crate::constants::sentinels;
use std::path::{Path, PathBuf};

pub const DIAMETERS: [&str; 5] = ["10.0", "14.1", "20.0", "28.3", "40.0"];

const LEADING_COLUMNS: &str = "Scan Number,DateTime Sample Start,Sample Temp (C),Sample Pressure (kPa),Lower Size (nm),Upper Size (nm),Detector Status,Classifier Errors";
const LEADING_COUNT: usize = 8;

/// What follows the concentration block in a fixture export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLayout {
    RawConcentration,
    RawTime,
    Unknown,
}

pub const NORMAL: (&str, &str) = ("Normal Scan", "Normal Scan");

/// One scan row; concentrations are `base + column index`
pub fn scan_row(
    number: usize,
    start: &str,
    (lower, upper): (f64, f64),
    (detector, classifier): (&str, &str),
    base: f64,
    layout: RawLayout,
) -> String {
    let mut fields = vec![
        number.to_string(),
        start.to_string(),
        "25.1".to_string(),
        "101.3".to_string(),
        lower.to_string(),
        upper.to_string(),
        detector.to_string(),
        classifier.to_string(),
    ];
    fields.extend((0..DIAMETERS.len()).map(|i| (base + i as f64).to_string()));
    match layout {
        RawLayout::RawConcentration => fields.extend(DIAMETERS.iter().map(|_| "1".to_string())),
        RawLayout::RawTime => fields.extend(["5000.0", "0", "7", "9"].map(String::from)),
        RawLayout::Unknown => {}
    }
    fields.join(",")
}

/// A complete export with the fixed preamble
pub fn export_text(metadata: &[(&str, &str)], rows: &[String], layout: RawLayout) -> String {
    let mut lines: Vec<String> = metadata
        .iter()
        .map(|(key, value)| format!("{},{}", key, value))
        .collect();
    lines.resize(51, String::new());

    let mut group = vec![String::new(); LEADING_COUNT];
    group.push(sentinels::CONCENTRATION_START.to_string());
    group.extend(vec![String::new(); DIAMETERS.len() - 1]);
    let mut header = vec![LEADING_COLUMNS.to_string()];
    header.extend(DIAMETERS.iter().map(|d| d.to_string()));

    match layout {
        RawLayout::RawConcentration => {
            group.push(sentinels::RAW_CONCENTRATION_START.to_string());
            header.extend(DIAMETERS.iter().map(|d| d.to_string()));
        }
        RawLayout::RawTime => {
            header.extend(
                ["Total Concentration (#/cm3)", "Raw Data - Time (s)", "0", "1"].map(String::from),
            );
        }
        RawLayout::Unknown => {}
    }

    lines.push(group.join(","));
    lines.push(header.join(","));
    lines.extend(rows.iter().cloned());
    lines.join("\n") + "\n"
}

pub fn write_export(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn default_metadata() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Instrument Name", "SMPS 3938"),
        ("Dataset Name", "campaign_a"),
        ("Sheath Flow (L/min)", "3.0"),
        ("Comment", ""),
    ]
}
