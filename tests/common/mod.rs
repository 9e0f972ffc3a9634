//! Shared fixtures for integration tests
//!
//! Builds instrument exports with the fixed 52-line preamble: metadata in
//! the first lines, the column-group labels on line 51 and the data header
//! on line 52.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const DIAMETERS: [&str; 6] = ["11.8", "15.7", "20.9", "27.9", "37.2", "49.6"];

const HEADER_PREFIX: &str = "Scan Number,DateTime Sample Start,Sample Temp (C),Lower Size (nm),Upper Size (nm),Detector Status,Classifier Errors";
const PREFIX_COLUMNS: usize = 7;
const GROUP_LINE: usize = 51;

/// Builder for one export file
#[derive(Debug, Clone)]
pub struct ExportBuilder {
    metadata: Vec<(String, String)>,
    rows: Vec<String>,
}

impl Default for ExportBuilder {
    fn default() -> Self {
        Self {
            metadata: vec![
                ("Instrument Name".to_string(), "SMPS 3938".to_string()),
                ("Dataset Name".to_string(), "integration".to_string()),
            ],
            rows: Vec::new(),
        }
    }
}

impl ExportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a normal scan starting at `start` (`DD/MM/YYYY HH:MM:SS`)
    pub fn scan(self, start: &str, concentration: f64) -> Self {
        self.scan_with_status(start, concentration, "Normal Scan")
    }

    pub fn scan_with_status(mut self, start: &str, concentration: f64, status: &str) -> Self {
        let number = self.rows.len() + 1;
        let mut fields = vec![
            number.to_string(),
            start.to_string(),
            "24.0".to_string(),
            "10.0".to_string(),
            "45.0".to_string(),
            status.to_string(),
            "Normal Scan".to_string(),
        ];
        fields.extend(DIAMETERS.iter().map(|_| concentration.to_string()));
        fields.extend(DIAMETERS.iter().map(|_| "3".to_string()));
        self.rows.push(fields.join(","));
        self
    }

    /// Hourly normal scans for `hours` hours on day `day` of January 2024
    pub fn hourly(mut self, day: u32, hours: u32, concentration: f64) -> Self {
        for hour in 0..hours {
            let start = format!("{:02}/01/2024 {:02}:00:00", day, hour);
            self = self.scan(&start, concentration);
        }
        self
    }

    pub fn build(&self) -> String {
        let mut lines: Vec<String> = self
            .metadata
            .iter()
            .map(|(key, value)| format!("{},{}", key, value))
            .collect();
        lines.resize(GROUP_LINE, String::new());

        let mut group = vec![String::new(); PREFIX_COLUMNS];
        group.push("Particle Concentration by Midpoint (nm)".to_string());
        group.extend(vec![String::new(); DIAMETERS.len() - 1]);
        group.push("Raw Concentration by Midpoint (nm)".to_string());
        lines.push(group.join(","));

        let mut header = vec![HEADER_PREFIX.to_string()];
        header.extend(DIAMETERS.iter().map(|d| d.to_string()));
        header.extend(DIAMETERS.iter().map(|d| d.to_string()));
        lines.push(header.join(","));

        lines.extend(self.rows.iter().cloned());
        lines.join("\n") + "\n"
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}
