//! Directory loading for SMPS exports
//!
//! Finds instrument exports directly inside a directory and parses them one
//! at a time in file-name order. Loading is all-or-nothing: the first file
//! that fails to parse aborts the whole directory.

use crate::config::SmpsConfig;
use crate::error::{Result, SmpsError};
use crate::models::Record;
use crate::parser::{ReadOptions, RecordParser};
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Export discovery and loading for one directory
#[derive(Debug)]
pub struct DirectoryLoader {
    dir_path: PathBuf,
    config: SmpsConfig,
}

impl DirectoryLoader {
    pub fn new(dir_path: impl Into<PathBuf>) -> Self {
        Self::with_config(dir_path, SmpsConfig::default())
    }

    pub fn with_config(dir_path: impl Into<PathBuf>, config: SmpsConfig) -> Self {
        Self {
            dir_path: dir_path.into(),
            config,
        }
    }

    /// List matching regular files, sorted by file name (non-recursive)
    pub fn discover_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir_path.is_dir() {
            return Err(SmpsError::DirectoryNotFound {
                path: self.dir_path.clone(),
            });
        }

        let pattern = Pattern::new(&self.config.file_pattern)?;
        debug!(
            "Searching for '{}' in: {}",
            self.config.file_pattern,
            self.dir_path.display()
        );

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir_path)? {
            let entry = entry?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        info!(
            "Found {} SMPS CSV files in '{}'",
            files.len(),
            self.dir_path.display()
        );
        for (position, file) in files.iter().enumerate() {
            info!("    {}: {}", position + 1, display_name(file));
        }

        Ok(files)
    }

    /// Parse every discovered export in order
    pub fn load(&self, options: &ReadOptions) -> Result<Vec<Record>> {
        let files = self.discover_files()?;
        let parser = RecordParser::new(self.config.clone());
        let progress = self.progress_bar(files.len() as u64);

        let mut records = Vec::with_capacity(files.len());
        for file in &files {
            progress.set_message(display_name(file));
            let result = parser.parse_file(file, options)?;
            records.push(result.record);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("Done reading {} records", records.len());
        Ok(records)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

/// Parse every `*SMPS*.csv` export directly inside `dir`
pub fn list_records(dir: &Path, options: &ReadOptions) -> Result<Vec<Record>> {
    DirectoryLoader::new(dir).load(options)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
