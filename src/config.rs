//! Configuration management and validation.
//!
//! Provides the layout offsets and sentinel labels of the instrument export,
//! the discovery pattern used by the directory loader, and rendering
//! settings for the heatmap adapter.

use crate::constants::{
    DATA_HEADER_LINE, GROUP_LABEL_LINE, HEATMAP_COLOR_MAX, HEATMAP_COLOR_MIN, HEATMAP_HEIGHT_PX,
    HEATMAP_MIN_HEIGHT_PX, HEATMAP_MIN_WIDTH_PX, HEATMAP_SIZE_MAX_NM, HEATMAP_SIZE_MIN_NM,
    HEATMAP_WIDTH_PX, METADATA_LINES, SMPS_FILE_PATTERN, sentinels,
};
use crate::error::{Result, SmpsError};
use serde::{Deserialize, Serialize};

/// Rendering settings for heatmaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Concentrations below this are clipped to the bottom of the colour scale
    pub color_min: f64,

    /// Concentrations above this are clipped to the top of the colour scale
    pub color_max: f64,

    /// Lower edge of the diameter axis (nm)
    pub size_min_nm: f64,

    /// Upper edge of the diameter axis (nm)
    pub size_max_nm: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: HEATMAP_WIDTH_PX,
            height: HEATMAP_HEIGHT_PX,
            color_min: HEATMAP_COLOR_MIN,
            color_max: HEATMAP_COLOR_MAX,
            size_min_nm: HEATMAP_SIZE_MIN_NM,
            size_max_nm: HEATMAP_SIZE_MAX_NM,
        }
    }
}

impl HeatmapConfig {
    /// Set the colour scale limits
    pub fn with_color_range(mut self, min: f64, max: f64) -> Self {
        self.color_min = min;
        self.color_max = max;
        self
    }

    /// Set the diameter axis limits
    pub fn with_size_range(mut self, min_nm: f64, max_nm: f64) -> Self {
        self.size_min_nm = min_nm;
        self.size_max_nm = max_nm;
        self
    }

    /// Set the image dimensions
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Check that both logarithmic ranges are usable
    pub fn validate(&self) -> Result<()> {
        if self.width < HEATMAP_MIN_WIDTH_PX || self.height < HEATMAP_MIN_HEIGHT_PX {
            return Err(SmpsError::Configuration {
                message: format!(
                    "heatmap must be at least {}x{} pixels, got {}x{}",
                    HEATMAP_MIN_WIDTH_PX, HEATMAP_MIN_HEIGHT_PX, self.width, self.height
                ),
            });
        }
        if !(self.color_min > 0.0 && self.color_min < self.color_max) {
            return Err(SmpsError::Configuration {
                message: format!(
                    "colour range must be positive and increasing, got {}..{}",
                    self.color_min, self.color_max
                ),
            });
        }
        if !(self.size_min_nm > 0.0 && self.size_min_nm < self.size_max_nm) {
            return Err(SmpsError::Configuration {
                message: format!(
                    "size range must be positive and increasing, got {}..{}",
                    self.size_min_nm, self.size_max_nm
                ),
            });
        }
        Ok(())
    }
}

/// Global configuration for SMPS processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmpsConfig {
    /// Leading lines parsed as `key,value` metadata
    pub metadata_lines: usize,

    /// Zero-based line holding the column-group sentinel labels
    pub group_label_line: usize,

    /// Zero-based line holding the data column names
    pub data_header_line: usize,

    /// Status value both status columns must carry for a scan to be kept
    pub normal_scan_status: String,

    /// File name pattern matched inside a directory
    pub file_pattern: String,

    /// Show a progress bar while loading directories
    pub show_progress: bool,

    /// Heatmap rendering settings
    pub heatmap: HeatmapConfig,
}

impl Default for SmpsConfig {
    fn default() -> Self {
        Self {
            metadata_lines: METADATA_LINES,
            group_label_line: GROUP_LABEL_LINE,
            data_header_line: DATA_HEADER_LINE,
            normal_scan_status: sentinels::NORMAL_SCAN.to_string(),
            file_pattern: SMPS_FILE_PATTERN.to_string(),
            show_progress: false,
            heatmap: HeatmapConfig::default(),
        }
    }
}

impl SmpsConfig {
    /// Enable the directory loading progress bar
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Use a custom discovery pattern
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Configure heatmap rendering
    pub fn with_heatmap(mut self, heatmap: HeatmapConfig) -> Self {
        self.heatmap = heatmap;
        self
    }

    /// Check the layout offsets are ordered and the pattern is valid
    pub fn validate(&self) -> Result<()> {
        if self.group_label_line >= self.data_header_line {
            return Err(SmpsError::Configuration {
                message: format!(
                    "column-group line ({}) must precede the data header line ({})",
                    self.group_label_line, self.data_header_line
                ),
            });
        }
        if self.metadata_lines > self.group_label_line {
            return Err(SmpsError::Configuration {
                message: format!(
                    "metadata block ({} lines) overlaps the column-group line ({})",
                    self.metadata_lines, self.group_label_line
                ),
            });
        }
        glob::Pattern::new(&self.file_pattern)?;
        self.heatmap.validate()
    }
}
