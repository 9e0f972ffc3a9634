//! Application constants for the SMPS processor
//!
//! Layout offsets and sentinel labels of the instrument export, discovery
//! patterns, rendering defaults and the physical constants used by the
//! electrical mobility helper.

// =============================================================================
// Export File Layout
// =============================================================================

/// Number of leading lines holding free-form `key,value` metadata
pub const METADATA_LINES: usize = 45;

/// Zero-based line holding the column-group sentinel labels
pub const GROUP_LABEL_LINE: usize = 51;

/// Zero-based line holding the data column names; scans follow it
pub const DATA_HEADER_LINE: usize = 52;

/// Discovery pattern for instrument exports inside a directory
pub const SMPS_FILE_PATTERN: &str = "*SMPS*.csv";

/// Extension used for persisted datasets
pub const DATASET_FILE_EXTENSION: &str = "json";

// =============================================================================
// Column Names and Sentinel Labels
// =============================================================================

/// Data columns the parser depends on by name
pub mod columns {
    pub const DETECTOR_STATUS: &str = "Detector Status";
    pub const CLASSIFIER_ERRORS: &str = "Classifier Errors";
    pub const SAMPLE_START: &str = "DateTime Sample Start";
    pub const LOWER_SIZE: &str = "Lower Size (nm)";
    pub const UPPER_SIZE: &str = "Upper Size (nm)";

    /// First column of the raw time-series block in older firmware
    pub const RAW_DATA_TIME: &str = "Raw Data - Time (s)";
}

/// Labels found on the column-group line above the data header
pub mod sentinels {
    /// Marks the first concentration-by-size column
    pub const CONCENTRATION_START: &str = "Particle Concentration by Midpoint (nm)";

    /// Marks the first raw-concentration-by-size column
    pub const RAW_CONCENTRATION_START: &str = "Raw Concentration by Midpoint (nm)";

    /// Status value of a scan the instrument completed without faults
    pub const NORMAL_SCAN: &str = "Normal Scan";
}

/// Keys of the derived metadata entries, as shown in reports
pub mod metadata_keys {
    pub const START_TIME: &str = "Start Time";
    pub const END_TIME: &str = "End Time";
    pub const SAMPLE_COUNT: &str = "Number of Samples";
    pub const LOWER_SIZE: &str = "Lower Size (nm)";
    pub const UPPER_SIZE: &str = "Upper Size (nm)";
    pub const DATASET_NAME: &str = "Dataset Name";
}

// =============================================================================
// Time Range Resolution
// =============================================================================

/// Label used when no time selector is given
pub const ALL_DATA_LABEL: &str = "All Data";

/// File stem prefix for heatmap artifacts
pub const HEATMAP_STEM_PREFIX: &str = "heatmap";

/// Spans up to this many days use hourly ticks
pub const HOURLY_TICK_MAX_DAYS: i64 = 1;

/// Spans up to this many days use daily ticks with sub-day markers
pub const DAILY_TICK_MAX_DAYS: i64 = 12;

/// Hours carrying minor tick markers under daily granularity
pub const DAILY_MINOR_TICK_HOURS: [u32; 3] = [6, 12, 18];

// =============================================================================
// Rendering Defaults
// =============================================================================

pub const HEATMAP_WIDTH_PX: u32 = 1800;
pub const HEATMAP_HEIGHT_PX: u32 = 600;

/// Smallest image the chart layout fits into
pub const HEATMAP_MIN_WIDTH_PX: u32 = 320;
pub const HEATMAP_MIN_HEIGHT_PX: u32 = 240;

/// Concentration range of the colour scale (dN/dlogDp, cm^-3)
pub const HEATMAP_COLOR_MIN: f64 = 1e1;
pub const HEATMAP_COLOR_MAX: f64 = 1e4;

/// Diameter range of the y axis (nm)
pub const HEATMAP_SIZE_MIN_NM: f64 = 1e1;
pub const HEATMAP_SIZE_MAX_NM: f64 = 1e3;

pub const PNSD_WIDTH_PX: u32 = 1200;
pub const PNSD_HEIGHT_PX: u32 = 600;

/// Upper edge of the size-distribution concentration axis (cm^-3)
pub const PNSD_CONCENTRATION_MAX: f64 = 1.8e7;

/// Records with more scans than this are plotted without a legend
pub const PNSD_LEGEND_MAX_SCANS: usize = 24;

/// Figure and axis text
pub mod labels {
    pub const HEATMAP_TITLE: &str = "SMPS Particle Size Concentration Heatmap";
    pub const TIME_AXIS: &str = "Time";
    pub const SIZE_AXIS: &str = "Particle Size (nm)";
    pub const COLOR_BAR: &str = "dN/dlogDp (cm^-3)";
    pub const CONCENTRATION_AXIS: &str = "Particle Concentration (cm^-3)";

    /// Font family for every text element
    pub const FONT: &str = "sans-serif";
}

// =============================================================================
// Electrical Mobility
// =============================================================================

/// Physical constants for electrical mobility of charged particles in air.
///
/// The exact values of the elementary charge and air viscosity cancel out
/// when equating the mobilities of two particles.
pub mod mobility {
    /// Elementary charge (C)
    pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;

    /// Dynamic viscosity of air (Pa·s)
    pub const AIR_VISCOSITY: f64 = 1.8e-5;

    /// Mean free path of air molecules (nm)
    pub const MEAN_FREE_PATH_NM: f64 = 68.0;

    /// Cunningham slip correction coefficients
    pub const CUNNINGHAM_A: f64 = 1.257;
    pub const CUNNINGHAM_B: f64 = 0.4;
    pub const CUNNINGHAM_C: f64 = 1.1;

    /// Diameter search interval for the equivalent-diameter solver (nm)
    pub const SOLVER_MIN_NM: f64 = 1e-3;
    pub const SOLVER_MAX_NM: f64 = 1e6;

    /// Relative tolerance of the equivalent-diameter solver
    pub const SOLVER_TOLERANCE: f64 = 1e-10;
}
