//! Particle number size distribution plot, one curve per scan.

use super::backend::FontSafeBackend;
use super::colormap::jet;
use crate::constants::{
    PNSD_CONCENTRATION_MAX, PNSD_HEIGHT_PX, PNSD_LEGEND_MAX_SCANS, PNSD_WIDTH_PX, labels,
};
use crate::error::Result;
use crate::models::Record;
use chrono::NaiveDateTime;
use plotters::prelude::IntoLogRange;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PNSD_STEM_PREFIX: &str = "simple_scan";
const MARGIN: u32 = 20;
const TITLE_FONT_SIZE: u32 = 24;
const LABEL_FONT_SIZE: u32 = 16;
const LEGEND_FONT_SIZE: u32 = 12;
const CURVE_ALPHA: f64 = 0.7;

/// Diameter axis used when a record has no diameter columns (nm)
const EMPTY_SIZE_RANGE: (f64, f64) = (10.0, 1000.0);

/// Artifact name for a record's size-distribution plot
pub fn pnsd_file_name(record: &Record) -> String {
    format!("{}_{}.png", PNSD_STEM_PREFIX, record.source_name())
}

/// Figure title: the recorded dataset name, or the source file name
pub fn pnsd_title(record: &Record) -> String {
    record
        .metadata()
        .dataset_name()
        .unwrap_or_else(|| record.source_name().to_string())
}

/// Legend text for a scan start time
pub fn scan_label(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "NaT".to_string())
}

/// Contiguous runs of present cells as `(diameter, concentration)` points.
///
/// Missing cells break a curve rather than being drawn as zero; values above
/// the axis are drawn at its top edge.
pub fn curve_segments(diameters: &[f64], row: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (diameter, value) in diameters.iter().zip(row) {
        match value {
            Some(value) => current.push((*diameter, value.min(PNSD_CONCENTRATION_MAX))),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Plot every scan of a record on a log diameter axis.
pub fn render_pnsd(record: &Record, output_dir: Option<&Path>) -> Result<PathBuf> {
    let output_dir = output_dir.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(pnsd_file_name(record));

    draw_pnsd(&path, record)?;

    info!(
        "Size distribution of {} scans from {} saved to {}",
        record.sample_table().len(),
        record.source_name(),
        path.display()
    );
    Ok(path)
}

fn draw_pnsd(path: &Path, record: &Record) -> Result<()> {
    let table = record.sample_table();
    let diameters = table.diameters();

    let (size_min, size_max) = if diameters.is_empty() {
        warn!("{} has no diameter columns; writing an empty plot", record.source_name());
        EMPTY_SIZE_RANGE
    } else {
        let min = diameters.iter().copied().fold(f64::INFINITY, f64::min);
        let max = diameters.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max > min {
            (min, max)
        } else {
            (min / 2.0, max * 2.0)
        }
    };

    let root = FontSafeBackend::new(BitMapBackend::new(path, (PNSD_WIDTH_PX, PNSD_HEIGHT_PX)))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(pnsd_title(record), (labels::FONT, TITLE_FONT_SIZE))
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, 90)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(
            (size_min..size_max).log_scale(),
            0.0..PNSD_CONCENTRATION_MAX,
        )?;

    chart
        .configure_mesh()
        .x_desc(labels::SIZE_AXIS)
        .y_desc(labels::CONCENTRATION_AXIS)
        .x_label_formatter(&|diameter| format!("{:.0}", diameter))
        .y_label_formatter(&|value| format!("{:.1e}", value))
        .label_style((labels::FONT, LABEL_FONT_SIZE))
        .draw()?;

    let scans = table.len().max(1);
    let with_legend = table.len() <= PNSD_LEGEND_MAX_SCANS;
    if !with_legend {
        debug!(
            "{} has {} scans; omitting the scan time legend",
            record.source_name(),
            table.len()
        );
    }

    let mut labelled = 0;
    for (position, (row, time)) in table.rows().zip(table.index()).enumerate() {
        let color = jet(position as f64 / scans as f64);
        for (segment_index, segment) in curve_segments(&diameters, row).into_iter().enumerate() {
            let series = chart.draw_series(LineSeries::new(segment, color.mix(CURVE_ALPHA)))?;
            if with_legend && segment_index == 0 {
                series
                    .label(scan_label(*time))
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                labelled += 1;
            }
        }
    }

    if labelled > 0 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((labels::FONT, LEGEND_FONT_SIZE))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
