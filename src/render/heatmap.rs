//! Time by diameter concentration heatmap.
//!
//! Each selected scan becomes a column of cells and each diameter a row,
//! with nearest shading: a cell reaches halfway to its neighbours. Records
//! are drawn independently so gaps between files stay empty.

use super::backend::FontSafeBackend;
use super::colormap::{LogNorm, jet};
use crate::config::HeatmapConfig;
use crate::constants::labels;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::Record;
use crate::time_range::{Resolution, TickGranularity};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::prelude::IntoLogRange;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 60;
const Y_LABEL_AREA: u32 = 80;
const COLOR_BAR_PANEL: u32 = 130;
const COLOR_BAR_LABEL_AREA: u32 = 90;
const COLOR_BAR_STEPS: usize = 256;
const TITLE_FONT_SIZE: u32 = 28;
const SUBTITLE_FONT_SIZE: u32 = 20;
const LABEL_FONT_SIZE: u32 = 16;
const AUTO_MAX_TICKS: i64 = 12;

/// Candidate spacings for automatic ticks, in hours
const AUTO_STEPS_HOURS: [i64; 10] = [1, 2, 3, 6, 12, 24, 48, 168, 336, 720];

/// A tick position on the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTick {
    pub time: NaiveDateTime,
    pub major: bool,
}

/// Time axis whose key points follow a [`TickGranularity`].
///
/// Major ticks carry labels and bold grid lines; minor ticks only get
/// light grid lines.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    start: NaiveDateTime,
    end: NaiveDateTime,
    granularity: TickGranularity,
}

impl TimeAxis {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, granularity: TickGranularity) -> Self {
        Self {
            start,
            end,
            granularity,
        }
    }
}

impl Ranged for TimeAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = NaiveDateTime;

    fn map(&self, value: &NaiveDateTime, limit: (i32, i32)) -> i32 {
        let span = millis(self.end) - millis(self.start);
        let fraction = if span > 0.0 {
            ((millis(*value) - millis(self.start)) / span).clamp(-1.0, 2.0)
        } else {
            0.0
        };
        limit.0 + (fraction * f64::from(limit.1 - limit.0)).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<NaiveDateTime> {
        let light = hint.weight().allow_light_points();
        time_ticks(self.start, self.end, self.granularity)
            .into_iter()
            .filter(|tick| light || tick.major)
            .map(|tick| tick.time)
            .collect()
    }

    fn range(&self) -> Range<NaiveDateTime> {
        self.start..self.end
    }
}

/// Selected scans of one record, in output-zone wall clock
struct RecordColumns<'a> {
    record: &'a Record,
    times: Vec<NaiveDateTime>,
    rows: Vec<usize>,
}

/// One shaded cell in data coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    left: NaiveDateTime,
    right: NaiveDateTime,
    low_nm: f64,
    high_nm: f64,
    value: f64,
}

/// Render the heatmap for a resolved time selection.
///
/// Writes `<file_stem>.png` into `output_dir` (created if needed), or into
/// the current directory, and returns the written path.
pub fn render_heatmap(
    dataset: &Dataset,
    resolution: &Resolution,
    config: &HeatmapConfig,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    config.validate()?;

    let columns = select_columns(dataset, resolution);
    let scans: usize = columns.iter().map(|c| c.rows.len()).sum();
    if scans == 0 {
        warn!("No scans fall in {}; writing an empty heatmap", resolution.label);
    }
    let (x_min, x_max) = time_extent(resolution, &columns);
    let cells: Vec<Cell> = columns
        .iter()
        .flat_map(|column| record_cells(column, (x_min, x_max), config))
        .collect();

    let output_dir = output_dir.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(resolution.file_name());

    draw_heatmap(&path, &cells, (x_min, x_max), resolution, config)?;

    info!(
        "Heatmap for {} ({} scans from {} records) saved to {}",
        resolution.label,
        scans,
        columns.len(),
        path.display()
    );
    Ok(path)
}

fn draw_heatmap(
    path: &Path,
    cells: &[Cell],
    (x_min, x_max): (NaiveDateTime, NaiveDateTime),
    resolution: &Resolution,
    config: &HeatmapConfig,
) -> Result<()> {
    let root = FontSafeBackend::new(BitMapBackend::new(path, (config.width, config.height)))
        .into_drawing_area();
    root.fill(&WHITE)?;
    let titled = root
        .titled(labels::HEATMAP_TITLE, (labels::FONT, TITLE_FONT_SIZE))?
        .titled(&resolution.label, (labels::FONT, SUBTITLE_FONT_SIZE))?;
    let (plot_area, bar_area) = titled.split_horizontally(config.width - COLOR_BAR_PANEL);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .set_label_area_size(LabelAreaPosition::Left, Y_LABEL_AREA)
        .set_label_area_size(LabelAreaPosition::Bottom, X_LABEL_AREA)
        .build_cartesian_2d(
            TimeAxis::new(x_min, x_max, resolution.ticks),
            (config.size_min_nm..config.size_max_nm).log_scale(),
        )?;

    chart
        .configure_mesh()
        .x_desc(labels::TIME_AXIS)
        .y_desc(labels::SIZE_AXIS)
        .x_label_formatter(&|time| tick_label(time, resolution.ticks))
        .y_label_formatter(&|diameter| format!("{:.0}", diameter))
        .label_style((labels::FONT, LABEL_FONT_SIZE))
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    // Values below the colour range are drawn at its minimum; missing stays blank
    let norm = LogNorm::new(config.color_min, config.color_max);
    chart.draw_series(cells.iter().map(|cell| {
        let color = jet(norm.normalize(cell.value.max(config.color_min)));
        Rectangle::new(
            [(cell.left, cell.high_nm), (cell.right, cell.low_nm)],
            color.filled(),
        )
    }))?;

    draw_color_bar(&bar_area, config)?;
    root.present()?;
    Ok(())
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    config: &HeatmapConfig,
) -> Result<()> {
    let mut bar = ChartBuilder::on(area)
        .margin_top(MARGIN)
        .margin_bottom(MARGIN + X_LABEL_AREA)
        .margin_left(MARGIN)
        .set_label_area_size(LabelAreaPosition::Right, COLOR_BAR_LABEL_AREA)
        .build_cartesian_2d(0.0..1.0, (config.color_min..config.color_max).log_scale())?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc(labels::COLOR_BAR)
        .y_label_formatter(&|value| format!("{:.0e}", value))
        .label_style((labels::FONT, LABEL_FONT_SIZE))
        .draw()?;

    let (log_min, log_max) = (config.color_min.log10(), config.color_max.log10());
    let at = |fraction: f64| 10f64.powf(log_min + fraction * (log_max - log_min));
    bar.draw_series((0..COLOR_BAR_STEPS).map(|step| {
        let low = step as f64 / COLOR_BAR_STEPS as f64;
        let high = (step + 1) as f64 / COLOR_BAR_STEPS as f64;
        let color = jet((low + high) / 2.0);
        Rectangle::new([(0.0, at(high)), (1.0, at(low))], color.filled())
    }))?;
    Ok(())
}

fn select_columns<'a>(dataset: &'a Dataset, resolution: &Resolution) -> Vec<RecordColumns<'a>> {
    dataset
        .iter()
        .filter_map(|record| {
            let adjusted = resolution.adjusted_times(record);
            let mut selected: Vec<(NaiveDateTime, usize)> = resolution
                .select_rows(record)
                .into_iter()
                .filter_map(|row| adjusted[row].map(|time| (time, row)))
                .collect();
            if selected.is_empty() {
                debug!("No selected scans in {}", record.source_name());
                return None;
            }
            selected.sort();
            let (times, rows) = selected.into_iter().unzip();
            Some(RecordColumns {
                record,
                times,
                rows,
            })
        })
        .collect()
}

/// Horizontal extent: the resolved bounds, or the edges of the drawn cells
fn time_extent(resolution: &Resolution, columns: &[RecordColumns]) -> (NaiveDateTime, NaiveDateTime) {
    if let Some(bounds) = resolution.xlim {
        return (bounds.start, bounds.end);
    }

    let mut extent: Option<(f64, f64)> = None;
    for column in columns {
        let values: Vec<f64> = column.times.iter().map(|t| millis(*t)).collect();
        let edges = nearest_edges(&values);
        if let (Some(first), Some(last)) = (edges.first(), edges.last()) {
            extent = Some(match extent {
                Some((low, high)) => (low.min(first.0), high.max(last.1)),
                None => (first.0, last.1),
            });
        }
    }

    match extent {
        Some((low, high)) if high > low => (from_millis(low), from_millis(high)),
        Some((low, _)) => {
            let centre = from_millis(low);
            (centre - TimeDelta::minutes(30), centre + TimeDelta::minutes(30))
        }
        None => {
            let midnight = NaiveDateTime::default();
            (midnight, midnight + TimeDelta::days(1))
        }
    }
}

/// Cells of one record, clipped to the time extent and the diameter axis
fn record_cells(
    column: &RecordColumns,
    (x_min, x_max): (NaiveDateTime, NaiveDateTime),
    config: &HeatmapConfig,
) -> Vec<Cell> {
    let table = column.record.sample_table();
    let log_diameters: Vec<f64> = table.diameters().iter().map(|d| d.log10()).collect();
    let y_edges = nearest_edges(&log_diameters);
    let x_values: Vec<f64> = column.times.iter().map(|t| millis(*t)).collect();
    let x_edges = nearest_edges(&x_values);

    let mut cells = Vec::new();
    for (&(left, right), &row) in x_edges.iter().zip(&column.rows) {
        let left = from_millis(left).max(x_min);
        let right = from_millis(right).min(x_max);
        if left > right {
            continue;
        }
        for (bin, &(low, high)) in y_edges.iter().enumerate() {
            let Some(value) = table.value(row, bin) else {
                continue;
            };
            let low_nm = 10f64.powf(low).max(config.size_min_nm);
            let high_nm = 10f64.powf(high).min(config.size_max_nm);
            if low_nm > high_nm {
                continue;
            }
            cells.push(Cell {
                left,
                right,
                low_nm,
                high_nm,
                value,
            });
        }
    }
    cells
}

/// Cell edges for nearest shading: halfway to each neighbour, mirrored at the ends
pub fn nearest_edges(centres: &[f64]) -> Vec<(f64, f64)> {
    let n = centres.len();
    (0..n)
        .map(|i| {
            let left = if i > 0 {
                (centres[i - 1] + centres[i]) / 2.0
            } else if n > 1 {
                centres[0] - (centres[1] - centres[0]) / 2.0
            } else {
                centres[0]
            };
            let right = if i + 1 < n {
                (centres[i] + centres[i + 1]) / 2.0
            } else if n > 1 {
                centres[i] + (centres[i] - centres[i - 1]) / 2.0
            } else {
                centres[i]
            };
            (left, right)
        })
        .collect()
}

/// Tick positions between `start` and `end` for the given granularity
pub fn time_ticks(start: NaiveDateTime, end: NaiveDateTime, granularity: TickGranularity) -> Vec<TimeTick> {
    let first_hour = start.date().and_hms_opt(start.hour(), 0, 0).unwrap_or(start);
    let hours = (end - first_hour).num_hours();

    let step = match granularity {
        TickGranularity::Hourly => 1,
        TickGranularity::Daily { .. } => 1,
        TickGranularity::Auto => AUTO_STEPS_HOURS
            .iter()
            .copied()
            .find(|step| hours / step <= AUTO_MAX_TICKS)
            .unwrap_or(AUTO_STEPS_HOURS[AUTO_STEPS_HOURS.len() - 1]),
    };

    let mut ticks = Vec::new();
    let mut time = first_hour;
    while time <= end {
        if time >= start {
            let tick = match granularity {
                TickGranularity::Hourly => Some(TimeTick { time, major: true }),
                TickGranularity::Daily { minor_hours } => {
                    if time.time() == NaiveTime::MIN {
                        Some(TimeTick { time, major: true })
                    } else if minor_hours.contains(&time.hour()) {
                        Some(TimeTick { time, major: false })
                    } else {
                        None
                    }
                }
                TickGranularity::Auto => {
                    let since_epoch = time.and_utc().timestamp() / 3600;
                    (since_epoch % step == 0).then_some(TimeTick { time, major: true })
                }
            };
            ticks.extend(tick);
        }
        time += TimeDelta::hours(step);
        if step > 1 {
            // Realign to the step after starting from an arbitrary hour
            let since_epoch = time.and_utc().timestamp() / 3600;
            time -= TimeDelta::hours(since_epoch % step);
        }
    }
    ticks
}

/// Label text for a major tick
pub fn tick_label(time: &NaiveDateTime, granularity: TickGranularity) -> String {
    match granularity {
        TickGranularity::Hourly => time.format("%H").to_string(),
        TickGranularity::Daily { .. } => time.format("%m-%d").to_string(),
        TickGranularity::Auto if time.time() == NaiveTime::MIN => time.format("%Y-%m-%d").to_string(),
        TickGranularity::Auto => time.format("%m-%d %H:%M").to_string(),
    }
}

fn millis(time: NaiveDateTime) -> f64 {
    time.and_utc().timestamp_millis() as f64
}

fn from_millis(value: f64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp_millis(value.round() as i64)
        .map(|instant| instant.naive_utc())
        .unwrap_or_default()
}
