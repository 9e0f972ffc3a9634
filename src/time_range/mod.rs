//! Time-range resolution for dataset queries
//!
//! Turns a [`TimeSelector`] into concrete axis bounds, a label, an artifact
//! file stem, a per-row predicate and a tick granularity, after reconciling
//! the time zones of every record in the dataset.
//!
//! ## Zone reconciliation
//!
//! | Records                 | No output zone     | Output zone given |
//! |-------------------------|--------------------|-------------------|
//! | all share one zone      | use that zone      | convert           |
//! | all naive               | naive              | error             |
//! | zoned, zones differ     | error              | convert           |
//! | some zoned, some naive  | error              | error             |
//!
//! Row timestamps are always adjusted into the output zone before the
//! predicate is applied; records are never assumed to be pre-aligned.

pub mod selector;
pub mod zone;

pub use selector::TimeSelector;
pub use zone::ZoneState;

use crate::constants::{
    ALL_DATA_LABEL, DAILY_MINOR_TICK_HOURS, DAILY_TICK_MAX_DAYS, HEATMAP_STEM_PREFIX,
    HOURLY_TICK_MAX_DAYS,
};
use crate::dataset::Dataset;
use crate::error::{Result, SmpsError};
use crate::models::Record;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use tracing::debug;

/// Inclusive x-axis limits, as wall clock in `zone`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisBounds {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub zone: Option<Tz>,
}

impl AxisBounds {
    /// Number of calendar days the bounds touch, counting a partial day as one
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Row predicate applied to zone-adjusted timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    All,
    OnDate(NaiveDate),
    Between(NaiveDateTime, NaiveDateTime),
}

impl RowFilter {
    /// Test one zone-adjusted timestamp; missing timestamps only pass `All`
    pub fn matches(&self, time: Option<NaiveDateTime>) -> bool {
        match (self, time) {
            (RowFilter::All, _) => true,
            (_, None) => false,
            (RowFilter::OnDate(date), Some(t)) => t.date() == *date,
            (RowFilter::Between(start, end), Some(t)) => *start <= t && t <= *end,
        }
    }
}

/// Axis granularity the renderer should use for a resolved span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickGranularity {
    /// Span of at most one day: a tick every hour
    Hourly,
    /// Up to twelve days: a tick per day plus minor markers at fixed hours
    Daily { minor_hours: [u32; 3] },
    /// Longer spans or unbounded: let the renderer choose
    Auto,
}

impl TickGranularity {
    pub fn for_bounds(bounds: Option<&AxisBounds>) -> Self {
        match bounds.map(AxisBounds::span_days) {
            Some(days) if days <= HOURLY_TICK_MAX_DAYS => TickGranularity::Hourly,
            Some(days) if days <= DAILY_TICK_MAX_DAYS => TickGranularity::Daily {
                minor_hours: DAILY_MINOR_TICK_HOURS,
            },
            _ => TickGranularity::Auto,
        }
    }
}

/// Outcome of resolving a selector against a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Axis limits; `None` means show everything
    pub xlim: Option<AxisBounds>,
    /// Human-readable description of the selected time
    pub label: String,
    /// Artifact file name without extension
    pub file_stem: String,
    /// Predicate applied to zone-adjusted row timestamps
    pub filter: RowFilter,
    /// Zone all timestamps are expressed in
    pub output_zone: Option<Tz>,
    /// Axis granularity for the renderer
    pub ticks: TickGranularity,
}

impl Resolution {
    /// Artifact file name for a PNG image
    pub fn file_name(&self) -> String {
        format!("{}.png", self.file_stem)
    }

    /// A record's row timestamps as wall clock in the output zone
    pub fn adjusted_times(&self, record: &Record) -> Vec<Option<NaiveDateTime>> {
        record
            .sample_table()
            .index()
            .iter()
            .map(|time| time.and_then(|t| zone::adjust(t, record.time_zone(), self.output_zone)))
            .collect()
    }

    /// Positions of a record's rows that pass the predicate
    pub fn select_rows(&self, record: &Record) -> Vec<usize> {
        self.adjusted_times(record)
            .into_iter()
            .enumerate()
            .filter(|(_, time)| self.filter.matches(*time))
            .map(|(position, _)| position)
            .collect()
    }

    /// Subtitle for the rendered figure, derived from the dataset when unbounded
    pub fn subtitle(&self, dataset: &Dataset) -> String {
        let (start, end) = match self.xlim {
            Some(bounds) => (Some(bounds.start.date()), Some(bounds.end.date())),
            None => {
                let times: Vec<NaiveDateTime> = dataset
                    .iter()
                    .flat_map(|record| self.adjusted_times(record))
                    .flatten()
                    .collect();
                (
                    times.iter().min().map(|t| t.date()),
                    times.iter().max().map(|t| t.date()),
                )
            }
        };

        match (start, end) {
            (Some(start), Some(end)) if start == end => format!("Date: {}", start.format("%Y-%m-%d")),
            (Some(start), Some(end)) => format!(
                "Date Range: {} to {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            _ => "All Available Data".to_string(),
        }
    }
}

/// Resolve a selector against every record of a dataset.
///
/// An unresolvable `output_time_zone` name degrades to no requested zone.
pub fn resolve(
    dataset: &Dataset,
    selector: &TimeSelector,
    output_time_zone: Option<&str>,
) -> Result<Resolution> {
    let requested = output_time_zone.and_then(zone::resolve_zone_name);
    let state = ZoneState::classify(dataset);
    let output_zone = state.output_zone(requested)?;
    debug!("Zone state {:?}, output zone {:?}", state, output_zone);

    let resolution = match *selector {
        TimeSelector::All => Resolution {
            xlim: None,
            label: ALL_DATA_LABEL.to_string(),
            file_stem: format!("{}_all", HEATMAP_STEM_PREFIX),
            filter: RowFilter::All,
            output_zone,
            ticks: TickGranularity::Auto,
        },
        TimeSelector::Single(instant) => resolve_single(instant.date(), output_zone)?,
        TimeSelector::Range(start, end) => resolve_range(start, end, output_zone)?,
    };

    Ok(resolution)
}

fn resolve_single(date: NaiveDate, output_zone: Option<Tz>) -> Result<Resolution> {
    let bounds = AxisBounds {
        start: start_of_day(date),
        end: end_of_day(date),
        zone: output_zone,
    };
    check_exists(&bounds)?;

    Ok(Resolution {
        xlim: Some(bounds),
        label: date.format("%Y-%m-%d").to_string(),
        file_stem: format!("{}_{}", HEATMAP_STEM_PREFIX, date.format("%Y-%m-%d")),
        filter: RowFilter::OnDate(date),
        output_zone,
        ticks: TickGranularity::for_bounds(Some(&bounds)),
    })
}

fn resolve_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    output_zone: Option<Tz>,
) -> Result<Resolution> {
    if start >= end {
        return Err(SmpsError::InvalidTimeRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let dates_only = start.time() == NaiveTime::MIN && end.time() == NaiveTime::MIN;
    let (bounds, label, file_stem) = if dates_only {
        let bounds = AxisBounds {
            start: start_of_day(start.date()),
            end: end_of_day(end.date()),
            zone: output_zone,
        };
        let label = format!(
            "{} ~ {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
        let stem = format!(
            "{}_{}_{}",
            HEATMAP_STEM_PREFIX,
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        );
        (bounds, label, stem)
    } else {
        let bounds = AxisBounds {
            start,
            end,
            zone: output_zone,
        };
        let label = format!(
            "{} ~ {}",
            start.format("%Y-%m-%d %H:%M:%S"),
            end.format("%Y-%m-%d %H:%M:%S")
        );
        let stem = format!(
            "{}_{}_{}",
            HEATMAP_STEM_PREFIX,
            start.format("%Y%m%d_%H%M%S"),
            end.format("%Y%m%d_%H%M%S")
        );
        (bounds, label, stem)
    };
    check_exists(&bounds)?;

    Ok(Resolution {
        xlim: Some(bounds),
        label,
        file_stem,
        filter: RowFilter::Between(bounds.start, bounds.end),
        output_zone,
        ticks: TickGranularity::for_bounds(Some(&bounds)),
    })
}

/// Bounds must name real instants in their zone
fn check_exists(bounds: &AxisBounds) -> Result<()> {
    if let Some(tz) = bounds.zone {
        for time in [bounds.start, bounds.end] {
            if zone::localize(tz, time).is_none() {
                return Err(SmpsError::invalid_selector(format!(
                    "{} does not exist in time zone {}",
                    time,
                    tz.name()
                )));
            }
        }
    }
    Ok(())
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + TimeDelta::days(1) - TimeDelta::microseconds(1)
}
