//! Time-zone lookup, localization and dataset-wide reconciliation.

use crate::dataset::Dataset;
use crate::error::{Result, SmpsError};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::warn;

/// Look up an IANA zone name, warning when it cannot be resolved
pub fn resolve_zone_name(name: &str) -> Option<Tz> {
    match name.trim().parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            warn!(
                "Time zone '{}' not found. See https://en.wikipedia.org/wiki/List_of_tz_database_time_zones",
                name
            );
            None
        }
    }
}

/// Attach a zone to a wall-clock time.
///
/// Ambiguous times (DST fold) take the earlier instant; times inside a DST
/// gap do not exist and yield `None`.
pub fn localize(tz: Tz, time: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&time).earliest()
}

/// Key used to order times across records: UTC when zoned, wall clock otherwise
pub fn sort_key(time: NaiveDateTime, zone: Option<Tz>) -> Option<NaiveDateTime> {
    match zone {
        Some(tz) => localize(tz, time).map(|instant| instant.naive_utc()),
        None => Some(time),
    }
}

/// Express a record's wall-clock time as wall clock in the output zone.
///
/// Naive records are localized into the output zone, zoned records are
/// converted. Without an output zone the time is left untouched.
pub fn adjust(
    time: NaiveDateTime,
    record_zone: Option<Tz>,
    output_zone: Option<Tz>,
) -> Option<NaiveDateTime> {
    match (record_zone, output_zone) {
        (_, None) => Some(time),
        (None, Some(out)) => localize(out, time).map(|instant| instant.naive_local()),
        (Some(own), Some(out)) => {
            localize(own, time).map(|instant| instant.with_timezone(&out).naive_local())
        }
    }
}

/// Zone state shared by the records of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    /// Every record carries the same zone
    Uniform(Tz),
    /// No record carries a zone
    AllNaive,
    /// Every record carries a zone, but not the same one
    Differing,
    /// Some records carry a zone and some do not
    PartiallyZoned,
}

impl ZoneState {
    /// Classify the zones of all records in a dataset
    pub fn classify(dataset: &Dataset) -> Self {
        let zones: Vec<Option<Tz>> = dataset.iter().map(|record| record.time_zone()).collect();

        let zoned = zones.iter().filter(|zone| zone.is_some()).count();
        if zoned == 0 {
            return ZoneState::AllNaive;
        }
        if zoned < zones.len() {
            return ZoneState::PartiallyZoned;
        }

        let first = zones[0];
        match first {
            Some(tz) if zones.iter().all(|zone| *zone == first) => ZoneState::Uniform(tz),
            _ => ZoneState::Differing,
        }
    }

    /// Decide the output zone given an optional explicit request
    pub fn output_zone(self, requested: Option<Tz>) -> Result<Option<Tz>> {
        match (self, requested) {
            (ZoneState::Uniform(tz), None) => Ok(Some(tz)),
            (ZoneState::Uniform(_), Some(out)) => Ok(Some(out)),
            (ZoneState::AllNaive, None) => Ok(None),
            (ZoneState::AllNaive, Some(out)) => Err(SmpsError::zone_conflict(format!(
                "output time zone '{}' requested but no record carries a time zone to convert from",
                out.name()
            ))),
            (ZoneState::Differing, Some(out)) => Ok(Some(out)),
            (ZoneState::Differing, None) => Err(SmpsError::zone_conflict(
                "records carry different time zones; an output time zone must be given",
            )),
            (ZoneState::PartiallyZoned, _) => Err(SmpsError::zone_conflict(
                "some records carry a time zone and some do not; re-read them with a common time zone",
            )),
        }
    }
}
