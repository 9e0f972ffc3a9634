//! User-facing time selectors.

use crate::error::{Result, SmpsError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::str::FromStr;

/// Formats accepted for a selector endpoint, most specific first
const INSTANT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Which part of a dataset to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSelector {
    /// All rows of all records
    #[default]
    All,
    /// The calendar day containing this instant
    Single(NaiveDateTime),
    /// Rows between two instants, inclusive
    Range(NaiveDateTime, NaiveDateTime),
}

impl TimeSelector {
    /// Select a whole calendar day
    pub fn date(date: NaiveDate) -> Self {
        TimeSelector::Single(date.and_time(NaiveTime::MIN))
    }

    /// Select the days from `start` through `end`
    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        TimeSelector::Range(start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN))
    }

    /// Build a selector from zero, one or two textual endpoints
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self> {
        match parts {
            [] => Ok(TimeSelector::All),
            [single] => Ok(TimeSelector::Single(parse_instant(single.as_ref())?)),
            [start, end] => Ok(TimeSelector::Range(
                parse_instant(start.as_ref())?,
                parse_instant(end.as_ref())?,
            )),
            _ => Err(SmpsError::invalid_selector(format!(
                "expected nothing, a single date, or a (start, end) pair; got {} values",
                parts.len()
            ))),
        }
    }
}

impl FromStr for TimeSelector {
    type Err = SmpsError;

    /// Parse `all`, `2024-01-01`, or `2024-01-01,2024-01-03`
    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            return Ok(TimeSelector::All);
        }
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        Self::from_parts(&parts)
    }
}

/// Parse a date or date-time endpoint
pub fn parse_instant(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    INSTANT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| SmpsError::invalid_selector(format!("cannot parse '{}' as a date or date-time", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_all() {
        assert_eq!("".parse::<TimeSelector>().unwrap(), TimeSelector::All);
        assert_eq!("ALL".parse::<TimeSelector>().unwrap(), TimeSelector::All);
    }

    #[test]
    fn test_parse_single_and_range() {
        assert_eq!(
            "2024-01-02".parse::<TimeSelector>().unwrap(),
            TimeSelector::Single(dt(2024, 1, 2, 0, 0, 0))
        );
        assert_eq!(
            "2024-01-01 06:30, 2024-01-01T18:00:15".parse::<TimeSelector>().unwrap(),
            TimeSelector::Range(dt(2024, 1, 1, 6, 30, 0), dt(2024, 1, 1, 18, 0, 15))
        );
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(matches!(
            "2024-01-01,2024-01-02,2024-01-03".parse::<TimeSelector>(),
            Err(SmpsError::InvalidSelector { .. })
        ));
        assert!(matches!(
            "yesterday".parse::<TimeSelector>(),
            Err(SmpsError::InvalidSelector { .. })
        ));
    }
}
