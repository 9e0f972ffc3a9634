//! Field parsing utilities for SMPS scan rows
//!
//! Sample start times appear in several day-first layouts depending on the
//! instrument software version and the locale of the exporting machine.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// Explicit layouts tried in order, with the year width each expects
const SAMPLE_START_FORMATS: &[(&str, usize)] = &[
    ("%d/%m/%Y %H:%M:%S", 4),
    ("%d/%m/%y %H:%M:%S", 2),
    ("%d/%m/%Y %I:%M:%S %p", 4),
    ("%d/%m/%y %I:%M:%S %p", 2),
];

/// Two-digit years up to this value belong to the 2000s
const TWO_DIGIT_YEAR_PIVOT: i32 = 68;

static PERMISSIVE_DATETIME: OnceLock<Regex> = OnceLock::new();

fn permissive_datetime() -> &'static Regex {
    PERMISSIVE_DATETIME.get_or_init(|| {
        Regex::new(
            r"(?x)^
            (?P<a>\d{1,4}) [./-] (?P<b>\d{1,2}) [./-] (?P<c>\d{1,4})
            (?:
                [\sT]+ (?P<hour>\d{1,2}) : (?P<minute>\d{2})
                (?: : (?P<second>\d{2}) (?: \. (?P<fraction>\d+) )? )?
                \s* (?P<meridiem>[AaPp][Mm])?
            )?
            $",
        )
        .expect("sample start pattern is a valid regex")
    })
}

/// Parse a `DateTime Sample Start` cell, day-first.
///
/// Returns `None` when no layout fits; the caller records a diagnostic.
pub fn parse_sample_start(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let year_width = date_year_width(text);
    SAMPLE_START_FORMATS
        .iter()
        .filter(|(_, width)| year_width == Some(*width))
        .find_map(|(format, _)| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| parse_permissive(text))
}

/// Width of the year field of a `d/m/y ...` date, if the text has that shape
fn date_year_width(text: &str) -> Option<usize> {
    let date = text.split_whitespace().next()?;
    let mut parts = date.split('/');
    let (_day, _month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(year.len())
}

/// Day-first fallback accepting any separator, optional seconds and
/// fraction, a 12-hour suffix, and ISO year-first dates
fn parse_permissive(text: &str) -> Option<NaiveDateTime> {
    let caps = permissive_datetime().captures(text)?;
    let field = |name: &str| caps.name(name).map(|m| m.as_str());

    let (a, b, c) = (field("a")?, field("b")?, field("c")?);
    let date = if a.len() == 4 {
        NaiveDate::from_ymd_opt(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?)?
    } else {
        NaiveDate::from_ymd_opt(expand_year(c)?, b.parse().ok()?, a.parse().ok()?)?
    };

    let Some(hour) = field("hour") else {
        return Some(date.and_time(NaiveTime::MIN));
    };
    let mut hour: u32 = hour.parse().ok()?;
    let minute: u32 = field("minute")?.parse().ok()?;
    let second: u32 = field("second").map_or(Some(0), |s| s.parse().ok())?;
    let nanos = field("fraction").map_or(Some(0), fraction_nanos)?;

    if let Some(meridiem) = field("meridiem") {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.eq_ignore_ascii_case("pm");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    Some(date.and_time(time))
}

fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    match year.len() {
        1 | 2 if value <= TWO_DIGIT_YEAR_PIVOT => Some(2000 + value),
        1 | 2 => Some(1900 + value),
        4 => Some(value),
        _ => None,
    }
}

fn fraction_nanos(digits: &str) -> Option<u32> {
    let padded: String = digits.chars().chain(std::iter::repeat('0')).take(9).collect();
    padded.parse().ok()
}

/// Parse a numeric cell; empty, non-numeric or non-finite text is missing
pub fn parse_cell(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a diameter column label as nanometres
pub fn parse_diameter_label(label: &str) -> Option<f64> {
    label
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
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
    fn test_explicit_formats() {
        assert_eq!(
            parse_sample_start("31/12/2023 23:59:59"),
            Some(dt(2023, 12, 31, 23, 59, 59))
        );
        assert_eq!(
            parse_sample_start("31/12/23 23:59:59"),
            Some(dt(2023, 12, 31, 23, 59, 59))
        );
        assert_eq!(
            parse_sample_start("31/12/2023 11:59:59 PM"),
            Some(dt(2023, 12, 31, 23, 59, 59))
        );
        assert_eq!(
            parse_sample_start("01/02/24 12:00:01 AM"),
            Some(dt(2024, 2, 1, 0, 0, 1))
        );
    }

    #[test]
    fn test_day_first_is_kept() {
        // 03/04 is the 3rd of April, never March 4th
        assert_eq!(
            parse_sample_start("03/04/2024 08:00:00"),
            Some(dt(2024, 4, 3, 8, 0, 0))
        );
    }

    #[test]
    fn test_permissive_fallback() {
        assert_eq!(parse_sample_start("31-12-2023 23:59"), Some(dt(2023, 12, 31, 23, 59, 0)));
        assert_eq!(parse_sample_start("5.1.2024"), Some(dt(2024, 1, 5, 0, 0, 0)));
        assert_eq!(
            parse_sample_start("2024-01-05T06:07:08"),
            Some(dt(2024, 1, 5, 6, 7, 8))
        );
        assert_eq!(parse_sample_start("1/2/99 3:04 pm"), Some(dt(1999, 2, 1, 15, 4, 0)));

        let with_fraction = parse_sample_start("01/01/2024 00:00:00.25").unwrap();
        assert_eq!(with_fraction.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_unparseable_values() {
        assert_eq!(parse_sample_start(""), None);
        assert_eq!(parse_sample_start("not a date"), None);
        assert_eq!(parse_sample_start("32/01/2024 00:00:00"), None);
        assert_eq!(parse_sample_start("01/13/2024 00:00:00"), None);
        assert_eq!(parse_sample_start("01/01/2024 13:00:00 PM"), None);
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(" 12.5 "), Some(12.5));
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("n/a"), None);
        assert_eq!(parse_cell("NaN"), None);
        assert_eq!(parse_cell("inf"), None);
        assert_eq!(parse_cell("-Infinity"), None);
    }

    #[test]
    fn test_parse_diameter_label() {
        assert_eq!(parse_diameter_label("14.6"), Some(14.6));
        assert_eq!(parse_diameter_label("Total Conc."), None);
        assert_eq!(parse_diameter_label("0"), None);
    }
}
