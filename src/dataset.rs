//! Ordered collection of parsed SMPS records.
//!
//! A dataset is append-only. Chronological ordering is an explicit step
//! ([`Dataset::sort_by_time`]) that reports, but never corrects, records
//! whose time spans overlap.

use crate::error::Result;
use crate::loader::list_records;
use crate::models::Record;
use crate::parser::ReadOptions;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::path::Path;
use tracing::{debug, warn};

/// Two chronologically adjacent records whose spans overlap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub earlier: String,
    pub earlier_end: String,
    pub later: String,
    pub later_start: String,
}

/// Time span of one record, formatted for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSpan {
    pub source_name: String,
    pub start: String,
    pub end: String,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every matching export in a directory
    pub fn read_from_dir(dir: &Path, options: &ReadOptions) -> Result<Self> {
        Ok(Self::from(list_records(dir, options)?))
    }

    /// Append a record without validation
    pub fn add(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Stable sort by start time, returning the overlaps between neighbours.
    ///
    /// Records without a start time sort first.
    pub fn sort_by_time(&mut self) -> Vec<Overlap> {
        if self.records.len() < 2 {
            return Vec::new();
        }

        self.records.sort_by_key(Record::start_key);
        debug!("Sorted {} records by start time", self.records.len());

        let mut overlaps = Vec::new();
        for pair in self.records.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let (Some(prev_end), Some(curr_start)) = (prev.end_key(), curr.start_key()) else {
                continue;
            };
            if prev_end >= curr_start {
                let overlap = Overlap {
                    earlier: prev.source_name().to_string(),
                    earlier_end: prev.format_time(prev.metadata().end_time),
                    later: curr.source_name().to_string(),
                    later_start: curr.format_time(curr.metadata().start_time),
                };
                warn!(
                    "Time overlap detected between {} (ends {}) and {} (starts {})",
                    overlap.earlier, overlap.earlier_end, overlap.later, overlap.later_start
                );
                overlaps.push(overlap);
            }
        }
        overlaps
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Total number of scans across all records
    pub fn sample_count(&self) -> usize {
        self.records.iter().map(Record::len).sum()
    }

    /// Earliest and latest scan across records, as comparable instants
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.records.iter().filter_map(Record::start_key).min()?;
        let end = self.records.iter().filter_map(Record::end_key).max()?;
        Some((start, end))
    }

    /// Per-record time spans in current order
    pub fn time_range_summary(&self) -> Vec<RecordSpan> {
        self.records
            .iter()
            .map(|record| RecordSpan {
                source_name: record.source_name().to_string(),
                start: record.format_time(record.metadata().start_time),
                end: record.format_time(record.metadata().end_time),
                sample_count: record.len(),
            })
            .collect()
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl Index<usize> for Dataset {
    type Output = Record;

    fn index(&self, position: usize) -> &Record {
        &self.records[position]
    }
}

impl IntoIterator for Dataset {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiameterBin, HeaderMetadata, SampleTable, ScanMetadataTable};
    use chrono::NaiveDate;
    use chrono_tz::{Asia, UTC};
    use chrono_tz::Tz;

    fn at(day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(hour, minute, 0))
    }

    fn record(name: &str, zone: Option<Tz>, index: Vec<Option<NaiveDateTime>>) -> Record {
        let rows = vec![vec![Some(1.0)]; index.len()];
        let table = SampleTable::new(index.clone(), vec![DiameterBin::new("20.0", 20.0)], rows)
            .unwrap();
        let scans = ScanMetadataTable::new(index.clone(), vec![], vec![vec![]; index.len()])
            .unwrap();
        Record::from_parts(name, zone, table, scans, None, None, HeaderMetadata::new()).unwrap()
    }

    fn names(dataset: &Dataset) -> Vec<&str> {
        dataset.iter().map(Record::source_name).collect()
    }

    #[test]
    fn test_sort_orders_by_start_time() {
        let mut dataset = Dataset::new();
        dataset.add(record("c", None, vec![at(3, 0, 0), at(3, 1, 0)]));
        dataset.add(record("a", None, vec![at(1, 0, 0), at(1, 1, 0)]));
        dataset.add(record("b", None, vec![at(2, 0, 0), at(2, 1, 0)]));

        let overlaps = dataset.sort_by_time();

        assert!(overlaps.is_empty());
        assert_eq!(names(&dataset), vec!["a", "b", "c"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset[0].source_name(), "a");
    }

    #[test]
    fn test_sort_reports_overlap() {
        let mut dataset = Dataset::new();
        dataset.add(record("B", None, vec![at(1, 9, 30), at(1, 12, 0)]));
        dataset.add(record("A", None, vec![at(1, 8, 0), at(1, 10, 0)]));

        let overlaps = dataset.sort_by_time();

        assert_eq!(names(&dataset), vec!["A", "B"]);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].earlier, "A");
        assert_eq!(overlaps[0].later, "B");
        assert_eq!(overlaps[0].earlier_end, "2024-01-01 10:00:00");
        assert_eq!(overlaps[0].later_start, "2024-01-01 09:30:00");
        // Data is never altered by overlap detection
        assert_eq!(dataset[0].len(), 2);
        assert_eq!(dataset[1].len(), 2);
    }

    #[test]
    fn test_touching_spans_count_as_overlap() {
        let mut dataset = Dataset::new();
        dataset.add(record("a", None, vec![at(1, 0, 0), at(1, 10, 0)]));
        dataset.add(record("b", None, vec![at(1, 10, 0), at(1, 11, 0)]));
        assert_eq!(dataset.sort_by_time().len(), 1);
    }

    #[test]
    fn test_sort_is_stable_and_noop_for_small_sets() {
        let mut dataset = Dataset::new();
        assert!(dataset.sort_by_time().is_empty());

        dataset.add(record("first", None, vec![at(1, 0, 0)]));
        dataset.add(record("second", None, vec![at(1, 0, 0)]));
        dataset.add(record("empty", None, vec![]));
        dataset.sort_by_time();

        assert_eq!(names(&dataset), vec!["empty", "first", "second"]);
    }

    #[test]
    fn test_sort_twice_keeps_order_and_overlaps() {
        let mut dataset = Dataset::new();
        dataset.add(record("late", None, vec![at(2, 0, 0), at(2, 5, 0)]));
        dataset.add(record("tie_a", None, vec![at(1, 0, 0), at(1, 6, 0)]));
        dataset.add(record("missing", None, vec![None]));
        dataset.add(record("tie_b", None, vec![at(1, 0, 0), at(1, 2, 0)]));

        let first = dataset.sort_by_time();
        let order: Vec<String> = names(&dataset).into_iter().map(String::from).collect();
        let second = dataset.sort_by_time();

        assert_eq!(names(&dataset), order);
        assert_eq!(order, vec!["missing", "tie_a", "tie_b", "late"]);
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_sort_compares_zoned_records_by_instant() {
        // 08:00 Tokyo is 23:00 UTC the previous day
        let mut dataset = Dataset::new();
        dataset.add(record("utc", Some(UTC), vec![at(1, 0, 0)]));
        dataset.add(record("tokyo", Some(Asia::Tokyo), vec![at(1, 8, 0)]));
        dataset.sort_by_time();
        assert_eq!(names(&dataset), vec!["tokyo", "utc"]);
    }

    #[test]
    fn test_summary_and_bounds() {
        let dataset = Dataset::from(vec![
            record("a", None, vec![at(1, 0, 0), None]),
            record("b", None, vec![at(2, 6, 0)]),
        ]);

        let summary = dataset.time_range_summary();
        assert_eq!(summary[0].start, "2024-01-01 00:00:00");
        assert_eq!(summary[0].sample_count, 2);
        assert_eq!(dataset.sample_count(), 3);
        assert_eq!(
            dataset.time_bounds(),
            Some((at(1, 0, 0).unwrap(), at(2, 6, 0).unwrap()))
        );
        assert_eq!(dataset.get(2), None);
        assert_eq!((&dataset).into_iter().count(), 2);
    }
}
