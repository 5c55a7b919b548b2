//! UT1-UTC (DUT1) offsets and leap second announcements.
//!
//! Minutes derived from civil time need the DUT1 value broadcast on their date and
//! whether a leap second is inserted at the end of that date. Both come from a
//! [Dut1Source], which is passed explicitly wherever a minute is computed.
use std::{fs, path::Path};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::{minute::LAST_YEAR, prelude::*};

/// Largest DUT1 magnitude, in deciseconds.
pub const DUT1_MAX: i8 = 7;

/// Provides DUT1 offsets and leap second announcements by UTC date.
pub trait Dut1Source {
    /// DUT1 in deciseconds on `date`, within +/-[DUT1_MAX].
    fn dut1(&self, date: NaiveDate) -> i8;

    /// Whether a positive leap second is inserted at the end of `date`.
    ///
    /// The default infers it from DUT1 jumping from negative to positive by more
    /// than half a second between `date` and the following day.
    fn leap_second(&self, date: NaiveDate) -> bool {
        let Some(next) = date.succ_opt() else {
            return false;
        };
        let today = self.dut1(date);
        let tomorrow = self.dut1(next);
        today < 0 && tomorrow > 0 && tomorrow - today > 5
    }
}

impl<T: Dut1Source + ?Sized> Dut1Source for &T {
    fn dut1(&self, date: NaiveDate) -> i8 {
        (**self).dut1(date)
    }

    fn leap_second(&self, date: NaiveDate) -> bool {
        (**self).leap_second(date)
    }
}

/// Daily DUT1 offsets starting at a fixed date.
///
/// Lookups before the first day return the first offset and lookups after the last
/// day return the last offset. A table may not extend past the end of [LAST_YEAR].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    start: NaiveDate,
    #[serde(skip)]
    end: NaiveDate,
    offsets: Vec<i8>,
}

/// Last day of a table beginning at `start` with `days` entries.
fn table_end(start: NaiveDate, days: usize) -> Result<NaiveDate> {
    if days == 0 {
        return Err(Error::OffsetTable("no offsets".to_string()));
    }
    start
        .checked_add_days(Days::new(days as u64 - 1))
        .filter(|end| end.year() <= i32::from(LAST_YEAR))
        .ok_or_else(|| {
            Error::OffsetTable(format!(
                "{days} days from {start} extends past the end of {LAST_YEAR}"
            ))
        })
}

/// Run-length encoded file representation of an [OffsetTable].
#[derive(Serialize, Deserialize, Debug)]
struct TableFile {
    start: NaiveDate,
    /// `(offset, number of days)`
    runs: Vec<(i8, u32)>,
}

impl OffsetTable {
    /// Create a table with one offset per day beginning at `start`.
    ///
    /// # Errors
    /// [Error::OffsetTable] if `offsets` is empty, extends past [LAST_YEAR], or any
    /// value is out of range.
    pub fn new(start: NaiveDate, offsets: Vec<i8>) -> Result<Self> {
        let end = table_end(start, offsets.len())?;
        if let Some((idx, val)) = offsets
            .iter()
            .enumerate()
            .find(|(_, v)| v.abs() > DUT1_MAX)
        {
            return Err(Error::OffsetTable(format!(
                "offset {val} at day {idx} out of range"
            )));
        }
        Ok(OffsetTable {
            start,
            end,
            offsets,
        })
    }

    /// Create a table from `(offset, days)` runs beginning at `start`.
    ///
    /// The total length is checked before any offsets are expanded.
    ///
    /// # Errors
    /// See [OffsetTable::new].
    pub fn from_runs(start: NaiveDate, runs: &[(i8, u32)]) -> Result<Self> {
        let days = runs
            .iter()
            .try_fold(0usize, |acc, (_, count)| acc.checked_add(*count as usize))
            .ok_or_else(|| Error::OffsetTable("run lengths overflow".to_string()))?;
        table_end(start, days)?;
        let offsets = runs
            .iter()
            .flat_map(|(val, count)| std::iter::repeat(*val).take(*count as usize))
            .collect();
        Self::new(start, offsets)
    }

    /// Parse a table from JSON of the form `{"start": "1972-06-01", "runs": [[-2, 30], ...]}`.
    ///
    /// # Errors
    /// [Error::Json] if the document is malformed, otherwise see [OffsetTable::new].
    pub fn from_json(content: &str) -> Result<Self> {
        let file: TableFile = serde_json::from_str(content)?;
        let table = Self::from_runs(file.start, &file.runs)?;
        debug!(start = %table.start, end = %table.end(), "loaded offset table");
        Ok(table)
    }

    /// Read a JSON table, see [OffsetTable::from_json].
    ///
    /// # Errors
    /// [Error::Io] if the file cannot be read, otherwise see [OffsetTable::from_json].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    /// Serialize to the run-length encoded JSON form read by [OffsetTable::from_json].
    ///
    /// # Errors
    /// [Error::Json] on serialization failure.
    pub fn to_json(&self) -> Result<String> {
        let mut runs: Vec<(i8, u32)> = Vec::new();
        for val in &self.offsets {
            match runs.last_mut() {
                Some((last, count)) if last == val => *count += 1,
                _ => runs.push((*val, 1)),
            }
        }
        Ok(serde_json::to_string(&TableFile {
            start: self.start,
            runs,
        })?)
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date with a table entry.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl Dut1Source for OffsetTable {
    fn dut1(&self, date: NaiveDate) -> i8 {
        let days = date.signed_duration_since(self.start).num_days();
        let idx = usize::try_from(days.max(0))
            .unwrap_or(usize::MAX)
            .min(self.offsets.len() - 1);
        self.offsets[idx]
    }
}

/// A fixed DUT1 value with an optional leap second forced at the end of every month.
///
/// DUT1 is not adjusted for a forced leap second. A real announcement has DUT1 near
/// -0.5 s beforehand, so set `dut1` to `-5` explicitly to model one.
///
/// ```
/// use wwvb::{Dut1Source, FixedDut1};
/// use chrono::NaiveDate;
///
/// let source = FixedDut1::builder().dut1(-5).leap_second(true).build();
/// assert!(source.leap_second(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
/// assert!(!source.leap_second(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()));
///
/// let source = FixedDut1::builder().leap_second(true).build();
/// assert_eq!(source.dut1(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()), 0);
/// ```
#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedDut1 {
    #[builder(default)]
    pub dut1: i8,
    #[builder(default)]
    pub leap_second: bool,
}

impl Dut1Source for FixedDut1 {
    fn dut1(&self, _date: NaiveDate) -> i8 {
        self.dut1
    }

    fn leap_second(&self, date: NaiveDate) -> bool {
        self.leap_second && date.succ_opt().map_or(false, |d| d.day() == 1)
    }
}
