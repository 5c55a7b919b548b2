//! The broadcast [Minute].
use std::{cmp::Ordering, fmt, hash::Hash};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use tracing::warn;

use crate::{
    codec,
    dst::{self, Dst},
    dut1::{Dut1Source, DUT1_MAX},
    prelude::*,
    timecode::Timecode,
};

/// First year representable by the two-digit broadcast year.
pub const FIRST_YEAR: u16 = 1970;
/// Last year representable by the two-digit broadcast year.
pub const LAST_YEAR: u16 = 2069;

/// Expand a two-digit year into the 1970..=2069 broadcast epoch.
///
/// 0–69 are 2000–2069 and 70–99 are 1970–1999. Full years already within the epoch
/// are returned unchanged.
///
/// # Errors
/// [Error::Year] for any other value.
pub fn expand_year(year: i32) -> Result<u16> {
    let full = match year {
        0..=69 => year + 2000,
        70..=99 => year + 1900,
        1970..=2069 => year,
        _ => return Err(Error::Year(year)),
    };
    u16::try_from(full).map_err(|_| Error::Year(year))
}

fn validate_time(hour: u8, minute: u8) -> Result<()> {
    if hour > 23 {
        return Err(Error::Hour(hour));
    }
    if minute > 59 {
        return Err(Error::Minute(minute));
    }
    Ok(())
}

fn epoch_date(year: u16, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(i32::from(year), month, day).expect("epoch bounds are valid dates")
}

fn next_day(date: NaiveDate) -> NaiveDate {
    match date.succ_opt() {
        Some(d) if d.year() <= i32::from(LAST_YEAR) => d,
        _ => epoch_date(FIRST_YEAR, 1, 1),
    }
}

fn prev_day(date: NaiveDate) -> NaiveDate {
    match date.pred_opt() {
        Some(d) if d.year() >= i32::from(FIRST_YEAR) => d,
        _ => epoch_date(LAST_YEAR, 12, 31),
    }
}

/// One broadcast minute.
///
/// Minutes compare, hash and order by their UTC date, hour and minute only; DUT1, DST
/// and the leap second flag are broadcast attributes of that time.
///
/// ```
/// use wwvb::Minute;
///
/// let a = Minute::new(69, 1, 0, 0).unwrap();
/// let b = Minute::new(2069, 1, 0, 0).unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Minute {
    date: NaiveDate,
    hour: u8,
    minute: u8,
    dut1: i8,
    leap_second: bool,
    dst: Dst,
}

impl Minute {
    /// Create a minute from a year, day of year, hour and minute.
    ///
    /// `year` may be a two-digit year, see [expand_year]. DUT1 is zero, there is no leap
    /// second and DST follows the US rules for the date.
    ///
    /// # Errors
    /// If any field is out of range.
    pub fn new(year: i32, yday: u16, hour: u8, minute: u8) -> Result<Self> {
        let full = expand_year(year)?;
        let date = NaiveDate::from_yo_opt(i32::from(full), u32::from(yday))
            .ok_or(Error::DayOfYear { year: full, yday })?;
        validate_time(hour, minute)?;
        Ok(Self::from_parts(date, hour, minute, 0, false, Dst::for_date(date)))
    }

    /// Create a minute from a calendar date, hour and minute. See [Minute::new].
    ///
    /// # Errors
    /// If any field is out of range.
    pub fn from_ymd(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> Result<Self> {
        let full = expand_year(year)?;
        let date = NaiveDate::from_ymd_opt(i32::from(full), u32::from(month), u32::from(day))
            .ok_or(Error::Date {
                year: full,
                month,
                day,
            })?;
        validate_time(hour, minute)?;
        Ok(Self::from_parts(date, hour, minute, 0, false, Dst::for_date(date)))
    }

    /// Create the minute containing `dt`, looking up DUT1 and leap seconds in `source`.
    ///
    /// Seconds are ignored.
    ///
    /// # Errors
    /// [Error::Year] if `dt` is outside 1970..=2069.
    pub fn from_datetime<S: Dut1Source + ?Sized>(dt: NaiveDateTime, source: &S) -> Result<Self> {
        let year = dt.year();
        if !(i32::from(FIRST_YEAR)..=i32::from(LAST_YEAR)).contains(&year) {
            return Err(Error::Year(year));
        }
        // chrono hours and minutes always fit
        Ok(Self::derive(
            dt.date(),
            dt.hour() as u8,
            dt.minute() as u8,
            source,
        ))
    }

    /// See [Minute::from_datetime].
    ///
    /// # Errors
    /// [Error::Year] if `dt` is outside 1970..=2069.
    pub fn from_utc<S: Dut1Source + ?Sized>(dt: DateTime<Utc>, source: &S) -> Result<Self> {
        Self::from_datetime(dt.naive_utc(), source)
    }

    fn derive<S: Dut1Source + ?Sized>(date: NaiveDate, hour: u8, minute: u8, source: &S) -> Self {
        let mut dut1 = source.dut1(date);
        if dut1.abs() > DUT1_MAX {
            warn!(%date, dut1, "DUT1 from source out of range, clamping");
            dut1 = dut1.clamp(-DUT1_MAX, DUT1_MAX);
        }
        let leap_second = hour == 23 && minute == 59 && source.leap_second(date);
        Self::from_parts(date, hour, minute, dut1, leap_second, Dst::for_date(date))
    }

    /// Fields must already be validated.
    pub(crate) fn from_parts(
        date: NaiveDate,
        hour: u8,
        minute: u8,
        dut1: i8,
        leap_second: bool,
        dst: Dst,
    ) -> Self {
        Minute {
            date,
            hour,
            minute,
            dut1,
            leap_second,
            dst,
        }
    }

    /// Set DUT1, in deciseconds.
    ///
    /// # Errors
    /// [Error::Dut1] if `dut1` is not within +/-7.
    pub fn with_dut1(mut self, dut1: i8) -> Result<Self> {
        if dut1.abs() > DUT1_MAX {
            return Err(Error::Dut1(dut1));
        }
        self.dut1 = dut1;
        Ok(self)
    }

    /// Flag a leap second inserted at the end of this minute.
    ///
    /// # Errors
    /// [Error::LeapSecond] if set on any minute other than 23:59.
    pub fn with_leap_second(mut self, leap_second: bool) -> Result<Self> {
        if leap_second && (self.hour, self.minute) != (23, 59) {
            return Err(Error::LeapSecond {
                hour: self.hour,
                minute: self.minute,
            });
        }
        self.leap_second = leap_second;
        Ok(self)
    }

    #[must_use]
    pub fn with_dst(mut self, dst: Dst) -> Self {
        self.dst = dst;
        self
    }

    /// The next minute, with broadcast attributes recomputed from `source`.
    ///
    /// The successor of the last minute of 2069 is the first minute of 1970.
    #[must_use]
    pub fn successor<S: Dut1Source + ?Sized>(&self, source: &S) -> Minute {
        let (date, hour, minute) = match (self.hour, self.minute) {
            (23, 59) => (next_day(self.date), 0, 0),
            (h, 59) => (self.date, h + 1, 0),
            (h, m) => (self.date, h, m + 1),
        };
        Self::derive(date, hour, minute, source)
    }

    /// The previous minute, with broadcast attributes recomputed from `source`.
    ///
    /// Exact inverse of [Minute::successor].
    #[must_use]
    pub fn predecessor<S: Dut1Source + ?Sized>(&self, source: &S) -> Minute {
        let (date, hour, minute) = match (self.hour, self.minute) {
            (0, 0) => (prev_day(self.date), 23, 59),
            (h, 0) => (self.date, h - 1, 59),
            (h, m) => (self.date, h, m - 1),
        };
        Self::derive(date, hour, minute, source)
    }

    /// Encode as a broadcast time code. See [codec::encode].
    #[must_use]
    pub fn encode(&self) -> Timecode {
        codec::encode(self)
    }

    /// Decode a broadcast time code. See [codec::decode].
    #[must_use]
    pub fn decode(timecode: &Timecode) -> Option<Minute> {
        codec::decode(timecode)
    }

    #[must_use]
    pub fn year(&self) -> u16 {
        // always within the epoch
        self.date.year() as u16
    }

    /// Day of year, 1-based.
    #[must_use]
    pub fn yday(&self) -> u16 {
        self.date.ordinal() as u16
    }

    #[must_use]
    pub fn month(&self) -> u8 {
        self.date.month() as u8
    }

    #[must_use]
    pub fn day(&self) -> u8 {
        self.date.day() as u8
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// UT1-UTC in deciseconds.
    #[must_use]
    pub fn dut1(&self) -> i8 {
        self.dut1
    }

    #[must_use]
    pub fn leap_year(&self) -> bool {
        dst::is_leap_year(self.date.year())
    }

    /// True if a leap second is inserted at the end of this minute.
    #[must_use]
    pub fn leap_second(&self) -> bool {
        self.leap_second
    }

    #[must_use]
    pub fn dst(&self) -> Dst {
        self.dst
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Number of seconds, and therefore symbols, in this minute.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        if self.leap_second {
            Timecode::LEAP_LEN
        } else {
            Timecode::LEN
        }
    }

    /// Start of this minute.
    #[must_use]
    pub fn to_datetime(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
            + Duration::minutes(i64::from(self.hour) * 60 + i64::from(self.minute))
    }

    /// Start of this minute in UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.to_datetime())
    }

    fn key(&self) -> (NaiveDate, u8, u8) {
        (self.date, self.hour, self.minute)
    }
}

impl PartialEq for Minute {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Minute {}

impl Hash for Minute {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Minute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Minute {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:03} {:02}:{:02} UTC",
            self.year(),
            self.yday(),
            self.hour,
            self.minute
        )
    }
}
