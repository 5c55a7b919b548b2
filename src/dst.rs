//! Calendar helpers: leap years and US daylight saving time.
//!
//! WWVB announces whether daylight saving time is in effect at the start (00:00 UTC)
//! and at the end (24:00 UTC) of the current UTC day. The transition dates follow the
//! US federal rules; transitions take effect at 02:00 local time, which is after
//! 00:00 UTC of the same calendar date everywhere in the continental US.
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Proleptic Gregorian leap year.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[must_use]
pub fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn last_sunday(year: i32, month: u32, last_day: u32) -> Option<NaiveDate> {
    let d = NaiveDate::from_ymd_opt(year, month, last_day)?;
    d.checked_sub_days(chrono::Days::new(u64::from(d.weekday().num_days_from_sunday())))
}

fn nth_sunday(year: i32, month: u32, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, n)
}

/// Dates on which US daylight saving time begins and ends in `year`, or `None` for
/// years before the Uniform Time Act.
///
/// Includes the 1974 and 1975 emergency energy conservation start dates.
#[must_use]
pub fn transitions(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let (begin, end) = match year {
        2007.. => (nth_sunday(year, 3, 2)?, nth_sunday(year, 11, 1)?),
        1987..=2006 => (nth_sunday(year, 4, 1)?, last_sunday(year, 10, 31)?),
        1974 => (NaiveDate::from_ymd_opt(1974, 1, 6)?, last_sunday(year, 10, 31)?),
        1975 => (NaiveDate::from_ymd_opt(1975, 2, 23)?, last_sunday(year, 10, 31)?),
        1967..=1986 => (last_sunday(year, 4, 30)?, last_sunday(year, 10, 31)?),
        _ => return None,
    };
    Some((begin, end))
}

/// Whether daylight saving time is in effect at 00:00 UTC on `date`.
#[must_use]
pub fn in_effect(date: NaiveDate) -> bool {
    match transitions(date.year()) {
        Some((begin, end)) => begin < date && date <= end,
        None => false,
    }
}

/// Daylight saving time state of a UTC day.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dst {
    /// Standard time all day.
    #[default]
    Standard,
    /// Standard time at the start of the day, daylight time at the end.
    Begins,
    /// Daylight time at the start of the day, standard time at the end.
    Ends,
    /// Daylight time all day.
    Daylight,
}

impl Dst {
    /// Legal on-air codes; `(end of day << 1) | start of day`.
    const CODES: [(u8, Dst); 4] = [
        (0b00, Dst::Standard),
        (0b10, Dst::Begins),
        (0b01, Dst::Ends),
        (0b11, Dst::Daylight),
    ];

    #[must_use]
    pub fn new(start_of_day: bool, end_of_day: bool) -> Self {
        match (start_of_day, end_of_day) {
            (false, false) => Dst::Standard,
            (false, true) => Dst::Begins,
            (true, false) => Dst::Ends,
            (true, true) => Dst::Daylight,
        }
    }

    /// State for `date` under the US rules.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        let tomorrow = date.succ_opt().map_or(false, in_effect);
        Dst::new(in_effect(date), tomorrow)
    }

    /// The 2-bit on-air code, second 57 in the high bit and second 58 in the low bit.
    #[must_use]
    pub fn bits(self) -> u8 {
        Self::CODES
            .iter()
            .find(|(_, dst)| *dst == self)
            .map_or(0, |(code, _)| *code)
    }

    /// Look `bits` up in the table of legal codes.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::CODES
            .iter()
            .find(|(code, _)| *code == bits)
            .map(|(_, dst)| *dst)
    }

    /// Daylight time in effect at 24:00 UTC.
    #[must_use]
    pub fn at_end_of_day(self) -> bool {
        matches!(self, Dst::Begins | Dst::Daylight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(1992));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(2069), 365);
    }

    #[test]
    fn transitions_by_era() {
        assert_eq!(
            transitions(2024),
            Some((date(2024, 3, 10), date(2024, 11, 3)))
        );
        assert_eq!(transitions(1992), Some((date(1992, 4, 5), date(1992, 10, 25))));
        assert_eq!(transitions(1980), Some((date(1980, 4, 27), date(1980, 10, 26))));
        assert_eq!(transitions(1960), None);
    }

    #[test]
    fn emergency_daylight_time() {
        assert_eq!(transitions(1974), Some((date(1974, 1, 6), date(1974, 10, 27))));
        assert_eq!(transitions(1975), Some((date(1975, 2, 23), date(1975, 10, 26))));
        assert_eq!(transitions(1976), Some((date(1976, 4, 25), date(1976, 10, 31))));
        assert_eq!(Dst::for_date(date(1974, 1, 5)), Dst::Standard);
        assert_eq!(Dst::for_date(date(1974, 1, 6)), Dst::Begins);
        assert_eq!(Dst::for_date(date(1974, 2, 1)), Dst::Daylight);
        assert_eq!(Dst::for_date(date(1975, 2, 23)), Dst::Begins);
    }

    #[test]
    fn states_around_transitions() {
        assert_eq!(Dst::for_date(date(2024, 3, 9)), Dst::Standard);
        assert_eq!(Dst::for_date(date(2024, 3, 10)), Dst::Begins);
        assert_eq!(Dst::for_date(date(2024, 3, 11)), Dst::Daylight);
        assert_eq!(Dst::for_date(date(2024, 11, 2)), Dst::Daylight);
        assert_eq!(Dst::for_date(date(2024, 11, 3)), Dst::Ends);
        assert_eq!(Dst::for_date(date(2024, 11, 4)), Dst::Standard);
        assert_eq!(Dst::for_date(date(2024, 12, 31)), Dst::Standard);
    }

    #[test]
    fn codes_round_trip() {
        for bits in 0..4u8 {
            let dst = Dst::from_bits(bits).unwrap();
            assert_eq!(dst.bits(), bits);
        }
        assert_eq!(Dst::from_bits(0b100), None);
        assert_eq!(Dst::Begins.bits(), 0b10);
        assert_eq!(Dst::Ends.bits(), 0b01);
    }
}
