//! Phase modulated time code.
//!
//! The phase channel carries a fixed sync word, the minute of the century protected
//! by a Hamming style parity, and DST/leap second schedule codes.
use chrono::{Datelike, Days, NaiveDate};

use crate::{
    dst,
    minute::Minute,
    timecode::{PhaseModulation, Timecode},
};

/// Seconds 0 through 12.
const SYNC_WORD: [bool; 13] = [
    false, false, true, true, true, false, true, true, false, true, false, false, false,
];

/// Parity masks over the 26-bit minute of century, seconds 13 through 17.
const PARITY_MASKS: [u32; 5] = [0x259_F1BA, 0x12C_F8DD, 0x2CF_8DD4, 0x167_C6EA, 0x0B3_E375];

/// Indexed by `dst bits + 4 * leap second`.
const DST_LEAP_CODES: [u8; 8] = [0x10, 0x25, 0x26, 0x03, 0x31, 0x34, 0x32, 0x37];

/// Rows are the Sundays from the first Sunday of March, columns are 1, 2 and 3am.
const NEXT_DST_SPRING: [u8; 24] = [
    0x31, 0x2A, 0x04, 0x26, 0x1B, 0x20, 0x25, 0x0E, 0x34, 0x15, 0x01, 0x2C, 0x3E, 0x02, 0x38,
    0x16, 0x08, 0x10, 0x37, 0x0D, 0x32, 0x3D, 0x29, 0x1C,
];

/// Rows are the Sundays from four weeks before the first Sunday of November, columns are
/// 1, 2 and 3am.
const NEXT_DST_FALL: [u8; 24] = [
    0x37, 0x0D, 0x32, 0x15, 0x01, 0x2C, 0x31, 0x2A, 0x04, 0x16, 0x08, 0x10, 0x26, 0x1B, 0x20,
    0x3E, 0x02, 0x38, 0x25, 0x0E, 0x34, 0x3D, 0x29, 0x1C,
];

/// Sent when the next transition is not in the schedule tables.
const NEXT_DST_UNKNOWN: u8 = 0x23;

/// Column of the 2am local transition.
const TRANSITION_HOUR_COLUMN: usize = 1;

/// Minutes since the start of the century; 2000 for 2000-2069, 1900 for 1970-1999.
#[must_use]
pub fn minute_of_century(minute: &Minute) -> u32 {
    let century = if minute.year() >= 2000 { 2000 } else { 1900 };
    let days: u32 = (century..minute.year())
        .map(|y| u32::from(dst::days_in_year(i32::from(y))))
        .sum::<u32>()
        + u32::from(minute.yday())
        - 1;
    days * 1440 + u32::from(minute.hour()) * 60 + u32::from(minute.minute())
}

fn parity(value: u32, mask: u32) -> bool {
    (value & mask).count_ones() % 2 == 1
}

fn push_bits(out: &mut Vec<PhaseModulation>, value: u32, msb: u32, count: u32) {
    for i in 0..count {
        let shift = msb - i;
        out.push(PhaseModulation::from_bit((value >> shift) & 1 == 1));
    }
}

fn schedule_code(table: &[u8; 24], origin: NaiveDate, transition: NaiveDate) -> u8 {
    let days = transition.signed_duration_since(origin).num_days();
    if days < 0 || days % 7 != 0 {
        return NEXT_DST_UNKNOWN;
    }
    let idx = usize::try_from(days / 7).unwrap_or(usize::MAX).saturating_mul(3)
        + TRANSITION_HOUR_COLUMN;
    table.get(idx).copied().unwrap_or(NEXT_DST_UNKNOWN)
}

fn first_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, chrono::Weekday::Sun, 1)
}

/// 6-bit code announcing the date of the next DST transition.
#[must_use]
pub fn next_dst_code(minute: &Minute) -> u8 {
    let date = minute.date();
    let year = date.year();
    if minute.dst().at_end_of_day() {
        let Some((_, end)) = dst::transitions(year) else {
            return NEXT_DST_UNKNOWN;
        };
        first_sunday(year, 11)
            .and_then(|d| d.checked_sub_days(Days::new(28)))
            .map_or(NEXT_DST_UNKNOWN, |origin| {
                schedule_code(&NEXT_DST_FALL, origin, end)
            })
    } else {
        let year = match dst::transitions(year) {
            Some((begin, _)) if date < begin => year,
            _ => year + 1,
        };
        let Some((begin, _)) = dst::transitions(year) else {
            return NEXT_DST_UNKNOWN;
        };
        first_sunday(year, 3).map_or(NEXT_DST_UNKNOWN, |origin| {
            schedule_code(&NEXT_DST_SPRING, origin, begin)
        })
    }
}

/// Phase symbols for `minute`, one per second.
#[must_use]
pub fn encode(minute: &Minute) -> Vec<PhaseModulation> {
    let moc = minute_of_century(minute);
    let mut out = Vec::with_capacity(minute.symbol_count());

    out.extend(SYNC_WORD.iter().map(|b| PhaseModulation::from_bit(*b)));
    out.extend(
        PARITY_MASKS
            .iter()
            .map(|m| PhaseModulation::from_bit(parity(moc, *m))),
    );
    push_bits(&mut out, moc, 25, 1);
    push_bits(&mut out, moc, 0, 1);
    push_bits(&mut out, moc, 24, 9);
    out.push(PhaseModulation::Zero);
    push_bits(&mut out, moc, 15, 9);
    out.push(PhaseModulation::Zero);
    push_bits(&mut out, moc, 6, 7);

    let idx = usize::from(minute.dst().bits()) + 4 * usize::from(minute.leap_second());
    push_bits(&mut out, u32::from(DST_LEAP_CODES[idx]), 5, 6);
    push_bits(&mut out, u32::from(next_dst_code(minute)), 5, 6);
    out.push(PhaseModulation::Zero);

    if minute.leap_second() {
        out.push(PhaseModulation::Zero);
    }
    debug_assert_eq!(out.len(), minute.symbol_count());
    debug_assert!(out.len() <= Timecode::LEAP_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dst::Dst;

    fn to_u64(phase: &[PhaseModulation]) -> u64 {
        phase[..60]
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == PhaseModulation::One)
            .fold(0u64, |acc, (i, _)| acc | (1 << (63 - i)))
    }

    #[test]
    fn minute_of_century_by_era() {
        let m = Minute::new(2012, 186, 17, 30).unwrap();
        assert_eq!(minute_of_century(&m), 6_578_970);
        let m = Minute::new(2000, 1, 0, 0).unwrap();
        assert_eq!(minute_of_century(&m), 0);
        let m = Minute::new(1970, 1, 0, 1).unwrap();
        assert_eq!(minute_of_century(&m), 36_816_481);
    }

    #[test]
    fn known_vectors() {
        let m = Minute::new(2012, 186, 17, 30).unwrap();
        assert_eq!(next_dst_code(&m), 0x1B);
        assert_eq!(to_u64(&encode(&m)), 0x3B44_8321_8C34_1B60);

        let m = Minute::new(2024, 147, 16, 57).unwrap();
        assert_eq!(minute_of_century(&m), 12_834_297);
        assert_eq!(to_u64(&encode(&m)), 0x3B40_161B_56F2_1B60);
    }

    #[test]
    fn spring_schedule() {
        // standard time, next transition is the 2nd Sunday of March
        let m = Minute::from_ymd(2024, 1, 15, 0, 0).unwrap();
        assert_eq!(m.dst(), Dst::Standard);
        assert_eq!(next_dst_code(&m), NEXT_DST_SPRING[4]);
        // after the fall transition the next one is in the following year
        let m = Minute::from_ymd(2024, 12, 1, 0, 0).unwrap();
        assert_eq!(next_dst_code(&m), NEXT_DST_SPRING[4]);
        // 1992 began on the 1st Sunday of April, 5 weeks after the 1st Sunday of March
        let m = Minute::from_ymd(1992, 1, 15, 0, 0).unwrap();
        assert_eq!(next_dst_code(&m), NEXT_DST_SPRING[16]);
    }

    #[test]
    fn unscheduled_transitions() {
        let m = Minute::from_ymd(1970, 1, 1, 0, 0)
            .unwrap()
            .with_dst(Dst::Daylight);
        // 1970 ends on the last Sunday of October, 3 weeks into the table
        assert_eq!(next_dst_code(&m), NEXT_DST_FALL[10]);
        assert_eq!(schedule_code(&NEXT_DST_FALL, m.date(), m.date()), NEXT_DST_FALL[1]);
        let late = m.date().checked_add_days(Days::new(8 * 7)).unwrap();
        assert_eq!(schedule_code(&NEXT_DST_FALL, m.date(), late), NEXT_DST_UNKNOWN);
        let odd = m.date().checked_add_days(Days::new(3)).unwrap();
        assert_eq!(schedule_code(&NEXT_DST_FALL, m.date(), odd), NEXT_DST_UNKNOWN);
    }

    #[test]
    fn leap_second_extends_phase() {
        let m = Minute::from_ymd(2016, 12, 31, 23, 59)
            .unwrap()
            .with_leap_second(true)
            .unwrap();
        let phase = encode(&m);
        assert_eq!(phase.len(), 61);
        assert_eq!(phase[60], PhaseModulation::Zero);
    }
}
