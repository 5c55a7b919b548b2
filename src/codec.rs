//! Amplitude time code encoding and decoding.
//!
//! Field values are sent as BCD digits, most significant bit first. Each digit is a
//! group of consecutive seconds with a decimal scale.
use chrono::NaiveDate;
use tracing::trace;

use crate::{
    dst::{self, Dst},
    dut1::DUT1_MAX,
    minute::{expand_year, Minute},
    phase,
    prelude::*,
    timecode::{AmplitudeModulation, Timecode, ALWAYS_ZERO, MARKERS},
};

/// A BCD digit: its seconds, most significant first, and its decimal scale.
struct Digit {
    seconds: &'static [usize],
    scale: u16,
}

const fn digit(seconds: &'static [usize], scale: u16) -> Digit {
    Digit { seconds, scale }
}

const MINUTE: [Digit; 2] = [digit(&[1, 2, 3], 10), digit(&[5, 6, 7, 8], 1)];
const HOUR: [Digit; 2] = [digit(&[12, 13], 10), digit(&[15, 16, 17, 18], 1)];
const YDAY: [Digit; 3] = [
    digit(&[22, 23], 100),
    digit(&[25, 26, 27, 28], 10),
    digit(&[30, 31, 32, 33], 1),
];
const DUT1_MAGNITUDE: [Digit; 1] = [digit(&[40, 41, 42, 43], 1)];
const YEAR: [Digit; 2] = [digit(&[45, 46, 47, 48], 10), digit(&[50, 51, 52, 53], 1)];

/// DUT1 sign; only these two codes are ever transmitted.
const DUT1_SIGN: [usize; 3] = [36, 37, 38];
const DUT1_POSITIVE: u8 = 0b101;
const DUT1_NEGATIVE: u8 = 0b010;

const LEAP_YEAR: usize = 55;
const LEAP_SECOND: usize = 56;
/// Daylight time at the end of the day, then at the start.
const DST: [usize; 2] = [57, 58];

/// Second of the extra marker in a leap second minute.
const LEAP_MARKER: usize = 60;

fn write_bits(am: &mut [AmplitudeModulation], seconds: &[usize], value: u16) {
    for (i, pos) in seconds.iter().enumerate() {
        let shift = seconds.len() - 1 - i;
        am[*pos] = AmplitudeModulation::from_bit((value >> shift) & 1 == 1);
    }
}

fn write_field(am: &mut [AmplitudeModulation], digits: &[Digit], value: u16) {
    for d in digits {
        write_bits(am, d.seconds, (value / d.scale) % 10);
    }
}

fn read_bits(am: &[AmplitudeModulation], seconds: &[usize]) -> u16 {
    seconds.iter().fold(0, |acc, pos| {
        (acc << 1) | u16::from(am[*pos] == AmplitudeModulation::One)
    })
}

fn read_field(
    am: &[AmplitudeModulation],
    digits: &[Digit],
) -> std::result::Result<u16, DecodeError> {
    digits.iter().try_fold(0, |acc, d| {
        let value = read_bits(am, d.seconds);
        if value > 9 {
            return Err(DecodeError::Digit(d.seconds[0]));
        }
        Ok(acc + value * d.scale)
    })
}

/// Encode `minute` as its broadcast time code, including phase symbols.
///
/// The time code has 61 symbols if the minute carries a leap second.
#[must_use]
pub fn encode(minute: &Minute) -> Timecode {
    let mut am = vec![AmplitudeModulation::Zero; minute.symbol_count()];
    for pos in MARKERS {
        am[pos] = AmplitudeModulation::Marker;
    }
    if minute.leap_second() {
        am[LEAP_MARKER] = AmplitudeModulation::Marker;
    }

    write_field(&mut am, &MINUTE, u16::from(minute.minute()));
    write_field(&mut am, &HOUR, u16::from(minute.hour()));
    write_field(&mut am, &YDAY, minute.yday());
    write_field(&mut am, &YEAR, minute.year() % 100);

    let sign = if minute.dut1() < 0 {
        DUT1_NEGATIVE
    } else {
        DUT1_POSITIVE
    };
    write_bits(&mut am, &DUT1_SIGN, u16::from(sign));
    write_field(&mut am, &DUT1_MAGNITUDE, u16::from(minute.dut1().unsigned_abs()));

    am[LEAP_YEAR] = AmplitudeModulation::from_bit(minute.leap_year());
    am[LEAP_SECOND] = AmplitudeModulation::from_bit(minute.leap_second());
    write_bits(&mut am, &DST, u16::from(minute.dst().bits()));

    Timecode::from_parts(am, Some(phase::encode(minute)))
}

fn check_framing(am: &[AmplitudeModulation]) -> std::result::Result<(), DecodeError> {
    for (pos, sym) in am.iter().enumerate() {
        let marker_expected = MARKERS.contains(&pos) || pos == LEAP_MARKER;
        match (marker_expected, sym.is_marker()) {
            (true, false) => return Err(DecodeError::MissingMarker(pos)),
            (false, true) => return Err(DecodeError::UnexpectedMarker(pos)),
            _ => {}
        }
    }
    if let Some(pos) = ALWAYS_ZERO
        .iter()
        .find(|pos| am[**pos] != AmplitudeModulation::Zero)
    {
        return Err(DecodeError::NonZero(*pos));
    }
    Ok(())
}

/// Decode a time code, reporting why it was rejected.
///
/// Only amplitude symbols are considered. Checks are applied in a fixed order and the
/// first failure is returned.
///
/// # Errors
/// A [DecodeError] describing the first violated check.
pub fn try_decode(timecode: &Timecode) -> std::result::Result<Minute, DecodeError> {
    let am = timecode.am();
    if !matches!(am.len(), Timecode::LEN | Timecode::LEAP_LEN) {
        return Err(DecodeError::Length(am.len()));
    }
    check_framing(am)?;

    // only the low 3 bits are read
    let sign = read_bits(am, &DUT1_SIGN) as u8;
    let negative = match sign {
        DUT1_POSITIVE => false,
        DUT1_NEGATIVE => true,
        code => return Err(DecodeError::Dut1Sign(code)),
    };
    let dst_code = read_bits(am, &DST) as u8;
    let dst = Dst::from_bits(dst_code).ok_or(DecodeError::Dst(dst_code))?;

    let minute = read_field(am, &MINUTE)?;
    let hour = read_field(am, &HOUR)?;
    let yday = read_field(am, &YDAY)?;
    let magnitude = read_field(am, &DUT1_MAGNITUDE)?;
    let year = read_field(am, &YEAR)?;

    let year = expand_year(i32::from(year))
        .map_err(|_| DecodeError::Digit(YEAR[0].seconds[0]))?;
    let leap_year = am[LEAP_YEAR] == AmplitudeModulation::One;
    if leap_year != dst::is_leap_year(i32::from(year)) {
        return Err(DecodeError::LeapYear(year));
    }
    let date = NaiveDate::from_yo_opt(i32::from(year), u32::from(yday))
        .ok_or(DecodeError::DayOfYear { year, yday })?;

    // at most 39 and 79
    let hour = hour as u8;
    let minute = minute as u8;
    if hour > 23 {
        return Err(DecodeError::Hour(hour));
    }
    if minute > 59 {
        return Err(DecodeError::Minute(minute));
    }

    let magnitude = magnitude as u8;
    if magnitude > DUT1_MAX.unsigned_abs() {
        return Err(DecodeError::Dut1(magnitude));
    }
    let dut1 = if negative {
        -(magnitude as i8)
    } else {
        magnitude as i8
    };

    let leap_second = am[LEAP_SECOND] == AmplitudeModulation::One;
    if leap_second && (hour, minute) != (23, 59) {
        return Err(DecodeError::LeapSecond);
    }
    if timecode.has_leap_second() && !leap_second {
        return Err(DecodeError::LeapSecondLength);
    }

    Ok(Minute::from_parts(date, hour, minute, dut1, leap_second, dst))
}

/// Decode a time code, or `None` if it is not a valid broadcast minute.
///
/// See [try_decode].
#[must_use]
pub fn decode(timecode: &Timecode) -> Option<Minute> {
    match try_decode(timecode) {
        Ok(minute) => Some(minute),
        Err(err) => {
            trace!(%err, timecode = %timecode, "rejected timecode");
            None
        }
    }
}
