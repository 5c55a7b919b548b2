/// Errors constructing minutes, time codes and offset tables.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("year {0} is not a two-digit year or within 1970..=2069")]
    Year(i32),
    #[error("day of year {yday} out of range for {year}")]
    DayOfYear { year: u16, yday: u16 },
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    Date { year: u16, month: u8, day: u8 },
    #[error("hour {0} out of range")]
    Hour(u8),
    #[error("minute {0} out of range")]
    Minute(u8),
    #[error("DUT1 {0} out of range; must be within +/-7 deciseconds")]
    Dut1(i8),
    /// The leap second flag is only valid on the last minute of a UTC day.
    #[error("leap second flag set at {hour:02}:{minute:02}; only valid at 23:59")]
    LeapSecond { hour: u8, minute: u8 },

    #[error("time code must have 60 or 61 symbols; got {0}")]
    TimecodeLength(usize),
    #[error("phase length {phase} does not match amplitude length {amplitude}")]
    PhaseLength { amplitude: usize, phase: usize },

    #[error("invalid offset table: {0}")]
    OffsetTable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a received time code fails to decode, in the order they are checked.
///
/// Positions are 0-based seconds within the minute.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeError {
    #[error("time code must have 60 or 61 symbols; got {0}")]
    Length(usize),
    #[error("missing marker at second {0}")]
    MissingMarker(usize),
    #[error("unexpected marker at second {0}")]
    UnexpectedMarker(usize),
    #[error("non-zero symbol at always-zero second {0}")]
    NonZero(usize),
    #[error("impossible DUT1 sign bits {0:#05b}")]
    Dut1Sign(u8),
    #[error("impossible DST bits {0:#04b}")]
    Dst(u8),
    #[error("BCD digit starting at second {0} is greater than 9")]
    Digit(usize),
    #[error("day of year {yday} out of range for {year}")]
    DayOfYear { year: u16, yday: u16 },
    #[error("leap year indicator does not agree with year {0}")]
    LeapYear(u16),
    #[error("hour {0} out of range")]
    Hour(u8),
    #[error("minute {0} out of range")]
    Minute(u8),
    #[error("DUT1 magnitude {0} out of range")]
    Dut1(u8),
    #[error("leap second flag set outside the last minute of the day")]
    LeapSecond,
    #[error("61 second time code without a leap second flag")]
    LeapSecondLength,
}
