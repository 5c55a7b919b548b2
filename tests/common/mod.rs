use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use wwvb::OffsetTable;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

/// DUT1 offsets from 1991-12-01 through 2013-01-31 with leap seconds at the end of
/// 1992-06-30 and 2012-06-30.
pub fn offset_table() -> OffsetTable {
    OffsetTable::from_file(fixture_path("dut1.json")).expect("failed to load offset table")
}

pub fn datetime(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}
