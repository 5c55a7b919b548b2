mod common;

use common::{datetime, offset_table};
use rand::{rngs::StdRng, Rng, SeedableRng};
use wwvb::{
    decode, decode_minutes, encode, synchronize, synchronizer::FramingFault,
    AmplitudeModulation as Am, FixedDut1, Minute, Synchronizer, Timecode,
};

fn encoded_stream(start: Minute, count: usize) -> (Vec<Am>, Vec<Minute>) {
    let table = offset_table();
    let mut symbols = vec![Am::Marker];
    let mut minutes = Vec::with_capacity(count);
    let mut m = start;
    for _ in 0..count {
        symbols.extend_from_slice(encode(&m).am());
        minutes.push(m);
        m = m.successor(&table);
    }
    (symbols, minutes)
}

/// Random symbols in which a marker is never followed by another marker.
fn noise(rng: &mut StdRng, len: usize) -> Vec<Am> {
    let mut zult: Vec<Am> = Vec::with_capacity(len);
    while zult.len() < len {
        let sym = match rng.gen_range(0..3) {
            0 => Am::Zero,
            1 => Am::One,
            _ => Am::Marker,
        };
        if sym.is_marker() && zult.last().is_some_and(|s| s.is_marker()) {
            continue;
        }
        zult.push(sym);
    }
    zult
}

#[test]
fn continuous_stream_across_leap_second() {
    let table = offset_table();
    let start = Minute::from_datetime(datetime(1992, 6, 30, 23, 50), &table).unwrap();
    let (symbols, expected) = encoded_stream(start, 20);
    assert_eq!(symbols.len(), 1 + 20 * 60 + 1);

    let zult: Vec<Minute> = decode_minutes(symbols).collect();
    assert_eq!(zult, expected);
    let leap: Vec<&Minute> = zult.iter().filter(|m| m.leap_second()).collect();
    assert_eq!(leap.len(), 1);
    assert_eq!((leap[0].hour(), leap[0].minute()), (23, 59));
}

#[test]
fn noise_produces_nothing_until_lead_in() {
    let mut rng = StdRng::seed_from_u64(0x5757_5642);
    let junk = noise(&mut rng, 10_000);

    let mut sync = Synchronizer::new();
    for sym in &junk {
        assert!(sync.advance(*sym).is_none());
    }

    let m = Minute::from_ymd(2001, 9, 9, 1, 46).unwrap();
    let expected = encode(&m);
    let mut emitted: Vec<Timecode> = Vec::new();
    for sym in std::iter::once(Am::Marker).chain(expected.am().iter().copied()) {
        if let Some(tc) = sync.advance(sym) {
            emitted.push(tc);
        }
    }
    assert_eq!(emitted, vec![expected]);
    assert_eq!(decode(&emitted[0]), Some(m));
}

#[test]
fn corrupted_minutes_are_dropped_and_sync_recovers() {
    let source = FixedDut1::builder().dut1(3).build();
    let mut rng = StdRng::seed_from_u64(7);
    let start = Minute::from_ymd(2030, 1, 1, 0, 0).unwrap().with_dut1(3).unwrap();

    let mut symbols = vec![Am::Marker];
    let mut expected = Vec::new();
    let mut m = start;
    for i in 0..10 {
        let mut tc = encode(&m);
        if i == 3 || i == 7 {
            // a marker at a data second; at second 1 it would read as lead-in
            let pos = loop {
                let pos = rng.gen_range(2..59);
                if pos % 10 != 9 {
                    break pos;
                }
            };
            tc.am_mut()[pos] = Am::Marker;
        } else {
            expected.push(m);
        }
        symbols.extend_from_slice(tc.am());
        m = m.successor(&source);
    }

    let mut timecodes = synchronize(symbols);
    let zult: Vec<Minute> = timecodes.by_ref().filter_map(|tc| decode(&tc)).collect();
    assert_eq!(zult, expected);
    assert_eq!(
        timecodes
            .synchronizer()
            .faults
            .get(&FramingFault::UnexpectedMarker),
        Some(&2)
    );
}

#[test]
fn independent_synchronizers() {
    let (symbols, minutes) = encoded_stream(Minute::from_ymd(2000, 1, 1, 0, 0).unwrap(), 4);
    let mut a = Synchronizer::new();
    let mut b = Synchronizer::new();
    let mut count = 0;
    for (i, sym) in symbols.iter().enumerate() {
        let x = a.advance(*sym);
        // b misses the first minute
        let y = if i < 60 { b.advance(Am::One) } else { b.advance(*sym) };
        if x.is_some() {
            count += 1;
        }
        assert!(y.is_none() || i >= 120);
    }
    assert_eq!(count, minutes.len());
}
