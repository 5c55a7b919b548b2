use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    codec,
    minute::Minute,
    timecode::{AmplitudeModulation, Timecode, ALWAYS_ZERO},
};

/// Framing state of a [Synchronizer].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Waiting for a marker.
    #[default]
    Unsynced,
    /// One marker seen.
    OneMarker,
    /// Two or more consecutive markers seen; the last is second 0 of a minute.
    TwoMarkers,
    /// Collecting the symbols of a minute.
    Collecting,
}

/// Why a partially collected minute was discarded.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramingFault {
    /// A marker second did not carry a marker.
    MissingMarker,
    /// A marker arrived between marker seconds.
    UnexpectedMarker,
    /// An always-zero second was not zero.
    NonZero,
}

/// Synchronizer locks onto minute boundaries in an amplitude symbol stream.
///
/// Symbols are consumed one at a time with no look-ahead. A minute is recognized by
/// the marker closing the previous minute followed by the marker at second 0. Any
/// framing violation discards the partial minute and the synchronizer starts looking
/// for markers again.
///
/// Only 60 symbol minutes are framed. For a leap second minute the first 60 symbols
/// are emitted, which still decode with the leap second flag, and the trailing marker
/// is taken as part of the next minute's lead-in.
#[derive(Debug, Clone, Default)]
pub struct Synchronizer {
    state: State,
    buffer: Vec<AmplitudeModulation>,
    /// Count of partial minutes discarded for each fault.
    pub faults: HashMap<FramingFault, usize>,
}

impl Synchronizer {
    #[must_use]
    pub fn new() -> Self {
        Synchronizer {
            state: State::Unsynced,
            buffer: Vec::with_capacity(Timecode::LEN),
            faults: HashMap::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Drop any partial minute and return to [State::Unsynced]. Fault counts are kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::Unsynced;
    }

    /// Consume one symbol, returning a [Timecode] if it completed a minute.
    pub fn advance(&mut self, symbol: AmplitudeModulation) -> Option<Timecode> {
        let marker = symbol.is_marker();
        match self.state {
            State::Unsynced => {
                if marker {
                    self.state = State::OneMarker;
                }
                None
            }
            State::OneMarker => {
                self.state = if marker {
                    State::TwoMarkers
                } else {
                    State::Unsynced
                };
                None
            }
            State::TwoMarkers => {
                if !marker {
                    self.buffer.clear();
                    self.buffer.push(AmplitudeModulation::Marker);
                    self.buffer.push(symbol);
                    self.state = State::Collecting;
                }
                None
            }
            State::Collecting => self.collect(symbol),
        }
    }

    fn collect(&mut self, symbol: AmplitudeModulation) -> Option<Timecode> {
        self.buffer.push(symbol);
        let len = self.buffer.len();
        let pos = len - 1;

        let fault = match (len % 10 == 0, symbol.is_marker()) {
            (true, false) => Some(FramingFault::MissingMarker),
            (false, true) => Some(FramingFault::UnexpectedMarker),
            _ if ALWAYS_ZERO.contains(&pos) && symbol != AmplitudeModulation::Zero => {
                Some(FramingFault::NonZero)
            }
            _ => None,
        };
        if let Some(fault) = fault {
            trace!(?fault, pos, ?symbol, "framing fault, discarding partial minute");
            self.faults
                .entry(fault)
                .and_modify(|count| *count += 1)
                .or_insert(1);
            self.reset();
            return None;
        }

        if len < Timecode::LEN {
            return None;
        }
        // closing marker doubles as the next minute's lead-in
        self.state = State::TwoMarkers;
        let timecode = Timecode::from_parts(std::mem::take(&mut self.buffer), None);
        debug!(%timecode, "framed minute");
        Some(timecode)
    }
}

/// Iterator of [Timecode]s framed from a symbol iterator. See [synchronize].
pub struct Timecodes<I> {
    symbols: I,
    synchronizer: Synchronizer,
}

impl<I> Timecodes<I> {
    /// The underlying synchronizer, e.g., for its fault counts.
    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }
}

impl<I> Iterator for Timecodes<I>
where
    I: Iterator<Item = AmplitudeModulation>,
{
    type Item = Timecode;

    fn next(&mut self) -> Option<Self::Item> {
        for symbol in self.symbols.by_ref() {
            if let Some(timecode) = self.synchronizer.advance(symbol) {
                return Some(timecode);
            }
        }
        None
    }
}

/// Lazily frame the minutes in `symbols`.
///
/// The first minute is only framed if it is preceded by at least one marker, usually
/// second 59 of the previous minute.
pub fn synchronize<I>(symbols: I) -> Timecodes<I::IntoIter>
where
    I: IntoIterator<Item = AmplitudeModulation>,
{
    Timecodes {
        symbols: symbols.into_iter(),
        synchronizer: Synchronizer::new(),
    }
}

/// Lazily frame and decode the minutes in `symbols`, skipping any that fail to decode.
pub fn decode_minutes<I>(symbols: I) -> impl Iterator<Item = Minute>
where
    I: IntoIterator<Item = AmplitudeModulation>,
{
    synchronize(symbols).filter_map(|timecode| codec::decode(&timecode))
}
