#![doc = include_str!("../README.md")]

mod error;
mod prelude;

pub mod codec;
pub mod dst;
pub mod dut1;
pub mod minute;
pub mod phase;
pub mod synchronizer;
pub mod timecode;

pub use codec::{decode, encode, try_decode};
pub use dst::Dst;
pub use dut1::{Dut1Source, FixedDut1, OffsetTable};
pub use error::{DecodeError, Error, Result};
pub use minute::Minute;
pub use synchronizer::{decode_minutes, synchronize, Synchronizer};
pub use timecode::{AmplitudeModulation, PhaseModulation, Timecode};
