//! Broadcast symbols and the minute-long [Timecode] container.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Seconds carrying a marker in every minute. A leap second minute also carries a
/// marker at second 60.
pub const MARKERS: [usize; 7] = [0, 9, 19, 29, 39, 49, 59];

/// Unused seconds that are always transmitted as [AmplitudeModulation::Zero].
pub const ALWAYS_ZERO: [usize; 11] = [4, 10, 11, 14, 20, 21, 24, 34, 35, 44, 54];

/// Carrier amplitude state for one second.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AmplitudeModulation {
    #[default]
    Zero,
    One,
    Marker,
}

impl AmplitudeModulation {
    #[must_use]
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Self::One
        } else {
            Self::Zero
        }
    }

    #[must_use]
    pub fn is_marker(self) -> bool {
        self == Self::Marker
    }

    fn as_char(self) -> char {
        match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::Marker => '2',
        }
    }
}

impl TryFrom<u8> for AmplitudeModulation {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            2 => Ok(Self::Marker),
            x => Err(x),
        }
    }
}

/// Carrier phase state for one second.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhaseModulation {
    Zero,
    One,
    /// Phase data is not being modeled for this second.
    #[default]
    Unset,
}

impl PhaseModulation {
    #[must_use]
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Self::One
        } else {
            Self::Zero
        }
    }
}

/// One broadcast minute as a sequence of amplitude symbols and a parallel sequence
/// of phase symbols.
///
/// A time code is 60 symbols long, or 61 for the minute a leap second is inserted
/// into. Equality and display consider amplitude symbols only.
#[derive(Serialize, Deserialize, Debug, Clone, Eq)]
pub struct Timecode {
    am: Vec<AmplitudeModulation>,
    phase: Vec<PhaseModulation>,
}

impl Timecode {
    /// Symbols in a regular minute.
    pub const LEN: usize = 60;
    /// Symbols in a minute with an inserted leap second.
    pub const LEAP_LEN: usize = 61;

    /// Creates an all-zero time code with unset phase.
    ///
    /// # Errors
    /// [Error::TimecodeLength] if `len` is not 60 or 61.
    pub fn new(len: usize) -> Result<Self> {
        Self::from_am(vec![AmplitudeModulation::Zero; len])
    }

    /// Creates a time code from amplitude symbols with unset phase.
    ///
    /// # Errors
    /// [Error::TimecodeLength] if there are not 60 or 61 symbols.
    pub fn from_am(am: Vec<AmplitudeModulation>) -> Result<Self> {
        if !matches!(am.len(), Self::LEN | Self::LEAP_LEN) {
            return Err(Error::TimecodeLength(am.len()));
        }
        Ok(Self::from_parts(am, None))
    }

    /// Replace the phase symbols.
    ///
    /// # Errors
    /// [Error::PhaseLength] if `phase` is not the same length as the amplitude symbols.
    pub fn with_phase(mut self, phase: Vec<PhaseModulation>) -> Result<Self> {
        if phase.len() != self.am.len() {
            return Err(Error::PhaseLength {
                amplitude: self.am.len(),
                phase: phase.len(),
            });
        }
        self.phase = phase;
        Ok(self)
    }

    /// Length must already be known to be valid.
    pub(crate) fn from_parts(
        am: Vec<AmplitudeModulation>,
        phase: Option<Vec<PhaseModulation>>,
    ) -> Self {
        let phase = phase.unwrap_or_else(|| vec![PhaseModulation::Unset; am.len()]);
        debug_assert_eq!(am.len(), phase.len());
        Timecode { am, phase }
    }

    #[must_use]
    pub fn am(&self) -> &[AmplitudeModulation] {
        &self.am
    }

    #[must_use]
    pub fn phase(&self) -> &[PhaseModulation] {
        &self.phase
    }

    /// Mutable access to the amplitude symbols, e.g., to inject reception errors.
    pub fn am_mut(&mut self) -> &mut [AmplitudeModulation] {
        &mut self.am
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.am.len()
    }

    /// Always false; a time code has at least 60 symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.am.is_empty()
    }

    /// True for a 61 symbol time code.
    #[must_use]
    pub fn has_leap_second(&self) -> bool {
        self.am.len() == Self::LEAP_LEN
    }

    /// Returns the first 60 symbols, i.e., this time code without any leap second.
    #[must_use]
    pub fn truncated(&self) -> Timecode {
        Timecode {
            am: self.am[..Self::LEN].to_vec(),
            phase: self.phase[..Self::LEN].to_vec(),
        }
    }
}

impl PartialEq for Timecode {
    fn eq(&self, other: &Self) -> bool {
        self.am == other.am
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sym in &self.am {
            write!(f, "{}", sym.as_char())?;
        }
        Ok(())
    }
}
