// Pitch spelling: parsing pool entries like "C5", "F#4" or "Bb3".
//
// A pitch keeps its spelling (step letter + alteration) rather than just a
// MIDI number, because fitness and transcription both work on the pitch
// *name*: the step and accidental without the octave, so C5 and C6 share
// the name "C". Sharps are written '#', flats '-' (the notation used in the
// transcription files); on input 'b' is also accepted as a flat.
//
// MIDI numbers are derived on demand for export (midi.rs).

use crate::error::MelodyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Octave assumed when a pool entry omits one.
const DEFAULT_OCTAVE: i8 = 4;

/// The octave-free name of a pitch, e.g. `C`, `F#`, `B-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchName {
    /// Uppercase step letter, 'A'..='G'.
    pub step: char,
    /// Semitone alteration: positive for sharps, negative for flats.
    pub alter: i8,
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step)?;
        let mark = if self.alter >= 0 { '#' } else { '-' };
        for _ in 0..self.alter.unsigned_abs() {
            write!(f, "{mark}")?;
        }
        Ok(())
    }
}

/// A spelled pitch with octave (scientific pitch notation, C4 = middle C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    pub name: PitchName,
    pub octave: i8,
}

impl Pitch {
    pub fn name(&self) -> PitchName {
        self.name
    }

    /// MIDI key number, clamped to 0..=127.
    pub fn midi_key(&self) -> u8 {
        let step_pc: i16 = match self.name.step {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            _ => 11, // 'B'; parsing admits nothing else
        };
        let key = (self.octave as i16 + 1) * 12 + step_pc + self.name.alter as i16;
        key.clamp(0, 127) as u8
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

impl FromStr for Pitch {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MelodyError::InvalidPitch(s.to_string());
        let mut chars = s.trim().chars().peekable();

        let step = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !('A'..='G').contains(&step) {
            return Err(invalid());
        }

        let mut alter: i8 = 0;
        while let Some(&c) = chars.peek() {
            let delta = match c {
                '#' => 1,
                '-' | 'b' => -1,
                _ => break,
            };
            // Mixed accidentals ("C#b") and more than a double are rejected.
            if alter != 0 && alter.signum() != delta {
                return Err(invalid());
            }
            alter += delta;
            if alter.abs() > 2 {
                return Err(invalid());
            }
            chars.next();
        }

        let rest: String = chars.collect();
        let octave = if rest.is_empty() {
            DEFAULT_OCTAVE
        } else if rest.chars().all(|c| c.is_ascii_digit()) {
            rest.parse::<i8>().map_err(|_| invalid())?
        } else {
            return Err(invalid());
        };
        if octave > 9 {
            return Err(invalid());
        }

        Ok(Pitch {
            name: PitchName { step, alter },
            octave,
        })
    }
}

impl TryFrom<String> for Pitch {
    type Error = MelodyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.to_string()
    }
}

/// Parse a list of pitch strings, failing on the first bad entry.
pub fn parse_pitches(names: &[&str]) -> Result<Vec<Pitch>, MelodyError> {
    names.iter().map(|n| n.parse()).collect()
}
