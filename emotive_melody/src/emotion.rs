// Emotion and instrument tags.
//
// These are the two user-facing choices for a run. An emotion selects a
// profile of pitch/chord/duration pools from the config (see config.rs); an
// instrument is attached to every generated measure and decides the General
// MIDI program used on export (see midi.rs). Parsing is case-insensitive and
// an unrecognized tag is a configuration error, raised before the core runs.

use crate::error::MelodyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The mood a melody is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Calm,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Emotion::Joy, Emotion::Sadness, Emotion::Anger, Emotion::Calm];

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Sadness => "Sadness",
            Emotion::Anger => "Anger",
            Emotion::Calm => "Calm",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MelodyError::UnknownEmotion(s.to_string()))
    }
}

/// Playback instrument, constant across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    Piano,
    Guitar,
    Flute,
    Violin,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::Piano,
        Instrument::Guitar,
        Instrument::Flute,
        Instrument::Violin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Piano => "Piano",
            Instrument::Guitar => "Guitar",
            Instrument::Flute => "Flute",
            Instrument::Violin => "Violin",
        }
    }

    /// General MIDI program number (0-based).
    pub fn midi_program(self) -> u8 {
        match self {
            Instrument::Piano => 0,   // Acoustic Grand Piano
            Instrument::Guitar => 24, // Acoustic Guitar (nylon)
            Instrument::Flute => 73,
            Instrument::Violin => 40,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Instrument {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .into_iter()
            .find(|i| i.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MelodyError::UnknownInstrument(s.to_string()))
    }
}
