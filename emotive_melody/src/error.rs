// Error type for the melody generator.
//
// Configuration problems (unknown tags, bad pools, a population too small
// to breed) are all detected before the first generation runs; once an
// `Evolver` exists, generation, fitness, crossover and mutation are total.
// The remaining variants come from the export adapters (transcription,
// MIDI, JSON).

use crate::emotion::Emotion;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MelodyError>;

/// Which of an emotion's three pools a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Pitch,
    Chord,
    Duration,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PoolKind::Pitch => "pitch",
            PoolKind::Chord => "chord",
            PoolKind::Duration => "duration",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MelodyError {
    #[error("unknown emotion '{0}' (expected one of: joy, sadness, anger, calm)")]
    UnknownEmotion(String),

    #[error("unknown instrument '{0}' (expected one of: piano, guitar, flute, violin)")]
    UnknownInstrument(String),

    #[error("invalid pitch '{0}'")]
    InvalidPitch(String),

    #[error("no profile configured for emotion {0}")]
    MissingProfile(Emotion),

    #[error("emotion {emotion} has an empty {pool} pool")]
    EmptyPool { emotion: Emotion, pool: PoolKind },

    #[error("emotion {emotion}: chord #{index} has no pitches")]
    EmptyChord { emotion: Emotion, index: usize },

    #[error("emotion {emotion}: duration {duration} is not a positive multiple of 1/480 beat")]
    InvalidDuration { emotion: Emotion, duration: f64 },

    #[error("emotion {emotion}: no combination of durations fills a {bar_length}-beat bar exactly")]
    UnfillableBar { emotion: Emotion, bar_length: f64 },

    #[error("bar length {0} must be a positive multiple of 1/480 beat, at most 64 beats")]
    InvalidBarLength(f64),

    #[error("tempo must be at least 4 BPM, got {0} BPM")]
    InvalidTempo(u16),

    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("crossover needs at least 2 bars per chromosome, got {0}")]
    TooFewBars(usize),

    #[error("population size {0} leaves fewer than two survivors to breed from")]
    PopulationTooSmall(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MelodyError {
    /// True for errors that stem from the run's configuration rather than
    /// from writing output.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, MelodyError::Io(_) | MelodyError::Json(_))
    }
}
