// Measures (bars) and their events, plus the measure generator.
//
// An `Event` is either a single note or a chord, each with one duration in
// beats. A `Measure` is an ordered run of events whose durations sum to
// exactly the palette's bar length, tagged with the playback instrument.
//
// Generation draws events one at a time from the emotion's palette: a chord
// with probability `chord_probability` (uniform over the chord pool),
// otherwise a note (uniform over the pitch pool), with an independent
// uniform duration. Only durations that fit the remaining space *and* leave
// a remainder the pool can still fill are eligible. Because the duration is
// independent of the event kind, this matches rejecting and redrawing
// candidates that overshoot, without ever looping on an unfillable gap.
//
// Durations are accumulated in integer ticks, so the bar is never overshot
// and always closes exactly.

use crate::config::{Palette, TICKS_PER_BEAT};
use crate::emotion::Instrument;
use crate::pitch::{Pitch, PitchName};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One musical occurrence within a bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    Note { pitch: Pitch, duration: f64 },
    Chord { pitches: Vec<Pitch>, duration: f64 },
}

impl Event {
    /// Length in beats.
    pub fn duration(&self) -> f64 {
        match self {
            Event::Note { duration, .. } | Event::Chord { duration, .. } => *duration,
        }
    }

    /// Length in ticks. Durations are tick-aligned by validation.
    pub fn ticks(&self) -> u32 {
        (self.duration() * TICKS_PER_BEAT as f64).round() as u32
    }

    /// Every pitch sounded by this event, in order.
    pub fn pitches(&self) -> &[Pitch] {
        match self {
            Event::Note { pitch, .. } => std::slice::from_ref(pitch),
            Event::Chord { pitches, .. } => pitches,
        }
    }

    /// Octave-free names of the sounded pitches.
    pub fn pitch_names(&self) -> impl Iterator<Item = PitchName> + '_ {
        self.pitches().iter().map(|p| p.name())
    }
}

/// A single bar: events filling exactly one bar length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub instrument: Instrument,
    pub events: Vec<Event>,
}

impl Measure {
    /// Sum of event durations in beats.
    pub fn total_duration(&self) -> f64 {
        self.events.iter().map(Event::duration).sum()
    }

    pub fn ticks(&self) -> u32 {
        self.events.iter().map(Event::ticks).sum()
    }
}

/// Generate one bar from the palette.
pub fn generate_measure(palette: &Palette, instrument: Instrument, rng: &mut impl Rng) -> Measure {
    let mut events = Vec::new();
    let mut filled: u32 = 0;

    while filled < palette.bar_ticks {
        let remaining = palette.bar_ticks - filled;

        let is_chord = rng.random::<f64>() < palette.chord_probability;
        let candidates: Vec<_> = palette.fitting_durations(remaining).collect();
        // A validated palette keeps `remaining` fillable, so this is never
        // empty; bail out rather than spin if it somehow is.
        if candidates.is_empty() {
            break;
        }

        let duration = *candidates[rng.random_range(0..candidates.len())];
        let event = if is_chord {
            let chord = &palette.chords[rng.random_range(0..palette.chords.len())];
            Event::Chord {
                pitches: chord.clone(),
                duration: duration.beats,
            }
        } else {
            Event::Note {
                pitch: palette.pitches[rng.random_range(0..palette.pitches.len())],
                duration: duration.beats,
            }
        };

        events.push(event);
        filled += duration.ticks;
    }

    Measure { instrument, events }
}
