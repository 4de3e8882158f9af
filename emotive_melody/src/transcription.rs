// Plain-text transcription of a chromosome.
//
// One line per event, in bar order then event order:
//
//   Note: <name> Duration: <beats>
//   Chord: <name>-<name>-...-<name> Duration: <beats>
//
// Names are octave-free (see pitch.rs). Durations print as the shortest
// decimal that round-trips, always with a fractional part: "1.0", "0.25",
// "1.5". Existing transcription files use exactly this layout, so keep it
// byte-for-byte stable. Tick-aligned durations with no finite decimal form
// (a triplet third is 160 ticks) print in full, e.g. "0.3333333333333333",
// not as a fraction.

use crate::chromosome::Chromosome;
use crate::error::Result;
use crate::measure::Event;
use std::fmt::Write as _;
use std::path::Path;

/// Default output file name used by the CLI.
pub const DEFAULT_TRANSCRIPTION_PATH: &str = "melody_transcription.txt";

/// Format a single event as one transcription line (without newline).
pub fn event_line(event: &Event) -> String {
    match event {
        Event::Note { pitch, duration } => {
            format!("Note: {} Duration: {:?}", pitch.name(), duration)
        }
        Event::Chord { pitches, duration } => {
            let names: Vec<String> = pitches.iter().map(|p| p.name().to_string()).collect();
            format!("Chord: {} Duration: {:?}", names.join("-"), duration)
        }
    }
}

/// Render the whole chromosome, one newline-terminated line per event.
pub fn transcribe(chromosome: &Chromosome) -> String {
    let mut out = String::new();
    for event in chromosome.events() {
        let _ = writeln!(out, "{}", event_line(event));
    }
    out
}

/// Write the transcription to `path`, replacing any existing file.
pub fn write_transcription(chromosome: &Chromosome, path: &Path) -> Result<()> {
    std::fs::write(path, transcribe(chromosome))?;
    Ok(())
}
