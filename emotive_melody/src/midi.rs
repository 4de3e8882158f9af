// MIDI output from chromosomes.
//
// Converts a chromosome into a Standard MIDI File for playback. Output is
// SMF Format 1: track 0 carries the tempo, track 1 the melody on channel 0.
// Each bar starts with a program change for its instrument, so the
// instrument tag travels with the bar the same way it does in the model.
// Chords sound all members at once and release them together.
//
// Uses the `midly` crate for MIDI writing.

use crate::chromosome::Chromosome;
use crate::config::{TICKS_PER_BEAT, micros_per_beat};
use crate::error::{MelodyError, Result};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

const CHANNEL: u8 = 0;
const VELOCITY: u8 = 80;

/// Convert a chromosome to MIDI and write it to a file.
pub fn write_midi(chromosome: &Chromosome, tempo_bpm: u16, path: &Path) -> Result<()> {
    std::fs::write(path, midi_bytes(chromosome, tempo_bpm)?)?;
    Ok(())
}

/// Encode a chromosome as SMF bytes.
pub fn midi_bytes(chromosome: &Chromosome, tempo_bpm: u16) -> Result<Vec<u8>> {
    let smf = chromosome_to_smf(chromosome, tempo_bpm)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Build an in-memory SMF from a chromosome. Fails on a tempo the tempo
/// meta event cannot hold.
pub fn chromosome_to_smf(chromosome: &Chromosome, tempo_bpm: u16) -> Result<Smf<'static>> {
    let tempo_microseconds =
        micros_per_beat(tempo_bpm).ok_or(MelodyError::InvalidTempo(tempo_bpm))?;
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_BEAT as u16)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'static> = Vec::new();
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    smf.tracks.push(melody_track(chromosome));
    Ok(smf)
}

fn melody_track(chromosome: &Chromosome) -> Track<'static> {
    let mut track: Track<'static> = Vec::new();

    if let Some(first) = chromosome.bars.first() {
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(first.instrument.name().as_bytes())),
        });
    }

    // Ticks elapsed since the last event written to the track.
    let mut pending: u32 = 0;

    for bar in &chromosome.bars {
        let program = u7::new(bar.instrument.midi_program());
        track.push(channel_event(pending, MidiMessage::ProgramChange { program }));
        pending = 0;

        for event in &bar.events {
            for pitch in event.pitches() {
                track.push(channel_event(
                    pending,
                    MidiMessage::NoteOn {
                        key: u7::new(pitch.midi_key()),
                        vel: u7::new(VELOCITY),
                    },
                ));
                pending = 0;
            }
            pending += event.ticks();
            for pitch in event.pitches() {
                track.push(channel_event(
                    pending,
                    MidiMessage::NoteOff {
                        key: u7::new(pitch.midi_key()),
                        vel: u7::new(0),
                    },
                ));
                pending = 0;
            }
        }
    }

    track.push(TrackEvent {
        delta: u28::new(pending),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

fn channel_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(CHANNEL),
            message,
        },
    }
}
