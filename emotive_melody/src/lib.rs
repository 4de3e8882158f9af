// Emotive Melody Generator
//
// Generates a short melody for a chosen emotion by evolving a population of
// candidate note/chord sequences with a genetic algorithm. Fitness rewards
// pitch variety: the number of distinct pitch names a candidate uses.
//
// Architecture:
// - pitch.rs: Pitch spelling, octave-free pitch names, MIDI key numbers
// - emotion.rs: Emotion and instrument tags (parsing, GM programs)
// - config.rs: Data-driven pools and GA parameters, validated into a Palette
// - measure.rs: Note/chord events, bars, and the bar generator
// - chromosome.rs: A candidate melody (fixed number of bars) and its factory
// - fitness.rs: Distinct-pitch-name fitness
// - operators.rs: Single-point crossover and per-bar mutation
// - evolve.rs: The generational loop (selection, breeding, reporting)
// - transcription.rs: Plain-text "Note:/Chord:" transcription output
// - midi.rs: Standard MIDI File output
// - error.rs: Crate error type
//
// All randomness flows through a caller-supplied `rand::Rng`, so a seeded
// generator reproduces a run exactly.

pub mod chromosome;
pub mod config;
pub mod emotion;
pub mod error;
pub mod evolve;
pub mod fitness;
pub mod measure;
pub mod midi;
pub mod operators;
pub mod pitch;
pub mod transcription;

pub use chromosome::Chromosome;
pub use config::MelodyConfig;
pub use emotion::{Emotion, Instrument};
pub use error::{MelodyError, Result};
pub use evolve::{EvolutionResult, Evolver, evolve};
