// Data-driven generator configuration.
//
// `MelodyConfig` holds everything a run needs besides the emotion and
// instrument: the per-emotion pools (pitches, chords, durations), the bar
// length, the chord probability, and the GA parameters. It is immutable
// once built and passed by reference into the generator, so several runs
// with different configs can coexist. `MelodyConfig::default()` carries the
// stock tables; `load()` reads the same shape from JSON, with absent fields
// falling back to the defaults.
//
// Validation turns one emotion's profile into a `Palette`: pools checked
// non-empty, durations converted to integer ticks (480 per beat), and a
// table of which bar remainders can still be filled exactly. The measure
// generator only ever draws durations that keep the remainder fillable, so
// a validated palette can never get stuck mid-bar (see measure.rs).
//
// **Critical constraint: validate before running.** Every check that could
// fail lives here; the GA itself has no error paths.

use crate::emotion::Emotion;
use crate::error::{MelodyError, PoolKind, Result};
use crate::pitch::{Pitch, parse_pitches};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Tick resolution for duration arithmetic (matches the MIDI export).
pub const TICKS_PER_BEAT: u32 = 480;

/// Longest bar accepted, in beats. Bounds the size of the fill table.
pub const MAX_BAR_BEATS: f64 = 64.0;

/// Largest tempo value a MIDI tempo meta event can hold (24 bits).
const MAX_MICROS_PER_BEAT: u32 = 0xFF_FFFF;

/// Allowed slack when converting a beat length to ticks.
const TICK_TOLERANCE: f64 = 1e-6;

/// Microseconds per beat for a tempo, or `None` if the tempo is zero or too
/// slow to encode (below 4 BPM).
pub fn micros_per_beat(tempo_bpm: u16) -> Option<u32> {
    if tempo_bpm == 0 {
        return None;
    }
    let micros = 60_000_000 / u32::from(tempo_bpm);
    (micros <= MAX_MICROS_PER_BEAT).then_some(micros)
}

/// Convert a beat length to whole ticks, or `None` if it is not positive,
/// not finite, or not on the tick grid.
pub fn beats_to_ticks(beats: f64) -> Option<u32> {
    if !beats.is_finite() || beats <= 0.0 {
        return None;
    }
    let ticks = beats * TICKS_PER_BEAT as f64;
    let rounded = ticks.round();
    if (ticks - rounded).abs() > TICK_TOLERANCE || rounded < 1.0 || rounded > u32::MAX as f64 {
        return None;
    }
    Some(rounded as u32)
}

/// The three pools an emotion draws from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    pub pitches: Vec<Pitch>,
    /// Each entry is one chord, sounded together.
    pub chords: Vec<Vec<Pitch>>,
    /// Candidate event lengths in beats.
    pub durations: Vec<f64>,
}

/// Genetic algorithm sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    /// Bars per chromosome.
    pub num_bars: usize,
    pub population_size: usize,
    /// Per-bar probability of regeneration during mutation.
    pub mutation_rate: f64,
    pub num_generations: usize,
}

impl Default for GaParams {
    fn default() -> Self {
        GaParams {
            num_bars: 8,
            population_size: 10,
            mutation_rate: 0.1,
            num_generations: 20,
        }
    }
}

impl GaParams {
    /// Number of top individuals carried into the next generation.
    pub fn survivors(&self) -> usize {
        self.population_size / 2
    }
}

/// Full generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyConfig {
    /// Beats per bar.
    pub bar_length: f64,
    /// Probability that a drawn event is a chord rather than a single note.
    pub chord_probability: f64,
    /// Playback tempo in quarter notes per minute (export only).
    pub tempo_bpm: u16,
    pub ga: GaParams,
    pub profiles: BTreeMap<Emotion, EmotionProfile>,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        MelodyConfig {
            bar_length: 4.0,
            chord_probability: 0.3,
            tempo_bpm: 120,
            ga: GaParams::default(),
            profiles: default_profiles(),
        }
    }
}

/// Stock pools for each emotion.
fn default_profiles() -> BTreeMap<Emotion, EmotionProfile> {
    // A typo in these literals shows up as a short pool; the pool lengths
    // are pinned by test_default_pools_parse_fully.
    fn profile(pitches: &[&str], chords: &[&[&str]], durations: &[f64]) -> EmotionProfile {
        EmotionProfile {
            pitches: parse_pitches(pitches).unwrap_or_default(),
            chords: chords
                .iter()
                .map(|c| parse_pitches(c).unwrap_or_default())
                .collect(),
            durations: durations.to_vec(),
        }
    }

    BTreeMap::from([
        (
            Emotion::Joy,
            profile(
                &["C5", "E5", "G5", "B5", "D6", "C6"],
                &[&["C5", "E5", "G5"], &["D5", "G5", "B5"]],
                &[0.25, 0.5, 0.75, 1.0],
            ),
        ),
        (
            Emotion::Sadness,
            profile(
                &["A3", "C4", "E4", "G4", "B3"],
                &[&["A3", "C4", "E4"], &["G3", "B3", "D4"]],
                &[1.0, 1.5, 2.0, 3.0],
            ),
        ),
        (
            Emotion::Anger,
            profile(
                &["D4", "F4", "A4", "B4", "C5"],
                &[&["D4", "F4", "A4"], &["C4", "E4", "G4"]],
                &[0.25, 0.5, 0.75, 1.0],
            ),
        ),
        (
            Emotion::Calm,
            profile(
                &["F4", "A4", "C5", "E5", "G4"],
                &[&["F4", "A4", "C5"], &["E4", "G4", "B4"]],
                &[1.0, 1.5, 2.0, 3.0],
            ),
        ),
    ])
}

impl MelodyConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the run-wide parameters (everything not tied to one emotion).
    pub fn validate_params(&self) -> Result<()> {
        if beats_to_ticks(self.bar_length).is_none() || self.bar_length > MAX_BAR_BEATS {
            return Err(MelodyError::InvalidBarLength(self.bar_length));
        }
        check_probability("chord_probability", self.chord_probability)?;
        check_probability("mutation_rate", self.ga.mutation_rate)?;
        if micros_per_beat(self.tempo_bpm).is_none() {
            return Err(MelodyError::InvalidTempo(self.tempo_bpm));
        }
        if self.ga.num_bars < 2 {
            return Err(MelodyError::TooFewBars(self.ga.num_bars));
        }
        if self.ga.survivors() < 2 {
            return Err(MelodyError::PopulationTooSmall(self.ga.population_size));
        }
        Ok(())
    }

    /// Validate the parameters and every emotion's profile.
    pub fn validate(&self) -> Result<()> {
        self.validate_params()?;
        for emotion in Emotion::ALL {
            self.palette(emotion)?;
        }
        Ok(())
    }

    /// Build the validated pool set for one emotion.
    pub fn palette(&self, emotion: Emotion) -> Result<Palette> {
        let bar_ticks = match beats_to_ticks(self.bar_length) {
            Some(t) if self.bar_length <= MAX_BAR_BEATS => t,
            _ => return Err(MelodyError::InvalidBarLength(self.bar_length)),
        };
        check_probability("chord_probability", self.chord_probability)?;

        let profile = self
            .profiles
            .get(&emotion)
            .ok_or(MelodyError::MissingProfile(emotion))?;

        let empty = |pool| MelodyError::EmptyPool { emotion, pool };
        if profile.pitches.is_empty() {
            return Err(empty(PoolKind::Pitch));
        }
        if profile.chords.is_empty() {
            return Err(empty(PoolKind::Chord));
        }
        if profile.durations.is_empty() {
            return Err(empty(PoolKind::Duration));
        }
        if let Some(index) = profile.chords.iter().position(|c| c.is_empty()) {
            return Err(MelodyError::EmptyChord { emotion, index });
        }

        let durations = profile
            .durations
            .iter()
            .map(|&beats| {
                beats_to_ticks(beats)
                    .map(|ticks| PoolDuration { beats, ticks })
                    .ok_or(MelodyError::InvalidDuration {
                        emotion,
                        duration: beats,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let completable = fill_table(&durations, bar_ticks);
        if !completable[bar_ticks as usize] {
            return Err(MelodyError::UnfillableBar {
                emotion,
                bar_length: self.bar_length,
            });
        }

        Ok(Palette {
            emotion,
            pitches: profile.pitches.clone(),
            chords: profile.chords.clone(),
            durations,
            bar_ticks,
            completable,
            chord_probability: self.chord_probability,
        })
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MelodyError::ProbabilityOutOfRange { name, value })
    }
}

/// `table[r]` is true when `r` ticks can be filled exactly by summing pool
/// durations (with repetition). `table[0]` is always true.
fn fill_table(durations: &[PoolDuration], bar_ticks: u32) -> Vec<bool> {
    let mut table = vec![false; bar_ticks as usize + 1];
    table[0] = true;
    for remaining in 1..=bar_ticks as usize {
        table[remaining] = durations
            .iter()
            .any(|d| (d.ticks as usize) <= remaining && table[remaining - d.ticks as usize]);
    }
    table
}

/// One duration pool entry, kept both as written and in ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoolDuration {
    pub beats: f64,
    pub ticks: u32,
}

/// A validated, ready-to-sample pool set for one emotion.
#[derive(Clone, Debug)]
pub struct Palette {
    pub emotion: Emotion,
    pub pitches: Vec<Pitch>,
    pub chords: Vec<Vec<Pitch>>,
    pub durations: Vec<PoolDuration>,
    pub bar_ticks: u32,
    completable: Vec<bool>,
    pub chord_probability: f64,
}

impl Palette {
    /// Durations that fit in `remaining` ticks and leave a remainder that
    /// can still be filled exactly.
    pub fn fitting_durations(&self, remaining: u32) -> impl Iterator<Item = &PoolDuration> + '_ {
        self.durations.iter().filter(move |d| {
            d.ticks <= remaining && self.completable[(remaining - d.ticks) as usize]
        })
    }

    pub fn bar_length(&self) -> f64 {
        self.bar_ticks as f64 / TICKS_PER_BEAT as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MelodyConfig::default();
        config.validate().unwrap();
        assert_eq!(config.ga.num_bars, 8);
        assert_eq!(config.ga.population_size, 10);
        assert_eq!(config.ga.num_generations, 20);
        assert_eq!(config.ga.mutation_rate, 0.1);
        assert_eq!(config.chord_probability, 0.3);
        assert_eq!(config.bar_length, 4.0);
        assert_eq!(config.tempo_bpm, 120);
        assert_eq!(config.profiles.len(), Emotion::ALL.len());
    }

    #[test]
    fn test_default_pools_parse_fully() {
        let config = MelodyConfig::default();
        for (emotion, pitches) in [
            (Emotion::Joy, 6),
            (Emotion::Sadness, 5),
            (Emotion::Anger, 5),
            (Emotion::Calm, 5),
        ] {
            let profile = &config.profiles[&emotion];
            assert_eq!(profile.pitches.len(), pitches, "{emotion} pitches");
            assert_eq!(profile.chords.len(), 2, "{emotion} chords");
            assert!(profile.chords.iter().all(|c| c.len() == 3), "{emotion} chord size");
            assert_eq!(profile.durations.len(), 4, "{emotion} durations");
        }
        let sad = &config.profiles[&Emotion::Sadness];
        assert_eq!(sad.durations, vec![1.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn test_beats_to_ticks() {
        assert_eq!(beats_to_ticks(4.0), Some(1920));
        assert_eq!(beats_to_ticks(0.25), Some(120));
        assert_eq!(beats_to_ticks(1.0 / 3.0), Some(160));
        assert_eq!(beats_to_ticks(0.0), None);
        assert_eq!(beats_to_ticks(-1.0), None);
        assert_eq!(beats_to_ticks(f64::NAN), None);
        assert_eq!(beats_to_ticks(0.0001), None);
    }

    #[test]
    fn test_load_partial_json_keeps_defaults() {
        let json = r#"{
            "ga": { "population_size": 6, "num_generations": 3 },
            "chord_probability": 0.5
        }"#;
        let config = MelodyConfig::from_json(json).unwrap();
        assert_eq!(config.ga.population_size, 6);
        assert_eq!(config.ga.num_generations, 3);
        assert_eq!(config.ga.num_bars, 8);
        assert_eq!(config.chord_probability, 0.5);
        assert_eq!(config.bar_length, 4.0);
        assert_eq!(config.profiles.len(), 4);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_profiles_from_json() {
        let json = r#"{
            "profiles": {
                "Calm": {
                    "pitches": ["F4", "Bb4"],
                    "chords": [["F4", "A4", "C5"]],
                    "durations": [2.0]
                }
            }
        }"#;
        let config = MelodyConfig::from_json(json).unwrap();
        let palette = config.palette(Emotion::Calm).unwrap();
        assert_eq!(palette.pitches[1].to_string(), "B-4");
        assert!(matches!(
            config.palette(Emotion::Joy),
            Err(MelodyError::MissingProfile(Emotion::Joy))
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("melody.json");
        std::fs::write(&path, r#"{ "tempo_bpm": 90 }"#).unwrap();
        let config = MelodyConfig::load(&path).unwrap();
        assert_eq!(config.tempo_bpm, 90);

        let missing = MelodyConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, MelodyError::Io(_)));
    }

    #[test]
    fn test_bad_pitch_in_json_is_rejected() {
        let json = r#"{ "profiles": { "Joy": {
            "pitches": ["C5", "X9"], "chords": [["C5"]], "durations": [1.0]
        } } }"#;
        assert!(matches!(
            MelodyConfig::from_json(json),
            Err(MelodyError::Json(_))
        ));
    }

    fn with_joy(profile: EmotionProfile) -> MelodyConfig {
        let mut config = MelodyConfig::default();
        config.profiles.insert(Emotion::Joy, profile);
        config
    }

    fn joy_profile() -> EmotionProfile {
        MelodyConfig::default().profiles[&Emotion::Joy].clone()
    }

    #[test]
    fn test_empty_pools_are_rejected() {
        let mut p = joy_profile();
        p.pitches.clear();
        assert!(matches!(
            with_joy(p).palette(Emotion::Joy),
            Err(MelodyError::EmptyPool { pool: PoolKind::Pitch, .. })
        ));

        let mut p = joy_profile();
        p.chords.clear();
        assert!(matches!(
            with_joy(p).palette(Emotion::Joy),
            Err(MelodyError::EmptyPool { pool: PoolKind::Chord, .. })
        ));

        let mut p = joy_profile();
        p.durations.clear();
        assert!(matches!(
            with_joy(p).palette(Emotion::Joy),
            Err(MelodyError::EmptyPool { pool: PoolKind::Duration, .. })
        ));

        let mut p = joy_profile();
        p.chords.push(Vec::new());
        assert!(matches!(
            with_joy(p).palette(Emotion::Joy),
            Err(MelodyError::EmptyChord { index: 2, .. })
        ));
    }

    #[test]
    fn test_durations_longer_than_bar_are_unfillable() {
        let mut p = joy_profile();
        p.durations = vec![5.0, 6.0];
        assert!(matches!(
            with_joy(p).palette(Emotion::Joy),
            Err(MelodyError::UnfillableBar { .. })
        ));
    }

    #[test]
    fn test_durations_that_cannot_sum_to_bar_are_unfillable() {
        let mut p = joy_profile();
        p.durations = vec![3.0];
        assert!(matches!(
            with_joy(p).palette(Emotion::Joy),
            Err(MelodyError::UnfillableBar { .. })
        ));
    }

    #[test]
    fn test_invalid_durations_are_rejected() {
        for bad in [0.0, -1.0, 0.0001] {
            let mut p = joy_profile();
            p.durations = vec![1.0, bad];
            assert!(matches!(
                with_joy(p).palette(Emotion::Joy),
                Err(MelodyError::InvalidDuration { .. })
            ));
        }
    }

    #[test]
    fn test_param_validation() {
        let mut config = MelodyConfig::default();
        config.ga.population_size = 3;
        assert!(matches!(
            config.validate_params(),
            Err(MelodyError::PopulationTooSmall(3))
        ));

        let mut config = MelodyConfig::default();
        config.ga.population_size = 4;
        config.validate_params().unwrap();

        let mut config = MelodyConfig::default();
        config.ga.num_bars = 1;
        assert!(matches!(config.validate_params(), Err(MelodyError::TooFewBars(1))));

        let mut config = MelodyConfig::default();
        config.ga.mutation_rate = 1.5;
        assert!(matches!(
            config.validate_params(),
            Err(MelodyError::ProbabilityOutOfRange { name: "mutation_rate", .. })
        ));

        let mut config = MelodyConfig::default();
        config.bar_length = 0.0;
        assert!(matches!(
            config.validate_params(),
            Err(MelodyError::InvalidBarLength(_))
        ));

        let mut config = MelodyConfig::default();
        config.tempo_bpm = 0;
        assert!(matches!(config.validate_params(), Err(MelodyError::InvalidTempo(0))));

        let mut config = MelodyConfig::default();
        config.tempo_bpm = 3;
        assert!(matches!(config.validate_params(), Err(MelodyError::InvalidTempo(3))));

        let mut config = MelodyConfig::default();
        config.tempo_bpm = 4;
        config.validate_params().unwrap();
    }

    #[test]
    fn test_micros_per_beat() {
        assert_eq!(micros_per_beat(120), Some(500_000));
        assert_eq!(micros_per_beat(4), Some(15_000_000));
        assert_eq!(micros_per_beat(3), None);
        assert_eq!(micros_per_beat(0), None);
    }

    #[test]
    fn test_fitting_durations_avoid_dead_ends() {
        let mut p = joy_profile();
        p.durations = vec![1.5, 1.0];
        let palette = with_joy(p).palette(Emotion::Joy).unwrap();
        // With 2 beats left, 1.5 would strand half a beat.
        let two_beats = 2 * TICKS_PER_BEAT;
        let fits: Vec<f64> = palette.fitting_durations(two_beats).map(|d| d.beats).collect();
        assert_eq!(fits, vec![1.0]);
        // With 4 beats left both work (1.5 + 1.5 + 1.0).
        let fits: Vec<f64> = palette.fitting_durations(palette.bar_ticks).map(|d| d.beats).collect();
        assert_eq!(fits, vec![1.5, 1.0]);
    }
}
