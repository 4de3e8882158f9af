// Emotive Melody Generator: CLI entry point.
//
// Evolves a melody for the chosen emotion and instrument, prints its
// transcription, and writes it out. The pipeline: config → validation →
// evolution → transcription / MIDI / JSON output.
//
// Usage:
//   cargo run -p emotive_melody -- --emotion joy --instrument piano
//     [--seed N] [--config melody.json] [--generations N] [--population N]
//     [--bars N] [--mutation-rate P] [--transcription PATH] [--midi PATH]
//     [--json PATH]
//
// Log verbosity follows RUST_LOG (default: info).

use clap::Parser;
use emotive_melody::Chromosome;
use emotive_melody::config::MelodyConfig;
use emotive_melody::emotion::{Emotion, Instrument};
use emotive_melody::error::Result;
use emotive_melody::evolve::{EvolutionResult, Evolver, GenerationReport};
use emotive_melody::midi::write_midi;
use emotive_melody::transcription::{DEFAULT_TRANSCRIPTION_PATH, transcribe, write_transcription};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Evolve a short melody for an emotion with a genetic algorithm")]
#[command(version)]
struct Args {
    /// Emotion to compose for: joy, sadness, anger, calm
    #[arg(short, long, default_value = "joy")]
    emotion: String,

    /// Instrument tag: piano, guitar, flute, violin
    #[arg(short, long, default_value = "piano")]
    instrument: String,

    /// RNG seed; a random one is chosen (and logged) when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON config file with pools and GA parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of generations
    #[arg(long)]
    generations: Option<usize>,

    /// Override the population size
    #[arg(long)]
    population: Option<usize>,

    /// Override the number of bars per melody
    #[arg(long)]
    bars: Option<usize>,

    /// Override the per-bar mutation rate
    #[arg(long)]
    mutation_rate: Option<f64>,

    /// Where to write the plain-text transcription
    #[arg(long, default_value = DEFAULT_TRANSCRIPTION_PATH)]
    transcription: PathBuf,

    /// Also write a Standard MIDI File here
    #[arg(long)]
    midi: Option<PathBuf>,

    /// Also write the winning melody and run history as JSON here
    #[arg(long)]
    json: Option<PathBuf>,
}

/// JSON export of a finished run.
#[derive(Serialize)]
struct RunExport<'a> {
    emotion: Emotion,
    instrument: Instrument,
    seed: u64,
    best_fitness: usize,
    history: &'a [GenerationReport],
    melody: &'a Chromosome,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_config_error() {
                error!("configuration error: {e}");
            } else {
                error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let emotion: Emotion = args.emotion.parse()?;
    let instrument: Instrument = args.instrument.parse()?;

    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            MelodyConfig::load(path)?
        }
        None => MelodyConfig::default(),
    };
    apply_overrides(&mut config, args);

    let evolver = Evolver::new(&config, emotion, instrument)?;
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "seeding RNG");
    let mut rng = StdRng::seed_from_u64(seed);

    println!("=== Emotive Melody Generator ===");
    println!("Emotion: {}", emotion);
    println!("Instrument: {}", instrument);
    println!(
        "Population: {}  Generations: {}  Bars: {}  Mutation rate: {}",
        config.ga.population_size, config.ga.num_generations, config.ga.num_bars, config.ga.mutation_rate
    );
    println!("Seed: {}", seed);
    println!();

    let result = evolver.run(&mut rng);
    report(&result);

    write_transcription(&result.best, &args.transcription)?;
    info!(path = %args.transcription.display(), "wrote transcription");

    if let Some(path) = &args.midi {
        write_midi(&result.best, config.tempo_bpm, path)?;
        info!(path = %path.display(), tempo = config.tempo_bpm, "wrote MIDI");
    }

    if let Some(path) = &args.json {
        let export = RunExport {
            emotion,
            instrument,
            seed,
            best_fitness: result.best_fitness,
            history: &result.history,
            melody: &result.best,
        };
        std::fs::write(path, serde_json::to_string_pretty(&export)?)?;
        info!(path = %path.display(), "wrote JSON");
    }

    Ok(())
}

fn apply_overrides(config: &mut MelodyConfig, args: &Args) {
    if let Some(n) = args.generations {
        config.ga.num_generations = n;
    }
    if let Some(n) = args.population {
        config.ga.population_size = n;
    }
    if let Some(n) = args.bars {
        config.ga.num_bars = n;
    }
    if let Some(rate) = args.mutation_rate {
        config.ga.mutation_rate = rate;
    }
}

fn report(result: &EvolutionResult) {
    println!();
    println!(
        "Best melody: {} bars, {} distinct pitch names",
        result.best.len(),
        result.best_fitness
    );
    print!("{}", transcribe(&result.best));
}
