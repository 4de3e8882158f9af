// The generational loop.
//
// `Evolver::new` validates the config, the chosen emotion's palette, and
// the GA sizing up front; after that `run` cannot fail. One run:
//
// 1. Seed `population_size` chromosomes from the palette.
// 2. For each generation: score every chromosome (in parallel, order
//    preserved), stable-sort best first, keep the top half as survivors,
//    and refill the population with children. Each child comes from two
//    distinct survivors, via crossover and then mutation. An odd
//    population simply gets one more child than survivors.
// 3. Score the final population and return the first chromosome with the
//    highest fitness.
//
// Ties keep population order both in the sort and in the final pick, so a
// seeded RNG reproduces the same run.
//
// Each generation logs its best fitness (before replacement) through
// `tracing` and appends a `GenerationReport` to the result's history.

use crate::chromosome::{Chromosome, generate_chromosome};
use crate::config::{GaParams, MelodyConfig, Palette};
use crate::emotion::{Emotion, Instrument};
use crate::error::Result;
use crate::fitness::fitness;
use crate::operators::{crossover, mutate};
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Per-generation progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    /// 1-based generation index.
    pub generation: usize,
    /// Best fitness in the population entering this generation.
    pub best_fitness: usize,
    pub mean_fitness: f64,
    /// Bars regenerated by mutation while producing this generation's children.
    pub mutated_bars: usize,
}

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    pub best: Chromosome,
    pub best_fitness: usize,
    /// The population the winner was picked from.
    pub final_population: Vec<Chromosome>,
    pub history: Vec<GenerationReport>,
}

/// A validated, ready-to-run GA for one emotion/instrument pair.
#[derive(Debug, Clone)]
pub struct Evolver {
    palette: Palette,
    instrument: Instrument,
    params: GaParams,
}

impl Evolver {
    pub fn new(config: &MelodyConfig, emotion: Emotion, instrument: Instrument) -> Result<Self> {
        config.validate_params()?;
        let palette = config.palette(emotion)?;
        Ok(Evolver {
            palette,
            instrument,
            params: config.ga.clone(),
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn params(&self) -> &GaParams {
        &self.params
    }

    /// Seed a fresh population.
    pub fn initial_population(&self, rng: &mut impl Rng) -> Vec<Chromosome> {
        (0..self.params.population_size)
            .map(|_| generate_chromosome(&self.palette, self.instrument, self.params.num_bars, rng))
            .collect()
    }

    /// Advance one generation. Returns the next population and a report
    /// describing the population that was consumed.
    pub fn step(
        &self,
        population: Vec<Chromosome>,
        generation: usize,
        rng: &mut impl Rng,
    ) -> (Vec<Chromosome>, GenerationReport) {
        let ranked = rank(population);
        let best_fitness = ranked.first().map_or(0, |(_, f)| *f);
        let mean_fitness = if ranked.is_empty() {
            0.0
        } else {
            ranked.iter().map(|(_, f)| *f as f64).sum::<f64>() / ranked.len() as f64
        };

        let survivors: Vec<Chromosome> = ranked
            .into_iter()
            .take(self.params.survivors())
            .map(|(c, _)| c)
            .collect();

        let mut next = survivors.clone();
        let mut mutated_bars = 0;
        while next.len() < self.params.population_size {
            let (a, b) = pick_two_distinct(survivors.len(), rng);
            let mut child = crossover(&survivors[a], &survivors[b], rng);
            mutated_bars += mutate(
                &mut child,
                &self.palette,
                self.instrument,
                self.params.mutation_rate,
                rng,
            );
            next.push(child);
        }

        let report = GenerationReport {
            generation,
            best_fitness,
            mean_fitness,
            mutated_bars,
        };
        info!(generation, best_fitness, "generation complete");
        debug!(mean_fitness, mutated_bars, "generation details");
        (next, report)
    }

    /// Run every generation and return the fittest chromosome found.
    pub fn run(&self, rng: &mut impl Rng) -> EvolutionResult {
        info!(
            emotion = %self.palette.emotion,
            instrument = %self.instrument,
            population = self.params.population_size,
            generations = self.params.num_generations,
            bars = self.params.num_bars,
            "starting evolution"
        );

        let mut population = self.initial_population(rng);
        let mut history = Vec::with_capacity(self.params.num_generations);
        for generation in 1..=self.params.num_generations {
            let (next, report) = self.step(population, generation, rng);
            population = next;
            history.push(report);
        }

        let (best, best_fitness) = fittest(&population);
        let best = best.clone();
        info!(best_fitness, "evolution finished");
        EvolutionResult {
            best,
            best_fitness,
            final_population: population,
            history,
        }
    }
}

/// Validate and run in one call.
pub fn evolve(
    config: &MelodyConfig,
    emotion: Emotion,
    instrument: Instrument,
    rng: &mut impl Rng,
) -> Result<EvolutionResult> {
    Ok(Evolver::new(config, emotion, instrument)?.run(rng))
}

/// Score the population and stable-sort it best first.
fn rank(population: Vec<Chromosome>) -> Vec<(Chromosome, usize)> {
    let scores: Vec<usize> = population.par_iter().map(fitness).collect();
    let mut ranked: Vec<(Chromosome, usize)> = population.into_iter().zip(scores).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// First chromosome with the highest fitness. The population is never
/// empty here: `Evolver::new` guarantees at least four members.
fn fittest(population: &[Chromosome]) -> (&Chromosome, usize) {
    let scores: Vec<usize> = population.par_iter().map(fitness).collect();
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    (&population[best], scores[best])
}

/// Two distinct indices in `0..len`, uniformly, without replacement.
fn pick_two_distinct(len: usize, rng: &mut impl Rng) -> (usize, usize) {
    let first = rng.random_range(0..len);
    let mut second = rng.random_range(0..len - 1);
    if second >= first {
        second += 1;
    }
    (first, second)
}
