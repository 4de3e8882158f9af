// Genetic operators: single-point crossover and per-bar mutation.
//
// Crossover splices two parents at a bar boundary: the child takes the
// first parent's bars before the split and the second parent's bars from
// the split onward. The split is drawn from [1, len-1], so both parents
// always contribute. Bars are cloned, never shared.
//
// Mutation walks the bars and, with independent probability
// `mutation_rate`, swaps each one for a freshly generated measure.

use crate::chromosome::Chromosome;
use crate::config::Palette;
use crate::emotion::Instrument;
use crate::measure::generate_measure;
use rand::Rng;

/// Splice `parent1[..split]` with `parent2[split..]`.
///
/// Both parents must have the same number of bars, and `split` must be
/// within `1..len`.
pub fn crossover_at(parent1: &Chromosome, parent2: &Chromosome, split: usize) -> Chromosome {
    debug_assert_eq!(parent1.len(), parent2.len());
    debug_assert!(split >= 1 && split < parent1.len());
    let bars = parent1.bars[..split]
        .iter()
        .chain(&parent2.bars[split..])
        .cloned()
        .collect();
    Chromosome::new(bars)
}

/// Crossover at a uniformly random split point in `[1, len-1]`.
pub fn crossover(parent1: &Chromosome, parent2: &Chromosome, rng: &mut impl Rng) -> Chromosome {
    let split = rng.random_range(1..parent1.len());
    crossover_at(parent1, parent2, split)
}

/// Regenerate each bar with probability `mutation_rate`. Returns the number
/// of bars replaced.
pub fn mutate(
    chromosome: &mut Chromosome,
    palette: &Palette,
    instrument: Instrument,
    mutation_rate: f64,
    rng: &mut impl Rng,
) -> usize {
    let mut replaced = 0;
    for bar in chromosome.bars.iter_mut() {
        if rng.random::<f64>() < mutation_rate {
            *bar = generate_measure(palette, instrument, rng);
            replaced += 1;
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::generate_chromosome;
    use crate::config::MelodyConfig;
    use crate::emotion::Emotion;
    use crate::measure::{Event, Measure};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parents(num_bars: usize, rng: &mut StdRng) -> (Chromosome, Chromosome) {
        let palette = MelodyConfig::default().palette(Emotion::Joy).unwrap();
        (
            generate_chromosome(&palette, Instrument::Piano, num_bars, rng),
            generate_chromosome(&palette, Instrument::Piano, num_bars, rng),
        )
    }

    #[test]
    fn test_crossover_at_is_exact_splice() {
        let mut rng = StdRng::seed_from_u64(10);
        let (p1, p2) = parents(6, &mut rng);
        for split in 1..6 {
            let child = crossover_at(&p1, &p2, split);
            assert_eq!(child.len(), 6);
            assert_eq!(child.bars[..split], p1.bars[..split]);
            assert_eq!(child.bars[split..], p2.bars[split..]);
        }
    }

    #[test]
    fn test_random_crossover_keeps_both_parents() {
        let mut rng = StdRng::seed_from_u64(20);
        let (p1, p2) = parents(8, &mut rng);
        for _ in 0..50 {
            let child = crossover(&p1, &p2, &mut rng);
            assert_eq!(child.len(), 8);
            // Some split in 1..8 must explain the child exactly.
            let split = (1..8)
                .find(|&k| child.bars[..k] == p1.bars[..k] && child.bars[k..] == p2.bars[k..]);
            assert!(split.is_some(), "child is not a single-point splice");
            // The first bar always comes from parent 1, the last from parent 2.
            assert_eq!(child.bars[0], p1.bars[0]);
            assert_eq!(child.bars[7], p2.bars[7]);
        }
    }

    #[test]
    fn test_crossover_with_two_bars_always_splits_in_the_middle() {
        let mut rng = StdRng::seed_from_u64(30);
        let (p1, p2) = parents(2, &mut rng);
        for _ in 0..10 {
            let child = crossover(&p1, &p2, &mut rng);
            assert_eq!(child.bars, vec![p1.bars[0].clone(), p2.bars[1].clone()]);
        }
    }

    #[test]
    fn test_zero_rate_mutation_is_identity() {
        let mut rng = StdRng::seed_from_u64(40);
        let palette = MelodyConfig::default().palette(Emotion::Anger).unwrap();
        let original = generate_chromosome(&palette, Instrument::Violin, 8, &mut rng);
        let mut mutated = original.clone();
        for _ in 0..20 {
            let replaced = mutate(&mut mutated, &palette, Instrument::Violin, 0.0, &mut rng);
            assert_eq!(replaced, 0);
        }
        assert_eq!(mutated, original);
    }

    #[test]
    fn test_full_rate_mutation_replaces_every_bar() {
        let mut rng = StdRng::seed_from_u64(50);
        let palette = MelodyConfig::default().palette(Emotion::Calm).unwrap();
        // A sentinel pitch outside the Calm pools marks untouched bars.
        let sentinel = Measure {
            instrument: Instrument::Guitar,
            events: vec![Event::Note {
                pitch: "C#2".parse().unwrap(),
                duration: 4.0,
            }],
        };
        let mut chromosome = Chromosome::new(vec![sentinel.clone(); 5]);
        let replaced = mutate(&mut chromosome, &palette, Instrument::Flute, 1.0, &mut rng);
        assert_eq!(replaced, 5);
        assert_eq!(chromosome.len(), 5);
        for bar in &chromosome.bars {
            assert_ne!(*bar, sentinel);
            assert_eq!(bar.instrument, Instrument::Flute);
            assert!((bar.total_duration() - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_partial_mutation_keeps_length() {
        let mut rng = StdRng::seed_from_u64(60);
        let palette = MelodyConfig::default().palette(Emotion::Joy).unwrap();
        let mut chromosome = generate_chromosome(&palette, Instrument::Piano, 8, &mut rng);
        for _ in 0..20 {
            mutate(&mut chromosome, &palette, Instrument::Piano, 0.5, &mut rng);
            assert_eq!(chromosome.len(), 8);
        }
    }
}
