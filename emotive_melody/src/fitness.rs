// Fitness: how many distinct pitch names a chromosome uses.
//
// Chord members are flattened into the same set as single notes. Names are
// octave-free, so C5 and C6 count once. Pure and deterministic.

use crate::chromosome::Chromosome;
use crate::pitch::PitchName;
use std::collections::HashSet;

pub fn fitness(chromosome: &Chromosome) -> usize {
    let names: HashSet<PitchName> = chromosome
        .events()
        .flat_map(|event| event.pitch_names())
        .collect();
    names.len()
}
