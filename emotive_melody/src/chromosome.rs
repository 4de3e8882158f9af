// Chromosomes: one candidate melody, a fixed number of bars.
//
// Bars are generated independently from the same palette and instrument;
// there is no state carried from one bar to the next. Each chromosome owns
// its measures outright, and the genetic operators (operators.rs) copy bars
// rather than sharing them.

use crate::config::Palette;
use crate::emotion::Instrument;
use crate::measure::{Event, Measure, generate_measure};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    pub bars: Vec<Measure>,
}

impl Chromosome {
    pub fn new(bars: Vec<Measure>) -> Self {
        Chromosome { bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All events in playback order: bar by bar, then within each bar.
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.bars.iter().flat_map(|bar| bar.events.iter())
    }

    /// Total length in beats.
    pub fn total_duration(&self) -> f64 {
        self.bars.iter().map(Measure::total_duration).sum()
    }
}

/// Build a chromosome of `num_bars` freshly generated measures.
pub fn generate_chromosome(
    palette: &Palette,
    instrument: Instrument,
    num_bars: usize,
    rng: &mut impl Rng,
) -> Chromosome {
    let bars = (0..num_bars)
        .map(|_| generate_measure(palette, instrument, rng))
        .collect();
    Chromosome { bars }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MelodyConfig;
    use crate::emotion::Emotion;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_chromosome_has_requested_bars() {
        let palette = MelodyConfig::default().palette(Emotion::Calm).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for num_bars in [2, 5, 8] {
            let c = generate_chromosome(&palette, Instrument::Piano, num_bars, &mut rng);
            assert_eq!(c.len(), num_bars);
            assert!((c.total_duration() - 4.0 * num_bars as f64).abs() < 1e-9);
            assert!(c.bars.iter().all(|b| b.instrument == Instrument::Piano));
        }
    }

    #[test]
    fn test_events_walk_bars_in_order() {
        let palette = MelodyConfig::default().palette(Emotion::Joy).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let c = generate_chromosome(&palette, Instrument::Flute, 3, &mut rng);
        let flat: Vec<&Event> = c.events().collect();
        let expected: Vec<&Event> = c.bars.iter().flat_map(|b| &b.events).collect();
        assert_eq!(flat, expected);
    }
}
