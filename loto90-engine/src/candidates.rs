use std::collections::{BTreeMap, BTreeSet};

use loto90_db::models::PICK_COUNT;

use crate::config::EngineConfig;
use crate::patterns::PatternStore;
use crate::random::RandomSource;
use crate::weights::WeightTable;

/// Numéros observés triés par fréquence décroissante, puis par numéro croissant.
pub fn rank_by_frequency(frequency: &BTreeMap<u8, u32>) -> Vec<(u8, u32)> {
    let mut entries: Vec<(u8, u32)> = frequency.iter().map(|(&n, &c)| (n, c)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries
}

/// Pool de candidats : fréquents, meilleurs par position, meilleurs poids, et quelques tirages au hasard.
pub fn generate<R: RandomSource + ?Sized>(
    patterns: &PatternStore,
    weights: &WeightTable,
    frequency: &BTreeMap<u8, u32>,
    config: &EngineConfig,
    rng: &mut R,
) -> BTreeSet<u8> {
    let mut candidates = BTreeSet::new();

    let frequent_count = (frequency.len() as f64 * config.frequent_share).ceil() as usize;
    candidates.extend(
        rank_by_frequency(frequency)
            .into_iter()
            .take(frequent_count)
            .map(|(n, _)| n),
    );

    for position in 0..PICK_COUNT as u8 {
        candidates.extend(patterns.top_at_position(position, config.position_top));
    }

    candidates.extend(weights.top(config.weight_top));

    for _ in 0..config.random_candidates {
        candidates.insert(rng.next_number());
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use loto90_db::models::Sequence;

    fn seq(numbers: &[i64]) -> Sequence {
        Sequence::try_from_numbers(numbers).unwrap()
    }

    fn setup(sequences: &[Sequence]) -> (PatternStore, BTreeMap<u8, u32>) {
        let mut patterns = PatternStore::default();
        let mut frequency = BTreeMap::new();
        let mut history = Vec::new();
        for s in sequences {
            history.push(*s);
            patterns.record(s, &history);
            for &n in s.numbers() {
                *frequency.entry(n).or_insert(0) += 1;
            }
        }
        (patterns, frequency)
    }

    #[test]
    fn test_rank_by_frequency_tie_break() {
        let frequency = BTreeMap::from([(9, 2), (4, 2), (7, 3), (1, 1)]);
        assert_eq!(rank_by_frequency(&frequency), vec![(7, 3), (4, 2), (9, 2), (1, 1)]);
    }

    #[test]
    fn test_generate_empty_stats_only_weights_and_random() {
        let config = EngineConfig::default();
        let weights = WeightTable::initialize(&mut ScriptedRandom::constant(0.5), &config);
        let mut rng = ScriptedRandom::constant(0.999);
        let candidates = generate(
            &PatternStore::default(),
            &weights,
            &BTreeMap::new(),
            &config,
            &mut rng,
        );
        // poids tous égaux -> 1..=20, plus le numéro 90 tiré 15 fois
        let expected: BTreeSet<u8> = (1..=20).chain(std::iter::once(90)).collect();
        assert_eq!(candidates, expected);
    }

    #[test]
    fn test_generate_includes_frequent_and_positional() {
        let config = EngineConfig {
            random_candidates: 0,
            weight_top: 0,
            ..EngineConfig::default()
        };
        let (patterns, frequency) = setup(&[
            seq(&[1, 20, 40, 60, 80]),
            seq(&[1, 21, 41, 61, 81]),
            seq(&[2, 22, 42, 62, 82]),
        ]);
        let weights = WeightTable::initialize(&mut ScriptedRandom::constant(0.5), &config);
        let candidates = generate(
            &patterns,
            &weights,
            &frequency,
            &config,
            &mut ScriptedRandom::constant(0.0),
        );
        assert!(candidates.contains(&1));
        // 14 numéros observés, 5 meilleurs par position sur 3 tirages : tous présents
        assert_eq!(candidates.len(), frequency.len());
    }

    #[test]
    fn test_generate_frequent_share_rounds_up() {
        let config = EngineConfig {
            random_candidates: 0,
            weight_top: 0,
            position_top: 0,
            ..EngineConfig::default()
        };
        let (patterns, frequency) = setup(&[
            seq(&[1, 2, 3, 4, 5]),
            seq(&[1, 2, 3, 4, 6]),
            seq(&[1, 2, 3, 7, 8]),
        ]);
        // 8 numéros observés -> ceil(2.4) = 3 : 1, 2, 3
        let weights = WeightTable::initialize(&mut ScriptedRandom::constant(0.5), &config);
        let candidates = generate(
            &patterns,
            &weights,
            &frequency,
            &config,
            &mut ScriptedRandom::constant(0.0),
        );
        assert_eq!(candidates, BTreeSet::from([1, 2, 3]));
    }
}
