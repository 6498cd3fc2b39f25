use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use loto90_db::models::{Sequence, POOL_SIZE};

use crate::config::EngineConfig;
use crate::random::RandomSource;

/// Poids d'un numéro absent de la table (état partiel ou corrompu).
pub const ABSENT_WEIGHT: f64 = 0.1;

/// Plancher du tirage initial : un poids de départ reste strictement positif.
const MIN_INITIAL_WEIGHT: f64 = 1e-6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: BTreeMap<u8, f64>,
    /// Numéros déjà renforcés : le plancher ne s'applique qu'à eux.
    #[serde(default)]
    reinforced: BTreeSet<u8>,
}

impl WeightTable {
    pub fn initialize<R: RandomSource + ?Sized>(rng: &mut R, config: &EngineConfig) -> Self {
        let weights = (1..=POOL_SIZE)
            .map(|n| {
                let w = rng.next_f64() * config.initial_weight_span;
                (n, w.max(MIN_INITIAL_WEIGHT))
            })
            .collect();
        Self {
            weights,
            reinforced: BTreeSet::new(),
        }
    }

    pub fn get(&self, number: u8) -> f64 {
        self.weights.get(&number).copied().unwrap_or(ABSENT_WEIGHT)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.weights.iter().map(|(&n, &w)| (n, w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn max(&self) -> f64 {
        self.weights.values().copied().fold(0.0, f64::max)
    }

    pub fn is_reinforced(&self, number: u8) -> bool {
        self.reinforced.contains(&number)
    }

    /// Poids de chaque numéro 1..=90, dans l'ordre.
    pub fn sampling_weights(&self) -> Vec<f64> {
        (1..=POOL_SIZE).map(|n| self.get(n)).collect()
    }

    /// Les `count` numéros de plus fort poids ; à égalité, le plus petit numéro d'abord.
    pub fn top(&self, count: usize) -> Vec<u8> {
        let mut entries: Vec<(u8, f64)> = self.iter().collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        entries.into_iter().take(count).map(|(n, _)| n).collect()
    }

    pub fn reinforce_frequency(&mut self, sequence: &Sequence, config: &EngineConfig) {
        for &n in sequence.numbers() {
            *self.weights.entry(n).or_insert(ABSENT_WEIGHT) += config.frequency_boost;
            self.reinforced.insert(n);
        }
    }

    pub fn reinforce_learning(&mut self, predicted: &[u8], matched: &[u8], config: &EngineConfig) {
        for &n in matched {
            *self.weights.entry(n).or_insert(ABSENT_WEIGHT) += config.learning_rate;
            self.reinforced.insert(n);
        }

        let penalty = config.learning_rate * config.penalty_factor;
        for &n in predicted.iter().filter(|n| !matched.contains(n)) {
            let w = self.weights.entry(n).or_insert(ABSENT_WEIGHT);
            *w = (*w - penalty).max(config.weight_floor);
            self.reinforced.insert(n);
        }
    }

    /// Ramène le maximum à `normalize_target` dès qu'il dépasse `normalize_ceiling`.
    pub fn normalize(&mut self, config: &EngineConfig) -> bool {
        let max = self.max();
        if max <= config.normalize_ceiling {
            return false;
        }

        let scale = max / config.normalize_target;
        for (n, w) in self.weights.iter_mut() {
            *w /= scale;
            if self.reinforced.contains(n) {
                *w = w.max(config.weight_floor);
            }
        }
        debug!(previous_max = max, scale, "poids renormalisés");
        true
    }
}
