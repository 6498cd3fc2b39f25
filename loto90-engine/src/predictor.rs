use tracing::debug;

use loto90_db::models::PICK_COUNT;

use crate::candidates;
use crate::random::RandomSource;
use crate::sampler::{complete_uniform, sample_weighted};
use crate::scorer::{is_diverse_enough, score, ScoringContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Moins de `cold_start_threshold` tirages : tirage pondéré direct.
    ColdStart,
    Scoring,
    /// Le filtre de diversité a laissé moins de 5 numéros.
    Completing,
    Done,
}

pub struct PredictionEngine<'a> {
    ctx: ScoringContext<'a>,
}

impl<'a> PredictionEngine<'a> {
    pub fn new(ctx: ScoringContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn initial_phase(&self) -> Phase {
        if self.ctx.history.len() < self.ctx.config.cold_start_threshold {
            Phase::ColdStart
        } else {
            Phase::Scoring
        }
    }

    /// 5 numéros distincts dans [1, 90], triés.
    pub fn predict<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let config = self.ctx.config;
        let mut selected: Vec<u8> = Vec::with_capacity(PICK_COUNT);
        let mut phase = self.initial_phase();

        loop {
            debug!(?phase, held = selected.len(), "phase de prédiction");
            phase = match phase {
                Phase::ColdStart => {
                    let weights = self.ctx.weights.sampling_weights();
                    selected = sample_weighted(&weights, config.max_sampling_attempts, rng);
                    Phase::Done
                }
                Phase::Scoring => {
                    self.select_scored(&mut selected, rng);
                    if selected.len() < PICK_COUNT {
                        Phase::Completing
                    } else {
                        Phase::Done
                    }
                }
                Phase::Completing => {
                    complete_uniform(&mut selected, config.max_sampling_attempts, rng);
                    Phase::Done
                }
                Phase::Done => break,
            };
        }

        selected.sort();
        selected
    }

    /// Sélection gloutonne : les scores sont recalculés contre la prédiction partielle à chaque tour.
    fn select_scored<R: RandomSource + ?Sized>(&self, selected: &mut Vec<u8>, rng: &mut R) {
        let config = self.ctx.config;
        let mut pool: Vec<u8> = candidates::generate(
            self.ctx.patterns,
            self.ctx.weights,
            self.ctx.frequency,
            config,
            rng,
        )
        .into_iter()
        .collect();

        while selected.len() < PICK_COUNT && !pool.is_empty() {
            let mut scored: Vec<(u8, f64)> = pool
                .iter()
                .map(|&n| (n, score(n, selected, &self.ctx, rng)))
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            let pick = scored
                .iter()
                .map(|&(n, _)| n)
                .find(|&n| is_diverse_enough(n, selected, config));

            match pick {
                Some(n) => {
                    selected.push(n);
                    // le filtre ne fait que se resserrer : un rejeté le reste
                    pool.retain(|&c| c != n && is_diverse_enough(c, selected, config));
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::patterns::PatternStore;
    use crate::random::{seeded_rng, ScriptedRandom};
    use crate::weights::WeightTable;
    use loto90_db::models::Sequence;
    use std::collections::BTreeMap;

    fn seq(numbers: &[i64]) -> Sequence {
        Sequence::try_from_numbers(numbers).unwrap()
    }

    struct Fixture {
        frequency: BTreeMap<u8, u32>,
        weights: WeightTable,
        patterns: PatternStore,
        history: Vec<Sequence>,
        config: EngineConfig,
    }

    impl Fixture {
        fn new(sequences: &[Sequence], config: EngineConfig) -> Self {
            let weights = WeightTable::initialize(&mut seeded_rng(Some(1)), &config);
            let mut fixture = Self {
                frequency: BTreeMap::new(),
                weights,
                patterns: PatternStore::default(),
                history: Vec::new(),
                config,
            };
            for s in sequences {
                fixture.history.push(*s);
                fixture.patterns.record(s, &fixture.history);
                fixture.weights.reinforce_frequency(s, &fixture.config);
                for &n in s.numbers() {
                    *fixture.frequency.entry(n).or_insert(0) += 1;
                }
            }
            fixture
        }

        fn engine(&self) -> PredictionEngine<'_> {
            PredictionEngine::new(ScoringContext {
                frequency: &self.frequency,
                weights: &self.weights,
                patterns: &self.patterns,
                history: &self.history,
                config: &self.config,
            })
        }
    }

    fn assert_valid(numbers: &[u8]) {
        assert_eq!(numbers.len(), 5);
        assert!(numbers.windows(2).all(|w| w[0] < w[1]), "non trié : {numbers:?}");
        assert!(numbers.iter().all(|&n| (1..=90).contains(&n)));
    }

    #[test]
    fn test_cold_start_below_two_draws() {
        let fixture = Fixture::new(&[seq(&[1, 2, 3, 4, 5])], EngineConfig::default());
        let engine = fixture.engine();
        assert_eq!(engine.initial_phase(), Phase::ColdStart);
        let numbers = engine.predict(&mut seeded_rng(Some(5)));
        assert_valid(&numbers);
    }

    #[test]
    fn test_scoring_phase_respects_diversity_gate() {
        // grappes serrées : b+1 et b+2 ne peuvent jamais être retenus ensemble
        let history: Vec<Sequence> = (0..20)
            .map(|i| {
                let b = (i % 15) as i64 * 5;
                seq(&[b + 1, b + 2, b + 4, b + 7, b + 11])
            })
            .collect();
        let fixture = Fixture::new(&history, EngineConfig::default());
        let engine = fixture.engine();
        assert_eq!(engine.initial_phase(), Phase::Scoring);

        let mut rng = seeded_rng(Some(9));
        for _ in 0..500 {
            let mut selected = Vec::new();
            engine.select_scored(&mut selected, &mut rng);
            assert!(!selected.is_empty());
            for (i, &a) in selected.iter().enumerate() {
                for &b in &selected[i + 1..] {
                    assert!(a.abs_diff(b) >= 3, "{a} et {b} trop proches : {selected:?}");
                }
            }
        }

        for _ in 0..50 {
            assert_valid(&engine.predict(&mut rng));
        }
    }

    #[test]
    fn test_scoring_picks_dominant_numbers() {
        // 10, 30, 50, 70, 90 à chaque tirage : fréquence et position écrasent le reste
        let history = vec![seq(&[10, 30, 50, 70, 90]); 10];
        let config = EngineConfig {
            random_candidates: 0,
            ..EngineConfig::default()
        };
        let fixture = Fixture::new(&history, config);
        let numbers = fixture.engine().predict(&mut ScriptedRandom::constant(0.5));
        assert_eq!(numbers, vec![10, 30, 50, 70, 90]);
    }

    #[test]
    fn test_completing_fills_after_gate_rejections() {
        // candidats {1, 2, 3, 50, 60} : un seul de 1, 2, 3 passe le filtre
        let history = vec![seq(&[1, 2, 3, 50, 60]), seq(&[1, 2, 3, 70, 80])];
        let config = EngineConfig {
            random_candidates: 0,
            weight_top: 0,
            position_top: 1,
            frequent_share: 0.0,
            ..EngineConfig::default()
        };
        let fixture = Fixture::new(&history, config);
        let engine = fixture.engine();

        let mut selected = Vec::new();
        engine.select_scored(&mut selected, &mut seeded_rng(Some(4)));
        assert_eq!(selected.len(), 3, "retenus : {selected:?}");
        assert!(selected.contains(&50) && selected.contains(&60));
        assert_eq!(selected.iter().filter(|&&n| n <= 3).count(), 1);

        let numbers = engine.predict(&mut seeded_rng(Some(4)));
        assert_valid(&numbers);
        assert!(numbers.contains(&50) && numbers.contains(&60));
        assert!(numbers.iter().any(|&n| n <= 3));
    }
}
