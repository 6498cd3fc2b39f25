use loto90_db::models::{validate_sequence, Sequence};
use loto90_engine::model::{Model, ModelState};
use loto90_engine::random::seeded_rng;
use loto90_engine::weights::WeightTable;
use loto90_engine::EngineConfig;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Load(Vec<Vec<i64>>),
    Submit(Vec<i64>),
    Predict,
}

fn raw_sequence() -> impl Strategy<Value = Vec<i64>> {
    prop_oneof![
        4 => proptest::sample::subsequence((1..=90i64).collect::<Vec<_>>(), 5),
        1 => proptest::collection::vec(-5i64..100, 0..8),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        proptest::collection::vec(raw_sequence(), 0..6).prop_map(Op::Load),
        raw_sequence().prop_map(Op::Submit),
        Just(Op::Predict),
    ]
}

fn apply(model: &mut Model, op: &Op) {
    match op {
        Op::Load(batch) => {
            model.load_historical(batch);
        }
        Op::Submit(raw) => {
            let _ = model.submit_result(raw);
        }
        Op::Predict => {
            let prediction = model.predict().expect("prédiction valide");
            assert!(validate_sequence(
                &prediction
                    .numbers
                    .numbers()
                    .iter()
                    .map(|&n| n as i64)
                    .collect::<Vec<_>>()
            ));
        }
    }
}

proptest! {
    #[test]
    fn validator_matches_definition(raw in proptest::collection::vec(-5i64..100, 0..8)) {
        let mut sorted = raw.clone();
        sorted.sort();
        sorted.dedup();
        let expected = raw.len() == 5
            && sorted.len() == 5
            && raw.iter().all(|n| (1..=90).contains(n));
        prop_assert_eq!(validate_sequence(&raw), expected);
        prop_assert_eq!(Sequence::try_from_numbers(&raw).is_ok(), expected);
    }

    #[test]
    fn confidence_stays_in_range(seed in any::<u64>(), ops in proptest::collection::vec(op(), 0..12)) {
        let mut model = Model::new(seeded_rng(Some(seed)));
        for op in &ops {
            apply(&mut model, op);
            let confidence = model.confidence();
            prop_assert!((0.0..=100.0).contains(&confidence), "confiance {}", confidence);
            prop_assert!(model.stats().confidence_percent <= 100);
        }
    }

    #[test]
    fn learning_keeps_weights_bounded(
        seed in any::<u64>(),
        rounds in proptest::collection::vec(
            (
                proptest::sample::subsequence((1..=90u8).collect::<Vec<_>>(), 5),
                proptest::sample::subsequence((1..=90u8).collect::<Vec<_>>(), 0..=5),
            ),
            1..200,
        ),
    ) {
        let config = EngineConfig::default();
        let mut weights = WeightTable::initialize(&mut seeded_rng(Some(seed)), &config);
        for (predicted, candidates) in &rounds {
            let matched: Vec<u8> = candidates
                .iter()
                .copied()
                .filter(|n| predicted.contains(n))
                .collect();
            weights.reinforce_learning(predicted, &matched, &config);
            let rescaled = weights.normalize(&config);

            prop_assert!(weights.max() <= config.normalize_ceiling);
            if rescaled {
                prop_assert!(weights.max() <= config.normalize_target + 1e-9);
            }
            for (n, w) in weights.iter() {
                prop_assert!(w >= 0.0);
                if weights.is_reinforced(n) {
                    prop_assert!(w >= config.weight_floor, "poids {} pour {}", w, n);
                }
            }
        }
    }

    #[test]
    fn state_roundtrip_is_lossless(seed in any::<u64>(), ops in proptest::collection::vec(op(), 0..10)) {
        let mut model = Model::new(seeded_rng(Some(seed)));
        for op in &ops {
            apply(&mut model, op);
        }

        let json = serde_json::to_string(model.state()).unwrap();
        let state: ModelState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&state, model.state());

        let restored = Model::from_state(state, EngineConfig::default(), seeded_rng(Some(seed))).unwrap();

        prop_assert_eq!(restored.stats(), model.stats());
        prop_assert_eq!(restored.state(), model.state());
    }
}
