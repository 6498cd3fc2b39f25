use tracing::warn;

use loto90_db::models::{PICK_COUNT, POOL_SIZE};

use crate::random::RandomSource;

/// Tirage par roulette sur les numéros 1..=weights.len().
pub fn weighted_pick<R: RandomSource + ?Sized>(weights: &[f64], rng: &mut R) -> u8 {
    let total: f64 = weights.iter().sum();
    let mut r = rng.next_f64() * total;

    for (i, &w) in weights.iter().enumerate() {
        r -= w;
        if r <= 0.0 {
            return (i + 1) as u8;
        }
    }

    // Erreur d'arrondi : repli sur un tirage uniforme
    rng.next_number()
}

/// 5 numéros distincts tirés au prorata des poids, triés.
pub fn sample_weighted<R: RandomSource + ?Sized>(
    weights: &[f64],
    max_attempts: usize,
    rng: &mut R,
) -> Vec<u8> {
    let mut selected = Vec::with_capacity(PICK_COUNT);
    let mut attempts = 0;

    while selected.len() < PICK_COUNT && attempts < max_attempts {
        attempts += 1;
        let n = weighted_pick(weights, rng);
        if !selected.contains(&n) {
            selected.push(n);
        }
    }

    if selected.len() < PICK_COUNT {
        warn!(attempts, held = selected.len(), "tirage pondéré plafonné, complétion déterministe");
        fill_in_order(&mut selected);
    }

    selected.sort();
    selected
}

/// Complète `selected` jusqu'à 5 numéros par tirages uniformes sans doublon.
pub fn complete_uniform<R: RandomSource + ?Sized>(
    selected: &mut Vec<u8>,
    max_attempts: usize,
    rng: &mut R,
) {
    let mut attempts = 0;
    while selected.len() < PICK_COUNT && attempts < max_attempts {
        attempts += 1;
        let n = rng.next_number();
        if !selected.contains(&n) {
            selected.push(n);
        }
    }

    if selected.len() < PICK_COUNT {
        warn!(attempts, held = selected.len(), "complétion uniforme plafonnée, complétion déterministe");
        fill_in_order(selected);
    }
}

/// Ajoute les plus petits numéros encore libres.
fn fill_in_order(selected: &mut Vec<u8>) {
    for n in 1..=POOL_SIZE {
        if selected.len() >= PICK_COUNT {
            break;
        }
        if !selected.contains(&n) {
            selected.push(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{seeded_rng, ScriptedRandom};

    #[test]
    fn test_weighted_pick_walks_cumulative_weights() {
        let weights = [1.0, 2.0, 1.0];
        // total 4 : r = 0.5 -> 1, r = 2.0 -> 2, r = 3.6 -> 3
        assert_eq!(weighted_pick(&weights, &mut ScriptedRandom::constant(0.125)), 1);
        assert_eq!(weighted_pick(&weights, &mut ScriptedRandom::constant(0.5)), 2);
        assert_eq!(weighted_pick(&weights, &mut ScriptedRandom::constant(0.9)), 3);
    }

    #[test]
    fn test_weighted_pick_favors_heavy_number() {
        let mut weights = vec![0.01; 90];
        weights[41] = 50.0;
        let mut rng = seeded_rng(Some(3));
        let hits = (0..1000).filter(|_| weighted_pick(&weights, &mut rng) == 42).count();
        assert!(hits > 900, "42 tiré {hits} fois sur 1000");
    }

    #[test]
    fn test_sample_weighted_distinct_sorted() {
        let weights = vec![0.1; 90];
        let mut rng = seeded_rng(Some(11));
        for _ in 0..200 {
            let numbers = sample_weighted(&weights, 4096, &mut rng);
            assert_eq!(numbers.len(), 5);
            assert!(numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(numbers.iter().all(|&n| (1..=90).contains(&n)));
        }
    }

    #[test]
    fn test_sample_weighted_degenerate_weights_terminates() {
        // Tout le poids sur 42 : le rejet plafonne puis complète dans l'ordre
        let mut weights = vec![0.0; 90];
        weights[41] = 1.0;
        let numbers = sample_weighted(&weights, 100, &mut ScriptedRandom::constant(0.3));
        assert_eq!(numbers, vec![1, 2, 3, 4, 42]);
    }

    #[test]
    fn test_complete_uniform_terminates_with_stuck_source() {
        let mut selected = vec![10, 20];
        complete_uniform(&mut selected, 50, &mut ScriptedRandom::constant(0.0));
        // 0.0 donne toujours 1, puis repli 2, 3
        assert_eq!(selected, vec![10, 20, 1, 2, 3]);
    }
}
