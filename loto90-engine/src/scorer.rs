use std::collections::BTreeMap;

use loto90_db::models::{Sequence, PICK_COUNT};

use crate::config::EngineConfig;
use crate::patterns::PatternStore;
use crate::random::RandomSource;
use crate::weights::WeightTable;

/// Vue en lecture seule de l'état du modèle pendant le scoring.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub frequency: &'a BTreeMap<u8, u32>,
    pub weights: &'a WeightTable,
    pub patterns: &'a PatternStore,
    pub history: &'a [Sequence],
    pub config: &'a EngineConfig,
}

/// Partie déterministe du score : somme pondérée des critères × multiplicateur de diversité.
pub fn base_score(number: u8, partial: &[u8], ctx: &ScoringContext<'_>) -> f64 {
    let coef = &ctx.config.score;
    let mut score = 0.0;

    let frequency = ctx.frequency.get(&number).copied().unwrap_or(0);
    score += frequency as f64 * coef.frequency;

    score += ctx.weights.get(number) * coef.weight;

    // Parcourt tous les rangs bas 0..(5 - déjà choisis), pas seulement le prochain.
    let remaining = PICK_COUNT.saturating_sub(partial.len());
    for position in 0..remaining {
        score += ctx.patterns.position_count(position as u8, number) as f64 * coef.position;
    }

    let window = ctx.config.trend_window;
    if ctx.history.len() >= window {
        let recent = ctx.history[ctx.history.len() - window..]
            .iter()
            .filter(|s| s.contains(number))
            .count();
        score += recent as f64 * coef.recent;
    }

    if let Some(last) = ctx.history.last() {
        if last.contains(number) {
            score -= coef.repeat_penalty;
        }
    }

    score * diversity_multiplier(number, partial, ctx.config)
}

pub fn score<R: RandomSource + ?Sized>(
    number: u8,
    partial: &[u8],
    ctx: &ScoringContext<'_>,
    rng: &mut R,
) -> f64 {
    let jitter = rng.next_f64() * ctx.config.score.jitter;
    (base_score(number, partial, ctx) + jitter).max(0.0)
}

/// Vrai si le numéro est à au moins `min_gap` de chacun des numéros déjà retenus.
pub fn is_diverse_enough(number: u8, partial: &[u8], config: &EngineConfig) -> bool {
    partial
        .iter()
        .all(|&chosen| number.abs_diff(chosen) >= config.min_gap)
}

pub fn diversity_multiplier(number: u8, partial: &[u8], config: &EngineConfig) -> f64 {
    partial.iter().fold(1.0, |acc, &chosen| {
        let gap = number.abs_diff(chosen);
        if gap < config.close_gap {
            acc * config.close_factor
        } else if gap < config.near_gap {
            acc * config.near_factor
        } else {
            acc
        }
    })
}
