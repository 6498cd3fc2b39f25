use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use loto90_db::models::{Sequence, TopNumber};

use crate::candidates::rank_by_frequency;

pub const TOP_NUMBERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecentTrend {
    InsufficientData,
    NoClearTrend,
    /// Numéros vus plus d'une fois dans la fenêtre récente, du plus fréquent au moins fréquent.
    Trending(Vec<u8>),
}

impl fmt::Display for RecentTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecentTrend::InsufficientData => write!(f, "Données insuffisantes"),
            RecentTrend::NoClearTrend => write!(f, "Aucune tendance claire"),
            RecentTrend::Trending(numbers) => {
                let joined = numbers
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{joined}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_predictions: u32,
    pub accuracy_percent: u32,
    pub confidence_percent: u32,
    pub data_point_count: usize,
    pub distinct_pattern_count: usize,
    pub top_numbers: Vec<TopNumber>,
    pub recent_trend: RecentTrend,
}

pub fn top_numbers(frequency: &BTreeMap<u8, u32>, count: usize) -> Vec<TopNumber> {
    rank_by_frequency(frequency)
        .into_iter()
        .take(count)
        .map(|(number, frequency)| TopNumber { number, frequency })
        .collect()
}

pub fn recent_trend(history: &[Sequence], window: usize) -> RecentTrend {
    if window == 0 || history.len() < window {
        return RecentTrend::InsufficientData;
    }

    let mut counts: BTreeMap<u8, u32> = BTreeMap::new();
    for sequence in &history[history.len() - window..] {
        for &n in sequence.numbers() {
            *counts.entry(n).or_insert(0) += 1;
        }
    }

    let trending: Vec<u8> = rank_by_frequency(&counts)
        .into_iter()
        .filter(|&(_, c)| c > 1)
        .map(|(n, _)| n)
        .collect();

    if trending.is_empty() {
        RecentTrend::NoClearTrend
    } else {
        RecentTrend::Trending(trending)
    }
}

pub fn accuracy_percent(total_predictions: u32, correct_predictions: f64) -> u32 {
    if total_predictions == 0 {
        return 0;
    }
    (correct_predictions / total_predictions as f64 * 100.0).round().max(0.0) as u32
}
