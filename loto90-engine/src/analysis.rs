use serde::Serialize;

use loto90_db::models::{Prediction, Sequence};

use crate::model::Model;
use crate::patterns::GapKey;
use crate::random::RandomSource;
use crate::stats::{self, RecentTrend, TOP_NUMBERS};

const MIN_HISTORY_FOR_REPORT: usize = 3;
const REPORT_GAP_COUNT: usize = 6;
const OPTIMAL_SUM_HALF_WIDTH: f64 = 50.0;
const BALANCED_SUM_DEVIATION: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberShare {
    pub number: u8,
    pub frequency: u32,
    /// Part des tirages contenant ce numéro, en %.
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapShare {
    /// Rang de la paire, à partir de 1.
    pub position: u8,
    pub gap: u8,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub top_numbers: Vec<NumberShare>,
    pub top_gaps: Vec<GapShare>,
    pub recent_trend: RecentTrend,
    pub average_sum: i64,
    pub optimal_sum_range: (i64, i64),
}

/// Rapport détaillé des motifs, `None` tant que l'historique compte moins de 3 tirages.
pub fn pattern_report<R: RandomSource>(model: &Model<R>) -> Option<PatternReport> {
    let state = model.state();
    let history = &state.history;
    if history.len() < MIN_HISTORY_FOR_REPORT {
        return None;
    }

    let draws = history.len() as f64;
    let top_numbers = stats::top_numbers(&state.number_frequency, TOP_NUMBERS)
        .into_iter()
        .map(|top| NumberShare {
            number: top.number,
            frequency: top.frequency,
            share_percent: top.frequency as f64 / draws * 100.0,
        })
        .collect();

    let top_gaps = state
        .patterns
        .top_gaps(REPORT_GAP_COUNT)
        .into_iter()
        .map(|(GapKey { position, gap }, count)| GapShare {
            position: position + 1,
            gap,
            count,
        })
        .collect();

    let avg = average_sum(history).unwrap_or(0.0);

    Some(PatternReport {
        top_numbers,
        top_gaps,
        recent_trend: stats::recent_trend(history, model.config().trend_window),
        average_sum: avg.round() as i64,
        optimal_sum_range: (
            (avg - OPTIMAL_SUM_HALF_WIDTH).round() as i64,
            (avg + OPTIMAL_SUM_HALF_WIDTH).round() as i64,
        ),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Spacing {
    Tight,
    Optimal,
    Wide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumDeviation {
    pub historical_average: f64,
    pub deviation: f64,
    pub balanced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionAnalysis {
    pub sum: u32,
    pub even_count: u8,
    pub average_gap: f64,
    /// Absent quand l'historique est vide.
    pub sum_deviation: Option<SumDeviation>,
    pub parity_balanced: bool,
    pub spacing: Spacing,
    pub confidence_band: ConfidenceBand,
}

pub fn analyze_prediction(prediction: &Prediction, history: &[Sequence]) -> PredictionAnalysis {
    let numbers = &prediction.numbers;
    let sum = numbers.sum();
    let even_count = numbers.even_count();
    let average_gap = average_gap(numbers);

    let sum_deviation = average_sum(history).map(|historical_average| {
        let deviation = (sum as f64 - historical_average).abs();
        SumDeviation {
            historical_average,
            deviation,
            balanced: deviation < BALANCED_SUM_DEVIATION,
        }
    });

    let spacing = if average_gap > 15.0 && average_gap < 25.0 {
        Spacing::Optimal
    } else if average_gap < 15.0 {
        Spacing::Tight
    } else {
        Spacing::Wide
    };

    let confidence_band = if prediction.confidence > 70.0 {
        ConfidenceBand::High
    } else if prediction.confidence > 40.0 {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    };

    PredictionAnalysis {
        sum,
        even_count,
        average_gap,
        sum_deviation,
        parity_balanced: even_count == 2 || even_count == 3,
        spacing,
        confidence_band,
    }
}

fn average_sum(history: &[Sequence]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: u64 = history.iter().map(|s| s.sum() as u64).sum();
    Some(total as f64 / history.len() as f64)
}

fn average_gap(sequence: &Sequence) -> f64 {
    let (count, total) = sequence
        .gaps()
        .fold((0u32, 0u32), |(c, t), (_, gap)| (c + 1, t + gap as u32));
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;

    fn seq(numbers: &[i64]) -> Sequence {
        Sequence::try_from_numbers(numbers).unwrap()
    }

    #[test]
    fn test_pattern_report_needs_three_draws() {
        let mut model = Model::new(seeded_rng(Some(2)));
        model.load_historical(vec![vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10]]);
        assert!(pattern_report(&model).is_none());
    }

    #[test]
    fn test_pattern_report_contents() {
        let mut model = Model::new(seeded_rng(Some(2)));
        model.load_historical(vec![
            vec![1, 11, 21, 31, 41],
            vec![1, 11, 21, 31, 41],
            vec![1, 12, 30, 50, 70],
            vec![5, 15, 25, 35, 45],
        ]);
        let report = pattern_report(&model).unwrap();

        assert_eq!(report.top_numbers[0].number, 1);
        assert_eq!(report.top_numbers[0].frequency, 3);
        assert!((report.top_numbers[0].share_percent - 75.0).abs() < 1e-9);

        // écart 10 vu 3 fois à chaque rang ; positions affichées à partir de 1
        assert_eq!(report.top_gaps.len(), 6);
        assert_eq!(report.top_gaps[0], GapShare { position: 1, gap: 10, count: 3 });
        assert!(report.top_gaps.iter().all(|g| (1..=4).contains(&g.position)));

        // sommes 105, 105, 163, 125
        assert_eq!(report.average_sum, 125);
        assert_eq!(report.optimal_sum_range, (75, 175));
        assert!(matches!(report.recent_trend, RecentTrend::Trending(_)));
    }

    #[test]
    fn test_analyze_prediction_balanced() {
        let prediction = Prediction::new(seq(&[10, 27, 44, 61, 78]), 75.0);
        let history = vec![seq(&[20, 30, 40, 50, 60]), seq(&[30, 40, 50, 60, 70])];
        let analysis = analyze_prediction(&prediction, &history);

        assert_eq!(analysis.sum, 220);
        assert_eq!(analysis.even_count, 3);
        assert!(analysis.parity_balanced);
        assert!((analysis.average_gap - 17.0).abs() < 1e-9);
        assert_eq!(analysis.spacing, Spacing::Optimal);
        let deviation = analysis.sum_deviation.unwrap();
        assert!((deviation.historical_average - 225.0).abs() < 1e-9);
        assert!(deviation.balanced);
        assert_eq!(analysis.confidence_band, ConfidenceBand::High);
    }

    #[test]
    fn test_analyze_prediction_unbalanced() {
        let prediction = Prediction::new(seq(&[2, 4, 6, 8, 10]), 41.0);
        let history = vec![seq(&[50, 60, 70, 80, 90])];
        let analysis = analyze_prediction(&prediction, &history);

        assert_eq!(analysis.even_count, 5);
        assert!(!analysis.parity_balanced);
        assert_eq!(analysis.spacing, Spacing::Tight);
        assert!(!analysis.sum_deviation.unwrap().balanced);
        assert_eq!(analysis.confidence_band, ConfidenceBand::Medium);
    }

    #[test]
    fn test_analyze_prediction_without_history() {
        // étendue 60 : écart moyen exactement 15, hors de la bande optimale
        let prediction = Prediction::new(seq(&[1, 20, 40, 50, 61]), 12.0);
        let analysis = analyze_prediction(&prediction, &[]);
        assert!(analysis.sum_deviation.is_none());
        assert!((analysis.average_gap - 15.0).abs() < 1e-9);
        assert_eq!(analysis.spacing, Spacing::Wide);
        assert_eq!(analysis.confidence_band, ConfidenceBand::Low);
    }
}
