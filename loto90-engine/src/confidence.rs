use crate::config::EngineConfig;
use crate::patterns::PatternStore;

const DATA_SHARE: f64 = 40.0;
const ACCURACY_SHARE: f64 = 0.4;
const CONSISTENCY_SHARE: f64 = 20.0;

/// Confiance 0-100 : volume de données (40), précision cumulée (40), régularité des écarts (20).
pub fn recompute(
    history_len: usize,
    total_predictions: u32,
    correct_predictions: f64,
    patterns: &PatternStore,
    config: &EngineConfig,
) -> f64 {
    let data_factor =
        (history_len as f64 / config.confidence_saturation as f64).min(1.0) * DATA_SHARE;

    let accuracy_factor = if total_predictions > 0 {
        correct_predictions / total_predictions as f64 * 100.0 * ACCURACY_SHARE
    } else {
        0.0
    };

    let consistency_factor = patterns.consistency() * CONSISTENCY_SHARE;

    (data_factor + accuracy_factor + consistency_factor).clamp(0.0, 100.0)
}
