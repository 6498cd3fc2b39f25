use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Coefficients du score multi-critères.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub frequency: f64,
    pub weight: f64,
    pub position: f64,
    pub recent: f64,
    pub repeat_penalty: f64,
    pub jitter: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            frequency: 0.3,
            weight: 0.25,
            position: 0.2,
            recent: 0.15,
            repeat_penalty: 0.1,
            jitter: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_weight_span: f64,
    pub frequency_boost: f64,
    pub learning_rate: f64,
    /// Pénalité d'un numéro prédit mais absent = learning_rate × penalty_factor.
    pub penalty_factor: f64,
    pub weight_floor: f64,
    pub normalize_ceiling: f64,
    pub normalize_target: f64,

    pub frequent_share: f64,
    pub position_top: usize,
    pub weight_top: usize,
    pub random_candidates: usize,

    pub score: ScoreWeights,
    pub min_gap: u8,
    pub close_gap: u8,
    pub close_factor: f64,
    pub near_gap: u8,
    pub near_factor: f64,

    pub cold_start_threshold: usize,
    pub trend_window: usize,
    pub confidence_saturation: usize,
    pub max_sampling_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_weight_span: 0.1,
            frequency_boost: 0.01,
            learning_rate: 0.1,
            penalty_factor: 0.1,
            weight_floor: 0.01,
            normalize_ceiling: 10.0,
            normalize_target: 5.0,
            frequent_share: 0.3,
            position_top: 5,
            weight_top: 20,
            random_candidates: 15,
            score: ScoreWeights::default(),
            min_gap: 3,
            close_gap: 5,
            close_factor: 0.7,
            near_gap: 10,
            near_factor: 0.9,
            cold_start_threshold: 2,
            trend_window: 3,
            confidence_saturation: 50,
            max_sampling_attempts: 4096,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.normalize_target <= 0.0 || self.normalize_ceiling <= 0.0 {
            return Err(ModelError::Config(
                "le plafond et la cible de normalisation doivent être positifs".to_string(),
            ));
        }
        if self.normalize_target > self.normalize_ceiling {
            return Err(ModelError::Config(format!(
                "cible de normalisation {} supérieure au plafond {}",
                self.normalize_target, self.normalize_ceiling
            )));
        }
        if self.weight_floor < 0.0 || self.initial_weight_span <= 0.0 {
            return Err(ModelError::Config(
                "plancher et amplitude initiale des poids invalides".to_string(),
            ));
        }
        if self.max_sampling_attempts == 0 || self.confidence_saturation == 0 {
            return Err(ModelError::Config(
                "max_sampling_attempts et confidence_saturation doivent être > 0".to_string(),
            ));
        }
        Ok(())
    }
}
