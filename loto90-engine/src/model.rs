use std::collections::BTreeMap;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use loto90_db::models::{Evaluation, Prediction, Sequence, PICK_COUNT};

use crate::config::EngineConfig;
use crate::confidence;
use crate::error::ModelError;
use crate::patterns::PatternStore;
use crate::predictor::PredictionEngine;
use crate::random::RandomSource;
use crate::sampler::complete_uniform;
use crate::scorer::ScoringContext;
use crate::stats::{self, Stats, TOP_NUMBERS};
use crate::weights::WeightTable;

/// État complet du modèle, tel que persisté par le collaborateur de stockage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    #[serde(default)]
    pub history: Vec<Sequence>,
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub number_frequency: BTreeMap<u8, u32>,
    #[serde(default)]
    pub patterns: PatternStore,
    /// Table vide si absente : `Model::from_state` la régénère.
    #[serde(default)]
    pub weights: WeightTable,
    #[serde(default)]
    pub total_predictions: u32,
    /// Somme des fractions de précision, pas un nombre de succès.
    #[serde(default)]
    pub correct_predictions: f64,
    #[serde(default)]
    pub confidence: f64,
}

impl ModelState {
    pub fn fresh<R: RandomSource + ?Sized>(rng: &mut R, config: &EngineConfig) -> Self {
        Self {
            history: Vec::new(),
            predictions: Vec::new(),
            number_frequency: BTreeMap::new(),
            patterns: PatternStore::default(),
            weights: WeightTable::initialize(rng, config),
            total_predictions: 0,
            correct_predictions: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReport {
    pub success: bool,
    pub message: String,
    /// Évaluation de la dernière prédiction en attente, s'il y en avait une.
    pub evaluation: Option<Evaluation>,
}

fn scoring_context<'a>(state: &'a ModelState, config: &'a EngineConfig) -> ScoringContext<'a> {
    ScoringContext {
        frequency: &state.number_frequency,
        weights: &state.weights,
        patterns: &state.patterns,
        history: &state.history,
        config,
    }
}

/// Modèle de prédiction. Un seul appelant mutateur à la fois : aucun verrou interne.
pub struct Model<R: RandomSource = StdRng> {
    state: ModelState,
    config: EngineConfig,
    rng: R,
}

impl<R: RandomSource> Model<R> {
    pub fn new(mut rng: R) -> Self {
        let config = EngineConfig::default();
        let state = ModelState::fresh(&mut rng, &config);
        Self { state, config, rng }
    }

    pub fn with_config(config: EngineConfig, mut rng: R) -> Result<Self, ModelError> {
        config.validate()?;
        let state = ModelState::fresh(&mut rng, &config);
        Ok(Self { state, config, rng })
    }

    /// La confiance sauvegardée est ignorée et recalculée depuis l'état.
    pub fn from_state(
        mut state: ModelState,
        config: EngineConfig,
        mut rng: R,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if state.weights.is_empty() {
            state.weights = WeightTable::initialize(&mut rng, &config);
        }
        state.confidence = confidence::recompute(
            state.history.len(),
            state.total_predictions,
            state.correct_predictions,
            &state.patterns,
            &config,
        );
        Ok(Self { state, config, rng })
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &[Sequence] {
        &self.state.history
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.state.predictions
    }

    pub fn confidence(&self) -> f64 {
        self.state.confidence
    }

    /// Ingère chaque séquence valide, ignore silencieusement les autres ; retourne le nombre ingéré.
    pub fn load_historical<I, S>(&mut self, sequences: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[i64]>,
    {
        let mut total = 0;
        let mut valid_count = 0;
        for raw in sequences {
            total += 1;
            if let Ok(sequence) = Sequence::try_from_numbers(raw.as_ref()) {
                self.ingest(sequence);
                valid_count += 1;
            }
        }
        info!(total, valid_count, confidence = self.state.confidence, "historique chargé");
        valid_count
    }

    /// Évalue la dernière prédiction en attente puis ingère le résultat.
    /// Les prédictions plus anciennes restées en attente ne sont jamais évaluées.
    pub fn submit_result(&mut self, raw: &[i64]) -> Result<SubmitReport, ModelError> {
        let result = Sequence::try_from_numbers(raw)?;

        let mut evaluation = None;
        if let Some(last) = self.state.predictions.last_mut() {
            if last.is_pending() {
                let eval = last.evaluate(&result);
                last.evaluation = Some(eval.clone());

                self.state.total_predictions += 1;
                self.state.correct_predictions += eval.accuracy_percent as f64 / 100.0;

                let predicted = *last.numbers.numbers();
                self.state
                    .weights
                    .reinforce_learning(&predicted, &eval.matches, &self.config);
                self.state.weights.normalize(&self.config);

                info!(
                    matches = eval.matches.len(),
                    accuracy = eval.accuracy_percent,
                    "prédiction évaluée"
                );
                evaluation = Some(eval);
            }
        }

        self.ingest(result);

        Ok(SubmitReport {
            success: true,
            message: "Résultat ajouté et analyse mise à jour".to_string(),
            evaluation,
        })
    }

    pub fn predict(&mut self) -> Result<Prediction, ModelError> {
        let numbers = {
            let ctx = scoring_context(&self.state, &self.config);
            PredictionEngine::new(ctx).predict(&mut self.rng)
        };
        let raw: Vec<i64> = numbers.iter().map(|&n| n as i64).collect();
        let sequence = Sequence::try_from_numbers(&raw)?;

        let prediction = Prediction::new(sequence, self.state.confidence);
        self.state.predictions.push(prediction.clone());
        info!(numbers = %sequence, confidence = prediction.confidence, "nouvelle prédiction");
        Ok(prediction)
    }

    pub fn stats(&self) -> Stats {
        let state = &self.state;
        Stats {
            total_predictions: state.total_predictions,
            accuracy_percent: stats::accuracy_percent(
                state.total_predictions,
                state.correct_predictions,
            ),
            confidence_percent: state.confidence.round() as u32,
            data_point_count: state.history.len(),
            distinct_pattern_count: state.patterns.distinct_gap_patterns(),
            top_numbers: stats::top_numbers(&state.number_frequency, TOP_NUMBERS),
            recent_trend: stats::recent_trend(&state.history, self.config.trend_window),
        }
    }

    pub fn reset(&mut self) {
        self.state = ModelState::fresh(&mut self.rng, &self.config);
        info!("modèle réinitialisé");
    }

    /// Génère `count` tirages uniformes et les ingère comme historique.
    pub fn generate_sample_data(&mut self, count: usize) -> Vec<Sequence> {
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let mut numbers = Vec::with_capacity(PICK_COUNT);
            complete_uniform(&mut numbers, self.config.max_sampling_attempts, &mut self.rng);
            let raw: Vec<i64> = numbers.iter().map(|&n| n as i64).collect();
            if let Ok(sequence) = Sequence::try_from_numbers(&raw) {
                samples.push(sequence);
            }
        }

        let raw: Vec<Vec<i64>> = samples
            .iter()
            .map(|s| s.numbers().iter().map(|&n| n as i64).collect())
            .collect();
        self.load_historical(&raw);
        samples
    }

    fn ingest(&mut self, sequence: Sequence) {
        let state = &mut self.state;
        state.history.push(sequence);
        state.patterns.record(&sequence, &state.history);
        for &n in sequence.numbers() {
            *state.number_frequency.entry(n).or_insert(0) += 1;
        }
        state.weights.reinforce_frequency(&sequence, &self.config);

        state.confidence = confidence::recompute(
            state.history.len(),
            state.total_predictions,
            state.correct_predictions,
            &state.patterns,
            &self.config,
        );
    }
}
