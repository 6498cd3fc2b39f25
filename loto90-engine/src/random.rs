use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use loto90_db::models::POOL_SIZE;

/// Source d'aléa injectée dans le modèle.
pub trait RandomSource {
    /// Valeur uniforme dans [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Numéro uniforme dans [1, 90].
    fn next_number(&mut self) -> u8 {
        let n = (self.next_f64() * POOL_SIZE as f64).floor() as u8 + 1;
        n.min(POOL_SIZE)
    }
}

impl RandomSource for StdRng {
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }
}

pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Suite de valeurs fixées, rejouée en boucle.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
