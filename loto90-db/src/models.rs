use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const POOL_SIZE: u8 = 90;
pub const PICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSequenceError {
    #[error("Séquence invalide : {0} nombre(s) au lieu de 5")]
    WrongLength(usize),
    #[error("Séquence invalide : {0} hors limites (1-90)")]
    OutOfRange(i64),
    #[error("Séquence invalide : {0} en double")]
    Duplicate(i64),
}

/// Tirage de 5 nombres distincts dans [1, 90], toujours stocké trié.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u8>")]
pub struct Sequence([u8; PICK_COUNT]);

impl Sequence {
    pub fn try_from_numbers(input: &[i64]) -> Result<Self, InvalidSequenceError> {
        if input.len() != PICK_COUNT {
            return Err(InvalidSequenceError::WrongLength(input.len()));
        }
        for &n in input {
            if n < 1 || n > POOL_SIZE as i64 {
                return Err(InvalidSequenceError::OutOfRange(n));
            }
        }
        for i in 0..input.len() {
            for j in (i + 1)..input.len() {
                if input[i] == input[j] {
                    return Err(InvalidSequenceError::Duplicate(input[i]));
                }
            }
        }

        let mut numbers = [0u8; PICK_COUNT];
        for (slot, &n) in numbers.iter_mut().zip(input) {
            *slot = n as u8;
        }
        numbers.sort();
        Ok(Self(numbers))
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.0
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.contains(&number)
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }

    pub fn even_count(&self) -> u8 {
        self.0.iter().filter(|&&n| n % 2 == 0).count() as u8
    }

    /// Écarts entre numéros consécutifs : (index de la paire 0..=3, écart).
    pub fn gaps(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.0
            .windows(2)
            .enumerate()
            .map(|(i, w)| (i as u8, w[1] - w[0]))
    }
}

impl TryFrom<Vec<i64>> for Sequence {
    type Error = InvalidSequenceError;

    fn try_from(value: Vec<i64>) -> Result<Self, Self::Error> {
        Sequence::try_from_numbers(&value)
    }
}

impl From<Sequence> for Vec<u8> {
    fn from(sequence: Sequence) -> Self {
        sequence.0.to_vec()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

pub fn validate_sequence(input: &[i64]) -> bool {
    Sequence::try_from_numbers(input).is_ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub actual: Sequence,
    pub matches: Vec<u8>,
    pub accuracy_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub numbers: Sequence,
    pub created_at: DateTime<Utc>,
    /// Confiance du modèle (0-100) au moment de la prédiction.
    pub confidence: f64,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
}

impl Prediction {
    pub fn new(numbers: Sequence, confidence: f64) -> Self {
        Self {
            numbers,
            created_at: Utc::now(),
            confidence,
            evaluation: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.evaluation.is_none()
    }

    /// Compare la prédiction au tirage réel sans la modifier.
    pub fn evaluate(&self, actual: &Sequence) -> Evaluation {
        let matches: Vec<u8> = self
            .numbers
            .numbers()
            .iter()
            .copied()
            .filter(|&n| actual.contains(n))
            .collect();
        let percentage = matches.len() as f64 / PICK_COUNT as f64 * 100.0;
        Evaluation {
            actual: *actual,
            matches,
            accuracy_percent: percentage.round() as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNumber {
    pub number: u8,
    pub frequency: u32,
}
