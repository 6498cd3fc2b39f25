use loto90_db::models::InvalidSequenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    InvalidSequence(#[from] InvalidSequenceError),

    #[error("Configuration invalide : {0}")]
    Config(String),
}
