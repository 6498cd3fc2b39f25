pub mod analysis;
pub mod candidates;
pub mod confidence;
pub mod config;
pub mod error;
pub mod model;
pub mod patterns;
pub mod predictor;
pub mod random;
pub mod sampler;
pub mod scorer;
pub mod stats;
pub mod weights;

pub use config::EngineConfig;
pub use error::ModelError;
pub use model::{Model, ModelState, SubmitReport};
pub use random::{RandomSource, ScriptedRandom};
