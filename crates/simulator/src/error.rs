use configuration::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Simulation settings are invalid: {0}")]
    Settings(#[from] ConfigError),

    #[error("Historical monthly result at index {index} is not a finite number ({value}).")]
    NonFiniteHistory { index: usize, value: f64 },
}
