use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RiskError {
    #[error("Risk inputs are invalid: {0}")]
    InvalidInputs(#[from] CoreError),

    #[error("Drawdown sample at index {index} is not a finite number ({value}).")]
    NonFiniteSample { index: usize, value: f64 },
}
