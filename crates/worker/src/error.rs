use risk::RiskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Estimate request rejected: {0}")]
    InvalidRequest(#[from] RiskError),

    #[error("Background estimate task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("The risk worker has stopped.")]
    Stopped,
}
