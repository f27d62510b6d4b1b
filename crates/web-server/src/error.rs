use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use simulator::SimulationError;
use thiserror::Error;
use worker::WorkerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Estimate error: {0}")]
    Worker(#[from] WorkerError),
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Worker(WorkerError::InvalidRequest(e)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            AppError::Simulation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::Worker(worker_err) => {
                tracing::error!(error = ?worker_err, "Estimate worker error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred while estimating risk".to_string(),
                )
            }
            AppError::Join(join_err) => {
                tracing::error!(error = ?join_err, "Background task error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal computation failed".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
