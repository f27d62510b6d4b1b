use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Failed to serialize event message: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Failed to parse client message: {0}")]
    Deserialization(#[source] serde_json::Error),
}
