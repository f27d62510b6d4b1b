use crate::error::EventsError;
use core_types::{DrawdownSample, RiskInputs, RiskOutputs};
use serde::{Deserialize, Serialize};

/// The estimator's input message.
///
/// On the wire this is a flat object:
/// `{ "acceptedRisk", "drawdownSamples", "maxDrawdown", "avgDrawdown", "avgMonthlyReturn" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(flatten)]
    pub inputs: RiskInputs,
    #[serde(default)]
    pub drawdown_samples: Vec<DrawdownSample>,
}

impl EstimateRequest {
    pub fn new(inputs: RiskInputs, drawdown_samples: Vec<DrawdownSample>) -> Self {
        Self {
            inputs,
            drawdown_samples,
        }
    }
}

/// Messages sent by a dashboard client over the WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// The user moved the risk slider or loaded a new simulation batch.
    Estimate(EstimateRequest),
}

impl ClientMessage {
    pub fn from_json(text: &str) -> Result<Self, EventsError> {
        serde_json::from_str(text).map_err(EventsError::Deserialization)
    }
}

/// The top-level WebSocket message enum.
/// All communication from the server to the client will be one of these variants.
///
/// Serialized as `{"type": "...", "payload": {...}}`, for example:
/// `{
///   "type": "RiskEstimate",
///   "payload": {
///     "generation": 3,
///     "outputs": { "recommendedCapital": { "status": "bounded", "value": 10000.0 }, ... }
///   }
/// }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WsMessage {
    /// Confirms to a new client that its WebSocket connection is active.
    Connected,
    /// The result for the most recent estimate request. Superseded requests
    /// never produce one of these.
    RiskEstimate { generation: u64, outputs: RiskOutputs },
    /// A request was rejected before reaching the estimator.
    Error { message: String },
}

impl WsMessage {
    pub fn to_json(&self) -> Result<String, EventsError> {
        serde_json::to_string(self).map_err(EventsError::Serialization)
    }
}
