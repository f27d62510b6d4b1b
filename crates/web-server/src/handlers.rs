use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use configuration::SimulationOverrides;
use core_types::RiskOutputs;
use events::{ClientMessage, EstimateRequest, WsMessage};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use simulator::{DistributionSummary, MonteCarloSimulator};
use std::sync::Arc;
use uuid::Uuid;
use worker::RiskWorker;

/// Body of `POST /api/simulations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    /// Historical monthly results in account currency.
    pub monthly_results: Vec<f64>,
    /// Falls back to `risk.default_accepted_risk` when omitted.
    #[serde(default)]
    pub accepted_risk: Option<f64>,
    #[serde(flatten)]
    pub overrides: SimulationOverrides,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResponse {
    pub simulation_id: Uuid,
    pub accepted_risk: f64,
    pub distribution: DistributionSummary,
    pub risk: RiskOutputs,
}

/// # POST /api/risk/estimate
/// Runs the ruin estimator on a caller-supplied drawdown population.
pub async fn estimate(Json(request): Json<EstimateRequest>) -> Result<Json<RiskOutputs>, AppError> {
    let outputs = worker::estimate_off_thread(request).await?;
    Ok(Json(outputs))
}

/// # POST /api/simulations
/// Simulates drawdowns from monthly history, then estimates ruin for them.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, AppError> {
    let simulation_id = Uuid::new_v4();
    let settings = state.config.simulation.with_overrides(&request.overrides);
    let accepted_risk = request
        .accepted_risk
        .unwrap_or(state.config.risk.default_accepted_risk);

    let simulator = MonteCarloSimulator::new(settings)?;
    let history = request.monthly_results;

    tracing::info!(%simulation_id, history = history.len(), accepted_risk, "Simulation requested.");

    let (distribution, risk) = tokio::task::spawn_blocking(move || {
        simulator.run(&history).map(|dist| {
            let outputs = risk::estimate_ruin(&dist.risk_inputs(accepted_risk), &dist.samples);
            (dist.summary(), outputs)
        })
    })
    .await??;

    Ok(Json(SimulationResponse {
        simulation_id,
        accepted_risk,
        distribution,
        risk,
    }))
}

/// # GET /ws
/// The risk-slider channel. Each connection gets its own `RiskWorker`, so a
/// client only ever sees the result of its most recent request.
pub async fn websocket_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle_socket)
}

async fn handle_socket(socket: WebSocket) {
    tracing::info!("[WS] New client connected.");
    let (mut sender, mut receiver) = socket.split();
    let worker = RiskWorker::spawn();
    let mut results = worker.subscribe();

    if send(&mut sender, &WsMessage::Connected).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let reply = match incoming {
                    Some(Ok(Message::Text(text))) => match ClientMessage::from_json(&text) {
                        Ok(ClientMessage::Estimate(request)) => match worker.submit(request) {
                            Ok(_) => None,
                            Err(e) => Some(WsMessage::Error { message: e.to_string() }),
                        },
                        Err(e) => Some(WsMessage::Error { message: e.to_string() }),
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("[WS] Client disconnected.");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "[WS] Error.");
                        break;
                    }
                    Some(Ok(_)) => None,
                };
                if let Some(message) = reply {
                    if send(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = results.borrow_and_update().clone();
                if let Some(result) = latest {
                    let message = WsMessage::RiskEstimate {
                        generation: result.generation,
                        outputs: result.outputs,
                    };
                    if send(&mut sender, &message).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
    tracing::info!("[WS] Connection closed.");
}

async fn send(sender: &mut SplitSink<WebSocket, Message>, message: &WsMessage) -> Result<(), ()> {
    let text = match message.to_json() {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "[WS] Failed to encode message.");
            return Err(());
        }
    };
    sender.send(Message::Text(text)).await.map_err(|_| ())
}
