//! # RiskDesk Events
//!
//! This crate defines the message structures exchanged between the dashboard
//! front end and the back end, both over plain HTTP and over the WebSocket
//! slider channel.
//!
//! As a Layer 0 crate, it depends only on `core-types` and provides the definitive
//! language for all real-time state synchronization.

// Declare the modules that make up this crate.
pub mod error;
pub mod messages;

// Re-export the core types to provide a clean public API.
pub use error::EventsError;
pub use messages::{ClientMessage, EstimateRequest, WsMessage};
