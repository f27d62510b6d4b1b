//! # RiskDesk Core Types
//!
//! Layer 0 of the workspace: the plain value types shared by every other crate.
//! Nothing in here performs I/O or holds state.

pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use structs::{DrawdownSample, EquityPoint, RecommendedCapital, RiskInputs, RiskOutputs};
