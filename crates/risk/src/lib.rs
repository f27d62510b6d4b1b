//! # RiskDesk Risk Engine
//!
//! Sizes a capital base from a population of simulated maximum drawdowns and
//! estimates how often that capital would have been wiped out.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate. It depends only on `core-types` and
//!   knows nothing about threads, sockets or files.
//! - **Total Function:** `estimate_ruin` never fails. Inputs it cannot size
//!   against produce `RecommendedCapital::Unbounded` with zeroed metrics.
//!   Callers that accept untrusted data run `validate_request` first.

pub mod error;
pub mod ruin;

pub use error::RiskError;
pub use ruin::{RuinEstimator, capital_base, estimate_ruin, validate_request, validate_samples};
