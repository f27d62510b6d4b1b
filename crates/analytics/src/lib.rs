//! # RiskDesk Analytics Engine
//!
//! This crate turns an account's equity curve into the historical metrics the
//! rest of the system works from: monthly results, drawdown depth and
//! drawdown frequency.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** `AnalyticsEngine` has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0). The `import` module is the one
//!   place that touches the filesystem.
//! - **Stateless Calculation:** The engine takes an equity curve as input and
//!   produces a `PerformanceReport` as output.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The struct that contains the calculation logic.
//! - `PerformanceReport` / `MonthlyResult`: The calculated metrics.
//! - `load_equity_curve` / `read_equity_curve`: CSV import of platform exports.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod import;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use import::{load_equity_curve, read_equity_curve};
pub use report::{MonthlyResult, PerformanceReport};
