use crate::error::AnalyticsError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// The net equity change over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyResult {
    pub year: i32,
    pub month: u32,
    pub result: Decimal,
}

/// A historical performance summary derived from an equity curve.
///
/// This struct is the output of the `AnalyticsEngine` and the source of the
/// monthly results fed into the Monte Carlo simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub total_net_profit: Decimal,
    pub total_return_pct: Option<Decimal>, // None when the first equity point is not positive

    // II. Risk and Drawdown (signed, <= 0, account currency)
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,
    pub avg_drawdown: Decimal,
    pub drawdown_episodes: usize,

    // III. Monthly Statistics
    pub monthly_results: Vec<MonthlyResult>,
    pub avg_monthly_return: Decimal,
    pub winning_months: usize,
    pub losing_months: usize,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    pub fn new() -> Self {
        Self {
            total_net_profit: Decimal::ZERO,
            total_return_pct: None,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            avg_drawdown: Decimal::ZERO,
            drawdown_episodes: 0,
            monthly_results: Vec::new(),
            avg_monthly_return: Decimal::ZERO,
            winning_months: 0,
            losing_months: 0,
        }
    }

    /// Monthly results as `f64`, the input format of the simulator.
    pub fn monthly_results_f64(&self) -> Result<Vec<f64>, AnalyticsError> {
        self.monthly_results
            .iter()
            .map(|m| {
                m.result.to_f64().ok_or(AnalyticsError::UnrepresentableMonth {
                    year: m.year,
                    month: m.month,
                    value: m.result,
                })
            })
            .collect()
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
