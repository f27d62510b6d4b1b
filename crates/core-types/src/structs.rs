use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One simulated run's maximum drawdown in account currency. Typically `<= 0`.
pub type DrawdownSample = f64;

/// A single observation on an account's equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
}

impl EquityPoint {
    pub fn new(timestamp: DateTime<Utc>, equity: Decimal) -> Self {
        Self { timestamp, equity }
    }
}

/// The scalar aggregates that accompany a drawdown population.
///
/// All monetary fields share the account currency of the drawdown samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInputs {
    /// Fraction of the recommended capital the user is willing to lose.
    pub accepted_risk: f64,
    /// Worst drawdown across all simulations.
    pub max_drawdown: f64,
    /// Average drawdown across all simulations.
    pub avg_drawdown: f64,
    /// Average monthly result.
    pub avg_monthly_return: f64,
}

impl RiskInputs {
    /// Rejects NaN and infinite values so they never reach the estimator.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("acceptedRisk", self.accepted_risk),
            ("maxDrawdown", self.max_drawdown),
            ("avgDrawdown", self.avg_drawdown),
            ("avgMonthlyReturn", self.avg_monthly_return),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput(
                    name.to_string(),
                    format!("expected a finite number, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Recommended capital base.
///
/// `Unbounded` stands in for positive infinity: the capital cannot be sized
/// because either the risk tolerance or the observed drawdown is zero.
/// It serializes as `{"status":"unbounded"}` so strict JSON consumers never
/// see an infinite number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RecommendedCapital {
    Bounded(f64),
    Unbounded,
}

impl RecommendedCapital {
    /// The finite capital, if one could be computed.
    pub fn value(&self) -> Option<f64> {
        match self {
            RecommendedCapital::Bounded(v) => Some(*v),
            RecommendedCapital::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, RecommendedCapital::Unbounded)
    }

    /// Numeric view where `Unbounded` maps to `f64::INFINITY`.
    pub fn as_f64(&self) -> f64 {
        self.value().unwrap_or(f64::INFINITY)
    }
}

impl fmt::Display for RecommendedCapital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendedCapital::Bounded(v) => write!(f, "{v:.2}"),
            RecommendedCapital::Unbounded => write!(f, "not computable"),
        }
    }
}

/// The derived risk metrics for one (distribution, risk tolerance) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskOutputs {
    pub recommended_capital: RecommendedCapital,
    /// Average monthly result as a percentage of the recommended capital.
    pub estimated_monthly_return: f64,
    /// Share of simulated paths that hit the ruin threshold, in percent.
    pub estimated_ruin_risk: f64,
    pub ruin_occurrences: usize,
}

impl RiskOutputs {
    /// The "cannot size capital" result.
    pub fn unbounded() -> Self {
        Self {
            recommended_capital: RecommendedCapital::Unbounded,
            estimated_monthly_return: 0.0,
            estimated_ruin_risk: 0.0,
            ruin_occurrences: 0,
        }
    }
}
