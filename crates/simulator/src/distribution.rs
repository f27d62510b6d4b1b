use core_types::{DrawdownSample, RiskInputs};
use serde::Serialize;

/// The output of a Monte Carlo batch: one maximum drawdown per simulated path
/// plus the aggregates the ruin estimator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownDistribution {
    pub samples: Vec<DrawdownSample>,
    /// The most severe sample (`<= 0`), or `0` when there are no samples.
    pub max_drawdown: f64,
    /// Mean of the samples, or `0` when there are no samples.
    pub avg_drawdown: f64,
    /// Mean of the historical monthly results the paths were drawn from.
    pub avg_monthly_return: f64,
    pub horizon_months: usize,
    /// The base seed actually used, so a batch can be replayed.
    pub seed: u64,
}

impl DrawdownDistribution {
    /// Builds a distribution from raw samples, deriving the aggregates.
    pub fn from_samples(
        samples: Vec<DrawdownSample>,
        avg_monthly_return: f64,
        horizon_months: usize,
        seed: u64,
    ) -> Self {
        let max_drawdown = samples.iter().copied().fold(0.0_f64, f64::min);
        let avg_drawdown = if samples.is_empty() {
            0.0
        } else {
            samples.iter().sum::<f64>() / samples.len() as f64
        };

        Self {
            samples,
            max_drawdown,
            avg_drawdown,
            avg_monthly_return,
            horizon_months,
            seed,
        }
    }

    /// Pairs the distribution aggregates with a risk tolerance.
    pub fn risk_inputs(&self, accepted_risk: f64) -> RiskInputs {
        RiskInputs {
            accepted_risk,
            max_drawdown: self.max_drawdown,
            avg_drawdown: self.avg_drawdown,
            avg_monthly_return: self.avg_monthly_return,
        }
    }

    pub fn summary(&self) -> DistributionSummary {
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);

        DistributionSummary {
            runs: self.samples.len(),
            horizon_months: self.horizon_months,
            seed: self.seed,
            max_drawdown: self.max_drawdown,
            avg_drawdown: self.avg_drawdown,
            avg_monthly_return: self.avg_monthly_return,
            percentile_5: percentile(&sorted, 0.05),
            median: percentile(&sorted, 0.5),
            percentile_95: percentile(&sorted, 0.95),
        }
    }
}

/// Display-oriented view of a distribution, without the raw samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub runs: usize,
    pub horizon_months: usize,
    pub seed: u64,
    pub max_drawdown: f64,
    pub avg_drawdown: f64,
    pub avg_monthly_return: f64,
    /// 5% of paths drew down at least this far.
    pub percentile_5: f64,
    pub median: f64,
    pub percentile_95: f64,
}

/// Nearest-rank percentile over an ascending slice. `0` for an empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let n = sorted.len();
    sorted[((n as f64 * p) as usize).min(n - 1)]
}
