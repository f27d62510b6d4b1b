//! # RiskDesk Monte Carlo Simulator
//!
//! Generates the drawdown population consumed by the ruin estimator. Each
//! simulated path bootstraps a sequence of monthly results from history and
//! records the deepest peak-to-trough decline along the way.

use configuration::SimulationSettings;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub mod distribution;
pub mod error;

pub use distribution::{DistributionSummary, DrawdownDistribution};
pub use error::SimulationError;

/// Runs bootstrap simulations of an account's equity path.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    settings: SimulationSettings,
}

impl MonteCarloSimulator {
    /// Creates a simulator, rejecting settings that cannot produce a batch.
    pub fn new(settings: SimulationSettings) -> Result<Self, SimulationError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Simulates `runs` paths of `horizon_months` draws each.
    ///
    /// An empty history or zero runs yields an empty distribution with zero
    /// aggregates.
    pub fn run(&self, monthly_results: &[f64]) -> Result<DrawdownDistribution, SimulationError> {
        self.run_with_progress(monthly_results, None)
    }

    /// Same as `run`, advancing `progress` once per completed path.
    pub fn run_with_progress(
        &self,
        monthly_results: &[f64],
        progress: Option<&ProgressBar>,
    ) -> Result<DrawdownDistribution, SimulationError> {
        if let Some(index) = monthly_results.iter().position(|v| !v.is_finite()) {
            return Err(SimulationError::NonFiniteHistory {
                index,
                value: monthly_results[index],
            });
        }

        let horizon = self.settings.horizon_months;
        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let avg_monthly_return = mean(monthly_results);

        if monthly_results.is_empty() || self.settings.runs == 0 {
            tracing::warn!(
                history = monthly_results.len(),
                runs = self.settings.runs,
                "Nothing to simulate; returning an empty distribution."
            );
            return Ok(DrawdownDistribution::from_samples(Vec::new(), avg_monthly_return, horizon, seed));
        }

        tracing::info!(
            runs = self.settings.runs,
            horizon,
            seed,
            threads = rayon::current_num_threads(),
            "Starting Monte Carlo simulation."
        );

        // Each path owns an RNG derived from its index, so the batch is
        // reproducible regardless of how rayon schedules the work.
        let samples: Vec<f64> = (0..self.settings.runs)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let drawdown = simulate_path_drawdown(monthly_results, horizon, &mut rng);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                drawdown
            })
            .collect();

        let distribution = DrawdownDistribution::from_samples(samples, avg_monthly_return, horizon, seed);
        tracing::info!(
            max_drawdown = distribution.max_drawdown,
            avg_drawdown = distribution.avg_drawdown,
            "Monte Carlo simulation complete."
        );
        Ok(distribution)
    }
}

/// Draws `horizon` monthly results with replacement and returns the path's
/// maximum drawdown (`<= 0`). The path starts flat at zero, which counts as
/// the first peak.
pub fn simulate_path_drawdown<R: Rng + ?Sized>(history: &[f64], horizon: usize, rng: &mut R) -> f64 {
    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_drawdown = 0.0_f64;

    for _ in 0..horizon {
        equity += history[rng.gen_range(0..history.len())];
        peak = peak.max(equity);
        max_drawdown = max_drawdown.min(equity - peak);
    }

    max_drawdown
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
