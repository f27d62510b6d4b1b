use crate::error::RiskError;
use core_types::{DrawdownSample, RecommendedCapital, RiskInputs, RiskOutputs};

/// A stateless calculator for ruin risk over a simulated drawdown population.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuinEstimator {}

impl RuinEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the recommended capital, the monthly return on that capital and
    /// the probability of ruin.
    ///
    /// # Arguments
    ///
    /// * `inputs` - The accepted risk fraction and the distribution aggregates.
    /// * `samples` - One maximum drawdown per simulated path. Order is irrelevant.
    ///
    /// # Returns
    ///
    /// `RiskOutputs::unbounded()` when the capital base or the accepted risk is
    /// zero (negative or non-finite accepted risk is treated the same way) or
    /// when `base / accepted_risk` overflows, otherwise the sized metrics.
    pub fn estimate(&self, inputs: &RiskInputs, samples: &[DrawdownSample]) -> RiskOutputs {
        let base = capital_base(inputs.max_drawdown, inputs.avg_drawdown);
        let accepted_risk = inputs.accepted_risk;

        if !(base > 0.0) || !(accepted_risk > 0.0) || !accepted_risk.is_finite() {
            tracing::debug!(base, accepted_risk, "Capital cannot be sized; reporting unbounded.");
            return RiskOutputs::unbounded();
        }

        let recommended_capital = base / accepted_risk;
        if !recommended_capital.is_finite() {
            tracing::debug!(base, accepted_risk, "Recommended capital overflows; reporting unbounded.");
            return RiskOutputs::unbounded();
        }

        let estimated_monthly_return = (inputs.avg_monthly_return / recommended_capital) * 100.0;

        // A drawdown at or beyond this level consumes the whole recommended capital.
        let ruin_threshold = -recommended_capital;
        let ruin_occurrences = samples.iter().filter(|&&s| s <= ruin_threshold).count();

        let estimated_ruin_risk = if samples.is_empty() {
            0.0
        } else {
            (ruin_occurrences as f64 / samples.len() as f64) * 100.0
        };

        tracing::debug!(
            recommended_capital,
            ruin_occurrences,
            sample_count = samples.len(),
            "Ruin risk estimated."
        );

        RiskOutputs {
            recommended_capital: RecommendedCapital::Bounded(recommended_capital),
            estimated_monthly_return,
            estimated_ruin_risk,
            ruin_occurrences,
        }
    }
}

/// Convenience wrapper around `RuinEstimator::estimate`.
pub fn estimate_ruin(inputs: &RiskInputs, samples: &[DrawdownSample]) -> RiskOutputs {
    RuinEstimator::new().estimate(inputs, samples)
}

/// The sizing anchor: the worst drawdown when one exists, else the average.
pub fn capital_base(max_drawdown: f64, avg_drawdown: f64) -> f64 {
    if max_drawdown != 0.0 {
        max_drawdown.abs()
    } else {
        avg_drawdown.abs()
    }
}

/// Rejects NaN and infinite drawdown samples.
pub fn validate_samples(samples: &[DrawdownSample]) -> Result<(), RiskError> {
    match samples.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(RiskError::NonFiniteSample {
            index,
            value: samples[index],
        }),
        None => Ok(()),
    }
}

/// Full caller-side validation of an estimate request.
pub fn validate_request(inputs: &RiskInputs, samples: &[DrawdownSample]) -> Result<(), RiskError> {
    inputs.validate()?;
    validate_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs(accepted_risk: f64, max_dd: f64, avg_dd: f64, avg_month: f64) -> RiskInputs {
        RiskInputs {
            accepted_risk,
            max_drawdown: max_dd,
            avg_drawdown: avg_dd,
            avg_monthly_return: avg_month,
        }
    }

    #[test]
    fn sizes_capital_from_worst_drawdown() {
        let out = estimate_ruin(&inputs(0.1, -1000.0, -500.0, 50.0), &[-200.0, -1200.0, -900.0]);

        assert_relative_eq!(out.recommended_capital.as_f64(), 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(out.estimated_monthly_return, 0.5, epsilon = 1e-12);
        assert_eq!(out.ruin_occurrences, 0);
        assert_eq!(out.estimated_ruin_risk, 0.0);
    }

    #[test]
    fn zero_accepted_risk_is_unbounded() {
        let out = estimate_ruin(&inputs(0.0, -1000.0, -500.0, 50.0), &[-1.0, -2.0]);
        assert_eq!(out, RiskOutputs::unbounded());
    }

    #[test]
    fn exhausted_fallback_chain_is_unbounded() {
        let out = estimate_ruin(&inputs(0.5, 0.0, 0.0, 10.0), &[]);
        assert!(out.recommended_capital.is_unbounded());
        assert_eq!(out.estimated_monthly_return, 0.0);
        assert_eq!(out.estimated_ruin_risk, 0.0);
        assert_eq!(out.ruin_occurrences, 0);
    }

    #[test]
    fn ruin_threshold_is_inclusive() {
        let out = estimate_ruin(&inputs(0.2, -500.0, -100.0, 20.0), &[-2500.0, -2600.0, -100.0]);

        assert_relative_eq!(out.recommended_capital.as_f64(), 2500.0, epsilon = 1e-9);
        assert_eq!(out.ruin_occurrences, 2);
        assert_relative_eq!(out.estimated_ruin_risk, 66.67, epsilon = 0.01);
        assert_relative_eq!(out.estimated_monthly_return, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn falls_back_to_average_drawdown() {
        let out = estimate_ruin(&inputs(0.25, 0.0, -400.0, 16.0), &[-1600.0, -10.0]);

        assert_relative_eq!(capital_base(0.0, -400.0), 400.0);
        assert_relative_eq!(out.recommended_capital.as_f64(), 1600.0, epsilon = 1e-9);
        assert_eq!(out.ruin_occurrences, 1);
        assert_relative_eq!(out.estimated_ruin_risk, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_samples_do_not_produce_nan() {
        let out = estimate_ruin(&inputs(0.1, -1000.0, -500.0, 50.0), &[]);
        assert!(!out.recommended_capital.is_unbounded());
        assert_eq!(out.ruin_occurrences, 0);
        assert_eq!(out.estimated_ruin_risk, 0.0);
    }

    #[test]
    fn negative_accepted_risk_is_treated_as_degenerate() {
        let out = estimate_ruin(&inputs(-0.3, -1000.0, -500.0, 50.0), &[-5000.0]);
        assert_eq!(out, RiskOutputs::unbounded());
    }

    #[test]
    fn overflowing_capital_is_unbounded() {
        let tiny_risk = inputs(1e-310, -1000.0, -500.0, 50.0);
        assert!(validate_request(&tiny_risk, &[-5.0]).is_ok());
        assert_eq!(estimate_ruin(&tiny_risk, &[-5.0]), RiskOutputs::unbounded());

        let huge_drawdown = inputs(0.1, -1e308, -1.0, 50.0);
        assert_eq!(estimate_ruin(&huge_drawdown, &[-5.0]), RiskOutputs::unbounded());
    }

    #[test]
    fn positive_max_drawdown_uses_its_magnitude() {
        let out = estimate_ruin(&inputs(0.5, 300.0, 0.0, 0.0), &[-600.0]);
        assert_relative_eq!(out.recommended_capital.as_f64(), 600.0, epsilon = 1e-9);
        assert_eq!(out.ruin_occurrences, 1);
    }

    #[test]
    fn ruin_count_matches_threshold_scan() {
        let samples: Vec<f64> = (0..1000).map(|i| -(i as f64) * 7.5).collect();
        let input = inputs(0.4, -1200.0, -300.0, 25.0);
        let out = estimate_ruin(&input, &samples);

        let threshold = -(1200.0 / 0.4);
        let expected = samples.iter().filter(|&&s| s <= threshold).count();
        assert_eq!(out.ruin_occurrences, expected);
        assert!(out.ruin_occurrences <= samples.len());
        assert!((0.0..=100.0).contains(&out.estimated_ruin_risk));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let input = inputs(0.15, -873.25, -211.0, 41.3);
        let samples = [-10.0, -6000.0, -5821.6666, -0.5];
        let a = estimate_ruin(&input, &samples);
        let b = RuinEstimator::new().estimate(&input, &samples);

        assert_eq!(a.recommended_capital.as_f64().to_bits(), b.recommended_capital.as_f64().to_bits());
        assert_eq!(a.estimated_monthly_return.to_bits(), b.estimated_monthly_return.to_bits());
        assert_eq!(a.estimated_ruin_risk.to_bits(), b.estimated_ruin_risk.to_bits());
        assert_eq!(a.ruin_occurrences, b.ruin_occurrences);
    }

    #[test]
    fn validation_flags_the_first_non_finite_sample() {
        let err = validate_samples(&[-1.0, f64::NEG_INFINITY, f64::NAN]).unwrap_err();
        assert!(matches!(err, RiskError::NonFiniteSample { index: 1, .. }));

        let bad = inputs(f64::INFINITY, -1.0, -1.0, 0.0);
        assert!(matches!(validate_request(&bad, &[]), Err(RiskError::InvalidInputs(_))));
        assert!(validate_request(&inputs(0.1, -1.0, -1.0, 0.0), &[-3.0]).is_ok());
    }
}
