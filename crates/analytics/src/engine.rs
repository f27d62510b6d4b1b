use crate::error::AnalyticsError;
use crate::report::{MonthlyResult, PerformanceReport};
use chrono::Datelike;
use core_types::EquityPoint;
use rust_decimal::Decimal;

/// A stateless calculator for deriving historical metrics from an equity curve.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating historical metrics.
    ///
    /// # Arguments
    ///
    /// * `equity_curve` - Account equity observations in chronological order.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`
    /// if the curve is out of order.
    pub fn calculate(&self, equity_curve: &[EquityPoint]) -> Result<PerformanceReport, AnalyticsError> {
        let mut report = PerformanceReport::new();

        if let Some(index) = equity_curve
            .windows(2)
            .position(|w| w[1].timestamp < w[0].timestamp)
        {
            return Err(AnalyticsError::UnorderedEquityCurve(index + 1));
        }

        if equity_curve.is_empty() {
            // Nothing to measure. A zeroed report leads to an unbounded capital estimate.
            return Ok(report);
        }

        self.calculate_profitability(equity_curve, &mut report);
        self.calculate_drawdown(equity_curve, &mut report);
        self.calculate_monthly_results(equity_curve, &mut report);

        tracing::debug!(
            points = equity_curve.len(),
            months = report.monthly_results.len(),
            max_drawdown = %report.max_drawdown,
            "Historical performance calculated."
        );

        Ok(report)
    }

    fn calculate_profitability(&self, equity_curve: &[EquityPoint], report: &mut PerformanceReport) {
        let first = equity_curve[0].equity;
        let last = equity_curve[equity_curve.len() - 1].equity;

        report.total_net_profit = last - first;
        if first > Decimal::ZERO {
            report.total_return_pct = Some((report.total_net_profit / first) * Decimal::from(100));
        }
    }

    /// Walks the curve once, tracking the running peak.
    ///
    /// An episode runs from one peak until equity reaches that peak again; its
    /// trough is the deepest point in between.
    fn calculate_drawdown(&self, equity_curve: &[EquityPoint], report: &mut PerformanceReport) {
        let mut peak_equity = equity_curve[0].equity;
        let mut peak_at_max = peak_equity;
        let mut max_drawdown = Decimal::ZERO;
        let mut current_trough = Decimal::ZERO;
        let mut troughs: Vec<Decimal> = Vec::new();

        for point in equity_curve {
            if point.equity >= peak_equity {
                if current_trough < Decimal::ZERO {
                    troughs.push(current_trough);
                    current_trough = Decimal::ZERO;
                }
                peak_equity = point.equity;
                continue;
            }

            let drawdown = point.equity - peak_equity;
            if drawdown < current_trough {
                current_trough = drawdown;
            }
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
                peak_at_max = peak_equity;
            }
        }
        if current_trough < Decimal::ZERO {
            troughs.push(current_trough);
        }

        report.max_drawdown = max_drawdown;
        if peak_at_max > Decimal::ZERO {
            report.max_drawdown_pct = (max_drawdown.abs() / peak_at_max) * Decimal::from(100);
        }

        report.drawdown_episodes = troughs.len();
        if !troughs.is_empty() {
            let total: Decimal = troughs.iter().sum();
            report.avg_drawdown = total / Decimal::from(troughs.len());
        }
    }

    /// Net change per calendar month, measured close-to-close. The first month
    /// is measured from the first observation.
    fn calculate_monthly_results(&self, equity_curve: &[EquityPoint], report: &mut PerformanceReport) {
        let mut month_closes: Vec<((i32, u32), Decimal)> = Vec::new();

        for point in equity_curve {
            let key = (point.timestamp.year(), point.timestamp.month());
            match month_closes.last_mut() {
                Some((last_key, close)) if *last_key == key => *close = point.equity,
                _ => month_closes.push((key, point.equity)),
            }
        }

        let mut previous_close = equity_curve[0].equity;
        for ((year, month), close) in month_closes {
            let result = close - previous_close;
            previous_close = close;

            if result > Decimal::ZERO {
                report.winning_months += 1;
            } else if result < Decimal::ZERO {
                report.losing_months += 1;
            }
            report.monthly_results.push(MonthlyResult { year, month, result });
        }

        let total: Decimal = report.monthly_results.iter().map(|m| m.result).sum();
        report.avg_monthly_return = total / Decimal::from(report.monthly_results.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn point(y: i32, m: u32, d: u32, equity: Decimal) -> EquityPoint {
        EquityPoint::new(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(), equity)
    }

    #[test]
    fn empty_curve_yields_zeroed_report() {
        let report = AnalyticsEngine::new().calculate(&[]).unwrap();
        assert_eq!(report, PerformanceReport::new());
    }

    #[test]
    fn rejects_unordered_curve() {
        let curve = [point(2024, 2, 1, dec!(100)), point(2024, 1, 1, dec!(90))];
        let err = AnalyticsEngine::new().calculate(&curve).unwrap_err();
        assert!(matches!(err, AnalyticsError::UnorderedEquityCurve(1)));
    }

    #[test]
    fn measures_drawdown_episodes() {
        // Two episodes: 1000 -> 800 (recovers at 1100), then 1100 -> 1050 (open).
        let curve = [
            point(2024, 1, 1, dec!(1000)),
            point(2024, 1, 10, dec!(900)),
            point(2024, 1, 20, dec!(800)),
            point(2024, 2, 1, dec!(1100)),
            point(2024, 2, 15, dec!(1050)),
        ];
        let report = AnalyticsEngine::new().calculate(&curve).unwrap();

        assert_eq!(report.max_drawdown, dec!(-200));
        assert_eq!(report.max_drawdown_pct, dec!(20));
        assert_eq!(report.drawdown_episodes, 2);
        assert_eq!(report.avg_drawdown, dec!(-125));
        assert_eq!(report.total_net_profit, dec!(50));
        assert_eq!(report.total_return_pct, Some(dec!(5)));
    }

    #[test]
    fn groups_results_by_calendar_month() {
        let curve = [
            point(2024, 1, 1, dec!(1000)),
            point(2024, 1, 31, dec!(1040)),
            point(2024, 2, 10, dec!(1010)),
            point(2024, 2, 28, dec!(1020)),
            point(2024, 3, 5, dec!(1080)),
        ];
        let report = AnalyticsEngine::new().calculate(&curve).unwrap();

        let results: Vec<Decimal> = report.monthly_results.iter().map(|m| m.result).collect();
        assert_eq!(results, vec![dec!(40), dec!(-20), dec!(60)]);
        assert_eq!(report.monthly_results[1].month, 2);
        assert!((report.avg_monthly_return - dec!(26.6667)).abs() < dec!(0.001));
        assert_eq!(report.winning_months, 2);
        assert_eq!(report.losing_months, 1);
        assert_eq!(report.monthly_results_f64().unwrap(), vec![40.0, -20.0, 60.0]);
    }

    #[test]
    fn monotonic_curve_has_no_drawdown() {
        let curve = [point(2024, 1, 1, dec!(10)), point(2024, 1, 2, dec!(12))];
        let report = AnalyticsEngine::new().calculate(&curve).unwrap();
        assert_eq!(report.max_drawdown, Decimal::ZERO);
        assert_eq!(report.avg_drawdown, Decimal::ZERO);
        assert_eq!(report.drawdown_episodes, 0);
    }
}
