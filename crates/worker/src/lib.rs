//! # RiskDesk Worker
//!
//! Runs ruin estimates off the async executor threads so a scan over tens of
//! thousands of drawdown samples never stalls request handling.
//!
//! `RiskWorker` keeps a single "latest request" slot. Submitting overwrites the
//! slot; a computation whose request was superseded while it ran is dropped
//! instead of published (last write wins). Nothing is cancelled mid-flight.

use core_types::RiskOutputs;
use events::EstimateRequest;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub mod error;

pub use error::WorkerError;

/// A published estimate, tagged with the generation of the request it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateResult {
    pub generation: u64,
    pub outputs: RiskOutputs,
}

type Submission = Option<(u64, EstimateRequest)>;

/// Validates `request` and computes it on the blocking thread pool.
pub async fn estimate_off_thread(request: EstimateRequest) -> Result<RiskOutputs, WorkerError> {
    risk::validate_request(&request.inputs, &request.drawdown_samples)?;
    let outputs = tokio::task::spawn_blocking(move || {
        risk::estimate_ruin(&request.inputs, &request.drawdown_samples)
    })
    .await?;
    Ok(outputs)
}

/// A background estimator with last-write-wins semantics.
pub struct RiskWorker {
    requests: watch::Sender<Submission>,
    results: watch::Receiver<Option<EstimateResult>>,
    latest_generation: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl RiskWorker {
    /// Starts the background task. Must be called from within a Tokio runtime.
    pub fn spawn() -> Self {
        let (requests, request_rx) = watch::channel::<Submission>(None);
        let (result_tx, results) = watch::channel::<Option<EstimateResult>>(None);
        let latest_generation = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(run_loop(request_rx, result_tx, latest_generation.clone()));

        Self {
            requests,
            results,
            latest_generation,
            task,
        }
    }

    /// Replaces any pending request with `request` and returns its generation.
    ///
    /// Invalid requests are rejected without consuming a generation, so the
    /// result of the last valid request still gets published.
    pub fn submit(&self, request: EstimateRequest) -> Result<u64, WorkerError> {
        risk::validate_request(&request.inputs, &request.drawdown_samples)?;

        if self.requests.is_closed() {
            return Err(WorkerError::Stopped);
        }

        // Numbered under the slot's write lock, so concurrent submitters
        // publish in generation order and the slot always holds the newest.
        let mut generation = 0;
        self.requests.send_modify(|slot| {
            generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = Some((generation, request));
        });

        tracing::debug!(generation, "Estimate request submitted.");
        Ok(generation)
    }

    /// The generation of the most recently accepted request, `0` if none.
    pub fn latest_generation(&self) -> u64 {
        self.latest_generation.load(Ordering::SeqCst)
    }

    /// A receiver that observes every published (non-stale) result.
    pub fn subscribe(&self) -> watch::Receiver<Option<EstimateResult>> {
        self.results.clone()
    }
}

impl Drop for RiskWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_loop(
    mut request_rx: watch::Receiver<Submission>,
    result_tx: watch::Sender<Option<EstimateResult>>,
    latest_generation: Arc<AtomicU64>,
) {
    while request_rx.changed().await.is_ok() {
        // Only the newest submission is visible here; anything submitted and
        // overwritten while the previous computation ran is never computed.
        let Some((generation, request)) = request_rx.borrow_and_update().clone() else {
            continue;
        };

        let computed = tokio::task::spawn_blocking(move || {
            risk::estimate_ruin(&request.inputs, &request.drawdown_samples)
        })
        .await;

        let outputs = match computed {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::error!(generation, error = %e, "Estimate computation panicked.");
                continue;
            }
        };

        if generation != latest_generation.load(Ordering::SeqCst) {
            tracing::debug!(generation, "Discarding superseded estimate.");
            continue;
        }

        result_tx.send_replace(Some(EstimateResult { generation, outputs }));
    }

    tracing::debug!("Risk worker request channel closed; stopping.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RiskInputs;
    use std::time::Duration;

    fn request(accepted_risk: f64) -> EstimateRequest {
        EstimateRequest::new(
            RiskInputs {
                accepted_risk,
                max_drawdown: -500.0,
                avg_drawdown: -100.0,
                avg_monthly_return: 20.0,
            },
            vec![-2500.0, -2600.0, -100.0],
        )
    }

    async fn wait_for_generation(
        rx: &mut watch::Receiver<Option<EstimateResult>>,
        generation: u64,
    ) -> EstimateResult {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(result) = rx.borrow_and_update().clone() {
                    if result.generation == generation {
                        return result;
                    }
                }
                rx.changed().await.expect("worker stopped");
            }
        })
        .await
        .expect("timed out waiting for estimate")
    }

    #[tokio::test]
    async fn publishes_result_for_single_request() {
        let worker = RiskWorker::spawn();
        let mut rx = worker.subscribe();

        let generation = worker.submit(request(0.2)).unwrap();
        assert_eq!(generation, 1);

        let result = wait_for_generation(&mut rx, 1).await;
        assert_eq!(result.outputs.ruin_occurrences, 2);
        assert_eq!(result.outputs, risk::estimate_ruin(&request(0.2).inputs, &request(0.2).drawdown_samples));
    }

    #[tokio::test]
    async fn last_submission_wins() {
        let worker = RiskWorker::spawn();
        let mut rx = worker.subscribe();

        let mut last = 0;
        for i in 1..=50 {
            last = worker.submit(request(i as f64 / 100.0)).unwrap();
        }
        assert_eq!(last, 50);
        assert_eq!(worker.latest_generation(), 50);

        let result = wait_for_generation(&mut rx, 50).await;
        let expected = risk::estimate_ruin(&request(0.5).inputs, &request(0.5).drawdown_samples);
        assert_eq!(result.outputs, expected);
    }

    #[tokio::test]
    async fn published_generations_never_go_backwards() {
        let worker = RiskWorker::spawn();
        let mut rx = worker.subscribe();

        for i in 1..=20 {
            worker.submit(request(i as f64 / 40.0)).unwrap();
            tokio::task::yield_now().await;
        }

        let mut seen = 0;
        let _ = tokio::time::timeout(Duration::from_secs(5), async {
            while seen < 20 {
                if rx.changed().await.is_err() {
                    break;
                }
                if let Some(result) = rx.borrow_and_update().clone() {
                    assert!(result.generation > seen);
                    seen = result.generation;
                }
            }
        })
        .await;
        assert_eq!(seen, 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submitters_still_publish_the_newest_generation() {
        let worker = RiskWorker::spawn();
        let mut rx = worker.subscribe();

        std::thread::scope(|scope| {
            for t in 0..8 {
                let worker = &worker;
                scope.spawn(move || {
                    for i in 0..25 {
                        worker.submit(request((t * 25 + i + 1) as f64 / 400.0)).unwrap();
                    }
                });
            }
        });

        assert_eq!(worker.latest_generation(), 200);
        let result = wait_for_generation(&mut rx, 200).await;
        assert_eq!(result.generation, 200);
    }

    #[tokio::test]
    async fn invalid_request_does_not_consume_a_generation() {
        let worker = RiskWorker::spawn();
        let mut bad = request(0.1);
        bad.drawdown_samples.push(f64::NAN);

        assert!(matches!(worker.submit(bad), Err(WorkerError::InvalidRequest(_))));
        assert_eq!(worker.latest_generation(), 0);
        assert_eq!(worker.submit(request(0.1)).unwrap(), 1);
    }

    #[tokio::test]
    async fn single_shot_estimate_matches_estimator() {
        let outputs = estimate_off_thread(request(0.2)).await.unwrap();
        assert_eq!(outputs.ruin_occurrences, 2);

        let mut bad = request(0.2);
        bad.inputs.avg_monthly_return = f64::INFINITY;
        assert!(matches!(
            estimate_off_thread(bad).await,
            Err(WorkerError::InvalidRequest(_))
        ));
    }
}
