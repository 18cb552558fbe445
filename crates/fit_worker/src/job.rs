use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use fit_core::{combination_count, find_combinations, sort_request, FitError, SearchObserver};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::protocol::{Action, Request, Response, ResponsePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Emit a progress message every N results found. 0 disables progress.
    pub progress_every: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { progress_every: 1 }
    }
}

/// Shared flag a running job polls between checkpoints.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Spawns one thread per submitted request.
#[derive(Debug)]
pub struct Worker {
    config: WorkerConfig,
    next_job: AtomicU64,
}

impl Default for Worker {
    fn default() -> Self {
        Self::new(WorkerConfig::default())
    }
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            next_job: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> WorkerConfig {
        self.config
    }

    pub fn submit(&self, request: Request) -> Result<Job> {
        let id = self.next_job.fetch_add(1, Ordering::Relaxed);
        let action = request.action();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancelHandle::default();
        let config = self.config;

        let job_cancel = cancel.clone();
        std::thread::Builder::new()
            .name(format!("fit-job-{id}"))
            .spawn(move || run_job(id, request, config, &tx, &job_cancel))
            .with_context(|| format!("spawning worker thread for job {id}"))?;

        tracing::debug!(job = id, %action, "job submitted");
        Ok(Job {
            id,
            action,
            rx,
            cancel,
        })
    }
}

/// Handle to one running request. Dropping it cancels the job.
#[derive(Debug)]
pub struct Job {
    id: u64,
    action: Action,
    rx: mpsc::UnboundedReceiver<Response>,
    cancel: CancelHandle,
}

impl Job {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Next response, or `None` once the terminal message has been consumed
    /// and the worker thread is gone.
    pub async fn recv(&mut self) -> Option<Response> {
        self.rx.recv().await
    }

    /// Blocking variant for synchronous callers. Must not be called from
    /// inside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Response> {
        self.rx.blocking_recv()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Forwards search progress to the response channel and stops the search
/// once the job is cancelled or nobody is listening.
struct ChannelObserver<'a> {
    action: Action,
    progress_every: usize,
    tx: &'a mpsc::UnboundedSender<Response>,
    cancel: &'a CancelHandle,
}

impl ChannelObserver<'_> {
    fn abandoned(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}

impl SearchObserver for ChannelObserver<'_> {
    fn on_found(&mut self, found: usize) -> ControlFlow<()> {
        if self.abandoned() {
            return ControlFlow::Break(());
        }
        if self.progress_every > 0 && found % self.progress_every == 0 {
            let progress = Response::Progress {
                action: self.action,
                found,
            };
            if self.tx.send(progress).is_err() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn on_checkpoint(&mut self, _examined: u64) -> ControlFlow<()> {
        if self.abandoned() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

fn run_job(
    id: u64,
    request: Request,
    config: WorkerConfig,
    tx: &mpsc::UnboundedSender<Response>,
    cancel: &CancelHandle,
) {
    let action = request.action();
    let terminal = match request {
        Request::FindCombinations(find) => {
            tracing::info!(
                job = id,
                cpu = find.cpu_budget,
                pg = find.pg_budget,
                modules = find.total_modules(),
                upper_bound = ?combination_count(&find.modules_by_category, &find.num_modules),
                "search started"
            );
            let mut observer = ChannelObserver {
                action,
                progress_every: config.progress_every,
                tx,
                cancel,
            };
            match find_combinations(&find, &mut observer) {
                Ok(summary) => {
                    tracing::info!(
                        job = id,
                        results = summary.results.len(),
                        examined = summary.combinations_examined,
                        "search finished"
                    );
                    Response::Finished {
                        action,
                        result: ResponsePayload::Search(summary),
                    }
                }
                Err(err @ FitError::Cancelled) => {
                    tracing::info!(job = id, "search cancelled");
                    Response::failed(action, err.to_string())
                }
                Err(err) => {
                    tracing::warn!(job = id, error = %err, "search rejected");
                    Response::failed(action, err.to_string())
                }
            }
        }
        Request::Sort(sort) => {
            tracing::debug!(job = id, results = sort.results.len(), "sorting");
            Response::Finished {
                action,
                result: ResponsePayload::Sorted(sort_request(sort)),
            }
        }
    };

    if tx.send(terminal).is_err() {
        tracing::debug!(job = id, "receiver gone before terminal response");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fit_core::test_fixtures::{blank_result, dps, find_request, make_rng, random_dps_pool};
    use fit_core::{Category, SearchSummary, SortField, SortKey, SortRequest};

    fn drain(job: &mut Job) -> Vec<Response> {
        let mut responses = Vec::new();
        while let Some(response) = job.blocking_recv() {
            responses.push(response);
        }
        responses
    }

    fn three_dps_request() -> Request {
        Request::FindCombinations(find_request(
            100.0,
            100.0,
            [
                dps(1, 10.0, 1.0, 1.1, 10.0),
                dps(2, 12.0, 1.0, 1.08, 8.0),
                dps(3, 14.0, 1.0, 1.06, 6.0),
            ],
            &[(Category::Dps, 2)],
        ))
    }

    #[test]
    fn progress_precedes_single_terminal_message() {
        let worker = Worker::new(WorkerConfig::default());
        let mut job = worker.submit(three_dps_request()).unwrap();
        let responses = drain(&mut job);

        let progress: Vec<usize> = responses
            .iter()
            .filter_map(|r| match r {
                Response::Progress { found, .. } => Some(*found),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![1, 2, 3]);
        assert_eq!(responses.iter().filter(|r| r.is_terminal()).count(), 1);
        match responses.last() {
            Some(Response::Finished {
                action: Action::FindCombinations,
                result: ResponsePayload::Search(SearchSummary { results, .. }),
            }) => assert_eq!(results.len(), 3),
            other => panic!("expected search result, got {other:?}"),
        }
    }

    #[test]
    fn progress_is_throttled() {
        let worker = Worker::new(WorkerConfig { progress_every: 2 });
        let mut job = worker.submit(three_dps_request()).unwrap();
        let progress = drain(&mut job)
            .into_iter()
            .filter(|r| !r.is_terminal())
            .count();
        assert_eq!(progress, 1);
    }

    #[test]
    fn invalid_request_fails_without_progress() {
        let worker = Worker::default();
        let request = Request::FindCombinations(find_request(
            0.0,
            10.0,
            [dps(1, 10.0, 1.0, 1.1, 10.0)],
            &[(Category::Dps, 1)],
        ));
        let mut job = worker.submit(request).unwrap();
        assert_eq!(
            drain(&mut job),
            vec![Response::failed(
                Action::FindCombinations,
                "Please enter valid budget and number of modules."
            )]
        );
    }

    #[test]
    fn sort_echoes_the_request_sorted() {
        let worker = Worker::default();
        let mut cheap = blank_result(0, &[(Category::Dps, 1)]);
        cheap.total_cpu = 5.0;
        let mut pricey = blank_result(1, &[(Category::Dps, 2)]);
        pricey.total_cpu = 9.0;
        let request = SortRequest {
            results: vec![cheap.clone(), pricey.clone()],
            sort_keys: vec![SortKey::desc(SortField::TotalCpu)],
            make_unique: false,
        };
        let mut job = worker.submit(Request::Sort(request)).unwrap();
        match drain(&mut job).as_slice() {
            [Response::Finished {
                action: Action::Sort,
                result: ResponsePayload::Sorted(sorted),
            }] => assert_eq!(sorted.results, vec![pricey, cheap]),
            other => panic!("expected one sort result, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_job_stops_with_error() {
        let worker = Worker::new(WorkerConfig { progress_every: 0 });
        let mut rng = make_rng();
        // Large enough that the search cannot finish before the flag is seen.
        let request = Request::FindCombinations(find_request(
            1.0,
            1.0,
            random_dps_pool(&mut rng, 400),
            &[(Category::Dps, 3)],
        ));
        let mut job = worker.submit(request).unwrap();
        job.cancel();
        assert_eq!(
            drain(&mut job),
            vec![Response::failed(
                Action::FindCombinations,
                "computation cancelled"
            )]
        );
    }

    #[test]
    fn negative_count_on_the_wire_is_an_invalid_request() {
        let request = Request::from_json(
            r#"{"action": "findCombinations",
                "payload": {"cpuBudget": 100, "pgBudget": 100, "numModules": {"dps": -1}}}"#,
        )
        .unwrap();
        let mut job = Worker::default().submit(request).unwrap();
        assert_eq!(
            drain(&mut job),
            vec![Response::failed(
                Action::FindCombinations,
                "Please enter valid budget and number of modules."
            )]
        );
    }

    #[test]
    fn default_worker_numbers_jobs_from_one() {
        let by_default = Worker::default().submit(three_dps_request()).unwrap();
        let by_new = Worker::new(WorkerConfig::default())
            .submit(three_dps_request())
            .unwrap();
        assert_eq!(by_default.id(), 1);
        assert_eq!(by_new.id(), by_default.id());
        assert_eq!(Worker::default().config(), WorkerConfig::default());
    }

    #[test]
    fn job_ids_increase() {
        let worker = Worker::new(WorkerConfig::default());
        let first = worker.submit(three_dps_request()).unwrap();
        let second = worker.submit(three_dps_request()).unwrap();
        assert!(second.id() > first.id());
        assert_eq!(first.action(), Action::FindCombinations);
    }

    #[tokio::test]
    async fn async_receive_matches_blocking() {
        let worker = Worker::default();
        let mut job = worker.submit(three_dps_request()).unwrap();
        let mut last = None;
        while let Some(response) = job.recv().await {
            last = Some(response);
        }
        assert!(matches!(last, Some(Response::Finished { .. })));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: WorkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WorkerConfig::default());
        let config: WorkerConfig = serde_json::from_str(r#"{"progressEvery": 50}"#).unwrap();
        assert_eq!(config.progress_every, 50);
    }
}
