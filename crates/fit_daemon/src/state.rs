use std::sync::Arc;

use anyhow::Result;
use fit_worker::{CancelHandle, Job, Request, Worker};
use parking_lot::Mutex;

/// The job currently owning the daemon.
pub struct ActiveJob {
    pub id: u64,
    pub cancel: CancelHandle,
}

pub type SharedActive = Arc<Mutex<Option<ActiveJob>>>;

#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<Worker>,
    pub active: SharedActive,
}

impl AppState {
    pub fn new(worker: Worker) -> Self {
        Self {
            worker: Arc::new(worker),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Submits `request`, cancelling whatever job was running before.
    pub fn start(&self, request: Request) -> Result<Job> {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            previous.cancel.cancel();
            tracing::info!(job = previous.id, "superseded by a new request");
        }
        let job = self.worker.submit(request)?;
        *active = Some(ActiveJob {
            id: job.id(),
            cancel: job.cancel_handle(),
        });
        Ok(job)
    }

    /// Clears the active slot if `id` still holds it.
    pub fn finish(&self, id: u64) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|job| job.id == id) {
            *active = None;
        }
    }

    /// Cancels the active job and returns its id.
    pub fn cancel_active(&self) -> Option<u64> {
        let job = self.active.lock().take()?;
        job.cancel.cancel();
        Some(job.id)
    }

    pub fn is_busy(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|job| !job.cancel.is_cancelled())
    }
}
