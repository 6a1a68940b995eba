//! Bounded fire-and-forget worker pool.
//!
//! Long-running network/disk work (data-bundle downloads, observation
//! backfills) is handed off here and runs independently of the invoking
//! call. There is no return channel: completion is observable only via
//! the status and comment writes the task performs. Errors are caught at
//! the task boundary and logged; they never crash the pool.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::domain::errors::FacilityResult;

/// Semaphore-bounded wrapper around `tokio::spawn`.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// Create a pool that runs at most `size` tasks concurrently.
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    /// Submit a task. Returns immediately; the task waits for a permit
    /// before running and its outcome is only logged.
    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = FacilityResult<()>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            // The semaphore is never closed, so acquire cannot fail.
            let Ok(_permit) = permits.acquire_owned().await else {
                tracing::error!(label, "worker pool semaphore closed");
                return;
            };
            match task.await {
                Ok(()) => tracing::debug!(label, "background task finished"),
                Err(e) => tracing::error!(label, error = %e, "background task failed"),
            }
        });
    }

    /// Number of tasks that could start right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
