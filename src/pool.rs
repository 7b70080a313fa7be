//! # Bounded Worker Pools
//! Semaphore-bounded task submission over the Tokio runtime. When a permit is
//! free the task is spawned; when the pool is saturated the future runs inline
//! on the submitting task instead of being queued or dropped. That trades
//! submitter latency for a hard bound on concurrent work, and means submission
//! never fails.
//!
//! Two pools exist at startup: one for scoring-pipeline invocations and a
//! smaller one for externally triggered reprocessing, so reprocessing can
//! never starve the ingestion cycle.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    name: &'static str,
}

/// Completion handle for submitted work. `Spawned` work runs on the pool;
/// `Inline` work already ran to completion on the submitting task.
#[derive(Debug)]
pub enum TaskHandle<T> {
    Spawned(JoinHandle<T>),
    Inline(T),
}

impl<T> TaskHandle<T> {
    /// Wait for the task's output. A panicked spawned task yields `None`.
    pub async fn join(self) -> Option<T> {
        match self {
            TaskHandle::Spawned(handle) => match handle.await {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::error!(error = ?e, "pool task join failed");
                    None
                }
            },
            TaskHandle::Inline(v) => Some(v),
        }
    }
}

impl WorkerPool {
    pub fn new(size: usize, name: &'static str) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
            name,
        }
    }

    /// Submit work to the pool. Returns once the task is spawned, or — when
    /// the pool is saturated — once the work has run inline.
    pub async fn submit<F, T>(&self, fut: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        match self.permits.clone().try_acquire_owned() {
            Ok(permit) => TaskHandle::Spawned(tokio::spawn(async move {
                let _permit = permit;
                fut.await
            })),
            Err(_) => {
                tracing::debug!(pool = self.name, "pool saturated, running inline");
                TaskHandle::Inline(fut.await)
            }
        }
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
