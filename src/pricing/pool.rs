//! Bounded worker pool with an explicit shutdown.

use crate::core::PoolError;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, error, info};

/// Observes a pool's shutdown request.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// A signal that never fires.
    #[cfg(test)]
    pub(crate) fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Shutdown { rx }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been requested.
    pub async fn recv(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            // Sender gone without a shutdown request: nothing will ever fire.
            std::future::pending::<()>().await;
        }
    }
}

/// Runs batches of tasks with at most `size` of them executing at once.
///
/// Tasks beyond the bound queue on a semaphore. Once [`WorkerPool::shutdown`]
/// is called, queued tasks are abandoned, running ones are allowed to finish
/// and new batches are rejected.
pub struct WorkerPool {
    name: &'static str,
    permits: Arc<Semaphore>,
    shutdown: watch::Sender<bool>,
}

impl WorkerPool {
    pub fn new(name: &'static str, size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::Empty(name));
        }
        let (shutdown, _) = watch::channel(false);
        debug!(pool = name, size, "Created worker pool");
        Ok(WorkerPool {
            name,
            permits: Arc::new(Semaphore::new(size)),
            shutdown,
        })
    }

    pub fn shutdown_signal(&self) -> Shutdown {
        Shutdown {
            rx: self.shutdown.subscribe(),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }

    /// Spawns one task per item and waits until every task has resolved.
    ///
    /// Outputs are returned in no particular relation to the input order.
    /// Tasks that panic or were abandoned by a shutdown contribute nothing.
    pub async fn run_all<I, F, Fut>(&self, items: I, task: F) -> Result<Vec<Fut::Output>, PoolError>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        if self.is_shut_down() {
            return Err(PoolError::ShutDown(self.name));
        }

        let handles: Vec<_> = items
            .into_iter()
            .map(task)
            .map(|fut| {
                let permits = Arc::clone(&self.permits);
                tokio::spawn(async move {
                    // Acquire fails only once the pool has been shut down.
                    let _permit = permits.acquire_owned().await.ok()?;
                    Some(fut.await)
                })
            })
            .collect();
        debug!(pool = self.name, tasks = handles.len(), "Dispatched tasks");

        let mut outputs = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            match joined {
                Ok(Some(output)) => outputs.push(output),
                Ok(None) => debug!(pool = self.name, "Task abandoned on shutdown"),
                Err(e) => error!(pool = self.name, error = %e, "Task failed to complete"),
            }
        }
        Ok(outputs)
    }

    pub fn shutdown(&self) {
        if !self.permits.is_closed() {
            info!(pool = self.name, "Shutting down worker pool");
        }
        self.permits.close();
        self.shutdown.send_replace(true);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
