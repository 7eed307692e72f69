//! Worker pool for bounded-concurrency processing.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel and push results onto an unbounded channel. The work
//! `Receiver` is `Clone`, so each worker holds its own handle and no worker
//! can starve the others while waiting on `recv()`.
//!
//! The pool applies no per-item timeout of its own: dropping a work future
//! would also drop the item it owns. Callers bound item duration inside
//! `process_fn` and turn a timeout into a result.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A pool of worker tasks that process items concurrently.
///
/// At most `n` items are in flight; submission of further items waits on the
/// bounded work channel. Results arrive in completion order, not submission
/// order.
///
/// ```ignore
/// let mut pool = WorkerPool::start(4, items, |item| async move {
///     process(item).await
/// });
///
/// while let Some(result) = pool.recv().await {
///     handle(result);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn `n` workers (at least one), submit all items, and return a pool
    /// for receiving results.
    ///
    /// Submission happens in a background task so the caller can start
    /// receiving results immediately.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        if result_tx.send(process_fn(item).await).is_err() {
                            break; // Receiver dropped
                        }
                    }
                })
            })
            .collect();

        // The result channel closes once every worker has exited.
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
            // work_tx dropped here: workers drain what is queued, then stop
        });

        Self { result_rx, handles }
    }

    /// Receive the next result. Returns `None` once every item has been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }

    /// Number of worker tasks.
    pub fn workers(&self) -> usize {
        self.handles.len()
    }
}

impl<R: Send + 'static> Drop for WorkerPool<R> {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/worker_pool_tests.rs"]
mod tests;
