//! Fixed-size worker pool fed by a bounded FIFO queue.
//!
//! Workers share the receiving end of one channel behind a mutex. A worker
//! holds the lock only while waiting for the next item, so exactly one item
//! goes to exactly one worker, in arrival order. Each item is then serviced
//! to completion before that worker waits again. A handler that panics is
//! logged and the worker moves on to the next item.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// Why an item was not queued. The item is handed back to the caller.
#[derive(Debug)]
pub enum SubmitError<T> {
    /// Queue is at capacity.
    Full(T),
    /// Pool is shutting down.
    Closed(T),
}

impl<T> SubmitError<T> {
    pub fn into_inner(self) -> T {
        match self {
            SubmitError::Full(item) | SubmitError::Closed(item) => item,
        }
    }
}

pub struct WorkerPool<T> {
    sender: mpsc::Sender<T>,
    workers: Vec<JoinHandle<()>>,
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    /// Spawns `size` workers that pass each dequeued item to `handler`.
    ///
    /// # Panics
    ///
    /// Panics if `size` or `capacity` is zero. Must be called inside a tokio runtime.
    pub fn new<F, Fut>(size: usize, capacity: usize, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        assert!(size > 0, "worker pool needs at least one worker");

        let (sender, receiver) = mpsc::channel(capacity);
        let queue = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);

        let workers = (0..size)
            .map(|id| {
                let queue = Arc::clone(&queue);
                let handler = Arc::clone(&handler);
                tokio::spawn(Self::worker_loop(id, queue, handler))
            })
            .collect();

        Self { sender, workers }
    }

    async fn worker_loop<F, Fut>(id: usize, queue: Arc<Mutex<mpsc::Receiver<T>>>, handler: Arc<F>)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(worker = id, "Worker started");

        loop {
            // Lock is released at the end of this statement, before servicing.
            let item = queue.lock().await.recv().await;

            let Some(item) = item else { break };

            // A panicking handler takes down its own task, not this worker.
            if let Err(e) = tokio::spawn(handler(item)).await {
                tracing::error!(worker = id, error = %e, "Handler failed");
            }
        }

        tracing::debug!(worker = id, "Worker exiting");
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues an item, waiting for space when the queue is full.
    pub async fn submit(&self, item: T) -> Result<(), SubmitError<T>> {
        self.sender
            .send(item)
            .await
            .map_err(|e| SubmitError::Closed(e.0))
    }

    /// Queues an item or hands it straight back when the queue is full.
    pub fn try_submit(&self, item: T) -> Result<(), SubmitError<T>> {
        self.sender.try_send(item).map_err(|e| match e {
            mpsc::error::TrySendError::Full(item) => SubmitError::Full(item),
            mpsc::error::TrySendError::Closed(item) => SubmitError::Closed(item),
        })
    }

    /// Closes the queue and waits for every worker to finish.
    ///
    /// Items already queued are still serviced. Idle workers wake as soon as
    /// the queue closes.
    pub async fn shutdown(self) {
        let Self { sender, workers } = self;
        drop(sender);

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Worker task failed");
            }
        }
    }
}
