//! Completion delivery.
//!
//! By default a page's completion runs on whichever task finished that
//! page's exchange, so completions for one fan-out can run concurrently and
//! in any order. A queue dispatch instead hands every completion to a single
//! consumer (a UI loop, a dedicated task), which runs them one at a time.

use std::fmt;

use tokio::sync::mpsc;

/// A boxed completion waiting to run.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where completions are invoked.
#[derive(Clone, Default)]
pub enum Dispatch {
    /// Run the completion where the exchange finished.
    #[default]
    Inline,
    /// Send the completion to the single consumer of a [`CompletionQueue`].
    Queue(mpsc::UnboundedSender<Job>),
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("Inline"),
            Self::Queue(tx) => f
                .debug_struct("Queue")
                .field("closed", &tx.is_closed())
                .finish(),
        }
    }
}

impl Dispatch {
    /// A queue dispatch and the consumer end that must run its jobs.
    pub fn queue() -> (Self, CompletionQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::Queue(tx), CompletionQueue { rx })
    }

    /// A queue dispatch whose consumer is a spawned tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_serial() -> Self {
        let (dispatch, queue) = Self::queue();
        tokio::spawn(queue.run());
        dispatch
    }

    /// Returns true if completions are serialized through a queue.
    pub fn is_serialized(&self) -> bool {
        matches!(self, Self::Queue(_))
    }

    /// Deliver a completion according to this policy.
    ///
    /// If the queue's consumer is gone the completion runs inline, so it is
    /// never lost.
    pub(crate) fn deliver<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Inline => job(),
            Self::Queue(tx) => {
                if let Err(mpsc::error::SendError(job)) = tx.send(Box::new(job)) {
                    tracing::warn!("completion queue closed, running completion inline");
                    job();
                }
            }
        }
    }
}

/// Consumer end of a [`Dispatch::queue`].
#[derive(Debug)]
pub struct CompletionQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl CompletionQueue {
    /// Run completions until every [`Dispatch`] clone is dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
    }

    /// Wait for and run the next completion.
    ///
    /// Returns false once every sender is gone and the queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run every completion already queued, without waiting.
    ///
    /// Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_inline_runs_immediately() {
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        Dispatch::Inline.deliver(move || *counter.lock().unwrap() += 1);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_queue_defers_until_drained() {
        let (dispatch, mut queue) = Dispatch::queue();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            dispatch.deliver(move || order.lock().unwrap().push(i));
        }

        assert!(order.lock().unwrap().is_empty());
        assert_eq!(queue.drain(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_closed_queue_falls_back_to_inline() {
        let (dispatch, queue) = Dispatch::queue();
        drop(queue);

        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        dispatch.deliver(move || *counter.lock().unwrap() += 1);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_next_stops_when_senders_dropped() {
        let (dispatch, mut queue) = Dispatch::queue();
        dispatch.deliver(|| {});
        drop(dispatch);

        assert!(queue.run_next().await);
        assert!(!queue.run_next().await);
    }

    #[tokio::test]
    async fn test_spawn_serial_runs_jobs() {
        let dispatch = Dispatch::spawn_serial();
        let (tx, rx) = tokio::sync::oneshot::channel();
        dispatch.deliver(move || {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.unwrap(), 42);
        assert!(dispatch.is_serialized());
    }
}
