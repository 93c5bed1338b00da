//! Debounced writes.
//!
//! A [`Debouncer`] owns one pending-value slot and a resettable deadline in a
//! background tokio task. Each `submit` replaces the pending value and pushes
//! the deadline out by the quiet period; when the deadline passes the latest
//! value goes to the sink exactly once. Superseded values are never written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Quiet period before a deck collection is written
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

enum Command<T> {
    Submit { seq: u64, value: T },
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

pub struct Debouncer<T: Send + 'static> {
    sender: mpsc::UnboundedSender<Command<T>>,
    submitted: Arc<AtomicU64>,
    settled: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task on the current tokio runtime
    pub fn new<F>(quiet_period: Duration, sink: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let submitted = Arc::new(AtomicU64::new(0));
        let settled = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(debounce_loop(
            quiet_period,
            sink,
            receiver,
            Arc::clone(&settled),
        ));

        Self {
            sender,
            submitted,
            settled,
            task: Some(task),
        }
    }

    /// Replace the pending value and restart the quiet period
    pub fn submit(&self, value: T) {
        let seq = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        if self.sender.send(Command::Submit { seq, value }).is_err() {
            log::warn!("Debouncer stopped, dropping submitted value");
        }
    }

    /// Whether a submitted value has not been written yet
    pub fn is_pending(&self) -> bool {
        self.submitted.load(Ordering::SeqCst) > self.settled.load(Ordering::SeqCst)
    }

    /// Write the pending value now, if any
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush and stop the background task
    pub async fn shutdown(mut self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(Command::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

async fn debounce_loop<T, F>(
    quiet_period: Duration,
    mut sink: F,
    mut receiver: mpsc::UnboundedReceiver<Command<T>>,
    settled: Arc<AtomicU64>,
) where
    F: FnMut(T),
{
    let mut pending: Option<(u64, T)> = None;
    let mut deadline: Option<Instant> = None;

    let mut deliver = |pending: &mut Option<(u64, T)>| {
        if let Some((seq, value)) = pending.take() {
            sink(value);
            settled.store(seq, Ordering::SeqCst);
        }
    };

    loop {
        let wake_at = deadline.unwrap_or_else(Instant::now);

        tokio::select! {
            command = receiver.recv() => match command {
                Some(Command::Submit { seq, value }) => {
                    pending = Some((seq, value));
                    deadline = Some(Instant::now() + quiet_period);
                }
                Some(Command::Flush(ack)) => {
                    deliver(&mut pending);
                    deadline = None;
                    let _ = ack.send(());
                }
                Some(Command::Shutdown(ack)) => {
                    deliver(&mut pending);
                    let _ = ack.send(());
                    break;
                }
                None => {
                    // Every handle dropped
                    deliver(&mut pending);
                    break;
                }
            },
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                deliver(&mut pending);
                deadline = None;
            }
        }
    }
}
