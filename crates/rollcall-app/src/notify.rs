//! Speech notifications.
//!
//! `Notifier` is the capability seam; the production implementation spawns a
//! speech synthesis command per utterance. The `Announcer` decouples the
//! frame loop from speech latency with a bounded queue and a worker thread:
//! a full queue drops the announcement rather than stalling capture.

use std::process::Command;
use tokio::sync::mpsc;

/// Fire-and-forget speech capability.
pub trait Notifier: Send {
    fn announce(&self, text: &str);
}

/// Speaks by running the configured command with the text as its argument.
pub struct SpeechNotifier {
    command: String,
}

impl SpeechNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Notifier for SpeechNotifier {
    fn announce(&self, text: &str) {
        match Command::new(&self.command).arg(text).status() {
            Ok(status) if status.success() => {}
            Ok(status) => {
                tracing::warn!(command = %self.command, %status, "speech command failed");
            }
            Err(e) => {
                tracing::warn!(command = %self.command, error = %e, "speech command could not run");
            }
        }
    }
}

/// Handle to the announcement worker thread.
pub struct Announcer {
    tx: Option<mpsc::Sender<String>>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl Announcer {
    /// Spawn the worker draining the bounded queue through `notifier`.
    pub fn spawn(notifier: Box<dyn Notifier>, queue_depth: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<String>(queue_depth.max(1));

        let worker = std::thread::Builder::new()
            .name("rollcall-announcer".into())
            .spawn(move || {
                while let Some(text) = rx.blocking_recv() {
                    notifier.announce(&text);
                }
                tracing::debug!("announcer worker exiting");
            })
            .expect("failed to spawn announcer thread");

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Enqueue an announcement without blocking.
    ///
    /// Returns false if the queue was full and the announcement was dropped.
    pub fn say(&self, text: impl Into<String>) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(text.into()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                tracing::warn!(text = %dropped, "announcement queue full, dropping");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("announcer worker gone, dropping announcement");
                false
            }
        }
    }

    /// Close the queue and join the worker.
    ///
    /// Already-queued announcements are flushed; the worker exits once the
    /// queue drains, so process exit is never blocked indefinitely.
    pub fn shutdown(mut self) {
        self.tx.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::warn!("announcer worker panicked during shutdown");
            }
        }
    }
}
