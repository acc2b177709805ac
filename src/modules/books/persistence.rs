//! Background writer that mirrors list snapshots into the store.
//!
//! Snapshots are written in submission order by a single task. When several
//! are queued only the newest is written; it already contains every older one.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::models::BookEntry;
use super::store::BookStore;

enum Command {
    Save(Vec<BookEntry>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the persistence task. Must be created inside a Tokio runtime.
pub struct PersistenceWorker {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl PersistenceWorker {
    pub fn spawn(store: BookStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(store, rx));
        Self { tx, task }
    }

    /// Queue a full snapshot for writing. Returns immediately.
    pub fn submit(&self, snapshot: Vec<BookEntry>) {
        if self.tx.send(Command::Save(snapshot)).is_err() {
            warn!("persistence worker is gone; snapshot dropped");
        }
    }

    /// Wait until every snapshot submitted before this call has been handled.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            warn!("persistence worker is gone; nothing to flush");
            return;
        }
        let _ = ack_rx.await;
    }

    /// Drain the queue and stop the task.
    pub async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(err) = task.await {
            warn!(error = %err, "persistence worker ended abnormally");
        }
    }
}

async fn run(store: BookStore, mut rx: mpsc::UnboundedReceiver<Command>) {
    debug!(key = %store.key(), "persistence worker started");

    while let Some(first) = rx.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut coalesced = 0usize;

        let mut absorb = |command: Command| match command {
            Command::Save(snapshot) => {
                if latest.replace(snapshot).is_some() {
                    coalesced += 1;
                }
            }
            Command::Flush(ack) => waiters.push(ack),
        };

        absorb(first);
        while let Ok(command) = rx.try_recv() {
            absorb(command);
        }

        if let Some(snapshot) = latest {
            if coalesced > 0 {
                debug!(skipped = coalesced, "coalesced queued snapshots");
            }
            // Failures are already logged by the store; the in-memory list stays authoritative.
            let _ = store.save(&snapshot).await;
        }

        for ack in waiters {
            let _ = ack.send(());
        }
    }

    debug!(key = %store.key(), "persistence worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::modules::books::models::BookId;
    use crate::modules::books::test_support::{FailingStore, RecordingStore};

    fn snapshot(names: &[&str]) -> Vec<BookEntry> {
        names
            .iter()
            .map(|name| BookEntry::new(BookId::from(*name), name.to_string(), "Author".to_string()))
            .collect()
    }

    #[tokio::test]
    async fn flush_waits_for_pending_write() {
        let kv = Arc::new(RecordingStore::default());
        let worker = PersistenceWorker::spawn(BookStore::with_default_key(kv.clone()));

        worker.submit(snapshot(&["Dune"]));
        worker.flush().await;

        assert_eq!(kv.writes(), 1);
        let stored = BookStore::with_default_key(kv.clone()).load().await;
        assert_eq!(stored, snapshot(&["Dune"]));
    }

    #[tokio::test]
    async fn queued_snapshots_collapse_to_the_newest() {
        let kv = Arc::new(RecordingStore::default());
        let worker = PersistenceWorker::spawn(BookStore::with_default_key(kv.clone()));

        // Nothing yields between these calls on the current-thread runtime,
        // so the worker finds all three queued at once.
        worker.submit(snapshot(&["A"]));
        worker.submit(snapshot(&["A", "B"]));
        worker.submit(snapshot(&["A", "B", "C"]));
        worker.flush().await;

        assert_eq!(kv.writes(), 1);
        let stored = BookStore::with_default_key(kv.clone()).load().await;
        assert_eq!(stored, snapshot(&["A", "B", "C"]));
    }

    #[tokio::test]
    async fn later_snapshot_wins_across_batches() {
        let kv = Arc::new(RecordingStore::default());
        let worker = PersistenceWorker::spawn(BookStore::with_default_key(kv.clone()));

        worker.submit(snapshot(&["A", "B"]));
        worker.flush().await;
        worker.submit(snapshot(&["B"]));
        worker.flush().await;

        assert_eq!(kv.writes(), 2);
        let stored = BookStore::with_default_key(kv.clone()).load().await;
        assert_eq!(stored, snapshot(&["B"]));
    }

    #[tokio::test]
    async fn failed_write_is_not_retried() {
        let kv = Arc::new(FailingStore::default());
        let worker = PersistenceWorker::spawn(BookStore::with_default_key(kv.clone()));

        worker.submit(snapshot(&["Dune"]));
        worker.flush().await;

        assert_eq!(kv.attempts(), 1);
    }

    #[tokio::test]
    async fn shutdown_drains_the_queue() {
        let kv = Arc::new(RecordingStore::default());
        let worker = PersistenceWorker::spawn(BookStore::with_default_key(kv.clone()));

        worker.submit(snapshot(&["Dune"]));
        worker.shutdown().await;

        let stored = BookStore::with_default_key(kv.clone()).load().await;
        assert_eq!(stored, snapshot(&["Dune"]));
    }

    #[tokio::test]
    async fn flush_with_nothing_queued_returns() {
        let kv = Arc::new(RecordingStore::default());
        let worker = PersistenceWorker::spawn(BookStore::with_default_key(kv.clone()));

        worker.flush().await;

        assert_eq!(kv.writes(), 0);
    }
}
