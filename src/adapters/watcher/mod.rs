//! File Watcher (§4.11): a debounced `notify`-backed [`FolderWatcher`].
//!
//! Advisory only — correctness still depends on the Fingerprint & Change
//! Detector running at least once at startup and after any reconnection
//! event, since filesystem events can be coalesced, reordered, or missed.

use crate::domain::error::{Error, Result};
use crate::domain::ports::watcher::{FolderWatcher, WatchBatch, WatchHandle};
use notify::{Event, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// Debounced `notify` watcher. Coalesces raw filesystem events into
/// [`WatchBatch`]es no more often than once per `debounce`.
pub struct NotifyWatcher {
    debounce: Duration,
}

impl NotifyWatcher {
    /// Build a watcher with the given debounce window (spec default: 1s).
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for NotifyWatcher {
    fn default() -> Self {
        Self::new(crate::domain::constants::WATCHER_DEBOUNCE)
    }
}

impl FolderWatcher for NotifyWatcher {
    fn watch(&self, root: PathBuf, tx: Sender<WatchBatch>) -> Result<WatchHandle> {
        let cancel = CancellationToken::new();
        let debounce = self.debounce;
        let (raw_tx, mut raw_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = raw_tx.send(event);
            }
        })
        .map_err(|e| Error::internal(format!("failed to start watcher: {e}")))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::internal(format!("failed to watch {}: {e}", root.display())))?;

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            // Keep the platform watcher alive for the task's lifetime.
            let _watcher = watcher;
            let mut changed: HashSet<PathBuf> = HashSet::new();
            let mut deleted: HashSet<PathBuf> = HashSet::new();

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    event = raw_rx.recv() => {
                        match event {
                            Some(event) => classify(event, &mut changed, &mut deleted),
                            None => break,
                        }
                    }
                }

                // Drain anything else that arrived within the debounce window
                // before flushing a single batch.
                let deadline = tokio::time::Instant::now() + debounce;
                loop {
                    tokio::select! {
                        _ = task_cancel.cancelled() => break,
                        _ = tokio::time::sleep_until(deadline) => break,
                        event = raw_rx.recv() => match event {
                            Some(event) => classify(event, &mut changed, &mut deleted),
                            None => break,
                        }
                    }
                    if tokio::time::Instant::now() >= deadline {
                        break;
                    }
                }

                if !changed.is_empty() || !deleted.is_empty() {
                    let batch = WatchBatch {
                        changed: changed.drain().collect(),
                        deleted: deleted.drain().collect(),
                    };
                    if tx.send(batch).await.is_err() {
                        break;
                    }
                }
            }
        });

        Ok(WatchHandle::new(cancel))
    }
}

fn classify(event: Event, changed: &mut HashSet<PathBuf>, deleted: &mut HashSet<PathBuf>) {
    use notify::EventKind;
    match event.kind {
        EventKind::Remove(_) => {
            for path in event.paths {
                changed.remove(&path);
                deleted.insert(path);
            }
        }
        EventKind::Create(_) | EventKind::Modify(_) => {
            for path in event.paths {
                deleted.remove(&path);
                changed.insert(path);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_batch_is_empty_by_default() {
        assert!(WatchBatch::default().is_empty());
    }

    #[tokio::test]
    async fn watcher_reports_file_creation() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = NotifyWatcher::new(Duration::from_millis(100));
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let handle = watcher.watch(dir.path().to_path_buf(), tx).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        std::fs::write(dir.path().join("new.txt"), "hello").unwrap();

        let batch = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("batch should arrive")
            .expect("channel open");
        assert!(batch
            .changed
            .iter()
            .any(|p| p.ends_with("new.txt")));
        handle.stop();
    }
}
