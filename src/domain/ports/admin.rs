//! The control-surface admin port: `reindex`, `status`, `subscribe`.
//!
//! These three operations sit alongside [`crate::domain::ports::retrieval::RetrievalEngine`]
//! in the produced control surface (spec §6), but they drive writes and
//! lifecycle rather than reads, so they get their own narrow trait instead of
//! being folded into `RetrievalEngine`.

use crate::domain::error::Result;
use crate::domain::ports::events::ChangeEvent;
use crate::domain::types::{FolderStatus, ReindexSummary};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Folder lifecycle/admin operations: trigger a reindex, inspect a folder's
/// current status, and subscribe to its change events.
#[async_trait]
pub trait FolderAdmin: Send + Sync {
    /// Run a full fingerprint-diff scan and process every change it finds,
    /// returning a tally of what happened. Equivalent to the startup-time
    /// full scan, callable on demand.
    async fn reindex(&self) -> Result<ReindexSummary>;

    /// Current indexed/pending/failed counts for this folder, and when it
    /// was last fully processed.
    async fn status(&self) -> Result<FolderStatus>;

    /// Subscribe to this folder's change events (document upserted/deleted,
    /// reindex completed). The returned receiver observes events published
    /// after the call returns; it does not replay history.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
