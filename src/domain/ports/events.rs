//! Change-event publication, backing the `subscribe(folder)` control surface
//! operation.

use crate::domain::error::Result;
use crate::domain::types::Document;
use async_trait::async_trait;
use std::sync::Arc;

/// An event describing a change to a folder's index.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A document was committed (new or replaced).
    DocumentUpserted {
        /// The folder the document belongs to.
        folder: std::path::PathBuf,
        /// The committed document.
        document: Box<Document>,
    },
    /// A document was removed.
    DocumentDeleted {
        /// The folder the document belonged to.
        folder: std::path::PathBuf,
        /// The removed document's id.
        document_id: String,
    },
    /// A folder finished a full reindex pass.
    ReindexCompleted {
        /// The folder that finished reindexing.
        folder: std::path::PathBuf,
    },
}

/// Publishes [`ChangeEvent`]s to interested subscribers (e.g. the folder
/// preview cache, or a `subscribe(folder)` control-surface caller).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    async fn publish(&self, event: ChangeEvent) -> Result<()>;

    /// True if at least one subscriber is currently attached.
    fn has_subscribers(&self) -> bool;
}

/// Shared, cloneable handle to an [`EventPublisher`].
pub type SharedEventPublisher = Arc<dyn EventPublisher>;
