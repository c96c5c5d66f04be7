//! The retrieval engine port: the five navigation and search operations.

use crate::domain::error::Result;
use crate::domain::types::{
    Breadcrumb, DocumentSummary, FolderEntry, OutlineEntry, SearchResponse,
};
use async_trait::async_trait;
use std::path::Path;

/// Executes folder/document navigation queries and search.
///
/// All five operations are fail-loud: missing semantic fields surface as
/// errors, never as `null` or a silently substituted empty array.
#[async_trait]
pub trait RetrievalEngine: Send + Sync {
    /// Direct subfolders of `parent_path` with aggregated semantic previews.
    async fn list_folders(&self, parent_path: &Path) -> Result<Vec<FolderEntry>>;

    /// Documents directly within `folder_path`.
    async fn list_documents(&self, folder_path: &Path) -> Result<Vec<DocumentSummary>>;

    /// The ordered chunk outline of a single document.
    async fn get_document_outline(&self, document_id: &str) -> Result<Vec<OutlineEntry>>;

    /// Breadcrumbs and subfolder previews for `path`.
    async fn explore(&self, path: &Path) -> Result<(Vec<Breadcrumb>, Vec<FolderEntry>)>;

    /// Semantic + filename + hybrid-keyword search for `query`, returning up
    /// to `k` ranked hits.
    async fn search(&self, query: &str, k: usize) -> Result<SearchResponse>;
}
