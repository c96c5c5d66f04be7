//! Retrieval Engine (§4.8): the five navigation and search operations,
//! all fail-loud — a missing semantic field surfaces as an error rather
//! than a silently substituted `null`.

use crate::application::embedding_pool::EmbeddingWorkerPool;
use crate::application::folder_aggregator;
use crate::domain::constants::{
    FILENAME_BOOST_EXACT_THRESHOLD, FILENAME_BOOST_PARTIAL_THRESHOLD, FILENAME_EXACT_CONTENT_WEIGHT,
    FILENAME_EXACT_SIMILARITY_GAIN, FILENAME_EXACT_WEIGHT, FILENAME_PARTIAL_CONTENT_WEIGHT,
    FILENAME_PARTIAL_WEIGHT, HYBRID_BOOST_MULTIPLIER, KEYWORD_ONLY_SCORE, QUERY_MAX_LEN,
    QUERY_MIN_LEN,
};
use crate::domain::error::{Error, Result};
use crate::domain::ports::retrieval::RetrievalEngine;
use crate::domain::ports::storage::{Storage, VectorHit};
use crate::domain::types::{
    Breadcrumb, Chunk, ChunkOutlineSemantics, Document, DocumentSummary, FolderEntry, MatchType,
    OutlineEntry, ParseStatus, QualityIndicators, SearchHit, SearchInsights, SearchResponse,
    SearchStrategy, SemanticContext,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Search fan-out width: how many semantic candidates to pull from
/// [`Storage::vector_search`] before filename/hybrid fusion and truncation
/// to the caller's requested `k`.
const CANDIDATE_MULTIPLIER: usize = 4;

/// Implements the five retrieval operations against one folder's
/// [`Storage`] and embedding pool.
pub struct FolderRetrieval {
    root: PathBuf,
    storage: Arc<dyn Storage>,
    embeddings: Arc<EmbeddingWorkerPool>,
}

impl FolderRetrieval {
    /// Build a retrieval engine scoped to one folder's store.
    pub fn new(root: PathBuf, storage: Arc<dyn Storage>, embeddings: Arc<EmbeddingWorkerPool>) -> Self {
        Self { root, storage, embeddings }
    }

    async fn direct_subfolders(&self, relative_parent: &Path) -> Result<Vec<(String, PathBuf)>> {
        let absolute = self.root.join(relative_parent);
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&absolute).await {
            Ok(entries) => entries,
            Err(_) => return Ok(out),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::internal(e.to_string()))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::internal(e.to_string()))?;
            if !file_type.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == ".folder-mcp" || name.starts_with('.') {
                continue;
            }
            out.push((name.clone(), relative_parent.join(&name)));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    async fn folder_entry(&self, name: String, relative: PathBuf) -> Result<FolderEntry> {
        let documents = self.storage.query_documents_under(&relative, true).await?;
        let preview = folder_aggregator::aggregate(&documents);
        Ok(FolderEntry {
            name,
            path: self.root.join(&relative),
            document_count: documents.len(),
            semantic_preview: preview,
        })
    }

    fn document_summary(&self, document: &Document) -> Result<DocumentSummary> {
        let summary = document.semantic_summary.as_ref().ok_or_else(|| {
            Error::not_found(format!("semantic summary for document {}", document.id))
        })?;
        let name = document
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| document.id.clone());
        let document_type = if matches!(
            document.path.extension().and_then(|e| e.to_str()),
            Some("md") | Some("markdown")
        ) {
            "markdown".to_string()
        } else {
            "plain_text".to_string()
        };

        Ok(DocumentSummary {
            id: document.id.clone(),
            name,
            size: 0,
            primary_purpose: summary.primary_theme.clone(),
            key_concepts: summary.top_key_phrases.iter().map(|t| t.term.clone()).take(10).collect(),
            main_topics: summary.top_topics.iter().map(|t| t.term.clone()).take(10).collect(),
            document_type,
            readability: summary.avg_readability,
            quality: QualityIndicators {
                extraction_confidence: summary.confidence,
                phrase_richness: summary.phrase_richness,
                topic_specificity: summary.topic_diversity,
            },
        })
    }
}

#[async_trait]
impl RetrievalEngine for FolderRetrieval {
    async fn list_folders(&self, parent_path: &Path) -> Result<Vec<FolderEntry>> {
        let relative = relative_to_root(&self.root, parent_path);
        let mut out = Vec::new();
        for (name, rel) in self.direct_subfolders(&relative).await? {
            out.push(self.folder_entry(name, rel).await?);
        }
        Ok(out)
    }

    async fn list_documents(&self, folder_path: &Path) -> Result<Vec<DocumentSummary>> {
        let relative = relative_to_root(&self.root, folder_path);
        let documents = self.storage.query_documents_under(&relative, true).await?;
        let mut out = Vec::with_capacity(documents.len());
        for document in documents {
            if matches!(
                document.status,
                ParseStatus::Failed | ParseStatus::Skipped | ParseStatus::FailedQuality
            ) {
                continue;
            }
            out.push(self.document_summary(&document)?);
        }
        Ok(out)
    }

    async fn get_document_outline(&self, document_id: &str) -> Result<Vec<OutlineEntry>> {
        let mut chunks = self.storage.get_chunks(document_id).await?;
        if chunks.is_empty() {
            return Err(Error::not_found(format!("document {document_id}")));
        }
        chunks.retain(|c| !c.is_filename_chunk());
        chunks.sort_by_key(|c| c.chunk_index);

        Ok(chunks
            .into_iter()
            .map(|chunk| {
                let chunk_id = format!("{}:{}", chunk.document_id, chunk.chunk_index);
                let semantics = if chunk.topics.is_empty() && chunk.key_phrases.is_empty() {
                    None
                } else {
                    Some(ChunkOutlineSemantics {
                        main_points: chunk.key_phrases.iter().map(|t| t.term.clone()).take(5).collect(),
                        topics: chunk.topics.iter().map(|t| t.term.clone()).collect(),
                        key_phrases: chunk.key_phrases.iter().map(|t| t.term.clone()).collect(),
                        has_examples: looks_like_examples(&chunk.text),
                        has_data: looks_like_data(&chunk.text),
                        readability: chunk.readability.unwrap_or(0.0),
                    })
                };
                OutlineEntry {
                    chunk_id,
                    heading: chunk.heading,
                    chunk_index: chunk.chunk_index,
                    semantics,
                }
            })
            .collect())
    }

    async fn explore(&self, path: &Path) -> Result<(Vec<Breadcrumb>, Vec<FolderEntry>)> {
        let relative = relative_to_root(&self.root, path);
        let mut breadcrumbs = Vec::new();
        let mut accumulated = PathBuf::new();
        for component in relative.components() {
            accumulated.push(component);
            let documents = self
                .storage
                .query_documents_under(&accumulated, true)
                .await?;
            let preview = folder_aggregator::aggregate(&documents);
            breadcrumbs.push(Breadcrumb {
                name: component.as_os_str().to_string_lossy().into_owned(),
                path: self.root.join(&accumulated),
                topic_hint: preview.top_topics.first().cloned(),
            });
        }

        let folders = self.list_folders(path).await?;
        Ok((breadcrumbs, folders))
    }

    async fn search(&self, query: &str, k: usize) -> Result<SearchResponse> {
        let started = std::time::Instant::now();
        let result = self.search_inner(query, k).await;
        crate::infrastructure::metrics::record_search_latency(
            &self.root.display().to_string(),
            started.elapsed(),
        );
        result
    }
}

impl FolderRetrieval {
    async fn search_inner(&self, query: &str, k: usize) -> Result<SearchResponse> {
        if query.len() < QUERY_MIN_LEN {
            return Err(Error::QueryTooShort { min: QUERY_MIN_LEN });
        }
        if query.len() > QUERY_MAX_LEN {
            return Err(Error::QueryTooLong { max: QUERY_MAX_LEN });
        }

        let poor_tokenizers = poor_tokenizer_terms(query);
        let capabilities = self.embeddings.capabilities();
        let query_embedding = self.embeddings.embed_query(query).await?;

        let candidate_k = (k * CANDIDATE_MULTIPLIER).max(k).max(1);
        let semantic_hits = self
            .storage
            .vector_search(&query_embedding.vector, candidate_k)
            .await?;

        let keyword_chunks = if poor_tokenizers.is_empty() {
            Vec::new()
        } else {
            self.storage.keyword_scan(&poor_tokenizers).await?
        };

        // Content-only similarity per document, used as the "content_score"
        // term in the filename-boost fusion formula below — excludes the
        // filename chunk itself so a document's own filename hit never
        // boosts against its own similarity.
        let semantic_by_document = best_similarity_per_document(
            semantic_hits.iter().filter(|h| !h.chunk.is_filename_chunk()),
        );
        let semantic_chunk_ids: HashSet<(String, i64)> = semantic_hits
            .iter()
            .map(|h| (h.chunk.document_id.clone(), h.chunk.chunk_index))
            .collect();

        let mut hits = Vec::new();

        // The filename chunk lives in the same unified vector index as
        // content chunks (§9: "filename search is not a separate
        // subsystem"), so its boost is computed right here off the real
        // embedding cosine `hit.similarity` returned by `vector_search` —
        // never off a separate lexical-overlap score.
        for hit in &semantic_hits {
            if hit.chunk.is_filename_chunk() {
                let content_score = semantic_by_document
                    .get(&hit.chunk.document_id)
                    .copied()
                    .unwrap_or(0.0);
                let (match_type, final_score) = if hit.similarity >= FILENAME_BOOST_EXACT_THRESHOLD {
                    let score = hit.similarity * FILENAME_EXACT_SIMILARITY_GAIN * FILENAME_EXACT_WEIGHT
                        + content_score * FILENAME_EXACT_CONTENT_WEIGHT;
                    (MatchType::FilenameExact, score)
                } else if hit.similarity >= FILENAME_BOOST_PARTIAL_THRESHOLD {
                    let score = hit.similarity * FILENAME_PARTIAL_WEIGHT
                        + content_score * FILENAME_PARTIAL_CONTENT_WEIGHT;
                    (MatchType::FilenamePartial, score)
                } else {
                    (MatchType::Semantic, hit.similarity)
                };
                let boosted = !matches!(match_type, MatchType::Semantic);
                hits.push(build_hit(
                    hit.chunk.clone(),
                    hit.similarity,
                    final_score,
                    match_type,
                    SearchStrategy::Semantic,
                    boosted,
                    Vec::new(),
                ));
                continue;
            }

            let matched_keywords = matched_poor_tokenizers(&hit.chunk, &poor_tokenizers);
            let (final_score, strategy, boosted) = if matched_keywords.is_empty() {
                (hit.similarity, SearchStrategy::Semantic, false)
            } else {
                (hit.similarity * HYBRID_BOOST_MULTIPLIER, SearchStrategy::HybridBoosted, true)
            };
            hits.push(build_hit(
                hit.chunk.clone(),
                hit.similarity,
                final_score,
                MatchType::Semantic,
                strategy,
                boosted,
                matched_keywords,
            ));
        }

        for chunk in &keyword_chunks {
            let key = (chunk.document_id.clone(), chunk.chunk_index);
            if semantic_chunk_ids.contains(&key) {
                continue;
            }
            let matched = matched_poor_tokenizers(chunk, &poor_tokenizers);
            hits.push(build_hit(
                chunk.clone(),
                0.0,
                KEYWORD_ONLY_SCORE,
                MatchType::Semantic,
                SearchStrategy::KeywordOnly,
                true,
                matched,
            ));
        }

        hits.sort_by(|a, b| b.final_score.partial_cmp(&a.final_score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k.max(1));

        let confidence = hits
            .first()
            .map(|h| h.final_score.clamp(0.0, 1.0))
            .unwrap_or(0.0);

        let model_optimization = if capabilities.requires_prefix || capabilities.requires_normalization {
            format!(
                "applied {} query prefix and {}normalization for {}",
                if capabilities.requires_prefix { "a" } else { "no" },
                if capabilities.requires_normalization { "" } else { "no " },
                capabilities.model_id,
            )
        } else {
            format!("no prefix/normalization required by {}", capabilities.model_id)
        };

        Ok(SearchResponse {
            hits,
            insights: SearchInsights {
                query_interpretation: format!("searched for \"{query}\""),
                model_optimization,
                poor_tokenizers_detected: poor_tokenizers,
                confidence,
            },
        })
    }
}

fn build_hit(
    chunk: Chunk,
    similarity: f32,
    final_score: f32,
    match_type: MatchType,
    search_strategy: SearchStrategy,
    boost_applied: bool,
    keyword_matches: Vec<String>,
) -> SearchHit {
    let matched_concepts: Vec<String> = chunk
        .topics
        .iter()
        .chain(chunk.key_phrases.iter())
        .map(|t| t.term.clone())
        .take(5)
        .collect();
    let why_relevant = match match_type {
        MatchType::FilenameExact => "filename closely matches the query".to_string(),
        MatchType::FilenamePartial => "filename partially matches the query".to_string(),
        MatchType::Semantic if search_strategy == SearchStrategy::KeywordOnly => {
            "matched an exact keyword the embedding model tokenizes poorly".to_string()
        }
        _ => "semantically similar content".to_string(),
    };
    let text = if chunk.is_filename_chunk() { String::new() } else { chunk.text.clone() };

    SearchHit {
        document_id: chunk.document_id,
        chunk_index: chunk.chunk_index,
        text,
        final_score,
        similarity,
        match_type,
        semantic_context: SemanticContext {
            why_relevant,
            matched_concepts,
            search_strategy,
            boost_applied,
            keyword_matches,
        },
    }
}

fn best_similarity_per_document<'a>(
    hits: impl Iterator<Item = &'a VectorHit>,
) -> std::collections::HashMap<String, f32> {
    let mut out = std::collections::HashMap::new();
    for hit in hits {
        let entry = out.entry(hit.chunk.document_id.clone()).or_insert(hit.similarity);
        if hit.similarity > *entry {
            *entry = hit.similarity;
        }
    }
    out
}

fn matched_poor_tokenizers(chunk: &Chunk, terms: &[String]) -> Vec<String> {
    let haystack = chunk.text.to_lowercase();
    terms
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .cloned()
        .collect()
}

/// Query terms likely to be mis-tokenized by a subword embedding model:
/// ALL_CAPS acronyms, kebab-case, CamelCase, snake_case, and alphanumeric
/// identifiers (e.g. `v2`, `e5`). These terms get a dedicated keyword-scan
/// pass since vector similarity alone under-weights them.
fn poor_tokenizer_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|term| is_poor_tokenizer(term))
        .map(|t| t.to_lowercase())
        .collect()
}

fn is_poor_tokenizer(term: &str) -> bool {
    if term.len() <= 3 {
        return false;
    }
    let letters: Vec<char> = term.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 2 {
        return false;
    }
    let all_caps = letters.iter().all(|c| c.is_uppercase());
    let kebab = term.contains('-') && term.chars().any(|c| c.is_alphabetic());
    let snake = term.contains('_');
    let camel = {
        let mut seen_lower = false;
        let mut has_hump = false;
        for c in term.chars() {
            if c.is_lowercase() {
                seen_lower = true;
            } else if c.is_uppercase() && seen_lower {
                has_hump = true;
            }
        }
        has_hump
    };
    let alphanumeric_mix = term.chars().any(|c| c.is_ascii_digit()) && term.chars().any(|c| c.is_alphabetic());

    all_caps || kebab || snake || camel || alphanumeric_mix
}

fn looks_like_examples(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("for example") || lowered.contains("e.g.") || lowered.contains("for instance")
}

fn looks_like_data(text: &str) -> bool {
    text.contains('|') || text.contains('%') || text.chars().filter(|c| c.is_ascii_digit()).count() >= 4
}

/// Reduces an absolute (or already-relative) path to one relative to
/// `root`, for use as a [`Storage`] path-prefix key.
fn relative_to_root(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_all_caps_and_snake_case() {
        assert!(is_poor_tokenizer("NASA"));
        assert!(is_poor_tokenizer("snake_case"));
        assert!(is_poor_tokenizer("kebab-case"));
        assert!(is_poor_tokenizer("CamelCase"));
        assert!(is_poor_tokenizer("e5-large"));
        assert!(!is_poor_tokenizer("e5"));
        assert!(!is_poor_tokenizer("ordinary"));
    }

    #[test]
    fn relative_to_root_strips_prefix() {
        let root = Path::new("/folders/docs");
        assert_eq!(
            relative_to_root(root, Path::new("/folders/docs/sub")),
            PathBuf::from("sub")
        );
    }

    #[test]
    fn looks_like_data_detects_numeric_density() {
        assert!(looks_like_data("revenue grew 12.4% to $1,234,000"));
        assert!(!looks_like_data("a short sentence with no numbers"));
    }
}
