//! Core domain types: folders, files, documents, chunks, and their derived
//! semantic summaries.
//!
//! These are plain value objects. They carry validation for the fields that
//! originate at a system boundary (configuration, ingestion); fields that are
//! always derived internally are left unvalidated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use validator::Validate;

/// An embedding vector together with the model that produced it.
///
/// # Example
///
/// ```rust
/// use folder_semantic_index::domain::types::Embedding;
///
/// let embedding = Embedding {
///     vector: vec![0.1, 0.2, 0.3],
///     model: "e5-small-v2".to_string(),
///     dimensions: 3,
/// };
/// assert_eq!(embedding.dimensions, embedding.vector.len());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, Validate)]
pub struct Embedding {
    /// The embedding vector values.
    #[validate(length(min = 1, message = "Embedding vector cannot be empty"))]
    pub vector: Vec<f32>,
    /// Name of the model that produced this embedding.
    #[validate(length(min = 1, message = "Model name cannot be empty"))]
    pub model: String,
    /// Dimensionality of the vector.
    #[validate(range(min = 1, message = "Dimensions must be positive"))]
    pub dimensions: usize,
}

impl Embedding {
    /// L2-normalizes the vector in place. No-op on a zero vector.
    pub fn normalize(&mut self) {
        let norm = self.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut self.vector {
                *v /= norm;
            }
        }
    }

    /// Cosine similarity against another embedding. Assumes both vectors are
    /// the same dimensionality; returns 0.0 otherwise.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.vector.len() != other.vector.len() {
            return 0.0;
        }
        let dot: f32 = self
            .vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a * b)
            .sum();
        let na = self.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        let nb = other.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if na <= f32::EPSILON || nb <= f32::EPSILON {
            return 0.0;
        }
        dot / (na * nb)
    }
}

/// Prefix strings applied before embedding, when a model requires them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PrefixFormat {
    /// Prefix prepended to retrieval queries, e.g. `"query: "`.
    pub query: String,
    /// Prefix prepended to indexed passages, e.g. `"passage: "`.
    pub passage: String,
}

/// Strategy used by the Chunk Semantic Extractor, selected by model capability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// Multi-word key phrases and domain-specific topics with confidence scores.
    Rich,
    /// Embedding-cosine / Jaccard grouping, used when the model offers no
    /// richer linguistic signal.
    SimilarityOnly,
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rich => write!(f, "rich"),
            Self::SimilarityOnly => write!(f, "similarity_only"),
        }
    }
}

/// Model capability descriptor, consumed from the embedding service boundary.
///
/// Drives both the Embedding Worker Pool's prefix/normalization transforms
/// and the Chunk Semantic Extractor's strategy selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct ModelCapabilities {
    /// Identifier of the embedding model, e.g. `"intfloat/e5-small-v2"`.
    #[validate(length(min = 1, message = "model_id cannot be empty"))]
    pub model_id: String,
    /// Whether the model requires query/passage prefixes before embedding.
    pub requires_prefix: bool,
    /// The query/passage prefixes, meaningful only if `requires_prefix`.
    pub prefix_format: PrefixFormat,
    /// Whether the model requires L2 normalization of the output vector.
    pub requires_normalization: bool,
    /// The chunk semantic extraction strategy this model supports.
    pub extraction_strategy: ExtractionStrategy,
}

/// A watched folder: the root unit of indexing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    /// Absolute path to the folder root. This is the folder's identity.
    pub path: PathBuf,
    /// Capabilities of the embedding model configured for this folder.
    pub model_capabilities: ModelCapabilities,
    /// When this folder was first indexed.
    pub created_at: DateTime<Utc>,
}

/// Parse status of a [`Document`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParseStatus {
    /// Parsed and committed successfully.
    Ok,
    /// Parsing failed outright (unsupported format, binary, corrupt).
    Failed,
    /// Parsing succeeded but was intentionally skipped (e.g. binary sniff).
    Skipped,
    /// Chunk semantics extracted below the quality floor; document committed
    /// with a quality marker rather than silently substituted content.
    FailedQuality,
}

impl std::fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
            Self::FailedQuality => write!(f, "failed_quality"),
        }
    }
}

/// A file discovered within a watched folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    /// Path relative to the folder root.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last-modified time as reported by the filesystem.
    pub mtime: DateTime<Utc>,
    /// Content hash; the content-address key for this file's bytes.
    pub hash: u64,
    /// Lowercased file extension, if any.
    pub extension: Option<String>,
}

/// Structural hint returned alongside parsed text: a heading, table, slide,
/// or other structurally-significant span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuralHint {
    /// The kind of structural element, e.g. `"heading"`, `"table"`.
    pub kind: String,
    /// Human-readable label, e.g. the heading text.
    pub label: String,
    /// Byte span within the parsed text this hint covers.
    pub span: (usize, usize),
    /// Heading level, when `kind == "heading"` (1 = top level).
    pub level: Option<u8>,
}

/// A contiguous, sentence-respecting slice of a document's text, or the
/// synthetic filename chunk at index [`crate::domain::constants::FILENAME_CHUNK_INDEX`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Identity: the owning document.
    pub document_id: String,
    /// Identity: position within the document, or the filename sentinel.
    pub chunk_index: i64,
    /// Chunk text. For the filename chunk this is the tokenized filename
    /// (e.g. `"budget q4 2025 v2"`), not a document text span.
    pub text: String,
    /// Byte span within the document's parsed text. `None` for the filename chunk.
    pub span: Option<(usize, usize)>,
    /// Nearest preceding section heading, if any.
    pub heading: Option<String>,
    /// Topics, ordered by score, highest first.
    pub topics: Vec<ScoredTerm>,
    /// Key phrases, ordered by score, highest first.
    pub key_phrases: Vec<ScoredTerm>,
    /// Readability score, normalized 0-100.
    pub readability: Option<f32>,
    /// Embedding vector for this chunk, if extraction succeeded.
    pub embedding: Option<Embedding>,
    /// Which extraction path produced this chunk's semantics.
    pub extraction_method: ExtractionMethod,
    /// Confidence in [0, 1] that the extracted semantics are correct.
    pub extraction_confidence: f32,
}

impl Chunk {
    /// True for the synthetic filename chunk.
    pub fn is_filename_chunk(&self) -> bool {
        self.chunk_index == crate::domain::constants::FILENAME_CHUNK_INDEX
    }
}

/// Tag recording which extraction path produced a chunk's semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Rich linguistic extraction.
    Rich,
    /// Similarity-only extraction.
    SimilarityOnly,
    /// Semantics derived purely by aggregation (reserved for the filename chunk).
    AggregationOnly,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rich => write!(f, "rich"),
            Self::SimilarityOnly => write!(f, "similarity_only"),
            Self::AggregationOnly => write!(f, "aggregation_only"),
        }
    }
}

/// A term (topic or key phrase) with an associated relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredTerm {
    /// The term text.
    pub term: String,
    /// Relevance score, higher is more relevant. Scale is extractor-local.
    pub score: f32,
}

/// Derived, document-level roll-up of its chunks' semantics. Never edited in
/// place; always re-derived from current chunks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSemanticSummary {
    /// Top topics, ranked highest first.
    pub top_topics: Vec<ScoredTerm>,
    /// Top key phrases, ranked highest first.
    pub top_key_phrases: Vec<ScoredTerm>,
    /// Mean readability across chunks with semantics.
    pub avg_readability: f32,
    /// Shannon entropy of topic frequencies.
    pub topic_diversity: f32,
    /// Fraction of key phrases containing more than one word.
    pub phrase_richness: f32,
    /// Mean pairwise cosine similarity between chunk embeddings (sampled for
    /// large documents).
    pub semantic_coherence: f32,
    /// Which extraction path predominantly produced this summary.
    pub extraction_method: ExtractionMethod,
    /// Fraction of chunks with successful semantic extraction.
    pub coverage: f32,
    /// Weighted mean confidence, weighted by chunk length.
    pub confidence: f32,
    /// Wall-clock time spent aggregating, in milliseconds.
    pub processing_time_ms: u64,
    /// The single highest-ranked topic.
    pub primary_theme: Option<String>,
}

/// A document within a folder: the unit of parsing, chunking, and commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable id derived from `(folder, path)`.
    pub id: String,
    /// Path relative to the folder root.
    pub path: PathBuf,
    /// Content hash of the source file at the time of this version.
    pub content_hash: u64,
    /// Name of the parser that produced this document's text.
    pub parser: String,
    /// Parse / commit status.
    pub status: ParseStatus,
    /// Derived semantic summary; `None` until successfully aggregated.
    pub semantic_summary: Option<DocumentSemanticSummary>,
    /// When this version was last processed.
    pub last_processed_at: DateTime<Utc>,
}

/// Stage at which a [`FailureRecord`] was produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FailureScope {
    /// Parser Dispatcher stage.
    Parse,
    /// Chunk Semantic Extractor stage.
    ChunkSemantic,
    /// Embedding Worker Pool stage.
    Embedding,
    /// Document Aggregator stage.
    Aggregate,
    /// Storage & Index stage.
    Storage,
}

impl std::fmt::Display for FailureScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::ChunkSemantic => write!(f, "chunk_semantic"),
            Self::Embedding => write!(f, "embedding"),
            Self::Aggregate => write!(f, "aggregate"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// A recorded pipeline failure. Written whenever a stage fails; cleared on
/// successful retry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureRecord {
    /// Stage at which the failure occurred.
    pub scope: FailureScope,
    /// Document this failure pertains to.
    pub document_id: String,
    /// Chunk index, if the failure is chunk-scoped.
    pub chunk_index: Option<i64>,
    /// Human-readable error message.
    pub message: String,
    /// Number of attempts made so far.
    pub attempts: u32,
    /// When the failure was first recorded.
    pub first_seen_at: DateTime<Utc>,
    /// When the failure was most recently observed.
    pub last_seen_at: DateTime<Utc>,
}

/// Tally of a single reindex pass, produced by [`crate::domain::ports::admin::FolderAdmin::reindex`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReindexSummary {
    /// Documents committed with `ok` status.
    pub indexed: usize,
    /// Documents committed with `failed_quality` status.
    pub failed_quality: usize,
    /// Documents whose parse stage failed outright.
    pub parse_failed: usize,
    /// Documents removed because their source file disappeared.
    pub deleted: usize,
}

/// A reindexing/status snapshot for a folder, produced by the control surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FolderStatus {
    /// Number of documents successfully indexed.
    pub indexed: usize,
    /// Number of documents queued for processing.
    pub pending: usize,
    /// Number of documents in a failed state.
    pub failed: usize,
    /// When the folder was last fully processed, if ever.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Quality indicators surfaced at the retrieval boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityIndicators {
    /// Confidence that extraction captured the document's content.
    pub extraction_confidence: f32,
    /// Fraction of key phrases that are multi-word.
    pub phrase_richness: f32,
    /// Fraction of topics considered domain-specific (rich strategy only).
    pub topic_specificity: f32,
}

/// Semantic preview of a folder's direct-child documents, used by
/// `list_folders` and `explore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SemanticPreview {
    /// Topics ranked by raw frequency across direct-child documents.
    pub top_topics: Vec<String>,
    /// Mean readability across direct-child documents.
    pub avg_readability: f32,
    /// Aggregated phrase/topic quality indicators.
    pub quality: PreviewQuality,
}

/// Aggregate quality indicators shown in a folder's [`SemanticPreview`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PreviewQuality {
    /// Mean phrase richness across direct-child documents.
    pub phrase_diversity: f32,
    /// Mean topic specificity across direct-child documents.
    pub topic_specificity: f32,
}

/// A single entry returned by `list_folders`/`explore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderEntry {
    /// Folder name (final path component).
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Number of documents directly within this folder.
    pub document_count: usize,
    /// Aggregated semantic preview.
    pub semantic_preview: SemanticPreview,
}

/// A breadcrumb entry returned by `explore`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Breadcrumb {
    /// Folder name at this level of the path.
    pub name: String,
    /// Absolute path at this level.
    pub path: PathBuf,
    /// A single aggregated topic hint for this level.
    pub topic_hint: Option<String>,
}

/// A document summary entry returned by `list_documents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    /// Document id.
    pub id: String,
    /// Document file name.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// Top topic; the document's inferred primary purpose.
    pub primary_purpose: Option<String>,
    /// Top key concepts (key phrases), ranked.
    pub key_concepts: Vec<String>,
    /// Top topics, ranked.
    pub main_topics: Vec<String>,
    /// Document type inferred from structural hints (e.g. `"markdown"`, `"plain_text"`).
    pub document_type: String,
    /// Mean readability.
    pub readability: f32,
    /// Quality indicators.
    pub quality: QualityIndicators,
}

/// Per-chunk semantics returned in a document outline entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkOutlineSemantics {
    /// Top key phrases of the chunk, used as `main_points`.
    pub main_points: Vec<String>,
    /// Topics of the chunk.
    pub topics: Vec<String>,
    /// Key phrases of the chunk.
    pub key_phrases: Vec<String>,
    /// Whether the chunk text appears to contain worked examples.
    pub has_examples: bool,
    /// Whether the chunk text appears to contain tabular/numeric data.
    pub has_data: bool,
    /// Readability score.
    pub readability: f32,
}

/// An entry in `get_document_outline`'s ordered chunk list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineEntry {
    /// Chunk identity, `"{document_id}:{chunk_index}"`.
    pub chunk_id: String,
    /// Nearest preceding section heading.
    pub heading: Option<String>,
    /// Position within the document.
    pub chunk_index: i64,
    /// Chunk semantics, or `None` if extraction failed for this chunk.
    pub semantics: Option<ChunkOutlineSemantics>,
}

/// How a search hit's final score was composed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchType {
    /// Ordinary semantic vector hit, no filename boost applied.
    Semantic,
    /// Filename chunk hit with similarity >= 0.9.
    FilenameExact,
    /// Filename chunk hit with 0.7 <= similarity < 0.9.
    FilenamePartial,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::FilenameExact => write!(f, "filename_exact"),
            Self::FilenamePartial => write!(f, "filename_partial"),
        }
    }
}

/// Which retrieval path produced a given search hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Hit came purely from vector search.
    Semantic,
    /// Hit was in the semantic top-K and boosted by a keyword match.
    HybridBoosted,
    /// Hit came purely from `keyword_scan`, absent from the semantic top-K.
    KeywordOnly,
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::HybridBoosted => write!(f, "hybrid_boosted"),
            Self::KeywordOnly => write!(f, "keyword_only"),
        }
    }
}

/// Explanation of why a search hit was surfaced and how it was scored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticContext {
    /// Short human-readable reason this hit is relevant.
    pub why_relevant: String,
    /// Concepts (topics/phrases) that matched the query.
    pub matched_concepts: Vec<String>,
    /// Which strategy produced this hit.
    pub search_strategy: SearchStrategy,
    /// Whether any boost (filename or hybrid) was applied.
    pub boost_applied: bool,
    /// Poor-tokenizing terms matched by keyword scan for this hit.
    pub keyword_matches: Vec<String>,
}

/// A single search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Owning document id.
    pub document_id: String,
    /// Matched chunk index (`-1` for the filename chunk).
    pub chunk_index: i64,
    /// Matched chunk text (empty for the filename chunk).
    pub text: String,
    /// Final fused score used for ranking.
    pub final_score: f32,
    /// Raw cosine similarity before any fusion.
    pub similarity: f32,
    /// How the score was composed.
    pub match_type: MatchType,
    /// Explanation of the hit.
    pub semantic_context: SemanticContext,
}

/// Query-level metadata accompanying a set of [`SearchHit`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchInsights {
    /// A short restatement of how the query was interpreted.
    pub query_interpretation: String,
    /// Which model-specific transforms were applied (prefix/normalization).
    pub model_optimization: String,
    /// Poor-tokenizing terms detected in the query.
    pub poor_tokenizers_detected: Vec<String>,
    /// Overall confidence in the result set, in [0, 1].
    pub confidence: f32,
}

/// The full response to a `search` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// Ranked hits, non-increasing by `final_score`.
    pub hits: Vec<SearchHit>,
    /// Query-level insights.
    pub insights: SearchInsights,
}

/// Raw per-folder topic frequency table, keyed by lowercased topic text.
/// Used internally by the Folder Aggregator; exposed for tests.
pub type TopicFrequencies = BTreeMap<String, usize>;
