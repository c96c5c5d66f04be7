//! Domain-level constants
//!
//! Tuned values referenced throughout the pipeline and retrieval engine.
//! Centralized here so stage implementations agree on the same numbers.

use std::time::Duration;

/// Minimum target chunk size, in tokens.
pub const CHUNK_TOKENS_MIN: usize = 200;
/// Maximum target chunk size, in tokens.
pub const CHUNK_TOKENS_MAX: usize = 500;
/// Overlap between consecutive chunks, as a fraction of target size.
pub const CHUNK_OVERLAP_RATIO: f32 = 0.10;

/// Minimum coverage (fraction of chunks with successful semantics) for a
/// document to be committed as `ok`.
pub const QUALITY_FLOOR_COVERAGE: f32 = 0.8;
/// Minimum phrase richness for a document to be committed as `ok`.
pub const QUALITY_FLOOR_PHRASE_RICHNESS: f32 = 0.6;
/// Chunk semantic extraction confidence below this is recorded as failed.
pub const CHUNK_CONFIDENCE_FLOOR: f32 = 0.3;

/// Reserved chunk index denoting the synthetic filename chunk.
pub const FILENAME_CHUNK_INDEX: i64 = -1;

/// Default number of files parsed concurrently by the orchestrator.
pub const DEFAULT_FILE_CONCURRENCY: usize = 4;
/// Default number of long-lived embedding workers.
pub const DEFAULT_EMBEDDING_WORKERS: usize = 2;
/// Default intra-worker thread count for the embedding pool.
pub const DEFAULT_EMBEDDING_THREADS_PER_WORKER: usize = 2;
/// Default embedding batch size; ONNX-style local models measurably prefer
/// batch size 1 over larger batches on this workload.
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 1;

/// Maximum retry attempts for embedding and storage I/O.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
/// Base delay for exponential backoff between retries.
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Per-stage timeouts (§5).
pub const TIMEOUT_PARSE: Duration = Duration::from_secs(30);
/// Chunking stage timeout.
pub const TIMEOUT_CHUNK: Duration = Duration::from_secs(5);
/// Chunk semantic extraction stage timeout.
pub const TIMEOUT_CHUNK_SEMANTIC: Duration = Duration::from_secs(5);
/// Embedding batch timeout.
pub const TIMEOUT_EMBEDDING_BATCH: Duration = Duration::from_secs(10);
/// Document aggregation timeout.
pub const TIMEOUT_AGGREGATION: Duration = Duration::from_secs(1);
/// Storage commit timeout.
pub const TIMEOUT_COMMIT: Duration = Duration::from_secs(5);

/// Default debounce window for the file watcher.
pub const WATCHER_DEBOUNCE: Duration = Duration::from_secs(1);

/// Filename-boost similarity floor for `filename_exact`.
pub const FILENAME_BOOST_EXACT_THRESHOLD: f32 = 0.9;
/// Filename-boost similarity floor for `filename_partial`.
pub const FILENAME_BOOST_PARTIAL_THRESHOLD: f32 = 0.7;
/// Weight applied to the (inflated) filename similarity in `filename_exact` fusion.
pub const FILENAME_EXACT_WEIGHT: f32 = 0.4;
/// Weight applied to content score in `filename_exact` fusion.
pub const FILENAME_EXACT_CONTENT_WEIGHT: f32 = 0.6;
/// Inflation multiplier applied to similarity before fusion in `filename_exact`.
pub const FILENAME_EXACT_SIMILARITY_GAIN: f32 = 1.5;
/// Weight applied to similarity in `filename_partial` fusion.
pub const FILENAME_PARTIAL_WEIGHT: f32 = 0.3;
/// Weight applied to content score in `filename_partial` fusion.
pub const FILENAME_PARTIAL_CONTENT_WEIGHT: f32 = 0.7;

/// Multiplier applied to relevance when a poor-tokenizing query term is
/// matched by keyword scan in a chunk already present in the semantic top-K.
pub const HYBRID_BOOST_MULTIPLIER: f32 = 1.3;
/// Fixed score assigned to pure keyword hits absent from the semantic set.
pub const KEYWORD_ONLY_SCORE: f32 = 0.75;
/// Minimum query length, in characters.
pub const QUERY_MIN_LEN: usize = 2;
/// Maximum query length, in characters.
pub const QUERY_MAX_LEN: usize = 500;

/// Minimum number of merged topics kept per document summary.
pub const SUMMARY_TOPICS_MIN: usize = 15;
/// Maximum number of merged topics kept per document summary.
pub const SUMMARY_TOPICS_MAX: usize = 20;
/// Minimum number of merged key phrases kept per document summary.
pub const SUMMARY_PHRASES_MIN: usize = 20;
/// Maximum number of merged key phrases kept per document summary.
pub const SUMMARY_PHRASES_MAX: usize = 30;

/// Sample cap for pairwise cosine coherence on large documents.
pub const COHERENCE_SAMPLE_CAP: usize = 64;

/// Byte threshold above which `Fingerprint & Change Detector` falls back to a
/// partial hash (size, mtime, first/last N bytes) instead of streaming the
/// whole file.
pub const FINGERPRINT_FULL_HASH_MAX_BYTES: u64 = 8 * 1024 * 1024;
/// Number of leading/trailing bytes sampled by the partial hash fallback.
pub const FINGERPRINT_PARTIAL_SAMPLE_BYTES: usize = 64 * 1024;
/// Bytes inspected when sniffing for binary content (NUL byte probe).
pub const BINARY_SNIFF_WINDOW: usize = 1024;
