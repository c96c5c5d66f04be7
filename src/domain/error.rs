//! Error handling types
//!
//! One variant per pipeline stage failure kind, plus the ambient
//! infrastructure errors (I/O, config, cache). Stage failures are recorded
//! against documents/chunks as [`crate::domain::types::FailureRecord`]s
//! rather than aborting the whole pipeline; these variants are what
//! individual stage calls return before they get recorded.

use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the indexing and retrieval engine.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A file extension has no registered parser.
    #[error("unsupported format: {extension}")]
    UnsupportedFormat {
        /// The offending extension, e.g. `"pdf"`.
        extension: String,
    },

    /// A NUL byte was found in the first kilobyte of a file that was not
    /// dispatched to a binary-aware parser.
    #[error("skipped binary file: {path}")]
    SkippedBinary {
        /// The path that was skipped.
        path: String,
    },

    /// The Parser Dispatcher failed to extract text for a document.
    #[error("parse failed for {path}: {message}")]
    ParseFailed {
        /// The path that failed to parse.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// The Chunk Semantic Extractor failed to produce semantics for a chunk.
    #[error("chunk semantic extraction failed for {document_id}[{chunk_index}]: {message}")]
    ChunkSemanticFailed {
        /// Owning document id.
        document_id: String,
        /// Chunk index within the document.
        chunk_index: i64,
        /// Description of the failure.
        message: String,
    },

    /// The Embedding Worker Pool failed to embed a batch after retries.
    #[error("embedding failed: {message}")]
    EmbeddingFailed {
        /// Description of the failure.
        message: String,
    },

    /// A document's coverage or phrase richness fell below the quality
    /// floor after all retries; the previous committed version, if any,
    /// remains authoritative.
    #[error("quality below floor for {document_id}: {reasons:?}")]
    QualityBelowFloor {
        /// The document that failed the quality floor.
        document_id: String,
        /// Human-readable reasons (e.g. `"coverage 0.70 < 0.80"`).
        reasons: Vec<String>,
    },

    /// Storage I/O failed after retries; the document transaction aborted.
    #[error("storage I/O error: {message}")]
    StorageIo {
        /// Description of the failure.
        message: String,
    },

    /// Cooperative cancellation was observed. Not a failure: callers should
    /// treat this as "stop, leave no partial state" rather than log an error.
    #[error("operation cancelled")]
    Cancelled,

    /// A search query was shorter than the minimum accepted length.
    #[error("query too short: minimum {min} characters")]
    QueryTooShort {
        /// The configured minimum length.
        min: usize,
    },

    /// A search query exceeded the maximum accepted length.
    #[error("query too long: maximum {max} characters")]
    QueryTooLong {
        /// The configured maximum length.
        max: usize,
    },

    /// Requested resource not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Invalid argument provided to a function.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Configuration-related error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Cache operation error.
    #[error("cache error: {message}")]
    Cache {
        /// Description of the cache error.
        message: String,
    },

    /// Internal system error that does not fit another variant.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Create an unsupported-format error.
    pub fn unsupported_format<S: Into<String>>(extension: S) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create a skipped-binary error.
    pub fn skipped_binary<S: Into<String>>(path: S) -> Self {
        Self::SkippedBinary { path: path.into() }
    }

    /// Create a parse-failed error.
    pub fn parse_failed<S: Into<String>, M: Into<String>>(path: S, message: M) -> Self {
        Self::ParseFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a chunk-semantic-failed error.
    pub fn chunk_semantic_failed<S: Into<String>, M: Into<String>>(
        document_id: S,
        chunk_index: i64,
        message: M,
    ) -> Self {
        Self::ChunkSemanticFailed {
            document_id: document_id.into(),
            chunk_index,
            message: message.into(),
        }
    }

    /// Create an embedding-failed error.
    pub fn embedding_failed<S: Into<String>>(message: S) -> Self {
        Self::EmbeddingFailed {
            message: message.into(),
        }
    }

    /// Create a quality-below-floor error.
    pub fn quality_below_floor<S: Into<String>>(document_id: S, reasons: Vec<String>) -> Self {
        Self::QualityBelowFloor {
            document_id: document_id.into(),
            reasons,
        }
    }

    /// Create a storage-io error.
    pub fn storage_io<S: Into<String>>(message: S) -> Self {
        Self::StorageIo {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a cache error.
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True if this error represents cooperative cancellation rather than a
    /// genuine failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Internal {
            message: s.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Internal { message: s }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}
