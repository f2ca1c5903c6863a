//! Error types for quarry.

/// Boxed error produced by an injected capability (embedding or term
/// scoring). Backends keep their own error types; the retriever wraps
/// them in [`Error::Embedding`] or [`Error::TermScoring`].
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during chunking, retrieval, or pipeline runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Strategy name not recognized by [`Strategy::from_str`](crate::Strategy).
    #[error("unknown chunking strategy: {name} (known: {known})")]
    UnknownStrategy {
        /// The name that failed to parse.
        name: String,
        /// Comma-separated list of recognized strategy names.
        known: &'static str,
    },

    /// Window or chunk size of zero.
    #[error("invalid window size: {0} (must be > 0)")]
    InvalidWindow(usize),

    /// Overlap must leave a positive step between windows.
    #[error("overlap {overlap} must be less than window size {window}")]
    WindowOverlap {
        /// The window size.
        window: usize,
        /// The overlap that reached or exceeded it.
        overlap: usize,
    },

    /// Attempted to merge chunks from two different sources.
    #[error("cannot merge chunks from different sources: {left:?} vs {right:?}")]
    SourceMismatch {
        /// Source of the accumulating chunk.
        left: String,
        /// Source of the incoming chunk.
        right: String,
    },

    /// The embedding capability failed.
    #[error("embedding capability failed")]
    Embedding(#[source] CapabilityError),

    /// The term-importance capability failed.
    #[error("term-importance capability failed")]
    TermScoring(#[source] CapabilityError),

    /// The embedding capability returned the wrong number of vectors.
    #[error("embedding capability returned {actual} vectors for {expected} texts")]
    EmbeddingCount {
        /// Number of texts submitted.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },

    /// The embedding capability returned vectors of differing lengths.
    #[error("embedding dimensions differ: expected {expected}, got {actual}")]
    EmbeddingDimensions {
        /// Dimension of the first vector seen.
        expected: usize,
        /// The differing dimension.
        actual: usize,
    },

    /// Document deserialization failed.
    #[error("malformed document")]
    Document(#[from] serde_json::Error),

    /// The pipeline worker pool could not be built.
    #[error("worker pool: {0}")]
    WorkerPool(String),
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, Error>;
