/// Shared error type used across all chat-orchestrator crates.
///
/// Variants map onto the seven error classes of the orchestrator's error
/// taxonomy (ValidationError, AuthoritativeNotFound, AuthoritativeError,
/// RetrievalError, GenerativeError, PersistenceDegraded,
/// DisambiguationStoreError) plus the ambient transport-level variants
/// every collaborator crate converts its own failures into at its boundary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("config: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    Validation(String),

    /// An authoritative source (directory, fee, location) replied with no
    /// matching rule or record.
    #[error("not found: {0}")]
    AuthoritativeNotFound(String),

    /// An authoritative source returned an error or timed out after the
    /// permitted retry.
    #[error("authoritative source {source_name}: {message}")]
    AuthoritativeError {
        source_name: String,
        message: String,
    },

    /// Retrieval service or cache error, after the permitted retry.
    #[error("retrieval: {0}")]
    Retrieval(String),

    /// Generative backend failure, mid-stream or at request time.
    #[error("generative: {0}")]
    Generative(String),

    /// Session memory store is unavailable; caller should use the
    /// in-memory fallback.
    #[error("memory store degraded: {0}")]
    PersistenceDegraded(String),

    /// Disambiguation store read/write failure; caller should use the
    /// in-process fallback.
    #[error("disambiguation store: {0}")]
    DisambiguationStore(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
