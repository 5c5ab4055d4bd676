// Library error taxonomy.
//
// The binary and the thin wrappers (config loading, export, model download)
// use anyhow; everything the core pipeline can fail with is listed here so
// callers can tell a network outage from a configuration mistake.

use thiserror::Error;

/// Result type alias for core pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the retrieval, parsing and annotation pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// An abstract inverted index carried a position that cannot be decoded.
    #[error("Malformed inverted index: word {word:?} {detail}")]
    MalformedIndex { word: String, detail: String },

    /// Retry budget exhausted against a transient upstream failure.
    #[error("OpenAlex unavailable after {attempts} attempts: {last_error}")]
    UpstreamUnavailable { attempts: u32, last_error: String },

    /// Upstream returned a status that is not worth retrying.
    #[error("OpenAlex returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Unsupported NER model name in the configuration.
    #[error("Unsupported entity model {0:?} (expected \"small\" or \"large\")")]
    InvalidModel(String),

    /// Configuration or query construction error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not deserialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Translation service rejected or mangled a request.
    #[error("Translation failed: {0}")]
    Translation(String),

    /// Recognition model failed to load or run.
    #[error("Model error: {0}")]
    Model(String),
}
