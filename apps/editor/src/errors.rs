use thiserror::Error;

/// Editor-core error type, shared by the document store, the autosave
/// scheduler, and the remote service clients.
///
/// `InvalidPath` and `Validation` are programmer errors and must not be
/// swallowed; network errors are caught at the call site and turned into
/// non-fatal status signals.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
