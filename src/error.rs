//! Error types for the mistral-ocr-mcp library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`McpOcrError`] — **Fatal**: the server cannot start or keep running
//!   (bad configuration, HTTP client construction failed, stdio broke).
//!   Returned as `Err(McpOcrError)` from constructors and the server loop.
//!
//! * [`StageError`] — **Non-fatal**: one remote stage of one OCR invocation
//!   failed. It never escapes a pipeline; [`crate::run`] folds it into a
//!   [`crate::outcome::PipelineOutcome`] that is rendered back to the host
//!   as ordinary tool output.

use thiserror::Error;

/// All fatal errors returned by the mistral-ocr-mcp library.
#[derive(Debug, Error)]
pub enum McpOcrError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The shared HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Reading requests from stdin or writing responses to stdout failed.
    #[error("stdio transport error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure inside a single pipeline stage.
///
/// `Http` carries the remote response verbatim; every other variant is a
/// non-HTTP failure rendered through its `Display` text.
#[derive(Debug, Error)]
pub enum StageError {
    /// The remote endpoint answered with a non-2xx status.
    #[error("{status} {status_text} - {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The local file could not be opened or read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The request never produced a response (DNS, TLS, connection reset,
    /// timeout), or its body could not be read. Rendered with its causes,
    /// since reqwest's own message omits them.
    #[error("{}", source_chain(.0))]
    Transport(#[from] reqwest::Error),

    /// A 2xx response whose body did not have the expected shape.
    #[error("{0}")]
    Decode(String),
}

impl StageError {
    /// Build an [`StageError::Http`] from a status code and the raw body.
    ///
    /// The status text is the canonical reason phrase for the code, or empty
    /// for non-standard codes.
    pub fn http(status: reqwest::StatusCode, body: impl Into<String>) -> Self {
        StageError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.into(),
        }
    }
}

/// `err` followed by each of its causes, joined with `: `.
///
/// A cause whose text already appears in the message is skipped.
pub fn source_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
