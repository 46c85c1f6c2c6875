//! Error types and result handling for hondana operations.
//!
//! Every fallible operation returns a [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Transport**: connection failures and unsuccessful HTTP statuses
//!   ([`Error::Network`], [`Error::Source`])
//! - **Cancellation**: an operation that was superseded or aborted
//!   ([`Error::Cancelled`]). Callers treat it as a no-op, never as a failure.
//! - **Decoding**: a response that did not match the expected shape
//!   ([`Error::Decode`], [`Error::Json`])
//! - **Persistence**: local store reads and writes ([`Error::Persistence`],
//!   [`Error::Io`])
//! - **Validation**: rejected edits and malformed values ([`Error::Validation`])
//!
//! # Examples
//!
//! ```rust
//! use hondana::Error;
//!
//! fn describe(error: &Error) -> &'static str {
//!     if error.is_cancellation() {
//!         "ignored"
//!     } else if error.is_decoding() {
//!         "stop paginating"
//!     } else {
//!         "show to the user"
//!     }
//! }
//!
//! assert_eq!(describe(&Error::Cancelled), "ignored");
//! assert_eq!(describe(&Error::decode("missing items")), "stop paginating");
//! assert_eq!(describe(&Error::persistence("disk full")), "show to the user");
//! ```

use thiserror::Error;

/// Type alias for Results with hondana errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all hondana operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection-level failures from the HTTP client.
    ///
    /// Body decode failures reported by reqwest are converted into
    /// [`Error::Decode`] instead.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// The backend answered with an unsuccessful status.
    ///
    /// * `src` - The endpoint that failed
    /// * `message` - Status line or backend message
    #[error("Source error [{src}]: {message}")]
    Source { src: String, message: String },

    /// The operation was superseded or aborted before it finished.
    #[error("Operation cancelled")]
    Cancelled,

    /// A response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A local store could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// File system errors from file-backed stores.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An edit or value was rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::validation("reading volume 7 is not owned");
    /// assert!(error.to_string().contains("volume 7"));
    /// ```
    #[error("Validation error: {0}")]
    Validation(String),

    /// A requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error messages.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Creates an endpoint-specific error with the endpoint and message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::source("list/bestMangas", "HTTP 503 Service Unavailable");
    /// assert!(error.to_string().contains("503"));
    /// ```
    pub fn source(src: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            src: src.into(),
            message: msg.into(),
        }
    }

    /// Creates a persistence error with the given message.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Returns `true` for errors that mean "abandoned", not "failed".
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Returns `true` when the response could never be decoded, so asking
    /// for the same page again would fail the same way.
    pub fn is_decoding(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::Json(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Network(e)
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_cancelled() {
            Error::Cancelled
        } else {
            Error::Other(format!("Task failed: {}", e))
        }
    }
}
