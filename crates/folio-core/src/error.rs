//! Error types for folio-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// A required setting is absent (e.g. the backend URL for a command that needs it).
    #[error("missing configuration value: {key}")]
    Missing {
        /// Dotted key of the missing setting.
        key: &'static str,
    },

    /// A setting has a value outside its allowed range.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Dotted key of the offending setting.
        key: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// A configured URL could not be parsed.
    #[error("invalid URL for {key}: {source}")]
    InvalidUrl {
        /// Dotted key of the offending setting.
        key: &'static str,
        /// Underlying parse error.
        source: url::ParseError,
    },
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the hosted backend (REST collections and realtime feed).
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the raw body.
        message: String,
    },

    /// The response body did not match the expected row shape.
    #[error("malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No row matched the given id.
    #[error("no {table} row with id {id}")]
    NotFound {
        /// Table name.
        table: &'static str,
        /// Requested id.
        id: String,
    },

    /// The realtime websocket failed.
    #[error("realtime connection failed: {0}")]
    Realtime(String),
}

/// Result type alias using [`BackendError`].
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors surfaced by data store mutations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Creating a row failed.
    #[error("failed to add {entity}: {source}")]
    Add {
        /// "post" or "project".
        entity: &'static str,
        /// Underlying backend failure.
        source: BackendError,
    },

    /// Updating a row failed.
    #[error("failed to update {entity}: {source}")]
    Update {
        /// "post" or "project".
        entity: &'static str,
        /// Underlying backend failure.
        source: BackendError,
    },

    /// Deleting a row failed.
    #[error("failed to delete {entity}: {source}")]
    Delete {
        /// "post" or "project".
        entity: &'static str,
        /// Underlying backend failure.
        source: BackendError,
    },

    /// Refreshing a collection failed.
    #[error("failed to fetch {table}: {source}")]
    Fetch {
        /// Table name.
        table: &'static str,
        /// Underlying backend failure.
        source: BackendError,
    },
}

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the image bucket.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The file's type is not an accepted image type.
    #[error("unsupported image type: {0}. Use jpeg, png, gif or webp")]
    UnsupportedType(String),

    /// The file exceeds the bucket's size limit.
    #[error("image is {size} bytes (limit: {limit} bytes)")]
    TooLarge {
        /// Size of the rejected file.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Reading the local file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Local path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The storage API rejected the request.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type alias using [`StorageError`].
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors from the admin gate.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An admin-only operation was attempted without logging in.
    #[error("admin login required")]
    Unauthenticated,
}

/// Errors from editor operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditorError {
    /// An AI action was triggered on blank text.
    #[error("Please enter some text first")]
    EmptyText,

    /// Generation was triggered without a title.
    #[error("Please enter a title first")]
    EmptyTitle,

    /// The requested content length is outside 1 to 5.
    #[error("content length must be between 1 and 5, got {0}")]
    InvalidLength(u8),

    /// The AI transform reported a failure.
    #[error("{0}")]
    Ai(String),
}

/// Internal failure kinds of a completion request.
///
/// The public AI surface folds these into [`crate::ai::AiResponse`]; they are
/// kept distinct so the cause can be logged.
#[derive(Error, Debug)]
pub enum AiError {
    /// The endpoint could not be reached.
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint returned a non-success status.
    #[error("completion endpoint returned {0}")]
    Status(u16),

    /// The response carried no choices.
    #[error("completion response had no choices")]
    EmptyChoices,
}

/// Result type alias using [`AiError`].
pub type AiResult<T> = Result<T, AiError>;
