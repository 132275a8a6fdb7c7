use thiserror::Error;

/// Convenience result type for profiling operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Error type returned by profiling functions.
///
/// This is a single error enum shared across the sanitizer, the execution
/// gateway, and source loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// The identifier was rejected by [`crate::sanitize::sanitize`].
    ///
    /// Raised before any query is sent to the engine; not retryable.
    #[error("invalid identifier '{name}': {message}")]
    InvalidIdentifier { name: String, message: String },

    /// The engine reported a failure while executing a query.
    ///
    /// Carries the backend's diagnostic message verbatim. Queries are not
    /// retried on failure.
    #[error("engine error: {message}")]
    Engine { message: String },

    /// A source file could not be registered as a table (unknown format,
    /// non-UTF-8 path, ...).
    #[error("unsupported source: {message}")]
    UnsupportedSource { message: String },
}
