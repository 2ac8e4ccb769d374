use thiserror::Error;

/// Error taxonomy for the persistence layer.
///
/// Validation errors are raised at the point of offending input; backend
/// failures propagate wrapped and are never swallowed into a false-positive
/// success. A successful query returning zero rows is not an error.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Malformed caller input: wrong shape, empty required string,
    /// unacceptable collection member.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation requires a model, table or connection that was never set.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// A statement execution or connection setup failure, wrapped.
    #[error("backend error: {0}")]
    Backend(String),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("sqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl StrataError {
    /// Shorthand for an [`StrataError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for a [`StrataError::NotConfigured`].
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, StrataError>;
