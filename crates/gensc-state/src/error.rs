/// Errors from world-state gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A composite key component contains a reserved delimiter rune.
    #[error("invalid composite key component {component:?}: {reason}")]
    InvalidCompositeKey { component: String, reason: String },

    /// Keys written to the state must be non-empty.
    #[error("key must not be an empty string")]
    EmptyKey,

    /// The backend does not evaluate rich queries (key-only state database).
    #[error("rich queries are not supported by this state database")]
    RichQueryUnsupported,

    /// The rich query document could not be parsed or uses an unknown operator.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The pagination bookmark was not issued by this backend.
    #[error("invalid bookmark {0:?}")]
    InvalidBookmark(String),

    /// Page size for a paginated query must be positive.
    #[error("invalid page size {0}: must be greater than zero")]
    InvalidPageSize(i32),

    /// A result cursor failed while producing its next entry.
    #[error("iteration error: {0}")]
    Iteration(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from snapshot persistence.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for state operations.
pub type StateResult<T> = Result<T, StateError>;
