//! Error types for the restaurant Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the restaurant Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid input, or a business rule violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation was refused; the cause is reported alongside the message
    #[error("{message}: {cause}")]
    Rejected { message: String, cause: String },

    /// Identity provider rejected the call
    #[error("Identity provider error: {0}")]
    Identity(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// A concurrent write won the race
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A backing service failed while serving the request
    #[error("{message}: {cause}")]
    Unavailable { message: String, cause: String },

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// DynamoDB item conversion error
    #[error("Item conversion error: {0}")]
    Item(#[from] serde_dynamo::Error),

    /// Stored data violates an invariant and cannot be interpreted
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap any failure as a 400 carrying its cause.
    pub fn rejected(message: impl Into<String>, cause: impl ToString) -> Self {
        Error::Rejected {
            message: message.into(),
            cause: cause.to_string(),
        }
    }

    /// Wrap any failure as a 500 carrying its cause.
    pub fn unavailable(message: impl Into<String>, cause: impl ToString) -> Self {
        Error::Unavailable {
            message: message.into(),
            cause: cause.to_string(),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::Rejected { .. } | Error::Identity(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// Human-readable message placed in the `message` field of error bodies.
    pub fn message(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::Identity(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg) => msg.clone(),
            Error::Rejected { message, .. } | Error::Unavailable { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Underlying cause, placed in the `error` field of error bodies.
    pub fn cause(&self) -> Option<&str> {
        match self {
            Error::Rejected { cause, .. } | Error::Unavailable { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Fatal errors are not turned into responses; they fail the invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::CorruptData(_))
    }
}
