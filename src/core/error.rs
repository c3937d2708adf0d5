use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the workflow operations.
///
/// Nothing here is recovered locally; every variant travels back to the
/// invoking host with its description intact.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend could not be reached (no response was received).
    #[error("Connection error: {0}")]
    Connection(String),
    /// The backend answered with a non-success status, a body that is not
    /// JSON, or a payload reporting a failure.
    #[error("Backend error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Backend {
        status: Option<u16>,
        message: String,
    },
    /// A successful response did not carry the key the operation reads.
    #[error("Schema error: response is missing '{key}'")]
    Schema { key: String },
    /// A key is present but its value does not have the expected shape.
    #[error("Schema error: '{key}' has an unexpected shape: {reason}")]
    Shape { key: String, reason: String },
}

impl Error {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn schema(key: impl Into<String>) -> Self {
        Error::Schema { key: key.into() }
    }

    pub fn shape(key: impl Into<String>, reason: impl ToString) -> Self {
        Error::Shape {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Connection(_) => "connection",
            Error::Backend { .. } => "backend",
            Error::Schema { .. } | Error::Shape { .. } => "schema",
        }
    }
}
