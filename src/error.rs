use thiserror::Error;

/// Result type for Bravia operations
pub type Result<T> = std::result::Result<T, BraviaError>;

/// Errors that can occur when talking to a Bravia set
#[derive(Error, Debug)]
pub enum BraviaError {
    /// HTTP transport error (connection refused, timeout, DNS failure)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The set answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The response envelope carried an explicit error from the set
    #[error("device error {code}: {message}")]
    Device {
        /// Numeric error code reported by the set
        code: i64,
        /// Error message reported by the set
        message: String,
    },

    /// A remote command name with no entry in the code table
    #[error("unknown remote command: {0}")]
    UnknownCommand(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hardware address that does not parse as six hex octets
    #[error("invalid MAC address: {0}")]
    InvalidMacAddr(String),

    /// Response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
