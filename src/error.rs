//! Error types for the Watchtower monitoring service

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Watchtower monitoring service
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document store connection error
    #[error("Document store connection error: {0}")]
    StoreConnection(#[source] reqwest::Error),

    /// Document store request rejected or returned a bad status
    #[error("Document store request failed: {0}")]
    StoreRequest(String),

    /// Document store response parse error
    #[error("Failed to parse document store response: {0}")]
    StoreResponseParse(String),

    /// A stored record did not match the expected shape
    #[error("Malformed record in table {table}: {reason}")]
    MalformedRecord { table: String, reason: String },

    /// Metric gatherer failure
    #[error("Metric collection failed for domain {domain}: {reason}")]
    Collection { domain: String, reason: String },

    /// Notification channel failure
    #[error("Notification via {channel} failed: {reason}")]
    Notification { channel: String, reason: String },

    /// Compliance inspection failure
    #[error("Compliance inspection failed: {0}")]
    Inspection(String),

    /// Unrecognized query API endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
