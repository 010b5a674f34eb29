//! Error types for HTTP bindings.

use podwire_common::error::PodwireError;
use thiserror::Error;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid input or configuration detected before any request was sent.
    #[error(transparent)]
    Common(#[from] PodwireError),

    /// The request could not be sent or its reply could not be read.
    #[error("request to {endpoint} failed: {source}")]
    Connection {
        /// Endpoint URL, without query string.
        endpoint: String,
        /// Transport error.
        source: reqwest::Error,
    },

    /// The service answered with a non-success status code.
    #[error("{endpoint} answered {status}: {message}")]
    Status {
        /// Endpoint URL, without query string.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Message extracted from the reply body.
        message: String,
    },

    /// The event stream ended in the middle of a record or carried one
    /// that is not valid JSON.
    #[error("unable to decode event stream: {source}")]
    StreamDecode {
        /// What went wrong with the stream.
        #[from]
        source: StreamFault,
    },

    /// A single-document reply could not be decoded.
    #[error("unable to decode response from {endpoint}: {source}")]
    ResponseDecode {
        /// Endpoint URL, without query string.
        endpoint: String,
        /// Decoder error.
        source: serde_json::Error,
    },
}

/// Why an event stream stopped abnormally.
#[derive(Debug, Error)]
pub enum StreamFault {
    /// A record was malformed, truncated, or not a JSON object.
    #[error("malformed event record: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The connection broke while reading.
    #[error("stream interrupted: {0}")]
    Interrupted(#[source] std::io::Error),
}

/// Convenience alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;
