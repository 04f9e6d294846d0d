//! Error type for traced HTTP requests.

use http::StatusCode;
use std::error::Error;

/// Errors surfaced by traced clients and responses.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HttpError {
    /// The server answered with a status of 500 or higher.
    #[error("server error: HTTP {status}")]
    Server {
        /// The response status.
        status: StatusCode,
    },
    /// The server answered with a 4xx status.
    #[error("client error: HTTP {status}")]
    Client {
        /// The response status.
        status: StatusCode,
    },
    /// The server answered with a 3xx status.
    #[error("redirection: HTTP {status}")]
    Redirection {
        /// The response status.
        status: StatusCode,
    },
    /// The request never produced a response.
    #[error("transport failure")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
    /// The response body could not be decoded.
    #[error("failed to decode response body")]
    Decode(#[from] serde_json::Error),
    /// A response handed to stream multiplexing was not issued through a
    /// traced client.
    #[error("stream() expects responses issued through a traced client")]
    UntracedResponse,
}

impl HttpError {
    /// Wraps a transport-level failure.
    pub fn transport(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Transport(error.into())
    }

    /// The response status, for status-classification errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status } | Self::Client { status } | Self::Redirection { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
