//! Chunks yielded by multiplexed response streams.

use bytes::Bytes;

/// One chunk of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Chunk {
    /// Headers arrived; the body follows.
    First,
    /// A piece of the body.
    Data(Bytes),
    /// The body is complete.
    Last,
    /// The stream idled past the configured timeout.
    Timeout,
}

impl Chunk {
    /// Whether this chunk marks the end of its response.
    pub fn is_last(&self) -> bool {
        matches!(self, Self::Last)
    }

    /// Whether this chunk reports an idle timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// The payload, for data chunks.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }
}
