//! Traced HTTP client and streaming response wrapper.
//!
//! [`TracedClient`] decorates any [`HttpClient`]. Each request issued while
//! the hub has a current span gets a child span that lives exactly as long
//! as the response: reading or decoding the body, cancelling, dropping the
//! last handle, or the response's completion chunk inside a multiplexed
//! stream all finish it, and only the first one counts. Non-success
//! statuses are classified into [`HttpError`] only after the span has
//! finished.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chunk;
pub mod client;
pub mod error;
pub mod response;
pub mod traced_client;

pub use chunk::Chunk;
pub use client::{ChunkStream, HttpClient, HttpRequest, HttpResponse, ResponseId};
pub use error::HttpError;
pub use response::TracedResponse;
pub use traced_client::{REQUEST_OPERATION, TracedClient};
