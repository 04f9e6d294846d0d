//! Client and response contracts for traced HTTP.

use crate::chunk::Chunk;
use crate::error::HttpError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use http::{HeaderMap, Method, StatusCode};
use std::any::Any;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Identity of a response, stable across the chunks of a multiplexed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponseId(Uuid);

impl ResponseId {
    /// Creates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.simple().fmt(f)
    }
}

/// Stream of chunks from one or more multiplexed responses.
pub type ChunkStream = Pin<Box<dyn Stream<Item = (ResponseId, Chunk)> + Send>>;

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A response in flight.
///
/// The [`Any`] supertrait lets wrappers recover their concrete type from a
/// type-erased handle when responses are regrouped for multiplexed
/// streaming.
#[async_trait]
pub trait HttpResponse: Any + Send + Sync {
    /// The identity assigned when the request was issued.
    fn id(&self) -> ResponseId;

    /// The response status.
    fn status(&self) -> StatusCode;

    /// The response headers.
    fn headers(&self) -> &HeaderMap;

    /// Reads the whole body.
    ///
    /// With `check_status` set, non-success statuses are classified into
    /// [`HttpError`] once the body has been read.
    async fn content(&self, check_status: bool) -> Result<Bytes, HttpError>;

    /// Reads the whole body and decodes it as JSON.
    async fn json(&self, check_status: bool) -> Result<serde_json::Value, HttpError>;

    /// Abandons the response, discarding any unread body.
    async fn cancel(&self);
}

/// An HTTP client able to multiplex several in-flight responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issues a request.
    async fn request(&self, request: HttpRequest) -> Result<Arc<dyn HttpResponse>, HttpError>;

    /// Streams chunks from several in-flight responses as they arrive.
    ///
    /// `timeout` bounds the idle time between chunks; on expiry the stream
    /// yields [`Chunk::Timeout`] for the stalled response.
    fn stream(
        &self,
        responses: Vec<Arc<dyn HttpResponse>>,
        timeout: Option<Duration>,
    ) -> Result<ChunkStream, HttpError>;
}
