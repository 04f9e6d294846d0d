//! Response wrapper tying span lifetime to response consumption.
//!
//! [`TracedResponse`] holds the span opened for its request in a take-once
//! slot. Reading the body, decoding it, cancelling, dropping the response,
//! and the completion chunk of a multiplexed stream all finish the span;
//! whichever happens first wins, the rest are no-ops.

use crate::chunk::Chunk;
use crate::client::{ChunkStream, HttpClient, HttpResponse, ResponseId};
use crate::error::HttpError;
use async_trait::async_trait;
use bytes::Bytes;
use flare_core::Span;
use futures_util::Stream;
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use pin_project_lite::pin_project;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

const STATUS_CODE_TAG: &str = "http.response.status_code";

/// A response issued through a traced client.
///
/// Delegates everything to the wrapped response and finishes the request
/// span when the response reaches its end. Status classification happens
/// after the span is finished, so a non-success status never leaves the
/// span open.
pub struct TracedResponse {
    client: Arc<dyn HttpClient>,
    inner: Arc<dyn HttpResponse>,
    span: Mutex<Option<Span>>,
}

impl TracedResponse {
    /// Wraps `inner`, finishing `span` when the response reaches its end.
    pub fn new(
        client: Arc<dyn HttpClient>,
        inner: Arc<dyn HttpResponse>,
        span: Option<Span>,
    ) -> Self {
        Self {
            client,
            inner,
            span: Mutex::new(span),
        }
    }

    /// The client the response was issued through.
    pub fn client(&self) -> Arc<dyn HttpClient> {
        self.client.clone()
    }

    /// The request span, while not yet finished by this wrapper.
    pub fn span(&self) -> Option<Span> {
        self.span.lock().clone()
    }

    /// Finishes the request span, recording the response status as a tag.
    ///
    /// Only the first call has an effect; later calls find the slot empty.
    pub fn finish(&self) {
        if let Some(span) = self.span.lock().take() {
            span.set_tag(STATUS_CODE_TAG, self.inner.status().as_str());
            span.finish();
        }
    }

    /// Multiplexes traced responses into one chunk stream.
    ///
    /// Every response must have been issued through a traced client; a
    /// mismatch fails before any I/O starts. Each response's span finishes
    /// as its completion chunk passes through the returned stream.
    pub fn stream(
        client: Arc<dyn HttpClient>,
        responses: Vec<Arc<dyn HttpResponse>>,
        timeout: Option<Duration>,
    ) -> Result<ChunkStream, HttpError> {
        let mut inner_responses = Vec::with_capacity(responses.len());
        let mut wrappers = HashMap::with_capacity(responses.len());

        for response in responses {
            let response: Arc<dyn Any + Send + Sync> = response;
            let Ok(traced) = response.downcast::<TracedResponse>() else {
                return Err(HttpError::UntracedResponse);
            };
            inner_responses.push(traced.inner.clone());
            wrappers.insert(traced.inner.id(), traced);
        }

        let inner = client.stream(inner_responses, timeout)?;
        let stream: ChunkStream = Box::pin(TracedChunkStream { inner, wrappers });
        Ok(stream)
    }

    fn finish_and_check<T>(
        &self,
        check_status: bool,
        result: Result<T, HttpError>,
    ) -> Result<T, HttpError> {
        self.finish();
        if check_status {
            check_status_code(self.inner.status())?;
        }
        result
    }
}

#[async_trait]
impl HttpResponse for TracedResponse {
    fn id(&self) -> ResponseId {
        self.inner.id()
    }

    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    async fn content(&self, check_status: bool) -> Result<Bytes, HttpError> {
        let result = self.inner.content(check_status).await;
        self.finish_and_check(check_status, result)
    }

    async fn json(&self, check_status: bool) -> Result<serde_json::Value, HttpError> {
        let result = self.inner.json(check_status).await;
        self.finish_and_check(check_status, result)
    }

    async fn cancel(&self) {
        self.finish();
        self.inner.cancel().await;
    }
}

impl Drop for TracedResponse {
    fn drop(&mut self) {
        self.finish();
    }
}

impl fmt::Debug for TracedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedResponse")
            .field("id", &self.inner.id())
            .field("status", &self.inner.status())
            .field("span_active", &self.span.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl Serialize for TracedResponse {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Err(serde::ser::Error::custom(
            "TracedResponse wraps a live connection and cannot be serialized",
        ))
    }
}

impl<'de> Deserialize<'de> for TracedResponse {
    fn deserialize<D>(_deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(serde::de::Error::custom(
            "TracedResponse wraps a live connection and cannot be deserialized",
        ))
    }
}

fn check_status_code(status: StatusCode) -> Result<(), HttpError> {
    // StatusCode admits non-standard codes up to 999; anything from 500 up
    // counts as a server error.
    if status.as_u16() >= 500 {
        return Err(HttpError::Server { status });
    }
    if status.is_client_error() {
        return Err(HttpError::Client { status });
    }
    if status.is_redirection() {
        return Err(HttpError::Redirection { status });
    }
    Ok(())
}

pin_project! {
    /// Chunk stream that finishes each response's span as its completion
    /// chunk passes through.
    struct TracedChunkStream {
        #[pin]
        inner: ChunkStream,
        wrappers: HashMap<ResponseId, Arc<TracedResponse>>,
    }
}

impl Stream for TracedChunkStream {
    type Item = (ResponseId, Chunk);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some((id, chunk))) => {
                if chunk.is_last() {
                    match this.wrappers.remove(&id) {
                        Some(wrapper) => wrapper.finish(),
                        None => {
                            tracing::warn!(
                                response_id = %id,
                                "completion chunk for an unknown response"
                            );
                        }
                    }
                }
                Poll::Ready(Some((id, chunk)))
            }
            other => other,
        }
    }
}
