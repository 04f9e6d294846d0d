//! Client decorator opening a child span per outgoing request.

use crate::client::{ChunkStream, HttpClient, HttpRequest, HttpResponse};
use crate::error::HttpError;
use crate::response::TracedResponse;
use async_trait::async_trait;
use flare_core::{HttpConfig, Hub, Span, SpanContext};
use std::sync::Arc;
use std::time::Duration;

/// Operation tag recorded on request spans.
pub const REQUEST_OPERATION: &str = "http.client";

const METHOD_TAG: &str = "http.request.method";
const URL_TAG: &str = "url.full";

/// Wraps an [`HttpClient`], attaching a child span to every request issued
/// while the hub has a current span.
///
/// Responses come back as [`TracedResponse`] wrappers that finish their
/// span when consumed.
pub struct TracedClient {
    inner: Arc<dyn HttpClient>,
    hub: Arc<Hub>,
    trace_requests: bool,
}

impl TracedClient {
    /// Wraps `inner`, reporting spans through `hub`.
    pub fn new(inner: Arc<dyn HttpClient>, hub: Arc<Hub>, config: HttpConfig) -> Self {
        Self {
            inner,
            hub,
            trace_requests: config.trace_requests,
        }
    }

    /// Wraps `inner` with default HTTP configuration.
    pub fn with_defaults(inner: Arc<dyn HttpClient>, hub: Arc<Hub>) -> Self {
        Self::new(inner, hub, HttpConfig::default())
    }

    /// Requests issued without a current span on the hub get no span; there
    /// is no transaction to attach the child to.
    fn start_request_span(&self, request: &HttpRequest) -> Option<Span> {
        if !self.trace_requests {
            return None;
        }
        let parent = self.hub.span()?;
        let span = parent.start_child(
            SpanContext::new(REQUEST_OPERATION)
                .with_description(format!("{} {}", request.method, request.url)),
        );
        span.set_tag(METHOD_TAG, request.method.as_str());
        span.set_tag(URL_TAG, request.url.clone());
        Some(span)
    }
}

#[async_trait]
impl HttpClient for TracedClient {
    async fn request(&self, request: HttpRequest) -> Result<Arc<dyn HttpResponse>, HttpError> {
        let span = self.start_request_span(&request);

        match self.inner.request(request).await {
            Ok(response) => {
                let traced: Arc<dyn HttpResponse> =
                    Arc::new(TracedResponse::new(self.inner.clone(), response, span));
                Ok(traced)
            }
            Err(error) => {
                if let Some(span) = span {
                    span.finish();
                }
                Err(error)
            }
        }
    }

    fn stream(
        &self,
        responses: Vec<Arc<dyn HttpResponse>>,
        timeout: Option<Duration>,
    ) -> Result<ChunkStream, HttpError> {
        TracedResponse::stream(self.inner.clone(), responses, timeout)
    }
}
