//! Shared fakes for the traced HTTP tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use flare_core::{Hub, Span, TransactionContext};
use flare_http::{
    Chunk, ChunkStream, HttpClient, HttpError, HttpRequest, HttpResponse, ResponseId,
};
use futures_util::stream;
use http::{HeaderMap, StatusCode};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory response with a scripted status and body.
pub struct FakeResponse {
    id: ResponseId,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    cancelled: AtomicBool,
    on_cancel: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
}

impl FakeResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            id: ResponseId::new(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::copy_from_slice(body.as_bytes()),
            cancelled: AtomicBool::new(false),
            on_cancel: Mutex::new(None),
        }
    }

    /// Installs a hook that runs at the start of `cancel`.
    pub fn set_cancel_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_cancel.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpResponse for FakeResponse {
    fn id(&self) -> ResponseId {
        self.id
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    // Status classification is the wrapper's job; the fake hands the body
    // back regardless of the flag.
    async fn content(&self, _check_status: bool) -> Result<Bytes, HttpError> {
        Ok(self.body.clone())
    }

    async fn json(&self, _check_status: bool) -> Result<serde_json::Value, HttpError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    async fn cancel(&self) {
        if let Some(hook) = self.on_cancel.lock().unwrap().as_ref() {
            hook();
        }
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Client returning queued responses and a scripted chunk sequence.
#[derive(Default)]
pub struct FakeClient {
    responses: Mutex<VecDeque<Arc<FakeResponse>>>,
    chunks: Mutex<Vec<(ResponseId, Chunk)>>,
    stream_calls: AtomicUsize,
    failing: AtomicBool,
}

impl FakeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a response; requests hand queued responses out in order.
    pub fn push_response(&self, response: Arc<FakeResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Scripts the chunk sequence `stream` plays back.
    pub fn script_chunks(&self, chunks: Vec<(ResponseId, Chunk)>) {
        *self.chunks.lock().unwrap() = chunks;
    }

    /// Makes all subsequent requests fail at the transport level.
    pub fn fail_requests(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// How many times `stream` was called.
    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn request(&self, _request: HttpRequest) -> Result<Arc<dyn HttpResponse>, HttpError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HttpError::transport("connection refused"));
        }
        let next = self.responses.lock().unwrap().pop_front();
        let response: Arc<dyn HttpResponse> = match next {
            Some(response) => response,
            None => Arc::new(FakeResponse::new(200, "ok")),
        };
        Ok(response)
    }

    fn stream(
        &self,
        responses: Vec<Arc<dyn HttpResponse>>,
        _timeout: Option<Duration>,
    ) -> Result<ChunkStream, HttpError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);

        let requested: HashSet<ResponseId> =
            responses.iter().map(|response| response.id()).collect();
        let chunks: Vec<(ResponseId, Chunk)> = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| requested.contains(id))
            .cloned()
            .collect();

        let stream: ChunkStream = Box::pin(stream::iter(chunks));
        Ok(stream)
    }
}

pub fn create_test_hub() -> Arc<Hub> {
    Arc::new(Hub::without_client())
}

pub fn create_hub_with_transaction() -> (Arc<Hub>, Span) {
    let hub = create_test_hub();
    let transaction =
        hub.start_transaction(TransactionContext::new("worker", "messenger.handle"));
    hub.set_span(Some(transaction.clone()));
    (hub, transaction)
}

pub fn create_test_span() -> Span {
    let hub = Hub::without_client();
    hub.start_transaction(TransactionContext::new("worker", "messenger.handle"))
}
