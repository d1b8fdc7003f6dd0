// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock transport for testing
//!
//! Replies are scripted up front and handed out in order, one per request,
//! regardless of URL. Every request is recorded for later inspection.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// A scripted transport
#[derive(Clone)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
    call_count: Arc<AtomicUsize>,
    default_headers: HeaderMap,
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(MockResponse),
    Error(TransportError),
}

/// A scripted response
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    chunks: Vec<Result<Bytes, TransportError>>,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Body delivered as a single chunk
    pub fn body(self, body: impl AsRef<[u8]>) -> Self {
        self.chunks(vec![body.as_ref().to_vec()])
    }

    /// Body delivered chunk by chunk, exactly as split here
    pub fn chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
        self
    }

    /// Fail the body stream after the chunks delivered so far
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.chunks.push(Err(TransportError::new(message)));
        self
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static("duckchat-mock"));
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            default_headers,
        }
    }

    /// Queue a response
    pub fn reply(self, response: MockResponse) -> Self {
        lock(&self.replies).push_back(MockReply::Response(response));
        self
    }

    /// Queue a transport failure
    pub fn fail(self, error: TransportError) -> Self {
        lock(&self.replies).push_back(MockReply::Error(error));
        self
    }

    /// Number of requests sent so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests sent so far, oldest first
    pub fn requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }

    /// Scripted replies not consumed yet
    pub fn pending_replies(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn default_headers(&self) -> HeaderMap {
        self.default_headers.clone()
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let url = request.url.clone();
        lock(&self.requests).push(request);

        let reply = lock(&self.replies)
            .pop_front()
            .ok_or_else(|| TransportError::new(format!("no scripted response for {url}")))?;

        match reply {
            MockReply::Error(error) => Err(error),
            MockReply::Response(response) => {
                let mut headers = HeaderMap::new();
                for (name, value) in &response.headers {
                    let name = HeaderName::from_bytes(name.as_bytes())
                        .map_err(|e| TransportError::new(e.to_string()))?;
                    let value =
                        HeaderValue::from_str(value).map_err(|e| TransportError::new(e.to_string()))?;
                    headers.insert(name, value);
                }
                Ok(TransportResponse::new(
                    response.status,
                    url,
                    headers,
                    Box::pin(stream::iter(response.chunks)),
                ))
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock transport lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
