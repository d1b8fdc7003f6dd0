// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Transport adapter contract
//!
//! The chat core never talks to an HTTP library directly. It builds a
//! [`TransportRequest`], hands it to a [`Transport`], and gets back the
//! status, headers and a lazy body stream. Status classification happens
//! in the core, not here.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::error::{ChatError, ChatResult};

pub use http::HttpTransport;
pub use mock::{MockResponse, MockTransport};

/// Lazy sequence of raw body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, TransportError>> + Send>>;

/// Main trait for transports
#[async_trait]
pub trait Transport: Send + Sync {
    /// Headers attached to every request this transport sends
    fn default_headers(&self) -> HeaderMap;

    /// Send a request and return as soon as the response headers are in.
    ///
    /// The body is not read; dropping the response releases the connection.
    async fn send(&self, request: TransportRequest) -> std::result::Result<TransportResponse, TransportError>;
}

/// Transport-level failure (connect, TLS, read, timeout)
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct TransportError {
    /// Failure description as reported by the transport
    pub message: String,
    /// Set when the transport itself detected a timeout
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message,
            timed_out: err.is_timeout(),
        }
    }
}

/// An outgoing request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Per-request timeout; the transport default applies when `None`
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add a header; fails when the value is not a valid header value
    pub fn header(mut self, name: &'static str, value: &str) -> ChatResult<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ChatError::Protocol(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A response whose headers have arrived and whose body is still pending
pub struct TransportResponse {
    pub status: u16,
    /// Final URL of the response
    pub url: String,
    pub headers: HeaderMap,
    body: ByteStream,
}

impl TransportResponse {
    pub fn new(status: u16, url: impl Into<String>, headers: HeaderMap, body: ByteStream) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
            body,
        }
    }

    /// Header value as a string, empty when absent or not valid UTF-8
    pub fn header_str(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Read the whole body
    pub async fn bytes(self) -> std::result::Result<Vec<u8>, TransportError> {
        self.body
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
    }

    /// Take the lazy body chunk stream
    pub fn into_stream(self) -> ByteStream {
        self.body
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
