// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Maps transport outcomes onto `ChatError`

use reqwest::Method;
use std::fmt;

use crate::error::{ChatError, ChatResult};
use crate::transport::{TransportError, TransportRequest};

/// Statuses the service uses to signal blocking or throttling
pub const RATE_LIMIT_STATUSES: [u16; 6] = [202, 301, 400, 403, 418, 429];

/// What was sent, kept for diagnostics on generic failures
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub has_body: bool,
}

impl From<&TransportRequest> for RequestContext {
    fn from(request: &TransportRequest) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.clone(),
            query: request.query.clone(),
            has_body: request.body.is_some(),
        }
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if !self.query.is_empty() {
            write!(f, " params={:?}", self.query)?;
        }
        if self.has_body {
            write!(f, " with JSON body")?;
        }
        Ok(())
    }
}

/// Classify a response status. Only 200 is a success.
pub fn classify_status(status: u16, url: &str, context: &RequestContext) -> ChatResult<()> {
    if status == 200 {
        return Ok(());
    }
    if RATE_LIMIT_STATUSES.contains(&status) {
        return Err(ChatError::RateLimited(format!("{url} {status} Ratelimit")));
    }
    Err(ChatError::Client(format!(
        "{url} returned status {status} ({context})"
    )))
}

/// Classify a failure that happened before any response arrived
pub fn classify_transport_error(url: &str, error: &TransportError) -> ChatError {
    let message = error.message.to_ascii_lowercase();
    if error.timed_out || message.contains("timeout") || message.contains("timed out") {
        ChatError::Timeout(format!("{url} {}", error.message))
    } else {
        ChatError::Client(format!("{url} {}", error.message))
    }
}
