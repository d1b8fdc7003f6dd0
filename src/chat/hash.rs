// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Integrity hash capability
//!
//! Every chat POST carries an integrity hash derived from the previous one
//! and the outgoing header set. The derivation is owned by the service and
//! changes over time, so the client only holds it behind this trait.

use reqwest::header::HeaderMap;

use crate::error::ChatResult;

/// Derives the next session hash
pub trait IntegrityHasher: Send + Sync {
    /// Compute the hash to send given the previous hash and the headers of
    /// the request about to be sent. Must be deterministic.
    fn derive_hash(&self, previous: &str, headers: &HeaderMap) -> ChatResult<String>;
}

impl<F> IntegrityHasher for F
where
    F: Fn(&str, &HeaderMap) -> ChatResult<String> + Send + Sync,
{
    fn derive_hash(&self, previous: &str, headers: &HeaderMap) -> ChatResult<String> {
        self(previous, headers)
    }
}

/// Sends the hash issued by the server unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughHasher;

impl IntegrityHasher for PassthroughHasher {
    fn derive_hash(&self, previous: &str, _headers: &HeaderMap) -> ChatResult<String> {
        Ok(previous.to_string())
    }
}
