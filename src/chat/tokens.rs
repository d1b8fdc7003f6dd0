// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Token acquisition
//!
//! Two bootstrap requests precede the first chat turn: the landing page
//! yields the front-end version tag (shared by every client in the
//! process), the status endpoint yields the per-session token and hash.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

use crate::chat::client::{DuckChat, VQD_HASH_HEADER, VQD_HEADER};
use crate::error::{ChatError, ChatResult};
use crate::transport::TransportRequest;
use crate::utils::find_subslice;

const BACKEND_VERSION_MARKER: &[u8] = b"__DDG_BE_VERSION__=\"";
const CHAT_HASH_MARKER: &[u8] = b"__DDG_FE_CHAT_HASH__=\"";

/// Write-once cache for the front-end version tag.
///
/// Concurrent first-time fetches are serialized: one runs, the rest wait
/// for its value. A failed fetch leaves the cache empty.
#[derive(Debug, Default)]
pub struct FrontEndVersionCache {
    value: OnceCell<String>,
}

impl FrontEndVersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by clients that were not given one
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<FrontEndVersionCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(FrontEndVersionCache::new())))
    }

    pub fn get(&self) -> Option<&str> {
        self.value.get().map(String::as_str)
    }

    /// Seed the cache; returns false when it was already populated
    pub fn set(&self, version: impl Into<String>) -> bool {
        self.value.set(version.into()).is_ok()
    }

    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> ChatResult<&str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ChatResult<String>>,
    {
        self.value.get_or_try_init(init).await.map(String::as_str)
    }
}

/// Build the front-end version tag from the landing page HTML
pub fn extract_front_end_version(html: &[u8]) -> ChatResult<String> {
    let backend = extract_marker(html, BACKEND_VERSION_MARKER).ok_or_else(|| {
        ChatError::Protocol("landing page has no __DDG_BE_VERSION__ marker".to_string())
    })?;
    let chat_hash = extract_marker(html, CHAT_HASH_MARKER).ok_or_else(|| {
        ChatError::Protocol("landing page has no __DDG_FE_CHAT_HASH__ marker".to_string())
    })?;
    Ok(format!("{backend}-{chat_hash}"))
}

fn extract_marker(html: &[u8], marker: &[u8]) -> Option<String> {
    let start = find_subslice(html, marker)? + marker.len();
    let rest = &html[start..];
    let end = rest.iter().position(|&b| b == b'"')?;
    String::from_utf8(rest[..end].to_vec()).ok()
}

impl DuckChat {
    /// Make sure the front-end version tag is cached, fetching it once.
    ///
    /// Every failure here is a `Protocol` error, including a failed request.
    pub async fn ensure_front_end_version(&self) -> ChatResult<()> {
        self.front_end
            .get_or_try_init(|| self.fetch_front_end_version())
            .await?;
        Ok(())
    }

    /// Make sure a session token and hash are held, requesting a fresh
    /// pair when either one is missing
    pub async fn ensure_session_token(&mut self) -> ChatResult<()> {
        if !self.session.session_token().is_empty() && !self.session.session_hash().is_empty() {
            return Ok(());
        }

        let request = TransportRequest::get(self.endpoints.status()).header("x-vqd-accept", "1")?;
        let response = self.execute(request).await?;
        let session_token = response.header_str(VQD_HEADER).to_string();
        let session_hash = response.header_str(VQD_HASH_HEADER).to_string();

        tracing::debug!(
            target: "duckchat.client",
            has_token = !session_token.is_empty(),
            has_hash = !session_hash.is_empty(),
            "session token issued"
        );
        self.session.set_tokens(session_token, session_hash);
        Ok(())
    }

    async fn fetch_front_end_version(&self) -> ChatResult<String> {
        let request = TransportRequest::get(self.endpoints.landing())
            .query("q", "DuckDuckGo AI Chat")
            .query("ia", "chat")
            .query("duckai", "1");
        let response = self.execute(request).await.map_err(|e| match e {
            e @ ChatError::Protocol(_) => e,
            other => ChatError::Protocol(format!("failed to get front-end version: {other}")),
        })?;
        let url = response.url.clone();
        let html = response
            .bytes()
            .await
            .map_err(|e| ChatError::Protocol(format!("{url} failed to read landing page: {e}")))?;

        let version = extract_front_end_version(&html)?;
        tracing::debug!(target: "duckchat.client", version = %version, "front-end version cached");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &[u8] = br#"<script>window.__DDG_BE_VERSION__="serp_20250401_100419_ET";window.__DDG_FE_CHAT_HASH__="19a0c4b8ed7e";</script>"#;

    #[test]
    fn test_extract_front_end_version() {
        assert_eq!(
            extract_front_end_version(PAGE).unwrap(),
            "serp_20250401_100419_ET-19a0c4b8ed7e"
        );
    }

    #[test]
    fn test_missing_backend_marker() {
        let err = extract_front_end_version(br#"__DDG_FE_CHAT_HASH__="abc""#).unwrap_err();
        assert!(err.to_string().contains("__DDG_BE_VERSION__"));
    }

    #[test]
    fn test_missing_chat_hash_marker() {
        let err = extract_front_end_version(br#"__DDG_BE_VERSION__="abc""#).unwrap_err();
        assert!(matches!(err, ChatError::Protocol(_)));
        assert!(err.to_string().contains("__DDG_FE_CHAT_HASH__"));
    }

    #[test]
    fn test_unterminated_marker() {
        assert!(extract_front_end_version(br#"__DDG_BE_VERSION__="abc"#).is_err());
    }

    #[tokio::test]
    async fn test_cache_initializes_once() {
        let cache = FrontEndVersionCache::new();
        let first = cache
            .get_or_try_init(|| async { Ok("v1".to_string()) })
            .await
            .unwrap()
            .to_string();
        let second = cache
            .get_or_try_init(|| async { Ok("v2".to_string()) })
            .await
            .unwrap();
        assert_eq!(first, "v1");
        assert_eq!(second, "v1");
    }

    #[tokio::test]
    async fn test_cache_retries_after_failure() {
        let cache = FrontEndVersionCache::new();
        let failed = cache
            .get_or_try_init(|| async { Err(ChatError::Protocol("page changed".to_string())) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.get(), None);

        let version = cache
            .get_or_try_init(|| async { Ok("v2".to_string()) })
            .await
            .unwrap();
        assert_eq!(version, "v2");
    }

    #[test]
    fn test_set_only_once() {
        let cache = FrontEndVersionCache::new();
        assert!(cache.set("a"));
        assert!(!cache.set("b"));
        assert_eq!(cache.get(), Some("a"));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(
            &FrontEndVersionCache::global(),
            &FrontEndVersionCache::global()
        ));
    }
}
