// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! reqwest-backed transport
//!
//! Redirects are never followed and cookies persist across requests made
//! through the same transport. Each transport picks one browser profile at
//! construction and keeps it for its lifetime.

use async_trait::async_trait;
use futures::TryStreamExt;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect, Client, Proxy};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{ChatError, ChatResult};
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use crate::utils::is_supported_proxy_scheme;

const BROWSER_PROFILES: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.2 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 18_1_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 18_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:135.0) Gecko/20100101 Firefox/135.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
];

/// HTTP transport built on a shared reqwest client
pub struct HttpTransport {
    client: Client,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport from client configuration
    pub fn new(config: &ClientConfig) -> ChatResult<Self> {
        let default_headers = browser_headers(random_profile());

        let mut builder = Client::builder()
            .default_headers(default_headers.clone())
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_tls);

        if let Some(proxy) = &config.proxy {
            if !is_supported_proxy_scheme(proxy) {
                return Err(ChatError::Client(format!(
                    "unsupported proxy {proxy}: expected an http, https or socks5 URL"
                )));
            }
            let proxy = Proxy::all(proxy.as_str())
                .map_err(|e| ChatError::Client(format!("invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ChatError::Client(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            default_headers,
            timeout: config.timeout,
        })
    }

    /// Default timeout applied when a request carries none
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn default_headers(&self) -> HeaderMap {
        self.default_headers.clone()
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            headers,
            query,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(method, &url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let response_headers = response.headers().clone();
        let body = response.bytes_stream().map_err(TransportError::from);

        Ok(TransportResponse::new(
            status,
            final_url,
            response_headers,
            Box::pin(body),
        ))
    }
}

fn random_profile() -> &'static str {
    let mut rng = rand::rng();
    BROWSER_PROFILES[rng.random_range(0..BROWSER_PROFILES.len())]
}

fn browser_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(10));
        let headers = transport.default_headers();
        let user_agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(BROWSER_PROFILES.contains(&user_agent));
    }

    #[test]
    fn test_transport_with_socks_proxy() {
        let config = ClientConfig::default().with_proxy("tb");
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[test]
    fn test_transport_rejects_unsupported_proxy() {
        let config = ClientConfig::default().with_proxy("ftp://127.0.0.1:21");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ChatError::Client(_))
        ));
    }

    #[test]
    fn test_profiles_are_valid_header_values() {
        for profile in BROWSER_PROFILES {
            assert!(HeaderValue::from_str(profile).is_ok());
        }
    }
}
