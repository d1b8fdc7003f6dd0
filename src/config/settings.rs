// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for duckchat
//!
//! Handles loading and saving settings from ~/.duckchat/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::chat::Model;
use crate::config::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::utils::expand_proxy_alias;

mod io;

/// Main settings structure, stored in ~/.duckchat/settings.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Proxy for all requests (http/https/socks5, or `tb`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify TLS certificates
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Model used when none is given on the command line
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Conversation cache written after every turn
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Service origin
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
            default_model: default_model(),
            cache_file: default_cache_file(),
            base_url: default_base_url(),
        }
    }
}

impl Settings {
    /// Build the client configuration, letting explicit values override
    /// the stored ones.
    pub fn client_config(
        &self,
        proxy: Option<&str>,
        timeout_secs: Option<u64>,
        verify_tls: Option<bool>,
    ) -> ClientConfig {
        ClientConfig {
            proxy: expand_proxy_alias(proxy.or(self.proxy.as_deref())),
            timeout: Duration::from_secs(timeout_secs.unwrap_or(self.timeout_secs)),
            verify_tls: verify_tls.unwrap_or(self.verify_tls),
            base_url: self.base_url.clone(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

fn default_model() -> String {
    Model::default().as_str().to_string()
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("duckai_chat.json")
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
