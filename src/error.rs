// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for duckchat
//!
//! `ChatError` is the closed taxonomy every core operation fails with.
//! `DuckChatError` wraps it together with the failures of the application
//! shell (settings, conversation cache, terminal I/O).

use thiserror::Error;

/// Failure kinds surfaced by the chat core
#[derive(Error, Debug)]
pub enum ChatError {
    /// Generic client failure, carries the request context
    #[error("Client error: {0}")]
    Client(String),

    /// The service signaled blocking or throttling
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Transport-level timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The conversation exceeded its allowed length; start a new one
    #[error("Conversation limit reached: {0}")]
    ConversationLimit(String),

    /// Response shape did not match expectations
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl ChatError {
    /// Whether the caller may retry the same turn after backing off.
    ///
    /// The core itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::RateLimited(_) | ChatError::Timeout(_))
    }
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum DuckChatError {
    /// Chat core errors
    #[error("{0}")]
    Chat(#[from] ChatError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for chat core operations
pub type ChatResult<T> = std::result::Result<T, ChatError>;

/// Result alias for application operations
pub type Result<T> = std::result::Result<T, DuckChatError>;
