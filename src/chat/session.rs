// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Per-client conversation state
//!
//! A `Session` owns the rotating session token and hash, the transcript
//! sent to the server on every turn, and an approximate token counter.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ChatError, ChatResult};
use crate::utils::estimate_tokens;

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry, serialized exactly as the chat endpoint expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation state owned by one client
#[derive(Debug, Clone, Default)]
pub struct Session {
    session_token: String,
    session_hash: String,
    history: Vec<ChatMessage>,
    token_usage: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotating session token (`x-vqd-4`)
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Rotating integrity hash (`x-vqd-hash-1`)
    pub fn session_hash(&self) -> &str {
        &self.session_hash
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Approximate tokens exchanged so far
    pub fn token_usage(&self) -> u64 {
        self.token_usage
    }

    /// Replace both rotating values at once
    pub fn set_tokens(&mut self, session_token: impl Into<String>, session_hash: impl Into<String>) {
        self.session_token = session_token.into();
        self.session_hash = session_hash.into();
    }

    pub fn set_session_token(&mut self, session_token: impl Into<String>) {
        self.session_token = session_token.into();
    }

    pub fn set_session_hash(&mut self, session_hash: impl Into<String>) {
        self.session_hash = session_hash.into();
    }

    /// Replace the transcript wholesale, e.g. when resuming a saved conversation
    pub fn set_history(&mut self, history: Vec<ChatMessage>) {
        self.history = history;
    }

    pub fn set_token_usage(&mut self, token_usage: u64) {
        self.token_usage = token_usage;
    }

    /// Both rotating values must be present before a chat request
    pub fn require_tokens(&self) -> ChatResult<()> {
        if self.session_token.is_empty() {
            return Err(ChatError::Protocol(
                "no session token (x-vqd-4) was issued".to_string(),
            ));
        }
        if self.session_hash.is_empty() {
            return Err(ChatError::Protocol(
                "no session hash (x-vqd-hash-1) was issued".to_string(),
            ));
        }
        Ok(())
    }

    /// Append an outgoing user message and count its estimated tokens
    pub fn push_user(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.token_usage += estimate_tokens(&content);
        self.history.push(ChatMessage::user(content));
    }

    /// Append the assembled reply of a completed turn
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    /// Drop a trailing user message that never got a reply. Token usage
    /// is left as is since the request was already sent.
    pub fn discard_unanswered(&mut self) -> Option<ChatMessage> {
        match self.history.last() {
            Some(message) if message.role == Role::User => self.history.pop(),
            _ => None,
        }
    }

    /// Count one received fragment
    pub fn record_fragment(&mut self) {
        self.token_usage += 1;
    }

    /// Forget the conversation and its credentials
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_token: self.session_token.clone(),
            session_hash: self.session_hash.clone(),
            token_usage: self.token_usage,
            history: self.history.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.session_token = snapshot.session_token;
        self.session_hash = snapshot.session_hash;
        self.token_usage = snapshot.token_usage;
        self.history = snapshot.history;
    }
}

impl From<SessionSnapshot> for Session {
    fn from(snapshot: SessionSnapshot) -> Self {
        let mut session = Session::new();
        session.restore(snapshot);
        session
    }
}

/// Persisted shape of a session, keyed like the conversation cache file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(rename = "vqd", default, deserialize_with = "null_as_empty")]
    pub session_token: String,
    #[serde(rename = "vqd_hash", default, deserialize_with = "null_as_empty")]
    pub session_hash: String,
    #[serde(rename = "tokens", default)]
    pub token_usage: u64,
    #[serde(rename = "messages", default)]
    pub history: Vec<ChatMessage>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
