// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! duckchat - client for DuckDuckGo AI chat.
//!
//! This crate exposes the chat core used by the `duckchat` CLI
//! (`src/main.rs`) and by anything embedding it as a library.
//!
//! Architecture highlights:
//! - `chat`: token bootstrap, request signing, error classification,
//!   streaming reply parser and the `DuckChat` client
//! - `transport`: the HTTP seam (`reqwest` implementation plus an
//!   in-memory mock)
//! - `config`: client configuration and persisted settings
//! - `history`: conversation cache for resuming a chat

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod transport;
pub mod utils;

pub use chat::{DuckChat, Model, TurnEvent};
pub use config::ClientConfig;
pub use error::{ChatError, ChatResult, DuckChatError, Result};
