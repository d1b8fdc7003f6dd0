// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat protocol
//!
//! Token bootstrap, request signing, response classification and the
//! streaming reply parser, tied together by [`DuckChat`].

pub mod classify;
pub mod client;
pub mod hash;
pub mod models;
pub mod session;
pub mod streaming;
pub mod tokens;

pub use classify::{classify_status, classify_transport_error, RequestContext, RATE_LIMIT_STATUSES};
pub use client::{
    DuckChat, Endpoints, TurnEvent, TurnStream, DEFAULT_TURN_TIMEOUT, FE_VERSION_HEADER,
    VQD_HASH_HEADER, VQD_HEADER,
};
pub use hash::{IntegrityHasher, PassthroughHasher};
pub use models::{Model, UnknownModel};
pub use session::{ChatMessage, Role, Session, SessionSnapshot};
pub use streaming::{EventStreamParser, StreamItem, CONVERSATION_LIMIT_CODE};
pub use tokens::{extract_front_end_version, FrontEndVersionCache};
