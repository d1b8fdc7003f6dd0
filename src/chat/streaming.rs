// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Incremental parser for the chat response body
//!
//! The body is a sequence of `data:`-prefixed segments, each holding a JSON
//! event or a sentinel. Bytes are fed in whatever chunks the transport
//! delivers; the parser keeps partial segments (and partial delimiters or
//! UTF-8 sequences) buffered until a boundary arrives.
//!
//! A segment ends at a blank line, at a `data:` delimiter that starts a new
//! line, or at the end of the body. A sentinel is only recognized once its
//! segment is complete, since `[DONE]` is a prefix of the conversation-limit
//! sentinel.

use serde_json::Value;

use crate::error::ChatError;
use crate::utils::find_subslice;

const DELIMITER_TEXT: &str = "data:";
const DELIMITER: &[u8] = DELIMITER_TEXT.as_bytes();
const END_OF_STREAM: &str = "[DONE]";
const CONVERSATION_LIMIT: &str = "[DONE][LIMIT_CONVERSATION]";

/// Error `type` the server uses for an exhausted conversation
pub const CONVERSATION_LIMIT_CODE: &str = "ERR_CONVERSATION_LIMIT";

/// Outcome of one complete segment
#[derive(Debug)]
pub enum StreamItem {
    /// Text to append to the reply
    Fragment(String),
    /// End-of-stream sentinel
    Done,
    /// Terminal failure reported in-band
    Failed(ChatError),
}

impl StreamItem {
    fn is_terminal(&self) -> bool {
        !matches!(self, StreamItem::Fragment(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Between segments: skipping whitespace, expecting `data:`
    AwaitingDelimiter,
    /// Inside a segment, waiting for its boundary
    Accumulating,
}

/// Byte-level event stream parser
#[derive(Debug)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    state: ParserState,
    finished: bool,
}

impl Default for EventStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: ParserState::AwaitingDelimiter,
            finished: false,
        }
    }

    /// Feed a chunk and drain every segment it completes.
    ///
    /// Nothing is returned after a terminal item (`Done` or `Failed`).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamItem> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut items = Vec::new();
        while let Some(segment) = self.next_segment() {
            if self.drain_into(dispatch(&segment), &mut items) {
                break;
            }
        }
        items
    }

    /// Flush the trailing segment once the body has ended
    pub fn finish(&mut self) -> Vec<StreamItem> {
        if self.finished {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buffer);
        let segment = match self.state {
            ParserState::AwaitingDelimiter => strip_delimiter(&rest),
            ParserState::Accumulating => &rest[..],
        };
        let dispatched = dispatch(segment);
        let mut items = Vec::new();
        self.drain_into(dispatched, &mut items);
        self.terminate();
        items
    }

    /// Whether a terminal item was produced or the body was flushed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Move items to `out` up to and including the first terminal one.
    /// Returns true when a terminal item was reached.
    fn drain_into(&mut self, dispatched: Vec<StreamItem>, out: &mut Vec<StreamItem>) -> bool {
        for item in dispatched {
            let terminal = item.is_terminal();
            out.push(item);
            if terminal {
                self.terminate();
                return true;
            }
        }
        false
    }

    fn terminate(&mut self) {
        self.finished = true;
        self.buffer.clear();
    }

    fn next_segment(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.state {
                ParserState::AwaitingDelimiter => {
                    let Some(start) = self.buffer.iter().position(|b| !b.is_ascii_whitespace())
                    else {
                        self.buffer.clear();
                        return None;
                    };
                    self.buffer.drain(..start);

                    if self.buffer.starts_with(DELIMITER) {
                        self.buffer.drain(..DELIMITER.len());
                    } else if DELIMITER.starts_with(&self.buffer) {
                        // delimiter split across chunks
                        return None;
                    }
                    self.state = ParserState::Accumulating;
                }
                ParserState::Accumulating => {
                    let (end, consumed) = find_boundary(&self.buffer)?;
                    let segment = self.buffer[..end].to_vec();
                    self.buffer.drain(..consumed);
                    self.state = ParserState::AwaitingDelimiter;
                    return Some(segment);
                }
            }
        }
    }
}

/// Earliest segment boundary as (segment end, bytes consumed)
fn find_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let candidates = [
        find_subslice(buffer, b"\n\n").map(|i| (i, i + 2)),
        find_subslice(buffer, b"\r\n\r\n").map(|i| (i, i + 4)),
        // keep the delimiter for the next segment
        find_subslice(buffer, b"\ndata:").map(|i| (i, i + 1)),
    ];
    candidates.into_iter().flatten().min_by_key(|(end, _)| *end)
}

fn strip_delimiter(segment: &[u8]) -> &[u8] {
    let trimmed = segment.trim_ascii();
    if let Some(rest) = trimmed.strip_prefix(DELIMITER) {
        rest
    } else if DELIMITER.starts_with(trimmed) {
        &[]
    } else {
        trimmed
    }
}

fn dispatch(segment: &[u8]) -> Vec<StreamItem> {
    let text = String::from_utf8_lossy(segment);
    let text = text.trim();

    match parse_event(text) {
        Ok(item) => item.into_iter().collect(),
        // events written back to back without a line break
        Err(_) if text.contains(DELIMITER_TEXT) => text
            .split(DELIMITER_TEXT)
            .filter_map(|piece| {
                let piece = piece.trim();
                parse_event(piece).unwrap_or_else(|e| Some(malformed(piece, &e)))
            })
            .collect(),
        Err(e) => vec![malformed(text, &e)],
    }
}

fn parse_event(text: &str) -> Result<Option<StreamItem>, serde_json::Error> {
    match text {
        "" => Ok(None),
        END_OF_STREAM => Ok(Some(StreamItem::Done)),
        CONVERSATION_LIMIT => Ok(Some(StreamItem::Failed(ChatError::ConversationLimit(
            CONVERSATION_LIMIT_CODE.to_string(),
        )))),
        _ => Ok(classify_event(&serde_json::from_str::<Value>(text)?)),
    }
}

fn malformed(text: &str, error: &serde_json::Error) -> StreamItem {
    StreamItem::Failed(ChatError::Protocol(format!(
        "malformed event {text:?}: {error}"
    )))
}

fn classify_event(event: &Value) -> Option<StreamItem> {
    let event = event.as_object()?;

    if event.get("action").and_then(Value::as_str) == Some("error") {
        let error_type = event
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let status = event.get("status").and_then(Value::as_u64);

        let error = match status {
            Some(429) if error_type == CONVERSATION_LIMIT_CODE => {
                ChatError::ConversationLimit(error_type)
            }
            Some(429) => ChatError::RateLimited(error_type),
            _ if error_type.is_empty() => ChatError::Protocol(format!(
                "error event without type (status {})",
                status.map_or_else(|| "n/a".to_string(), |s| s.to_string())
            )),
            _ => ChatError::Protocol(error_type),
        };
        return Some(StreamItem::Failed(error));
    }

    match event.get("message").and_then(Value::as_str) {
        Some(message) if !message.is_empty() => Some(StreamItem::Fragment(message.to_string())),
        _ => None,
    }
}
