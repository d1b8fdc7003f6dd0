// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;
use duckchat::error::{ChatError, DuckChatError};

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: DuckChatError = io_error.into();

    match error {
        DuckChatError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_chat_error_conversion_keeps_message() {
    let error: DuckChatError = ChatError::Timeout("https://duckduckgo.com/ deadline".into()).into();
    assert_eq!(
        error.to_string(),
        "Request timed out: https://duckduckgo.com/ deadline"
    );
    assert!(matches!(error, DuckChatError::Chat(ChatError::Timeout(_))));
}

#[test]
fn test_config_error_display() {
    let error = DuckChatError::Config("settings file not found".to_string());
    assert_eq!(
        error.to_string(),
        "Configuration error: settings file not found"
    );
}

#[test]
fn test_rate_limited_display() {
    let error = ChatError::RateLimited("https://duckduckgo.com/duckchat/v1/chat 429 Ratelimit".into());
    assert_eq!(
        error.to_string(),
        "Rate limited: https://duckduckgo.com/duckchat/v1/chat 429 Ratelimit"
    );
}

#[test]
fn test_conversation_limit_display() {
    let error = ChatError::ConversationLimit("ERR_CONVERSATION_LIMIT".into());
    assert_eq!(
        error.to_string(),
        "Conversation limit reached: ERR_CONVERSATION_LIMIT"
    );
}

#[test]
fn test_retryable_kinds() {
    assert!(ChatError::RateLimited(String::new()).is_retryable());
    assert!(ChatError::Timeout(String::new()).is_retryable());
    assert!(!ChatError::Client(String::new()).is_retryable());
    assert!(!ChatError::ConversationLimit(String::new()).is_retryable());
    assert!(!ChatError::Protocol(String::new()).is_retryable());
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: DuckChatError = json_error.into();
    assert!(error.to_string().starts_with("JSON error:"));
}
