// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation cache file
//!
//! Holds one `SessionSnapshot` as pretty-printed JSON so a conversation can
//! be resumed with `chat --load`.

use std::path::{Path, PathBuf};

use crate::chat::SessionSnapshot;
use crate::error::Result;

/// File-backed store for a single conversation
#[derive(Debug, Clone)]
pub struct ConversationCache {
    path: PathBuf,
}

impl ConversationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the saved conversation; `None` when nothing was saved yet
    pub fn load(&self) -> Result<Option<SessionSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let snapshot: SessionSnapshot = serde_json::from_str(&content)?;
        tracing::debug!(
            target: "duckchat.client",
            path = %self.path.display(),
            messages = snapshot.history.len(),
            "conversation loaded"
        );
        Ok(Some(snapshot))
    }

    /// Overwrite the file with the given conversation
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Delete the file if present
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatMessage, Session};
    use crate::error::DuckChatError;
    use tempfile::TempDir;

    fn snapshot() -> SessionSnapshot {
        let mut session = Session::new();
        session.set_tokens("vqd-1", "hash-1");
        session.push_user("What is Rust?");
        session.push_assistant("A systems language.");
        session.snapshot()
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let cache = ConversationCache::new(dir.path().join("duckai_chat.json"));
        assert!(!cache.exists());
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let cache = ConversationCache::new(dir.path().join("duckai_chat.json"));
        let saved = snapshot();

        cache.save(&saved).unwrap();
        let loaded = cache.load().unwrap().unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.history[1], ChatMessage::assistant("A systems language."));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let cache = ConversationCache::new(dir.path().join("nested/deeper/chat.json"));
        cache.save(&snapshot()).unwrap();
        assert!(cache.exists());
    }

    #[test]
    fn test_file_uses_cache_keys() {
        let dir = TempDir::new().unwrap();
        let cache = ConversationCache::new(dir.path().join("chat.json"));
        cache.save(&snapshot()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(raw["vqd"], "vqd-1");
        assert_eq!(raw["vqd_hash"], "hash-1");
        assert!(raw["tokens"].as_u64().unwrap() > 0);
        assert_eq!(raw["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConversationCache::new(&path).load().unwrap_err();
        assert!(matches!(err, DuckChatError::Json(_)));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let cache = ConversationCache::new(dir.path().join("chat.json"));
        cache.save(&snapshot()).unwrap();
        cache.clear().unwrap();
        assert!(!cache.exists());
        cache.clear().unwrap();
    }
}
