// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Messages in the session log

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "you",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// A message in the session log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Unique ID, generated locally
    pub id: Uuid,
    /// Role (user, assistant, system)
    pub role: MessageRole,
    /// Text content
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Whether more chunks for this assistant turn are still arriving
    pub is_streaming: bool,
}

impl Message {
    fn new(role: MessageRole, content: String, is_streaming: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            is_streaming,
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), false)
    }

    /// Create a streaming assistant message seeded with its first chunk
    pub fn assistant_streaming(first_chunk: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, first_chunk.into(), true)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content.into(), false)
    }

    /// Append content to a streaming message
    pub fn append_content(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Mark streaming as complete
    pub fn finish_streaming(&mut self) {
        self.is_streaming = false;
    }
}
