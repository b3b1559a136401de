// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session state as seen by the UI

use serde::Serialize;

use super::message::Message;
use crate::connection::ConnectionStatus;

/// Conversation state owned by the session controller.
///
/// The UI only ever receives clones of this.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub connection_status: ConnectionStatus,
    pub is_loading: bool,
    pub is_complete: bool,
    /// The session was started and will make no further progress until it
    /// is started again: rejected, out of reconnect attempts, disconnected,
    /// or its `start` never reached the server.
    pub is_stopped: bool,
    pub messages: Vec<Message>,
}

impl SessionState {
    /// Append a streamed chunk to the trailing streaming message, or start a new one.
    pub fn append_chunk(&mut self, chunk: &str) {
        match self.messages.last_mut() {
            Some(last) if last.is_streaming => last.append_content(chunk),
            _ => self.messages.push(Message::assistant_streaming(chunk)),
        }
    }

    /// Freeze the trailing message if it is still streaming.
    ///
    /// Returns whether a message was frozen.
    pub fn finish_streaming(&mut self) -> bool {
        match self.messages.last_mut() {
            Some(last) if last.is_streaming => {
                last.finish_streaming();
                true
            }
            _ => false,
        }
    }

    /// Append a complete (non-streaming) message.
    ///
    /// A streaming message stops being trailing here, so it is frozen first.
    pub fn push_message(&mut self, message: Message) {
        self.finish_streaming();
        self.messages.push(message);
    }

    /// The trailing message, if it is still streaming
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.is_streaming)
    }

    /// Whether follow-up input should be accepted
    pub fn accepts_input(&self) -> bool {
        self.is_complete
            && !self.is_loading
            && self.connection_status == ConnectionStatus::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::MessageRole;

    #[test]
    fn test_first_chunk_creates_streaming_message() {
        let mut state = SessionState::default();
        state.append_chunk("Hello");
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, MessageRole::Assistant);
        assert!(state.messages[0].is_streaming);
    }

    #[test]
    fn test_chunks_append_to_trailing_message() {
        let mut state = SessionState::default();
        state.append_chunk("Hello");
        state.append_chunk(" world");
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, "Hello world");
    }

    #[test]
    fn test_chunk_after_frozen_message_starts_new_one() {
        let mut state = SessionState::default();
        state.append_chunk("first");
        assert!(state.finish_streaming());
        state.append_chunk("second");
        assert_eq!(state.messages.len(), 2);
        assert!(!state.messages[0].is_streaming);
        assert!(state.messages[1].is_streaming);
    }

    #[test]
    fn test_chunk_after_user_message_starts_new_one() {
        let mut state = SessionState::default();
        state.push_message(Message::user("question"));
        state.append_chunk("answer");
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, MessageRole::Assistant);
    }

    #[test]
    fn test_finish_without_streaming_message() {
        let mut state = SessionState::default();
        assert!(!state.finish_streaming());
        state.push_message(Message::user("hi"));
        assert!(!state.finish_streaming());
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_push_message_freezes_streaming_message() {
        let mut state = SessionState::default();
        state.append_chunk("partial");
        state.push_message(Message::system("Error: boom"));
        assert!(!state.messages[0].is_streaming);
        assert!(state.streaming_message().is_none());
    }

    #[test]
    fn test_accepts_input() {
        let mut state = SessionState {
            connection_status: ConnectionStatus::Connected,
            is_complete: true,
            ..SessionState::default()
        };
        assert!(state.accepts_input());
        state.is_loading = true;
        assert!(!state.accepts_input());
        state.is_loading = false;
        state.connection_status = ConnectionStatus::Disconnected;
        assert!(!state.accepts_input());
    }
}
