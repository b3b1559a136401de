// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session controller
//!
//! Translates inbound events into message-log mutations and gates outbound
//! commands on the connection and session phase. Like the connection
//! manager it owns, every method is a synchronous transition returning the
//! effects the driver must apply.

use std::time::Duration;

use super::message::Message;
use super::state::SessionState;
use crate::connection::{ConnectionManager, Effect};
use crate::protocol::{ClientCommand, ServerEvent};

/// Session controller
#[derive(Debug, Clone)]
pub struct SessionController {
    connection: ConnectionManager,
    state: SessionState,
    open_timeout: Duration,
    /// `start` is waiting for the transport to open
    awaiting_open: bool,
    /// `start` has been called at least once
    started: bool,
    /// The last `start` gave up before reaching the server
    start_abandoned: bool,
}

impl SessionController {
    pub fn new(connection: ConnectionManager, open_timeout: Duration) -> Self {
        let state = SessionState {
            connection_status: connection.status(),
            ..SessionState::default()
        };
        Self {
            connection,
            state,
            open_timeout,
            awaiting_open: false,
            started: false,
            start_abandoned: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Whether a `start` command is queued behind the transport opening
    pub fn is_awaiting_open(&self) -> bool {
        self.awaiting_open
    }

    /// Connect and send `start` once the transport is open.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = self.connection.begin_lifecycle();
        self.started = true;
        self.start_abandoned = false;

        if self.connection.is_open() {
            self.send_start(&mut effects);
        } else {
            effects.extend(self.connection.connect());
            if self.connection.is_opening() {
                tracing::debug!(
                    timeout_ms = self.open_timeout.as_millis() as u64,
                    "waiting for transport before start"
                );
                self.awaiting_open = true;
                effects.push(Effect::ArmOpenTimeout(self.open_timeout));
            }
        }

        self.sync_status();
        effects
    }

    /// Send a follow-up question.
    pub fn send_message(&mut self, content: &str) -> Vec<Effect> {
        let content = content.trim();
        if content.is_empty() {
            return Vec::new();
        }
        if !self.connection.is_open() {
            tracing::debug!("message dropped, transport not open");
            return vec![Effect::ReportError("Not connected".to_string())];
        }

        self.state.push_message(Message::user(content));
        self.state.is_loading = true;
        vec![Effect::Send(ClientCommand::Message {
            content: content.to_string(),
        })]
    }

    pub fn on_transport_open(&mut self) -> Vec<Effect> {
        let mut effects = self.connection.on_open();
        if self.awaiting_open && self.connection.is_open() {
            self.awaiting_open = false;
            effects.push(Effect::CancelOpenTimeout);
            self.send_start(&mut effects);
        }
        self.sync_status();
        effects
    }

    /// The transport closed. A pending `start` rides along to the
    /// reconnect, unless there is none.
    pub fn on_transport_close(&mut self, code: Option<u16>) -> Vec<Effect> {
        let mut effects = self.connection.on_close(code, self.state.is_complete);
        if self.awaiting_open && !self.connection.is_reconnect_scheduled() {
            tracing::debug!(code = ?code, "start abandoned, transport closed for good");
            effects.extend(self.cancel_open_wait());
            self.start_abandoned = true;
        }
        self.sync_status();
        effects
    }

    /// Transport error. The closure that follows decides what happens next.
    pub fn on_transport_error(&mut self, detail: &str) -> Vec<Effect> {
        let effects = self.connection.on_error(detail);
        self.sync_status();
        effects
    }

    /// The open timeout expired.
    pub fn on_open_timeout(&mut self) -> Vec<Effect> {
        if !self.awaiting_open {
            return Vec::new();
        }
        self.awaiting_open = false;
        self.start_abandoned = true;

        tracing::warn!(url = %self.connection.url(), "transport did not open in time");
        self.state.is_loading = false;
        self.sync_status();
        vec![Effect::ReportError("Connection timeout".to_string())]
    }

    pub fn on_reconnect_due(&mut self) -> Vec<Effect> {
        let effects = self.connection.on_reconnect_due();
        self.sync_status();
        effects
    }

    pub fn on_keepalive_tick(&mut self) -> Vec<Effect> {
        self.connection.on_keepalive_tick()
    }

    /// Dispatch one inbound text frame.
    pub fn on_frame(&mut self, frame: &str) -> Vec<Effect> {
        match ServerEvent::parse(frame) {
            Ok(event) => self.on_event(event),
            Err(e) => {
                tracing::warn!(error = %e, "dropping server frame");
                vec![Effect::ReportError(format!(
                    "Failed to parse server message: {}",
                    e
                ))]
            }
        }
    }

    pub fn on_event(&mut self, event: ServerEvent) -> Vec<Effect> {
        tracing::debug!(?event, "server event");
        match event {
            ServerEvent::Text { content } => {
                self.state.append_chunk(&content);
                Vec::new()
            }
            ServerEvent::AnalysisComplete => {
                // Loading stays on until response_done; content may still be streaming
                self.state.is_complete = true;
                Vec::new()
            }
            ServerEvent::Error { content } => {
                let content = if content.is_empty() {
                    "Unknown error".to_string()
                } else {
                    content
                };
                self.state.is_loading = false;
                self.state
                    .push_message(Message::system(format!("Error: {}", content)));
                vec![Effect::ReportError(content)]
            }
            ServerEvent::ResponseDone => {
                self.state.is_loading = false;
                self.state.finish_streaming();
                Vec::new()
            }
            ServerEvent::Pong => Vec::new(),
        }
    }

    /// Stop everything. Idempotent.
    pub fn disconnect(&mut self) -> Vec<Effect> {
        let mut effects = self.cancel_open_wait();
        effects.extend(self.connection.disconnect());
        self.sync_status();
        effects
    }

    fn send_start(&mut self, effects: &mut Vec<Effect>) {
        tracing::debug!("sending start");
        self.state.is_loading = true;
        effects.push(Effect::Send(ClientCommand::Start));
    }

    fn cancel_open_wait(&mut self) -> Vec<Effect> {
        if self.awaiting_open {
            self.awaiting_open = false;
            vec![Effect::CancelOpenTimeout]
        } else {
            Vec::new()
        }
    }

    fn sync_status(&mut self) {
        self.state.connection_status = self.connection.status();
        self.state.is_stopped =
            self.started && (self.start_abandoned || self.connection.is_idle());
    }
}
