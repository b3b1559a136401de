// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Connection manager state machine
//!
//! Holds at most one transport at a time and drives
//! disconnected -> connecting -> connected, the error side state, and the
//! reconnect schedule. Every method is a synchronous transition that
//! returns the effects to apply; nothing here touches a socket or a timer.

use std::time::Duration;

use super::backoff::ReconnectPolicy;
use super::effect::Effect;
use super::status::ConnectionStatus;
use crate::protocol::{describe_close_code, is_application_rejection, ClientCommand};

/// Phase of the single transport handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportPhase {
    /// No handle
    Idle,
    /// Handle requested, not yet acknowledged
    Opening,
    /// Handle open
    Open,
}

/// Outcome of the reconnection policy for one closure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Reconnect after the delay
    Retry(Duration),
    /// The consumer disconnected on purpose
    ManualDisconnect,
    /// The server closed with an application-level rejection code
    Rejected(u16),
    /// The attempt cap is reached
    Exhausted,
    /// The session already completed
    SessionComplete,
}

/// Connection manager
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    url: String,
    policy: ReconnectPolicy,
    keepalive_interval: Duration,
    status: ConnectionStatus,
    transport: TransportPhase,
    attempts: u32,
    manual_disconnect: bool,
    reconnect_pending: bool,
    keepalive_active: bool,
}

impl ConnectionManager {
    pub fn new(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        keepalive_interval: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            policy,
            keepalive_interval,
            status: ConnectionStatus::Disconnected,
            transport: TransportPhase::Idle,
            attempts: 0,
            manual_disconnect: false,
            reconnect_pending: false,
            keepalive_active: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Reconnection attempts made since the last successful open
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn is_manually_disconnected(&self) -> bool {
        self.manual_disconnect
    }

    /// Whether the transport is open and can carry commands
    pub fn is_open(&self) -> bool {
        self.transport == TransportPhase::Open
    }

    /// Whether a transport was requested but not yet acknowledged
    pub fn is_opening(&self) -> bool {
        self.transport == TransportPhase::Opening
    }

    pub fn is_reconnect_scheduled(&self) -> bool {
        self.reconnect_pending
    }

    /// No transport and no reconnect pending: the machine stays put until
    /// the next `connect`.
    pub fn is_idle(&self) -> bool {
        self.transport == TransportPhase::Idle && !self.reconnect_pending
    }

    pub fn is_keepalive_active(&self) -> bool {
        self.keepalive_active
    }

    /// Whether any timer owned by the manager is armed
    pub fn has_pending_timers(&self) -> bool {
        self.reconnect_pending || self.keepalive_active
    }

    /// Begin a new consumer-driven lifecycle.
    ///
    /// Clears the manual-disconnect flag and the attempt counter so that a
    /// previous disconnect, rejection or exhaustion no longer blocks `connect`.
    pub fn begin_lifecycle(&mut self) -> Vec<Effect> {
        self.manual_disconnect = false;
        self.attempts = 0;
        let mut effects = Vec::new();
        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(Effect::CancelReconnect);
        }
        effects
    }

    /// Request a transport unless one exists or the consumer disconnected.
    pub fn connect(&mut self) -> Vec<Effect> {
        if self.manual_disconnect {
            tracing::debug!("connect ignored after manual disconnect");
            return Vec::new();
        }
        if self.transport != TransportPhase::Idle {
            tracing::debug!(phase = ?self.transport, "connect ignored, transport already exists");
            return Vec::new();
        }

        tracing::debug!(url = %self.url, attempt = self.attempts, "connecting");
        self.transport = TransportPhase::Opening;
        self.status = ConnectionStatus::Connecting;
        vec![Effect::OpenTransport {
            url: self.url.clone(),
        }]
    }

    /// The transport acknowledged the open.
    pub fn on_open(&mut self) -> Vec<Effect> {
        if self.transport != TransportPhase::Opening {
            tracing::debug!(phase = ?self.transport, "ignoring open for unexpected phase");
            return Vec::new();
        }

        tracing::info!(url = %self.url, "connected");
        self.transport = TransportPhase::Open;
        self.status = ConnectionStatus::Connected;
        self.attempts = 0;
        self.manual_disconnect = false;
        self.keepalive_active = true;
        vec![Effect::StartKeepalive(self.keepalive_interval)]
    }

    /// The transport reported an error. A pending reconnect stays scheduled.
    pub fn on_error(&mut self, detail: &str) -> Vec<Effect> {
        tracing::warn!(detail = %detail, "transport error");
        self.status = ConnectionStatus::Error;
        vec![Effect::ReportError("Connection error".to_string())]
    }

    /// The transport closed. `code` is the close code, if the peer sent one.
    pub fn on_close(&mut self, code: Option<u16>, session_complete: bool) -> Vec<Effect> {
        if self.transport == TransportPhase::Idle {
            return Vec::new();
        }

        tracing::info!(
            code = ?code,
            reason = code.map(describe_close_code).unwrap_or("no close frame"),
            "transport closed"
        );
        self.transport = TransportPhase::Idle;
        self.status = ConnectionStatus::Disconnected;

        let mut effects = Vec::new();
        if self.keepalive_active {
            self.keepalive_active = false;
            effects.push(Effect::StopKeepalive);
        }

        match self.decide_reconnect(code, session_complete) {
            ReconnectDecision::Retry(delay) => {
                tracing::info!(
                    attempt = self.attempts,
                    max = self.policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "scheduling reconnect"
                );
                self.reconnect_pending = true;
                effects.push(Effect::ScheduleReconnect(delay));
            }
            ReconnectDecision::Rejected(code) => {
                tracing::warn!(
                    code,
                    reason = describe_close_code(code),
                    "server rejected session, not reconnecting"
                );
            }
            decision => {
                tracing::debug!(?decision, "not reconnecting");
            }
        }
        effects
    }

    /// Apply the reconnection policy. Increments the attempt counter on retry.
    fn decide_reconnect(
        &mut self,
        code: Option<u16>,
        session_complete: bool,
    ) -> ReconnectDecision {
        if self.manual_disconnect {
            return ReconnectDecision::ManualDisconnect;
        }
        if let Some(code) = code.filter(|c| is_application_rejection(*c)) {
            return ReconnectDecision::Rejected(code);
        }
        if !self.policy.allows_attempt(self.attempts) {
            return ReconnectDecision::Exhausted;
        }
        if session_complete {
            return ReconnectDecision::SessionComplete;
        }

        self.attempts += 1;
        ReconnectDecision::Retry(self.policy.delay_for_attempt(self.attempts))
    }

    /// The reconnect timer fired.
    pub fn on_reconnect_due(&mut self) -> Vec<Effect> {
        if !self.reconnect_pending {
            return Vec::new();
        }
        self.reconnect_pending = false;
        self.connect()
    }

    /// The keepalive timer fired.
    pub fn on_keepalive_tick(&mut self) -> Vec<Effect> {
        if self.transport == TransportPhase::Open {
            vec![Effect::Send(ClientCommand::Ping)]
        } else {
            Vec::new()
        }
    }

    /// Stop the machine: no reconnects until a new lifecycle begins.
    ///
    /// Idempotent; safe before any connect.
    pub fn disconnect(&mut self) -> Vec<Effect> {
        self.manual_disconnect = true;
        self.attempts = self.policy.max_attempts;

        let mut effects = Vec::new();
        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(Effect::CancelReconnect);
        }
        if self.keepalive_active {
            self.keepalive_active = false;
            effects.push(Effect::StopKeepalive);
        }
        if self.transport != TransportPhase::Idle {
            tracing::info!(url = %self.url, "disconnecting");
            self.transport = TransportPhase::Idle;
            effects.push(Effect::CloseTransport);
        }
        self.status = ConnectionStatus::Disconnected;
        effects
    }
}
