// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::time::Duration;

use crate::protocol::ClientCommand;

/// Side effect requested by a lifecycle transition.
///
/// Effects are returned in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a new transport to `url`, replacing any previous one
    OpenTransport { url: String },
    /// Close the live transport
    CloseTransport,
    /// Send a command over the live transport
    Send(ClientCommand),
    /// Start the periodic keepalive timer
    StartKeepalive(Duration),
    /// Stop the keepalive timer
    StopKeepalive,
    /// Arm the reconnect timer
    ScheduleReconnect(Duration),
    /// Disarm the reconnect timer
    CancelReconnect,
    /// Arm the timer bounding how long `start` waits for the transport to open
    ArmOpenTimeout(Duration),
    /// Disarm the open timer
    CancelOpenTimeout,
    /// Hand a message to the error-reporting collaborator
    ReportError(String),
}
