// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use serde::Serialize;

/// Lifecycle status exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No transport (initial, after closure, after manual disconnect)
    #[default]
    Disconnected,
    /// Transport requested, waiting for the open acknowledgment
    Connecting,
    /// Transport open
    Connected,
    /// The transport reported an error
    Error,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disconnected() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionStatus::Connecting.label(), "connecting");
        assert_eq!(ConnectionStatus::Error.label(), "error");
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_string(&ConnectionStatus::Connected).unwrap();
        assert_eq!(json, "\"connected\"");
    }
}
