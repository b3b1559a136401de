// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for logreview
//!
//! Settings are read from ~/.logreview/settings.json

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod io;
mod validation;

/// Main settings structure, stored in ~/.logreview/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Review server location
    #[serde(default)]
    pub server: ServerConfig,

    /// Connection lifecycle tuning (keepalive, reconnect backoff, open timeout)
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// Review server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the server hosting the review API.
    /// Its scheme picks the websocket scheme (https -> wss, http -> ws).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Command-line override; never written to disk
    #[serde(skip)]
    pub override_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            override_url: None,
        }
    }
}

/// Connection lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Seconds between keepalive pings while the transport is open
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,

    /// Automatic reconnection attempts before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Base delay in milliseconds for exponential backoff
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (cap for backoff)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Jitter percentage (0.0 to 1.0) for randomizing delays
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// How long `start` waits for the transport to open before giving up
    #[serde(default = "default_open_timeout_ms")]
    pub open_timeout_ms: u64,

    /// Timeout for REST session API requests
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval_secs: default_keepalive_interval_secs(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
            open_timeout_ms: default_open_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ConnectionConfig {
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_secs)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_keepalive_interval_secs() -> u64 {
    30
}

fn default_max_reconnect_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_jitter() -> f64 {
    0.0
}

// 50 open checks, 100ms apart
fn default_open_timeout_ms() -> u64 {
    5000
}

fn default_request_timeout_secs() -> u64 {
    30
}
