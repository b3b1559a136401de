// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Wire protocol for the log review websocket
//!
//! Every frame is a JSON object whose `type` field selects the variant.
//!
//! Client -> Server: `ping`, `start`, `message {content}`.
//! Server -> Client: `text {content}`, `analysis_complete`, `response_done`,
//! `error {content}`, `pong`.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewError};

/// Close codes in this range are application-level rejections and must not be retried.
pub const APPLICATION_CLOSE_CODES: RangeInclusive<u16> = 4000..=4999;

/// Server closed the socket because the project name failed validation.
pub const CLOSE_INVALID_PROJECT: u16 = 4000;

/// Server closed the socket because the project is not registered or its directory is gone.
pub const CLOSE_PROJECT_NOT_FOUND: u16 = 4004;

/// Outbound command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Keepalive
    Ping,
    /// Begin analysis for the bound project
    Start,
    /// Follow-up question
    Message { content: String },
}

impl ClientCommand {
    /// Encode as a JSON text frame.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Incremental assistant content chunk
    Text { content: String },
    /// Initial analysis finished; follow-ups are allowed
    AnalysisComplete,
    /// Recoverable, human-readable error
    Error {
        #[serde(default)]
        content: String,
    },
    /// Keepalive acknowledgment
    Pong,
    /// The current turn finished streaming
    ResponseDone,
}

impl ServerEvent {
    /// Decode a text frame. Unknown `type` values and missing fields are errors.
    pub fn parse(frame: &str) -> Result<Self> {
        serde_json::from_str(frame)
            .map_err(|e| ReviewError::Protocol(format!("malformed server event: {}", e)))
    }
}

/// Whether a close code signals "do not retry".
pub fn is_application_rejection(code: u16) -> bool {
    APPLICATION_CLOSE_CODES.contains(&code)
}

/// Human-readable description of the close codes the review server uses.
pub fn describe_close_code(code: u16) -> &'static str {
    match code {
        1000 => "normal closure",
        1001 => "server going away",
        1006 => "abnormal closure",
        1011 => "internal server error",
        CLOSE_INVALID_PROJECT => "invalid project name",
        CLOSE_PROJECT_NOT_FOUND => "project not found",
        c if is_application_rejection(c) => "rejected by server",
        _ => "unexpected closure",
    }
}

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,50}$").unwrap())
}

/// A project identifier accepted by the review server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    /// Validate a project name: 1-50 characters of letters, digits, `_` or `-`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if project_name_pattern().is_match(&name) {
            Ok(Self(name))
        } else {
            Err(ReviewError::InvalidInput(format!(
                "invalid project name '{}': use 1-50 letters, digits, '_' or '-'",
                name
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProjectName {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Append path segments to a base URL, percent-encoding each one.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ReviewError::Config(format!("server URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Websocket endpoint for a project's review session.
///
/// The scheme follows the server base URL: `https` becomes `wss`, `http` becomes `ws`.
pub fn websocket_url(base: &Url, project: &ProjectName) -> Result<Url> {
    let scheme = match base.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ReviewError::Config(format!(
                "unsupported server URL scheme '{}'",
                other
            )))
        }
    };

    let mut url = join_segments(base, &["api", "log-review", "ws", project.as_str()])?;
    url.set_scheme(scheme)
        .map_err(|_| ReviewError::Config(format!("cannot use scheme '{}' for {}", scheme, base)))?;
    Ok(url)
}
