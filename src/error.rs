// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for logreview
//!
//! The connection core never returns these: it reports failures through the
//! [`ErrorReporter`](crate::session::ErrorReporter) collaborator. They are
//! used by configuration, the REST client, the CLI and protocol parsing.

use thiserror::Error;

/// Main error type for logreview operations
#[derive(Error, Debug)]
pub enum ReviewError {
    /// REST API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The session stopped for good before it could finish
    #[error("Connection error: {0}")]
    Connection(String),

    /// Wire protocol errors (malformed or unknown payloads)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Session REST API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// No active review session exists for the project
    #[error("No active log review session for project '{0}'")]
    SessionNotFound(String),

    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for logreview operations
pub type Result<T> = std::result::Result<T, ReviewError>;
