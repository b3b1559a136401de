// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! logreview - client for interactive AI log review sessions.
//!
//! This crate exposes the session core used by the `logreview` CLI
//! (`src/main.rs`) and by anything else that wants to drive a review
//! session over the server's websocket.
//!
//! Architecture highlights:
//! - `connection`: connection lifecycle state machine (keepalive, backoff, rejection codes)
//! - `session`: message log, inbound event dispatch and input gating
//! - `client`: tokio driver that executes the state machines' effects
//! - `transport`: websocket connector plus a mock connector for tests
//! - `protocol`: JSON wire format and endpoint URLs
//! - `api`: REST calls for session status and cancellation

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use error::{Result, ReviewError};
