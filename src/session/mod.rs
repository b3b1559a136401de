// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation state for a log review session
//!
//! The controller owns the connection manager and the message log; the
//! reporter is the only way failures leave the core.

pub mod controller;
pub mod message;
pub mod reporter;
pub mod state;

pub use controller::SessionController;
pub use message::{Message, MessageRole};
pub use reporter::{ErrorReporter, RecordingReporter, TracingReporter};
pub use state::SessionState;
