// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Connection lifecycle
//!
//! The [`ConnectionManager`] owns the transport phase and decides, on every
//! closure, whether to retry. It performs no IO: each transition returns the
//! [`Effect`]s the client driver must carry out.

pub mod backoff;
pub mod effect;
pub mod manager;
pub mod status;

pub use backoff::ReconnectPolicy;
pub use effect::Effect;
pub use manager::{ConnectionManager, ReconnectDecision};
pub use status::ConnectionStatus;
