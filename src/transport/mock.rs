// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock connector for testing
//!
//! Every `open` hands a [`MockRemote`] to the test, which then plays the
//! server: acknowledge the open, push events, close with a code, and read
//! back the commands the client sent.

use serde_json::Value;
use tokio::sync::mpsc;

use super::{Connector, OutboundFrame, RemoteEnd, Transport, TransportSignal};
use crate::protocol::ClientCommand;

/// A connector whose connections are driven by the test
#[derive(Debug, Clone)]
pub struct MockConnector {
    remotes: mpsc::UnboundedSender<MockRemote>,
}

impl MockConnector {
    /// Create a connector and the stream of remotes it will produce, one per `open`.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MockRemote>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { remotes: tx }, rx)
    }
}

impl Connector for MockConnector {
    fn open(&self, url: &str) -> Transport {
        let (transport, end) = Transport::pair();
        let _ = self.remotes.send(MockRemote {
            url: url.to_string(),
            end,
        });
        transport
    }
}

/// Server side of one mock connection
#[derive(Debug)]
pub struct MockRemote {
    url: String,
    end: RemoteEnd,
}

impl MockRemote {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Acknowledge the handshake.
    pub fn open(&self) -> bool {
        self.end.signal(TransportSignal::Opened)
    }

    /// Push a JSON event.
    pub fn push_event(&self, event: Value) -> bool {
        self.end.signal(TransportSignal::Frame(event.to_string()))
    }

    /// Push a raw text frame, valid or not.
    pub fn push_raw(&self, frame: &str) -> bool {
        self.end.signal(TransportSignal::Frame(frame.to_string()))
    }

    /// Close the connection, optionally with a close code.
    pub fn close(&self, code: Option<u16>) -> bool {
        self.end.signal(TransportSignal::Closed { code })
    }

    /// Fail the connection: an error followed by a close without code.
    pub fn fail(&self, detail: &str) -> bool {
        self.end.signal(TransportSignal::Error(detail.to_string()))
            && self.end.signal(TransportSignal::Closed { code: None })
    }

    /// Next frame the client queued, or `None` once the client dropped the transport.
    pub async fn next_frame(&mut self) -> Option<OutboundFrame> {
        self.end.outbound.recv().await
    }

    /// Next command the client sent. `None` on close or when the transport is gone.
    pub async fn next_command(&mut self) -> Option<ClientCommand> {
        match self.next_frame().await? {
            OutboundFrame::Text(text) => serde_json::from_str(&text).ok(),
            OutboundFrame::Close => None,
        }
    }

    /// Frame already queued by the client, without waiting.
    pub fn try_next_frame(&mut self) -> Option<OutboundFrame> {
        self.end.outbound.try_recv().ok()
    }
}
