// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Transport layer
//!
//! A [`Transport`] is the client's handle on one connection: an outbound
//! frame queue and an inbound signal stream. It knows nothing about the
//! review protocol or reconnection. Each connection gets fresh channels, so
//! dropping a transport also discards anything its connection still emits.

pub mod mock;
pub mod websocket;

use tokio::sync::mpsc;

pub use mock::{MockConnector, MockRemote};
pub use websocket::WebSocketConnector;

/// Signal delivered by a connection, in delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// Handshake finished
    Opened,
    /// Text frame
    Frame(String),
    /// Transport-level failure; a `Closed` follows
    Error(String),
    /// Connection closed. `code` is absent when no close frame arrived.
    Closed { code: Option<u16> },
}

/// Frame queued for the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close,
}

/// Client side of a connection
#[derive(Debug)]
pub struct Transport {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    inbound: mpsc::UnboundedReceiver<TransportSignal>,
}

/// Connection side of a [`Transport`]
#[derive(Debug)]
pub struct RemoteEnd {
    pub outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    pub inbound: mpsc::UnboundedSender<TransportSignal>,
}

impl RemoteEnd {
    /// Deliver a signal. Returns false once the transport was dropped.
    pub fn signal(&self, signal: TransportSignal) -> bool {
        self.inbound.send(signal).is_ok()
    }
}

impl Transport {
    /// Create a transport together with the end a connection task drives.
    pub fn pair() -> (Transport, RemoteEnd) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        (
            Transport {
                outbound: out_tx,
                inbound: in_rx,
            },
            RemoteEnd {
                outbound: out_rx,
                inbound: in_tx,
            },
        )
    }

    /// Queue a text frame. Returns false if the connection is gone.
    pub fn send_text(&self, text: String) -> bool {
        self.outbound.send(OutboundFrame::Text(text)).is_ok()
    }

    /// Ask the connection to close.
    pub fn close(&self) {
        let _ = self.outbound.send(OutboundFrame::Close);
    }

    /// Next signal, or `None` once the connection task is gone.
    pub async fn recv(&mut self) -> Option<TransportSignal> {
        self.inbound.recv().await
    }
}

/// Opens transports. `open` must not block: the handshake runs in the
/// background and is reported through [`TransportSignal::Opened`].
pub trait Connector: Send + 'static {
    fn open(&self, url: &str) -> Transport;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_delivers_both_ways() {
        let (mut transport, mut remote) = Transport::pair();

        assert!(transport.send_text("hello".to_string()));
        assert_eq!(
            remote.outbound.recv().await,
            Some(OutboundFrame::Text("hello".to_string()))
        );

        assert!(remote.signal(TransportSignal::Opened));
        assert_eq!(transport.recv().await, Some(TransportSignal::Opened));
    }

    #[tokio::test]
    async fn test_dropped_transport_discards_signals() {
        let (transport, remote) = Transport::pair();
        drop(transport);
        assert!(!remote.signal(TransportSignal::Frame("late".to_string())));
    }

    #[tokio::test]
    async fn test_recv_ends_when_remote_dropped() {
        let (mut transport, remote) = Transport::pair();
        drop(remote);
        assert_eq!(transport.recv().await, None);
        assert!(!transport.send_text("nobody".to_string()));
    }
}
