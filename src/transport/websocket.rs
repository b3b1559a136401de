// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! WebSocket connector
//!
//! Each `open` spawns one task that performs the handshake, then pumps text
//! frames in both directions until either side closes.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use super::{Connector, OutboundFrame, RemoteEnd, Transport, TransportSignal};

/// Connector backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn open(&self, url: &str) -> Transport {
        let (transport, remote) = Transport::pair();
        tokio::spawn(run_socket(url.to_string(), remote));
        transport
    }
}

async fn run_socket(url: String, remote: RemoteEnd) {
    tracing::debug!(url = %url, "opening websocket");

    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            remote.signal(TransportSignal::Error(format!(
                "WebSocket connect failed: {}",
                e
            )));
            remote.signal(TransportSignal::Closed { code: None });
            return;
        }
    };

    if !remote.signal(TransportSignal::Opened) {
        // Transport dropped while the handshake was running
        return;
    }
    tracing::debug!(url = %url, "websocket open");

    let RemoteEnd {
        mut outbound,
        inbound,
    } = remote;
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(OutboundFrame::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        let _ = inbound.send(TransportSignal::Error(format!("Failed to send: {}", e)));
                        let _ = inbound.send(TransportSignal::Closed { code: None });
                        return;
                    }
                }
                Some(OutboundFrame::Close) | None => {
                    tracing::debug!(url = %url, "closing websocket");
                    let _ = sink.send(Message::Close(None)).await;
                    let _ = sink.close().await;
                    return;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let _ = inbound.send(TransportSignal::Frame(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    tracing::debug!(url = %url, code = ?code, "websocket closed by server");
                    let _ = inbound.send(TransportSignal::Closed { code });
                    return;
                }
                // Pong is handled automatically by tungstenite
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    let _ = inbound.send(TransportSignal::Error(format!("WebSocket error: {}", e)));
                    let _ = inbound.send(TransportSignal::Closed { code: None });
                    return;
                }
                None => {
                    let _ = inbound.send(TransportSignal::Closed { code: None });
                    return;
                }
            },
        }
    }
}
