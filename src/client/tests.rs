// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use super::*;
use crate::connection::ConnectionStatus;
use crate::session::{MessageRole, RecordingReporter};
use crate::transport::{MockConnector, MockRemote, OutboundFrame};
use serde_json::json;
use tokio::time::timeout;

const URL: &str = "ws://localhost:8888/api/log-review/ws/demo";

// ==================== Harness ====================

struct Harness {
    client: ReviewClient,
    remotes: mpsc::UnboundedReceiver<MockRemote>,
    reporter: RecordingReporter,
}

fn harness() -> Harness {
    let (connector, remotes) = MockConnector::channel();
    let reporter = RecordingReporter::new();
    let client = ReviewClient::spawn(ClientConfig::new(URL), connector, Arc::new(reporter.clone()));
    Harness {
        client,
        remotes,
        reporter,
    }
}

impl Harness {
    /// Wait for the client to open its next connection.
    async fn next_remote(&mut self) -> MockRemote {
        timeout(Duration::from_secs(60), self.remotes.recv())
            .await
            .expect("no connection opened")
            .expect("connector dropped")
    }

    /// Whether a connection opens within a minute
    async fn opens_again(&mut self) -> bool {
        timeout(Duration::from_secs(60), self.remotes.recv())
            .await
            .is_ok()
    }

    async fn wait_for(&self, mut pred: impl FnMut(&SessionState) -> bool) -> SessionState {
        let mut rx = self.client.subscribe();
        let state = timeout(Duration::from_secs(1), rx.wait_for(|s| pred(s)))
            .await
            .expect("timed out waiting for state")
            .expect("driver stopped");
        (*state).clone()
    }
}

/// A session whose `start` command has reached the server
async fn started() -> (Harness, MockRemote) {
    let mut h = harness();
    h.client.start();
    let mut remote = h.next_remote().await;
    assert_eq!(remote.url(), URL);
    assert!(remote.open());
    assert_eq!(remote.next_command().await, Some(ClientCommand::Start));
    (h, remote)
}

/// Let the driver drain what is queued without reaching any timer.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

fn assert_close_to(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(100),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

// ==================== Config ====================

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::new(URL);
    assert_eq!(config.endpoint, URL);
    assert_eq!(config.keepalive_interval, Duration::from_secs(30));
    assert_eq!(config.open_timeout, Duration::from_millis(5000));
    assert_eq!(config.policy.max_attempts, 3);
}

#[test]
fn test_client_config_from_settings() {
    let mut settings = Settings::default();
    settings.connection.keepalive_interval_secs = 10;
    settings.connection.max_reconnect_attempts = 5;
    let project = ProjectName::new("demo").unwrap();

    let config = ClientConfig::from_settings(&settings, &project).unwrap();
    assert!(config.endpoint.ends_with("/api/log-review/ws/demo"));
    assert!(config.endpoint.starts_with("ws"));
    assert_eq!(config.keepalive_interval, Duration::from_secs(10));
    assert_eq!(config.policy.max_attempts, 5);
}

// ==================== Session flow ====================

#[tokio::test(start_paused = true)]
async fn test_start_sends_start_after_open() {
    let (h, _remote) = started().await;
    let state = h.wait_for(|s| s.is_loading).await;
    assert_eq!(state.connection_status, ConnectionStatus::Connected);
    assert!(state.messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_streamed_reply_is_assembled() {
    let (h, remote) = started().await;
    remote.push_event(json!({"type": "text", "content": "Hello"}));
    remote.push_event(json!({"type": "text", "content": " world"}));
    remote.push_event(json!({"type": "response_done"}));

    let state = h
        .wait_for(|s| !s.is_loading && !s.messages.is_empty())
        .await;
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].role, MessageRole::Assistant);
    assert_eq!(state.messages[0].content, "Hello world");
    assert!(!state.messages[0].is_streaming);
    assert!(h.reporter.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_server_error_event() {
    let (h, remote) = started().await;
    remote.push_event(json!({"type": "error", "content": "boom"}));

    let state = h.wait_for(|s| !s.is_loading).await;
    let last = state.messages.last().unwrap();
    assert_eq!(last.role, MessageRole::System);
    assert_eq!(last.content, "Error: boom");
    assert_eq!(h.reporter.messages(), vec!["boom"]);
}

#[tokio::test(start_paused = true)]
async fn test_follow_up_after_analysis() {
    let (h, mut remote) = started().await;
    remote.push_event(json!({"type": "text", "content": "Build failed."}));
    remote.push_event(json!({"type": "analysis_complete"}));

    let state = h.wait_for(|s| s.is_complete).await;
    assert!(state.is_loading);
    assert!(!state.accepts_input());

    remote.push_event(json!({"type": "response_done"}));
    h.wait_for(|s| s.accepts_input()).await;

    h.client.send_message("   ");
    h.client.send_message("Which test?");
    assert_eq!(
        remote.next_command().await,
        Some(ClientCommand::Message {
            content: "Which test?".to_string()
        })
    );

    let state = h.wait_for(|s| s.messages.len() == 2).await;
    assert_eq!(state.messages[1].role, MessageRole::User);
    assert!(state.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_send_message_before_connect_is_reported() {
    let h = harness();
    h.client.send_message("hello?");
    settle().await;
    assert_eq!(h.reporter.messages(), vec!["Not connected"]);
    assert!(h.client.snapshot().messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_frame_is_reported() {
    let (h, remote) = started().await;
    let before = h.client.snapshot();
    remote.push_raw("definitely not json");
    remote.push_event(json!({"type": "mystery"}));
    settle().await;

    let reports = h.reporter.messages();
    assert_eq!(reports.len(), 2);
    assert!(reports
        .iter()
        .all(|r| r.starts_with("Failed to parse server message")));
    assert_eq!(h.client.snapshot(), before);
}

// ==================== Timers ====================

#[tokio::test(start_paused = true)]
async fn test_keepalive_ping_every_interval() {
    let (_h, mut remote) = started().await;
    let opened_at = Instant::now();

    assert_eq!(remote.next_command().await, Some(ClientCommand::Ping));
    assert_close_to(opened_at.elapsed(), 30_000);

    remote.push_event(json!({"type": "pong"}));
    assert_eq!(remote.next_command().await, Some(ClientCommand::Ping));
    assert_close_to(opened_at.elapsed(), 60_000);
}

#[tokio::test(start_paused = true)]
async fn test_open_timeout_reports_and_clears_loading() {
    let mut h = harness();
    h.client.start();
    let _remote = h.next_remote().await;

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(h.reporter.messages(), vec!["Connection timeout"]);
    let state = h.client.snapshot();
    assert!(!state.is_loading);
    assert!(state.is_stopped);
    assert_eq!(state.connection_status, ConnectionStatus::Connecting);
}

#[tokio::test(start_paused = true)]
async fn test_start_delivered_after_refused_connect() {
    let mut h = harness();
    h.client.start();
    let first = h.next_remote().await;
    assert!(first.fail("connection refused"));

    let closed_at = Instant::now();
    let mut second = h.next_remote().await;
    assert_close_to(closed_at.elapsed(), 2000);
    assert!(second.open());
    assert_eq!(second.next_command().await, Some(ClientCommand::Start));

    let state = h.wait_for(|s| s.is_loading).await;
    assert!(!state.is_stopped);
    assert_eq!(h.reporter.messages(), vec!["Connection error"]);
}

// ==================== Reconnection ====================

#[tokio::test(start_paused = true)]
async fn test_unexpected_closures_back_off_then_stop() {
    let (mut h, remote) = started().await;
    assert!(remote.close(Some(1006)));

    let mut delays = Vec::new();
    for _ in 0..3 {
        let closed_at = Instant::now();
        let next = h.next_remote().await;
        delays.push(closed_at.elapsed());
        assert!(next.close(Some(1006)));
    }

    assert_close_to(delays[0], 2000);
    assert_close_to(delays[1], 4000);
    assert_close_to(delays[2], 8000);
    assert!(!h.opens_again().await);
    let state = h.client.snapshot();
    assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
    assert!(state.is_stopped);
}

#[tokio::test(start_paused = true)]
async fn test_rejection_close_is_not_retried() {
    let (mut h, remote) = started().await;
    assert!(remote.close(Some(4004)));
    let state = h.wait_for(|s| s.is_stopped).await;
    assert_eq!(state.connection_status, ConnectionStatus::Disconnected);
    assert!(!h.opens_again().await);
}

#[tokio::test(start_paused = true)]
async fn test_completed_session_is_not_retried() {
    let (mut h, remote) = started().await;
    remote.push_event(json!({"type": "analysis_complete"}));
    h.wait_for(|s| s.is_complete).await;
    assert!(remote.close(Some(1006)));
    assert!(!h.opens_again().await);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_reconnects_without_restarting() {
    let (mut h, remote) = started().await;
    assert!(remote.fail("connection reset"));
    h.wait_for(|s| s.connection_status == ConnectionStatus::Disconnected)
        .await;
    assert_eq!(h.reporter.messages(), vec!["Connection error"]);

    let mut next = h.next_remote().await;
    assert!(next.open());
    h.wait_for(|s| s.connection_status == ConnectionStatus::Connected)
        .await;
    settle().await;
    // start is only sent for a consumer-driven start
    assert_eq!(next.try_next_frame(), None);
}

// ==================== Disconnect ====================

#[tokio::test(start_paused = true)]
async fn test_disconnect_closes_transport_and_stops() {
    let (mut h, mut remote) = started().await;
    h.client.disconnect();
    h.client.disconnect();
    h.client.disconnect();

    assert_eq!(remote.next_frame().await, Some(OutboundFrame::Close));
    assert_eq!(remote.next_frame().await, None);
    assert!(!h.opens_again().await);
    assert_eq!(
        h.client.snapshot().connection_status,
        ConnectionStatus::Disconnected
    );
}

#[tokio::test(start_paused = true)]
async fn test_start_after_disconnect_uses_fresh_connection() {
    let (mut h, old) = started().await;
    h.client.disconnect();
    h.client.start();

    let mut fresh = h.next_remote().await;
    // The superseded connection can no longer reach the client
    assert!(!old.open());
    assert!(fresh.open());
    assert_eq!(fresh.next_command().await, Some(ClientCommand::Start));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_transport() {
    let (h, mut remote) = started().await;
    h.client.shutdown().await;
    assert_eq!(remote.next_frame().await, Some(OutboundFrame::Close));
}
