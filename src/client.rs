// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Review client
//!
//! Runs a [`SessionController`] on a single tokio task. User requests,
//! transport signals and timers are all serialized through one `select!`
//! loop, which applies the controller's effects and publishes a snapshot of
//! the session state after every step.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::config::{ConnectionConfig, Settings};
use crate::connection::{ConnectionManager, Effect, ReconnectPolicy};
use crate::error::Result;
use crate::protocol::{websocket_url, ClientCommand, ProjectName};
use crate::session::{ErrorReporter, SessionController, SessionState};
use crate::transport::{Connector, Transport, TransportSignal};

/// Everything the driver needs to know about one session endpoint
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Websocket URL of the session
    pub endpoint: String,
    pub keepalive_interval: Duration,
    /// How long `start` waits for the transport to open
    pub open_timeout: Duration,
    pub policy: ReconnectPolicy,
}

impl ClientConfig {
    /// Config with default timings for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        let connection = ConnectionConfig::default();
        Self {
            endpoint: endpoint.into(),
            keepalive_interval: connection.keepalive_interval(),
            open_timeout: connection.open_timeout(),
            policy: ReconnectPolicy::from(&connection),
        }
    }

    /// Config for reviewing `project` on the configured server
    pub fn from_settings(settings: &Settings, project: &ProjectName) -> Result<Self> {
        let endpoint = websocket_url(&settings.server_url()?, project)?;
        let connection = &settings.connection;
        Ok(Self {
            endpoint: endpoint.to_string(),
            keepalive_interval: connection.keepalive_interval(),
            open_timeout: connection.open_timeout(),
            policy: ReconnectPolicy::from(connection),
        })
    }
}

/// Request from a client handle to the driver
#[derive(Debug)]
enum Request {
    Start,
    SendMessage(String),
    Disconnect,
}

/// Handle on a running session.
///
/// Calls return immediately; their results show up in the published state
/// or through the error reporter. Dropping the handle disconnects.
pub struct ReviewClient {
    requests: mpsc::UnboundedSender<Request>,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl ReviewClient {
    /// Spawn the driver task. Nothing connects until [`ReviewClient::start`].
    pub fn spawn<C: Connector>(
        config: ClientConfig,
        connector: C,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let manager =
            ConnectionManager::new(config.endpoint, config.policy, config.keepalive_interval);
        let controller = SessionController::new(manager, config.open_timeout);
        let (state_tx, state_rx) = watch::channel(controller.state().clone());
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            controller,
            connector,
            reporter,
            state_tx,
            transport: None,
            keepalive: None,
            reconnect_at: None,
            open_deadline: None,
        };
        let task = tokio::spawn(driver.run(requests_rx));

        Self {
            requests: requests_tx,
            state: state_rx,
            task,
        }
    }

    /// Connect and begin the analysis.
    pub fn start(&self) {
        self.request(Request::Start);
    }

    /// Send a follow-up question.
    pub fn send_message(&self, content: impl Into<String>) {
        self.request(Request::SendMessage(content.into()));
    }

    /// Close the connection and stop reconnecting. `start` begins again.
    pub fn disconnect(&self) {
        self.request(Request::Disconnect);
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Disconnect and wait for the driver task to finish.
    pub async fn shutdown(self) {
        let Self { requests, task, .. } = self;
        drop(requests);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "session driver ended abnormally");
        }
    }

    fn request(&self, request: Request) {
        if self.requests.send(request).is_err() {
            tracing::debug!("session driver is gone");
        }
    }
}

/// What woke the driver
enum Wake {
    Request(Option<Request>),
    Signal(Option<TransportSignal>),
    Keepalive,
    ReconnectDue,
    OpenTimeout,
}

struct Driver<C> {
    controller: SessionController,
    connector: C,
    reporter: Arc<dyn ErrorReporter>,
    state_tx: watch::Sender<SessionState>,
    transport: Option<Transport>,
    keepalive: Option<Interval>,
    reconnect_at: Option<Instant>,
    open_deadline: Option<Instant>,
}

impl<C: Connector> Driver<C> {
    async fn run(mut self, mut requests: mpsc::UnboundedReceiver<Request>) {
        loop {
            let effects = match self.next_wake(&mut requests).await {
                Wake::Request(Some(Request::Start)) => self.controller.start(),
                Wake::Request(Some(Request::SendMessage(content))) => {
                    self.controller.send_message(&content)
                }
                Wake::Request(Some(Request::Disconnect)) => self.controller.disconnect(),
                Wake::Request(None) => {
                    let effects = self.controller.disconnect();
                    self.apply(effects);
                    self.publish();
                    tracing::debug!("all client handles dropped, driver stopping");
                    return;
                }
                Wake::Signal(Some(signal)) => self.on_signal(signal),
                Wake::Signal(None) => {
                    // Connection task vanished without a close
                    self.transport = None;
                    self.controller.on_transport_close(None)
                }
                Wake::Keepalive => self.controller.on_keepalive_tick(),
                Wake::ReconnectDue => {
                    self.reconnect_at = None;
                    self.controller.on_reconnect_due()
                }
                Wake::OpenTimeout => {
                    self.open_deadline = None;
                    self.controller.on_open_timeout()
                }
            };
            self.apply(effects);
            self.publish();
        }
    }

    async fn next_wake(&mut self, requests: &mut mpsc::UnboundedReceiver<Request>) -> Wake {
        tokio::select! {
            request = requests.recv() => Wake::Request(request),
            signal = recv_signal(self.transport.as_mut()) => Wake::Signal(signal),
            _ = tick(self.keepalive.as_mut()) => Wake::Keepalive,
            _ = sleep_until(self.reconnect_at) => Wake::ReconnectDue,
            _ = sleep_until(self.open_deadline) => Wake::OpenTimeout,
        }
    }

    fn on_signal(&mut self, signal: TransportSignal) -> Vec<Effect> {
        match signal {
            TransportSignal::Opened => self.controller.on_transport_open(),
            TransportSignal::Frame(frame) => {
                tracing::debug!(frame = %frame, "frame received");
                self.controller.on_frame(&frame)
            }
            TransportSignal::Error(detail) => self.controller.on_transport_error(&detail),
            TransportSignal::Closed { code } => {
                self.transport = None;
                self.controller.on_transport_close(code)
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenTransport { url } => {
                    // Replacing the handle drops the old connection and its signals
                    self.transport = Some(self.connector.open(&url));
                }
                Effect::CloseTransport => {
                    if let Some(transport) = self.transport.take() {
                        transport.close();
                    }
                }
                Effect::Send(command) => self.send(&command),
                Effect::StartKeepalive(period) => {
                    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.keepalive = Some(interval);
                }
                Effect::StopKeepalive => self.keepalive = None,
                Effect::ScheduleReconnect(delay) => {
                    self.reconnect_at = Some(Instant::now() + delay);
                }
                Effect::CancelReconnect => self.reconnect_at = None,
                Effect::ArmOpenTimeout(timeout) => {
                    self.open_deadline = Some(Instant::now() + timeout);
                }
                Effect::CancelOpenTimeout => self.open_deadline = None,
                Effect::ReportError(message) => self.reporter.report(&message),
            }
        }
    }

    fn send(&mut self, command: &ClientCommand) {
        let frame = match command.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.reporter.report(&e.to_string());
                return;
            }
        };
        let sent = self
            .transport
            .as_ref()
            .is_some_and(|transport| transport.send_text(frame));
        if sent {
            tracing::debug!(?command, "command sent");
        } else {
            tracing::debug!(?command, "command dropped, no transport");
        }
    }

    fn publish(&self) {
        let current = self.controller.state();
        self.state_tx.send_if_modified(|published| {
            if published == current {
                false
            } else {
                *published = current.clone();
                true
            }
        });
    }
}

async fn recv_signal(transport: Option<&mut Transport>) -> Option<TransportSignal> {
    match transport {
        Some(transport) => transport.recv().await,
        None => std::future::pending().await,
    }
}

async fn tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests;
