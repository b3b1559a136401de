// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use logreview::cli::{OutputFormat, ReviewArgs};
use logreview::client::{ClientConfig, ReviewClient};
use logreview::config::Settings;
use logreview::connection::ConnectionStatus;
use logreview::error::{Result, ReviewError};
use logreview::session::{ErrorReporter, MessageRole, SessionState};
use logreview::transport::WebSocketConnector;

const QUIT_COMMAND: &str = "/quit";

/// Run an interactive review session until the user leaves.
pub(super) async fn run_review(
    args: ReviewArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let config = ClientConfig::from_settings(settings, &args.project)?;
    tracing::info!(endpoint = %config.endpoint, "starting review");

    let client = ReviewClient::spawn(config, WebSocketConnector, stderr_reporter());
    let mut updates = client.subscribe();
    let mut printer = TranscriptPrinter::new(format == OutputFormat::Text);
    let mut stdout = io::stdout();

    let mut lines = if args.no_input {
        None
    } else {
        Some(BufReader::new(tokio::io::stdin()).lines())
    };
    let mut questions: VecDeque<String> = args.ask.into_iter().collect();
    let mut state = client.snapshot();
    let mut prompted = false;
    let mut gate = TurnGate::default();

    client.start();

    loop {
        if state.is_stopped {
            break;
        }

        if gate.is_open(&state) {
            if let Some(question) = questions.pop_front() {
                printer.echo_user(&mut stdout, &question)?;
                client.send_message(question);
                gate.sent();
                prompted = false;
            } else if lines.is_none() {
                break;
            } else if !prompted {
                printer.prompt(&mut stdout)?;
                prompted = true;
            }
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                state = updates.borrow_and_update().clone();
                gate.observed();
                printer.render(&mut stdout, &state)?;
            }
            line = next_line(&mut lines) => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line == QUIT_COMMAND {
                        break;
                    }
                    if line.is_empty() {
                        prompted = false;
                    } else if gate.is_open(&state) {
                        client.send_message(line);
                        gate.sent();
                        prompted = false;
                    } else {
                        printer.notice(&mut stdout, "Still working, wait for the reply to finish.")?;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let ended_early = state.is_stopped && !state.is_complete;
    client.disconnect();
    client.shutdown().await;
    let final_state = updates.borrow().clone();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&final_state)?);
    } else {
        writeln!(stdout)?;
    }

    if ended_early {
        return Err(ReviewError::Connection(
            "session ended before the analysis completed".to_string(),
        ));
    }
    Ok(())
}

async fn next_line(lines: &mut Option<Lines<BufReader<Stdin>>>) -> io::Result<Option<String>> {
    match lines {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

/// Decides when the next question may go out.
///
/// After a send the local snapshot is stale until the driver publishes
/// again. A send the driver refuses (the transport closed in between) comes
/// after a publish of that closure, so the next update always reopens the
/// gate.
#[derive(Debug, Default)]
pub(super) struct TurnGate {
    awaiting_update: bool,
}

impl TurnGate {
    pub(super) fn is_open(&self, state: &SessionState) -> bool {
        !self.awaiting_update && state.accepts_input()
    }

    pub(super) fn sent(&mut self) {
        self.awaiting_update = true;
    }

    pub(super) fn observed(&mut self) {
        self.awaiting_update = false;
    }
}

fn stderr_reporter() -> Arc<dyn ErrorReporter> {
    Arc::new(|message: &str| {
        let mut stderr = io::stderr();
        let _ = stderr.execute(SetForegroundColor(Color::Red));
        eprint!("error:");
        let _ = stderr.execute(ResetColor);
        eprintln!(" {}", message);
    })
}

/// Prints the session log incrementally as snapshots arrive.
///
/// User messages are not printed here: they were typed at the prompt or
/// echoed when sent.
pub(super) struct TranscriptPrinter {
    enabled: bool,
    /// Messages printed in full
    printed: usize,
    /// Bytes already printed of the trailing streaming message
    partial: Option<usize>,
    last_status: Option<ConnectionStatus>,
}

impl TranscriptPrinter {
    pub(super) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            printed: 0,
            partial: None,
            last_status: None,
        }
    }

    pub(super) fn render<W: Write>(&mut self, out: &mut W, state: &SessionState) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        while self.printed < state.messages.len() {
            let message = &state.messages[self.printed];
            let is_last = self.printed + 1 == state.messages.len();
            let visible = message.role != MessageRole::User;

            if visible {
                let start = match self.partial {
                    Some(start) => start,
                    None => {
                        let color = match message.role {
                            MessageRole::System => Color::Red,
                            _ => Color::Cyan,
                        };
                        writeln!(out)?;
                        out.execute(SetForegroundColor(color))?;
                        write!(out, "{}:", message.role.label())?;
                        out.execute(ResetColor)?;
                        write!(out, " ")?;
                        0
                    }
                };
                write!(out, "{}", &message.content[start..])?;
            }

            if message.is_streaming && is_last {
                self.partial = Some(message.content.len());
                break;
            }

            if visible {
                writeln!(out)?;
            }
            self.printed += 1;
            self.partial = None;
        }

        // Status changes wait until no message is mid-stream
        if self.partial.is_none() && self.last_status != Some(state.connection_status) {
            if self.last_status.is_some() || state.connection_status != ConnectionStatus::Disconnected {
                self.notice(out, &format!("[{}]", state.connection_status.label()))?;
            }
            self.last_status = Some(state.connection_status);
        }

        out.flush()
    }

    pub(super) fn echo_user<W: Write>(&mut self, out: &mut W, content: &str) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        writeln!(out)?;
        out.execute(SetForegroundColor(Color::Green))?;
        write!(out, "{}:", MessageRole::User.label())?;
        out.execute(ResetColor)?;
        writeln!(out, " {}", content)?;
        out.flush()
    }

    pub(super) fn prompt<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        writeln!(out)?;
        out.execute(SetForegroundColor(Color::Green))?;
        write!(out, "{}:", MessageRole::User.label())?;
        out.execute(ResetColor)?;
        write!(out, " ")?;
        out.flush()
    }

    pub(super) fn notice<W: Write>(&mut self, out: &mut W, text: &str) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        out.execute(SetForegroundColor(Color::DarkGrey))?;
        write!(out, "{}", text)?;
        out.execute(ResetColor)?;
        writeln!(out)?;
        out.flush()
    }
}
