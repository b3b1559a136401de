// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};
use std::path::Path;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use logreview::api::{CancelResponse, ReviewApi, SessionStatus};
use logreview::cli::{OutputFormat, SettingsArgs, SettingsCommands};
use logreview::config::Settings;
use logreview::error::{Result, ReviewError};
use logreview::protocol::ProjectName;

fn api_client(settings: &Settings) -> Result<ReviewApi> {
    ReviewApi::new(
        settings.server_url()?,
        settings.connection.request_timeout(),
    )
}

/// Show the server-side session for a project
pub(super) async fn run_status_command(
    project: &ProjectName,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let status = api_client(settings)?.session_status(project).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => print_status(&mut io::stdout(), &status)?,
    }
    Ok(())
}

/// Cancel the server-side session for a project
pub(super) async fn run_cancel_command(
    project: &ProjectName,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let response = api_client(settings)?.cancel_session(project).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => print_cancel(&mut io::stdout(), project, &response)?,
    }
    Ok(())
}

pub(super) fn print_status<W: Write>(out: &mut W, status: &SessionStatus) -> io::Result<()> {
    writeln!(out, "Project:  {}", status.project_name)?;
    writeln!(out, "Active:   {}", yes_no(status.is_active))?;
    writeln!(out, "Complete: {}", yes_no(status.is_complete))?;
    writeln!(out, "Messages: {}", status.message_count)?;
    Ok(())
}

pub(super) fn print_cancel<W: Write>(
    out: &mut W,
    project: &ProjectName,
    response: &CancelResponse,
) -> io::Result<()> {
    if response.success {
        out.execute(SetForegroundColor(Color::Green))?;
        write!(out, "✓")?;
    } else {
        out.execute(SetForegroundColor(Color::Red))?;
        write!(out, "✗")?;
    }
    out.execute(ResetColor)?;
    writeln!(out, " {} ({})", response.message, project)?;
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Run settings subcommands
pub(super) fn run_settings_command(
    args: SettingsArgs,
    settings: &Settings,
    path: &Path,
) -> Result<()> {
    match args.command {
        None | Some(SettingsCommands::Show) => {
            let json = serde_json::to_string_pretty(settings)?;
            println!("{}", json);
            println!();
            println!("Server: {}", settings.get_server_url());
        }
        Some(SettingsCommands::Path) => {
            println!("{}", path.display());
        }
        Some(SettingsCommands::Init { force }) => {
            init_settings(path, force)?;
            println!("Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}

/// Write default settings, refusing to clobber an existing file unless forced.
pub(super) fn init_settings(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ReviewError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Settings::default().save_to(path)
}
