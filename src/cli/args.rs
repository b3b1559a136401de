// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for logreview.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::protocol::ProjectName;

/// logreview - interactive AI review of a project's logs
#[derive(Parser, Debug)]
#[command(name = "logreview")]
#[command(version, about = "Interactive AI review of a project's logs")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to ~/.logreview/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Review server base URL (overrides settings and LOGREVIEW_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Log verbosity: -v for connection lifecycle, -vv adds every frame
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive log review session
    Review(ReviewArgs),

    /// Show the server-side session status for a project
    Status(ProjectArgs),

    /// Cancel the server-side session for a project
    Cancel(ProjectArgs),

    /// Inspect or initialize settings
    #[command(alias = "config")]
    Settings(SettingsArgs),
}

/// Arguments for the review command
#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Project whose logs to review
    pub project: ProjectName,

    /// Ask this follow-up automatically once the analysis completes
    #[arg(short, long)]
    pub ask: Vec<String>,

    /// Leave as soon as the analysis (and any --ask questions) finish
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments naming a project
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project name
    pub project: ProjectName,
}

/// Arguments for settings command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommands>,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the effective configuration
    Show,

    /// Print the settings file path
    Path,

    /// Write default settings to the settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}
