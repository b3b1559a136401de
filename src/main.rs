// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! logreview - interactive AI review of a project's logs
//!
//! Entry point for the logreview CLI application.

use clap::Parser;

use logreview::cli::{Cli, Commands};
use logreview::config::Settings;
use logreview::error::Result;

#[path = "main/cli_commands.rs"]
mod cli_commands;
#[path = "main/review_loop.rs"]
mod review_loop;

use cli_commands::{run_cancel_command, run_settings_command, run_status_command};
use review_loop::run_review;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    for directive in log_directives(cli.verbose) {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load settings
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_from(&settings_path)?;
    if let Some(server) = &cli.server {
        settings.server.override_url = Some(server.clone());
    }

    // Dispatch to appropriate command
    match cli.command {
        Commands::Review(args) => {
            settings.validate()?;
            run_review(args, &settings, cli.format).await?;
        }
        Commands::Status(args) => {
            settings.validate()?;
            run_status_command(&args.project, &settings, cli.format).await?;
        }
        Commands::Cancel(args) => {
            settings.validate()?;
            run_cancel_command(&args.project, &settings, cli.format).await?;
        }
        Commands::Settings(args) => {
            run_settings_command(args, &settings, &settings_path)?;
        }
    }

    Ok(())
}

/// Filter directives for `-v` (connection lifecycle) and `-vv` and up
/// (every frame). `RUST_LOG` still takes precedence.
fn log_directives(verbose: u8) -> &'static [&'static str] {
    match verbose {
        0 => &[],
        1 => &["logreview=info"],
        _ => &["logreview=debug"],
    }
}
