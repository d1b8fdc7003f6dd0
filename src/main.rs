// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! duckchat - DuckDuckGo AI chat for your terminal
//!
//! Entry point for the duckchat CLI application.

use clap::Parser;

use duckchat::cli::{Cli, Commands};
use duckchat::config::Settings;
use duckchat::error::{DuckChatError, Result};

#[path = "main/chat_ui.rs"]
mod chat_ui;
#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_ask, run_chat, run_models, run_version};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on protocol diagnostics; `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        for directive in [
            "duckchat.client=debug",
            "duckchat.transport=debug",
            "duckchat.config=debug",
        ] {
            if let Ok(parsed) = directive.parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(DuckChatError::Config(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        None => run_chat(cli.chat, settings).await,
        Some(Commands::Chat(args)) => run_chat(args, settings).await,
        Some(Commands::Ask(args)) => run_ask(args, settings).await,
        Some(Commands::Models) => run_models(&settings),
        Some(Commands::Version) => run_version(),
    }
}
