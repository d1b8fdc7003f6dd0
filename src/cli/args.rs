// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// duckchat - chat with DuckDuckGo AI from your terminal
#[derive(Parser, Debug)]
#[command(name = "duckchat")]
#[command(version, about = "Chat with DuckDuckGo AI from your terminal")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat options used when no subcommand is given
    #[command(flatten)]
    pub chat: ChatArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat (default when no command given)
    Chat(ChatArgs),

    /// Ask a single question and print the reply
    Ask(AskArgs),

    /// List the available models
    Models,

    /// Print the version
    Version,
}

/// Connection options shared by every command that talks to the service
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Proxy for all requests, e.g. socks5://127.0.0.1:9150 (`tb` for Tor Browser)
    #[arg(short, long, env = "DUCKAI_PROXY")]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Verify TLS certificates
    #[arg(long, value_name = "BOOL")]
    pub verify: Option<bool>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the chat subcommand
#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// Resume the last conversation from the cache file
    #[arg(short, long)]
    pub load: bool,

    /// Conversation cache file
    #[arg(long)]
    pub cache: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Arguments for the ask subcommand
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub prompt: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}
