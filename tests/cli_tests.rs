// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use clap::Parser;

use duckchat::cli::{Cli, Commands};
use duckchat::config::Settings;
use duckchat::utils::TOR_BROWSER_PROXY;

// Kept in one test so nothing else in this binary races on the variable.
#[test]
fn test_proxy_env_var_applies_with_and_without_subcommand() {
    std::env::set_var("DUCKAI_PROXY", "tb");

    let bare = Cli::parse_from(["duckchat"]);
    let chat = Cli::parse_from(["duckchat", "chat"]);
    let ask = Cli::parse_from(["duckchat", "ask", "hello"]);
    let flag_wins = Cli::parse_from(["duckchat", "-p", "socks5://127.0.0.1:1080"]);

    std::env::remove_var("DUCKAI_PROXY");

    assert!(bare.command.is_none());
    assert_eq!(bare.chat.connection.proxy.as_deref(), Some("tb"));
    let config = Settings::default().client_config(
        bare.chat.connection.proxy.as_deref(),
        bare.chat.connection.timeout,
        bare.chat.connection.verify,
    );
    assert_eq!(config.proxy.as_deref(), Some(TOR_BROWSER_PROXY));

    match chat.command {
        Some(Commands::Chat(args)) => assert_eq!(args.connection.proxy.as_deref(), Some("tb")),
        other => panic!("expected chat, got {other:?}"),
    }
    match ask.command {
        Some(Commands::Ask(args)) => assert_eq!(args.connection.proxy.as_deref(), Some("tb")),
        other => panic!("expected ask, got {other:?}"),
    }

    assert_eq!(
        flag_wins.chat.connection.proxy.as_deref(),
        Some("socks5://127.0.0.1:1080")
    );
}
