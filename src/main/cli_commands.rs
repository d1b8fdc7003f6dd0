// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};
use std::time::Duration;

use futures::StreamExt;

use duckchat::chat::{DuckChat, Model, TurnEvent};
use duckchat::cli::{AskArgs, ChatArgs, ConnectionArgs};
use duckchat::config::{ClientConfig, Settings};
use duckchat::error::{DuckChatError, Result};
use duckchat::history::ConversationCache;

use super::chat_ui::{
    print_error, print_help, print_response_prefix, print_turn_footer, print_warning,
    print_welcome, read_user_input, UserInput,
};

fn client_config(settings: &Settings, connection: &ConnectionArgs) -> ClientConfig {
    settings.client_config(
        connection.proxy.as_deref(),
        connection.timeout,
        connection.verify,
    )
}

/// Run the interactive chat loop
pub(super) async fn run_chat(args: ChatArgs, settings: Settings) -> Result<()> {
    let config = client_config(&settings, &args.connection);
    let timeout = config.timeout;
    let model = args
        .connection
        .model
        .clone()
        .unwrap_or_else(|| settings.default_model.clone());

    let mut client = DuckChat::new(config)?;
    let cache = ConversationCache::new(args.cache.unwrap_or(settings.cache_file));

    if args.load {
        match cache.load() {
            Ok(Some(snapshot)) => client.restore(snapshot),
            Ok(None) => {}
            Err(e) => print_warning(&format!(
                "could not load {}: {e}; starting a new conversation",
                cache.path().display()
            ))?,
        }
    }

    print_welcome(&model, client.session().history().len())?;

    loop {
        let input = match read_user_input()? {
            UserInput::Eof => break,
            UserInput::Text(text) => text,
        };

        match input.as_str() {
            "" => continue,
            "/exit" | "exit" => break,
            "/help" => {
                print_help()?;
                continue;
            }
            "/clear" => {
                client.session_mut().reset();
                cache.clear()?;
                println!("Started a new conversation.\n");
                continue;
            }
            _ => {}
        }

        match stream_turn(&mut client, &input, &model, timeout).await {
            Ok(()) => {
                print_turn_footer(client.session().token_usage())?;
                cache.save(&client.snapshot())?;
            }
            Err(DuckChatError::Chat(e)) => {
                println!();
                print_error(&e)?;
                if client.session_mut().discard_unanswered().is_some() {
                    print_warning("your message was not kept in the conversation; send it again to retry")?;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Stream one turn to stdout as fragments arrive
async fn stream_turn(
    client: &mut DuckChat,
    input: &str,
    model: &str,
    timeout: Duration,
) -> Result<()> {
    let token_usage = client.session().token_usage();
    let mut turn = client.send_turn(input, model, timeout);
    let mut prefix_printed = false;

    while let Some(event) = turn.next().await {
        match event? {
            TurnEvent::Warning(unknown) => print_warning(&unknown.to_string())?,
            TurnEvent::Fragment(text) => {
                if !prefix_printed {
                    print_response_prefix(model, token_usage)?;
                    prefix_printed = true;
                }
                print!("{text}");
                io::stdout().flush()?;
            }
        }
    }
    if !prefix_printed {
        print_response_prefix(model, token_usage)?;
    }
    println!();
    Ok(())
}

/// Run single question mode
pub(super) async fn run_ask(args: AskArgs, settings: Settings) -> Result<()> {
    let config = client_config(&settings, &args.connection);
    let timeout = config.timeout;
    let model = args
        .connection
        .model
        .unwrap_or_else(|| settings.default_model.clone());

    let mut client = DuckChat::new(config)?;
    let mut turn = client.send_turn(args.prompt, &model, timeout);
    while let Some(event) = turn.next().await {
        match event? {
            TurnEvent::Warning(unknown) => print_warning(&unknown.to_string())?,
            TurnEvent::Fragment(text) => {
                print!("{text}");
                io::stdout().flush()?;
            }
        }
    }
    println!();
    Ok(())
}

/// List the model catalog
pub(super) fn run_models(settings: &Settings) -> Result<()> {
    for model in Model::ALL {
        let marker = if model.as_str() == settings.default_model {
            "*"
        } else {
            " "
        };
        println!("{marker} {:<18} {}", model.as_str(), model.upstream_id());
    }
    Ok(())
}

pub(super) fn run_version() -> Result<()> {
    println!("duckchat {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
