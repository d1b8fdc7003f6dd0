// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};

use crossterm::{
    style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor},
    ExecutableCommand,
};

use duckchat::error::{ChatError, Result};

/// One line read from the terminal
pub(super) enum UserInput {
    Text(String),
    Eof,
}

/// Print welcome message
pub(super) fn print_welcome(model: &str, restored_messages: usize) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    println!("duckchat v{}", env!("CARGO_PKG_VERSION"));
    stdout.execute(ResetColor)?;
    println!("Model: {}", model);
    if restored_messages > 0 {
        println!("Resumed conversation with {} messages", restored_messages);
    }
    println!("Type /help for commands, /exit to quit\n");
    Ok(())
}

pub(super) fn print_help() -> Result<()> {
    println!("\nCommands:");
    println!("  /clear  - Start a new conversation");
    println!("  /help   - Show this help message");
    println!("  /exit   - Exit duckchat");
    println!();
    Ok(())
}

/// Read user input
pub(super) fn read_user_input() -> Result<UserInput> {
    let mut stdout = io::stdout();
    stdout.execute(SetAttribute(Attribute::Bold))?;
    stdout.execute(SetForegroundColor(Color::Red))?;
    print!("@you: ");
    stdout.execute(ResetColor)?;
    stdout.execute(SetAttribute(Attribute::Reset))?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        println!();
        return Ok(UserInput::Eof);
    }
    Ok(UserInput::Text(input.trim().to_string()))
}

/// Print the reply header with the model and tokens used so far
pub(super) fn print_response_prefix(model: &str, token_usage: u64) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    print!("\n@AI[model={} tokens={}]: ", model, token_usage);
    stdout.execute(ResetColor)?;
    stdout.flush()?;
    Ok(())
}

pub(super) fn print_turn_footer(token_usage: u64) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::DarkGrey))?;
    println!("[tokens={}]\n", token_usage);
    stdout.execute(ResetColor)?;
    Ok(())
}

pub(super) fn print_warning(message: &str) -> Result<()> {
    let mut stderr = io::stderr();
    stderr.execute(SetForegroundColor(Color::Yellow))?;
    eprintln!("warning: {}", message);
    stderr.execute(ResetColor)?;
    Ok(())
}

/// Print a failed turn; the loop continues afterwards
pub(super) fn print_error(error: &ChatError) -> Result<()> {
    let mut stderr = io::stderr();
    stderr.execute(SetForegroundColor(Color::Red))?;
    eprintln!("{}", error);
    stderr.execute(ResetColor)?;
    match error {
        ChatError::ConversationLimit(_) => {
            eprintln!("Use /clear to start a new conversation.");
        }
        e if e.is_retryable() => {
            eprintln!("You can send the message again after a short wait.");
        }
        _ => {}
    }
    eprintln!();
    Ok(())
}
