//! Interactive REPL mode.
//!
//! Lines are split shell-style and dispatched through the same clap command
//! tree as one-shot invocations. Handled command errors keep the loop
//! running; config overrides given with a command (`show_hosts -o json`)
//! are reverted before the next one.

use std::io::{self, BufRead, Write};

use clap::{CommandFactory, Parser};

use crate::cli::Cli;
use crate::commands;
use crate::errors::{handle_error, AppError};
use crate::output::console;
use crate::state::State;

const PROMPT: &str = "zbxcli> ";

pub async fn run_repl(state: &mut State) -> Result<(), AppError> {
    state.repl = true;
    print_banner(state);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        state.revert_config_overrides();

        print!("{PROMPT}");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            ":q" | "quit" | "exit" => break,
            ":h" | "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        let words = match split_args(line) {
            Ok(words) => words,
            Err(e) => {
                console::error(&e.to_string());
                continue;
            }
        };
        let cli = match Cli::try_parse_from(std::iter::once("zbxcli".to_string()).chain(words)) {
            Ok(cli) => cli,
            Err(e) => {
                // clap renders its own usage/help output.
                let _ = e.print();
                continue;
            }
        };
        let Some(command) = cli.command else {
            print_help();
            continue;
        };
        if let Some(format) = cli.output_format {
            state.config_mut().app.output_format = format;
        }
        if let Err(e) = commands::run(state, command).await {
            handle_error(e, state).await;
        }
    }
    Ok(())
}

fn print_banner(state: &State) {
    let api_version = state
        .client()
        .version()
        .map(|v| v.as_str().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    console::info(&format!(
        "Welcome to zbxcli v{}\nConnected to server {} (API v{api_version})\nType a command, :h for help, :q to exit.",
        env!("CARGO_PKG_VERSION"),
        state.config().api.url,
    ));
}

fn print_help() {
    let mut cmd = Cli::command();
    let _ = cmd.print_help();
}

/// Split a command line into arguments, honoring single and double quotes.
pub fn split_args(line: &str) -> Result<Vec<String>, AppError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }
    if quote.is_some() {
        return Err(AppError::Validation("unterminated quote".into()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
