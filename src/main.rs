//! zbxcli - a command-line client for the Zabbix monitoring API.

mod api;
mod auth;
mod cli;
mod commands;
mod config;
mod errors;
mod models;
mod output;
mod repl;
mod state;

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};
use config::Config;
use errors::{handle_error, handle_startup_error, EXIT_ERROR, EXIT_OK};
use output::console;
use state::State;

/// Initialize tracing from the `[logging]` config section.
///
/// `RUST_LOG` overrides the configured level. The returned guard must stay
/// alive for the duration of the process when logging to a file.
fn init_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    if !config.logging.enabled {
        return None;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.log_level.clone()));

    match &config.logging.log_file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let filename = path.file_name().unwrap_or_else(|| OsStr::new("zbxcli.log"));
            let _ = std::fs::create_dir_all(directory);
            let appender = tracing_appender::rolling::never(directory, filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found).
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    // sample_config must work with no config file and no server.
    if let Some(Command::SampleConfig) = &cli.command {
        return match Config::sample().as_toml() {
            Ok(toml) => {
                println!("{toml}");
                EXIT_OK
            }
            Err(e) => handle_startup_error(&e),
        };
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return handle_startup_error(&e),
    };
    let _guard = init_logging(&config);

    if let Some(format) = cli.output_format {
        config.app.output_format = format;
    }

    let mut state = match State::configure(config).await {
        Ok(state) => state,
        Err(e) => return handle_startup_error(&e),
    };

    let code = match (cli.command, cli.legacy_command) {
        (Some(command), _) => match commands::run(&mut state, command).await {
            Ok(()) => EXIT_OK,
            Err(e) => handle_error(e, &mut state).await,
        },
        (None, Some(line)) => run_legacy_command(&mut state, &line).await,
        (None, None) => match repl::run_repl(&mut state).await {
            Ok(()) => EXIT_OK,
            Err(e) => handle_error(e, &mut state).await,
        },
    };

    if code == EXIT_OK {
        if let Err(e) = state.logout().await {
            return handle_error(e, &mut state).await;
        }
    }
    code
}

/// Run a command given as a single string via the previous CLI generation's
/// `--command/-C` option.
async fn run_legacy_command(state: &mut State, line: &str) -> i32 {
    console::warning(
        "The --command/-C option is deprecated and will be removed in a future release. \
         Invoke the command directly instead.",
    );
    let words = match repl::split_args(line) {
        Ok(words) => words,
        Err(e) => return handle_error(e, state).await,
    };
    let parsed = Cli::try_parse_from(std::iter::once("zbxcli".to_string()).chain(words));
    let cli = match parsed {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return EXIT_ERROR;
        }
    };
    let Some(command) = cli.command else {
        console::error(&format!(
            "Cannot run command {line:?}. Ensure it is a valid command and try again."
        ));
        return EXIT_ERROR;
    };
    if let Some(format) = cli.output_format {
        state.config_mut().app.output_format = format;
    }
    match commands::run(state, command).await {
        Ok(()) => EXIT_OK,
        Err(e) => handle_error(e, state).await,
    }
}
