//! Command handlers: the mapping from CLI subcommands to API calls.

pub mod configuration;
pub mod host;
pub mod hostgroup;
pub mod user;

use crate::cli::Command;
use crate::config::Config;
use crate::errors::AppError;
use crate::output::console;
use crate::state::State;

pub async fn run(state: &mut State, command: Command) -> Result<(), AppError> {
    match command {
        Command::ShowHost { hostname } => host::show_host(state, &hostname).await,
        Command::ShowHosts { pattern } => host::show_hosts(state, pattern.as_deref()).await,
        Command::CreateHost(args) => host::create_host(state, args).await,
        Command::RemoveHost { hostname } => host::remove_host(state, &hostname).await,

        Command::ShowHostgroup { name } => hostgroup::show_hostgroup(state, &name).await,
        Command::ShowHostgroups { pattern } => {
            hostgroup::show_hostgroups(state, pattern.as_deref()).await
        }
        Command::CreateHostgroup { name } => hostgroup::create_hostgroup(state, &name).await,
        Command::RemoveHostgroup { name } => hostgroup::remove_hostgroup(state, &name).await,

        Command::ShowUser { username } => user::show_user(state, &username).await,
        Command::ShowUsers => user::show_users(state).await,
        Command::CreateUser(args) => user::create_user(state, args).await,
        Command::RemoveUser { username } => user::remove_user(state, &username).await,

        Command::ExportConfiguration(args) => {
            configuration::export_configuration(state, &args.hostnames).await
        }
        Command::ImportConfiguration { file } => {
            configuration::import_configuration(state, &file).await
        }

        Command::ShowConfig => show_config(state),
        Command::SampleConfig => sample_config(),
    }
}

fn show_config(state: &State) -> Result<(), AppError> {
    if let Some(path) = &state.config().config_path {
        console::info(&format!("Config file: {}", path.display()));
    }
    println!("{}", state.config().as_toml()?);
    Ok(())
}

fn sample_config() -> Result<(), AppError> {
    println!("{}", Config::sample().as_toml()?);
    Ok(())
}
