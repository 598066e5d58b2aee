//! Command-line interface definition.
//!
//! Command names keep the snake_case spelling of the previous CLI
//! generation, so existing scripts and muscle memory carry over. The same
//! parser is reused by the REPL for line dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::params::{InterfaceType, MonitoringStatus, UserRole};
use crate::config::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "zbxcli",
    version,
    about = "Command-line client for the Zabbix monitoring API",
    after_help = "Running without a command starts the interactive REPL."
)]
pub struct Cli {
    /// Alternative configuration file.
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format for this invocation (overrides the config).
    #[arg(long, short = 'o', value_enum, global = true)]
    pub output_format: Option<OutputFormat>,

    /// Command to execute, in the previous CLI generation's `-C` style.
    #[arg(long = "command", short = 'C', value_name = "COMMAND", hide = true)]
    pub legacy_command: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a host and its host groups.
    #[command(name = "show_host")]
    ShowHost { hostname: String },

    /// Show all hosts, optionally filtered by a wildcard pattern.
    #[command(name = "show_hosts")]
    ShowHosts { pattern: Option<String> },

    /// Create a host with a default interface in the given host groups.
    #[command(name = "create_host")]
    CreateHost(CreateHostArgs),

    /// Delete a host.
    #[command(name = "remove_host")]
    RemoveHost { hostname: String },

    /// Show a host group and its hosts.
    #[command(name = "show_hostgroup")]
    ShowHostgroup { name: String },

    /// Show all host groups, optionally filtered by a wildcard pattern.
    #[command(name = "show_hostgroups")]
    ShowHostgroups { pattern: Option<String> },

    /// Create a host group.
    #[command(name = "create_hostgroup")]
    CreateHostgroup { name: String },

    /// Delete a host group.
    #[command(name = "remove_hostgroup")]
    RemoveHostgroup { name: String },

    /// Show a user account.
    #[command(name = "show_user")]
    ShowUser { username: String },

    /// Show all user accounts.
    #[command(name = "show_users")]
    ShowUsers,

    /// Create a user account.
    #[command(name = "create_user")]
    CreateUser(CreateUserArgs),

    /// Delete a user account.
    #[command(name = "remove_user")]
    RemoveUser { username: String },

    /// Export host configuration to files.
    #[command(name = "export_configuration")]
    ExportConfiguration(ExportArgs),

    /// Import a configuration export file.
    #[command(name = "import_configuration")]
    ImportConfiguration { file: PathBuf },

    /// Show the current configuration.
    #[command(name = "show_config")]
    ShowConfig,

    /// Print a default configuration file.
    #[command(name = "sample_config")]
    SampleConfig,
}

#[derive(Debug, Args)]
pub struct CreateHostArgs {
    pub hostname: String,

    /// Positional arguments of the previous CLI generation:
    /// <hostgroups> <proxy> <status>.
    #[arg(hide = true, num_args = 0.., value_name = "ARGS")]
    pub legacy_args: Vec<String>,

    /// Comma-separated host group names. Defaults come from the config.
    #[arg(long, value_delimiter = ',')]
    pub hostgroups: Vec<String>,

    #[arg(long, value_enum, default_value_t = InterfaceType::Agent)]
    pub interface_type: InterfaceType,

    #[arg(long, value_enum, default_value_t = MonitoringStatus::Monitored)]
    pub status: MonitoringStatus,
}

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    pub username: String,

    /// Positional arguments of the previous CLI generation:
    /// <name> <surname> <password>.
    #[arg(hide = true, num_args = 0.., value_name = "ARGS")]
    pub legacy_args: Vec<String>,

    #[arg(long, default_value = "")]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub surname: String,

    /// Password for the new account. Prompted for when omitted.
    #[arg(long)]
    pub passwd: Option<String>,

    #[arg(long, value_enum, default_value_t = UserRole::User)]
    pub role: UserRole,

    /// Comma-separated user group names. Defaults come from the config.
    #[arg(long, value_delimiter = ',')]
    pub usergroups: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Host names to export. Exports all hosts when omitted.
    pub hostnames: Vec<String>,
}
