//! Configuration export/import commands.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::config::Config;
use crate::errors::AppError;
use crate::output::console;
use crate::state::State;

pub async fn export_configuration(state: &State, hostnames: &[String]) -> Result<(), AppError> {
    let hosts = if hostnames.is_empty() {
        state.client().get_hosts(None).await?
    } else {
        let mut hosts = Vec::with_capacity(hostnames.len());
        for name in hostnames {
            hosts.push(state.client().get_host(name).await?);
        }
        hosts
    };
    if hosts.is_empty() {
        return Err(AppError::Validation("No hosts to export".into()));
    }

    let dir = state.config().export_directory().join("hosts");
    fs::create_dir_all(&dir)?;
    for host in &hosts {
        let document = state.client().export_hosts(&[host.host_id.clone()]).await?;
        let path = dir.join(export_filename(state.config(), &host.host));
        fs::write(&path, document)?;
        console::info(&format!("Exported host {:?} to {}", host.host, path.display()));
    }
    Ok(())
}

pub async fn import_configuration(state: &State, file: &Path) -> Result<(), AppError> {
    let source = fs::read_to_string(file).map_err(|e| {
        AppError::Validation(format!("Unable to read import file {}: {e}", file.display()))
    })?;
    let format = match file.extension().and_then(|e| e.to_str()) {
        Some("json") => "json",
        Some("xml") => "xml",
        Some("yaml") | Some("yml") => "yaml",
        _ => {
            return Err(AppError::Validation(format!(
                "Cannot determine import format of {} (expected .json, .xml or .yaml)",
                file.display()
            )))
        }
    };
    let imported = state.client().import_configuration(format, &source).await?;
    if !imported {
        return Err(AppError::Validation(format!(
            "Server rejected configuration import from {}",
            file.display()
        )));
    }
    console::info(&format!("Imported configuration from {}", file.display()));
    Ok(())
}

fn export_filename(config: &Config, host: &str) -> String {
    if config.app.include_timestamp_export_filename {
        let timestamp = Utc::now().format("%Y-%m-%dT%H%M%S%z");
        format!("zbxcli_export_host_{host}_{timestamp}.json")
    } else {
        format!("zbxcli_export_host_{host}.json")
    }
}
