//! Host commands.

use crate::api::ApiError;
use crate::cli::CreateHostArgs;
use crate::errors::AppError;
use crate::output::{console, print_result};
use crate::state::State;

pub async fn show_host(state: &State, hostname: &str) -> Result<(), AppError> {
    let host = state.client().get_host(hostname).await?;
    print_result(state.config(), &[host])
}

pub async fn show_hosts(state: &State, pattern: Option<&str>) -> Result<(), AppError> {
    let hosts = state.client().get_hosts(pattern).await?;
    print_result(state.config(), &hosts)
}

pub async fn create_host(state: &State, mut args: CreateHostArgs) -> Result<(), AppError> {
    apply_legacy_args(&mut args)?;

    match state.client().get_host(&args.hostname).await {
        Ok(host) => {
            return Err(AppError::Validation(format!(
                "Host {:?} already exists (ID {})",
                args.hostname, host.host_id
            )))
        }
        Err(ApiError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let group_names = if args.hostgroups.is_empty() {
        state.config().app.default_hostgroups.clone()
    } else {
        args.hostgroups.clone()
    };
    let mut group_ids = Vec::new();
    for name in &group_names {
        let group = state.client().get_hostgroup(name).await?;
        group_ids.push(group.group_id);
    }

    let host_id = state
        .client()
        .create_host(&args.hostname, &group_ids, args.interface_type, args.status)
        .await?;
    console::info(&format!("Created host {:?} (ID {host_id})", args.hostname));
    Ok(())
}

pub async fn remove_host(state: &State, hostname: &str) -> Result<(), AppError> {
    let host = state.client().get_host(hostname).await?;
    state.client().delete_host(&host.host_id).await?;
    console::info(&format!("Deleted host {:?} (ID {})", hostname, host.host_id));
    Ok(())
}

/// Map the previous generation's `create_host <host> <groups> <proxy>
/// <status>` positionals onto the option fields. `.` means "use default".
fn apply_legacy_args(args: &mut CreateHostArgs) -> Result<(), AppError> {
    if args.legacy_args.is_empty() {
        return Ok(());
    }
    console::warning(
        "Positional create_host arguments are deprecated. Use --hostgroups/--status instead.",
    );
    let legacy = args.legacy_args.clone();
    if let Some(groups) = legacy.first() {
        if args.hostgroups.is_empty() && groups != "." {
            args.hostgroups = groups.split(',').map(|s| s.trim().to_string()).collect();
        }
    }
    if let Some(proxy) = legacy.get(1) {
        if proxy != "." {
            console::warning("The legacy proxy argument is ignored.");
        }
    }
    if let Some(status) = legacy.get(2) {
        if status != "." {
            args.status = status.parse().map_err(AppError::Validation)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::params::{InterfaceType, MonitoringStatus};

    fn args_with_legacy(legacy: &[&str]) -> CreateHostArgs {
        CreateHostArgs {
            hostname: "web-01".to_string(),
            legacy_args: legacy.iter().map(|s| s.to_string()).collect(),
            hostgroups: Vec::new(),
            interface_type: InterfaceType::Agent,
            status: MonitoringStatus::Monitored,
        }
    }

    #[test]
    fn test_legacy_args_map_onto_options() {
        let mut args = args_with_legacy(&["Linux servers,Web servers", ".", "1"]);
        apply_legacy_args(&mut args).unwrap();
        assert_eq!(args.hostgroups, vec!["Linux servers", "Web servers"]);
        assert_eq!(args.status, MonitoringStatus::Unmonitored);
    }

    #[test]
    fn test_legacy_dot_keeps_defaults() {
        let mut args = args_with_legacy(&[".", ".", "."]);
        apply_legacy_args(&mut args).unwrap();
        assert!(args.hostgroups.is_empty());
        assert_eq!(args.status, MonitoringStatus::Monitored);
    }

    #[test]
    fn test_legacy_bad_status_is_a_validation_error() {
        let mut args = args_with_legacy(&[".", ".", "5"]);
        let err = apply_legacy_args(&mut args).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_explicit_options_win_over_legacy_args() {
        let mut args = args_with_legacy(&["Legacy group"]);
        args.hostgroups = vec!["Explicit group".to_string()];
        apply_legacy_args(&mut args).unwrap();
        assert_eq!(args.hostgroups, vec!["Explicit group"]);
    }
}
