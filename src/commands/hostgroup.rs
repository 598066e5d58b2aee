//! Host group commands.

use crate::api::ApiError;
use crate::errors::AppError;
use crate::output::{console, print_result};
use crate::state::State;

pub async fn show_hostgroup(state: &State, name: &str) -> Result<(), AppError> {
    let group = state.client().get_hostgroup(name).await?;
    print_result(state.config(), &[group])
}

pub async fn show_hostgroups(state: &State, pattern: Option<&str>) -> Result<(), AppError> {
    let groups = state.client().get_hostgroups(pattern).await?;
    print_result(state.config(), &groups)
}

pub async fn create_hostgroup(state: &State, name: &str) -> Result<(), AppError> {
    match state.client().get_hostgroup(name).await {
        Ok(group) => {
            return Err(AppError::Validation(format!(
                "Host group {name:?} already exists (ID {})",
                group.group_id
            )))
        }
        Err(ApiError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }
    let group_id = state.client().create_hostgroup(name).await?;
    console::info(&format!("Created host group {name:?} (ID {group_id})"));
    Ok(())
}

pub async fn remove_hostgroup(state: &State, name: &str) -> Result<(), AppError> {
    let group = state.client().get_hostgroup(name).await?;
    if !group.hosts.is_empty() {
        return Err(AppError::Validation(format!(
            "Host group {name:?} still contains {} host(s). Move or delete them first.",
            group.hosts.len()
        )));
    }
    state.client().delete_hostgroup(&group.group_id).await?;
    console::info(&format!("Deleted host group {name:?} (ID {})", group.group_id));
    Ok(())
}
