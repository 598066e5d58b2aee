//! User commands.

use crate::api::{ApiError, NewUser};
use crate::cli::CreateUserArgs;
use crate::errors::AppError;
use crate::output::{console, print_result};
use crate::state::State;

pub async fn show_user(state: &State, username: &str) -> Result<(), AppError> {
    let user = state.client().get_user(username).await?;
    print_result(state.config(), &[user])
}

pub async fn show_users(state: &State) -> Result<(), AppError> {
    let users = state.client().get_users().await?;
    print_result(state.config(), &users)
}

pub async fn create_user(state: &State, mut args: CreateUserArgs) -> Result<(), AppError> {
    apply_legacy_args(&mut args);

    match state.client().get_user(&args.username).await {
        Ok(user) => {
            return Err(AppError::Validation(format!(
                "User {:?} already exists (ID {})",
                args.username, user.user_id
            )))
        }
        Err(ApiError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let password = match &args.passwd {
        Some(password) => password.clone(),
        None => rpassword::prompt_password(format!("Password for {:?}: ", args.username))?,
    };

    let group_names = if args.usergroups.is_empty() {
        state.config().app.default_create_user_usergroups.clone()
    } else {
        args.usergroups.clone()
    };
    let mut usergroup_ids = Vec::new();
    for name in &group_names {
        let group = state.client().get_usergroup(name).await?;
        usergroup_ids.push(group.usergroup_id);
    }

    let user_id = state
        .client()
        .create_user(NewUser {
            username: &args.username,
            password: &password,
            name: &args.first_name,
            surname: &args.surname,
            role: args.role,
            usergroup_ids,
        })
        .await?;
    console::info(&format!("Created user {:?} (ID {user_id})", args.username));
    Ok(())
}

pub async fn remove_user(state: &State, username: &str) -> Result<(), AppError> {
    let user = state.client().get_user(username).await?;
    state.client().delete_user(&user.user_id).await?;
    console::info(&format!("Deleted user {:?} (ID {})", username, user.user_id));
    Ok(())
}

/// Map the previous generation's `create_user <username> <name> <surname>
/// <password>` positionals onto the option fields. `.` means "use default".
fn apply_legacy_args(args: &mut CreateUserArgs) {
    if args.legacy_args.is_empty() {
        return;
    }
    console::warning(
        "Positional create_user arguments are deprecated. Use --first-name/--surname/--passwd instead.",
    );
    let legacy = args.legacy_args.clone();
    if let Some(name) = legacy.first() {
        if args.first_name.is_empty() && name != "." {
            args.first_name = name.clone();
        }
    }
    if let Some(surname) = legacy.get(1) {
        if args.surname.is_empty() && surname != "." {
            args.surname = surname.clone();
        }
    }
    if let Some(password) = legacy.get(2) {
        if args.passwd.is_none() && password != "." {
            args.passwd = Some(password.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::params::UserRole;

    fn args_with_legacy(legacy: &[&str]) -> CreateUserArgs {
        CreateUserArgs {
            username: "jdoe".to_string(),
            legacy_args: legacy.iter().map(|s| s.to_string()).collect(),
            first_name: String::new(),
            surname: String::new(),
            passwd: None,
            role: UserRole::User,
            usergroups: Vec::new(),
        }
    }

    #[test]
    fn test_legacy_args_map_onto_options() {
        let mut args = args_with_legacy(&["John", "Doe", "s3cret"]);
        apply_legacy_args(&mut args);
        assert_eq!(args.first_name, "John");
        assert_eq!(args.surname, "Doe");
        assert_eq!(args.passwd.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_legacy_dot_placeholders_are_skipped() {
        let mut args = args_with_legacy(&[".", "Doe", "."]);
        apply_legacy_args(&mut args);
        assert_eq!(args.first_name, "");
        assert_eq!(args.surname, "Doe");
        assert_eq!(args.passwd, None);
    }
}
