//! Interactive credential prompting, the last-resort auth source.

use std::io::{self, Write};

use crate::errors::AppError;

/// Source of interactively entered credentials.
///
/// A trait so the authenticator can be exercised without a terminal.
pub trait CredentialPrompt {
    fn username_password(&self, default_username: &str) -> Result<(String, String), AppError>;
}

/// Prompts on the controlling terminal. Password input is not echoed.
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username_password(&self, default_username: &str) -> Result<(String, String), AppError> {
        let mut stdout = io::stdout();
        write!(stdout, "Username [{default_username}]: ")?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        let entered = line.trim();
        let username = if entered.is_empty() {
            default_username.to_string()
        } else {
            entered.to_string()
        };

        let password = rpassword::prompt_password("Password: ")?;
        Ok((username, password))
    }
}
