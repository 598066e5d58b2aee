//! Error taxonomy and the single exit path for handled errors.
//!
//! Every terminal condition funnels through [`handle_error`] so one place
//! decides message formatting and exit codes. Anything without a variant
//! here is a programming error and is allowed to propagate with a full
//! diagnostic instead of being masked.

use thiserror::Error;
use tracing::error;

use crate::api::ApiError;
use crate::auth::authfile::clear_auth_token_files;
use crate::output::console;
use crate::state::State;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing configuration. Always fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure creating or securing a credential file while persisting a
    /// newly obtained token. Fatal, since the credentials would otherwise
    /// be silently lost.
    #[error("{0}")]
    AuthFile(String),

    /// Remote API rejection, including authentication failures.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Malformed structured data from config or API responses.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Ambient I/O failure (prompts, export files).
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Decide the user-facing message and exit code for a handled error.
///
/// Special case: an API error carrying the re-login marker while the
/// application persists sessions to a token file means the stored token is
/// stale. The token file is cleared and the user is told to re-run the
/// command; in REPL mode the state is re-configured (fresh login) first.
/// The failed command is never retried automatically.
pub async fn handle_error(err: AppError, state: &mut State) -> i32 {
    if let AppError::Api(api_err) = &err {
        if api_err.is_session_expired() && state.config().app.use_auth_token_file {
            clear_auth_token_files(state.config());
            if state.repl {
                if let Err(e) = state.reconfigure().await {
                    console::error(&format!("Failed to re-authenticate: {e}"));
                }
            }
            console::error("Session token expired. Re-run the command to re-authenticate.");
            return EXIT_ERROR;
        }
    }
    error!("command failed: {err}");
    console::error(&err.to_string());
    EXIT_ERROR
}

/// Error handling for failures before the session state exists
/// (config loading, client construction, the initial login).
pub fn handle_startup_error(err: &AppError) -> i32 {
    error!("startup failed: {err}");
    console::error(&err.to_string());
    EXIT_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_taxonomy_prefix() {
        let err = AppError::Config("no url set".into());
        assert_eq!(err.to_string(), "Configuration error: no url set");
        let err = AppError::Validation("bad response".into());
        assert_eq!(err.to_string(), "Validation error: bad response");
    }

    #[test]
    fn test_api_errors_pass_through_untouched() {
        let err = AppError::from(ApiError::NotFound("Host \"x\" not found".into()));
        assert_eq!(err.to_string(), "Host \"x\" not found");
    }
}
