//! Session establishment.
//!
//! Credential sources are tried in a fixed priority order, short-circuiting
//! on the first viable one:
//!
//! 1. pre-shared API token from the config
//! 2. username + password from the config
//! 3. persisted auth token file (when token-file mode is on), rejected if
//!    its username does not match the configured one
//! 4. environment variables, then the auth file, then interactive prompting
//!
//! On success with token-file mode on, the session token is written back to
//! the canonical auth token file keyed to the configured username.

use std::env;

use tracing::debug;

use crate::api::ZabbixApi;
use crate::auth::authfile::{
    auth_file_paths, auth_token_file_paths, canonical_auth_token_file, parse_credential,
    read_secret_file, write_auth_token_file,
};
use crate::auth::prompt::{CredentialPrompt, TerminalPrompt};
use crate::config::{Config, ENV_PASSWORD, ENV_USERNAME};
use crate::errors::AppError;
use crate::output::console;

/// Log in and, when token persistence is enabled, save the session token.
pub async fn login(client: &mut ZabbixApi, config: &Config) -> Result<String, AppError> {
    let mut authenticator = Authenticator::new(client, config);
    let token = authenticator.login().await?;
    if config.app.use_auth_token_file {
        write_auth_token_file(
            &config.api.username,
            &token,
            &canonical_auth_token_file(config),
        )?;
    }
    Ok(token)
}

pub struct Authenticator<'a, P = TerminalPrompt> {
    client: &'a mut ZabbixApi,
    config: &'a Config,
    prompt: P,
}

impl<'a> Authenticator<'a, TerminalPrompt> {
    pub fn new(client: &'a mut ZabbixApi, config: &'a Config) -> Self {
        Self::with_prompt(client, config, TerminalPrompt)
    }
}

impl<'a, P: CredentialPrompt> Authenticator<'a, P> {
    pub fn with_prompt(client: &'a mut ZabbixApi, config: &'a Config, prompt: P) -> Self {
        Self {
            client,
            config,
            prompt,
        }
    }

    /// Establish a session using the highest-priority viable method.
    pub async fn login(&mut self) -> Result<String, AppError> {
        let config = self.config;
        let username = config.api.username.as_str();
        let password = config.api.password.as_deref().unwrap_or("");

        if let Some(token) = &config.api.auth_token {
            self.client.login_with_token(token).await?;
        } else if !username.is_empty() && !password.is_empty() {
            self.client.login(username, password).await?;
        } else if config.app.use_auth_token_file {
            self.login_with_auth_token_file().await?;
        }

        // Fall back on external input if no method above produced a session.
        if !self.client.is_authenticated() {
            let (username, password) = self.resolve_username_password()?;
            self.client.login(&username, &password).await?;
        }

        self.client
            .session_token()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("login did not produce a session token".into()))
    }

    /// Try the persisted auth token file.
    ///
    /// A token recorded for a different username than the configured one is
    /// discarded with a warning, since a session token is only meaningful
    /// together with the username that obtained it.
    async fn login_with_auth_token_file(&mut self) -> Result<(), AppError> {
        let Some(contents) = self.load_auth_token_file() else {
            return Ok(());
        };
        let Some((username, token)) = parse_credential(&contents) else {
            return Ok(());
        };
        if token.is_empty() {
            return Ok(());
        }
        if username == self.config.api.username {
            self.client.login_with_token(&token).await?;
        } else {
            console::warning(&format!(
                "Ignoring existing auth token. Username {username:?} does not match \
                 configured username {:?}.",
                self.config.api.username
            ));
        }
        Ok(())
    }

    fn load_auth_token_file(&self) -> Option<String> {
        let paths = auth_token_file_paths(self.config);
        for path in &paths {
            if let Some(contents) =
                read_secret_file(path, self.config.app.allow_insecure_authfile)
            {
                if !contents.is_empty() {
                    return Some(contents);
                }
            }
        }
        let searched: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        console::error(&format!(
            "No auth token file found. Searched in {}",
            searched.join(", ")
        ));
        None
    }

    /// Resolve a username/password pair: environment variables first, then
    /// the auth file. The first source yielding both wins; when neither
    /// does, prompt interactively.
    pub fn resolve_username_password(&self) -> Result<(String, String), AppError> {
        let sources: [fn(&Self) -> (Option<String>, Option<String>); 2] =
            [Self::credentials_from_env, Self::credentials_from_auth_file];
        for source in sources {
            if let (Some(username), Some(password)) = source(self) {
                if !username.is_empty() && !password.is_empty() {
                    return Ok((username, password));
                }
            }
        }
        self.prompt.username_password(&self.config.api.username)
    }

    fn credentials_from_env(&self) -> (Option<String>, Option<String>) {
        (env::var(ENV_USERNAME).ok(), env::var(ENV_PASSWORD).ok())
    }

    fn credentials_from_auth_file(&self) -> (Option<String>, Option<String>) {
        for path in auth_file_paths(self.config) {
            if let Some(contents) =
                read_secret_file(&path, self.config.app.allow_insecure_authfile)
            {
                if let Some((username, password)) = parse_credential(&contents) {
                    return (Some(username), Some(password));
                }
            }
        }
        debug!("no auth file found");
        (None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;

    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct MockPrompt {
        calls: Cell<usize>,
    }

    impl MockPrompt {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl CredentialPrompt for MockPrompt {
        fn username_password(&self, _default: &str) -> Result<(String, String), AppError> {
            self.calls.set(self.calls.get() + 1);
            Ok(("prompted-user".to_string(), "prompted-pass".to_string()))
        }
    }

    fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": 1,
        }))
    }

    /// Config whose credential files point into an (empty) temp dir, so the
    /// real canonical locations never leak into tests.
    fn isolated_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.app.auth_file = Some(dir.join("auth"));
        config.app.auth_token_file = Some(dir.join("auth_token"));
        config
    }

    #[test]
    fn test_fallback_exhaustion_prompts_exactly_once() {
        env::remove_var(ENV_USERNAME);
        env::remove_var(ENV_PASSWORD);
        let dir = tempdir().unwrap();
        let config = isolated_config(dir.path());
        let mut client = ZabbixApi::new("http://localhost", true).unwrap();
        let prompt = MockPrompt::new();

        let auth = Authenticator::with_prompt(&mut client, &config, prompt);
        let (username, password) = auth.resolve_username_password().unwrap();
        assert_eq!(username, "prompted-user");
        assert_eq!(password, "prompted-pass");
        assert_eq!(auth.prompt.calls.get(), 1);
    }

    #[test]
    fn test_auth_file_beats_prompt() {
        env::remove_var(ENV_USERNAME);
        env::remove_var(ENV_PASSWORD);
        let dir = tempdir().unwrap();
        let config = isolated_config(dir.path());
        let auth_file = dir.path().join("auth");
        fs::write(&auth_file, "filed-user::filed-pass").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&auth_file, fs::Permissions::from_mode(0o600)).unwrap();
        }

        let mut client = ZabbixApi::new("http://localhost", true).unwrap();
        let prompt = MockPrompt::new();
        let auth = Authenticator::with_prompt(&mut client, &config, prompt);
        let (username, password) = auth.resolve_username_password().unwrap();
        assert_eq!(username, "filed-user");
        assert_eq!(password, "filed-pass");
        assert_eq!(auth.prompt.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_config_token_short_circuits_everything() {
        let server = MockServer::start().await;
        // Only apiinfo.version is mounted: any other method would fail.
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "apiinfo.version" })))
            .respond_with(rpc_result(json!("6.0.0")))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let mut config = isolated_config(dir.path());
        config.api.auth_token = Some("cfg-token".to_string());
        // A token file that must NOT be consulted.
        fs::write(dir.path().join("auth_token"), "other::filetok").unwrap();

        let mut client = ZabbixApi::new(&server.uri(), true).unwrap();
        let prompt = MockPrompt::new();
        let mut auth = Authenticator::with_prompt(&mut client, &config, prompt);
        let token = auth.login().await.unwrap();
        assert_eq!(token, "cfg-token");
        assert_eq!(auth.prompt.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_token_file_rejected_for_mismatched_username() {
        let dir = tempdir().unwrap();
        let mut config = isolated_config(dir.path());
        config.api.username = "bob".to_string();
        config.app.use_auth_token_file = true;
        let token_file = dir.path().join("auth_token");
        fs::write(&token_file, "alice::tok123").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&token_file, fs::Permissions::from_mode(0o600)).unwrap();
        }

        let mut client = ZabbixApi::new("http://localhost", true).unwrap();
        let prompt = MockPrompt::new();
        let mut auth = Authenticator::with_prompt(&mut client, &config, prompt);
        auth.login_with_auth_token_file().await.unwrap();
        assert!(!auth.client.is_authenticated());
    }

    #[tokio::test]
    async fn test_token_file_accepted_for_matching_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "apiinfo.version" })))
            .respond_with(rpc_result(json!("6.0.0")))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let mut config = isolated_config(dir.path());
        config.api.username = "alice".to_string();
        config.app.use_auth_token_file = true;
        let token_file = dir.path().join("auth_token");
        fs::write(&token_file, "alice::tok123").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&token_file, fs::Permissions::from_mode(0o600)).unwrap();
        }

        let mut client = ZabbixApi::new(&server.uri(), true).unwrap();
        let prompt = MockPrompt::new();
        let mut auth = Authenticator::with_prompt(&mut client, &config, prompt);
        let token = auth.login().await.unwrap();
        assert_eq!(token, "tok123");
        assert_eq!(auth.prompt.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_login_persists_token_in_token_file_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "apiinfo.version" })))
            .respond_with(rpc_result(json!("6.0.0")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "user.login" })))
            .respond_with(rpc_result(json!("fresh-token")))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let mut config = isolated_config(dir.path());
        config.api.username = "alice".to_string();
        config.api.password = Some("hunter2".to_string());
        config.app.use_auth_token_file = true;

        let mut client = ZabbixApi::new(&server.uri(), true).unwrap();
        login(&mut client, &config).await.unwrap();

        let written = fs::read_to_string(dir.path().join("auth_token")).unwrap();
        assert_eq!(written, "alice::fresh-token");
    }
}
