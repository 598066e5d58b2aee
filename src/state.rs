//! Session context shared across command execution.
//!
//! `State` owns the loaded configuration and the authenticated API client.
//! Construction performs the login, so a `State` is authenticated by
//! definition and "accessed before configured" cannot be expressed.

use tracing::debug;

use crate::api::ZabbixApi;
use crate::auth;
use crate::auth::authfile::clear_auth_token_files;
use crate::config::Config;
use crate::errors::AppError;

pub struct State {
    config: Config,
    client: ZabbixApi,
    /// Whether the interactive REPL is active.
    pub repl: bool,
    /// Config snapshot taken at REPL entry, used to revert per-command
    /// overrides.
    repl_baseline: Option<Config>,
}

impl State {
    /// Build the client, authenticate, and return the ready-to-use context.
    pub async fn configure(config: Config) -> Result<Self, AppError> {
        let mut client = ZabbixApi::new(&config.api.url, config.api.verify_ssl)?;
        auth::login(&mut client, &config).await?;
        Ok(Self {
            config,
            client,
            repl: false,
            repl_baseline: None,
        })
    }

    /// Rebuild the client and log in again with the current configuration.
    pub async fn reconfigure(&mut self) -> Result<(), AppError> {
        let mut client = ZabbixApi::new(&self.config.api.url, self.config.api.verify_ssl)?;
        auth::login(&mut client, &self.config).await?;
        self.client = client;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn client(&self) -> &ZabbixApi {
        &self.client
    }

    /// Revert config overrides applied for a single REPL command.
    ///
    /// The first call after REPL entry snapshots the current config as the
    /// baseline; every later call restores a deep copy of that baseline.
    /// Intended to run after each REPL command completes, so an override
    /// like `-o json` only applies to the command it was given with.
    pub fn revert_config_overrides(&mut self) {
        if !self.repl {
            return;
        }
        match &self.repl_baseline {
            None => self.repl_baseline = Some(self.config.clone()),
            Some(baseline) => self.config = baseline.clone(),
        }
    }

    /// End the API session.
    ///
    /// In token-file mode the session is meant to outlive the process, so
    /// nothing happens. Otherwise the server-side session is closed and all
    /// known auth token file locations are cleared; a logout failure is an
    /// error, since a dangling server-side session would leak.
    pub async fn logout(&mut self) -> Result<(), AppError> {
        if self.config.app.use_auth_token_file {
            debug!("keeping session alive (token-file mode)");
            return Ok(());
        }
        self.client.logout().await?;
        clear_auth_token_files(&self.config);
        Ok(())
    }
}
