//! Credential file store.
//!
//! Two kinds of single-line secret files exist: the auth file
//! (`username::password`) and the auth token file (`username::token`).
//! Both must be owner read/write only (0600). Files with broader
//! permissions are reported and treated as absent unless
//! `allow_insecure_authfile` is set. Reads search the configured path, the
//! canonical location, then the previous generation's location; writes only
//! ever target the canonical path.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{data_dir, Config};
use crate::errors::AppError;
use crate::output::console;

/// Required file mode for credential files.
pub const SECURE_PERMISSIONS: u32 = 0o600;

/// Delimiter between username and secret.
const DELIMITER: &str = "::";

// ============================================================================
// Locations
// ============================================================================

pub fn default_auth_file() -> PathBuf {
    data_dir().join("auth")
}

pub fn default_auth_token_file() -> PathBuf {
    data_dir().join("auth_token")
}

/// Auth file location used by the previous CLI generation.
pub fn legacy_auth_file() -> PathBuf {
    home_dir().join(".zabbix-cli.auth")
}

/// Auth token file location used by the previous CLI generation.
pub fn legacy_auth_token_file() -> PathBuf {
    home_dir().join(".zabbix-cli_auth_token")
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// All auth file locations to search, highest priority first.
pub fn auth_file_paths(config: &Config) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = &config.app.auth_file {
        paths.push(path.clone());
    }
    for path in [default_auth_file(), legacy_auth_file()] {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// All auth token file locations to search, highest priority first.
pub fn auth_token_file_paths(config: &Config) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = &config.app.auth_token_file {
        paths.push(path.clone());
    }
    for path in [default_auth_token_file(), legacy_auth_token_file()] {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// The single path newly obtained tokens are written to.
pub fn canonical_auth_token_file(config: &Config) -> PathBuf {
    config
        .app
        .auth_token_file
        .clone()
        .unwrap_or_else(default_auth_token_file)
}

// ============================================================================
// Reading
// ============================================================================

/// Split file contents into a `(username, secret)` pair.
/// Only the first line counts; a missing delimiter yields no credential.
pub fn parse_credential(contents: &str) -> Option<(String, String)> {
    let line = contents.lines().next()?.trim();
    let (username, secret) = line.split_once(DELIMITER)?;
    Some((username.to_string(), secret.to_string()))
}

/// Read the trimmed contents of a credential file.
///
/// Returns `None` when the file does not exist or has permissions broader
/// than 0600 (reported on the console, not raised).
pub fn read_secret_file(path: &Path, allow_insecure: bool) -> Option<String> {
    if !path.exists() {
        return None;
    }
    if !allow_insecure && !has_secure_permissions(path) {
        console::error(&format!(
            "Auth file {} must have 600 permissions, has {:o}. Refusing to load.",
            path.display(),
            file_mode(path).unwrap_or(0),
        ));
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(e) => {
            console::error(&format!("Unable to read auth file {}: {e}", path.display()));
            None
        }
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write a `username::token` pair to an auth token file.
///
/// New files are created with 0600; existing files with broader permissions
/// are tightened first. If the file cannot be created or secured, the write
/// is aborted and nothing is persisted.
pub fn write_auth_token_file(username: &str, token: &str, path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::AuthFile(format!(
                    "Unable to create auth token file {}: {e}",
                    path.display()
                ))
            })?;
        }
        create_secure(path).map_err(|e| {
            AppError::AuthFile(format!(
                "Unable to create auth token file {}: {e}",
                path.display()
            ))
        })?;
    } else if !has_secure_permissions(path) {
        set_secure_permissions(path).map_err(|e| {
            AppError::AuthFile(format!(
                "Unable to set secure permissions (600) on {} when saving auth token: {e}. \
                 Change permissions manually or delete the file.",
                path.display()
            ))
        })?;
    }
    fs::write(path, format!("{username}{DELIMITER}{token}")).map_err(|e| {
        AppError::AuthFile(format!(
            "Unable to write auth token file {}: {e}",
            path.display()
        ))
    })?;
    info!("wrote auth token file {}", path.display());
    Ok(())
}

/// Clear the contents of every known auth token file location.
/// The files are emptied, not deleted. Failures are reported, not raised.
pub fn clear_auth_token_files(config: &Config) {
    for path in auth_token_file_paths(config) {
        if path.exists() {
            match fs::write(&path, "") {
                Ok(()) => debug!("cleared auth token file {}", path.display()),
                Err(e) => console::error(&format!(
                    "Unable to clear auth token file {}: {e}",
                    path.display()
                )),
            }
        } else {
            debug!("auth token file {} does not exist, skipping", path.display());
        }
    }
}

// ============================================================================
// Permissions
// ============================================================================

#[cfg(unix)]
pub fn file_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).ok().map(|m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
pub fn file_mode(_path: &Path) -> Option<u32> {
    None
}

#[cfg(unix)]
pub fn has_secure_permissions(path: &Path) -> bool {
    file_mode(path) == Some(SECURE_PERMISSIONS)
}

#[cfg(not(unix))]
pub fn has_secure_permissions(_path: &Path) -> bool {
    true
}

#[cfg(unix)]
fn set_secure_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(SECURE_PERMISSIONS))
}

#[cfg(not(unix))]
fn set_secure_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn create_secure(path: &Path) -> std::io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SECURE_PERMISSIONS);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_credential() {
        assert_eq!(
            parse_credential("alice::tok123"),
            Some(("alice".to_string(), "tok123".to_string()))
        );
        // Trailing lines are ignored.
        assert_eq!(
            parse_credential("alice::tok123\ngarbage"),
            Some(("alice".to_string(), "tok123".to_string()))
        );
        assert_eq!(parse_credential(""), None);
        assert_eq!(parse_credential("no-delimiter"), None);
        // Empty secret parses; callers reject it.
        assert_eq!(
            parse_credential("alice::"),
            Some(("alice".to_string(), String::new()))
        );
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth_token");
        write_auth_token_file("alice", "tok123", &path).unwrap();
        let contents = read_secret_file(&path, false).unwrap();
        assert_eq!(
            parse_credential(&contents),
            Some(("alice".to_string(), "tok123".to_string()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_write_creates_secure_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth_token");
        write_auth_token_file("alice", "tok123", &path).unwrap();
        assert_eq!(file_mode(&path), Some(SECURE_PERMISSIONS));
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_file_is_treated_as_absent() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth");
        fs::write(&path, "alice::hunter2").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(read_secret_file(&path, false), None);
        // The insecure override returns the content regardless of mode.
        assert_eq!(
            read_secret_file(&path, true),
            Some("alice::hunter2".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_write_tightens_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth_token");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_auth_token_file("alice", "tok123", &path).unwrap();
        assert_eq!(file_mode(&path), Some(SECURE_PERMISSIONS));
        assert_eq!(fs::read_to_string(&path).unwrap(), "alice::tok123");
    }

    #[test]
    fn test_clear_empties_existing_and_skips_missing() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("auth_token");
        write_auth_token_file("alice", "tok123", &existing).unwrap();

        let mut config = Config::default();
        config.app.auth_token_file = Some(existing.clone());
        clear_auth_token_files(&config);

        assert_eq!(fs::read_to_string(&existing).unwrap(), "");
        // The file is cleared, not deleted.
        assert!(existing.exists());
    }

    #[test]
    fn test_search_paths_prioritize_config_override() {
        let dir = tempdir().unwrap();
        let override_path = dir.path().join("auth_token");
        let mut config = Config::default();
        config.app.auth_token_file = Some(override_path.clone());

        let paths = auth_token_file_paths(&config);
        assert_eq!(paths[0], override_path);
        assert_eq!(paths[1], default_auth_token_file());
        assert_eq!(paths[2], legacy_auth_token_file());

        // Without an override the canonical path comes first.
        let paths = auth_token_file_paths(&Config::default());
        assert_eq!(paths[0], default_auth_token_file());
        assert_eq!(paths[1], legacy_auth_token_file());
    }
}
