use serde::{Deserialize, Serialize};

use crate::api::params::UserRole;
use crate::output::TableRow;

/// A user account as returned by `user.get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userid")]
    pub user_id: String,
    /// Login name. Called `alias` before API 6.0.
    #[serde(alias = "alias")]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default, rename = "roleid")]
    pub role: Option<UserRole>,
}

impl User {
    fn full_name(&self) -> String {
        let full = format!("{} {}", self.name, self.surname);
        full.trim().to_string()
    }
}

impl TableRow for User {
    fn columns() -> &'static [&'static str] {
        &["UserID", "Username", "Full name", "Role"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.user_id.clone(),
            self.username.clone(),
            self.full_name(),
            self.role.map(|r| r.to_string()).unwrap_or_default(),
        ]
    }
}

/// Minimal user group reference used when creating users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroup {
    #[serde(rename = "usrgrpid")]
    pub usergroup_id: String,
    pub name: String,
}
