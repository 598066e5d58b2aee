use serde::{Deserialize, Serialize};

use crate::api::params::MonitoringStatus;
use crate::output::TableRow;

/// A monitored host as returned by `host.get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    #[serde(rename = "hostid")]
    pub host_id: String,
    pub host: String,
    /// Visible name. Falls back to the technical name when unset.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: MonitoringStatus,
    /// Host groups the host belongs to.
    /// `host.get` returned these under `groups` before API 6.2.
    #[serde(default, rename = "hostgroups", alias = "groups")]
    pub groups: Vec<HostGroupRef>,
}

impl Host {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.host
        } else {
            &self.name
        }
    }

    fn group_names(&self) -> String {
        self.groups
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TableRow for Host {
    fn columns() -> &'static [&'static str] {
        &["HostID", "Name", "Host groups", "Status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.host_id.clone(),
            self.display_name().to_string(),
            self.group_names(),
            self.status.to_string(),
        ]
    }
}

/// Minimal host group reference embedded in host results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostGroupRef {
    #[serde(rename = "groupid")]
    pub group_id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_format() {
        let host: Host = serde_json::from_str(
            r#"{
                "hostid": "10084",
                "host": "web-01.example.com",
                "name": "Web frontend",
                "status": "1",
                "groups": [{"groupid": "2", "name": "Linux servers"}]
            }"#,
        )
        .unwrap();
        assert_eq!(host.status, MonitoringStatus::Unmonitored);
        assert_eq!(host.display_name(), "Web frontend");
        assert_eq!(host.groups.len(), 1);
    }

    #[test]
    fn test_display_name_falls_back_to_host() {
        let host: Host = serde_json::from_str(
            r#"{"hostid": "1", "host": "db-01", "status": "0"}"#,
        )
        .unwrap();
        assert_eq!(host.display_name(), "db-01");
    }
}
