use serde::{Deserialize, Serialize};

use crate::output::TableRow;

/// A host group as returned by `hostgroup.get`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostGroup {
    #[serde(rename = "groupid")]
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
}

impl HostGroup {
    fn host_names(&self) -> String {
        self.hosts
            .iter()
            .map(|h| h.host.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TableRow for HostGroup {
    fn columns() -> &'static [&'static str] {
        &["GroupID", "Name", "Hosts"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.group_id.clone(), self.name.clone(), self.host_names()]
    }
}

/// Minimal host reference embedded in host group results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRef {
    #[serde(rename = "hostid")]
    pub host_id: String,
    pub host: String,
}
