//! Typed models for Zabbix API objects.
//!
//! Fields follow the wire names (`hostid`, `groupid`, ...) with legacy
//! aliases where the API renamed them between versions.

pub mod host;
pub mod hostgroup;
pub mod user;

pub use host::{Host, HostGroupRef};
pub use hostgroup::{HostGroup, HostRef};
pub use user::{User, UserGroup};
