//! Mappings between human-readable names and the API's integer codes.
//!
//! The Zabbix API encodes most enumerated values as stringified integers
//! ("0", "1", ...). These types accept either the code or the human name
//! when deserializing, and always serialize back to the code so that JSON
//! output matches the wire format.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Host monitoring status (`host.status`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(into = "String", try_from = "String")]
pub enum MonitoringStatus {
    #[default]
    Monitored,
    Unmonitored,
}

impl MonitoringStatus {
    pub fn code(&self) -> u8 {
        match self {
            MonitoringStatus::Monitored => 0,
            MonitoringStatus::Unmonitored => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MonitoringStatus::Monitored => "monitored",
            MonitoringStatus::Unmonitored => "unmonitored",
        }
    }
}

impl fmt::Display for MonitoringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MonitoringStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "monitored" => Ok(MonitoringStatus::Monitored),
            "1" | "unmonitored" => Ok(MonitoringStatus::Unmonitored),
            other => Err(format!("unknown monitoring status {other:?}")),
        }
    }
}

impl From<MonitoringStatus> for String {
    fn from(value: MonitoringStatus) -> Self {
        value.code().to_string()
    }
}

impl TryFrom<String> for MonitoringStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Host interface type (`hostinterface.type`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(into = "String", try_from = "String")]
pub enum InterfaceType {
    #[default]
    Agent,
    Snmp,
    Ipmi,
    Jmx,
}

impl InterfaceType {
    pub fn code(&self) -> u8 {
        match self {
            InterfaceType::Agent => 1,
            InterfaceType::Snmp => 2,
            InterfaceType::Ipmi => 3,
            InterfaceType::Jmx => 4,
        }
    }

    /// Default listening port for the interface type.
    pub fn default_port(&self) -> u16 {
        match self {
            InterfaceType::Agent => 10050,
            InterfaceType::Snmp => 161,
            InterfaceType::Ipmi => 623,
            InterfaceType::Jmx => 12345,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InterfaceType::Agent => "agent",
            InterfaceType::Snmp => "snmp",
            InterfaceType::Ipmi => "ipmi",
            InterfaceType::Jmx => "jmx",
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "agent" => Ok(InterfaceType::Agent),
            "2" | "snmp" => Ok(InterfaceType::Snmp),
            "3" | "ipmi" => Ok(InterfaceType::Ipmi),
            "4" | "jmx" => Ok(InterfaceType::Jmx),
            other => Err(format!("unknown interface type {other:?}")),
        }
    }
}

impl From<InterfaceType> for String {
    fn from(value: InterfaceType) -> Self {
        value.code().to_string()
    }
}

impl TryFrom<String> for InterfaceType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// User role (`user.roleid`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(into = "String", try_from = "String")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Superadmin,
    Guest,
}

impl UserRole {
    pub fn code(&self) -> u8 {
        match self {
            UserRole::User => 1,
            UserRole::Admin => 2,
            UserRole::Superadmin => 3,
            UserRole::Guest => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::Superadmin => "superadmin",
            UserRole::Guest => "guest",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "user" => Ok(UserRole::User),
            "2" | "admin" => Ok(UserRole::Admin),
            "3" | "superadmin" => Ok(UserRole::Superadmin),
            "4" | "guest" => Ok(UserRole::Guest),
            other => Err(format!("unknown user role {other:?}")),
        }
    }
}

impl From<UserRole> for String {
    fn from(value: UserRole) -> Self {
        value.code().to_string()
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_code_and_name() {
        assert_eq!("0".parse::<MonitoringStatus>().unwrap(), MonitoringStatus::Monitored);
        assert_eq!(
            "Unmonitored".parse::<MonitoringStatus>().unwrap(),
            MonitoringStatus::Unmonitored
        );
        assert!("2".parse::<MonitoringStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_to_code() {
        let json = serde_json::to_string(&MonitoringStatus::Unmonitored).unwrap();
        assert_eq!(json, "\"1\"");
        let status: MonitoringStatus = serde_json::from_str("\"0\"").unwrap();
        assert_eq!(status, MonitoringStatus::Monitored);
    }

    #[test]
    fn test_interface_default_ports() {
        assert_eq!(InterfaceType::Agent.default_port(), 10050);
        assert_eq!(InterfaceType::Snmp.default_port(), 161);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::User, UserRole::Admin, UserRole::Superadmin, UserRole::Guest] {
            let parsed: UserRole = role.code().to_string().parse().unwrap();
            assert_eq!(parsed, role);
            let named: UserRole = role.name().parse().unwrap();
            assert_eq!(named, role);
        }
    }
}
