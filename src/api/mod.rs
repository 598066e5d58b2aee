//! Client for the Zabbix JSON-RPC API.
//!
//! `ZabbixApi` wraps the JSON-RPC transport and exposes typed operations
//! for the object types this tool manages. `params` translates between
//! human-readable names and the API's integer codes.

pub mod client;
pub mod error;
pub mod params;

pub use client::{ApiVersion, NewUser, ZabbixApi};
pub use error::ApiError;
