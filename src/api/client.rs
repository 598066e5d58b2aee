//! JSON-RPC client for the Zabbix API.
//!
//! The API speaks JSON-RPC 2.0 over HTTP. Every request after login carries
//! the session token in the `auth` field; `apiinfo.version` is the only
//! method that must be called without it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::params::{InterfaceType, MonitoringStatus, UserRole};
use crate::models::{Host, HostGroup, User, UserGroup};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path of the JSON-RPC endpoint below the configured server URL.
const API_ENDPOINT: &str = "api_jsonrpc.php";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// API version
// ============================================================================

/// Negotiated API version, reduced to the parts that drive parameter names.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    raw: String,
    major: u32,
    minor: u32,
}

impl ApiVersion {
    fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut parts = raw.split('.');
        let major = parts.next().and_then(|p| p.parse().ok());
        let minor = parts.next().and_then(|p| p.parse().ok());
        match (major, minor) {
            (Some(major), Some(minor)) => Ok(Self {
                raw: raw.to_string(),
                major,
                minor,
            }),
            _ => Err(ApiError::InvalidResponse(format!(
                "unparseable API version {raw:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    /// Username parameter name for `user.login`.
    /// Renamed `user` -> `username` in 5.4 (ZBXNEXT-8085).
    fn login_user_param(&self) -> &'static str {
        if self.at_least(5, 4) {
            "username"
        } else {
            "user"
        }
    }

    /// Login-name parameter for `user.*` methods.
    /// Renamed `alias` -> `username` in 6.0.
    fn user_name_param(&self) -> &'static str {
        if self.at_least(6, 0) {
            "username"
        } else {
            "alias"
        }
    }

    /// Import-rule key for host groups. Renamed `groups` -> `host_groups` in 6.2.
    fn import_groups_key(&self) -> &'static str {
        if self.at_least(6, 2) {
            "host_groups"
        } else {
            "groups"
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Parameters for `user.create`.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub surname: &'a str,
    pub role: UserRole,
    pub usergroup_ids: Vec<String>,
}

pub struct ZabbixApi {
    client: Client,
    url: String,
    auth: Option<String>,
    request_id: AtomicU64,
    version: Option<ApiVersion>,
}

impl ZabbixApi {
    /// Create a client bound to a server base URL (without the endpoint path).
    pub fn new(server: &str, verify_ssl: bool) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;
        let url = format!("{}/{}", server.trim_end_matches('/'), API_ENDPOINT);
        info!("JSON-RPC endpoint: {url}");
        Ok(Self {
            client,
            url,
            auth: None,
            request_id: AtomicU64::new(0),
            version: None,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// Fetch and cache the server's API version. Idempotent.
    pub async fn negotiate_version(&mut self) -> Result<(), ApiError> {
        if self.version.is_some() {
            return Ok(());
        }
        let result = self.request("apiinfo.version", json!([])).await?;
        let raw = result.as_str().ok_or_else(|| {
            ApiError::InvalidResponse("apiinfo.version did not return a string".into())
        })?;
        let version = ApiVersion::parse(raw)?;
        info!("connected to Zabbix API v{}", version.as_str());
        self.version = Some(version);
        Ok(())
    }

    pub fn version(&self) -> Result<&ApiVersion, ApiError> {
        self.version
            .as_ref()
            .ok_or_else(|| ApiError::InvalidResponse("API version not negotiated".into()))
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Log in with username and password, storing the resulting session token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<String, ApiError> {
        self.auth = None;
        self.negotiate_version().await?;
        let user_param = self.version()?.login_user_param();
        let params = json!({ user_param: username, "password": password });
        let result = self.request("user.login", params).await?;
        let token = result.as_str().map(str::to_owned).ok_or_else(|| {
            ApiError::InvalidResponse("user.login did not return a session token".into())
        })?;
        self.auth = Some(token.clone());
        info!("logged in as {username:?}");
        Ok(token)
    }

    /// Adopt a pre-obtained session token.
    /// Performs the version round trip so the connection is negotiated.
    pub async fn login_with_token(&mut self, token: &str) -> Result<String, ApiError> {
        self.auth = Some(token.to_string());
        self.negotiate_version().await?;
        debug!("reusing existing session token");
        Ok(token.to_string())
    }

    /// End the server-side session.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        self.request("user.logout", json!([])).await?;
        self.auth = None;
        info!("ended API session");
        Ok(())
    }

    // ========================================================================
    // Hosts
    // ========================================================================

    pub async fn get_hosts(&self, pattern: Option<&str>) -> Result<Vec<Host>, ApiError> {
        let mut params = json!({
            "output": "extend",
            "selectGroups": ["groupid", "name"],
            "sortfield": "host",
        });
        if let Some(pattern) = pattern {
            params["search"] = json!({ "host": pattern });
            params["searchWildcardsEnabled"] = json!(true);
        }
        parse_result(self.request("host.get", params).await?)
    }

    pub async fn get_host(&self, name: &str) -> Result<Host, ApiError> {
        let params = json!({
            "output": "extend",
            "selectGroups": ["groupid", "name"],
            "filter": { "host": [name] },
        });
        let hosts: Vec<Host> = parse_result(self.request("host.get", params).await?)?;
        hosts
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("Host {name:?} not found")))
    }

    /// Create a host with a single default interface in the given groups.
    pub async fn create_host(
        &self,
        host: &str,
        group_ids: &[String],
        interface_type: InterfaceType,
        status: MonitoringStatus,
    ) -> Result<String, ApiError> {
        let groups: Vec<Value> = group_ids.iter().map(|id| json!({ "groupid": id })).collect();
        let interface = json!({
            "type": interface_type.code(),
            "main": 1,
            "useip": 1,
            "ip": "127.0.0.1",
            "dns": "",
            "port": interface_type.default_port().to_string(),
        });
        let params = json!({
            "host": host,
            "groups": groups,
            "interfaces": [interface],
            "status": status.code(),
        });
        let result = self.request("host.create", params).await?;
        first_id(&result, "hostids").ok_or_else(|| {
            ApiError::InvalidResponse("host.create did not return a host ID".into())
        })
    }

    pub async fn delete_host(&self, host_id: &str) -> Result<(), ApiError> {
        self.request("host.delete", json!([host_id])).await?;
        Ok(())
    }

    // ========================================================================
    // Host groups
    // ========================================================================

    pub async fn get_hostgroups(&self, pattern: Option<&str>) -> Result<Vec<HostGroup>, ApiError> {
        let mut params = json!({
            "output": "extend",
            "selectHosts": ["hostid", "host"],
            "sortfield": "name",
        });
        if let Some(pattern) = pattern {
            params["search"] = json!({ "name": pattern });
            params["searchWildcardsEnabled"] = json!(true);
        }
        parse_result(self.request("hostgroup.get", params).await?)
    }

    pub async fn get_hostgroup(&self, name: &str) -> Result<HostGroup, ApiError> {
        let params = json!({
            "output": "extend",
            "selectHosts": ["hostid", "host"],
            "filter": { "name": [name] },
        });
        let groups: Vec<HostGroup> = parse_result(self.request("hostgroup.get", params).await?)?;
        groups
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("Host group {name:?} not found")))
    }

    pub async fn create_hostgroup(&self, name: &str) -> Result<String, ApiError> {
        let result = self.request("hostgroup.create", json!({ "name": name })).await?;
        first_id(&result, "groupids").ok_or_else(|| {
            ApiError::InvalidResponse("hostgroup.create did not return a group ID".into())
        })
    }

    pub async fn delete_hostgroup(&self, group_id: &str) -> Result<(), ApiError> {
        self.request("hostgroup.delete", json!([group_id])).await?;
        Ok(())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        let params = json!({ "output": "extend", "sortfield": "userid" });
        parse_result(self.request("user.get", params).await?)
    }

    pub async fn get_user(&self, username: &str) -> Result<User, ApiError> {
        let name_param = self.version()?.user_name_param();
        let params = json!({
            "output": "extend",
            "filter": { name_param: [username] },
        });
        let users: Vec<User> = parse_result(self.request("user.get", params).await?)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("User {username:?} not found")))
    }

    pub async fn create_user(&self, user: NewUser<'_>) -> Result<String, ApiError> {
        let name_param = self.version()?.user_name_param();
        let usrgrps: Vec<Value> = user
            .usergroup_ids
            .iter()
            .map(|id| json!({ "usrgrpid": id }))
            .collect();
        let params = json!({
            name_param: user.username,
            "passwd": user.password,
            "name": user.name,
            "surname": user.surname,
            "roleid": user.role.code(),
            "usrgrps": usrgrps,
        });
        let result = self.request("user.create", params).await?;
        first_id(&result, "userids").ok_or_else(|| {
            ApiError::InvalidResponse("user.create did not return a user ID".into())
        })
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.request("user.delete", json!([user_id])).await?;
        Ok(())
    }

    pub async fn get_usergroup(&self, name: &str) -> Result<UserGroup, ApiError> {
        let params = json!({
            "output": "extend",
            "filter": { "name": [name] },
        });
        let groups: Vec<UserGroup> = parse_result(self.request("usergroup.get", params).await?)?;
        groups
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("User group {name:?} not found")))
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Export the given hosts as a JSON configuration document.
    pub async fn export_hosts(&self, host_ids: &[String]) -> Result<String, ApiError> {
        let params = json!({
            "format": "json",
            "options": { "hosts": host_ids },
        });
        let result = self.request("configuration.export", params).await?;
        result.as_str().map(str::to_owned).ok_or_else(|| {
            ApiError::InvalidResponse("configuration.export did not return a document".into())
        })
    }

    /// Import a configuration document, creating and updating entities.
    pub async fn import_configuration(&self, format: &str, source: &str) -> Result<bool, ApiError> {
        let groups_key = self.version()?.import_groups_key();
        let mut rules = serde_json::Map::new();
        rules.insert(
            groups_key.to_string(),
            json!({ "createMissing": true, "updateExisting": true }),
        );
        rules.insert(
            "hosts".to_string(),
            json!({ "createMissing": true, "updateExisting": true }),
        );
        let params = json!({
            "format": format,
            "source": source,
            "rules": rules,
        });
        let result = self.request("configuration.import", params).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Send a JSON-RPC request and unwrap the `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ApiError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let mut body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        // apiinfo.version rejects requests that carry an auth field.
        if method != "apiinfo.version" {
            if let Some(auth) = &self.auth {
                body["auth"] = Value::String(auth.clone());
            }
        }
        debug!(method, id, "sending API request");

        let response = self.client.post(&self.url).json(&body).send().await?;
        let response = response.error_for_status()?;
        let text = response.text().await?;
        if text.is_empty() {
            return Err(ApiError::InvalidResponse("received empty response".into()));
        }
        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("unable to parse JSON: {e}")))?;

        if let Some(error) = payload.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error.");
            // Some errors lack a data member (ZBX-9340).
            let data = error.get("data").and_then(Value::as_str).unwrap_or("No data");
            return Err(ApiError::from_rpc_error(code, message, data));
        }
        payload
            .get("result")
            .cloned()
            .ok_or_else(|| ApiError::InvalidResponse("response has no result".into()))
    }
}

fn parse_result<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("unexpected result shape: {e}")))
}

/// Pull the first ID out of a `{"hostids": ["123"]}`-style create result.
fn first_id(result: &Value, key: &str) -> Option<String> {
    let id = result.get(key)?.get(0)?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rpc_result(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": 1,
        }))
    }

    async fn mock_version(server: &MockServer, version: &str) {
        Mock::given(method("POST"))
            .and(path("/api_jsonrpc.php"))
            .and(body_partial_json(json!({ "method": "apiinfo.version" })))
            .respond_with(rpc_result(json!(version)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_uses_username_param_on_modern_api() {
        let server = MockServer::start().await;
        mock_version(&server, "6.0.0").await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "user.login",
                "params": { "username": "Admin" },
            })))
            .respond_with(rpc_result(json!("tok123")))
            .expect(1)
            .mount(&server)
            .await;

        let mut api = ZabbixApi::new(&server.uri(), true).unwrap();
        let token = api.login("Admin", "zabbix").await.unwrap();
        assert_eq!(token, "tok123");
        assert!(api.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_uses_user_param_on_old_api() {
        let server = MockServer::start().await;
        mock_version(&server, "5.0.0").await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "user.login",
                "params": { "user": "Admin" },
            })))
            .respond_with(rpc_result(json!("tok456")))
            .expect(1)
            .mount(&server)
            .await;

        let mut api = ZabbixApi::new(&server.uri(), true).unwrap();
        let token = api.login("Admin", "zabbix").await.unwrap();
        assert_eq!(token, "tok456");
    }

    #[tokio::test]
    async fn test_get_host_maps_empty_result_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "host.get" })))
            .respond_with(rpc_result(json!([])))
            .mount(&server)
            .await;

        let api = ZabbixApi::new(&server.uri(), true).unwrap();
        let err = api.get_host("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32602,
                    "message": "Invalid params.",
                    "data": "Not authorized",
                },
                "id": 1,
            })))
            .mount(&server)
            .await;

        let api = ZabbixApi::new(&server.uri(), true).unwrap();
        let err = api.get_users().await.unwrap_err();
        assert!(err.is_session_expired());
    }

    #[tokio::test]
    async fn test_create_host_returns_first_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "host.create" })))
            .respond_with(rpc_result(json!({ "hostids": ["10084"] })))
            .mount(&server)
            .await;

        let api = ZabbixApi::new(&server.uri(), true).unwrap();
        let id = api
            .create_host(
                "web-01",
                &["2".to_string()],
                InterfaceType::Agent,
                MonitoringStatus::Monitored,
            )
            .await
            .unwrap();
        assert_eq!(id, "10084");
    }

    #[test]
    fn test_version_parse() {
        let v = ApiVersion::parse("6.4.12").unwrap();
        assert_eq!(v.as_str(), "6.4.12");
        assert_eq!(v.login_user_param(), "username");
        assert!(ApiVersion::parse("garbage").is_err());
    }
}
