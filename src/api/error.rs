use thiserror::Error;

/// Marker embedded in session-expiry error messages.
///
/// The error handler looks for this substring to decide whether a failed
/// request should invalidate a persisted auth token.
pub const RELOGIN_HINT: &str = "re-login";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Zabbix API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Build an error from a JSON-RPC `error` object returned by the server.
    ///
    /// The request parameters are never included in the message, so login
    /// failures cannot leak the password into logs or the console.
    pub fn from_rpc_error(code: i64, message: &str, data: &str) -> Self {
        let message = if data == "Not authorized" {
            format!(
                "{data}: {message} The API session token has probably expired, please {RELOGIN_HINT}."
            )
        } else {
            format!("{message} {data}")
        };
        ApiError::Api { code, message }
    }

    /// Whether the server rejected the request because the session expired.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Api { message, .. } if message.contains(RELOGIN_HINT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authorized_carries_relogin_hint() {
        let err = ApiError::from_rpc_error(-32602, "Invalid params.", "Not authorized");
        assert!(err.is_session_expired());
    }

    #[test]
    fn test_other_errors_do_not_expire_session() {
        let err = ApiError::from_rpc_error(-32500, "No permissions.", "No data");
        assert!(!err.is_session_expired());
        assert!(!ApiError::NotFound("Host \"web-01\" not found".into()).is_session_expired());
    }
}
