//! Wire types for the presence API.
//!
//! Shared by the monitor core and its HTTP adapters so both sides agree on the
//! shape of a session listing and an outgoing instant message. Parsing is
//! deliberately per-entry: one bad record must not discard the rest of a
//! snapshot.

use serde::Serialize;
use serde_json::Value;

pub const SESSIONS_PATH: &str = "/session";
pub const INSTANT_MESSAGE_PATH: &str = "/instant-message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// One row of the session listing.
///
/// Both `screen_name` and `online_seconds` are optional on the wire; callers
/// decide what to do with incomplete rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEntry {
    pub screen_name: Option<String>,
    pub online_seconds: Option<u64>,
    pub is_icq: bool,
}

impl SessionEntry {
    pub fn new(screen_name: &str, online_seconds: u64) -> Self {
        Self {
            screen_name: Some(screen_name.to_string()),
            online_seconds: Some(online_seconds),
            is_icq: false,
        }
    }

    /// Reads an entry from an arbitrary JSON value.
    ///
    /// Fields of the wrong type are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let screen_name = value
            .get("screen_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let online_seconds = value.get("online_seconds").and_then(Value::as_u64);
        let is_icq = value
            .get("is_icq")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self {
            screen_name,
            online_seconds,
            is_icq,
        }
    }

    /// The identity, if present and non-empty.
    pub fn identity(&self) -> Option<&str> {
        self.screen_name.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionEntry>,
}

pub fn parse_sessions(body: &Value) -> Result<SessionsResponse, ErrorInfo> {
    let Some(object) = body.as_object() else {
        return Err(ErrorInfo::new(
            "invalid_response",
            "session listing must be a JSON object",
        ));
    };

    let sessions = match object.get("sessions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(SessionEntry::from_value).collect(),
        Some(_) => {
            return Err(ErrorInfo::new(
                "invalid_response",
                "sessions must be an array",
            ))
        }
    };

    Ok(SessionsResponse { sessions })
}

pub fn parse_sessions_bytes(bytes: &[u8]) -> Result<SessionsResponse, ErrorInfo> {
    let body: Value = serde_json::from_slice(bytes).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("session listing was not valid JSON: {}", err),
        )
    })?;
    parse_sessions(&body)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InstantMessage {
    pub to: String,
    pub from: String,
    pub text: String,
}
