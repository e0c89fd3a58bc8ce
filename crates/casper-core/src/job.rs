//! Job payloads and notifications exchanged with the job transport.
//!
//! A job is a JSON object addressed to a tube. The transport answers every
//! submission with exactly one [`Notification`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timing parameters attached to a job submission, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Time the worker has to run the job.
    pub ttr: u64,
    /// How long the job stays valid in the queue.
    pub validity: u64,
    /// How long the client waits for the notification.
    pub timeout: u64,
}

impl JobOptions {
    /// Lower bound for the time-to-run.
    pub const MIN_TTR_SECS: u64 = 5;

    /// Derives `ttr = max(timeout - 5, 5)`, `validity = timeout`, `timeout = timeout`.
    pub fn from_timeout(timeout: u64) -> Self {
        Self {
            ttr: timeout
                .saturating_sub(Self::MIN_TTR_SECS)
                .max(Self::MIN_TTR_SECS),
            validity: timeout,
            timeout,
        }
    }
}

/// Tube names used by the login component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TubeNames {
    pub prefix: String,
    pub login: String,
    pub refresh: String,
}

impl TubeNames {
    pub fn from_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            login: format!("{prefix}-login"),
            refresh: format!("{prefix}-refresh"),
        }
    }

    /// Tube that receives password recovery requests.
    pub fn recover_password(&self) -> String {
        format!("{}-recover-password", self.prefix)
    }
}

/// Body of a job, without the tube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum JobPayload {
    /// Silent re-authentication with a saved refresh token and/or session cookie.
    Refresh {
        refresh_token: Option<String>,
        access_token: Option<String>,
        last_entity_id: Option<String>,
    },
    /// Interactive login. `password` is already encoded.
    Login {
        email: String,
        password: String,
        remember: bool,
        last_entity_id: Option<String>,
    },
    /// Password recovery request.
    RecoverPassword { email: String },
}

/// A job addressed to a tube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub tube: String,
    #[serde(flatten)]
    pub payload: JobPayload,
}

impl Job {
    pub fn new(tube: impl Into<String>, payload: JobPayload) -> Self {
        Self {
            tube: tube.into(),
            payload,
        }
    }

    /// Returns true for jobs whose answer is a sign-in response.
    pub fn is_sign_in(&self) -> bool {
        matches!(
            self.payload,
            JobPayload::Refresh { .. } | JobPayload::Login { .. }
        )
    }

    /// Serializes the job to the JSON object sent over the wire.
    ///
    /// # Errors
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Asynchronous result of a submitted job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub status_code: u16,
    /// Job status, usually a string such as `"completed"`.
    #[serde(default)]
    pub status: Value,
    /// Job response payload.
    #[serde(default)]
    pub response: Value,
}

impl Notification {
    pub const STATUS_COMPLETED: &'static str = "completed";

    pub fn new(status_code: u16, status: impl Into<Value>, response: Value) -> Self {
        Self {
            status_code,
            status: status.into(),
            response,
        }
    }

    /// A completed job with the given response.
    pub fn completed(response: Value) -> Self {
        Self::new(200, Self::STATUS_COMPLETED, response)
    }

    /// Synthetic notification for a submission that failed before reaching the backend.
    pub fn service_failure(message: impl Into<String>) -> Self {
        Self::new(
            500,
            "error",
            serde_json::json!({ "success": false, "message": message.into() }),
        )
    }

    pub fn is_status_truthy(&self) -> bool {
        is_truthy(&self.status)
    }

    pub fn is_response_truthy(&self) -> bool {
        is_truthy(&self.response)
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_str() == Some(Self::STATUS_COMPLETED)
    }

    /// Returns true when `response.success` loosely equals `false`, that is
    /// when it converts to the number zero. A missing or `null` flag is not a
    /// failure.
    pub fn is_explicit_failure(&self) -> bool {
        match self.response.get("success") {
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::String(s)) => string_to_number(s) == Some(0.0),
            Some(Value::Array(items)) => string_to_number(&join_array(items)) == Some(0.0),
            Some(Value::Null | Value::Object(_)) | None => false,
        }
    }
}

/// Truthiness as the backend protocol defines it: `null`, `false`, `0` and
/// the empty string are falsy; everything else, including empty containers,
/// is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric value of a string under the backend's loose comparison: blank is
/// zero, decimal and `0x`/`0o`/`0b` literals parse, anything else is `None`.
fn string_to_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix).ok().map(|n| n as f64);
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// String form of an array: elements joined by commas, `null` as empty.
fn join_array(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f == 0.0 => "0".to_string(),
                _ => n.to_string(),
            },
            Value::String(s) => s.clone(),
            Value::Array(inner) => join_array(inner),
            Value::Object(_) => "[object Object]".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
