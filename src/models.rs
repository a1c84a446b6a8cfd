use chrono::{DateTime, FixedOffset, Utc};
use reqwest::StatusCode;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::errors::OneSignalError;

/// Dynamically-keyed request parameters.
///
/// OneSignal's parameter surface is open-ended, so request bodies are plain
/// string-to-JSON maps rather than a fixed schema. Pass-through fields such
/// as `filters`, `tags`, and `buttons` are opaque to this client.
pub type Params = serde_json::Map<String, Value>;

/// Optional fields shared by the convenience send methods.
///
/// Fields left unset never appear as keys in the outgoing body.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub url: Option<String>,
    pub data: Option<Value>,
    pub buttons: Option<Value>,
    pub schedule: Option<Schedule>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL opened when the notification is tapped
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Custom key/value payload delivered alongside the notification
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Action buttons, passed through to the API unmodified
    pub fn with_buttons(mut self, buttons: Value) -> Self {
        self.buttons = Some(buttons);
        self
    }

    /// Delivery schedule, serialized into the `send_after` field
    pub fn with_schedule(mut self, schedule: impl Into<Schedule>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }
}

/// Delivery schedule for the `send_after` field
#[derive(Debug, Clone)]
pub enum Schedule {
    /// Timestamp, serialized as `YYYY-MM-DD HH:mm:ss±HHMM`
    At(DateTime<FixedOffset>),
    /// Pre-formatted string, passed through unchanged
    Raw(String),
}

/// Fixed `send_after` wire format, e.g. `2024-01-15 10:30:00+0000`
const SEND_AFTER_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

impl Schedule {
    fn wire_string(&self) -> String {
        match self {
            Schedule::At(ts) => ts.format(SEND_AFTER_FORMAT).to_string(),
            Schedule::Raw(raw) => raw.clone(),
        }
    }

    /// Wire representation of the schedule
    pub fn to_value(&self) -> Value {
        Value::String(self.wire_string())
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_string())
    }
}

impl From<DateTime<FixedOffset>> for Schedule {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Schedule::At(ts)
    }
}

impl From<DateTime<Utc>> for Schedule {
    fn from(ts: DateTime<Utc>) -> Self {
        Schedule::At(ts.fixed_offset())
    }
}

impl From<&str> for Schedule {
    fn from(raw: &str) -> Self {
        Schedule::Raw(raw.to_string())
    }
}

impl From<String> for Schedule {
    fn from(raw: String) -> Self {
        Schedule::Raw(raw)
    }
}

/// Completed HTTP exchange as surfaced to callers and callbacks.
///
/// The body is kept as raw text; API-level contents are never interpreted
/// by this client.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Parse the raw body as JSON
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Result of a dispatched request: completed inline in sync mode, detached
/// in async mode.
#[derive(Debug)]
pub enum Dispatch {
    Response(ApiResponse),
    Pending(PendingResponse),
}

impl Dispatch {
    /// Completed response, if the request was dispatched inline
    pub fn response(self) -> Option<ApiResponse> {
        match self {
            Dispatch::Response(response) => Some(response),
            Dispatch::Pending(_) => None,
        }
    }

    /// Pending handle, if the request was dispatched on a detached task
    pub fn pending(self) -> Option<PendingResponse> {
        match self {
            Dispatch::Pending(pending) => Some(pending),
            Dispatch::Response(_) => None,
        }
    }

    /// Resolve to the final response regardless of dispatch mode
    pub async fn into_response(self) -> Result<ApiResponse, OneSignalError> {
        match self {
            Dispatch::Response(response) => Ok(response),
            Dispatch::Pending(pending) => pending.wait().await,
        }
    }
}

/// Handle for a request running on a detached task.
///
/// Failures settle here, never through the client's success callback.
#[derive(Debug)]
pub struct PendingResponse {
    handle: JoinHandle<Result<ApiResponse, OneSignalError>>,
}

impl PendingResponse {
    pub(crate) fn new(handle: JoinHandle<Result<ApiResponse, OneSignalError>>) -> Self {
        Self { handle }
    }

    /// Await settlement of the detached request
    pub async fn wait(self) -> Result<ApiResponse, OneSignalError> {
        self.handle.await?
    }

    /// Abort the in-flight request
    pub fn abort(&self) {
        self.handle.abort();
    }
}
