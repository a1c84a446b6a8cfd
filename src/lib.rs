//! OneSignal REST API client
//!
//! A thin client for the OneSignal push-notification service. It holds the
//! application credentials, assembles JSON request bodies from structured
//! parameters, and dispatches HTTP calls either inline or on a detached task.
//!
//! It handles:
//! - Convenience builders for the common targeting patterns (broadcast,
//!   segment, single player, filters, tags)
//! - Normalization of parameters into the wire format OneSignal expects
//! - Player (device) registration and updates
//! - Optional detached dispatch with an at-most-once success callback
//!
//! It deliberately does not retry, queue, rate-limit, or interpret API-level
//! error bodies; transport and remote failures surface to the caller as-is.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;

pub use client::{OneSignalClient, ResponseCallback};
pub use config::OneSignalConfig;
pub use errors::OneSignalError;
pub use models::{ApiResponse, Dispatch, Params, PendingResponse, Schedule, SendOptions};
