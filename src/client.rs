use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::OneSignalConfig;
use crate::errors::OneSignalError;
use crate::models::{ApiResponse, Dispatch, Params, PendingResponse, SendOptions};

const ENDPOINT_NOTIFICATIONS: &str = "/notifications";
const ENDPOINT_PLAYERS: &str = "/players";

/// Callback invoked with the response of a successful detached request
pub type ResponseCallback = Arc<dyn Fn(&ApiResponse) + Send + Sync>;

/// OneSignal REST API client
///
/// Holds application credentials and client-lifetime request options,
/// exposes convenience builders for the common targeting patterns, and
/// dispatches the assembled request either inline ("sync" mode, the
/// default) or on a detached task ("async" mode).
///
/// The setters take `&mut self`; a client shared across tasks needs
/// external synchronization if its configuration is mutated concurrently.
pub struct OneSignalClient {
    config: OneSignalConfig,
    http_client: reqwest::Client,
    request_async: bool,
    additional_params: Params,
    callback: Option<ResponseCallback>,
}

impl OneSignalClient {
    /// Create a new client from configuration
    ///
    /// Builds the shared HTTP client; fails only if the TLS backend cannot
    /// be initialized with the requested certificate policy.
    pub fn new(config: OneSignalConfig) -> Result<Self, OneSignalError> {
        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            config,
            http_client,
            request_async: false,
            additional_params: Params::new(),
            callback: None,
        })
    }

    /// Turn detached dispatch on or off for subsequent requests
    pub fn set_async(&mut self, on: bool) -> &mut Self {
        self.request_async = on;
        self
    }

    /// Register the callback invoked with each successful detached
    /// response. Last registration wins; ignored for inline dispatch.
    pub fn on_response<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&ApiResponse) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Replace the additional-params map merged into every notification body
    pub fn set_additional_params(&mut self, params: Params) -> &mut Self {
        self.additional_params = params;
        self
    }

    /// Set a single additional param, overwriting any existing entry
    pub fn set_param(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.additional_params.insert(key.into(), value);
        self
    }

    /// Send a notification to every subscribed player
    pub async fn send_to_all(
        &self,
        message: &str,
        options: SendOptions,
    ) -> Result<Dispatch, OneSignalError> {
        let mut params = message_params(message, options);
        params.insert("included_segments".into(), serde_json::json!(["All"]));

        self.send_custom(params).await
    }

    /// Send a notification to a named segment
    pub async fn send_to_segment(
        &self,
        message: &str,
        segment: &str,
        options: SendOptions,
    ) -> Result<Dispatch, OneSignalError> {
        let mut params = message_params(message, options);
        params.insert("included_segments".into(), serde_json::json!([segment]));

        self.send_custom(params).await
    }

    /// Send a notification to a single player (device)
    pub async fn send_to_user(
        &self,
        message: &str,
        player_id: &str,
        options: SendOptions,
    ) -> Result<Dispatch, OneSignalError> {
        let mut params = message_params(message, options);
        params.insert("include_player_ids".into(), serde_json::json!([player_id]));

        self.send_custom(params).await
    }

    /// Send a notification targeted by a filter expression.
    ///
    /// The expression is evaluated server-side and passed through unmodified.
    pub async fn send_using_filters(
        &self,
        message: &str,
        filters: Value,
        options: SendOptions,
    ) -> Result<Dispatch, OneSignalError> {
        let mut params = message_params(message, options);
        params.insert("filters".into(), filters);

        self.send_custom(params).await
    }

    /// Send a notification targeted by a tag-matching expression.
    ///
    /// The expression is evaluated server-side and passed through unmodified.
    pub async fn send_using_tags(
        &self,
        message: &str,
        tags: Value,
        options: SendOptions,
    ) -> Result<Dispatch, OneSignalError> {
        let mut params = message_params(message, options);
        params.insert("tags".into(), tags);

        self.send_custom(params).await
    }

    /// Send a notification with fully custom parameters.
    ///
    /// All convenience senders funnel into this. The configured `app_id` is
    /// injected over any caller-supplied value, targeting defaults to
    /// `included_segments = ["all"]` when none is given, and the client's
    /// additional params are merged on top (additional params win on
    /// collision).
    pub async fn send_custom(&self, params: Params) -> Result<Dispatch, OneSignalError> {
        let body = self.build_notification_body(params);

        debug!("Dispatching notification create with {} fields", body.len());

        let request = self
            .http_client
            .post(format!("{}{}", self.config.api_url, ENDPOINT_NOTIFICATIONS))
            .header(
                "Authorization",
                format!("Basic {}", self.config.rest_api_key),
            )
            .json(&body);

        self.dispatch(request).await
    }

    /// Register a new player (device) record.
    ///
    /// Rejects the call locally, before any network traffic, unless
    /// `device_type` is present and numeric.
    pub async fn create_player(&self, params: Params) -> Result<Dispatch, OneSignalError> {
        match params.get("device_type") {
            Some(value) if value.is_number() => {}
            _ => {
                return Err(OneSignalError::InvalidArgument(
                    "the `device_type` param is required as an integer to create a player (device)"
                        .into(),
                ))
            }
        }

        self.send_player(params, reqwest::Method::POST, ENDPOINT_PLAYERS.to_string())
            .await
    }

    /// Update an existing player (device) record.
    ///
    /// The `id` param names the player and becomes part of the URL path.
    pub async fn edit_player(&self, params: Params) -> Result<Dispatch, OneSignalError> {
        let id = match params.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(OneSignalError::InvalidArgument(
                    "the `id` param is required to edit a player (device)".into(),
                ))
            }
        };

        self.send_player(
            params,
            reqwest::Method::PUT,
            format!("{ENDPOINT_PLAYERS}/{id}"),
        )
        .await
    }

    /// Assemble the final notification body from per-call params.
    ///
    /// Order matters: `app_id` injection, the targeting default, and the
    /// additional-params merge happen in sequence, so additional params can
    /// deliberately override anything while explicit per-call params cannot
    /// override `app_id`.
    fn build_notification_body(&self, mut params: Params) -> Params {
        params.insert("app_id".into(), Value::String(self.config.app_id.clone()));

        if is_absent(params.get("included_segments"))
            && is_absent(params.get("include_player_ids"))
        {
            params.insert("included_segments".into(), serde_json::json!(["all"]));
        }

        for (key, value) in self.additional_params.clone() {
            params.insert(key, value);
        }

        params
    }

    /// Create or update a player record; `app_id` is injected into the body.
    ///
    /// Player endpoints authenticate by `app_id` and carry no
    /// `Authorization` header.
    async fn send_player(
        &self,
        mut params: Params,
        method: reqwest::Method,
        endpoint: String,
    ) -> Result<Dispatch, OneSignalError> {
        params.insert("app_id".into(), Value::String(self.config.app_id.clone()));

        let request = self
            .http_client
            .request(method, format!("{}{}", self.config.api_url, endpoint))
            .json(&params);

        self.dispatch(request).await
    }

    /// Issue the request inline or on a detached task, per the async flag.
    ///
    /// The flag and callback are read here, at dispatch time. In detached
    /// mode the callback fires at most once, only on success; failures
    /// settle the pending handle and never reach the callback.
    async fn dispatch(&self, request: reqwest::RequestBuilder) -> Result<Dispatch, OneSignalError> {
        if self.request_async {
            let callback = self.callback.clone();
            let handle = tokio::spawn(async move {
                let response = execute(request).await?;

                if let Some(callback) = callback {
                    callback(&response);
                }

                Ok(response)
            });

            return Ok(Dispatch::Pending(PendingResponse::new(handle)));
        }

        execute(request).await.map(Dispatch::Response)
    }
}

/// Run the HTTP exchange and read back the full response body
async fn execute(request: reqwest::RequestBuilder) -> Result<ApiResponse, OneSignalError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        error!("OneSignal API error: {} - {}", status, body);
        return Err(OneSignalError::Remote { status, body });
    }

    info!("OneSignal request succeeded with status {}", status);

    Ok(ApiResponse { status, body })
}

/// Build the shared message params for the convenience senders.
///
/// Options left unset never appear as keys in the body.
fn message_params(message: &str, options: SendOptions) -> Params {
    let mut params = Params::new();
    params.insert("contents".into(), serde_json::json!({ "en": message }));

    if let Some(url) = options.url {
        params.insert("url".into(), Value::String(url));
    }

    if let Some(data) = options.data {
        params.insert("data".into(), data);
    }

    if let Some(buttons) = options.buttons {
        params.insert("buttons".into(), buttons);
    }

    if let Some(schedule) = options.schedule {
        params.insert("send_after".into(), schedule.to_value());
    }

    params
}

// Targeting-default check: absent, null, and empty-array values all count
// as "not provided".
fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
