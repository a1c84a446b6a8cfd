/// Default OneSignal REST API base URL
pub const DEFAULT_API_URL: &str = "https://onesignal.com/api/v1";

/// OneSignal client configuration
#[derive(Debug, Clone)]
pub struct OneSignalConfig {
    pub app_id: String,
    pub rest_api_key: String,
    pub api_url: String,
    pub accept_invalid_certs: bool,
}

impl OneSignalConfig {
    /// Create a new configuration pointing at the public OneSignal endpoint
    pub fn new(app_id: impl Into<String>, rest_api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            rest_api_key: rest_api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            accept_invalid_certs: false,
        }
    }

    /// Override the API base URL (tests, proxies)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Skip TLS certificate verification for the API endpoint.
    ///
    /// Verification is on by default. Only opt in when talking to an
    /// interception proxy whose certificate you control.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}
