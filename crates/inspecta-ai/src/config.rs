use std::time::Duration;

/// Connection settings for the hosted inference functions.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the functions endpoint, without trailing slash.
    pub base_url: String,
    /// Bearer key sent with every request, if the deployment requires one.
    pub api_key: Option<String>,
    /// Per-request timeout. The hosted functions give up at 240s themselves.
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/functions/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(240),
        }
    }
}

impl InferenceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
