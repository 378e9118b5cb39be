//! Connection settings for the task service client

use bon::Builder;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Client configuration
#[derive(Debug, Clone, Builder)]
pub struct ClientConfig {
    /// Base URL shared by the auth and task services
    #[builder(into, default = DEFAULT_SERVER_URL.to_string())]
    pub server_url: String,

    /// Per-request timeout (None = wait indefinitely)
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout: None,
        }
    }
}
