//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment gateway API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayApiConfig {
    /// Gateway API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Gateway API key
    pub api_key: SecretString,

    /// Shared secret for webhook signature verification
    pub webhook_secret: SecretString,

    /// Per-request timeout in seconds. A timeout is an unknown outcome,
    /// not a failure; callers retry through the idempotent paths.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl GatewayApiConfig {
    /// Request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate gateway configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl);
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GARRISON__GATEWAY__API_KEY"));
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "GARRISON__GATEWAY__WEBHOOK_SECRET",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.gateway.example".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
