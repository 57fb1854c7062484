use super::{Config, ConfigError};
use crate::domain::sanitize;
use reqwest::header::HeaderValue;
use url::Url;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate endpoint URL
        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid endpoint URL '{}': {}", self.endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Endpoint must use http or https: {}",
                self.endpoint
            )));
        }

        // Validate timeouts
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        if self.connection_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Connection timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_spool_mb == 0 {
            return Err(ConfigError::InvalidConfig(
                "Spool size must be greater than 0".to_string(),
            ));
        }

        // The key travels as the `key-code` header on every report
        if !self.disable_key_header && HeaderValue::from_str(&sanitize(&self.key)).is_err() {
            return Err(ConfigError::InvalidConfig(
                "Access key contains characters not allowed in an HTTP header".to_string(),
            ));
        }

        if let Some(token) = &self.ack_token
            && token.trim().is_empty()
        {
            return Err(ConfigError::InvalidConfig(
                "Acknowledgement token cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
