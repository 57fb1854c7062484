use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// How the collector acknowledges a payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckPolicy {
    /// Any 2xx status is a delivery.
    #[default]
    Status,
    /// 2xx and the first line of the body, trimmed, must equal the token.
    Body(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    /// Also send the access key as a `key-code` request header.
    pub send_key_header: bool,
    pub ack: AckPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/".to_string(),
            timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            user_agent: format!("rask-metric-reporter/{}", env!("CARGO_PKG_VERSION")),
            send_key_header: true,
            ack: AckPolicy::Status,
        }
    }
}

/// reqwest client bound to one collector endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    pub client: Client,
    pub config: ClientConfig,
    endpoint_url: Url,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let endpoint_url: Url = config.endpoint.parse().map_err(|e| {
            ClientError::InvalidConfiguration(format!(
                "Invalid endpoint URL '{}': {}",
                config.endpoint, e
            ))
        })?;

        if !matches!(endpoint_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfiguration(format!(
                "Unsupported endpoint scheme: {}",
                endpoint_url.scheme()
            )));
        }

        if config.timeout.is_zero() {
            return Err(ClientError::InvalidConfiguration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            endpoint_url,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint_url
    }
}
