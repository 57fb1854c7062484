use super::client::{AckPolicy, HttpClient};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

pub const KEY_CODE_HEADER: &str = "key-code";

#[derive(Error, Debug)]
pub enum TransmissionError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error: {status}")]
    Status { status: u16 },
    #[error("Unexpected acknowledgement: expected {expected:?}, received {received:?}")]
    UnexpectedAck { expected: String, received: String },
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
}

impl TransmissionError {
    /// The collector could not be reached or the exchange broke off.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The collector answered, but not with an acknowledgement.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::UnexpectedAck { .. })
    }
}

/// A payload the collector acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status_code: u16,
    pub latency: Duration,
    pub bytes_sent: usize,
}

/// POSTs encoded payloads and classifies the collector's answer.
#[derive(Debug, Clone)]
pub struct PayloadTransmitter {
    pub client: HttpClient,
}

impl PayloadTransmitter {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn send(&self, payload: &str, key: &str) -> Result<Delivery, TransmissionError> {
        let start = Instant::now();
        let headers = self.build_headers(key)?;
        let bytes_sent = payload.len();

        trace!("Sending:\n {payload}");

        let response = self
            .client
            .client
            .post(self.client.endpoint().clone())
            .headers(headers)
            .body(payload.to_owned())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransmissionError::Status {
                status: status.as_u16(),
            });
        }

        if let AckPolicy::Body(expected) = &self.client.config.ack {
            let body = response.text().await?;
            let received = body.lines().next().unwrap_or_default().trim();
            if received != expected {
                return Err(TransmissionError::UnexpectedAck {
                    expected: expected.clone(),
                    received: received.to_string(),
                });
            }
        }

        let latency = start.elapsed();
        debug!(
            "Collector accepted payload ({} bytes, HTTP {}) in {:?}",
            bytes_sent,
            status.as_u16(),
            latency
        );

        Ok(Delivery {
            status_code: status.as_u16(),
            latency,
            bytes_sent,
        })
    }

    pub fn build_headers(&self, key: &str) -> Result<HeaderMap, TransmissionError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if self.client.config.send_key_header && !key.is_empty() {
            headers.insert(
                HeaderName::from_static(KEY_CODE_HEADER),
                HeaderValue::from_str(key).map_err(|e| {
                    TransmissionError::InvalidHeaderValue(format!("Invalid key: {e}"))
                })?,
            );
        }

        Ok(headers)
    }
}
