use super::{ConfigError, LogLevel};
use crate::domain::HeaderInfo;
use crate::encoder::{DurationBasis, GroupLayout, JsonEncoder};
use crate::reliability::SpoolConfig;
use crate::sender::{AckPolicy, ClientConfig};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Collector endpoint URL
    #[arg(long, env = "METRICS_ENDPOINT", default_value = "http://127.0.0.1:8080/")]
    pub endpoint: String,

    /// Access key sent with every report
    #[arg(long, env = "METRICS_KEY", default_value = "")]
    pub key: String,

    /// Application name
    #[arg(long, env = "METRICS_APP", default_value = "")]
    pub app: String,

    /// Environment label (e.g. dev, prod)
    #[arg(long = "env", env = "METRICS_ENV", default_value = "")]
    pub environment: String,

    /// Server label (defaults to the hostname)
    #[arg(long, env = "METRICS_SERVER")]
    pub server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "REPORT_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[arg(long, env = "CONNECTION_TIMEOUT_SECS", default_value = "10")]
    pub connection_timeout_secs: u64,

    /// Do not send the access key as a `key-code` request header
    #[arg(long, env = "DISABLE_KEY_HEADER")]
    pub disable_key_header: bool,

    /// Body token the collector answers with on success
    #[arg(long, env = "METRICS_ACK_TOKEN")]
    pub ack_token: Option<String>,

    /// Layout of gauge group members
    #[arg(long, env = "GROUP_LAYOUT", value_enum, default_value = "object")]
    pub group_layout: GroupLayout,

    /// Time reference for `dur` fields
    #[arg(long, env = "DURATION_BASIS", value_enum, default_value = "live-clock")]
    pub duration_basis: DurationBasis,

    /// Directory holding payloads that failed delivery
    #[arg(long, env = "SPOOL_PATH", default_value = "/tmp/rask-metric-reporter/spool")]
    pub spool_path: PathBuf,

    /// Maximum spool size in MB
    #[arg(long, env = "MAX_SPOOL_MB", default_value = "256")]
    pub max_spool_mb: u64,

    /// Hours a spooled payload is kept before it is discarded
    #[arg(long, env = "SPOOL_RETENTION_HOURS", default_value = "72")]
    pub spool_retention_hours: u64,

    /// Store spooled payloads uncompressed
    #[arg(long, env = "DISABLE_SPOOL_COMPRESSION")]
    pub disable_spool_compression: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/".to_string(),
            key: String::new(),
            app: String::new(),
            environment: String::new(),
            server: None,
            timeout_secs: 30,
            connection_timeout_secs: 10,
            disable_key_header: false,
            ack_token: None,
            group_layout: GroupLayout::Object,
            duration_basis: DurationBasis::LiveClock,
            spool_path: PathBuf::from("/tmp/rask-metric-reporter/spool"),
            max_spool_mb: 256,
            spool_retention_hours: 72,
            disable_spool_compression: false,
            log_level: LogLevel::Info,
            config_file: None,
        }
    }
}

impl Config {
    /// Parse CLI arguments (environment variables fill unset flags). When a
    /// config file is named, it replaces the parsed values.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::try_parse_from(args)?;

        if let Some(config_file) = &config.config_file {
            return Self::from_file(config_file);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            connection_timeout: Duration::from_secs(self.connection_timeout_secs),
            send_key_header: !self.disable_key_header,
            ack: match &self.ack_token {
                Some(token) => AckPolicy::Body(token.trim().to_string()),
                None => AckPolicy::Status,
            },
            ..ClientConfig::default()
        }
    }

    /// Header labels, sanitized. A missing server label falls back to the
    /// hostname.
    pub fn header_info(&self) -> HeaderInfo {
        let server = match &self.server {
            Some(server) => server.clone(),
            None => hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_default(),
        };
        HeaderInfo::new(&self.key, &self.app, &self.environment, &server)
    }

    pub fn spool_config(&self) -> SpoolConfig {
        SpoolConfig {
            storage_path: self.spool_path.clone(),
            max_disk_usage: self.max_spool_mb.saturating_mul(1024 * 1024),
            retention_period: Duration::from_secs(
                self.spool_retention_hours.saturating_mul(3600),
            ),
            compression: !self.disable_spool_compression,
        }
    }

    pub fn encoder(&self) -> JsonEncoder {
        JsonEncoder::default()
            .with_group_layout(self.group_layout)
            .with_duration_basis(self.duration_basis)
    }
}
