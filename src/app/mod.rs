pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, LogLevel};
pub use logging::init_tracing;

use crate::reliability::{DiskSpool, PayloadSink, SinkError};
use crate::reporter::Reporter;
use crate::sender::HttpClient;
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What one pass over the spool achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub resent: usize,
    pub remaining: usize,
    pub expired: u32,
}

/// Build a reporter whose failed payloads land in `spool`.
pub fn build_reporter(config: &Config, spool: Arc<DiskSpool>) -> anyhow::Result<Reporter> {
    let client = HttpClient::new(config.client_config()).context("building HTTP client")?;
    let sink: Arc<dyn PayloadSink> = spool;

    Ok(Reporter::builder(client)
        .header(config.header_info())
        .encoder(config.encoder())
        .sink(sink)
        .build())
}

/// Resend spooled payloads oldest first, removing each one the collector
/// acknowledges. Stops at the first delivery failure so nothing is lost and
/// ordering is kept for the next pass.
pub async fn replay_spool(reporter: &Reporter, spool: &DiskSpool) -> Result<ReplaySummary, SinkError> {
    let expired = spool.cleanup_expired().await?;
    let ids = spool.list().await?;
    let mut resent = 0;

    for id in &ids {
        let payload = match spool.load(id).await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Skipping unreadable spooled payload {id}: {e}");
                continue;
            }
        };

        if let Err(e) = reporter.resend(&payload).await {
            warn!("Stopping replay at payload {id}: {e}");
            break;
        }

        spool.remove(id).await?;
        resent += 1;
    }

    Ok(ReplaySummary {
        resent,
        remaining: ids.len() - resent,
        expired,
    })
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<()> {
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::ArgError(e)) => e.exit(),
        Err(e) => return Err(e).context("loading configuration"),
    };

    init_tracing(config.log_level)?;

    info!("Starting rask-metric-reporter v{}", get_version());
    info!(
        "Configuration: endpoint={}, spool={}",
        config.endpoint,
        config.spool_path.display()
    );

    let spool = Arc::new(
        DiskSpool::open(config.spool_config())
            .await
            .context("opening spool directory")?,
    );
    let reporter = build_reporter(&config, spool.clone())?;

    let summary = replay_spool(&reporter, &spool).await?;
    info!(
        "Replay finished: {} resent, {} remaining, {} expired",
        summary.resent, summary.remaining, summary.expired
    );

    Ok(())
}
