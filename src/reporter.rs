//! Report cycle: encode, POST, and hand failures to the resend hook.

use crate::domain::{HeaderInfo, MetricRecord};
use crate::encoder::{EncodingError, JsonEncoder};
use crate::reliability::{DiscardSink, PayloadSink};
use crate::sender::{Delivery, HttpClient, PayloadTransmitter, SenderStats, StatsSnapshot, TransmissionError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Result of one report cycle that got as far as a send attempt.
#[derive(Debug)]
pub enum ReportOutcome {
    Delivered(Delivery),
    /// The collector did not take the payload. `stored` tells whether the
    /// resend hook accepted it.
    Failed {
        error: TransmissionError,
        stored: bool,
    },
}

impl ReportOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

pub struct ReporterBuilder {
    client: HttpClient,
    header: HeaderInfo,
    encoder: JsonEncoder,
    sink: Arc<dyn PayloadSink>,
}

impl ReporterBuilder {
    pub fn header(mut self, header: HeaderInfo) -> Self {
        self.header = header;
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.header.set_key(key);
        self
    }

    pub fn app(mut self, app: &str) -> Self {
        self.header.set_app(app);
        self
    }

    pub fn env(mut self, env: &str) -> Self {
        self.header.set_env(env);
        self
    }

    pub fn server(mut self, server: &str) -> Self {
        self.header.set_server(server);
        self
    }

    pub fn encoder(mut self, encoder: JsonEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Where payloads go when delivery fails. Defaults to [`DiscardSink`].
    pub fn sink(mut self, sink: Arc<dyn PayloadSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Reporter {
        Reporter {
            transmitter: PayloadTransmitter::new(self.client),
            encoder: self.encoder,
            header: self.header,
            sink: self.sink,
            stats: SenderStats::new(),
            in_flight: Mutex::new(()),
        }
    }
}

/// Sends metric snapshots to a remote collector.
///
/// Header values are fixed once the reporter is built. Concurrent calls to
/// [`Reporter::report`] are served one at a time.
pub struct Reporter {
    transmitter: PayloadTransmitter,
    encoder: JsonEncoder,
    header: HeaderInfo,
    sink: Arc<dyn PayloadSink>,
    stats: SenderStats,
    in_flight: Mutex<()>,
}

impl Reporter {
    pub fn builder(client: HttpClient) -> ReporterBuilder {
        ReporterBuilder {
            client,
            header: HeaderInfo::default(),
            encoder: JsonEncoder::default(),
            sink: Arc::new(DiscardSink),
        }
    }

    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    pub fn encoder(&self) -> &JsonEncoder {
        &self.encoder
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Encode and send one snapshot of collected metrics.
    ///
    /// Only encoding errors are returned as `Err`; they indicate a malformed
    /// record and no send is attempted. Transport and protocol failures are
    /// logged, passed to the resend hook once with the exact payload, and
    /// reported through [`ReportOutcome::Failed`].
    pub async fn report(&self, records: &[MetricRecord]) -> Result<ReportOutcome, EncodingError> {
        let _in_flight = self.in_flight.lock().await;

        let collection_time = self.encoder.clock().now_millis();
        let json = self.encoder.encode(&self.header, records, collection_time)?;

        debug!(
            "Reporting {} metrics ({} bytes) to {}",
            records.len(),
            json.len(),
            self.transmitter.client.endpoint()
        );

        match self.transmitter.send(&json, self.header.key()).await {
            Ok(delivery) => {
                self.stats.record_delivery(delivery.bytes_sent);
                Ok(ReportOutcome::Delivered(delivery))
            }
            Err(error) => {
                self.stats.record_failure();
                if error.is_protocol() {
                    warn!("Unsuccessful sending metrics payload to server: {error}");
                } else {
                    error!("Exception sending metrics to server: {error}");
                }
                let stored = self.store_for_resend(&json).await;
                Ok(ReportOutcome::Failed { error, stored })
            }
        }
    }

    /// Send a payload produced by an earlier cycle. The resend hook is not
    /// involved; the caller decides what to do with a failure.
    pub async fn resend(&self, payload: &str) -> Result<Delivery, TransmissionError> {
        let _in_flight = self.in_flight.lock().await;

        let result = self.transmitter.send(payload, self.header.key()).await;
        match &result {
            Ok(delivery) => {
                self.stats.record_delivery(delivery.bytes_sent);
                info!("Resent metrics payload ({} bytes)", delivery.bytes_sent);
            }
            Err(e) => {
                self.stats.record_failure();
                warn!("Resending metrics payload failed: {e}");
            }
        }
        result
    }

    async fn store_for_resend(&self, json: &str) -> bool {
        match self.sink.store(json).await {
            Ok(()) => {
                self.stats.record_resend_hook(true);
                true
            }
            Err(e) => {
                self.stats.record_resend_hook(false);
                error!("Failed to store metrics payload for resend: {e}");
                false
            }
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("endpoint", &self.transmitter.client.endpoint().as_str())
            .field("header", &self.header)
            .field("encoder", &self.encoder)
            .field("stats", &self.stats)
            .finish()
    }
}
