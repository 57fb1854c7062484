use super::sink::{PayloadSink, SinkError, SinkFuture};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const PLAIN_SUFFIX: &str = ".json";
const COMPRESSED_SUFFIX: &str = ".json.gz";

#[derive(Debug, Clone)]
pub struct SpoolConfig {
    pub storage_path: PathBuf,
    pub max_disk_usage: u64, // bytes
    pub retention_period: Duration,
    pub compression: bool,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("/tmp/rask-metric-reporter/spool"),
            max_disk_usage: 256 * 1024 * 1024,                // 256MB
            retention_period: Duration::from_secs(72 * 3600), // 3 days
            compression: true,
        }
    }
}

/// Directory of payloads that failed delivery, one file per payload.
///
/// Ids are `<millis>-<sequence>-<uuid>` with both numbers zero-padded, so
/// sorting ids sorts payloads oldest first, even within one millisecond.
#[derive(Debug)]
pub struct DiskSpool {
    config: SpoolConfig,
    current_usage: Mutex<u64>,
    sequence: AtomicU64,
}

impl DiskSpool {
    pub async fn open(config: SpoolConfig) -> Result<Self, SinkError> {
        // Create storage directory if it doesn't exist
        fs::create_dir_all(&config.storage_path).await?;

        let current_usage = Self::calculate_disk_usage(&config.storage_path).await?;
        let next_sequence = Self::next_sequence(&config.storage_path).await?;

        Ok(Self {
            config,
            current_usage: Mutex::new(current_usage),
            sequence: AtomicU64::new(next_sequence),
        })
    }

    pub fn config(&self) -> &SpoolConfig {
        &self.config
    }

    /// Persist a payload and return its id.
    pub async fn store_payload(&self, payload: &str) -> Result<String, SinkError> {
        let data = if self.config.compression {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(payload.as_bytes())?;
            encoder.finish()?
        } else {
            payload.as_bytes().to_vec()
        };

        let mut usage = self.current_usage.lock().await;
        let needed = data.len() as u64;
        if usage.saturating_add(needed) > self.config.max_disk_usage {
            return Err(SinkError::DiskSpaceExceeded {
                needed,
                available: self.config.max_disk_usage.saturating_sub(*usage),
            });
        }

        // Taken under the usage lock so ids follow write order.
        let stored_at = chrono::Utc::now().timestamp_millis();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "{stored_at:013}-{sequence:020}-{}",
            uuid::Uuid::new_v4().simple()
        );

        let suffix = if self.config.compression {
            COMPRESSED_SUFFIX
        } else {
            PLAIN_SUFFIX
        };
        let file_path = self.config.storage_path.join(format!("{id}{suffix}"));
        let mut file = fs::File::create(&file_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        *usage += needed;

        tracing::debug!("Spooled payload {} ({} bytes)", id, data.len());
        Ok(id)
    }

    /// Ids of all spooled payloads, oldest first.
    pub async fn list(&self) -> Result<Vec<String>, SinkError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.config.storage_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if let Some(file_name) = entry.file_name().to_str()
                && let Some(id) = Self::id_from_file_name(file_name)
            {
                ids.push(id.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    pub async fn load(&self, id: &str) -> Result<String, SinkError> {
        let (path, compressed) = self.locate(id)?;
        let data = fs::read(&path).await?;

        let bytes = if compressed {
            let mut decoder = GzDecoder::new(data.as_slice());
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            decompressed
        } else {
            data
        };

        String::from_utf8(bytes).map_err(|e| SinkError::InvalidPayload(format!("{id}: {e}")))
    }

    pub async fn remove(&self, id: &str) -> Result<(), SinkError> {
        let (path, _) = self.locate(id)?;
        let file_size = fs::metadata(&path).await?.len();
        fs::remove_file(&path).await?;

        let mut usage = self.current_usage.lock().await;
        *usage = usage.saturating_sub(file_size);

        tracing::debug!("Removed spooled payload {id}");
        Ok(())
    }

    /// Delete payloads older than the retention period.
    pub async fn cleanup_expired(&self) -> Result<u32, SinkError> {
        let now = chrono::Utc::now().timestamp_millis();
        let retention_millis =
            i64::try_from(self.config.retention_period.as_millis()).unwrap_or(i64::MAX);
        let mut deleted_count = 0;

        for id in self.list().await? {
            let Some(stored_at) = Self::stored_at(&id) else {
                continue;
            };
            if now.saturating_sub(stored_at) > retention_millis
                && let Ok(()) = self.remove(&id).await
            {
                deleted_count += 1;
            }
        }

        if deleted_count > 0 {
            tracing::info!("Cleaned up {deleted_count} expired payloads from spool");
        }

        Ok(deleted_count)
    }

    pub async fn current_disk_usage(&self) -> u64 {
        *self.current_usage.lock().await
    }

    fn locate(&self, id: &str) -> Result<(PathBuf, bool), SinkError> {
        let compressed = self.config.storage_path.join(format!("{id}{COMPRESSED_SUFFIX}"));
        if compressed.exists() {
            return Ok((compressed, true));
        }

        let plain = self.config.storage_path.join(format!("{id}{PLAIN_SUFFIX}"));
        if plain.exists() {
            return Ok((plain, false));
        }

        Err(SinkError::PayloadNotFound(id.to_string()))
    }

    fn id_from_file_name(file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(COMPRESSED_SUFFIX)
            .or_else(|| file_name.strip_suffix(PLAIN_SUFFIX))
    }

    fn stored_at(id: &str) -> Option<i64> {
        id.split('-').next()?.parse().ok()
    }

    fn sequence_of(id: &str) -> Option<u64> {
        id.split('-').nth(1)?.parse().ok()
    }

    /// One past the highest sequence already on disk.
    async fn next_sequence(path: &Path) -> Result<u64, SinkError> {
        let mut next = 0u64;
        let mut entries = fs::read_dir(path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if let Some(file_name) = entry.file_name().to_str()
                && let Some(id) = Self::id_from_file_name(file_name)
                && let Some(sequence) = Self::sequence_of(id)
            {
                next = next.max(sequence.saturating_add(1));
            }
        }

        Ok(next)
    }

    async fn calculate_disk_usage(path: &Path) -> Result<u64, SinkError> {
        let mut total_size = 0u64;
        let mut entries = fs::read_dir(path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                total_size += entry.metadata().await?.len();
            }
        }

        Ok(total_size)
    }
}

impl PayloadSink for DiskSpool {
    fn store<'a>(&'a self, payload: &'a str) -> SinkFuture<'a> {
        Box::pin(async move {
            let id = self.store_payload(payload).await?;
            tracing::info!("Stored unsent metrics payload {id} for resend");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_file_name() {
        assert_eq!(DiskSpool::id_from_file_name("0001-ab.json"), Some("0001-ab"));
        assert_eq!(DiskSpool::id_from_file_name("0001-ab.json.gz"), Some("0001-ab"));
        assert_eq!(DiskSpool::id_from_file_name("notes.txt"), None);
    }

    #[test]
    fn test_stored_at_parses_prefix() {
        assert_eq!(
            DiskSpool::stored_at("1700000000000-0123abcd"),
            Some(1_700_000_000_000)
        );
        assert_eq!(DiskSpool::stored_at("garbage"), None);
    }

    #[test]
    fn test_sequence_parses_second_field() {
        assert_eq!(
            DiskSpool::sequence_of("1700000000000-00000000000000000042-0123abcd"),
            Some(42)
        );
        assert_eq!(DiskSpool::sequence_of("1700000000000-broken"), None);
    }
}
