use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept by a reporter across report cycles.
#[derive(Debug, Default)]
pub struct SenderStats {
    reports: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    bytes_sent: AtomicU64,
    resend_hook_calls: AtomicU64,
    resend_hook_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub reports: u64,
    pub delivered: u64,
    pub failed: u64,
    pub bytes_sent: u64,
    pub resend_hook_calls: u64,
    pub resend_hook_failures: u64,
}

impl SenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_delivery(&self, bytes: usize) {
        self.reports.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.reports.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resend_hook(&self, stored: bool) {
        self.resend_hook_calls.fetch_add(1, Ordering::Relaxed);
        if !stored {
            self.resend_hook_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reports: self.reports.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            resend_hook_calls: self.resend_hook_calls.load(Ordering::Relaxed),
            resend_hook_failures: self.resend_hook_failures.load(Ordering::Relaxed),
        }
    }
}
