#![allow(dead_code)]

use rask_metric_reporter::domain::{CounterStatistics, GroupMember, MetricRecord, ValueStatistics};
use rask_metric_reporter::reliability::{PayloadSink, SinkError, SinkFuture};
use std::sync::Mutex;

pub const NOW: i64 = 1_700_000_000_000;

/// Freeze a window of raw samples the way the metric collector would.
pub fn collect(samples: &[i64], start_millis: i64) -> ValueStatistics {
    if samples.is_empty() {
        return ValueStatistics::empty(start_millis);
    }
    let total: i64 = samples.iter().sum();
    let max = samples.iter().copied().max().unwrap_or_default();
    let count = samples.len() as u64;
    ValueStatistics::new(count, total / count as i64, max, total, start_millis)
}

pub fn counter_metric() -> MetricRecord {
    MetricRecord::counter("org.test.CounterFoo.doStuff", CounterStatistics::new(10, NOW))
}

pub fn gauge_metric() -> MetricRecord {
    MetricRecord::gauge("org.test.GaugeFoo.doStuff", 24.0)
}

pub fn value_metric() -> MetricRecord {
    MetricRecord::value("org.test.ValueFoo.doStuff", collect(&[12, 14, 16], NOW))
}

fn micros(nanos: &[i64]) -> Vec<i64> {
    nanos.iter().map(|n| n / 1000).collect()
}

/// Durations are recorded in nanos and reported in micros.
pub fn timed_metric() -> MetricRecord {
    MetricRecord::timed(
        "org.test.TimedFoo.doStuff",
        collect(&micros(&[100_000, 120_000, 140_000]), NOW),
        collect(&micros(&[200_000, 220_000]), NOW),
    )
}

pub fn gauge_group_metric() -> MetricRecord {
    MetricRecord::gauge_group(
        "jvm.memory",
        vec![GroupMember::new("heap", 128.5), GroupMember::new("nonHeap", 64.0)],
    )
}

/// Sink that keeps every payload it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    payloads: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

impl PayloadSink for RecordingSink {
    fn store<'a>(&'a self, payload: &'a str) -> SinkFuture<'a> {
        self.payloads.lock().unwrap().push(payload.to_string());
        Box::pin(async { Ok(()) })
    }
}

/// Sink that refuses everything.
#[derive(Debug, Default)]
pub struct FailingSink;

impl PayloadSink for FailingSink {
    fn store<'a>(&'a self, _payload: &'a str) -> SinkFuture<'a> {
        Box::pin(async { Err(SinkError::QueueClosed) })
    }
}
