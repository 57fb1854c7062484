//! JSON wire encoding of report batches.
//!
//! Document layout (key order is part of the collector contract):
//!
//! ```text
//! {"time":<ms>,"key":"..","app":"..","env":"..","server":"..","metrics":[<record>,...]}
//! ```

mod clock;
mod number;
mod writer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use number::{elapsed_seconds, format_decimal};

use crate::domain::{GroupMember, HeaderInfo, MetricRecord, ReportBatch, ValueStatistics};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use writer::JsonWriter;

const DOCUMENT_OVERHEAD: usize = 256;
const ESTIMATED_RECORD_SIZE: usize = 160;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("{type_tag} metric has an empty name")]
    EmptyName { type_tag: &'static str },
    #[error("group metric {name} has a member with an empty key")]
    EmptyGroupKey { name: String },
    #[error("JSON string encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shape of the `group` field for gauge and gauge-counter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupLayout {
    /// `"group":{"a":1.0,"b":2.0}`
    #[default]
    Object,
    /// `"group":["a":1.0, "b":2.0]`, for collectors that still parse the
    /// historical format. Not valid JSON.
    LegacyArray,
}

/// Which "now" the `dur` fields are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationBasis {
    /// Read the clock while encoding each record.
    #[default]
    LiveClock,
    /// Use the batch's collection timestamp, making output deterministic.
    CollectionTime,
}

/// Turns metric records into the collector's JSON document.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    clock: Arc<dyn Clock>,
    group_layout: GroupLayout,
    duration_basis: DurationBasis,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl JsonEncoder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            group_layout: GroupLayout::default(),
            duration_basis: DurationBasis::default(),
        }
    }

    pub fn with_group_layout(mut self, group_layout: GroupLayout) -> Self {
        self.group_layout = group_layout;
        self
    }

    pub fn with_duration_basis(mut self, duration_basis: DurationBasis) -> Self {
        self.duration_basis = duration_basis;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn group_layout(&self) -> GroupLayout {
        self.group_layout
    }

    pub fn duration_basis(&self) -> DurationBasis {
        self.duration_basis
    }

    pub fn encode_batch(&self, batch: &ReportBatch) -> Result<String, EncodingError> {
        self.encode(&batch.header, &batch.records, batch.collection_time_millis)
    }

    /// Encode a full report document. Records keep the caller's order.
    pub fn encode(
        &self,
        header: &HeaderInfo,
        records: &[MetricRecord],
        collection_time_millis: i64,
    ) -> Result<String, EncodingError> {
        let capacity = records
            .len()
            .saturating_mul(ESTIMATED_RECORD_SIZE)
            .saturating_add(DOCUMENT_OVERHEAD);
        let mut writer = JsonWriter::with_capacity(capacity);

        writer.raw("{");
        writer.key_integer("time", collection_time_millis)?.comma();
        writer.key_string("key", header.key())?.comma();
        writer.key_string("app", header.app())?.comma();
        writer.key_string("env", header.env())?.comma();
        writer.key_string("server", header.server())?.comma();
        writer.key("metrics")?.raw("[");

        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                writer.comma();
            }
            self.write_record(&mut writer, record, collection_time_millis)?;
        }

        writer.raw("]}");
        Ok(writer.finish())
    }

    /// Encode a single record, measuring `dur` against the clock.
    pub fn encode_record(&self, record: &MetricRecord) -> Result<String, EncodingError> {
        let mut writer = JsonWriter::with_capacity(ESTIMATED_RECORD_SIZE);
        self.write_record(&mut writer, record, self.clock.now_millis())?;
        Ok(writer.finish())
    }

    fn write_record(
        &self,
        writer: &mut JsonWriter,
        record: &MetricRecord,
        collection_time_millis: i64,
    ) -> Result<(), EncodingError> {
        let name = record.name();
        if name.trim().is_empty() {
            return Err(EncodingError::EmptyName {
                type_tag: record.type_tag(),
            });
        }

        writer.raw("{");
        writer.key_string("type", record.type_tag())?.comma();
        writer.key_string("name", name)?.comma();

        match record {
            MetricRecord::Counter { stats, .. } => {
                writer.key_unsigned("count", stats.count)?.comma();
                let now = self.now(collection_time_millis);
                writer.key_integer("dur", elapsed_seconds(stats.start_millis, now))?;
            }
            MetricRecord::Gauge { value, .. } => {
                writer.key_decimal("value", *value)?;
            }
            MetricRecord::GaugeCounter { value, .. } => {
                writer.key_integer("value", *value)?;
            }
            MetricRecord::GaugeGroup { members, .. } => {
                self.write_group(writer, name, members, |w, key, value| {
                    w.key_decimal(key, *value).map(|_| ())
                })?;
            }
            MetricRecord::GaugeCounterGroup { members, .. } => {
                self.write_group(writer, name, members, |w, key, value| {
                    w.key_integer(key, *value).map(|_| ())
                })?;
            }
            MetricRecord::Value { stats, .. } => {
                self.write_statistics(writer, "n", stats, collection_time_millis)?;
            }
            MetricRecord::Timed { success, error, .. } => {
                self.write_statistics(writer, "n", success, collection_time_millis)?;
                writer.comma();
                self.write_statistics(writer, "e", error, collection_time_millis)?;
            }
        }

        writer.raw("}");
        Ok(())
    }

    fn write_group<T>(
        &self,
        writer: &mut JsonWriter,
        name: &str,
        members: &[GroupMember<T>],
        write_member: impl Fn(&mut JsonWriter, &str, &T) -> Result<(), EncodingError>,
    ) -> Result<(), EncodingError> {
        if members.iter().any(|m| m.key.is_empty()) {
            return Err(EncodingError::EmptyGroupKey {
                name: name.to_string(),
            });
        }

        let (open, separator, close) = match self.group_layout {
            GroupLayout::Object => ("{", ",", "}"),
            GroupLayout::LegacyArray => ("[", ", ", "]"),
        };

        writer.key("group")?.raw(open);
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                writer.raw(separator);
            }
            write_member(writer, &member.key, &member.value)?;
        }
        writer.raw(close);
        Ok(())
    }

    /// `{"count":n}` for an empty window, all aggregates otherwise.
    fn write_statistics(
        &self,
        writer: &mut JsonWriter,
        label: &str,
        stats: &ValueStatistics,
        collection_time_millis: i64,
    ) -> Result<(), EncodingError> {
        writer.key(label)?.raw("{");
        writer.key_unsigned("count", stats.count)?;

        if !stats.is_empty() {
            writer.comma();
            writer.key_integer("avg", stats.mean)?.comma();
            writer.key_integer("max", stats.max)?.comma();
            writer.key_integer("sum", stats.total)?.comma();
            let now = self.now(collection_time_millis);
            writer.key_integer("dur", elapsed_seconds(stats.start_millis, now))?;
        }

        writer.raw("}");
        Ok(())
    }

    fn now(&self, collection_time_millis: i64) -> i64 {
        match self.duration_basis {
            DurationBasis::LiveClock => self.clock.now_millis(),
            DurationBasis::CollectionTime => collection_time_millis,
        }
    }
}
