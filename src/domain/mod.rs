//! Domain layer for rask-metric-reporter.
//!
//! Contains the canonical types shared across all modules:
//! - `HeaderInfo`: The four labels that identify a reporting source
//! - `MetricRecord`: One collected metric, as a closed set of variants
//! - `ReportBatch`: Header, collection time and records for one cycle

pub mod batch;
pub mod header;
pub mod metric;

pub use batch::ReportBatch;
pub use header::{HeaderInfo, sanitize};
pub use metric::{CounterStatistics, GroupMember, MetricRecord, ValueStatistics};
