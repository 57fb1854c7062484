#![warn(rust_2018_idioms)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::cast_possible_truncation, // Millisecond durations fit comfortably in i64
    clippy::cast_precision_loss,      // Acceptable for elapsed-seconds rounding
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,  // e.g. EncodingError in encoder module
    clippy::must_use_candidate
)]

pub mod app;
pub mod domain;
pub mod encoder;
pub mod reliability;
pub mod reporter;
pub mod sender;

// Re-export main types for easy access
pub use domain::{HeaderInfo, MetricRecord, ReportBatch, ValueStatistics};
pub use encoder::{EncodingError, JsonEncoder};
pub use reliability::{DiscardSink, PayloadSink};
pub use reporter::{ReportOutcome, Reporter};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
