pub mod disk;
pub mod sink;

pub use disk::{DiskSpool, SpoolConfig};
pub use sink::{ChannelSink, DiscardSink, PayloadSink, SinkError, SinkFuture};
