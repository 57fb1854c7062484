pub mod client;
pub mod stats;
pub mod transmission;

pub use client::{AckPolicy, ClientConfig, ClientError, HttpClient};
pub use stats::{SenderStats, StatsSnapshot};
pub use transmission::{Delivery, KEY_CODE_HEADER, PayloadTransmitter, TransmissionError};
