use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Spool disk budget exceeded ({needed} bytes needed, {available} available)")]
    DiskSpaceExceeded { needed: u64, available: u64 },
    #[error("Payload not found: {0}")]
    PayloadNotFound(String),
    #[error("Stored payload is not valid UTF-8: {0}")]
    InvalidPayload(String),
    #[error("Resend queue is full")]
    QueueFull,
    #[error("Resend queue is closed")]
    QueueClosed,
}

pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Receives payloads the collector did not acknowledge, so they can be
/// kept for a later resend.
///
/// This trait is dyn-compatible by using boxed futures instead of `impl Future`.
pub trait PayloadSink: Send + Sync {
    fn store<'a>(&'a self, payload: &'a str) -> SinkFuture<'a>;
}

/// Drops failed payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl PayloadSink for DiscardSink {
    fn store<'a>(&'a self, _payload: &'a str) -> SinkFuture<'a> {
        Box::pin(async { Ok(()) })
    }
}

/// Hands failed payloads to an application-owned queue.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<String>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end of its queue.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }
}

impl PayloadSink for ChannelSink {
    fn store<'a>(&'a self, payload: &'a str) -> SinkFuture<'a> {
        Box::pin(async move {
            self.sender
                .try_send(payload.to_string())
                .map_err(|e| match e {
                    mpsc::error::TrySendError::Full(_) => SinkError::QueueFull,
                    mpsc::error::TrySendError::Closed(_) => SinkError::QueueClosed,
                })
        })
    }
}
