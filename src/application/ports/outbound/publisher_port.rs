//! Record publisher port - Outbound message broker

use std::time::Duration;

use async_trait::async_trait;

/// Errors raised while publishing a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("Broker rejected record {key}: {reason}")]
    Rejected { key: String, reason: String },

    #[error("Timed out after {timeout_ms}ms waiting for acknowledgement of {key}")]
    Timeout { key: String, timeout_ms: u64 },

    #[error("Failed to encode record {key}: {reason}")]
    Encoding { key: String, reason: String },

    #[error("Publish of {key} cancelled by shutdown")]
    Cancelled { key: String },

    #[error("Broker connection error: {0}")]
    Connection(String),
}

/// Long-lived handle to a message broker
///
/// Implementations own one connection/session for their whole lifetime and
/// must be safe to reuse across export cycles.
#[async_trait]
pub trait RecordPublisherPort: Send + Sync {
    /// Send one payload and wait for the broker's acknowledgement
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError>;

    /// Wait for buffered messages to be delivered
    async fn flush(&self, timeout: Duration) -> Result<(), PublishError>;
}
