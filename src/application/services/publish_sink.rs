//! Publish Sink - Hands finished records to the message broker
//!
//! The sink wraps one long-lived [`RecordPublisherPort`] handle. Every record
//! is encoded as a flat JSON object and sent under the key `time|entityID`.
//! Each acknowledgement wait is bounded so an unresponsive broker cannot stall
//! the simulation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::ports::outbound::{PublishError, RecordPublisherPort};
use crate::domain::entities::Record;

/// Outcome of publishing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    pub key: String,
    pub result: Result<(), PublishError>,
}

/// Publishes records to a named topic through a shared publisher
pub struct PublishSink<P: RecordPublisherPort> {
    publisher: Arc<P>,
    topic: String,
    ack_timeout: Duration,
}

impl<P: RecordPublisherPort> PublishSink<P> {
    pub fn new(publisher: Arc<P>, topic: impl Into<String>, ack_timeout: Duration) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            ack_timeout,
        }
    }

    /// Publish a single record and wait (bounded) for its acknowledgement
    pub async fn publish(&self, record: &Record) -> Result<(), PublishError> {
        let key = record.publish_key();
        let payload = record.to_json().map_err(|e| PublishError::Encoding {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        match tokio::time::timeout(
            self.ack_timeout,
            self.publisher.publish(&self.topic, &key, &payload),
        )
        .await
        {
            Ok(Ok(())) => {
                debug!(key = %key, topic = %self.topic, "Record published");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PublishError::Timeout {
                key,
                timeout_ms: u64::try_from(self.ack_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Publish every record with at most `concurrency` in flight
    ///
    /// Records are independent: a failure does not stop the others. Once
    /// `cancel` fires, records still in flight or not yet started resolve to
    /// [`PublishError::Cancelled`]. Returns after every record has settled.
    pub async fn publish_all(
        &self,
        records: &[Record],
        concurrency: usize,
        cancel: &CancellationToken,
    ) -> Vec<PublishResult> {
        stream::iter(records)
            .map(|record| async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(PublishError::Cancelled {
                        key: record.publish_key(),
                    }),
                    result = self.publish(record) => result,
                };
                if let Err(ref e) = result {
                    warn!(key = %record.publish_key(), error = %e, "Record publish failed");
                }
                PublishResult {
                    key: record.publish_key(),
                    result,
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }

    /// Flush buffered messages, bounded by the acknowledgement timeout
    pub async fn flush(&self) -> Result<(), PublishError> {
        self.publisher.flush(self.ack_timeout).await
    }
}
