//! In-memory publisher
//!
//! Keeps every acknowledged message in a bounded buffer. Used when no broker
//! is configured, and handy for inspecting what would have been sent.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::outbound::{PublishError, RecordPublisherPort};

const DEFAULT_CAPACITY: usize = 10_000;

/// A message accepted by the in-memory publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// Publisher that acknowledges immediately and keeps the latest messages
pub struct InMemoryPublisher {
    capacity: usize,
    messages: Mutex<VecDeque<PublishedMessage>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            messages: Mutex::new(VecDeque::new()),
        }
    }

    /// Messages currently retained, oldest first
    #[cfg(test)]
    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().await.iter().cloned().collect()
    }
}

impl Default for InMemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordPublisherPort for InMemoryPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError> {
        let mut messages = self.messages.lock().await;
        if messages.len() == self.capacity {
            messages.pop_front();
        }
        messages.push_back(PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), PublishError> {
        let messages = self.messages.lock().await;
        if let Some(last) = messages.back() {
            tracing::debug!(
                retained = messages.len(),
                bytes = messages.iter().map(|m| m.payload.len()).sum::<usize>(),
                topic = %last.topic,
                last_key = %last.key,
                "In-memory publisher flushed"
            );
        }
        Ok(())
    }
}
