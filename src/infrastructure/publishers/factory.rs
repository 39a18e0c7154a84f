//! Publisher factory - Creates the broker publisher based on configuration
//!
//! The publisher is created once at startup and reused for the lifetime of
//! the process.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::ports::outbound::{PublishError, RecordPublisherPort};
use crate::infrastructure::config::BrokerConfig;
use crate::infrastructure::publishers::InMemoryPublisher;
#[cfg(feature = "kafka")]
use crate::infrastructure::publishers::KafkaPublisher;

/// Configured publisher backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherBackend {
    Memory,
    Kafka,
}

impl std::fmt::Display for PublisherBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublisherBackend::Memory => write!(f, "memory"),
            PublisherBackend::Kafka => write!(f, "kafka"),
        }
    }
}

impl std::str::FromStr for PublisherBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(PublisherBackend::Memory),
            "kafka" => Ok(PublisherBackend::Kafka),
            _ => Err(anyhow::anyhow!("Invalid publisher backend: {}", s)),
        }
    }
}

/// Enum wrapper for publisher backends to enable runtime selection
pub enum PublisherBackendEnum {
    Memory(InMemoryPublisher),
    #[cfg(feature = "kafka")]
    Kafka(KafkaPublisher),
}

#[async_trait]
impl RecordPublisherPort for PublisherBackendEnum {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError> {
        match self {
            PublisherBackendEnum::Memory(p) => p.publish(topic, key, payload).await,
            #[cfg(feature = "kafka")]
            PublisherBackendEnum::Kafka(p) => p.publish(topic, key, payload).await,
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<(), PublishError> {
        match self {
            PublisherBackendEnum::Memory(p) => p.flush(timeout).await,
            #[cfg(feature = "kafka")]
            PublisherBackendEnum::Kafka(p) => p.flush(timeout).await,
        }
    }
}

/// Publisher factory
pub struct PublisherFactory;

impl PublisherFactory {
    /// Create the configured publisher, connecting to the broker if needed
    pub async fn create(config: &BrokerConfig) -> Result<Arc<PublisherBackendEnum>> {
        match config.backend {
            PublisherBackend::Memory => {
                tracing::info!(topic = %config.topic, "Using in-memory publisher");
                Ok(Arc::new(PublisherBackendEnum::Memory(InMemoryPublisher::new())))
            }
            #[cfg(feature = "kafka")]
            PublisherBackend::Kafka => {
                let publisher = KafkaPublisher::connect(config).await?;
                Ok(Arc::new(PublisherBackendEnum::Kafka(publisher)))
            }
            #[cfg(not(feature = "kafka"))]
            PublisherBackend::Kafka => {
                anyhow::bail!("Kafka support not enabled. Build with --features kafka")
            }
        }
    }
}
