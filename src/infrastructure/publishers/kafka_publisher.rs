//! Kafka publisher backed by a single long-lived `FutureProducer`
//!
//! The producer is created once at startup and shared by every cycle. Each
//! `publish` waits for the delivery report, so a successful return means the
//! broker acknowledged the record with `acks=all`.
//!
//! # Requirements
//!
//! Requires the `kafka` feature flag and librdkafka installed.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;

use crate::application::ports::outbound::{PublishError, RecordPublisherPort};
use crate::infrastructure::config::BrokerConfig;

const BATCH_SIZE: &str = "16384";
const LINGER_MS: &str = "1";
/// 32 MiB of buffered messages
const BUFFER_KBYTES: &str = "32768";

/// Publisher writing records to a Kafka topic
pub struct KafkaPublisher {
    producer: FutureProducer,
    delivery_timeout: Duration,
}

impl KafkaPublisher {
    /// Create the producer and verify the broker answers a metadata request
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        let delivery_timeout = Duration::from_millis(config.publish_timeout_ms);

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("acks", "all")
            .set("retries", "0")
            .set("batch.size", BATCH_SIZE)
            .set("linger.ms", LINGER_MS)
            .set("queue.buffering.max.kbytes", BUFFER_KBYTES)
            .set("message.timeout.ms", config.publish_timeout_ms.to_string())
            .create()
            .context("Failed to create Kafka producer")?;

        let probe = producer.clone();
        let topic = config.topic.clone();
        tokio::task::spawn_blocking(move || {
            probe
                .client()
                .fetch_metadata(Some(topic.as_str()), Timeout::After(delivery_timeout))
                .map(|_| ())
        })
        .await
        .context("Kafka metadata probe panicked")?
        .with_context(|| format!("Kafka broker at {} is unreachable", config.bootstrap_servers))?;

        tracing::info!(
            brokers = %config.bootstrap_servers,
            topic = %config.topic,
            "Connected Kafka producer"
        );

        Ok(Self {
            producer,
            delivery_timeout,
        })
    }
}

#[async_trait]
impl RecordPublisherPort for KafkaPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(self.delivery_timeout))
            .await
        {
            Ok(_) => Ok(()),
            Err((e, _message)) => Err(PublishError::Rejected {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn flush(&self, timeout: Duration) -> Result<(), PublishError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?
            .map_err(|e| PublishError::Connection(e.to_string()))
    }
}
