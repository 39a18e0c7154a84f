//! Publisher implementations - Infrastructure adapters for the record publisher port

mod factory;
#[cfg(feature = "kafka")]
mod kafka_publisher;
mod memory_publisher;

pub use factory::{PublisherBackend, PublisherFactory};
#[cfg(feature = "kafka")]
pub use kafka_publisher::KafkaPublisher;
pub use memory_publisher::InMemoryPublisher;
