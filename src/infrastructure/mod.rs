//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration
//! - Publishers: In-memory and Kafka adapters for the record publisher port
//! - Artifact store: Stage-then-rename file output
//! - Clock: Simulated clock
//! - Demo world: Random-walk simulation used by the binary

pub mod artifact_store;
pub mod clock;
pub mod config;
pub mod demo_world;
pub mod publishers;
