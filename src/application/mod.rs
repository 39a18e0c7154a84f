//! Application layer - Export use cases and the ports they depend on
//!
//! This layer contains:
//! - Ports: clock, world snapshot, record publisher, artifact store
//! - Services: trigger, header/record builders, publish sink, artifact
//!   lifecycle and the snapshot export orchestration

pub mod ports;
pub mod services;
