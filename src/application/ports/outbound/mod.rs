//! Outbound ports - Interfaces that the application requires from external systems

mod artifact_port;
mod clock_port;
mod publisher_port;
mod world_port;

pub use artifact_port::{ArtifactError, ArtifactStorePort};
pub use clock_port::ClockPort;
pub use publisher_port::{PublishError, RecordPublisherPort};
pub use world_port::{EntityView, OverlayMap, OverlaySampler, WorldSnapshotPort};
