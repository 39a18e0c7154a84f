//! Application services - Export pipeline use cases
//!
//! Each service depends only on the outbound ports; concrete adapters live in
//! the infrastructure layer and are wired together in `main`.

mod artifact_lifecycle;
mod export_error;
mod export_trigger;
mod header_builder;
mod publish_sink;
mod record_builder;
mod snapshot_export_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use artifact_lifecycle::{ArtifactFormat, ArtifactLifecycle, RetentionMode};
pub use export_error::ExportError;
pub use export_trigger::ExportTrigger;
pub use header_builder::HeaderBuilder;
pub use publish_sink::PublishSink;
pub use record_builder::RecordBuilder;
pub use snapshot_export_service::{CycleOutcome, SnapshotExportService};
