//! Errors that end an export cycle

use crate::application::ports::outbound::{ArtifactError, PublishError};
use crate::domain::entities::FieldOrderError;

/// Reasons an export cycle was aborted or marked failed
///
/// None of these are fatal to the host simulation: the cycle is skipped or
/// left partial and the previous good artifact stays in place.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(
        "Schema mismatch for entity {entity_id}: record schema has {expected} fields but {produced} values were produced"
    )]
    SchemaConsistency {
        entity_id: String,
        expected: usize,
        produced: usize,
    },

    #[error("Field name mismatch for entity {entity_id}: expected {expected}, got {found}")]
    FieldNameMismatch {
        entity_id: String,
        expected: String,
        found: String,
    },

    #[error("Invalid record schema: {0}")]
    InvalidSchema(#[from] FieldOrderError),

    #[error("{failed} of {attempted} records failed to publish (first: {first})")]
    Publish {
        failed: usize,
        attempted: usize,
        first: PublishError,
    },

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Export cycle cancelled by shutdown")]
    Cancelled,
}

impl ExportError {
    /// Whether the error stems from the record schema rather than I/O
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            ExportError::SchemaConsistency { .. }
                | ExportError::FieldNameMismatch { .. }
                | ExportError::InvalidSchema(_)
        )
    }
}
