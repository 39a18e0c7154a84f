//! Artifact store port - Durable "latest snapshot" output

use std::path::PathBuf;

use async_trait::async_trait;

/// Errors raised while staging or promoting an artifact
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to create staged artifact {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write staged artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to promote {staged} to {canonical}: {source}")]
    Promote {
        staged: PathBuf,
        canonical: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode artifact line: {0}")]
    Encoding(String),

    #[error("No staged artifact is open")]
    NotStaging,
}

/// Storage for the overwrite-mode artifact
///
/// Output is written to a staged artifact and only becomes visible at the
/// canonical location through [`ArtifactStorePort::promote`], which must
/// replace the previous canonical artifact in a single step.
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    type Staged: Send;

    /// Open a fresh staged artifact, truncating any orphan left by a failed cycle
    async fn stage(&self) -> Result<Self::Staged, ArtifactError>;

    /// Append one line to the staged artifact
    async fn append_line(&self, staged: &mut Self::Staged, line: &str) -> Result<(), ArtifactError>;

    /// Atomically replace the canonical artifact with the staged one
    async fn promote(&self, staged: Self::Staged) -> Result<(), ArtifactError>;
}
