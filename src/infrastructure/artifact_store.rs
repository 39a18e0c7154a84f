//! File-backed artifact store
//!
//! Stages output at `<canonical>.tmp` and promotes it with a single
//! `rename`, which replaces the canonical file atomically on the same
//! filesystem. A staged file left behind by a failed cycle is truncated by the
//! next `stage`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::application::ports::outbound::{ArtifactError, ArtifactStorePort};

const BUFFER_SIZE: usize = 100 * 1024;
const STAGED_SUFFIX: &str = ".tmp";

/// An open staged artifact
pub struct StagedFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// Artifact store writing to the local filesystem
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    canonical: PathBuf,
    staged: PathBuf,
}

impl FileArtifactStore {
    /// Create a store for the given canonical path
    ///
    /// The path is validated here; nothing is created until the first cycle
    /// is staged.
    pub fn new(canonical: impl Into<PathBuf>) -> Result<Self> {
        let canonical = canonical.into();
        if canonical.as_os_str().is_empty() {
            bail!("Artifact path must not be empty");
        }
        if canonical.is_dir() {
            bail!("Artifact path {} is a directory", canonical.display());
        }
        if canonical.file_name().is_none() {
            bail!("Artifact path {} has no file name", canonical.display());
        }

        let mut staged: OsString = canonical.clone().into_os_string();
        staged.push(STAGED_SUFFIX);

        Ok(Self {
            canonical,
            staged: PathBuf::from(staged),
        })
    }

    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }

    pub fn staged_path(&self) -> &Path {
        &self.staged
    }
}

#[async_trait]
impl ArtifactStorePort for FileArtifactStore {
    type Staged = StagedFile;

    async fn stage(&self) -> Result<StagedFile, ArtifactError> {
        if let Some(parent) = self.staged.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| ArtifactError::Create {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let file = File::create(&self.staged)
            .await
            .map_err(|source| ArtifactError::Create {
                path: self.staged.clone(),
                source,
            })?;

        tracing::debug!(path = %self.staged.display(), "Staged artifact created");
        Ok(StagedFile {
            path: self.staged.clone(),
            writer: BufWriter::with_capacity(BUFFER_SIZE, file),
        })
    }

    async fn append_line(&self, staged: &mut StagedFile, line: &str) -> Result<(), ArtifactError> {
        let write = async {
            staged.writer.write_all(line.as_bytes()).await?;
            staged.writer.write_all(b"\n").await
        };
        write.await.map_err(|source| ArtifactError::Write {
            path: staged.path.clone(),
            source,
        })
    }

    async fn promote(&self, staged: StagedFile) -> Result<(), ArtifactError> {
        let StagedFile { path, mut writer } = staged;

        let sync = async {
            writer.flush().await?;
            writer.get_mut().sync_all().await
        };
        sync.await.map_err(|source| ArtifactError::Write {
            path: path.clone(),
            source,
        })?;
        drop(writer);

        fs::rename(&path, &self.canonical)
            .await
            .map_err(|source| ArtifactError::Promote {
                staged: path.clone(),
                canonical: self.canonical.clone(),
                source,
            })
    }
}
