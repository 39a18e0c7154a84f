//! Artifact Lifecycle - Stage-then-promote handling of the "latest" artifact
//!
//! In history mode nothing is written; every cycle is only published. In
//! overwrite mode each cycle is written to a staged artifact which replaces
//! the canonical artifact only when the whole cycle succeeded:
//!
//! ```text
//! Idle --begin_cycle--> Staging --complete--> Promoting --> Idle
//!                          |
//!                          +--abort--> Idle (staged artifact left orphaned)
//! ```
//!
//! A cycle that wrote no records is never promoted, so the canonical artifact
//! does not become empty once it exists.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::ports::outbound::{ArtifactError, ArtifactStorePort};
use crate::domain::entities::{FieldOrder, Record};

/// Whether past cycles are retained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionMode {
    /// Keep every cycle downstream; no artifact is written
    History,
    /// Keep only the latest cycle in the canonical artifact
    Overwrite,
}

impl RetentionMode {
    pub fn from_keep_history(keep_history: bool) -> Self {
        if keep_history {
            RetentionMode::History
        } else {
            RetentionMode::Overwrite
        }
    }
}

/// Line format of the overwrite-mode artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactFormat {
    /// One JSON object per record
    #[default]
    JsonLines,
    /// Header line followed by one row per record
    Csv,
}

impl std::fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactFormat::JsonLines => write!(f, "jsonl"),
            ArtifactFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for ArtifactFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json" => Ok(ArtifactFormat::JsonLines),
            "csv" => Ok(ArtifactFormat::Csv),
            _ => Err(anyhow::anyhow!("Invalid artifact format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Staging,
    Promoting,
}

/// Drives the staged artifact through one cycle at a time
pub struct ArtifactLifecycle<A: ArtifactStorePort> {
    mode: RetentionMode,
    format: ArtifactFormat,
    store: Arc<A>,
    state: LifecycleState,
    staged: Option<A::Staged>,
    records_written: usize,
}

impl<A: ArtifactStorePort> ArtifactLifecycle<A> {
    pub fn new(mode: RetentionMode, format: ArtifactFormat, store: Arc<A>) -> Self {
        Self {
            mode,
            format,
            store,
            state: LifecycleState::Idle,
            staged: None,
            records_written: 0,
        }
    }

    pub fn mode(&self) -> RetentionMode {
        self.mode
    }

    #[cfg(test)]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Open the staged artifact for a new cycle
    ///
    /// A staged artifact still open from an aborted cycle is dropped and
    /// truncated by the new staging.
    pub async fn begin_cycle(&mut self, order: &FieldOrder) -> Result<(), ArtifactError> {
        if self.mode == RetentionMode::History {
            return Ok(());
        }

        if self.state != LifecycleState::Idle {
            warn!(state = ?self.state, "Previous cycle left a staged artifact open, discarding it");
            self.abort();
        }

        let mut staged = self.store.stage().await?;
        if self.format == ArtifactFormat::Csv {
            self.store
                .append_line(&mut staged, &order.to_csv_header())
                .await?;
        }

        self.staged = Some(staged);
        self.records_written = 0;
        self.state = LifecycleState::Staging;
        debug!("Staged artifact opened");
        Ok(())
    }

    /// Append one record to the staged artifact
    pub async fn write_record(&mut self, record: &Record) -> Result<(), ArtifactError> {
        if self.mode == RetentionMode::History {
            return Ok(());
        }

        let staged = self.staged.as_mut().ok_or(ArtifactError::NotStaging)?;
        let line = match self.format {
            ArtifactFormat::JsonLines => record
                .to_json()
                .map_err(|e| ArtifactError::Encoding(e.to_string()))?,
            ArtifactFormat::Csv => record.to_csv_row(),
        };
        self.store.append_line(staged, &line).await?;
        self.records_written += 1;
        Ok(())
    }

    /// Promote the staged artifact after a successful cycle
    ///
    /// Returns whether a promotion happened: always `false` in history mode
    /// and for a cycle without records, which keeps the previous artifact.
    pub async fn complete(&mut self) -> Result<bool, ArtifactError> {
        if self.mode == RetentionMode::History {
            return Ok(false);
        }

        let staged = self.staged.take().ok_or(ArtifactError::NotStaging)?;
        if self.records_written == 0 {
            drop(staged);
            self.state = LifecycleState::Idle;
            info!("Cycle produced no records, keeping previous artifact");
            return Ok(false);
        }

        self.state = LifecycleState::Promoting;
        let result = self.store.promote(staged).await;
        self.state = LifecycleState::Idle;

        result?;
        info!("Staged artifact promoted to canonical path");
        Ok(true)
    }

    /// Abandon the current cycle without touching the canonical artifact
    pub fn abort(&mut self) {
        if self.staged.take().is_some() {
            warn!("Export cycle aborted, staged artifact left unpromoted");
        }
        self.state = LifecycleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{sample_records, MemoryArtifactStore};

    fn order() -> FieldOrder {
        FieldOrder::new(Vec::<String>::new(), ["temperature"]).expect("valid order")
    }

    #[tokio::test]
    async fn test_history_mode_writes_nothing() {
        let store = Arc::new(MemoryArtifactStore::new());
        let mut lifecycle =
            ArtifactLifecycle::new(RetentionMode::History, ArtifactFormat::JsonLines, store.clone());

        lifecycle.begin_cycle(&order()).await.expect("begin");
        for record in sample_records(0, 2) {
            lifecycle.write_record(&record).await.expect("write");
        }
        assert!(!lifecycle.complete().await.expect("complete"));

        assert_eq!(store.stage_count(), 0);
        assert!(store.canonical().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_mode_promotes_on_success() {
        let store = Arc::new(MemoryArtifactStore::new());
        let mut lifecycle = ArtifactLifecycle::new(
            RetentionMode::Overwrite,
            ArtifactFormat::JsonLines,
            store.clone(),
        );

        lifecycle.begin_cycle(&order()).await.expect("begin");
        assert_eq!(lifecycle.state(), LifecycleState::Staging);
        for record in sample_records(5000, 2) {
            lifecycle.write_record(&record).await.expect("write");
        }
        assert!(store.canonical().is_none());

        assert!(lifecycle.complete().await.expect("complete"));
        assert_eq!(lifecycle.state(), LifecycleState::Idle);

        let canonical = store.canonical().expect("canonical artifact");
        assert_eq!(canonical.len(), 2);
        assert!(canonical[0].contains("\"entityID\":\"Agent-0\""));
    }

    #[tokio::test]
    async fn test_abort_keeps_previous_canonical() {
        let store = Arc::new(MemoryArtifactStore::new());
        let mut lifecycle =
            ArtifactLifecycle::new(RetentionMode::Overwrite, ArtifactFormat::Csv, store.clone());

        lifecycle.begin_cycle(&order()).await.expect("begin");
        for record in sample_records(0, 1) {
            lifecycle.write_record(&record).await.expect("write");
        }
        lifecycle.complete().await.expect("complete");
        let first = store.canonical().expect("canonical artifact");
        assert_eq!(first[0], "time,entityID,position,atDestination,temperature");

        lifecycle.begin_cycle(&order()).await.expect("begin");
        for record in sample_records(5000, 3) {
            lifecycle.write_record(&record).await.expect("write");
        }
        lifecycle.abort();

        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        assert_eq!(store.canonical(), Some(first));
    }

    #[tokio::test]
    async fn test_failed_promotion_returns_to_idle() {
        let store = Arc::new(MemoryArtifactStore::new().failing_promotion());
        let mut lifecycle = ArtifactLifecycle::new(
            RetentionMode::Overwrite,
            ArtifactFormat::JsonLines,
            store.clone(),
        );

        lifecycle.begin_cycle(&order()).await.expect("begin");
        for record in sample_records(0, 1) {
            lifecycle.write_record(&record).await.expect("write");
        }
        assert!(lifecycle.complete().await.is_err());
        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        assert!(store.canonical().is_none());
    }

    #[tokio::test]
    async fn test_cycle_without_records_keeps_previous_canonical() {
        for format in [ArtifactFormat::JsonLines, ArtifactFormat::Csv] {
            let store = Arc::new(MemoryArtifactStore::new());
            let mut lifecycle =
                ArtifactLifecycle::new(RetentionMode::Overwrite, format, store.clone());

            lifecycle.begin_cycle(&order()).await.expect("begin");
            for record in sample_records(0, 2) {
                lifecycle.write_record(&record).await.expect("write");
            }
            assert!(lifecycle.complete().await.expect("complete"));
            let previous = store.canonical().expect("canonical artifact");

            lifecycle.begin_cycle(&order()).await.expect("begin");
            assert!(!lifecycle.complete().await.expect("complete"));

            assert_eq!(lifecycle.state(), LifecycleState::Idle);
            assert_eq!(store.canonical(), Some(previous));
        }
    }

    #[tokio::test]
    async fn test_write_without_staging_is_an_error() {
        let store = Arc::new(MemoryArtifactStore::new());
        let mut lifecycle =
            ArtifactLifecycle::new(RetentionMode::Overwrite, ArtifactFormat::JsonLines, store);

        let record = &sample_records(0, 1)[0];
        assert!(matches!(
            lifecycle.write_record(record).await,
            Err(ArtifactError::NotStaging)
        ));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("csv".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Csv);
        assert_eq!("JSONL".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::JsonLines);
        assert!("xml".parse::<ArtifactFormat>().is_err());
    }
}
