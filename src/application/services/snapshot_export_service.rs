//! Snapshot Export Service - Orchestrates one export cycle per interval
//!
//! The host simulation calls [`SnapshotExportService::notify_iteration_concluded`]
//! after every iteration. When the trigger fires, the service:
//! 1. Derives the field order from the entity type and the current overlays
//! 2. Builds one record per entity (any schema mismatch aborts the cycle)
//! 3. Writes the records to the staged artifact (overwrite mode)
//! 4. Publishes every record through the shared publish sink
//! 5. Promotes the staged artifact if nothing failed
//!
//! Failures never propagate to the host; they are logged and reported as a
//! [`CycleOutcome::Failed`].
//!
//! # Architecture
//!
//! This service depends only on ports; adapters are injected by `main`.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::application::ports::outbound::{
    ArtifactStorePort, ClockPort, OverlayMap, RecordPublisherPort, WorldSnapshotPort,
};
use crate::application::services::{
    ArtifactLifecycle, ExportError, ExportTrigger, HeaderBuilder, PublishSink, RecordBuilder,
};
use crate::domain::entities::{CycleReport, ExportCycle, Record};
use crate::domain::value_objects::CycleId;

/// Result of one iteration notification
#[derive(Debug)]
pub enum CycleOutcome {
    /// The interval has not elapsed (or the service is shutting down)
    Skipped,
    /// All records published and, in overwrite mode, the artifact promoted
    Completed(CycleReport),
    /// The cycle was aborted or left partial; previous good state is intact
    Failed {
        report: CycleReport,
        error: ExportError,
    },
}

#[cfg(test)]
impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Skipped => None,
            CycleOutcome::Completed(report) => Some(report),
            CycleOutcome::Failed { report, .. } => Some(report),
        }
    }
}

/// Service exporting world snapshots on a simulated-time interval
pub struct SnapshotExportService<W, C, P, A>
where
    W: WorldSnapshotPort,
    C: ClockPort,
    P: RecordPublisherPort,
    A: ArtifactStorePort,
{
    world: Arc<W>,
    clock: Arc<C>,
    trigger: ExportTrigger,
    sink: PublishSink<P>,
    /// Held for the whole cycle, which also serializes cycles
    lifecycle: Mutex<ArtifactLifecycle<A>>,
    publish_concurrency: usize,
    shutdown: CancellationToken,
}

impl<W, C, P, A> SnapshotExportService<W, C, P, A>
where
    W: WorldSnapshotPort,
    C: ClockPort,
    P: RecordPublisherPort,
    A: ArtifactStorePort,
{
    /// Create a new snapshot export service
    ///
    /// # Arguments
    ///
    /// * `world` - Provider of entities and overlays
    /// * `clock` - Simulated clock
    /// * `trigger` - Interval gate (owns the last export timestamp)
    /// * `sink` - Publish sink wrapping the long-lived broker handle
    /// * `lifecycle` - Artifact lifecycle for the configured retention mode
    /// * `publish_concurrency` - Maximum records in flight at once (min 1)
    pub fn new(
        world: Arc<W>,
        clock: Arc<C>,
        trigger: ExportTrigger,
        sink: PublishSink<P>,
        lifecycle: ArtifactLifecycle<A>,
        publish_concurrency: usize,
    ) -> Self {
        Self {
            world,
            clock,
            trigger,
            sink,
            lifecycle: Mutex::new(lifecycle),
            publish_concurrency: publish_concurrency.max(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that cancels any running cycle when triggered
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    #[cfg(test)]
    pub fn trigger(&self) -> &ExportTrigger {
        &self.trigger
    }

    /// Called by the host after each simulation iteration
    pub async fn notify_iteration_concluded(&self) -> CycleOutcome {
        if self.shutdown.is_cancelled() {
            return CycleOutcome::Skipped;
        }

        let now = self.clock.current_time_millis();
        if !self.trigger.check(now) {
            return CycleOutcome::Skipped;
        }

        self.run_cycle(now).await
    }

    /// Run one export cycle at simulated time `time_ms`, bypassing the trigger
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, time_ms: i64) -> CycleOutcome {
        let mut lifecycle = self.lifecycle.lock().await;

        let overlays = self.world.overlays();
        let order = match HeaderBuilder::build::<W::Entity>(&overlays) {
            Ok(order) => order,
            Err(e) => {
                error!(time_ms, error = %e, "Failed to derive record schema, skipping cycle");
                let report = CycleReport::new(CycleId::new(), time_ms, 0, Utc::now()).finish();
                return CycleOutcome::Failed { report, error: e };
            }
        };

        let entities = self.world.entities();
        let cycle = ExportCycle::new(time_ms, order);
        let mut report = CycleReport::begin(&cycle, entities.len());

        info!(
            cycle_id = %cycle.id,
            time_ms,
            interval_ms = self.trigger.interval_ms(),
            mode = ?lifecycle.mode(),
            entities = entities.len(),
            fields = cycle.field_order.len(),
            "Export cycle started"
        );

        let result = self
            .execute(&cycle, &entities, &overlays, &mut lifecycle, &mut report)
            .await;

        let report = report.finish();
        match result {
            Ok(()) => {
                info!(
                    cycle_id = %cycle.id,
                    published = report.records_published,
                    promoted = report.promoted,
                    "Export cycle completed"
                );
                CycleOutcome::Completed(report)
            }
            Err(e) => {
                lifecycle.abort();
                if e.is_schema_error() {
                    error!(cycle_id = %cycle.id, error = %e, "Export cycle aborted");
                } else {
                    warn!(
                        cycle_id = %cycle.id,
                        published = report.records_published,
                        failed = report.publish_failures,
                        error = %e,
                        "Export cycle failed"
                    );
                }
                CycleOutcome::Failed { report, error: e }
            }
        }
    }

    async fn execute(
        &self,
        cycle: &ExportCycle,
        entities: &[W::Entity],
        overlays: &OverlayMap,
        lifecycle: &mut ArtifactLifecycle<A>,
        report: &mut CycleReport,
    ) -> Result<(), ExportError> {
        let records = entities
            .iter()
            .map(|entity| RecordBuilder::build(&cycle.field_order, cycle.time_ms, entity, overlays))
            .collect::<Result<Vec<Record>, ExportError>>()?;
        report.records_built = records.len();

        lifecycle.begin_cycle(&cycle.field_order).await?;
        for record in &records {
            lifecycle.write_record(record).await?;
        }

        let results = self
            .sink
            .publish_all(&records, self.publish_concurrency, &self.shutdown)
            .await;

        let mut first_failure = None;
        for published in results {
            match published.result {
                Ok(()) => report.records_published += 1,
                Err(e) => {
                    report.publish_failures += 1;
                    first_failure.get_or_insert(e);
                }
            }
        }

        if self.shutdown.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        if let Some(first) = first_failure {
            return Err(ExportError::Publish {
                failed: report.publish_failures,
                attempted: records.len(),
                first,
            });
        }

        report.promoted = lifecycle.complete().await?;
        Ok(())
    }

    /// Stop accepting cycles, cancel in-flight publishes and flush the publisher
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        // Waits for a running cycle to observe the cancellation
        let mut lifecycle = self.lifecycle.lock().await;
        lifecycle.abort();
        drop(lifecycle);

        if let Err(e) = self.sink.flush().await {
            warn!(error = %e, "Failed to flush publisher during shutdown");
        }
        info!(
            last_export_ms = ?self.trigger.last_export(),
            "Snapshot export service stopped"
        );
    }
}
