//! Export cycle entity - One triggered pass over all entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::FieldOrder;
use crate::domain::value_objects::CycleId;

/// A single triggered export
///
/// Holds the simulated time the cycle was triggered at and the field order
/// every record of the cycle must follow.
#[derive(Debug, Clone)]
pub struct ExportCycle {
    pub id: CycleId,
    /// Simulated clock value at trigger time, in milliseconds
    pub time_ms: i64,
    pub field_order: FieldOrder,
    pub started_at: DateTime<Utc>,
}

impl ExportCycle {
    pub fn new(time_ms: i64, field_order: FieldOrder) -> Self {
        Self {
            id: CycleId::new(),
            time_ms,
            field_order,
            started_at: Utc::now(),
        }
    }
}

/// Summary of a finished (or aborted) cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub time_ms: i64,
    pub entity_count: usize,
    pub records_built: usize,
    pub records_published: usize,
    pub publish_failures: usize,
    /// Whether a staged artifact was promoted to the canonical path
    pub promoted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    pub fn new(
        cycle_id: CycleId,
        time_ms: i64,
        entity_count: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cycle_id,
            time_ms,
            entity_count,
            records_built: 0,
            records_published: 0,
            publish_failures: 0,
            promoted: false,
            started_at,
            finished_at: started_at,
        }
    }

    pub fn begin(cycle: &ExportCycle, entity_count: usize) -> Self {
        Self::new(cycle.id, cycle.time_ms, entity_count, cycle.started_at)
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }
}
