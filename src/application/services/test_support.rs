//! Hand-written port fakes shared by the service tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::outbound::{
    ArtifactError, ArtifactStorePort, ClockPort, EntityView, OverlayMap, OverlaySampler,
    PublishError, RecordPublisherPort, WorldSnapshotPort,
};
use crate::domain::entities::{FieldOrder, Record};
use crate::domain::value_objects::{FieldValue, InfoValue, Position};

// =============================================================================
// Entities
// =============================================================================

/// Entity with two info fields: `role` and `energy`
#[derive(Debug, Clone)]
pub struct TestEntity {
    name: String,
    position: Position,
    at_destination: bool,
    info: Vec<FieldValue>,
}

impl TestEntity {
    pub fn new(name: &str, position: Position) -> Self {
        Self {
            name: name.to_string(),
            position,
            at_destination: false,
            info: vec![FieldValue::from("walker"), FieldValue::Integer(100)],
        }
    }

    pub fn at_destination(mut self) -> Self {
        self.at_destination = true;
        self
    }

    pub fn without_energy(mut self) -> Self {
        self.info.truncate(1);
        self
    }

    pub fn with_extra_info(mut self, value: &str) -> Self {
        self.info.push(FieldValue::from(value));
        self
    }
}

impl EntityView for TestEntity {
    fn info_field_names() -> Vec<String> {
        vec!["role".to_string(), "energy".to_string()]
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_at_destination(&self) -> bool {
        self.at_destination
    }

    fn info_values(&self) -> Vec<&dyn InfoValue> {
        self.info.iter().map(|v| v as &dyn InfoValue).collect()
    }
}

/// Entity without info fields
#[derive(Debug, Clone)]
pub struct BareEntity {
    name: String,
    position: Position,
}

impl BareEntity {
    pub fn new(name: &str, position: Position) -> Self {
        Self {
            name: name.to_string(),
            position,
        }
    }
}

impl EntityView for BareEntity {
    fn info_field_names() -> Vec<String> {
        Vec::new()
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_at_destination(&self) -> bool {
        false
    }

    fn info_values(&self) -> Vec<&dyn InfoValue> {
        Vec::new()
    }
}

// =============================================================================
// Overlays
// =============================================================================

struct ConstantOverlay(f64);

impl OverlaySampler for ConstantOverlay {
    fn value_at(&self, _position: &Position) -> FieldValue {
        FieldValue::Float(self.0)
    }
}

/// `20 + row + col`
struct GradientOverlay;

impl OverlaySampler for GradientOverlay {
    fn value_at(&self, position: &Position) -> FieldValue {
        FieldValue::Float(20.0 + f64::from(position.row) + f64::from(position.col))
    }
}

pub fn constant_overlay(value: f64) -> Arc<dyn OverlaySampler> {
    Arc::new(ConstantOverlay(value))
}

pub fn gradient_overlay() -> Arc<dyn OverlaySampler> {
    Arc::new(GradientOverlay)
}

// =============================================================================
// World and clock
// =============================================================================

pub struct TestWorld<E> {
    entities: Mutex<Vec<E>>,
    overlays: Mutex<OverlayMap>,
}

impl<E: Clone> TestWorld<E> {
    pub fn new(entities: Vec<E>, overlays: OverlayMap) -> Self {
        Self {
            entities: Mutex::new(entities),
            overlays: Mutex::new(overlays),
        }
    }

    pub fn set_entities(&self, entities: Vec<E>) {
        *self.entities.lock().unwrap_or_else(PoisonError::into_inner) = entities;
    }

    pub fn insert_overlay(&self, name: &str, sampler: Arc<dyn OverlaySampler>) {
        self.overlays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), sampler);
    }
}

impl<E: EntityView + Clone + 'static> WorldSnapshotPort for TestWorld<E> {
    type Entity = E;

    fn entities(&self) -> Vec<E> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn overlays(&self) -> OverlayMap {
        self.overlays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl ClockPort for ManualClock {
    fn current_time_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Publisher
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

/// Publisher recording every acknowledged message
///
/// Keys registered with `rejecting` fail immediately; keys registered with
/// `stalling` never acknowledge.
#[derive(Default)]
pub struct RecordingPublisher {
    sent: Mutex<Vec<SentMessage>>,
    reject: HashSet<String>,
    stall: HashSet<String>,
    flushes: AtomicUsize,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, key: &str) -> Self {
        self.reject.insert(key.to_string());
        self
    }

    pub fn stalling(mut self, key: &str) -> Self {
        self.stall.insert(key.to_string());
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordPublisherPort for RecordingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), PublishError> {
        if self.stall.contains(key) {
            std::future::pending::<()>().await;
        }
        if self.reject.contains(key) {
            return Err(PublishError::Rejected {
                key: key.to_string(),
                reason: "rejected by test broker".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMessage {
                topic: topic.to_string(),
                key: key.to_string(),
                payload: payload.to_string(),
            });
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), PublishError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Artifact store
// =============================================================================

/// Artifact store keeping the canonical artifact as a list of lines
///
/// Staging and appending can be switched to fail between cycles.
#[derive(Default)]
pub struct MemoryArtifactStore {
    canonical: Mutex<Option<Vec<String>>>,
    stages: AtomicUsize,
    fail_stage: AtomicBool,
    fail_append: AtomicBool,
    fail_promotion: bool,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_promotion(mut self) -> Self {
        self.fail_promotion = true;
        self
    }

    pub fn fail_staging(&self, fail: bool) {
        self.fail_stage.store(fail, Ordering::SeqCst);
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    pub fn canonical(&self) -> Option<Vec<String>> {
        self.canonical
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactStorePort for MemoryArtifactStore {
    type Staged = Vec<String>;

    async fn stage(&self) -> Result<Self::Staged, ArtifactError> {
        if self.fail_stage.load(Ordering::SeqCst) {
            return Err(ArtifactError::Create {
                path: "memory.tmp".into(),
                source: std::io::Error::other("staging disabled"),
            });
        }
        self.stages.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn append_line(&self, staged: &mut Self::Staged, line: &str) -> Result<(), ArtifactError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(ArtifactError::Write {
                path: "memory.tmp".into(),
                source: std::io::Error::other("writes disabled"),
            });
        }
        staged.push(line.to_string());
        Ok(())
    }

    async fn promote(&self, staged: Self::Staged) -> Result<(), ArtifactError> {
        if self.fail_promotion {
            return Err(ArtifactError::Promote {
                staged: "memory.tmp".into(),
                canonical: "memory".into(),
                source: std::io::Error::other("promotion disabled"),
            });
        }
        *self.canonical.lock().unwrap_or_else(PoisonError::into_inner) = Some(staged);
        Ok(())
    }
}

// =============================================================================
// Records
// =============================================================================

/// `count` records for `Agent-0..` at `time_ms` with a `temperature` field
pub fn sample_records(time_ms: i64, count: usize) -> Vec<Record> {
    let order = FieldOrder::new(Vec::<String>::new(), ["temperature"]).expect("valid order");
    (0..count)
        .map(|i| {
            let name = format!("Agent-{i}");
            let values = vec![
                FieldValue::Integer(time_ms),
                FieldValue::Text(name.clone()),
                FieldValue::Text(format!("{i},{i}")),
                FieldValue::Bool(false),
                FieldValue::Float(21.0),
            ];
            let fields = order.names().iter().cloned().zip(values).collect();
            Record::new(time_ms, name, fields)
        })
        .collect()
}
