//! World snapshot port - Read access to the running simulation

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::value_objects::{FieldValue, InfoValue, Position};

/// Read-only view of one simulated entity
///
/// The info-field schema is a property of the entity type, so every entity
/// of a type must return exactly one value per name in
/// [`EntityView::info_field_names`].
pub trait EntityView: Send + Sync {
    /// Info field names shared by all entities of this type
    fn info_field_names() -> Vec<String>
    where
        Self: Sized;

    /// Unique name of the entity
    fn identity(&self) -> String;

    fn position(&self) -> Position;

    fn is_at_destination(&self) -> bool;

    /// Info values, in the same order as `info_field_names`
    fn info_values(&self) -> Vec<&dyn InfoValue>;
}

/// A named environmental layer that can be sampled at a position
pub trait OverlaySampler: Send + Sync {
    fn value_at(&self, position: &Position) -> FieldValue;
}

/// Overlays by name; iteration order is the name order
pub type OverlayMap = BTreeMap<String, Arc<dyn OverlaySampler>>;

/// Provider of the current world state
pub trait WorldSnapshotPort: Send + Sync {
    type Entity: EntityView + 'static;

    /// Snapshot of all current entities
    fn entities(&self) -> Vec<Self::Entity>;

    /// Snapshot of the current overlay set
    fn overlays(&self) -> OverlayMap;
}
