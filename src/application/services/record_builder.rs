//! Record Builder - Assembles one entity's record against the cycle's field order

use crate::application::ports::outbound::{EntityView, OverlayMap};
use crate::application::services::ExportError;
use crate::domain::entities::{FieldOrder, Record};
use crate::domain::value_objects::FieldValue;

/// Pairs field names with values by walking the order with a cursor
///
/// Values past the end of the order are counted rather than dropped so the
/// mismatch can be reported in full. Named writes also record the first slot
/// whose name differs from the one in the order.
struct FieldCursor<'a> {
    names: &'a [String],
    position: usize,
    overflow: usize,
    misnamed: Option<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl<'a> FieldCursor<'a> {
    fn new(order: &'a FieldOrder) -> Self {
        Self {
            names: order.names(),
            position: 0,
            overflow: 0,
            misnamed: None,
            fields: Vec::with_capacity(order.len()),
        }
    }

    fn write(&mut self, value: FieldValue) {
        match self.names.get(self.position) {
            Some(name) => {
                self.fields.push((name.clone(), value.into_finite_or_text()));
                self.position += 1;
            }
            None => self.overflow += 1,
        }
    }

    fn write_named(&mut self, name: &str, value: FieldValue) {
        if self.misnamed.is_none() {
            if let Some(expected) = self.names.get(self.position) {
                if expected != name {
                    self.misnamed = Some((expected.clone(), name.to_string()));
                }
            }
        }
        self.write(value);
    }

    fn finish(self, entity_id: &str) -> Result<Vec<(String, FieldValue)>, ExportError> {
        if self.overflow > 0 || self.position != self.names.len() {
            return Err(ExportError::SchemaConsistency {
                entity_id: entity_id.to_string(),
                expected: self.names.len(),
                produced: self.position + self.overflow,
            });
        }
        if let Some((expected, found)) = self.misnamed {
            return Err(ExportError::FieldNameMismatch {
                entity_id: entity_id.to_string(),
                expected,
                found,
            });
        }
        Ok(self.fields)
    }
}

/// Builds records for one export cycle
pub struct RecordBuilder;

impl RecordBuilder {
    /// Build the record for `entity` at simulated time `time_ms`
    ///
    /// Every name in `order` receives exactly one value. A count mismatch in
    /// either direction is a [`ExportError::SchemaConsistency`], and an overlay
    /// sampled under a name other than the one in `order` is a
    /// [`ExportError::FieldNameMismatch`]. Either way no record is produced.
    /// Non-finite overlay or info floats are carried as text.
    pub fn build<E: EntityView>(
        order: &FieldOrder,
        time_ms: i64,
        entity: &E,
        overlays: &OverlayMap,
    ) -> Result<Record, ExportError> {
        let entity_id = entity.identity();
        let position = entity.position();
        let mut cursor = FieldCursor::new(order);

        cursor.write(FieldValue::Integer(time_ms));
        cursor.write(FieldValue::Text(entity_id.clone()));
        cursor.write(FieldValue::Text(position.to_string()));
        cursor.write(FieldValue::Bool(entity.is_at_destination()));

        for info in entity.info_values() {
            cursor.write(info.to_field_value());
        }

        for (name, sampler) in overlays {
            cursor.write_named(name, sampler.value_at(&position));
        }

        let fields = cursor.finish(&entity_id)?;
        Ok(Record::new(time_ms, entity_id, fields))
    }
}
