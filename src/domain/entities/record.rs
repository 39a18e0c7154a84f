//! Record entity - One entity's state at one export time

use crate::domain::value_objects::FieldValue;

/// A key-ordered snapshot of one entity
///
/// Field order always matches the [`FieldOrder`](super::FieldOrder) of the
/// cycle that produced it. Records are built per entity per cycle and handed
/// off to the publish sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    time_ms: i64,
    entity_id: String,
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub(crate) fn new(time_ms: i64, entity_id: String, fields: Vec<(String, FieldValue)>) -> Self {
        Self {
            time_ms,
            entity_id,
            fields,
        }
    }

    #[cfg(test)]
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Broker key: `time|entityID`
    pub fn publish_key(&self) -> String {
        format!("{}|{}", self.time_ms, self.entity_id)
    }

    /// Flat JSON object with keys in field order
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut object = serde_json::Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            object.insert(name.clone(), serde_json::to_value(value)?);
        }
        serde_json::to_string(&serde_json::Value::Object(object))
    }

    /// Comma-separated value row, aligned with the CSV header
    pub fn to_csv_row(&self) -> String {
        self.fields
            .iter()
            .map(|(_, value)| value.to_csv_cell())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record::new(
            6000,
            "Agent-1".to_string(),
            vec![
                ("time".to_string(), FieldValue::Integer(6000)),
                ("entityID".to_string(), FieldValue::from("Agent-1")),
                ("position".to_string(), FieldValue::from("4,2")),
                ("atDestination".to_string(), FieldValue::Bool(false)),
                ("temperature".to_string(), FieldValue::Float(21.5)),
            ],
        )
    }

    #[test]
    fn test_publish_key() {
        assert_eq!(sample_record().publish_key(), "6000|Agent-1");
    }

    #[test]
    fn test_json_keeps_field_order_and_types() {
        let json = sample_record().to_json().expect("serialization should succeed");
        assert_eq!(
            json,
            r#"{"time":6000,"entityID":"Agent-1","position":"4,2","atDestination":false,"temperature":21.5}"#
        );
    }

    #[test]
    fn test_csv_row() {
        assert_eq!(sample_record().to_csv_row(), "6000,Agent-1,\"4,2\",false,21.5");
    }

    #[test]
    fn test_get_by_name() {
        let record = sample_record();
        assert_eq!(record.get("atDestination"), Some(&FieldValue::Bool(false)));
        assert_eq!(record.get("missing"), None);
    }
}
