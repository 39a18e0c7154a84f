//! FieldOrder entity - The ordered schema shared by every record of a cycle

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub const FIELD_TIME: &str = "time";
pub const FIELD_ENTITY_ID: &str = "entityID";
pub const FIELD_POSITION: &str = "position";
pub const FIELD_AT_DESTINATION: &str = "atDestination";

/// Fields every record starts with, in this order
pub const FIXED_FIELDS: [&str; 4] = [
    FIELD_TIME,
    FIELD_ENTITY_ID,
    FIELD_POSITION,
    FIELD_AT_DESTINATION,
];

/// Errors raised while assembling a field order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldOrderError {
    #[error("Duplicate field name in record schema: {0}")]
    DuplicateField(String),
}

/// Ordered, duplicate-free list of field names for one export cycle
///
/// The order is fixed fields, then info fields, then overlay names. It is
/// immutable once built; record assembly walks it with a cursor instead of
/// draining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOrder {
    names: Vec<String>,
}

impl FieldOrder {
    pub fn new<I, O>(info_fields: I, overlay_names: O) -> Result<Self, FieldOrderError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        let mut names: Vec<String> = FIXED_FIELDS.iter().map(|f| f.to_string()).collect();

        names.extend(info_fields.into_iter().map(Into::into));
        names.extend(overlay_names.into_iter().map(Into::into));

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(FieldOrderError::DuplicateField(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Comma-separated header line for CSV artifacts
    pub fn to_csv_header(&self) -> String {
        self.names.join(",")
    }
}
