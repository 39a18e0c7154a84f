//! Domain layer - Core export model with no external dependencies
//!
//! This layer contains:
//! - Entities: FieldOrder, Record, ExportCycle
//! - Value Objects: Position, FieldValue, identifiers

pub mod entities;
pub mod value_objects;
