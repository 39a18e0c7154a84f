//! Value objects - Immutable objects defined by their attributes

mod field_value;
mod ids;
mod position;

pub use field_value::{FieldValue, InfoValue};
pub use ids::*;
pub use position::Position;
