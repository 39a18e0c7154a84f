//! Domain entities - Core export objects

mod export_cycle;
mod field_order;
mod record;

pub use export_cycle::{CycleReport, ExportCycle};
pub use field_order::{FieldOrder, FieldOrderError};
pub use record::Record;
