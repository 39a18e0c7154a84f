//! Header Builder - Derives the field order for one export cycle

use crate::application::ports::outbound::{EntityView, OverlayMap};
use crate::application::services::ExportError;
use crate::domain::entities::FieldOrder;

/// Builds the per-cycle [`FieldOrder`]
pub struct HeaderBuilder;

impl HeaderBuilder {
    /// Fixed fields, then the info fields of `E`, then the overlay names
    ///
    /// The overlay map passed here must be the same one the records of this
    /// cycle are sampled from.
    pub fn build<E: EntityView>(overlays: &OverlayMap) -> Result<FieldOrder, ExportError> {
        let order = FieldOrder::new(E::info_field_names(), overlays.keys().cloned())?;
        Ok(order)
    }
}
