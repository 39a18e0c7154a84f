//! Ports - Boundaries between the export pipeline and its collaborators

pub mod outbound;
