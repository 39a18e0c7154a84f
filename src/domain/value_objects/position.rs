//! Grid position of a simulated entity

use serde::{Deserialize, Serialize};

/// A cell on the simulation grid
///
/// The textual form (`"row,col"`) is what ends up in exported records, so it
/// must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Move by the given offsets, clamped to `[0, rows) x [0, cols)`
    pub fn step_within(self, d_row: i32, d_col: i32, rows: i32, cols: i32) -> Self {
        Self {
            row: (self.row + d_row).clamp(0, rows.max(1) - 1),
            col: (self.col + d_col).clamp(0, cols.max(1) - 1),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}
