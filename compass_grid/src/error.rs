// Error type for grid configuration and layout.
//
// Every variant is a configuration fault: a malformed direction, a missing or
// wrong-sized neighbor table, a handle that points nowhere, or a layout run
// with no root. These abort the operation and surface to the caller. An
// unreachable path goal is *not* an error; path queries return an empty
// route instead.

use crate::types::CellId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// A raw direction id outside 0..=7.
    #[error("direction id {id} does not match any of the 8 compass directions")]
    InvalidDirection { id: u8 },

    /// A vector that is not aligned with any compass ray, or is too long.
    #[error("vector ({x}, {y}) does not match any of the 8 compass directions")]
    InvalidDirectionVector { x: f32, y: f32 },

    /// A neighbor table that was never supplied, or not exactly 8 entries.
    #[error("{cell} has an unconfigured neighbor table (expected 8 slots, got {len})")]
    UnconfiguredNeighborTable { cell: CellId, len: usize },

    /// A handle that does not belong to this grid.
    #[error("{0} is not a cell of this grid")]
    UnknownCell(CellId),

    /// Layout was requested before a root cell was designated.
    #[error("no root cell has been designated")]
    NoRootCell,

    /// A grid definition that could not be parsed or is inconsistent.
    #[error("invalid grid definition: {0}")]
    Definition(String),
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Definition(err.to_string())
    }
}
