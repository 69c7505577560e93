// Data-driven grid configuration.
//
// `GridConfig` carries the tunables of a layout run: how far relation
// inference walks back up the ancestor chain, whether it runs at all, how
// large each cell is, and the default path-index distance of a configured
// link. Values are read once at the start of a layout run.
//
// `GridDefinition` describes a whole grid as data: the config, and one entry
// per cell with its authored eight-slot neighbor table (indices into the
// cell list, 0 = north, clockwise) and an optional root flag. It loads from
// JSON via serde; `CellGrid::from_definition` turns it into a live grid.
//
// See also: `grid.rs` which owns a `GridConfig`, `layout.rs` which reads it.

use crate::types::Vec3;
use serde::{Deserialize, Serialize};

/// Tunables of a layout run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Maximum number of ancestors relation inference pops for one newly
    /// discovered cell. 0 disables the ancestor walk.
    pub max_inference_depth: u32,
    /// Whether relation inference runs during layout.
    pub inference_enabled: bool,
    /// World-space size of one cell; also the spacing between laid-out
    /// neighbors along X and Z.
    pub cell_scale: Vec3,
    /// Path-index distance of each authored link when a cell is configured.
    pub default_edge_distance: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_inference_depth: 9,
            inference_enabled: true,
            cell_scale: Vec3::ONE,
            default_edge_distance: 1,
        }
    }
}

/// One cell of a `GridDefinition`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellDefinition {
    /// Eight entries, 0 = north, clockwise. Each is an index into
    /// `GridDefinition::cells` or null.
    pub neighbors: Vec<Option<u32>>,
    #[serde(default)]
    pub is_root: bool,
}

/// A complete grid described as data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridDefinition {
    #[serde(default)]
    pub config: GridConfig,
    pub cells: Vec<CellDefinition>,
    /// World position of the root cell.
    #[serde(default)]
    pub root_position: Vec3,
}
