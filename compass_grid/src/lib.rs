// compass_grid: eight-direction cell graph with layout and relation inference.
//
// A grid is a set of cells, each with an eight-slot neighbor table (one slot
// per compass direction, clockwise from north). Laying the grid out from a
// root cell gives every reachable cell a world position, and along the way
// infers neighbor links the author never wrote by composing direction
// vectors along the path that discovered each cell. All links feed a
// weighted shortest-path index used for navigation queries.
//
// Module overview:
// - `types.rs`:     CellId, Vec2 (compass plane), Vec3 (world space).
// - `direction.rs`: Direction ids <-> raw/unit vectors, tolerant classification.
// - `relations.rs`: Per-cell neighbor table with reverse lookup.
// - `grid.rs`:      CellGrid: cell arena, root, config, path index, reset.
// - `layout.rs`:    Stack-based depth-first layout + relation inference.
// - `config.rs`:    GridConfig and the serde GridDefinition format.
// - `error.rs`:     GridError.
//
// The shortest-path index lives in the companion crate
// `compass_grid_dijkstra` and is re-exported here as `path`.
//
// **Constraint: single writer.** Layout mutates the grid and the path index
// in one uninterrupted pass; path queries are meant to run afterwards. The
// grid holds no locks. Share it behind a lock if several threads need it.

pub mod config;
pub mod direction;
pub mod error;
pub mod grid;
pub mod layout;
pub use compass_grid_dijkstra as path;
pub mod relations;
pub mod types;

pub use config::{CellDefinition, GridConfig, GridDefinition};
pub use direction::Direction;
pub use error::GridError;
pub use grid::{Cell, CellGrid};
pub use layout::LayoutReport;
pub use types::{CellId, Vec2, Vec3};
