// The cell grid: owner of every cell, the root designation, the config, and
// the path index.
//
// `CellGrid` is an explicitly constructed object that every operation takes
// by reference. Cells live in a `Vec<Cell>` indexed by `CellId` and never
// move or disappear. A cell goes through three stages:
//
//   1. `add_cell()` allocates it with an empty, *unconfigured* table.
//   2. `configure_cell()` supplies its authored eight-slot neighbor table and
//      registers it in the path index with one edge per occupied slot.
//   3. `layout()` (see `layout.rs`) assigns it a position exactly once and,
//      with inference enabled, adds links the author never wrote.
//
// `reset()` rewinds every cell to stage 2: authored tables are restored,
// positions cleared, and the path index is rebuilt from the authored links.
//
// Path queries read the index only; the grid is the sole writer.
//
// See also: `relations.rs` for the neighbor table, `layout.rs` for the
// layout pass and relation inference, `compass_grid_dijkstra` for the index.

use crate::config::{GridConfig, GridDefinition};
use crate::direction::Direction;
use crate::error::GridError;
use crate::layout::{self, LayoutReport};
use crate::relations::{CellRelation, CellRelations};
use crate::types::{CellId, Vec2, Vec3};
use compass_grid_dijkstra::{DijkstraMap, PathIndex};
use tracing::debug;

/// One node of the grid.
#[derive(Clone, Debug)]
pub struct Cell {
    pub id: CellId,
    /// Live neighbor table, including inferred links.
    pub(crate) relations: CellRelations,
    /// The table as authored; `None` until configured.
    pub(crate) authored: Option<CellRelations>,
    pub(crate) position: Vec3,
    pub(crate) scale: Vec3,
    pub(crate) positioned: bool,
}

impl Cell {
    fn new(id: CellId) -> Self {
        Self {
            id,
            relations: CellRelations::new(),
            authored: None,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            positioned: false,
        }
    }

    pub fn relations(&self) -> &CellRelations {
        &self.relations
    }

    pub fn is_configured(&self) -> bool {
        self.authored.is_some()
    }

    pub fn is_positioned(&self) -> bool {
        self.positioned
    }

    /// World position, once laid out.
    pub fn position(&self) -> Option<Vec3> {
        self.positioned.then_some(self.position)
    }

    /// Scale the cell was laid out with.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Center of the cell's top face, once laid out.
    pub fn top(&self) -> Option<Vec3> {
        self.position().map(|p| p + Vec3::new(0.0, self.scale.y / 2.0, 0.0))
    }
}

#[derive(Clone, Debug, Default)]
pub struct CellGrid {
    cells: Vec<Cell>,
    root: Option<CellId>,
    root_position: Vec3,
    config: GridConfig,
    pub(crate) path_index: DijkstraMap<CellId, u32>,
}

impl CellGrid {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build a grid from a data definition: one cell per entry, each
    /// configured with its authored table, and the flagged cell as root.
    pub fn from_definition(def: &GridDefinition) -> Result<Self, GridError> {
        let mut grid = Self::new(def.config.clone());
        for _ in &def.cells {
            grid.add_cell();
        }
        let mut root = None;
        for (i, cell_def) in def.cells.iter().enumerate() {
            let id = CellId(i as u32);
            let table: Vec<Option<CellId>> =
                cell_def.neighbors.iter().map(|n| n.map(CellId)).collect();
            grid.configure_cell(id, &table)?;
            if cell_def.is_root {
                if let Some(previous) = root {
                    return Err(GridError::Definition(format!(
                        "both {previous} and {id} are flagged as root"
                    )));
                }
                root = Some(id);
            }
        }
        if let Some(root) = root {
            grid.set_root(root, def.root_position)?;
        }
        Ok(grid)
    }

    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let def: GridDefinition = serde_json::from_str(json)?;
        Self::from_definition(&def)
    }

    // -----------------------------------------------------------------------
    // Cells
    // -----------------------------------------------------------------------

    /// Allocate a new, unconfigured cell.
    pub fn add_cell(&mut self) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Cell::new(id));
        id
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell, GridError> {
        self.cells.get(id.index()).ok_or(GridError::UnknownCell(id))
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, GridError> {
        self.cells.get_mut(id.index()).ok_or(GridError::UnknownCell(id))
    }

    /// Supply a cell's authored neighbor table (exactly eight entries,
    /// 0 = north, clockwise) and register it in the path index with one edge
    /// of `default_edge_distance` per occupied slot.
    pub fn configure_cell(
        &mut self,
        id: CellId,
        table: &[Option<CellId>],
    ) -> Result<(), GridError> {
        self.cell(id)?;
        for &neighbor in table.iter().flatten() {
            self.cell(neighbor)?;
        }
        let relations = CellRelations::from_table(id, table)?;
        self.register(id, &relations);
        let cell = self.cell_mut(id)?;
        cell.authored = Some(relations.clone());
        cell.relations = relations;
        Ok(())
    }

    fn register(&mut self, id: CellId, relations: &CellRelations) {
        let distance = self.config.default_edge_distance;
        let edges: Vec<(CellId, u32)> = relations
            .non_empty()
            .map(|(neighbor, _)| (neighbor, distance))
            .collect();
        self.path_index.register_node(id, &edges);
    }

    // -----------------------------------------------------------------------
    // Root and config
    // -----------------------------------------------------------------------

    /// Designate the cell layout starts from, and where it is placed.
    pub fn set_root(&mut self, id: CellId, position: Vec3) -> Result<(), GridError> {
        self.cell(id)?;
        debug!(root = %id, %position, "root cell designated");
        self.root = Some(id);
        self.root_position = position;
        Ok(())
    }

    pub fn clear_root(&mut self) {
        if let Some(root) = self.root.take() {
            debug!(root = %root, "root cell cleared");
        }
    }

    pub fn root(&self) -> Option<CellId> {
        self.root
    }

    pub fn root_position(&self) -> Vec3 {
        self.root_position
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Replace the config. Takes effect at the next layout run.
    pub fn set_config(&mut self, config: GridConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Adjacency
    // -----------------------------------------------------------------------

    /// Write `other` into `id`'s slot `dir` (one side only; last write wins).
    pub fn set_neighbor(
        &mut self,
        id: CellId,
        dir: Direction,
        other: CellId,
    ) -> Result<(), GridError> {
        self.cell(other)?;
        self.cell_mut(id)?.relations.set(dir, other);
        Ok(())
    }

    /// Neighbor in slot `slot_id` of `id`. Fails for ids outside 0..=7.
    pub fn neighbor(&self, id: CellId, slot_id: u8) -> Result<Option<CellId>, GridError> {
        self.cell(id)?.relations.get_by_id(slot_id)
    }

    /// Slot of `id` that holds `other`, if they are direct neighbors.
    pub fn slot_of(&self, id: CellId, other: CellId) -> Result<Option<Direction>, GridError> {
        Ok(self.cell(id)?.relations.slot_of(other))
    }

    /// Occupied slots of `id` in slot order, with their raw direction vectors.
    pub fn non_empty_neighbors(&self, id: CellId) -> Result<Vec<(CellId, Vec2)>, GridError> {
        Ok(self.cell(id)?.relations.non_empty().collect())
    }

    /// All eight slots of `id` with their directions.
    pub fn relations(&self, id: CellId) -> Result<[CellRelation; Direction::COUNT], GridError> {
        Ok(self.cell(id)?.relations.relations())
    }

    /// Override the path-index distance of the directed link `from -> to`,
    /// for grids where some links cost more than others.
    pub fn set_edge_distance(
        &mut self,
        from: CellId,
        to: CellId,
        distance: u32,
    ) -> Result<(), GridError> {
        self.cell(from)?;
        self.cell(to)?;
        self.path_index.add_or_update_edge(from, to, distance);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// Lay out every cell reachable from the root. See `layout::layout`.
    pub fn layout(&mut self) -> Result<LayoutReport, GridError> {
        layout::layout(self)
    }

    pub fn position(&self, id: CellId) -> Result<Option<Vec3>, GridError> {
        Ok(self.cell(id)?.position())
    }

    pub fn top_of_cell(&self, id: CellId) -> Result<Option<Vec3>, GridError> {
        Ok(self.cell(id)?.top())
    }

    /// Restore authored tables, clear positions, and rebuild the path index
    /// from the authored links. The root designation and config are kept.
    pub fn reset(&mut self) {
        self.path_index.clear();
        for cell in &mut self.cells {
            cell.relations = cell.authored.clone().unwrap_or_default();
            cell.position = Vec3::ZERO;
            cell.scale = Vec3::ONE;
            cell.positioned = false;
        }
        let authored: Vec<(CellId, CellRelations)> = self
            .cells
            .iter()
            .filter_map(|c| c.authored.clone().map(|a| (c.id, a)))
            .collect();
        for (id, relations) in &authored {
            self.register(*id, relations);
        }
        debug!(cells = self.cells.len(), "grid reset");
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    pub fn path_index(&self) -> &DijkstraMap<CellId, u32> {
        &self.path_index
    }

    /// Shortest path in goal→source order (pop from the end to walk it from
    /// the source). Empty if `goal` is unreachable.
    pub fn find_path(&self, source: CellId, goal: CellId) -> Vec<CellId> {
        self.path_index.find_path(source, goal)
    }

    /// Shortest path in source→goal order. Empty if `goal` is unreachable.
    pub fn find_route(&self, source: CellId, goal: CellId) -> Vec<CellId> {
        let mut path = self.find_path(source, goal);
        path.reverse();
        path
    }
}
