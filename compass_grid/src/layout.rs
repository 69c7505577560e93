// Layout pass and relation inference.
//
// `layout()` walks the grid depth-first from the root cell, giving every
// reachable cell a world position exactly once. A cell discovered from
// `parent` along compass direction `v` lands at
// `parent.position + (scale.x * v.x, 0, scale.z * v.y)`.
//
// The walk is an explicit stack of frames rather than recursion, so deep
// grids cannot overflow the call stack. Each frame holds:
// - the cell and its position,
// - the cell's occupied slots, listed once when the cell is entered,
// - a cursor into that list,
// - the ancestor chain from the root down to and including the cell.
//
// Visiting order is exactly that of a recursive pre-order walk: slots are
// tried 0..=7, and a neighbor is checked for "already positioned" only when
// its turn comes, after earlier siblings' subtrees have finished. When a cell
// is reachable along several paths, the first path in that order fixes both
// its position and the ancestor chain inference sees for it.
//
// ## Relation inference
//
// With inference enabled, each newly discovered cell `g` first gets linked
// back to its discoverer, then walks up to `max_inference_depth` ancestors
// (the discoverer first, then toward the root). At each step `offset` is
// `g`'s position relative to the current ancestor in whole cells. Any
// neighbor of that ancestor sitting exactly one step from `g`
// (`slot_vector - offset` classifies as a direction) gets a mutual link
// with `g`, plus unit-distance path-index edges both ways.
//
// The ancestor chain is per-branch: a cell's inference only sees the cells
// on its own path from the root, never cells from sibling subtrees.
//
// See also: `grid.rs` for the `CellGrid` being laid out, `direction.rs` for
// the vector classification that inference relies on.

use crate::direction::{Direction, direction_of, vector_to_id};
use crate::error::GridError;
use crate::grid::CellGrid;
use crate::types::{CellId, Vec2, Vec3};
use compass_grid_dijkstra::PathIndex;
use smallvec::SmallVec;
use tracing::{debug, info, trace, warn};

/// Path-index distance of every link inference creates.
pub const INFERRED_EDGE_DISTANCE: u32 = 1;

/// Path from the root down to (and including) a frame's cell.
pub type AncestorStack = SmallVec<[CellId; 16]>;

/// Outcome of one layout run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Cells that received a position in this run.
    pub cells_positioned: usize,
    /// Links inference created that did not exist before.
    pub inferred_links: usize,
}

/// Settings read from the config once per run.
#[derive(Clone, Copy, Debug)]
struct RunSettings {
    scale: Vec3,
    inference_enabled: bool,
    max_depth: u32,
}

struct Frame {
    cell: CellId,
    position: Vec3,
    pending: SmallVec<[(CellId, Vec2); Direction::COUNT]>,
    next: usize,
    ancestors: AncestorStack,
}

/// Lay out every cell reachable from the grid's root.
///
/// 1. The root is placed at the grid's root position.
/// 2. Each unpositioned neighbor, in slot order, is handed to relation
///    inference (if enabled) and then laid out one cell-step away along its
///    slot's direction, depth-first.
/// 3. Cells already positioned are never moved. Running layout on a grid
///    whose root is already positioned does nothing; call `reset()` first to
///    lay it out again.
///
/// Fails with `NoRootCell` if no root is designated, and with
/// `UnconfiguredNeighborTable` when the walk reaches a cell whose table was
/// never supplied.
pub fn layout(grid: &mut CellGrid) -> Result<LayoutReport, GridError> {
    let root = grid.root().ok_or(GridError::NoRootCell)?;
    if grid.cell(root)?.is_positioned() {
        warn!(root = %root, "grid is already laid out; skipping layout");
        return Ok(LayoutReport::default());
    }

    let config = grid.config();
    let settings = RunSettings {
        scale: config.cell_scale,
        inference_enabled: config.inference_enabled,
        max_depth: config.max_inference_depth,
    };
    info!(
        root = %root,
        inference = settings.inference_enabled,
        depth = settings.max_depth,
        "laying out grid"
    );

    let mut report = LayoutReport::default();
    let root_position = grid.root_position();
    let first = enter(grid, root, root_position, settings.scale, AncestorStack::new())?;
    report.cells_positioned += 1;
    let mut stack = vec![first];

    while let Some(frame) = stack.last_mut() {
        let Some(&(next, direction)) = frame.pending.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let cell = grid.cell(next)?;
        if cell.is_positioned() {
            continue;
        }
        if !cell.is_configured() {
            return Err(GridError::UnconfiguredNeighborTable { cell: next, len: 0 });
        }

        let discoverer = frame.cell;
        let position = frame.position + Vec3::compass_step(direction, settings.scale);
        let ancestors = frame.ancestors.clone();

        if settings.inference_enabled {
            report.inferred_links += infer_relations(
                grid,
                next,
                discoverer,
                direction,
                ancestors.clone(),
                settings.max_depth,
            )?;
        }

        let child = enter(grid, next, position, settings.scale, ancestors)?;
        report.cells_positioned += 1;
        stack.push(child);
    }

    info!(
        cells = report.cells_positioned,
        inferred_links = report.inferred_links,
        "layout complete"
    );
    Ok(report)
}

/// Position `cell` and build its frame. `ancestors` is the chain above it.
fn enter(
    grid: &mut CellGrid,
    id: CellId,
    position: Vec3,
    scale: Vec3,
    mut ancestors: AncestorStack,
) -> Result<Frame, GridError> {
    let cell = grid.cell_mut(id)?;
    if !cell.is_configured() {
        return Err(GridError::UnconfiguredNeighborTable { cell: id, len: 0 });
    }
    cell.position = position;
    cell.scale = scale;
    cell.positioned = true;
    trace!(cell = %id, %position, "cell positioned");

    let pending = cell.relations.non_empty().collect();
    ancestors.push(id);
    Ok(Frame {
        cell: id,
        position,
        pending,
        next: 0,
        ancestors,
    })
}

/// Link the newly discovered cell `g` to cells near it on the path that found
/// it. Returns the number of new links.
///
/// `direction` is the raw vector from `discoverer` to `g`. `ancestors` is the
/// chain from the root down to and including `discoverer`; it is consumed
/// from the top, at most `max_depth` entries.
///
/// Before the walk, `g` is linked back to the discoverer. The discoverer's
/// own link to `g` is only written if it has gone missing.
pub fn infer_relations(
    grid: &mut CellGrid,
    g: CellId,
    discoverer: CellId,
    direction: Vec2,
    mut ancestors: AncestorStack,
    max_depth: u32,
) -> Result<usize, GridError> {
    // The forward link normally exists already: the discoverer found `g` in
    // its own table. A later inferred write can evict it, so restore it.
    if grid.cell(discoverer)?.relations.slot_of(g).is_none() {
        let forward = direction_of(direction)?;
        debug!(cell = %g, discoverer = %discoverer, "restoring evicted forward link");
        grid.cell_mut(discoverer)?.relations.set(forward, g);
    }

    let back = direction_of(-direction)?;
    grid.cell_mut(g)?.relations.set(back, discoverer);
    grid.path_index.add_or_update_edge(g, discoverer, INFERRED_EDGE_DISTANCE);

    let mut links = 0;
    let mut offset = direction;
    let mut caller = discoverer;

    for _ in 0..max_depth {
        let Some(ancestor) = ancestors.pop() else {
            break;
        };
        let previous = caller;
        caller = ancestor;

        if caller != previous {
            // A later write may have evicted `previous` from the ancestor's
            // table; the offset can't be composed past that point.
            let Some(slot) = grid.cell(caller)?.relations.slot_of(previous) else {
                debug!(
                    cell = %g,
                    ancestor = %caller,
                    "ancestor no longer links to its child; stopping inference"
                );
                break;
            };
            offset += slot.vector();
        }

        let slots = *grid.cell(caller)?.relations.slots();
        for dir in Direction::ALL {
            let Some(candidate) = vector_to_id(dir.vector() - offset) else {
                continue;
            };
            let Some(n2) = slots[dir.index()] else {
                continue;
            };
            if n2 == g {
                continue;
            }

            let is_new = grid.cell(g)?.relations.get(candidate) != Some(n2);
            grid.cell_mut(g)?.relations.set(candidate, n2);
            grid.cell_mut(n2)?.relations.set(candidate.opposite(), g);
            grid.path_index.add_or_update_edge(g, n2, INFERRED_EDGE_DISTANCE);
            grid.path_index.add_or_update_edge(n2, g, INFERRED_EDGE_DISTANCE);

            if is_new {
                links += 1;
                trace!(cell = %g, neighbor = %n2, slot = %candidate, "inferred link");
            }
        }
    }

    Ok(links)
}
