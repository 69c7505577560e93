// Generic weighted shortest-path index.
//
// `DijkstraMap` stores a directed, weighted adjacency list keyed by an
// arbitrary node handle `N` and answers single-pair shortest-path queries
// with Dijkstra's algorithm. It knows nothing about compass directions or
// cell layout; `compass_grid` is its only writer and registers nodes and
// edges while the grid is laid out.
//
// The search uses a `BinaryHeap` with reversed ordering to get a min-heap
// (same pattern as the sim's event queue). Ties on equal cost are broken by
// `N: Ord`, and each node's outgoing edges are kept in insertion order, so a
// query over the same index always returns the same path.
//
// Paths come back in goal→source order: the goal is element 0 and the source
// is the last element, so popping from the end walks the route from the
// source outward. Callers wanting source→goal order reverse the vector.
//
// An unreachable goal is an expected outcome and yields an empty path, never
// an error.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Add;

// ---------------------------------------------------------------------------
// Edge weights
// ---------------------------------------------------------------------------

/// A distance type usable as an edge weight.
///
/// Floats are ordered with `total_cmp`, so a NaN weight sorts after every
/// finite cost rather than poisoning the heap. Integer path costs saturate at
/// the type's maximum instead of wrapping.
pub trait EdgeWeight: Copy + PartialOrd + Add<Output = Self> + Debug {
    const ZERO: Self;

    fn total_order(&self, other: &Self) -> Ordering;

    fn saturating_add(self, rhs: Self) -> Self;
}

macro_rules! int_weight {
    ($($t:ty),*) => {
        $(
            impl EdgeWeight for $t {
                const ZERO: Self = 0;

                fn total_order(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn saturating_add(self, rhs: Self) -> Self {
                    <$t>::saturating_add(self, rhs)
                }
            }
        )*
    };
}

macro_rules! float_weight {
    ($($t:ty),*) => {
        $(
            impl EdgeWeight for $t {
                const ZERO: Self = 0.0;

                fn total_order(&self, other: &Self) -> Ordering {
                    self.total_cmp(other)
                }

                fn saturating_add(self, rhs: Self) -> Self {
                    self + rhs
                }
            }
        )*
    };
}

int_weight!(u32, u64);
float_weight!(f32, f64);

// ---------------------------------------------------------------------------
// Index contract
// ---------------------------------------------------------------------------

/// The three operations a shortest-path index exposes to its writer and
/// readers.
pub trait PathIndex<N, W> {
    /// Register `node` with its initial outgoing edges, replacing any edges
    /// it already had.
    fn register_node(&mut self, node: N, edges: &[(N, W)]);

    /// Add the directed edge `from -> to`, or overwrite its weight if it
    /// already exists.
    fn add_or_update_edge(&mut self, from: N, to: N, weight: W);

    /// Shortest path from `source` to `goal` in goal→source order. Empty if
    /// the goal is unreachable.
    fn find_path(&self, source: N, goal: N) -> Vec<N>;
}

// ---------------------------------------------------------------------------
// DijkstraMap
// ---------------------------------------------------------------------------

/// Directed weighted graph answering shortest-path queries.
#[derive(Clone, Debug)]
pub struct DijkstraMap<N, W> {
    /// Outgoing edges per node, in insertion order.
    edges: FxHashMap<N, Vec<(N, W)>>,
}

impl<N, W> Default for DijkstraMap<N, W> {
    fn default() -> Self {
        Self {
            edges: FxHashMap::default(),
        }
    }
}

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry<N, W> {
    node: N,
    cost: W,
}

impl<N: Ord, W: EdgeWeight> PartialEq for OpenEntry<N, W> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: Ord, W: EdgeWeight> Eq for OpenEntry<N, W> {}

impl<N: Ord, W: EdgeWeight> PartialOrd for OpenEntry<N, W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: Ord, W: EdgeWeight> Ord for OpenEntry<N, W> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest cost is "greatest".
        other
            .cost
            .total_order(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<N, W> DijkstraMap<N, W>
where
    N: Copy + Eq + Hash + Ord,
    W: EdgeWeight,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `node` has been registered (directly or as the source of an
    /// added edge).
    pub fn contains(&self, node: N) -> bool {
        self.edges.contains_key(&node)
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of `node`, in insertion order. Empty if unregistered.
    pub fn edges(&self, node: N) -> &[(N, W)] {
        self.edges.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Weight of the directed edge `from -> to`, if present.
    pub fn edge_weight(&self, from: N, to: N) -> Option<W> {
        self.edges(from)
            .iter()
            .find(|(n, _)| *n == to)
            .map(|&(_, w)| w)
    }

    /// Drop every node and edge.
    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Total cost of the shortest path, or `None` if unreachable.
    pub fn path_cost(&self, source: N, goal: N) -> Option<W> {
        self.search(source, goal).map(|(_, cost)| cost)
    }

    fn search(&self, source: N, goal: N) -> Option<(Vec<N>, W)> {
        if source == goal {
            return Some((vec![source], W::ZERO));
        }

        let mut best: FxHashMap<N, W> = FxHashMap::default();
        let mut came_from: FxHashMap<N, N> = FxHashMap::default();
        let mut closed: FxHashSet<N> = FxHashSet::default();
        let mut open = BinaryHeap::new();

        best.insert(source, W::ZERO);
        open.push(OpenEntry {
            node: source,
            cost: W::ZERO,
        });

        while let Some(OpenEntry { node, cost }) = open.pop() {
            if node == goal {
                return Some((reconstruct_path(&came_from, source, goal), cost));
            }
            if !closed.insert(node) {
                continue;
            }

            for &(next, weight) in self.edges(node) {
                if closed.contains(&next) {
                    continue;
                }
                let tentative = cost.saturating_add(weight);
                let improves = best
                    .get(&next)
                    .is_none_or(|known| tentative.total_order(known) == Ordering::Less);
                if improves {
                    best.insert(next, tentative);
                    came_from.insert(next, node);
                    open.push(OpenEntry {
                        node: next,
                        cost: tentative,
                    });
                }
            }
        }

        None
    }
}

impl<N, W> PathIndex<N, W> for DijkstraMap<N, W>
where
    N: Copy + Eq + Hash + Ord,
    W: EdgeWeight,
{
    fn register_node(&mut self, node: N, edges: &[(N, W)]) {
        let list = self.edges.entry(node).or_default();
        list.clear();
        for &(to, weight) in edges {
            match list.iter_mut().find(|(n, _)| *n == to) {
                Some(existing) => existing.1 = weight,
                None => list.push((to, weight)),
            }
        }
    }

    fn add_or_update_edge(&mut self, from: N, to: N, weight: W) {
        let list = self.edges.entry(from).or_default();
        match list.iter_mut().find(|(n, _)| *n == to) {
            Some(existing) => existing.1 = weight,
            None => list.push((to, weight)),
        }
    }

    fn find_path(&self, source: N, goal: N) -> Vec<N> {
        self.search(source, goal)
            .map(|(path, _)| path)
            .unwrap_or_default()
    }
}

/// Walk `came_from` back from the goal. The result starts at the goal and
/// ends at the source.
fn reconstruct_path<N: Copy + Eq + Hash>(
    came_from: &FxHashMap<N, N>,
    source: N,
    goal: N,
) -> Vec<N> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != source {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path
}
