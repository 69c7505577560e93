// Per-cell neighbor table.
//
// `CellRelations` holds the eight neighbor slots of one cell (slot order is
// direction order, see `direction.rs`) plus a reverse map from neighbor to
// slot, so "which way is that cell from here?" is O(1).
//
// Links are one-sided: writing B into A's east slot says nothing about A's
// west slot. Whoever links two cells writes both tables. Writes are
// last-write-wins; the previous occupant of an overwritten slot loses its
// reverse entry unless it still sits in another slot.

use crate::direction::Direction;
use crate::error::GridError;
use crate::types::{CellId, Vec2};
use rustc_hash::FxHashMap;

/// One slot of a neighbor table, paired with the direction it faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRelation {
    pub cell: Option<CellId>,
    pub direction: Direction,
}

impl CellRelation {
    /// Raw direction vector of this slot.
    pub fn vector(&self) -> Vec2 {
        self.direction.vector()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellRelations {
    slots: [Option<CellId>; Direction::COUNT],
    slot_of: FxHashMap<CellId, Direction>,
}

impl CellRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an authored list. `table` must have exactly eight
    /// entries, index 0 = north, clockwise.
    pub fn from_table(cell: CellId, table: &[Option<CellId>]) -> Result<Self, GridError> {
        if table.len() != Direction::COUNT {
            return Err(GridError::UnconfiguredNeighborTable {
                cell,
                len: table.len(),
            });
        }
        let mut relations = Self::new();
        for (dir, entry) in Direction::ALL.into_iter().zip(table) {
            if let Some(other) = *entry {
                relations.set(dir, other);
            }
        }
        Ok(relations)
    }

    /// Write `other` into slot `dir`, replacing any previous occupant.
    pub fn set(&mut self, dir: Direction, other: CellId) {
        let previous = self.slots[dir.index()].replace(other);
        let evicted = previous.filter(|&p| p != other && self.slot_of.get(&p) == Some(&dir));
        if let Some(prev) = evicted {
            match self.slots.iter().rposition(|s| *s == Some(prev)) {
                Some(i) => {
                    self.slot_of.insert(prev, Direction::ALL[i]);
                }
                None => {
                    self.slot_of.remove(&prev);
                }
            }
        }
        self.slot_of.insert(other, dir);
    }

    pub fn get(&self, dir: Direction) -> Option<CellId> {
        self.slots[dir.index()]
    }

    /// Slot lookup by raw id. Fails for ids outside 0..=7.
    pub fn get_by_id(&self, id: u8) -> Result<Option<CellId>, GridError> {
        Direction::from_id(id).map(|dir| self.get(dir))
    }

    /// Which slot `other` occupies, or `None` if it is not a direct neighbor.
    pub fn slot_of(&self, other: CellId) -> Option<Direction> {
        self.slot_of.get(&other).copied()
    }

    pub fn slots(&self) -> &[Option<CellId>; Direction::COUNT] {
        &self.slots
    }

    /// Every slot with its direction, occupied or not.
    pub fn relations(&self) -> [CellRelation; Direction::COUNT] {
        Direction::ALL.map(|direction| CellRelation {
            cell: self.slots[direction.index()],
            direction,
        })
    }

    /// Occupied slots in slot order, each with its raw direction vector.
    /// Reflects the table as it is when iteration happens.
    pub fn non_empty(&self) -> impl Iterator<Item = (CellId, Vec2)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.get(dir).map(|cell| (cell, dir.vector())))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(usize, u32)]) -> Vec<Option<CellId>> {
        let mut t = vec![None; 8];
        for &(slot, id) in entries {
            t[slot] = Some(CellId(id));
        }
        t
    }

    #[test]
    fn from_table_builds_reverse_map() {
        let r = CellRelations::from_table(CellId(0), &table(&[(0, 1), (2, 2)])).unwrap();
        assert_eq!(r.get(Direction::NORTH), Some(CellId(1)));
        assert_eq!(r.get(Direction::EAST), Some(CellId(2)));
        assert_eq!(r.slot_of(CellId(1)), Some(Direction::NORTH));
        assert_eq!(r.slot_of(CellId(2)), Some(Direction::EAST));
        assert_eq!(r.slot_of(CellId(3)), None);
    }

    #[test]
    fn from_table_rejects_wrong_length() {
        let err = CellRelations::from_table(CellId(5), &[None; 7]).unwrap_err();
        assert_eq!(
            err,
            GridError::UnconfiguredNeighborTable {
                cell: CellId(5),
                len: 7
            }
        );
        assert!(CellRelations::from_table(CellId(5), &[None; 9]).is_err());
    }

    #[test]
    fn set_then_slot_of_returns_written_slot() {
        let mut r = CellRelations::new();
        for dir in Direction::ALL {
            r.set(dir, CellId(9));
            assert_eq!(r.slot_of(CellId(9)), Some(dir));
        }
    }

    #[test]
    fn overwrite_is_last_write_wins() {
        let mut r = CellRelations::new();
        r.set(Direction::WEST, CellId(1));
        r.set(Direction::WEST, CellId(2));
        assert_eq!(r.get(Direction::WEST), Some(CellId(2)));
        assert_eq!(r.slot_of(CellId(2)), Some(Direction::WEST));
        // The evicted cell is no longer a neighbor.
        assert_eq!(r.slot_of(CellId(1)), None);
    }

    #[test]
    fn overwrite_keeps_reverse_entry_of_cell_in_another_slot() {
        let mut r = CellRelations::new();
        r.set(Direction::NORTH, CellId(1));
        r.set(Direction::EAST, CellId(1));
        r.set(Direction::EAST, CellId(2));
        assert_eq!(r.slot_of(CellId(1)), Some(Direction::NORTH));
    }

    #[test]
    fn get_by_id_rejects_out_of_range() {
        let r = CellRelations::new();
        assert_eq!(r.get_by_id(3), Ok(None));
        assert_eq!(r.get_by_id(8), Err(GridError::InvalidDirection { id: 8 }));
    }

    #[test]
    fn non_empty_lists_in_slot_order() {
        let r = CellRelations::from_table(CellId(0), &table(&[(6, 3), (1, 4), (4, 5)])).unwrap();
        let listed: Vec<_> = r.non_empty().collect();
        assert_eq!(
            listed,
            vec![
                (CellId(4), Vec2::new(1.0, 1.0)),
                (CellId(5), Vec2::new(0.0, -1.0)),
                (CellId(3), Vec2::new(-1.0, 0.0)),
            ]
        );
        assert!(!r.is_empty());
        assert!(CellRelations::new().is_empty());
    }

    #[test]
    fn relations_cover_every_slot() {
        let r = CellRelations::from_table(CellId(0), &table(&[(3, 7)])).unwrap();
        let all = r.relations();
        assert_eq!(all.len(), 8);
        assert_eq!(all[3].cell, Some(CellId(7)));
        assert_eq!(all[3].vector(), Vec2::new(1.0, -1.0));
        assert!(
            all.iter()
                .enumerate()
                .all(|(i, rel)| rel.direction.index() == i)
        );
    }
}
