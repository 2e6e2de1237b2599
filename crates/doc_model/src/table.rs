//! Table-cell selection set
//!
//! Table UI code flags cells while the user drag-selects across a table.
//! While the set is non-empty it takes precedence over the caret for every
//! formatting command: each flagged cell is formatted as its own root.

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Ordered set of selected table cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSelection {
    cells: Vec<NodeId>,
}

impl TableSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a cell; selecting the same cell twice is a no-op
    pub fn select(&mut self, cell: NodeId) {
        if !self.cells.contains(&cell) {
            self.cells.push(cell);
        }
    }

    pub fn deselect(&mut self, cell: NodeId) -> bool {
        let before = self.cells.len();
        self.cells.retain(|&c| c != cell);
        before != self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: NodeId) -> bool {
        self.cells.contains(&cell)
    }

    pub fn cells(&self) -> &[NodeId] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.cells.iter().copied()
    }
}

impl FromIterator<NodeId> for TableSelection {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        let mut selection = Self::new();
        for cell in iter {
            selection.select(cell);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_idempotent() {
        let cell = NodeId::new();
        let mut selection = TableSelection::new();
        selection.select(cell);
        selection.select(cell);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(cell));
    }

    #[test]
    fn test_deselect_and_clear() {
        let a = NodeId::new();
        let b = NodeId::new();
        let mut selection: TableSelection = [a, b].into_iter().collect();
        assert!(selection.deselect(a));
        assert!(!selection.deselect(a));
        assert_eq!(selection.cells(), &[b]);
        selection.clear();
        assert!(selection.is_empty());
    }
}
