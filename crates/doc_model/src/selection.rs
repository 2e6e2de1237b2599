//! Host selection model - boundary points and ranges
//!
//! This is the selection collaborator the formatting core reads from and
//! writes back to. Offsets follow DOM conventions: a char offset inside a
//! text node, or a child index inside an element.

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A position in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    /// The node containing this position
    pub node: NodeId,
    /// Char offset in a text node, child index in an element
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Position at the start of a node
    pub fn start_of(node: NodeId) -> Self {
        Self { node, offset: 0 }
    }
}

/// A span between two boundary points, start before end in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl SelectionRange {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    /// A caret: start and end at the same point
    pub fn collapsed(point: BoundaryPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// Convenience for a span inside (or across) nodes
    pub fn between(start: NodeId, start_offset: usize, end: NodeId, end_offset: usize) -> Self {
        Self::new(
            BoundaryPoint::new(start, start_offset),
            BoundaryPoint::new(end, end_offset),
        )
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The editor's live selection: zero or more ranges.
///
/// Several ranges appear when the host supports multi-range selection,
/// e.g. drag-selecting across table cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSelection {
    ranges: Vec<SelectionRange>,
}

impl HostSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection holding a single range
    pub fn single(range: SelectionRange) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    /// Replace all ranges wholesale
    pub fn replace(&mut self, ranges: Vec<SelectionRange>) {
        self.ranges = ranges;
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn primary(&self) -> Option<&SelectionRange> {
        self.ranges.first()
    }
}
