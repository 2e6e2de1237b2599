//! Selection snapshot - normalized caret data read from the host selection
//!
//! A snapshot is taken fresh for every operation and must not be kept across
//! a tree mutation: line indices and offsets go stale as soon as the tree
//! changes.

use crate::RangeHandle;
use doc_model::{BoundaryPoint, DocumentTree, HostSelection, NodeId, SelectionRange};

/// One end of a captured selection range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretPoint {
    pub node: NodeId,
    pub offset: usize,
    /// Ancestor chain from the line root (`path[0]`) down to `node`
    pub path: Vec<NodeId>,
    /// Index of `path[0]` among the body's children
    pub line: usize,
}

impl CaretPoint {
    /// The line root containing this point
    pub fn line_root(&self) -> NodeId {
        self.path.first().copied().unwrap_or(self.node)
    }

    pub fn boundary(&self) -> BoundaryPoint {
        BoundaryPoint::new(self.node, self.offset)
    }
}

/// Normalized view of one host selection range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretData {
    pub start: CaretPoint,
    pub end: CaretPoint,
    /// Deepest common ancestor of the start and end nodes
    pub same_root: NodeId,
    pub range: RangeHandle,
}

impl CaretData {
    /// Whether this is a non-collapsed range
    pub fn is_range(&self) -> bool {
        !(self.start.node == self.end.node && self.start.offset == self.end.offset)
    }

    pub fn same_node(&self) -> bool {
        self.start.node == self.end.node
    }

    pub fn same_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

/// Reads and writes the host selection
pub struct SelectionSnapshot;

impl SelectionSnapshot {
    /// Capture every host range. Ranges whose endpoints are not attached to
    /// the body, or that sit in an empty document, are skipped.
    pub fn get(tree: &DocumentTree, selection: &HostSelection) -> Vec<CaretData> {
        selection
            .ranges()
            .iter()
            .filter_map(|range| Self::capture(tree, range))
            .collect()
    }

    /// Capture only the first host range
    pub fn primary(tree: &DocumentTree, selection: &HostSelection) -> Option<CaretData> {
        selection.primary().and_then(|range| Self::capture(tree, range))
    }

    /// Replace the host selection wholesale
    pub fn update_ranges(selection: &mut HostSelection, ranges: Vec<SelectionRange>) {
        selection.replace(ranges);
    }

    pub fn clean_ranges(selection: &mut HostSelection) {
        selection.clear();
    }

    fn capture(tree: &DocumentTree, range: &SelectionRange) -> Option<CaretData> {
        let collapsed = range.is_collapsed();
        let (start_node, start_offset) = resolve(tree, range.start, Edge::Start, collapsed)?;
        let (end_node, end_offset) = if collapsed {
            (start_node, start_offset)
        } else {
            resolve(tree, range.end, Edge::End, collapsed)?
        };

        let mut start = point(tree, start_node, start_offset)?;
        let mut end = point(tree, end_node, end_offset)?;
        if is_backward(tree, &start, &end) {
            std::mem::swap(&mut start, &mut end);
        }
        let (start_node, start_offset, end_node, end_offset) =
            (start.node, start.offset, end.node, end.offset);
        let same_root = tree.common_ancestor(start_node, end_node)?;
        let range = RangeHandle::new(SelectionRange::between(
            start_node,
            start_offset,
            end_node,
            end_offset,
        ));

        Some(CaretData {
            start,
            end,
            same_root,
            range,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

/// Normalize one boundary: substitute the body by its first or last line and
/// push element boundaries down to leaves for non-collapsed ranges.
fn resolve(
    tree: &DocumentTree,
    point: BoundaryPoint,
    edge: Edge,
    collapsed: bool,
) -> Option<(NodeId, usize)> {
    if !tree.is_attached(point.node) {
        return None;
    }
    let mut node = point.node;
    let mut offset = point.offset.min(tree.node_length(node));

    if node == tree.body() {
        let lines = tree.lines();
        match edge {
            Edge::Start => {
                let first = *lines.first()?;
                node = tree.children(first).first().copied().unwrap_or(first);
                offset = 0;
            }
            Edge::End => {
                let last = *lines.last()?;
                node = tree.children(last).last().copied().unwrap_or(last);
                offset = tree.node_length(node);
            }
        }
    }

    if collapsed || tree.is_text(node) {
        return Some((node, offset));
    }

    let children = tree.children(node);
    if children.is_empty() {
        return Some((node, 0));
    }
    let leaf = match edge {
        Edge::Start => match children.get(offset) {
            Some(&child) => return Some((tree.first_leaf(child), 0)),
            None => tree.last_leaf(node),
        },
        Edge::End => match offset.checked_sub(1).and_then(|i| children.get(i)) {
            Some(&child) => tree.last_leaf(child),
            None => return Some((tree.first_leaf(node), 0)),
        },
    };
    Some((leaf, tree.node_length(leaf)))
}

fn point(tree: &DocumentTree, node: NodeId, offset: usize) -> Option<CaretPoint> {
    let body = tree.body();
    let mut path: Vec<NodeId> = tree
        .ancestors(node)
        .into_iter()
        .take_while(|&a| a != body)
        .collect();
    path.reverse();
    path.push(node);
    let line = tree.line_index(node)?;
    Some(CaretPoint {
        node,
        offset,
        path,
        line,
    })
}

/// Whether `start` lies after `end` in document order
fn is_backward(tree: &DocumentTree, start: &CaretPoint, end: &CaretPoint) -> bool {
    if start.line != end.line {
        return start.line > end.line;
    }
    if start.node == end.node {
        return start.offset > end.offset;
    }
    let root = start.line_root();
    let order: Vec<NodeId> = tree.descendants(root);
    let key = |node: NodeId| order.iter().position(|&n| n == node).map_or(0, |i| i + 1);
    key(start.node) > key(end.node)
}
