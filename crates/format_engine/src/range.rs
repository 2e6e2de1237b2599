//! Range handle - a positionable wrapper around one host selection range
//!
//! Offsets are not validated beyond what the tree itself checks; callers are
//! expected to pass positions inside node bounds.

use crate::Result;
use doc_model::{BoundaryPoint, DocumentTree, NodeId, SelectionRange};
use serde::{Deserialize, Serialize};

/// Tag of the detached container returned by [`RangeHandle::extract`]
pub const FRAGMENT_TAG: &str = "fragment";

/// Bounding box of a range in host coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Host layout collaborator able to measure a range
pub trait RangeGeometry {
    fn bounding_rect(&self, tree: &DocumentTree, range: &SelectionRange) -> Option<Rect>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeHandle {
    range: SelectionRange,
}

/// A boundary pinned to node identity so that splitting siblings does not
/// invalidate it
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Before(NodeId),
    After(NodeId),
    Inside(NodeId),
}

impl RangeHandle {
    pub fn new(range: SelectionRange) -> Self {
        Self { range }
    }

    pub fn collapsed(point: BoundaryPoint) -> Self {
        Self::new(SelectionRange::collapsed(point))
    }

    pub fn range(&self) -> SelectionRange {
        self.range
    }

    pub fn start(&self) -> BoundaryPoint {
        self.range.start
    }

    pub fn end(&self) -> BoundaryPoint {
        self.range.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.range.is_collapsed()
    }

    pub fn set_start(&mut self, node: NodeId, offset: usize) {
        self.range.start = BoundaryPoint::new(node, offset);
    }

    pub fn set_end(&mut self, node: NodeId, offset: usize) {
        self.range.end = BoundaryPoint::new(node, offset);
    }

    /// Collapse the range onto its end point
    pub fn set_start_to_end(&mut self) {
        self.range.start = self.range.end;
    }

    /// Collapse the range onto its start point
    pub fn collapse_to_start(&mut self) {
        self.range.end = self.range.start;
    }

    /// Insert a node at the start point, splitting a text node if needed.
    ///
    /// The range itself is left untouched.
    pub fn insert(&self, tree: &mut DocumentTree, node: NodeId) -> Result<()> {
        let BoundaryPoint { node: container, offset } = self.range.start;
        if tree.is_text(container) {
            if offset == 0 {
                tree.insert_before(container, node)?;
            } else if offset >= tree.text_len(container) {
                tree.insert_after(container, node)?;
            } else {
                tree.split_text(container, offset)?;
                tree.insert_after(container, node)?;
            }
        } else {
            let index = offset.min(tree.children(container).len());
            tree.insert_child(container, index, node)?;
        }
        Ok(())
    }

    /// Remove the selected content from the tree and return it inside a
    /// detached fragment element.
    ///
    /// Ancestors that are only partially selected are copied shallowly into
    /// the fragment; the originals keep their unselected content. The range
    /// collapses to its start.
    pub fn extract(&mut self, tree: &mut DocumentTree) -> Result<NodeId> {
        let fragment = tree.create_element(FRAGMENT_TAG);
        if self.is_collapsed() {
            return Ok(fragment);
        }
        let (start, end) = self.split_boundaries(tree)?;
        extract_into(tree, start, end, fragment)?;
        self.range = SelectionRange::collapsed(BoundaryPoint::new(start.0, start.1));
        Ok(fragment)
    }

    /// Remove the selected content and drop it
    pub fn delete_contents(&mut self, tree: &mut DocumentTree) -> Result<()> {
        let fragment = self.extract(tree)?;
        tree.remove(fragment)?;
        Ok(())
    }

    /// Bounding box as measured by the host layout
    pub fn get_rect(&self, tree: &DocumentTree, geometry: &dyn RangeGeometry) -> Option<Rect> {
        geometry.bounding_rect(tree, &self.range)
    }

    /// Split text nodes at both boundaries and return element-level
    /// `(container, child index)` boundaries
    fn split_boundaries(&self, tree: &mut DocumentTree) -> Result<((NodeId, usize), (NodeId, usize))> {
        let start = self.range.start;
        let mut end = self.range.end;

        let start_anchor = if tree.is_text(start.node) {
            let len = tree.text_len(start.node);
            if start.offset == 0 {
                Anchor::Before(start.node)
            } else if start.offset >= len {
                Anchor::After(start.node)
            } else {
                let index = tree.index_in_parent(start.node);
                let parent = tree.parent(start.node);
                match tree.split_text(start.node, start.offset)? {
                    Some(tail) => {
                        if end.node == start.node {
                            end = BoundaryPoint::new(tail, end.offset - start.offset);
                        } else if Some(end.node) == parent
                            && index.is_some_and(|i| end.offset > i)
                        {
                            end.offset += 1;
                        }
                        Anchor::Before(tail)
                    }
                    None => Anchor::After(start.node),
                }
            }
        } else {
            let children = tree.children(start.node);
            match children.get(start.offset) {
                Some(&child) => Anchor::Before(child),
                None => match children.last() {
                    Some(&last) => Anchor::After(last),
                    None => Anchor::Inside(start.node),
                },
            }
        };

        let end_anchor = if tree.is_text(end.node) {
            if end.offset == 0 {
                Anchor::Before(end.node)
            } else {
                if end.offset < tree.text_len(end.node) {
                    tree.split_text(end.node, end.offset)?;
                }
                Anchor::After(end.node)
            }
        } else {
            let children = tree.children(end.node);
            match end.offset.checked_sub(1).and_then(|i| children.get(i)) {
                Some(&child) => Anchor::After(child),
                None => match children.first() {
                    Some(&first) => Anchor::Before(first),
                    None => Anchor::Inside(end.node),
                },
            }
        };

        Ok((resolve_anchor(tree, start_anchor), resolve_anchor(tree, end_anchor)))
    }
}

fn resolve_anchor(tree: &DocumentTree, anchor: Anchor) -> (NodeId, usize) {
    match anchor {
        Anchor::Before(n) => match (tree.parent(n), tree.index_in_parent(n)) {
            (Some(p), Some(i)) => (p, i),
            _ => (n, 0),
        },
        Anchor::After(n) => match (tree.parent(n), tree.index_in_parent(n)) {
            (Some(p), Some(i)) => (p, i + 1),
            _ => (n, tree.node_length(n)),
        },
        Anchor::Inside(n) => (n, 0),
    }
}

/// Child of `ancestor` on the path down to `node`
fn child_towards(tree: &DocumentTree, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = tree.parent(current)?;
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
}

/// Move everything between two element-level boundaries into `dest`
fn extract_into(
    tree: &mut DocumentTree,
    (sc, so): (NodeId, usize),
    (ec, eo): (NodeId, usize),
    dest: NodeId,
) -> Result<()> {
    if sc == ec {
        let moved: Vec<NodeId> = tree
            .children(sc)
            .iter()
            .skip(so)
            .take(eo.saturating_sub(so))
            .copied()
            .collect();
        for child in moved {
            tree.append_child(dest, child)?;
        }
        return Ok(());
    }

    let Some(ca) = tree.common_ancestor(sc, ec) else {
        return Ok(());
    };

    let mut first_full = so;
    if sc != ca {
        if let Some(first) = child_towards(tree, ca, sc) {
            let copy = tree.clone_shallow(first)?;
            tree.append_child(dest, copy)?;
            let len = tree.node_length(first);
            extract_into(tree, (sc, so), (first, len), copy)?;
            first_full = tree.index_in_parent(first).map(|i| i + 1).unwrap_or(0);
        }
    }

    let last_partial = if ec == ca { None } else { child_towards(tree, ca, ec) };
    let end_index = match last_partial {
        Some(last) => tree.index_in_parent(last).unwrap_or(0),
        None => eo,
    };

    let contained: Vec<NodeId> = tree
        .children(ca)
        .iter()
        .skip(first_full)
        .take(end_index.saturating_sub(first_full))
        .copied()
        .collect();
    for child in contained {
        tree.append_child(dest, child)?;
    }

    if let Some(last) = last_partial {
        let copy = tree.clone_shallow(last)?;
        tree.append_child(dest, copy)?;
        extract_into(tree, (last, 0), (ec, eo), copy)?;
    }
    Ok(())
}
