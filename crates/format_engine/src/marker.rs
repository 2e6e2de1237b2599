//! Caret markers
//!
//! A marker is a transient element holding a single zero-width filler
//! character. It is inserted at a collapsed caret so that formatting can be
//! armed before anything is typed: the caret is placed inside the filler and
//! the next typed character lands inside whatever wrappers the marker holds.

use crate::surgery::unwrap_node;
use crate::{FormatConfig, RangeHandle, Result};
use doc_model::{BoundaryPoint, DocumentTree, NodeId, StyleMap};

/// A freshly inserted marker and the filler text the caret goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub element: NodeId,
    pub filler: NodeId,
}

impl Marker {
    /// Caret position inside the filler
    pub fn caret(&self) -> BoundaryPoint {
        BoundaryPoint::new(self.filler, 1)
    }
}

pub struct MarkerManager<'a> {
    config: &'a FormatConfig,
}

impl<'a> MarkerManager<'a> {
    pub fn new(config: &'a FormatConfig) -> Self {
        Self { config }
    }

    pub fn is_marker(&self, tree: &DocumentTree, node: NodeId) -> bool {
        tree.tag(node).is_some_and(|t| self.config.is_marker_tag(t))
    }

    /// Marker containing `node`, if any
    pub fn enclosing(&self, tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
        let tag = self.config.marker_tag.as_str();
        tree.closest_until(node, Some(tree.body()), |n| {
            n.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag))
        })
    }

    /// Every marker under `root`, in document order
    pub fn find_all(&self, tree: &DocumentTree, root: NodeId) -> Vec<NodeId> {
        tree.descendants(root)
            .into_iter()
            .filter(|&n| self.is_marker(tree, n))
            .collect()
    }

    /// Whether a marker holds nothing but filler
    pub fn is_empty_marker(&self, tree: &DocumentTree, marker: NodeId) -> bool {
        let filler = self.config.marker_filler;
        tree.text_content(marker).chars().all(|c| c == filler)
            && tree
                .descendants(marker)
                .iter()
                .all(|&n| tree.is_text(n) || !tree.is_void(n))
    }

    /// Wrapper chain between the marker and its filler, outermost first
    pub fn armed_formats(&self, tree: &DocumentTree, marker: NodeId) -> Vec<(String, StyleMap)> {
        let mut chain = Vec::new();
        let mut current = marker;
        while let Some(&child) = tree.children(current).first() {
            if tree.is_text(child) {
                break;
            }
            if let (Some(tag), Some(styles)) = (tree.tag(child), tree.styles(child)) {
                chain.push((tag.to_string(), styles.clone()));
            }
            current = child;
        }
        chain
    }

    /// Remove a marker: filler characters are stripped, an empty marker is
    /// deleted and a marker with typed content is replaced by its children
    pub fn flush(&self, tree: &mut DocumentTree, marker: NodeId) -> Result<()> {
        self.flush_keeping(tree, marker, None)
    }

    /// Like [`Self::flush`], leaving the subtree of `keep` untouched
    pub fn flush_keeping(&self, tree: &mut DocumentTree, marker: NodeId, keep: Option<NodeId>) -> Result<()> {
        if !tree.exists(marker) {
            return Ok(());
        }
        let filler = self.config.marker_filler;
        let inner: Vec<NodeId> = tree
            .descendants(marker)
            .into_iter()
            .filter(|&n| keep.map_or(true, |k| !tree.contains(k, n)))
            .collect();
        for &node in &inner {
            let Some(text) = tree.text(node) else {
                continue;
            };
            if text.contains(filler) {
                let stripped: String = text.chars().filter(|&c| c != filler).collect();
                tree.set_text(node, stripped)?;
            }
        }
        if keep.is_none() && self.is_empty_marker(tree, marker) {
            tracing::trace!(marker = %marker, "dropping empty marker");
            let parent = tree.parent(marker);
            tree.remove(marker)?;
            if let Some(parent) = parent {
                self.remove_empty_ancestors(tree, parent)?;
            }
            return Ok(());
        }
        for &node in inner.iter().rev() {
            let holds_keep = keep.is_some_and(|k| tree.contains(node, k));
            if tree.exists(node) && !holds_keep && tree.is_empty_node(node) {
                tree.remove(node)?;
            }
        }
        unwrap_node(tree, marker)?;
        Ok(())
    }

    /// Drop wrappers left empty by a removed marker, stopping at the line root
    fn remove_empty_ancestors(&self, tree: &mut DocumentTree, from: NodeId) -> Result<()> {
        let body = tree.body();
        let mut current = from;
        while current != body && tree.parent(current) != Some(body) && tree.is_empty_node(current) {
            if tree.tag(current).is_some_and(|t| self.config.is_preserved_tag(t)) {
                break;
            }
            let Some(parent) = tree.parent(current) else {
                break;
            };
            tree.remove(current)?;
            current = parent;
        }
        Ok(())
    }

    /// Flush every marker under `root` that does not contain one of `keep`
    pub fn flush_stale(&self, tree: &mut DocumentTree, root: NodeId, keep: &[NodeId]) -> Result<usize> {
        let stale: Vec<NodeId> = self
            .find_all(tree, root)
            .into_iter()
            .filter(|&m| !keep.iter().any(|&k| tree.contains(m, k)))
            .collect();
        for &marker in &stale {
            self.flush(tree, marker)?;
        }
        Ok(stale.len())
    }

    /// Insert a new marker at `point`, rebuilding `armed` wrappers inside it
    pub fn insert(
        &self,
        tree: &mut DocumentTree,
        point: BoundaryPoint,
        armed: &[(String, StyleMap)],
    ) -> Result<Marker> {
        let element = self.create(tree, armed)?;
        RangeHandle::collapsed(point).insert(tree, element.element)?;
        Ok(element)
    }

    /// Put a new marker in place of an existing one and flush the old one
    pub fn replace(&self, tree: &mut DocumentTree, old: NodeId, armed: &[(String, StyleMap)]) -> Result<Marker> {
        let marker = self.create(tree, armed)?;
        tree.insert_before(old, marker.element)?;
        self.flush(tree, old)?;
        Ok(marker)
    }

    fn create(&self, tree: &mut DocumentTree, armed: &[(String, StyleMap)]) -> Result<Marker> {
        let element = tree.create_element(&self.config.marker_tag);
        let mut parent = element;
        for (tag, styles) in armed {
            let wrapper = tree.create_element_with_styles(tag, styles.clone());
            tree.append_child(parent, wrapper)?;
            parent = wrapper;
        }
        let filler = tree.append_text(parent, self.config.marker_filler.to_string())?;
        Ok(Marker { element, filler })
    }
}
