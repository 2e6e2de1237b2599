//! Document tree storage and structural primitives
//!
//! The tree is an arena of [`NodeData`] keyed by [`NodeId`]. Ownership runs
//! strictly parent -> child through each node's child list; the `parent`
//! field is a back-reference that is only read for ancestor queries. The
//! root is the body element, whose direct children are the document's lines.

use crate::{DocModelError, Element, NodeData, NodeId, NodeKind, NodeType, Result, StyleMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Zero-width filler used inside caret markers. Not part of visible text.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Tags rendered without a closing tag and never treated as empty wrappers
pub const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// The complete document tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    body: NodeId,
    nodes: HashMap<NodeId, NodeData>,
    /// Bumped on every structural or content change
    version: u64,
}

impl DocumentTree {
    /// Create an empty tree with a `body` root
    pub fn new() -> Self {
        Self::with_body_tag("body")
    }

    /// Create an empty tree whose root element uses `tag`
    pub fn with_body_tag(tag: &str) -> Self {
        let body = NodeData::new(NodeKind::Element(Element::new(tag)));
        let body_id = body.id();
        let mut nodes = HashMap::new();
        nodes.insert(body_id, body);
        Self {
            body: body_id,
            nodes,
            version: 0,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(&id).ok_or(DocModelError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(&id).ok_or(DocModelError::NodeNotFound(id))
    }

    /// Whether the node is still stored (removed nodes are dropped)
    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Whether the node is stored and reachable from the body
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.body || self.ancestors(id).last() == Some(&self.body)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(NodeData::node_type)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(NodeData::is_text)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| !n.is_text())
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(NodeData::tag)
    }

    /// Whether the node is an element with the given tag
    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(|t| VOID_TAGS.contains(&t))
    }

    pub fn styles(&self, id: NodeId) -> Option<&StyleMap> {
        self.get(id).and_then(NodeData::as_element).map(|el| &el.styles)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(NodeData::as_text)
    }

    /// Length of a text node in chars, 0 for anything else
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map(|t| t.chars().count()).unwrap_or(0)
    }

    /// DOM-style node length: chars for text, child count for elements
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(n) if n.is_text() => self.text_len(id),
            Some(n) => n.children().len(),
            None => 0,
        }
    }

    /// Empty text, or an element with no children that is not void
    pub fn is_empty_node(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(n) => match &n.kind {
                NodeKind::Text(t) => t.is_empty(),
                NodeKind::Element(el) => {
                    n.children().is_empty() && !VOID_TAGS.contains(&el.tag.as_str())
                }
            },
            None => false,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(NodeData::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(NodeData::parent)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            result.push(node);
            current = self.parent(node);
        }
        result
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.exists(ancestor) || !self.exists(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Nearest ancestor-or-self satisfying `pred`, never climbing past `stop`
    /// (`stop` itself is not tested).
    pub fn closest_until<F>(&self, id: NodeId, stop: Option<NodeId>, pred: F) -> Option<NodeId>
    where
        F: Fn(&NodeData) -> bool,
    {
        let mut current = Some(id);
        while let Some(n) = current {
            if Some(n) == stop {
                return None;
            }
            let data = self.get(n)?;
            if pred(data) {
                return Some(n);
            }
            current = data.parent();
        }
        None
    }

    /// Nearest ancestor-or-self satisfying `pred`
    pub fn closest<F>(&self, id: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&NodeData) -> bool,
    {
        self.closest_until(id, None, pred)
    }

    /// Nearest ancestor-or-self element with the given tag
    pub fn closest_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.closest(id, |n| n.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// Nearest ancestor-or-self element whose styles include all of `styles`
    pub fn closest_by_style(&self, id: NodeId, styles: &StyleMap) -> Option<NodeId> {
        self.closest(id, |n| {
            n.as_element()
                .is_some_and(|el| !styles.is_empty() && el.styles.contains_all(styles))
        })
    }

    /// Deepest node containing both `a` and `b`
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut chain_a = vec![a];
        chain_a.extend(self.ancestors(a));
        let mut current = Some(b);
        while let Some(n) = current {
            if chain_a.contains(&n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Direct children of the body, in order
    pub fn lines(&self) -> &[NodeId] {
        self.children(self.body)
    }

    /// The ancestor-or-self of `id` that is a direct child of the body
    pub fn line_root(&self, id: NodeId) -> Option<NodeId> {
        let body = self.body;
        self.closest(id, |n| n.parent() == Some(body))
    }

    /// Index of the line containing `id` among the body's children
    pub fn line_index(&self, id: NodeId) -> Option<usize> {
        let root = self.line_root(id)?;
        self.lines().iter().position(|&l| l == root)
    }

    pub fn first_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&first) = self.children(current).first() {
            current = first;
        }
        current
    }

    pub fn last_leaf(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(&last) = self.children(current).last() {
            current = last;
        }
        current
    }

    /// Descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            result.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        result
    }

    /// Next leaf after `id` in document order, staying inside `root`
    pub fn next_leaf_within(&self, id: NodeId, root: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if current == root {
                return None;
            }
            if let Some(next) = self.next_sibling(current) {
                return Some(self.first_leaf(next));
            }
            current = self.parent(current)?;
        }
    }

    /// Previous leaf before `id` in document order, staying inside `root`
    pub fn previous_leaf_within(&self, id: NodeId, root: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if current == root {
                return None;
            }
            if let Some(prev) = self.previous_sibling(current) {
                return Some(self.last_leaf(prev));
            }
            current = self.parent(current)?;
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert_detached(NodeKind::Element(Element::new(tag)))
    }

    /// Create a detached element carrying `styles`
    pub fn create_element_with_styles(&mut self, tag: &str, styles: StyleMap) -> NodeId {
        self.insert_detached(NodeKind::Element(Element::with_styles(tag, styles)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.insert_detached(NodeKind::Text(text.into()))
    }

    fn insert_detached(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData::new(kind);
        let id = data.id();
        self.nodes.insert(id, data);
        id
    }

    /// Copy a node without its children
    pub fn clone_shallow(&mut self, id: NodeId) -> Result<NodeId> {
        let kind = self.node(id)?.kind.clone();
        Ok(self.insert_detached(kind))
    }

    /// Copy a node and its whole subtree
    pub fn clone_deep(&mut self, id: NodeId) -> Result<NodeId> {
        let copy = self.clone_shallow(id)?;
        let children = self.children(id).to_vec();
        for child in children {
            let child_copy = self.clone_deep(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Append a new element under `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        let id = self.create_element(tag);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append a new text node under `parent`
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId> {
        let id = self.create_text(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Move `child` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let len = self.children(parent).len();
        let len = if self.parent(child) == Some(parent) { len - 1 } else { len };
        self.insert_child(parent, len, child)
    }

    /// Move `child` to position `index` of `parent`'s children.
    ///
    /// The index is interpreted after `child` has been detached from its
    /// current location.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if parent == child || self.contains(child, parent) {
            return Err(DocModelError::TreeStructureError(format!(
                "cannot insert {} into its own subtree",
                child
            )));
        }
        if self.node(parent)?.is_text() {
            return Err(DocModelError::InvalidOperation(format!(
                "text node {} cannot have children",
                parent
            )));
        }
        self.node(child)?;
        self.detach(child)?;

        let parent_data = self.node_mut(parent)?;
        if index > parent_data.children().len() {
            return Err(DocModelError::InvalidPosition {
                node_id: parent,
                offset: index,
            });
        }
        parent_data.children_mut().insert(index, child);
        self.node_mut(child)?.set_parent(Some(parent));
        self.touch();
        Ok(())
    }

    /// Move `node` directly before `reference`
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<()> {
        if reference == node {
            return Ok(());
        }
        self.detach(node)?;
        let parent = self.parent(reference).ok_or_else(|| {
            DocModelError::InvalidOperation(format!("{} has no parent", reference))
        })?;
        let index = self.index_in_parent(reference).unwrap_or(0);
        self.insert_child(parent, index, node)
    }

    /// Move `node` directly after `reference`
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<()> {
        if reference == node {
            return Ok(());
        }
        self.detach(node)?;
        let parent = self.parent(reference).ok_or_else(|| {
            DocModelError::InvalidOperation(format!("{} has no parent", reference))
        })?;
        let index = self.index_in_parent(reference).map(|i| i + 1).unwrap_or(0);
        self.insert_child(parent, index, node)
    }

    /// Unlink a node from its parent; the subtree stays in storage
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent() else {
            return Ok(());
        };
        if let Ok(parent_data) = self.node_mut(parent) {
            parent_data.children_mut().retain(|&c| c != id);
        }
        self.node_mut(id)?.set_parent(None);
        self.touch();
        Ok(())
    }

    /// Unlink a node and drop it together with its subtree
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.body {
            return Err(DocModelError::InvalidOperation(
                "the body cannot be removed".into(),
            ));
        }
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(data) = self.nodes.remove(&n) {
                stack.extend(data.children().iter().copied());
            }
        }
        self.touch();
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(t) => *t = text.into(),
            NodeKind::Element(_) => {
                return Err(DocModelError::InvalidOperation(format!(
                    "{} is not a text node",
                    id
                )))
            }
        }
        self.touch();
        Ok(())
    }

    /// Split a text node at a char offset.
    ///
    /// The original node keeps the text before `offset`; a new sibling holding
    /// the rest is inserted right after it and returned. Returns `None` when
    /// either piece would be empty.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<Option<NodeId>> {
        let text = self
            .text(id)
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{} is not a text node", id)))?
            .to_string();
        let len = text.chars().count();
        if offset > len {
            return Err(DocModelError::InvalidPosition { node_id: id, offset });
        }
        if offset == 0 || offset == len {
            return Ok(None);
        }
        let byte_offset = text
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (head, tail) = text.split_at(byte_offset);
        let tail_id = self.create_text(tail);
        self.set_text(id, head)?;
        if self.parent(id).is_some() {
            self.insert_after(id, tail_id)?;
        }
        Ok(Some(tail_id))
    }

    /// Change an element's tag in place, keeping id, children and styles
    pub fn rename(&mut self, id: NodeId, tag: &str) -> Result<()> {
        let el = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{} is not an element", id)))?;
        el.tag = tag.to_ascii_lowercase();
        self.touch();
        Ok(())
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{} is not an element", id)))
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> Result<()> {
        self.element_mut(id)?.styles.set(property, value);
        self.touch();
        Ok(())
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) -> Result<Option<String>> {
        let removed = self.element_mut(id)?.styles.remove(property);
        self.touch();
        Ok(removed)
    }

    /// Merge `styles` into an element's own styles
    pub fn merge_styles(&mut self, id: NodeId, styles: &StyleMap) -> Result<()> {
        self.element_mut(id)?.styles.merge(styles);
        self.touch();
        Ok(())
    }

    /// Remove every property named in `styles`; true if anything was removed
    pub fn remove_style_properties(&mut self, id: NodeId, styles: &StyleMap) -> Result<bool> {
        let changed = self.element_mut(id)?.styles.remove_properties_of(styles);
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    // =========================================================================
    // Read-only rendering
    // =========================================================================

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(id) {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let Some(t) = self.text(n) {
                out.push_str(t);
            }
        }
        out
    }

    /// Text of a subtree without zero-width marker filler
    pub fn visible_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .chars()
            .filter(|&c| c != ZERO_WIDTH_SPACE)
            .collect()
    }

    /// HTML-like rendering of a node and its subtree, for logs and tests
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Rendering of the body's children only
    pub fn body_html(&self) -> String {
        let mut out = String::new();
        for &line in self.lines() {
            self.write_html(line, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(data) = self.get(id) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                if !el.styles.is_empty() {
                    out.push_str(" style=\"");
                    out.push_str(&el.styles.to_css());
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) && data.children().is_empty() {
                    return;
                }
                for &child in data.children() {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_line(text: &str) -> (DocumentTree, NodeId, NodeId) {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let t = tree.append_text(p, text).unwrap();
        (tree, p, t)
    }

    #[test]
    fn test_split_text_middle() {
        let (mut tree, p, t) = tree_with_line("hello world");
        let tail = tree.split_text(t, 5).unwrap().unwrap();
        assert_eq!(tree.text(t), Some("hello"));
        assert_eq!(tree.text(tail), Some(" world"));
        assert_eq!(tree.children(p), &[t, tail]);
    }

    #[test]
    fn test_split_text_refuses_empty_piece() {
        let (mut tree, p, t) = tree_with_line("abc");
        assert_eq!(tree.split_text(t, 0).unwrap(), None);
        assert_eq!(tree.split_text(t, 3).unwrap(), None);
        assert!(tree.split_text(t, 4).is_err());
        assert_eq!(tree.children(p).len(), 1);
    }

    #[test]
    fn test_split_text_multibyte() {
        let (mut tree, _, t) = tree_with_line("héllo");
        let tail = tree.split_text(t, 2).unwrap().unwrap();
        assert_eq!(tree.text(t), Some("hé"));
        assert_eq!(tree.text(tail), Some("llo"));
    }

    #[test]
    fn test_insert_before_and_after() {
        let (mut tree, p, t) = tree_with_line("b");
        let a = tree.create_text("a");
        let c = tree.create_text("c");
        tree.insert_before(t, a).unwrap();
        tree.insert_after(t, c).unwrap();
        assert_eq!(tree.text_content(p), "abc");
        assert_eq!(tree.parent(a), Some(p));
    }

    #[test]
    fn test_insert_into_own_subtree_fails() {
        let (mut tree, p, _) = tree_with_line("x");
        let b = tree.append_element(p, "b").unwrap();
        assert!(tree.append_child(b, p).is_err());
    }

    #[test]
    fn test_append_child_moves_node() {
        let (mut tree, p, t) = tree_with_line("x");
        let b = tree.append_element(p, "b").unwrap();
        tree.append_child(b, t).unwrap();
        assert_eq!(tree.children(p), &[b]);
        assert_eq!(tree.parent(t), Some(b));
        assert_eq!(tree.body_html(), "<p><b>x</b></p>");
    }

    #[test]
    fn test_remove_drops_subtree() {
        let (mut tree, p, t) = tree_with_line("x");
        let before = tree.node_count();
        tree.remove(p).unwrap();
        assert!(!tree.exists(p));
        assert!(!tree.exists(t));
        assert_eq!(tree.node_count(), before - 2);
        assert!(tree.lines().is_empty());
    }

    #[test]
    fn test_line_root_and_index() {
        let mut tree = DocumentTree::new();
        let p1 = tree.append_element(tree.body(), "p").unwrap();
        let p2 = tree.append_element(tree.body(), "p").unwrap();
        let b = tree.append_element(p2, "b").unwrap();
        let t = tree.append_text(b, "x").unwrap();
        tree.append_text(p1, "y").unwrap();
        assert_eq!(tree.line_root(t), Some(p2));
        assert_eq!(tree.line_index(t), Some(1));
        assert_eq!(tree.line_root(tree.body()), None);
    }

    #[test]
    fn test_closest_until_stops() {
        let (mut tree, p, t) = tree_with_line("x");
        let b = tree.create_element("b");
        tree.insert_before(t, b).unwrap();
        tree.append_child(b, t).unwrap();
        assert_eq!(tree.closest_tag(t, "b"), Some(b));
        assert_eq!(tree.closest_until(t, Some(b), |n| n.tag() == Some("b")), None);
        assert_eq!(tree.closest_tag(t, "p"), Some(p));
    }

    #[test]
    fn test_leaf_navigation() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p, "a").unwrap();
        let b = tree.append_element(p, "b").unwrap();
        let bt = tree.append_text(b, "b").unwrap();
        let c = tree.append_text(p, "c").unwrap();
        assert_eq!(tree.next_leaf_within(a, p), Some(bt));
        assert_eq!(tree.next_leaf_within(bt, p), Some(c));
        assert_eq!(tree.next_leaf_within(c, p), None);
        assert_eq!(tree.previous_leaf_within(c, p), Some(bt));
        assert_eq!(tree.previous_leaf_within(a, p), None);
    }

    #[test]
    fn test_common_ancestor() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p, "a").unwrap();
        let b = tree.append_element(p, "b").unwrap();
        let bt = tree.append_text(b, "b").unwrap();
        assert_eq!(tree.common_ancestor(a, bt), Some(p));
        assert_eq!(tree.common_ancestor(bt, bt), Some(bt));
    }

    #[test]
    fn test_clone_deep_is_detached() {
        let (mut tree, p, _) = tree_with_line("x");
        let copy = tree.clone_deep(p).unwrap();
        assert_eq!(tree.parent(copy), None);
        assert_eq!(tree.to_html(copy), "<p>x</p>");
        assert_ne!(tree.children(copy), tree.children(p));
    }

    #[test]
    fn test_styles_render() {
        let (mut tree, p, _) = tree_with_line("x");
        tree.set_style(p, "text-align", "center").unwrap();
        tree.set_style(p, "color", "red").unwrap();
        assert_eq!(
            tree.body_html(),
            "<p style=\"color: red; text-align: center\">x</p>"
        );
        tree.remove_style(p, "color").unwrap();
        assert_eq!(tree.styles(p).unwrap().len(), 1);
    }

    #[test]
    fn test_visible_text_skips_filler() {
        let (mut tree, p, _) = tree_with_line("ab");
        tree.append_text(p, ZERO_WIDTH_SPACE.to_string()).unwrap();
        assert_eq!(tree.text_content(p).chars().count(), 3);
        assert_eq!(tree.visible_text(p), "ab");
    }

    #[test]
    fn test_version_bumps() {
        let (mut tree, _, t) = tree_with_line("x");
        let v = tree.version();
        tree.set_text(t, "y").unwrap();
        assert!(tree.version() > v);
    }

    #[test]
    fn test_serde_round_trip() {
        let (mut tree, p, _) = tree_with_line("abc");
        tree.set_style(p, "text-align", "center").unwrap();
        let b = tree.append_element(p, "b").unwrap();
        tree.append_text(b, "def").unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let restored: DocumentTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.body(), tree.body());
        assert_eq!(restored.body_html(), tree.body_html());
        assert_eq!(restored.parent(b), Some(p));
    }

    proptest::proptest! {
        #[test]
        fn prop_split_text_keeps_content(text in "\\PC{0,12}", at in 0usize..14) {
            let (mut tree, p, t) = tree_with_line(&text);
            let len = text.chars().count();
            match tree.split_text(t, at) {
                Ok(Some(tail)) => {
                    proptest::prop_assert!(at > 0 && at < len);
                    proptest::prop_assert_eq!(tree.text_len(t), at);
                    proptest::prop_assert_eq!(tree.next_sibling(t), Some(tail));
                }
                Ok(None) => proptest::prop_assert!(at == 0 || at == len),
                Err(_) => proptest::prop_assert!(at > len),
            }
            proptest::prop_assert_eq!(tree.text_content(p), text);
        }
    }
}
