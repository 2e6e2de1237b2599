//! Processor dispatch shared by the inline, block and style families
//!
//! Every family runs the same selection-shape state machine. Cases are
//! checked in priority order: a table-cell selection wins over everything,
//! then a collapsed caret, a range inside one text node, a range inside one
//! line and finally a range spanning several lines. Block and style formats
//! act on whole lines, so the defaults here never split text; the inline
//! processor overrides the caret and range cases with splitting versions.

use crate::surgery::nodes_before;
use crate::{
    BlockProcessor, CaretData, ExceptionList, FormatConfig, FormatDescriptor, FormatToggler,
    InlineProcessor, MarkerManager, Result, SelectionSnapshot, StyleProcessor, ToggleOptions,
};
use doc_model::{BoundaryPoint, DocumentTree, HostSelection, NodeId, SelectionRange, TableSelection};

/// Collaborators a processor works against during one toggle
pub struct FormatContext<'a> {
    pub tree: &'a mut DocumentTree,
    pub selection: &'a mut HostSelection,
    /// Owned by table UI code; only read here
    pub table: &'a TableSelection,
    pub config: &'a FormatConfig,
}

/// Shape of a captured range, in dispatch priority order. A table-cell
/// selection is checked before any range is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionShape {
    Caret,
    SameNode,
    SameLine,
    MultiLine,
}

impl SelectionShape {
    pub fn of(caret: &CaretData) -> Self {
        if !caret.is_range() {
            SelectionShape::Caret
        } else if caret.same_node() {
            SelectionShape::SameNode
        } else if caret.same_line() {
            SelectionShape::SameLine
        } else {
            SelectionShape::MultiLine
        }
    }
}

/// A format family's implementation of the five selection cases.
///
/// Each case returns the range the host selection should hold afterwards.
pub trait FormatProcessor {
    fn descriptor(&self) -> &FormatDescriptor;

    /// Whether recursive toggles run in inline mode
    fn inline_mode(&self) -> bool {
        false
    }

    /// Command-level entry point
    fn toggle_from_caret(&self, cx: &mut FormatContext<'_>, wrap: bool, value: Option<&str>) -> Result<()> {
        dispatch(self, cx, wrap, value)
    }

    /// Toggle every selected table cell as an independent root
    fn toggle_cells(&self, cx: &mut FormatContext<'_>, wrap: bool, value: Option<&str>) -> Result<()> {
        let toggler = FormatToggler::new(cx.config);
        let options = ToggleOptions::new(self.inline_mode()).value(value);
        for cell in cx.table.iter() {
            if !cx.tree.is_attached(cell) {
                continue;
            }
            if !cx.tree.tag(cell).is_some_and(|t| cx.config.is_cell_tag(t)) {
                tracing::debug!(node = %cell, "skipping non-cell in table selection");
                continue;
            }
            toggler.toggle_root(cx.tree, wrap, self.descriptor(), cell, &options)?;
            prune(cx.tree, cx.config, cell, &[])?;
        }
        Ok(())
    }

    fn toggle_caret(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        toggle_at(cx, self.descriptor(), caret.start.node, wrap, value)?;
        Ok(restore(cx.tree, caret))
    }

    fn toggle_same_node(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        toggle_at(cx, self.descriptor(), caret.start.node, wrap, value)?;
        Ok(restore(cx.tree, caret))
    }

    fn toggle_same_line(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        toggle_lines(cx, self.descriptor(), caret, wrap, value)?;
        Ok(restore(cx.tree, caret))
    }

    fn toggle_multi_line(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        toggle_lines(cx, self.descriptor(), caret, wrap, value)?;
        Ok(restore(cx.tree, caret))
    }
}

/// Build the processor for a descriptor's family
pub fn processor_for(descriptor: &FormatDescriptor) -> Box<dyn FormatProcessor> {
    match descriptor {
        FormatDescriptor::Inline(f) => Box::new(InlineProcessor::new(f.clone())),
        FormatDescriptor::Block(f) => Box::new(BlockProcessor::new(f.clone())),
        FormatDescriptor::Style(f) => Box::new(StyleProcessor::new(f.clone())),
    }
}

/// The five-case state machine
pub fn dispatch<P>(processor: &P, cx: &mut FormatContext<'_>, wrap: bool, value: Option<&str>) -> Result<()>
where
    P: FormatProcessor + ?Sized,
{
    if !cx.table.is_empty() {
        tracing::debug!(cells = cx.table.len(), wrap, "toggling table cell selection");
        return processor.toggle_cells(cx, wrap, value);
    }
    if cx.selection.is_empty() {
        return Ok(());
    }

    let endpoints: Vec<NodeId> = cx
        .selection
        .ranges()
        .iter()
        .flat_map(|r| [r.start.node, r.end.node])
        .collect();
    let body = cx.tree.body();
    MarkerManager::new(cx.config).flush_stale(cx.tree, body, &endpoints)?;

    // Ranges are re-read one at a time so each sees the tree left by the
    // previous one.
    for index in 0..cx.selection.ranges().len() {
        let Some(range) = cx.selection.ranges().get(index).copied() else {
            break;
        };
        let range = SelectionRange::new(
            rebase_point(cx.tree, cx.config, range.start),
            rebase_point(cx.tree, cx.config, range.end),
        );
        let Some(caret) = SelectionSnapshot::primary(cx.tree, &HostSelection::single(range)) else {
            continue;
        };
        let shape = SelectionShape::of(&caret);
        tracing::debug!(?shape, wrap, line = caret.start.line, "toggling selection");

        let new_range = match shape {
            SelectionShape::Caret => processor.toggle_caret(cx, &caret, wrap, value)?,
            SelectionShape::SameNode => processor.toggle_same_node(cx, &caret, wrap, value)?,
            SelectionShape::SameLine => processor.toggle_same_line(cx, &caret, wrap, value)?,
            SelectionShape::MultiLine => processor.toggle_multi_line(cx, &caret, wrap, value)?,
        };

        let prune_root = if caret.same_line() && cx.tree.is_attached(caret.start.line_root()) {
            caret.start.line_root()
        } else {
            body
        };
        prune(cx.tree, cx.config, prune_root, &[new_range.start.node, new_range.end.node])?;

        let mut ranges = cx.selection.ranges().to_vec();
        if let Some(slot) = ranges.get_mut(index) {
            *slot = new_range;
        }
        SelectionSnapshot::update_ranges(cx.selection, ranges);
    }
    Ok(())
}

/// Map a text point through splits made by an earlier range.
///
/// A split keeps the head in the original node and puts the tail in the
/// next leaf, so an offset past the node's length carries on into the
/// following text leaves of the line. Marker fillers are skipped.
pub(crate) fn rebase_point(tree: &DocumentTree, config: &FormatConfig, point: BoundaryPoint) -> BoundaryPoint {
    let BoundaryPoint { mut node, mut offset } = point;
    if !tree.is_text(node) {
        return point;
    }
    let Some(root) = tree.line_root(node) else {
        return point;
    };
    let markers = MarkerManager::new(config);

    while offset > tree.text_len(node) {
        let len = tree.text_len(node);
        let mut next = tree.next_leaf_within(node, root);
        while let Some(leaf) = next.filter(|&n| markers.enclosing(tree, n).is_some()) {
            next = tree.next_leaf_within(leaf, root);
        }
        match next {
            Some(leaf) if tree.is_text(leaf) => {
                offset -= len;
                node = leaf;
            }
            _ => return BoundaryPoint::new(node, len),
        }
    }
    BoundaryPoint::new(node, offset)
}

/// Toggle the block or container around a single point
fn toggle_at(
    cx: &mut FormatContext<'_>,
    descriptor: &FormatDescriptor,
    node: NodeId,
    wrap: bool,
    value: Option<&str>,
) -> Result<()> {
    let toggler = FormatToggler::new(cx.config);
    let is_container = cx.tree.tag(node).is_some_and(|t| cx.config.is_container_tag(t));
    if is_container {
        let options = ToggleOptions::new(false).value(value);
        toggler.toggle_root(cx.tree, wrap, descriptor, node, &options)
    } else {
        toggler.toggle(cx.tree, wrap, descriptor, node, value)
    }
}

/// Toggle every line from the caret's start line to its end line.
///
/// Leaves before the start on the first line are skipped and the walk stops
/// at the end node on the last line. Lines in between are toggled whole.
fn toggle_lines(
    cx: &mut FormatContext<'_>,
    descriptor: &FormatDescriptor,
    caret: &CaretData,
    wrap: bool,
    value: Option<&str>,
) -> Result<()> {
    let toggler = FormatToggler::new(cx.config);
    let markers = MarkerManager::new(cx.config);
    let lines: Vec<NodeId> = cx
        .tree
        .lines()
        .get(caret.start.line..=caret.end.line)
        .map(<[NodeId]>::to_vec)
        .unwrap_or_default();
    let last = lines.len().saturating_sub(1);

    for (i, &line) in lines.iter().enumerate() {
        if !cx.tree.is_attached(line) {
            continue;
        }
        let mut except: ExceptionList = markers.find_all(cx.tree, line).into_iter().collect();
        if i == 0 {
            except.extend(nodes_before(cx.tree, line, caret.start.node));
        }
        let end_node = (i == last).then_some(caret.end.node);
        let options = ToggleOptions::new(false)
            .except(&except)
            .until(end_node)
            .value(value);
        toggler.toggle_root(cx.tree, wrap, descriptor, line, &options)?;
    }
    Ok(())
}

/// The caret's own range, falling back to the start of its line when an
/// endpoint did not survive the toggle
fn restore(tree: &DocumentTree, caret: &CaretData) -> SelectionRange {
    let fallback = |point: &crate::CaretPoint| {
        if tree.is_attached(point.node) {
            point.boundary()
        } else if tree.is_attached(point.line_root()) {
            BoundaryPoint::new(tree.first_leaf(point.line_root()), 0)
        } else {
            BoundaryPoint::start_of(tree.body())
        }
    };
    SelectionRange::new(fallback(&caret.start), fallback(&caret.end))
}

/// Remove empty text nodes and empty elements under `root`.
///
/// Never removes `root`, line roots, table cells, preserved or marker
/// elements, or any node in `keep` together with its ancestors. Returns the number of removed
/// nodes.
pub fn prune(tree: &mut DocumentTree, config: &FormatConfig, root: NodeId, keep: &[NodeId]) -> Result<usize> {
    if !tree.exists(root) {
        return Ok(0);
    }
    let body = tree.body();
    let mut protected = vec![root];
    for &node in keep {
        protected.push(node);
        protected.extend(tree.ancestors(node));
    }

    let mut removed = 0;
    for node in tree.descendants(root).into_iter().rev() {
        if !tree.exists(node) || protected.contains(&node) || tree.parent(node) == Some(body) {
            continue;
        }
        let kept_tag = tree
            .tag(node)
            .is_some_and(|t| config.is_preserved_tag(t) || config.is_cell_tag(t) || config.is_marker_tag(t));
        if !kept_tag && tree.is_empty_node(node) {
            tree.remove(node)?;
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::trace!(root = %root, removed, "pruned empty nodes");
    }
    Ok(removed)
}

/// Split the start boundary so that the selection begins on a node boundary
/// and return the first selected leaf
pub(crate) fn trim_start(tree: &mut DocumentTree, point: BoundaryPoint, root: NodeId) -> Result<Option<NodeId>> {
    let BoundaryPoint { node, offset } = point;
    if tree.is_text(node) {
        let len = tree.text_len(node);
        return Ok(if offset == 0 {
            Some(node)
        } else if offset >= len {
            tree.next_leaf_within(node, root)
        } else {
            tree.split_text(node, offset)?.or(Some(node))
        });
    }
    let children = tree.children(node);
    Ok(match children.get(offset) {
        Some(&child) => Some(tree.first_leaf(child)),
        None if children.is_empty() => Some(node),
        None => tree.next_leaf_within(node, root),
    })
}

/// Split the end boundary and return the last selected leaf
pub(crate) fn trim_end(tree: &mut DocumentTree, point: BoundaryPoint, root: NodeId) -> Result<Option<NodeId>> {
    let BoundaryPoint { node, offset } = point;
    if tree.is_text(node) {
        let len = tree.text_len(node);
        if offset == 0 {
            return Ok(tree.previous_leaf_within(node, root));
        }
        if offset < len {
            tree.split_text(node, offset)?;
        }
        return Ok(Some(node));
    }
    let children = tree.children(node);
    Ok(match offset.checked_sub(1).and_then(|i| children.get(i)) {
        Some(&child) => Some(tree.last_leaf(child)),
        None if children.is_empty() => Some(node),
        None => tree.previous_leaf_within(node, root),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_protected_nodes() {
        let config = FormatConfig::default();
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let b = tree.append_element(p, "b").unwrap();
        let empty = tree.append_text(b, "").unwrap();
        let i = tree.append_element(p, "i").unwrap();
        let kept = tree.append_text(i, "").unwrap();
        let table = tree.append_element(p, "td").unwrap();
        let marker = tree.append_element(p, &config.marker_tag).unwrap();

        let removed = prune(&mut tree, &config, p, &[kept]).unwrap();
        assert_eq!(removed, 2);
        assert!(!tree.exists(b));
        assert!(!tree.exists(empty));
        assert!(tree.exists(i));
        assert!(tree.exists(table));
        assert!(tree.exists(marker));
    }

    #[test]
    fn test_prune_keeps_cells_without_preserved_tags() {
        let config = FormatConfig {
            preserved_tags: Vec::new(),
            ..FormatConfig::default()
        };
        let mut tree = DocumentTree::new();
        let table = tree.append_element(tree.body(), "table").unwrap();
        let row = tree.append_element(table, "tr").unwrap();
        let cell = tree.append_element(row, "td").unwrap();

        assert_eq!(prune(&mut tree, &config, table, &[]).unwrap(), 0);
        assert!(tree.exists(cell));
        assert_eq!(tree.children(row), &[cell]);
    }

    #[test]
    fn test_prune_never_removes_lines() {
        let config = FormatConfig::default();
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let body = tree.body();
        assert_eq!(prune(&mut tree, &config, body, &[]).unwrap(), 0);
        assert!(tree.exists(p));
    }

    #[test]
    fn test_trim_edges_split_text() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p, "abc").unwrap();
        let d = tree.append_text(p, "def").unwrap();
        let end = trim_end(&mut tree, BoundaryPoint::new(d, 1), p).unwrap();
        let start = trim_start(&mut tree, BoundaryPoint::new(a, 2), p).unwrap();
        assert_eq!(end, Some(d));
        assert_eq!(tree.text(d), Some("d"));
        let start = start.unwrap();
        assert_ne!(start, a);
        assert_eq!(tree.text(start), Some("c"));
    }

    #[test]
    fn test_trim_edges_at_node_bounds() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p, "abc").unwrap();
        let d = tree.append_text(p, "def").unwrap();
        assert_eq!(trim_start(&mut tree, BoundaryPoint::new(a, 3), p).unwrap(), Some(d));
        assert_eq!(trim_end(&mut tree, BoundaryPoint::new(d, 0), p).unwrap(), Some(a));
        assert_eq!(tree.children(p).len(), 2);
    }

    #[test]
    fn test_rebase_point_follows_split_tail() {
        let config = FormatConfig::default();
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let t = tree.append_text(p, "abcdef").unwrap();
        let tail = tree.split_text(t, 2).unwrap().unwrap();
        let b = tree.create_element("b");
        tree.insert_before(t, b).unwrap();
        tree.append_child(b, t).unwrap();

        assert_eq!(rebase_point(&tree, &config, BoundaryPoint::new(t, 1)), BoundaryPoint::new(t, 1));
        assert_eq!(rebase_point(&tree, &config, BoundaryPoint::new(t, 4)), BoundaryPoint::new(tail, 2));
        assert_eq!(rebase_point(&tree, &config, BoundaryPoint::new(t, 9)), BoundaryPoint::new(tail, 4));
    }

    #[test]
    fn test_dispatch_two_ranges_in_one_text_node() {
        let config = FormatConfig::default();
        let registry = crate::FormatRegistry::with_defaults();
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let t = tree.append_text(p, "abcdef").unwrap();
        let mut selection = HostSelection::new();
        selection.replace(vec![
            SelectionRange::between(t, 0, t, 2),
            SelectionRange::between(t, 4, t, 6),
        ]);
        let table = TableSelection::new();

        let bold = registry.resolve("bold").unwrap();
        let mut cx = FormatContext {
            tree: &mut tree,
            selection: &mut selection,
            table: &table,
            config: &config,
        };
        processor_for(bold).toggle_from_caret(&mut cx, true, None).unwrap();

        assert_eq!(tree.to_html(p), "<p><b>ab</b>cd<b>ef</b></p>");
        let second = selection.ranges()[1];
        assert_eq!(tree.text(second.start.node), Some("ef"));
        assert_eq!((second.start.offset, second.end.offset), (0, 2));
    }

    #[test]
    fn test_toggle_cells_skips_non_cells() {
        let config = FormatConfig::default();
        let registry = crate::FormatRegistry::with_defaults();
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        tree.append_text(p, "outside").unwrap();
        let table = tree.append_element(tree.body(), "table").unwrap();
        let row = tree.append_element(table, "tr").unwrap();
        let cell = tree.append_element(row, "td").unwrap();
        tree.append_text(cell, "in").unwrap();
        let mut cells = TableSelection::new();
        cells.select(p);
        cells.select(cell);
        let mut selection = HostSelection::new();

        let italic = registry.resolve("italic").unwrap();
        let mut cx = FormatContext {
            tree: &mut tree,
            selection: &mut selection,
            table: &cells,
            config: &config,
        };
        processor_for(italic).toggle_from_caret(&mut cx, true, None).unwrap();

        assert_eq!(tree.to_html(p), "<p>outside</p>");
        assert_eq!(tree.to_html(cell), "<td><i>in</i></td>");
    }

    #[test]
    fn test_shape_priority() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p, "abc").unwrap();
        let p2 = tree.append_element(tree.body(), "p").unwrap();
        let d = tree.append_text(p2, "def").unwrap();
        let shape = |range| {
            let caret = SelectionSnapshot::primary(&tree, &HostSelection::single(range)).unwrap();
            SelectionShape::of(&caret)
        };
        assert_eq!(shape(SelectionRange::between(a, 1, a, 1)), SelectionShape::Caret);
        assert_eq!(shape(SelectionRange::between(a, 0, a, 2)), SelectionShape::SameNode);
        assert_eq!(shape(SelectionRange::between(a, 0, d, 2)), SelectionShape::MultiLine);
    }
}
