//! Inline processor - character formats such as bold or subscript
//!
//! Unlike block and style formats, inline formats cut text at the selection
//! edges and arm a caret marker when nothing is selected.

use crate::processor::{trim_end, trim_start};
use crate::surgery::nodes_before;
use crate::{
    CaretData, ExceptionList, FormatContext, FormatDescriptor, FormatProcessor, FormatToggler,
    InlineFormat, MarkerManager, Result, ToggleOptions,
};
use doc_model::{BoundaryPoint, DocumentTree, NodeId, SelectionRange};

pub struct InlineProcessor {
    descriptor: FormatDescriptor,
}

impl InlineProcessor {
    pub fn new(format: InlineFormat) -> Self {
        Self {
            descriptor: FormatDescriptor::Inline(format),
        }
    }

    /// Whether `node` sits inside this format within its line
    fn is_formatted(&self, tree: &DocumentTree, node: NodeId, value: Option<&str>) -> bool {
        let stop = tree.line_root(node);
        tree.closest_until(node, stop, |n| self.descriptor.matches(n, value)).is_some()
    }
}

impl FormatProcessor for InlineProcessor {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn inline_mode(&self) -> bool {
        true
    }

    fn toggle_caret(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        let markers = MarkerManager::new(cx.config);
        let point = caret.start.boundary();

        let marker = match markers.enclosing(cx.tree, point.node) {
            // Only armed formatting inside: carry its wrappers over
            Some(old) if markers.is_empty_marker(cx.tree, old) => {
                let armed = markers.armed_formats(cx.tree, old);
                markers.replace(cx.tree, old, &armed)?
            }
            // Typed content: the new marker goes where the caret is and the
            // old one is merged back around it
            Some(old) => {
                let marker = markers.insert(cx.tree, point, &[])?;
                markers.flush_keeping(cx.tree, old, Some(marker.element))?;
                marker
            }
            None => markers.insert(cx.tree, point, &[])?,
        };

        FormatToggler::new(cx.config).toggle(cx.tree, wrap, &self.descriptor, marker.filler, value)?;
        Ok(SelectionRange::collapsed(marker.caret()))
    }

    fn toggle_same_node(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        let node = caret.start.node;
        let toggler = FormatToggler::new(cx.config);
        if !cx.tree.is_text(node) {
            toggler.toggle(cx.tree, wrap, &self.descriptor, node, value)?;
            return Ok(caret.range.range());
        }
        if self.is_formatted(cx.tree, node, value) == wrap {
            return Ok(caret.range.range());
        }

        let (from, to) = (caret.start.offset, caret.end.offset);
        cx.tree.split_text(node, to)?;
        let middle = cx.tree.split_text(node, from)?.unwrap_or(node);
        toggler.toggle(cx.tree, wrap, &self.descriptor, middle, value)?;
        let len = cx.tree.text_len(middle);
        Ok(SelectionRange::between(middle, 0, middle, len))
    }

    fn toggle_same_line(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        let line = caret.start.line_root();
        // The start goes first: a split keeps the head in place, so an end
        // that falls back to the previous leaf lands on the new tail.
        let start = trim_start(cx.tree, caret.start.boundary(), line)?;
        let end = trim_end(cx.tree, caret.end.boundary(), line)?;
        let (Some(start), Some(end)) = (start, end) else {
            return Ok(caret.range.range());
        };
        if follows(cx.tree, line, start, end) {
            return Ok(caret.range.range());
        }

        let mut except: ExceptionList = nodes_before(cx.tree, line, start).into_iter().collect();
        except.extend(MarkerManager::new(cx.config).find_all(cx.tree, line));
        let options = ToggleOptions::new(true)
            .except(&except)
            .until(Some(end))
            .value(value);
        FormatToggler::new(cx.config).toggle_recursive(cx.tree, wrap, &self.descriptor, line, &options)?;

        let len = cx.tree.node_length(end);
        Ok(SelectionRange::between(start, 0, end, len))
    }

    fn toggle_multi_line(
        &self,
        cx: &mut FormatContext<'_>,
        caret: &CaretData,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<SelectionRange> {
        let toggler = FormatToggler::new(cx.config);
        let markers = MarkerManager::new(cx.config);
        let start_line = caret.start.line_root();
        let end_line = caret.end.line_root();
        let middle: Vec<NodeId> = cx
            .tree
            .lines()
            .get(caret.start.line + 1..caret.end.line)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default();

        let start = trim_start(cx.tree, caret.start.boundary(), start_line)?;
        let end = trim_end(cx.tree, caret.end.boundary(), end_line)?;

        if let Some(start) = start {
            let mut except: ExceptionList = nodes_before(cx.tree, start_line, start).into_iter().collect();
            except.extend(markers.find_all(cx.tree, start_line));
            let options = ToggleOptions::new(true).except(&except).value(value);
            toggler.toggle_recursive(cx.tree, wrap, &self.descriptor, start_line, &options)?;
        }

        for line in middle {
            let except: ExceptionList = markers.find_all(cx.tree, line).into_iter().collect();
            let options = ToggleOptions::new(true).except(&except).value(value);
            toggler.toggle_root(cx.tree, wrap, &self.descriptor, line, &options)?;
        }

        if let Some(end) = end {
            let except: ExceptionList = markers.find_all(cx.tree, end_line).into_iter().collect();
            let options = ToggleOptions::new(true)
                .except(&except)
                .until(Some(end))
                .value(value);
            toggler.toggle_recursive(cx.tree, wrap, &self.descriptor, end_line, &options)?;
        }

        let mut range = caret.range.range();
        if let Some(start) = start {
            range.start = BoundaryPoint::new(start, 0);
        }
        if let Some(end) = end {
            range.end = BoundaryPoint::new(end, cx.tree.node_length(end));
        }
        Ok(range)
    }
}

/// Whether `start` comes after `end` inside `root`, meaning the trimmed
/// range holds nothing
fn follows(tree: &DocumentTree, root: NodeId, start: NodeId, end: NodeId) -> bool {
    if start == end {
        return false;
    }
    let order = tree.descendants(root);
    let position = |node: NodeId| order.iter().position(|&n| n == node);
    matches!((position(start), position(end)), (Some(s), Some(e)) if s > e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatConfig, FormatRegistry};
    use doc_model::{HostSelection, TableSelection};

    struct Fixture {
        tree: DocumentTree,
        selection: HostSelection,
        table: TableSelection,
        config: FormatConfig,
        registry: FormatRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tree: DocumentTree::new(),
                selection: HostSelection::new(),
                table: TableSelection::new(),
                config: FormatConfig::default(),
                registry: FormatRegistry::with_defaults(),
            }
        }

        fn toggle(&mut self, name: &str, wrap: bool) {
            let FormatDescriptor::Inline(format) = self.registry.resolve(name).unwrap().clone() else {
                panic!("{} is not inline", name);
            };
            let mut cx = FormatContext {
                tree: &mut self.tree,
                selection: &mut self.selection,
                table: &self.table,
                config: &self.config,
            };
            InlineProcessor::new(format)
                .toggle_from_caret(&mut cx, wrap, None)
                .unwrap();
        }

        fn range(&self) -> SelectionRange {
            *self.selection.primary().unwrap()
        }
    }

    #[test]
    fn test_same_node_wraps_middle() {
        let mut f = Fixture::new();
        let p = f.tree.append_element(f.tree.body(), "p").unwrap();
        let t = f.tree.append_text(p, "hello world").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(t, 2, t, 7));
        f.toggle("bold", true);
        assert_eq!(f.tree.to_html(p), "<p>he<b>llo w</b>orld</p>");
        let range = f.range();
        assert_eq!(f.tree.text(range.start.node), Some("llo w"));
        assert_eq!((range.start.offset, range.end.offset), (0, 5));
    }

    #[test]
    fn test_same_line_across_nodes() {
        let mut f = Fixture::new();
        let p = f.tree.append_element(f.tree.body(), "p").unwrap();
        let a = f.tree.append_text(p, "abc").unwrap();
        let i = f.tree.append_element(p, "i").unwrap();
        let d = f.tree.append_text(i, "def").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(a, 1, d, 2));
        f.toggle("bold", true);
        assert_eq!(f.tree.to_html(p), "<p>a<b>bc</b><i><b>de</b>f</i></p>");
        let range = f.range();
        assert_eq!(f.tree.text(range.start.node), Some("bc"));
        assert_eq!(range.end.node, d);
        assert_eq!(range.end.offset, 2);
    }

    #[test]
    fn test_same_line_end_at_start_of_next_leaf() {
        let mut f = Fixture::new();
        let p = f.tree.append_element(f.tree.body(), "p").unwrap();
        f.tree.append_text(p, "a").unwrap();
        let mid = f.tree.append_text(p, "aa").unwrap();
        let last = f.tree.append_text(p, "a").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(mid, 1, last, 0));
        f.toggle("bold", true);
        assert_eq!(f.tree.to_html(p), "<p>aa<b>a</b>a</p>");
        let range = f.range();
        assert_eq!(range.start.node, range.end.node);
        assert_eq!((range.start.offset, range.end.offset), (0, 1));

        f.toggle("bold", true);
        assert_eq!(f.tree.to_html(p), "<p>aa<b>a</b>a</p>");
    }

    #[test]
    fn test_same_line_start_at_end_of_leaf() {
        let mut f = Fixture::new();
        let p = f.tree.append_element(f.tree.body(), "p").unwrap();
        let a = f.tree.append_text(p, "ab").unwrap();
        let i = f.tree.append_element(p, "i").unwrap();
        let c = f.tree.append_text(i, "cd").unwrap();
        let e = f.tree.append_text(p, "ef").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(a, 2, e, 1));
        f.toggle("bold", true);
        assert_eq!(f.tree.to_html(p), "<p>ab<i><b>cd</b></i><b>e</b>f</p>");
        let range = f.range();
        assert_eq!(range.start, BoundaryPoint::new(c, 0));
        assert_eq!(range.end, BoundaryPoint::new(e, 1));

        f.toggle("bold", true);
        assert_eq!(f.tree.to_html(p), "<p>ab<i><b>cd</b></i><b>e</b>f</p>");
    }

    #[test]
    fn test_multi_line_end_at_line_start() {
        let mut f = Fixture::new();
        let p1 = f.tree.append_element(f.tree.body(), "p").unwrap();
        let a = f.tree.append_text(p1, "abc").unwrap();
        let p2 = f.tree.append_element(f.tree.body(), "p").unwrap();
        let d = f.tree.append_text(p2, "def").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(a, 1, d, 0));
        f.toggle("bold", true);
        assert_eq!(f.tree.body_html(), "<p>a<b>bc</b></p><p>def</p>");
        assert_eq!(f.range().end, BoundaryPoint::new(d, 0));

        f.toggle("bold", true);
        assert_eq!(f.tree.body_html(), "<p>a<b>bc</b></p><p>def</p>");
    }

    #[test]
    fn test_multi_line_start_at_line_end() {
        let mut f = Fixture::new();
        let p1 = f.tree.append_element(f.tree.body(), "p").unwrap();
        let a = f.tree.append_text(p1, "abc").unwrap();
        let p2 = f.tree.append_element(f.tree.body(), "p").unwrap();
        let d = f.tree.append_text(p2, "def").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(a, 3, d, 2));
        f.toggle("bold", true);
        assert_eq!(f.tree.body_html(), "<p>abc</p><p><b>de</b>f</p>");
        assert_eq!(f.range().start, BoundaryPoint::new(a, 3));

        f.toggle("bold", true);
        assert_eq!(f.tree.body_html(), "<p>abc</p><p><b>de</b>f</p>");
    }

    #[test]
    fn test_caret_marker_arms_bold() {
        let mut f = Fixture::new();
        let p = f.tree.append_element(f.tree.body(), "p").unwrap();
        let t = f.tree.append_text(p, "hello world").unwrap();
        f.selection = HostSelection::single(SelectionRange::collapsed(BoundaryPoint::new(t, 5)));
        f.toggle("bold", true);
        assert_eq!(f.tree.visible_text(p), "hello world");
        let caret = f.range();
        assert!(caret.is_collapsed());
        assert_eq!(f.tree.tag(f.tree.parent(caret.start.node).unwrap()), Some("b"));

        // arming a second format keeps the first
        f.toggle("italic", true);
        let caret = f.range();
        let tags: Vec<&str> = f
            .tree
            .ancestors(caret.start.node)
            .into_iter()
            .filter_map(|n| f.tree.tag(n))
            .collect();
        assert!(tags.contains(&"b"));
        assert!(tags.contains(&"i"));
        let markers = MarkerManager::new(&f.config);
        assert_eq!(markers.find_all(&f.tree, p).len(), 1);
    }

    #[test]
    fn test_multi_line_inline() {
        let mut f = Fixture::new();
        let p1 = f.tree.append_element(f.tree.body(), "p").unwrap();
        let a = f.tree.append_text(p1, "abc").unwrap();
        let p2 = f.tree.append_element(f.tree.body(), "p").unwrap();
        f.tree.append_text(p2, "mid").unwrap();
        let p3 = f.tree.append_element(f.tree.body(), "p").unwrap();
        let d = f.tree.append_text(p3, "def").unwrap();
        f.selection = HostSelection::single(SelectionRange::between(a, 1, d, 2));
        f.toggle("underline", true);
        assert_eq!(f.tree.body_html(), "<p>a<u>bc</u></p><p><u>mid</u></p><p><u>de</u>f</p>");
        f.toggle("underline", false);
        assert_eq!(f.tree.visible_text(f.tree.body()), "abcmiddef");
        assert!(!f.tree.body_html().contains("<u>"));
    }
}
