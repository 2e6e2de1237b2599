//! Block processor - line formats such as headings and block quotes
//!
//! Block formats act on the element that owns a line, so every selection
//! case reduces to toggling the blocks its lines resolve to. Text is never
//! split and no inline siblings are created.

use crate::{BlockFormat, FormatDescriptor, FormatProcessor};

pub struct BlockProcessor {
    descriptor: FormatDescriptor,
}

impl BlockProcessor {
    pub fn new(format: BlockFormat) -> Self {
        Self {
            descriptor: FormatDescriptor::Block(format),
        }
    }
}

impl FormatProcessor for BlockProcessor {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatConfig, FormatContext, FormatRegistry};
    use doc_model::{BoundaryPoint, DocumentTree, HostSelection, SelectionRange, TableSelection};

    fn run(tree: &mut DocumentTree, selection: &mut HostSelection, name: &str, wrap: bool) {
        let registry = FormatRegistry::with_defaults();
        let FormatDescriptor::Block(format) = registry.resolve(name).unwrap().clone() else {
            panic!("{} is not a block format", name);
        };
        let config = FormatConfig::default();
        let table = TableSelection::new();
        let mut cx = FormatContext {
            tree,
            selection,
            table: &table,
            config: &config,
        };
        BlockProcessor::new(format)
            .toggle_from_caret(&mut cx, wrap, None)
            .unwrap();
    }

    #[test]
    fn test_caret_switches_line() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let t = tree.append_text(p, "title").unwrap();
        let mut selection = HostSelection::single(SelectionRange::collapsed(BoundaryPoint::new(t, 2)));
        run(&mut tree, &mut selection, "heading2", true);
        assert_eq!(tree.body_html(), "<h2>title</h2>");
        assert_eq!(selection.primary().unwrap().start, BoundaryPoint::new(t, 2));
        run(&mut tree, &mut selection, "heading2", false);
        assert_eq!(tree.body_html(), "<p>title</p>");
    }

    #[test]
    fn test_multi_line_switches_each_line() {
        let mut tree = DocumentTree::new();
        let p1 = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p1, "abc").unwrap();
        let p2 = tree.append_element(tree.body(), "p").unwrap();
        tree.append_text(p2, "mid").unwrap();
        let p3 = tree.append_element(tree.body(), "p").unwrap();
        let d = tree.append_text(p3, "def").unwrap();
        let before = tree.node_count();
        let mut selection = HostSelection::single(SelectionRange::between(a, 1, d, 2));
        run(&mut tree, &mut selection, "heading1", true);
        assert_eq!(tree.body_html(), "<h1>abc</h1><h1>mid</h1><h1>def</h1>");
        assert_eq!(tree.node_count(), before);
        assert_eq!(tree.lines(), &[p1, p2, p3]);
    }

    #[test]
    fn test_empty_line_is_switched() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let mut selection = HostSelection::single(SelectionRange::collapsed(BoundaryPoint::new(p, 0)));
        run(&mut tree, &mut selection, "preformatted", true);
        assert_eq!(tree.body_html(), "<pre></pre>");
    }
}
