//! Style processor - properties carried by containers, such as alignment

use crate::processor::dispatch;
use crate::{FormatContext, FormatDescriptor, FormatProcessor, Result, StyleFormat};

pub struct StyleProcessor {
    descriptor: FormatDescriptor,
}

impl StyleProcessor {
    pub fn new(format: StyleFormat) -> Self {
        Self {
            descriptor: FormatDescriptor::Style(format),
        }
    }

    fn format(&self) -> Option<&StyleFormat> {
        match &self.descriptor {
            FormatDescriptor::Style(f) => Some(f),
            _ => None,
        }
    }
}

impl FormatProcessor for StyleProcessor {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    fn toggle_from_caret(&self, cx: &mut FormatContext<'_>, wrap: bool, value: Option<&str>) -> Result<()> {
        // A property slot left open by the format must be filled by the caller
        let unfilled = self
            .format()
            .is_some_and(|f| f.resolved(value).iter().any(|(_, v)| v.is_empty()));
        if wrap && unfilled {
            tracing::debug!("style format needs a value, nothing to apply");
            return Ok(());
        }
        dispatch(self, cx, wrap, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FormatConfig, FormatRegistry};
    use doc_model::{BoundaryPoint, DocumentTree, HostSelection, SelectionRange, TableSelection};

    fn processor(name: &str) -> StyleProcessor {
        let registry = FormatRegistry::with_defaults();
        let FormatDescriptor::Style(format) = registry.resolve(name).unwrap().clone() else {
            panic!("{} is not a style format", name);
        };
        StyleProcessor::new(format)
    }

    #[test]
    fn test_same_line_styles_container() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let a = tree.append_text(p, "ab").unwrap();
        let b = tree.append_element(p, "b").unwrap();
        let c = tree.append_text(b, "cd").unwrap();
        let mut selection = HostSelection::single(SelectionRange::between(a, 1, c, 1));
        let config = FormatConfig::default();
        let table = TableSelection::new();
        let mut cx = FormatContext {
            tree: &mut tree,
            selection: &mut selection,
            table: &table,
            config: &config,
        };
        processor("align_right").toggle_from_caret(&mut cx, true, None).unwrap();
        assert_eq!(tree.to_html(p), "<p style=\"text-align: right\">ab<b>cd</b></p>");
    }

    #[test]
    fn test_value_fills_slot_and_is_required() {
        let mut tree = DocumentTree::new();
        let p = tree.append_element(tree.body(), "p").unwrap();
        let t = tree.append_text(p, "x").unwrap();
        let mut selection = HostSelection::single(SelectionRange::collapsed(BoundaryPoint::new(t, 0)));
        let config = FormatConfig::default();
        let table = TableSelection::new();
        let color = processor("font_color");
        {
            let mut cx = FormatContext {
                tree: &mut tree,
                selection: &mut selection,
                table: &table,
                config: &config,
            };
            color.toggle_from_caret(&mut cx, true, None).unwrap();
            color.toggle_from_caret(&mut cx, true, Some("#ff0000")).unwrap();
        }
        assert_eq!(tree.styles(p).unwrap().get("color"), Some("#ff0000"));
        {
            let mut cx = FormatContext {
                tree: &mut tree,
                selection: &mut selection,
                table: &table,
                config: &config,
            };
            color.toggle_from_caret(&mut cx, false, None).unwrap();
        }
        assert!(tree.styles(p).unwrap().is_empty());
    }
}
