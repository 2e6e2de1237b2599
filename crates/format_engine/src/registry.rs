//! Format registry - command names to format descriptors
//!
//! One registry is built per editor instance and handed to whatever needs to
//! resolve a command name. There is no process-wide table.

use crate::{BlockFormat, FormatDescriptor, FormatError, InlineFormat, Result, StyleFormat};
use doc_model::StyleMap;
use std::collections::BTreeMap;

const TEXT_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div"];
const NESTING_CONTAINERS: &[&str] = &["td", "th", "li", "blockquote"];
const STYLE_CARRIERS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div", "blockquote", "li", "td", "th",
];

#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: BTreeMap<String, FormatDescriptor>,
}

impl FormatRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in inline, block and style formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let inline = [
            ("bold", "b", Some(("font-weight", "bold"))),
            ("italic", "i", Some(("font-style", "italic"))),
            ("underline", "u", Some(("text-decoration", "underline"))),
            ("strikethrough", "s", Some(("text-decoration", "line-through"))),
            ("code", "code", None),
        ];
        for (name, tag, style) in inline {
            let mut format = InlineFormat::new(tag);
            if let Some(pair) = style {
                format = format.with_styles(StyleMap::from_pairs([pair]));
            }
            registry.register(name, format);
        }
        registry.register("subscript", InlineFormat::new("sub").excluding(&["sup"]));
        registry.register("superscript", InlineFormat::new("sup").excluding(&["sub"]));

        let blocks = [
            ("paragraph", "p"),
            ("heading1", "h1"),
            ("heading2", "h2"),
            ("heading3", "h3"),
            ("heading4", "h4"),
            ("heading5", "h5"),
            ("heading6", "h6"),
            ("preformatted", "pre"),
        ];
        for (name, tag) in blocks {
            registry.register(
                name,
                BlockFormat::new(tag)
                    .switchable(TEXT_BLOCKS)
                    .add_inside(NESTING_CONTAINERS)
                    .unset_to("p"),
            );
        }
        registry.register("blockquote", BlockFormat::new("blockquote").add_inside(&["td", "th", "li"]));

        for align in ["left", "center", "right", "justify"] {
            registry.register(
                &format!("align_{}", align),
                StyleFormat::new(StyleMap::from_pairs([("text-align", align)])).on(STYLE_CARRIERS),
            );
        }
        registry.register(
            "indent",
            StyleFormat::new(StyleMap::from_pairs([("margin-left", "40px")])).on(STYLE_CARRIERS),
        );
        registry.register(
            "font_color",
            StyleFormat::new(StyleMap::from_pairs([("color", "")])).on(STYLE_CARRIERS),
        );
        registry.register(
            "background_color",
            StyleFormat::new(StyleMap::from_pairs([("background-color", "")])).on(STYLE_CARRIERS),
        );
        registry.register(
            "font_size",
            StyleFormat::new(StyleMap::from_pairs([("font-size", "")])).on(STYLE_CARRIERS),
        );

        registry
    }

    /// Register or replace a format under `name`
    pub fn register(&mut self, name: &str, format: impl Into<FormatDescriptor>) {
        self.formats.insert(name.to_string(), format.into());
    }

    pub fn unregister(&mut self, name: &str) -> Option<FormatDescriptor> {
        self.formats.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FormatDescriptor> {
        self.formats.get(name)
    }

    /// Look up a format, failing for unknown names
    pub fn resolve(&self, name: &str) -> Result<&FormatDescriptor> {
        self.get(name)
            .ok_or_else(|| FormatError::UnknownFormat(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormatDescriptor)> {
        self.formats.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormatKind;

    #[test]
    fn test_defaults_cover_every_family() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.resolve("bold").unwrap().kind(), FormatKind::Inline);
        assert_eq!(registry.resolve("heading1").unwrap().kind(), FormatKind::Block);
        assert_eq!(registry.resolve("align_center").unwrap().kind(), FormatKind::Style);
    }

    #[test]
    fn test_sub_and_sup_exclude_each_other() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.resolve("subscript").unwrap().same_formats(), &["sup".to_string()]);
        assert_eq!(registry.resolve("superscript").unwrap().same_formats(), &["sub".to_string()]);
    }

    #[test]
    fn test_unknown_format() {
        let registry = FormatRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve("bold"),
            Err(FormatError::UnknownFormat(name)) if name == "bold"
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FormatRegistry::with_defaults();
        let count = registry.len();
        registry.register("bold", InlineFormat::new("strong"));
        assert_eq!(registry.len(), count);
        assert_eq!(registry.resolve("bold").unwrap().tag(), Some("strong"));
        assert!(registry.unregister("bold").is_some());
        assert!(registry.names().all(|n| n != "bold"));
    }
}
