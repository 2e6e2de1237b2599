//! Format descriptors
//!
//! A format is one of three kinds, each carrying exactly the fields that kind
//! needs. Inline formats wrap text in a tag (`b`, `sub`), block formats rename
//! or nest a line's block element (`h1`, `blockquote`), and style formats set
//! properties on the nearest eligible container (`text-align`).

use doc_model::{DocumentTree, NodeData, NodeId, StyleMap};
use serde::{Deserialize, Serialize};

/// Discriminant of a [`FormatDescriptor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatKind {
    Inline,
    Block,
    Style,
}

/// Character-level markup applied by wrapping text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFormat {
    pub tag: String,
    /// Style equivalent, e.g. `font-weight: bold` for `b`
    #[serde(default)]
    pub styles: Option<StyleMap>,
    /// Tags stripped before this format is applied
    #[serde(default)]
    pub same_formats: Vec<String>,
}

impl InlineFormat {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            styles: None,
            same_formats: Vec::new(),
        }
    }

    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = Some(styles);
        self
    }

    pub fn excluding(mut self, tags: &[&str]) -> Self {
        self.same_formats = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }
}

/// Line-level markup applied by renaming or nesting block elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFormat {
    pub tag: String,
    #[serde(default)]
    pub styles: Option<StyleMap>,
    #[serde(default)]
    pub same_formats: Vec<String>,
    /// Block tags that are renamed to `tag` directly
    #[serde(default)]
    pub switchable: Vec<String>,
    /// Containers inside which a new block is nested instead of renaming
    #[serde(default)]
    pub add_inside: Vec<String>,
    /// Tag used when removing the format from a line root
    #[serde(default)]
    pub unset_switcher: Option<String>,
}

impl BlockFormat {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            styles: None,
            same_formats: Vec::new(),
            switchable: Vec::new(),
            add_inside: Vec::new(),
            unset_switcher: None,
        }
    }

    pub fn switchable(mut self, tags: &[&str]) -> Self {
        self.switchable = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }

    pub fn add_inside(mut self, tags: &[&str]) -> Self {
        self.add_inside = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }

    pub fn unset_to(mut self, tag: &str) -> Self {
        self.unset_switcher = Some(tag.to_ascii_lowercase());
        self
    }

    pub fn excluding(mut self, tags: &[&str]) -> Self {
        self.same_formats = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }

    pub fn is_switchable(&self, tag: &str) -> bool {
        self.switchable.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_add_inside(&self, tag: &str) -> bool {
        self.add_inside.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Style properties carried by the nearest eligible container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFormat {
    /// Properties to set. An empty value is a slot filled by the toggle value.
    pub styles: StyleMap,
    /// Containers allowed to carry the style directly
    #[serde(default)]
    pub strict_formats: Vec<String>,
}

impl StyleFormat {
    pub fn new(styles: StyleMap) -> Self {
        Self {
            styles,
            strict_formats: Vec::new(),
        }
    }

    pub fn on(mut self, tags: &[&str]) -> Self {
        self.strict_formats = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }

    pub fn is_strict(&self, tag: &str) -> bool {
        self.strict_formats.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// The concrete properties for a toggle: a value overrides every property
    pub fn resolved(&self, value: Option<&str>) -> StyleMap {
        match value {
            Some(v) => StyleMap::from_pairs(self.styles.properties().map(|p| (p, v))),
            None => self.styles.clone(),
        }
    }

    /// Whether `styles` carries this format. Unfilled slots match any value.
    pub fn carried_by(&self, styles: &StyleMap, value: Option<&str>) -> bool {
        let wanted = self.resolved(value);
        if wanted.is_empty() {
            return false;
        }
        if wanted.iter().any(|(_, v)| v.is_empty()) {
            styles.has_properties_of(&wanted)
        } else {
            styles.contains_all(&wanted)
        }
    }
}

/// A format as registered by a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormatDescriptor {
    Inline(InlineFormat),
    Block(BlockFormat),
    Style(StyleFormat),
}

impl FormatDescriptor {
    pub fn kind(&self) -> FormatKind {
        match self {
            FormatDescriptor::Inline(_) => FormatKind::Inline,
            FormatDescriptor::Block(_) => FormatKind::Block,
            FormatDescriptor::Style(_) => FormatKind::Style,
        }
    }

    /// Tag of inline and block formats
    pub fn tag(&self) -> Option<&str> {
        match self {
            FormatDescriptor::Inline(f) => Some(&f.tag),
            FormatDescriptor::Block(f) => Some(&f.tag),
            FormatDescriptor::Style(_) => None,
        }
    }

    /// Mutually exclusive sibling tags
    pub fn same_formats(&self) -> &[String] {
        match self {
            FormatDescriptor::Inline(f) => &f.same_formats,
            FormatDescriptor::Block(f) => &f.same_formats,
            FormatDescriptor::Style(_) => &[],
        }
    }

    /// The checker: whether a node already carries this format
    pub fn matches(&self, node: &NodeData, value: Option<&str>) -> bool {
        let Some(el) = node.as_element() else {
            return false;
        };
        match self {
            FormatDescriptor::Inline(f) => {
                el.is(&f.tag)
                    || f.styles
                        .as_ref()
                        .is_some_and(|s| !s.is_empty() && el.styles.contains_all(s))
            }
            FormatDescriptor::Block(f) => {
                el.is(&f.tag)
                    || f.styles
                        .as_ref()
                        .is_some_and(|s| !s.is_empty() && el.styles.contains_all(s))
            }
            FormatDescriptor::Style(f) => f.carried_by(&el.styles, value),
        }
    }

    /// Whether the node with `id` carries this format
    pub fn matches_node(&self, tree: &DocumentTree, id: NodeId, value: Option<&str>) -> bool {
        tree.get(id).is_some_and(|n| self.matches(n, value))
    }

    /// Whether a node is one of the excluded sibling formats
    pub fn is_same_format_node(&self, node: &NodeData) -> bool {
        node.tag()
            .is_some_and(|t| self.same_formats().iter().any(|s| s.eq_ignore_ascii_case(t)))
    }

    /// Create the detached element used to wrap content in this format
    pub fn create_wrapper(&self, tree: &mut DocumentTree, value: Option<&str>) -> NodeId {
        match self {
            FormatDescriptor::Inline(f) => tree.create_element(&f.tag),
            FormatDescriptor::Block(f) => tree.create_element(&f.tag),
            FormatDescriptor::Style(f) => tree.create_element_with_styles("span", f.resolved(value)),
        }
    }
}

impl From<InlineFormat> for FormatDescriptor {
    fn from(f: InlineFormat) -> Self {
        FormatDescriptor::Inline(f)
    }
}

impl From<BlockFormat> for FormatDescriptor {
    fn from(f: BlockFormat) -> Self {
        FormatDescriptor::Block(f)
    }
}

impl From<StyleFormat> for FormatDescriptor {
    fn from(f: StyleFormat) -> Self {
        FormatDescriptor::Style(f)
    }
}
