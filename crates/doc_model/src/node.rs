//! Node payloads stored in the document tree

use crate::{NodeId, StyleMap};
use serde::{Deserialize, Serialize};

/// Coarse classification of a node, cheap to copy around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Element,
    Text,
}

/// An element node: a tag plus its inline styles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Lowercase tag name (`p`, `b`, `td`, ...)
    pub tag: String,
    #[serde(default)]
    pub styles: StyleMap,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            styles: StyleMap::new(),
        }
    }

    pub fn with_styles(tag: impl Into<String>, styles: StyleMap) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            styles,
        }
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// Payload of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

/// A node as stored in the tree.
///
/// `parent` is a back-reference used only for upward queries; ownership is
/// expressed solely through `children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Tag of an element, `None` for text
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }
}
