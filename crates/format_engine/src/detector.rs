//! Format detector - read-only publish/subscribe of the formats active at
//! the caret
//!
//! The detector never mutates the tree. Hosts call [`FormatDetector::notify`]
//! after every selection change; each registered callback receives the caret
//! path and decides for itself what to look at.

use crate::{FormatDescriptor, FormatRegistry, Result, SelectionSnapshot};
use doc_model::{DocumentTree, HostSelection, NodeId};
use serde::{Deserialize, Serialize};

/// Handle returned by [`FormatDetector::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

pub type DetectorCallback = Box<dyn FnMut(&DetectionContext<'_>) -> Result<()>>;

/// What a detector callback gets to see
pub struct DetectionContext<'a> {
    tree: &'a DocumentTree,
    /// Caret node and its ancestors below the body, nearest first
    path: Vec<NodeId>,
}

impl<'a> DetectionContext<'a> {
    pub fn new(tree: &'a DocumentTree, selection: &HostSelection) -> Self {
        let path = SelectionSnapshot::primary(tree, selection)
            .map(|caret| caret.start.path.into_iter().rev().collect())
            .unwrap_or_default();
        Self { tree, path }
    }

    pub fn tree(&self) -> &DocumentTree {
        self.tree
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Whether the caret is inside content carrying `descriptor`
    pub fn is_active(&self, descriptor: &FormatDescriptor, value: Option<&str>) -> bool {
        match descriptor {
            FormatDescriptor::Style(style) => self
                .path
                .iter()
                .find(|&&n| self.tree.tag(n).is_some_and(|t| style.is_strict(t)))
                .is_some_and(|&n| descriptor.matches_node(self.tree, n, value)),
            _ => self
                .path
                .iter()
                .any(|&n| descriptor.matches_node(self.tree, n, value)),
        }
    }

    /// Names of every registered format active at the caret
    pub fn active_formats<'r>(&self, registry: &'r FormatRegistry) -> Vec<&'r str> {
        registry
            .iter()
            .filter(|(_, descriptor)| self.is_active(descriptor, None))
            .map(|(name, _)| name)
            .collect()
    }

    /// Nearest value of a style property along the caret path
    pub fn style_value(&self, property: &str) -> Option<&'a str> {
        let tree = self.tree;
        self.path
            .iter()
            .find_map(|&n| tree.styles(n).and_then(|s| s.get(property)))
    }
}

#[derive(Default)]
pub struct FormatDetector {
    callbacks: Vec<(SubscriptionId, DetectorCallback)>,
    next_id: u64,
}

impl FormatDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&DetectionContext<'_>) -> Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run every callback against the current caret. A failing callback is
    /// logged and does not stop the others. Returns the number of failures.
    pub fn notify(&mut self, tree: &DocumentTree, selection: &HostSelection) -> usize {
        let context = DetectionContext::new(tree, selection);
        let mut failures = 0;
        for (id, callback) in &mut self.callbacks {
            if let Err(e) = callback(&context) {
                failures += 1;
                tracing::warn!(subscription = ?id, "Detector callback failed: {}", e);
            }
        }
        failures
    }
}

impl std::fmt::Debug for FormatDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDetector")
            .field("callbacks", &self.callbacks.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
