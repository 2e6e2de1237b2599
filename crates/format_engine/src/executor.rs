//! Formatting engine - one editor instance's formatting state

use crate::history::toggle_label;
use crate::{
    processor_for, DetectionContext, FormatConfig, FormatContext, FormatDescriptor, FormatDetector,
    FormatRegistry, FormatToggler, HistoryHook, NoHistory, Result,
};
use doc_model::{DocumentTree, HostSelection, NodeId, SelectionRange, TableSelection};

/// Owns the document, the selections and every collaborator a toggle needs
pub struct FormattingEngine {
    /// Current document tree
    tree: DocumentTree,
    /// Host selection ranges
    selection: HostSelection,
    /// Table cells flagged by table UI code
    table_selection: TableSelection,
    registry: FormatRegistry,
    config: FormatConfig,
    detector: FormatDetector,
    history: Box<dyn HistoryHook>,
}

impl FormattingEngine {
    /// Create an engine with an empty document and the default formats
    pub fn new() -> Self {
        Self::with_tree(DocumentTree::new())
    }

    /// Create an engine around an existing document tree
    pub fn with_tree(tree: DocumentTree) -> Self {
        Self {
            tree,
            selection: HostSelection::new(),
            table_selection: TableSelection::new(),
            registry: FormatRegistry::with_defaults(),
            config: FormatConfig::default(),
            detector: FormatDetector::new(),
            history: Box::new(NoHistory),
        }
    }

    pub fn with_config(mut self, config: FormatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: FormatRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_history(mut self, history: Box<dyn HistoryHook>) -> Self {
        self.history = history;
        self
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Mutable access for host edits such as typing
    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    pub fn selection(&self) -> &HostSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut HostSelection {
        &mut self.selection
    }

    /// Replace the host selection with a single range
    pub fn set_selection(&mut self, range: SelectionRange) {
        self.selection.replace(vec![range]);
    }

    pub fn table_selection(&self) -> &TableSelection {
        &self.table_selection
    }

    pub fn table_selection_mut(&mut self) -> &mut TableSelection {
        &mut self.table_selection
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FormatRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn detector_mut(&mut self) -> &mut FormatDetector {
        &mut self.detector
    }

    /// Apply (`wrap`) or remove a registered format at the current selection
    pub fn toggle_from_caret(&mut self, name: &str, wrap: bool, value: Option<&str>) -> Result<()> {
        let descriptor = self.registry.resolve(name)?.clone();
        self.run_toggle(&toggle_label(name, wrap), &descriptor, wrap, value)
    }

    /// Same as [`Self::toggle_from_caret`] for an unregistered descriptor
    pub fn toggle_descriptor_from_caret(
        &mut self,
        descriptor: &FormatDescriptor,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<()> {
        let label = toggle_label(descriptor.tag().unwrap_or("style"), wrap);
        self.run_toggle(&label, descriptor, wrap, value)
    }

    fn run_toggle(
        &mut self,
        label: &str,
        descriptor: &FormatDescriptor,
        wrap: bool,
        value: Option<&str>,
    ) -> Result<()> {
        if self.selection.is_empty() && self.table_selection.is_empty() {
            tracing::debug!(label, "nothing selected");
            return Ok(());
        }
        self.history.record(label, &self.tree);

        let mut cx = FormatContext {
            tree: &mut self.tree,
            selection: &mut self.selection,
            table: &self.table_selection,
            config: &self.config,
        };
        processor_for(descriptor).toggle_from_caret(&mut cx, wrap, value)
    }

    /// Apply or remove a format on one node, ignoring the selection
    pub fn toggle_node(
        &mut self,
        descriptor: &FormatDescriptor,
        wrap: bool,
        node: NodeId,
        value: Option<&str>,
    ) -> Result<()> {
        self.tree.node(node)?;
        let label = toggle_label(descriptor.tag().unwrap_or("style"), wrap);
        self.history.record(&label, &self.tree);
        FormatToggler::new(&self.config).toggle(&mut self.tree, wrap, descriptor, node, value)
    }

    /// Run the detector against the current selection. Returns the number
    /// of failed callbacks.
    pub fn notify_selection_changed(&mut self) -> usize {
        self.detector.notify(&self.tree, &self.selection)
    }

    /// Names of the formats active at the caret
    pub fn active_formats(&self) -> Vec<&str> {
        DetectionContext::new(&self.tree, &self.selection).active_formats(&self.registry)
    }

    /// Whether a registered format is active at the caret
    pub fn is_active(&self, name: &str, value: Option<&str>) -> Result<bool> {
        let descriptor = self.registry.resolve(name)?;
        Ok(DetectionContext::new(&self.tree, &self.selection).is_active(descriptor, value))
    }
}

impl Default for FormattingEngine {
    fn default() -> Self {
        Self::new()
    }
}
