//! Format toggler - applies surgery to one node or across a subtree

use crate::surgery::{split_ancestor_around, strip_format, unwrap_node, unwrap_recursive, wrap_recursive};
use crate::{BlockFormat, FormatConfig, FormatDescriptor, Result, StyleFormat};
use doc_model::{DocumentTree, NodeId};

/// Ordered set of nodes a recursive toggle must skip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionList {
    nodes: Vec<NodeId>,
}

impl ExceptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }
}

impl Extend<NodeId> for ExceptionList {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        for node in iter {
            self.push(node);
        }
    }
}

impl FromIterator<NodeId> for ExceptionList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

/// Options of a recursive toggle
#[derive(Debug, Clone, Copy)]
pub struct ToggleOptions<'a> {
    pub except: Option<&'a ExceptionList>,
    /// Node at which the walk stops
    pub end_node: Option<NodeId>,
    pub value: Option<&'a str>,
    /// Inline mode keeps line breaks and only stops on the end node itself
    pub inline: bool,
}

impl<'a> ToggleOptions<'a> {
    pub fn new(inline: bool) -> Self {
        Self {
            except: None,
            end_node: None,
            value: None,
            inline,
        }
    }

    pub fn except(mut self, except: &'a ExceptionList) -> Self {
        self.except = Some(except);
        self
    }

    pub fn until(mut self, end_node: Option<NodeId>) -> Self {
        self.end_node = end_node;
        self
    }

    pub fn value(mut self, value: Option<&'a str>) -> Self {
        self.value = value;
        self
    }

    fn skips(&self, node: NodeId) -> bool {
        self.except.is_some_and(|e| e.contains(node))
    }
}

pub struct FormatToggler<'a> {
    config: &'a FormatConfig,
}

impl<'a> FormatToggler<'a> {
    pub fn new(config: &'a FormatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatConfig {
        self.config
    }

    /// Apply or remove a format on exactly one node
    pub fn toggle(
        &self,
        tree: &mut DocumentTree,
        wrap: bool,
        descriptor: &FormatDescriptor,
        node: NodeId,
        value: Option<&str>,
    ) -> Result<()> {
        if !tree.is_attached(node) || node == tree.body() {
            return Ok(());
        }
        match descriptor {
            FormatDescriptor::Inline(_) => {
                if wrap {
                    self.wrap_inline(tree, descriptor, node, value)
                } else {
                    self.unwrap_inline(tree, descriptor, node, value)
                }
            }
            FormatDescriptor::Block(block) => {
                if wrap {
                    self.wrap_block(tree, descriptor, block, node)
                } else {
                    self.unwrap_block(tree, descriptor, block, node)
                }
            }
            FormatDescriptor::Style(style) => self.toggle_style(tree, wrap, style, node, value),
        }
    }

    /// Toggle `root` as a whole: an empty root is toggled itself, anything
    /// else is walked with [`Self::toggle_recursive`]
    pub fn toggle_root(
        &self,
        tree: &mut DocumentTree,
        wrap: bool,
        descriptor: &FormatDescriptor,
        root: NodeId,
        options: &ToggleOptions<'_>,
    ) -> Result<()> {
        if tree.children(root).is_empty() {
            self.toggle(tree, wrap, descriptor, root, options.value)
        } else {
            self.toggle_recursive(tree, wrap, descriptor, root, options)?;
            Ok(())
        }
    }

    /// Depth-first walk over `root`'s children toggling every leaf.
    ///
    /// Returns whether the end node was reached, in which case the walk has
    /// stopped.
    pub fn toggle_recursive(
        &self,
        tree: &mut DocumentTree,
        wrap: bool,
        descriptor: &FormatDescriptor,
        root: NodeId,
        options: &ToggleOptions<'_>,
    ) -> Result<bool> {
        let children = tree.children(root).to_vec();
        let sole = children.len() == 1;
        for child in children {
            if !tree.exists(child) || options.skips(child) {
                continue;
            }
            let is_end = options.end_node.is_some_and(|end| {
                end == child || (!options.inline && tree.contains(child, end))
            });
            let is_break = tree.tag(child).is_some_and(|t| self.config.is_line_break_tag(t));

            if tree.is_text(child) || (is_break && sole) {
                self.toggle(tree, wrap, descriptor, child, options.value)?;
            } else if is_break {
                if !options.inline {
                    tracing::trace!(node = %child, "dropping line break inside block toggle");
                    tree.remove(child)?;
                }
            } else if tree.is_element(child) {
                if self.toggle_recursive(tree, wrap, descriptor, child, options)? {
                    return Ok(true);
                }
                if tree.exists(child) && tree.children(child).is_empty() {
                    self.toggle(tree, wrap, descriptor, child, options.value)?;
                }
            }

            if is_end {
                self.trim_trailing_break(tree, root, child)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Drop a line break that directly follows the end of a toggled span and
    /// closes its parent
    fn trim_trailing_break(&self, tree: &mut DocumentTree, root: NodeId, end: NodeId) -> Result<()> {
        let mut at = end;
        while let Some(parent) = tree.parent(at) {
            if parent == root {
                break;
            }
            at = parent;
        }
        if tree.parent(at) != Some(root) {
            return Ok(());
        }
        if let Some(next) = tree.next_sibling(at) {
            let is_break = tree.tag(next).is_some_and(|t| self.config.is_line_break_tag(t));
            if is_break && tree.next_sibling(next).is_none() {
                tree.remove(next)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Inline
    // =========================================================================

    /// Inline formats never climb onto the line root itself
    fn line_stop(&self, tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
        tree.line_root(node)
    }

    fn wrap_inline(
        &self,
        tree: &mut DocumentTree,
        descriptor: &FormatDescriptor,
        node: NodeId,
        value: Option<&str>,
    ) -> Result<()> {
        let stop = self.line_stop(tree, node);
        if tree.closest_until(node, stop, |n| descriptor.matches(n, value)).is_some() {
            return Ok(());
        }
        if tree.is_void(node) {
            return Ok(());
        }

        // Exclusive formats are stripped once, without cascading into their
        // own exclusions.
        let excluded: Vec<NodeId> = tree
            .ancestors(node)
            .into_iter()
            .take_while(|&a| Some(a) != stop)
            .filter(|&a| tree.get(a).is_some_and(|n| descriptor.is_same_format_node(n)))
            .collect();
        for ancestor in excluded {
            if !tree.contains(ancestor, node) {
                continue;
            }
            split_ancestor_around(tree, ancestor, node)?;
            unwrap_node(tree, ancestor)?;
        }

        if tree.is_text(node) {
            wrap_recursive(tree, descriptor, &[node], value, &|t, n| descriptor.matches_node(t, n, value))?;
        } else {
            let children = tree.children(node).to_vec();
            unwrap_recursive(tree, descriptor, &children, &|t, n| {
                t.get(n).is_some_and(|d| descriptor.is_same_format_node(d))
            })?;
            let children = tree.children(node).to_vec();
            wrap_recursive(tree, descriptor, &children, value, &|t, n| descriptor.matches_node(t, n, value))?;
        }
        Ok(())
    }

    fn unwrap_inline(
        &self,
        tree: &mut DocumentTree,
        descriptor: &FormatDescriptor,
        node: NodeId,
        value: Option<&str>,
    ) -> Result<()> {
        let stop = self.line_stop(tree, node);
        if tree.is_element(node) {
            let children = tree.children(node).to_vec();
            unwrap_recursive(tree, descriptor, &children, &|t, n| descriptor.matches_node(t, n, value))?;
        }
        // Nested copies of the same format are peeled one at a time
        while let Some(ancestor) = tree.closest_until(node, stop, |n| descriptor.matches(n, value)) {
            if !tree.is_element(ancestor) {
                break;
            }
            let ancestor_is_node = ancestor == node;
            split_ancestor_around(tree, ancestor, node)?;
            strip_format(tree, descriptor, ancestor)?;
            if ancestor_is_node || descriptor.matches_node(tree, ancestor, value) {
                break;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Block
    // =========================================================================

    /// Nearest element that a block format acts on
    fn closest_block(&self, tree: &DocumentTree, block: &BlockFormat, node: NodeId) -> Option<NodeId> {
        let body = tree.body();
        tree.closest_until(node, Some(body), |n| {
            n.tag().is_some_and(|tag| {
                block.tag.eq_ignore_ascii_case(tag)
                    || block.is_switchable(tag)
                    || block.is_add_inside(tag)
                    || n.parent() == Some(body)
            })
        })
    }

    fn wrap_block(
        &self,
        tree: &mut DocumentTree,
        descriptor: &FormatDescriptor,
        block: &BlockFormat,
        node: NodeId,
    ) -> Result<()> {
        let Some(target) = self.closest_block(tree, block, node) else {
            return Ok(());
        };
        let Some(tag) = tree.tag(target).map(str::to_string) else {
            return Ok(());
        };

        if let Some(excluded) = tree.closest_until(target, Some(tree.body()), |n| {
            descriptor.is_same_format_node(n)
        }) {
            self.unwrap_block_element(tree, block, excluded)?;
            return self.wrap_block(tree, descriptor, block, node);
        }

        if block.tag.eq_ignore_ascii_case(&tag) {
            return Ok(());
        }
        if block.is_add_inside(&tag) {
            let nested = tree.create_element(&block.tag);
            let children = tree.children(target).to_vec();
            tree.append_child(target, nested)?;
            for child in children {
                tree.append_child(nested, child)?;
            }
            if let Some(styles) = &block.styles {
                tree.merge_styles(nested, styles)?;
            }
            tracing::trace!(container = %target, block = %nested, "nested block inside container");
        } else if block.is_switchable(&tag) {
            tree.rename(target, &block.tag)?;
            if let Some(styles) = &block.styles {
                tree.merge_styles(target, styles)?;
            }
            tracing::trace!(node = %target, from = %tag, to = %block.tag, "switched block");
        } else {
            let wrapper = descriptor.create_wrapper(tree, None);
            tree.insert_before(target, wrapper)?;
            tree.append_child(wrapper, target)?;
            if let Some(styles) = &block.styles {
                tree.merge_styles(wrapper, styles)?;
            }
        }
        Ok(())
    }

    fn unwrap_block(
        &self,
        tree: &mut DocumentTree,
        descriptor: &FormatDescriptor,
        block: &BlockFormat,
        node: NodeId,
    ) -> Result<()> {
        let body = tree.body();
        let Some(target) = tree.closest_until(node, Some(body), |n| descriptor.matches(n, None)) else {
            return Ok(());
        };
        self.unwrap_block_element(tree, block, target)
    }

    fn unwrap_block_element(&self, tree: &mut DocumentTree, block: &BlockFormat, target: NodeId) -> Result<()> {
        let body = tree.body();
        let parent = tree.parent(target);
        let in_container = parent.and_then(|p| tree.tag(p)).is_some_and(|t| block.is_add_inside(t));
        let holds_text = tree
            .children(target)
            .iter()
            .any(|&c| tree.is_text(c) || tree.is_void(c));
        match &block.unset_switcher {
            Some(unset) if parent == Some(body) || in_container || holds_text => {
                tree.rename(target, unset)?;
                if let Some(styles) = &block.styles {
                    tree.remove_style_properties(target, styles)?;
                }
            }
            _ => unwrap_node(tree, target)?,
        }
        Ok(())
    }

    // =========================================================================
    // Style
    // =========================================================================

    fn toggle_style(
        &self,
        tree: &mut DocumentTree,
        wrap: bool,
        style: &StyleFormat,
        node: NodeId,
        value: Option<&str>,
    ) -> Result<()> {
        let body = tree.body();
        let Some(target) = tree.closest_until(node, Some(body), |n| {
            n.tag().is_some_and(|t| style.is_strict(t))
        }) else {
            tracing::debug!(node = %node, "no container can carry the style");
            return Ok(());
        };
        let resolved = style.resolved(value);
        if wrap {
            if resolved.iter().any(|(_, v)| v.is_empty()) {
                return Ok(());
            }
            tree.merge_styles(target, &resolved)?;
        } else {
            tree.remove_style_properties(target, &style.styles)?;
        }
        Ok(())
    }
}
