//! Node surgery - recursive wrap and unwrap of sibling lists
//!
//! These are pure tree rewrites. They never look at the selection, and they
//! move existing text nodes instead of copying them so that node ids held by
//! the caller stay valid.

use crate::{FormatDescriptor, Result};
use doc_model::{DocumentTree, NodeId};

/// Predicate telling surgery that a node already carries the format
pub type Checker<'a> = dyn Fn(&DocumentTree, NodeId) -> bool + 'a;

/// Wrap every text leaf under `siblings` in a new format element.
///
/// Elements accepted by `checker` are left alone, except that style formats
/// merge their properties into them. Other elements are descended into, so
/// new wrappers always nest under existing structure. Returns the created
/// wrappers in document order.
pub fn wrap_recursive(
    tree: &mut DocumentTree,
    descriptor: &FormatDescriptor,
    siblings: &[NodeId],
    value: Option<&str>,
    checker: &Checker<'_>,
) -> Result<Vec<NodeId>> {
    let mut created = Vec::new();
    for &node in siblings {
        if !tree.exists(node) {
            continue;
        }
        if tree.is_text(node) {
            let wrapper = descriptor.create_wrapper(tree, value);
            tree.insert_before(node, wrapper)?;
            tree.append_child(wrapper, node)?;
            tracing::trace!(node = %node, wrapper = %wrapper, "wrapped text leaf");
            created.push(wrapper);
        } else if checker(tree, node) {
            if let FormatDescriptor::Style(style) = descriptor {
                tree.merge_styles(node, &style.resolved(value))?;
            }
        } else if !tree.is_void(node) {
            let children = tree.children(node).to_vec();
            created.extend(wrap_recursive(tree, descriptor, &children, value, checker)?);
        }
    }
    Ok(created)
}

/// Remove the format from every node under `siblings` accepted by `checker`.
///
/// Matching inline and block elements are replaced by their children. Style
/// formats only lose their properties; the element goes too once it has no
/// styles left and is not a container allowed to carry the style.
pub fn unwrap_recursive(
    tree: &mut DocumentTree,
    descriptor: &FormatDescriptor,
    siblings: &[NodeId],
    checker: &Checker<'_>,
) -> Result<()> {
    for &node in siblings {
        if !tree.exists(node) || tree.is_text(node) {
            continue;
        }
        let children = tree.children(node).to_vec();
        unwrap_recursive(tree, descriptor, &children, checker)?;
        if checker(tree, node) {
            strip_format(tree, descriptor, node)?;
        }
    }
    Ok(())
}

/// Remove the format carried by one element
pub fn strip_format(tree: &mut DocumentTree, descriptor: &FormatDescriptor, node: NodeId) -> Result<()> {
    match descriptor {
        FormatDescriptor::Style(style) => {
            tree.remove_style_properties(node, &style.styles)?;
            let bare = tree.styles(node).is_some_and(|s| s.is_empty());
            let strict = tree.tag(node).is_some_and(|t| style.is_strict(t));
            if bare && !strict && tree.parent(node).is_some() {
                unwrap_node(tree, node)?;
            }
        }
        FormatDescriptor::Inline(_) | FormatDescriptor::Block(_) => {
            let tagged = descriptor
                .tag()
                .zip(tree.tag(node))
                .is_some_and(|(a, b)| a.eq_ignore_ascii_case(b));
            let carries_styles = match descriptor {
                FormatDescriptor::Inline(f) => f.styles.as_ref(),
                FormatDescriptor::Block(f) => f.styles.as_ref(),
                FormatDescriptor::Style(_) => None,
            };
            if !tagged {
                if let Some(styles) = carries_styles {
                    // Style-equivalent wrapper such as a bold span
                    tree.remove_style_properties(node, styles)?;
                    if tree.styles(node).is_some_and(|s| !s.is_empty()) {
                        return Ok(());
                    }
                }
            }
            if tree.parent(node).is_some() {
                unwrap_node(tree, node)?;
            }
        }
    }
    Ok(())
}

/// Replace an element by its children
pub fn unwrap_node(tree: &mut DocumentTree, node: NodeId) -> Result<()> {
    let children = tree.children(node).to_vec();
    for child in children {
        tree.insert_before(node, child)?;
    }
    tracing::trace!(node = %node, "unwrapped element");
    tree.remove(node)?;
    Ok(())
}

/// Split every element between `node` and `ancestor` so that `ancestor`
/// ends up containing only the chain leading to `node`.
///
/// Content before and after that chain moves into shallow copies of each
/// split element, placed next to the original. Does nothing when `ancestor`
/// does not contain `node`.
pub fn split_ancestor_around(tree: &mut DocumentTree, ancestor: NodeId, node: NodeId) -> Result<()> {
    if ancestor == node || !tree.contains(ancestor, node) {
        return Ok(());
    }
    let mut current = node;
    while current != ancestor {
        let Some(parent) = tree.parent(current) else {
            break;
        };
        let Some(index) = tree.index_in_parent(current) else {
            break;
        };
        let children = tree.children(parent).to_vec();
        let (before, rest) = children.split_at(index);
        let after = &rest[1..];
        if tree.parent(parent).is_some() {
            if !before.is_empty() {
                let copy = tree.clone_shallow(parent)?;
                tree.insert_before(parent, copy)?;
                for &sibling in before {
                    tree.append_child(copy, sibling)?;
                }
            }
            if !after.is_empty() {
                let copy = tree.clone_shallow(parent)?;
                tree.insert_after(parent, copy)?;
                for &sibling in after {
                    tree.append_child(copy, sibling)?;
                }
            }
        }
        current = parent;
    }
    Ok(())
}

/// Nodes preceding `node` inside `root`: the previous siblings of `node` and
/// of each of its ancestors below `root`
pub fn nodes_before(tree: &DocumentTree, root: NodeId, node: NodeId) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut current = node;
    while current != root {
        let Some(parent) = tree.parent(current) else {
            break;
        };
        let index = tree.index_in_parent(current).unwrap_or(0);
        result.extend(tree.children(parent)[..index].iter().copied());
        current = parent;
    }
    result
}
