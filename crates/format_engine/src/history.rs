//! History hook
//!
//! The formatting core keeps no undo log. It only announces every mutating
//! toggle to a hook, before the tree is touched, so the host can snapshot
//! whatever it needs.

use doc_model::DocumentTree;

pub trait HistoryHook {
    /// Called once before a mutating toggle with a short label such as
    /// `"apply bold"`
    fn record(&mut self, label: &str, tree: &DocumentTree);
}

/// Hook that ignores every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryHook for NoHistory {
    fn record(&mut self, _label: &str, _tree: &DocumentTree) {}
}

/// Label used for a toggle
pub fn toggle_label(name: &str, wrap: bool) -> String {
    format!("{} {}", if wrap { "apply" } else { "remove" }, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Versions(Vec<(String, u64)>);

    impl HistoryHook for Versions {
        fn record(&mut self, label: &str, tree: &DocumentTree) {
            self.0.push((label.to_string(), tree.version()));
        }
    }

    #[test]
    fn test_hooks_receive_labels() {
        let tree = DocumentTree::new();
        let mut hook = Versions(Vec::new());
        hook.record(&toggle_label("bold", true), &tree);
        NoHistory.record(&toggle_label("bold", false), &tree);
        assert_eq!(hook.0, vec![("apply bold".to_string(), 0)]);
        assert_eq!(toggle_label("heading1", false), "remove heading1");
    }
}
