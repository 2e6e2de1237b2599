//! Stable identity for nodes in the document tree

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a node stored in a [`DocumentTree`](crate::DocumentTree).
///
/// Ids are never reused: a node that is removed and recreated by a split or a
/// clone gets a fresh id, while nodes that are only moved keep theirs. The
/// formatting core relies on this to re-point selections after surgery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Allocate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First UUID group is enough to tell nodes apart in logs
        let simple = self.0.simple().to_string();
        write!(f, "#{}", &simple[..8])
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<NodeId> for Uuid {
    fn from(id: NodeId) -> Self {
        id.0
    }
}
