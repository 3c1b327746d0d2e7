//! Tree nodes and their handles.

use std::fmt;

use crate::file_type::FileType;
use crate::storage::{EntryKind, StorageRef};

/// Handle to a node in a [`TreeCache`](super::TreeCache).
///
/// Handles are generational: once a node is removed its handle never
/// resolves again, even if the slot is reused. Two handles are equal exactly
/// when they denote the same node instance, which is how callers observe that
/// a refresh kept a node instead of recreating it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(super) index: u32,
    pub(super) generation: u32,
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

/// Whether a node's children reflect the backing storage yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeState {
    /// Created but never refreshed; children are not known.
    #[default]
    Unrefreshed,
    /// Children mirrored the storage as of the last refresh.
    Refreshed,
}

/// One entry in the mirrored hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) storage: StorageRef,
    pub(super) name: String,
    pub(super) file_type: FileType,
    pub(super) kind: EntryKind,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) state: NodeState,
}

impl Node {
    pub(super) fn new(storage: StorageRef, name: String, kind: EntryKind, parent: Option<NodeId>) -> Self {
        let file_type = storage.file_type();
        Self {
            storage,
            name,
            file_type,
            kind,
            parent,
            children: Vec::new(),
            state: NodeState::Unrefreshed,
        }
    }

    /// The storage location this node mirrors.
    pub fn storage(&self) -> &StorageRef {
        &self.storage
    }

    /// Entry name; children are sorted by it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification cached at the last refresh.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Entry kind reported by the backend.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns true if the node mirrors a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Parent handle; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles, sorted by name.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Refresh state.
    pub fn state(&self) -> NodeState {
        self.state
    }
}
