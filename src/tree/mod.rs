//! Incremental tree cache mirroring a storage hierarchy.
//!
//! A [`TreeCache`] owns every node of one mirrored hierarchy in an arena and
//! hands out [`NodeId`] handles. Ownership flows downward through each node's
//! child list; the parent link is a plain handle used for navigation only.
//!
//! Children are discovered lazily by [`TreeCache::refresh`], which diffs the
//! cached child lists against the backing storage with a sorted merge and
//! reports each structural change to a [`TreeChangeSubscriber`]. Nodes that
//! still exist keep their handle across refreshes.
//!
//! # Example
//!
//! ```rust,no_run
//! use resvfs::{EventLog, StorageRef, TreeCache};
//!
//! fn main() -> resvfs::Result<()> {
//!     let mut tree = TreeCache::new(StorageRef::dir("resourcepacks/MyPack")?);
//!     let mut events = EventLog::new();
//!
//!     let summary = tree.refresh(tree.root(), &mut events)?;
//!     println!("{} nodes inserted", summary.inserted);
//!
//!     for (depth, id) in tree.walk(tree.root()) {
//!         let node = &tree[id];
//!         println!("{}{} [{}]", "  ".repeat(depth), node.name(), node.file_type());
//!     }
//!     Ok(())
//! }
//! ```

mod events;
mod node;
mod refresh;

pub use events::{EventLog, NoTreeEvents, TreeChangeSubscriber, TreeEvent};
pub use node::{Node, NodeId, NodeState};
pub use refresh::RefreshSummary;

use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::path::{Component, Path};
use crate::storage::{ArchiveIndex, ArchiveRef, EntryKind, StorageRef};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of mirrored nodes rooted at one storage location.
#[derive(Debug)]
pub struct TreeCache {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    len: usize,
}

impl TreeCache {
    /// Creates a cache whose root mirrors `storage`. Nothing is read until
    /// the first refresh.
    pub fn new(storage: StorageRef) -> Self {
        let name = storage
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| storage.path().to_string());
        let kind = if storage.is_file() {
            EntryKind::File
        } else {
            EntryKind::Dir
        };

        let mut cache = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            len: 0,
        };
        cache.root = cache.alloc(Node::new(storage, name, kind, None));
        cache
    }

    /// Returns the root handle.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolves a handle; `None` once the node has been removed.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Returns true if the handle still resolves.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Position of `id` within its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self[parent].children.iter().position(|&child| child == id)
    }

    /// Finds the child of `parent` called `name`.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let children = &self.get(parent)?.children;
        children
            .binary_search_by(|&child| self[child].name.as_str().cmp(name))
            .ok()
            .map(|index| children[index])
    }

    /// Index path from the root to `id`; the root's path is empty.
    pub fn index_path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_of(current) {
            path.push(index);
            match self[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Resolves an index path produced by [`TreeCache::index_path`].
    pub fn by_index_path(&self, path: &[usize]) -> Option<NodeId> {
        path.iter().try_fold(self.root, |node, &index| {
            self.get(node)?.children.get(index).copied()
        })
    }

    /// Looks up a node by path.
    ///
    /// Relative paths are taken from the root; absolute paths must lie under
    /// the root's storage path.
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        let rel = if path.is_absolute() {
            path.strip_prefix(self[self.root].storage.path())
        } else {
            path.clone()
        };
        if rel.is_null() {
            return None;
        }

        let mut node = self.root;
        for component in rel.components() {
            match component {
                Component::Normal(name) => node = self.child_by_name(node, name)?,
                Component::ParentDir => node = self[node].parent?,
                Component::Root | Component::CurDir => {}
            }
        }
        Some(node)
    }

    /// Pre-order walk of the subtree at `id`, yielding depth (relative to
    /// `id`) and handle.
    pub fn walk(&self, id: NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }

        let mut stack = vec![(0, id)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for &child in self[node].children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Points every archive-backed node at `index`, keeping each node's
    /// internal path. Used after the archive was reopened; the next refresh
    /// then diffs against the new contents.
    pub fn rebind_archive(&mut self, index: &Rc<ArchiveIndex>) {
        for slot in &mut self.slots {
            let Some(node) = slot.node.as_mut() else {
                continue;
            };
            if let StorageRef::Archive(archive) = &node.storage {
                let rebound = ArchiveRef::new(Rc::clone(index), archive.path());
                node.storage = StorageRef::Archive(rebound);
            }
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Releases `id` and everything below it. The caller has already
    /// unlinked `id` from its parent.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index as usize)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.len -= 1;
            }
        }
    }
}

impl Index<NodeId> for TreeCache {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if the node has been removed; use [`TreeCache::get`] for
    /// handles that may be stale.
    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale tree handle {:?}", id),
        }
    }
}

impl IndexMut<NodeId> for TreeCache {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
        {
            Some(node) => node,
            None => panic!("stale tree handle {:?}", id),
        }
    }
}
