//! Sorted-merge refresh for both storage backends.
//!
//! Directory-backed subtrees are refreshed one level at a time: each
//! directory lists its immediate children, the sorted listing is merged into
//! the cached child list, and the walk descends into the result.
//!
//! Archive-backed subtrees are refreshed from one flattened recursive
//! listing. The listing groups entries by parent directory, so the walk keeps
//! a single active directory and merges entries into it position by
//! position. Crossing into a new group closes the active directory (surplus
//! children are dropped) and re-descends from the walk root to the next
//! parent, which is guaranteed to exist because directories are listed
//! before their contents.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::events::TreeChangeSubscriber;
use super::node::{Node, NodeId, NodeState};
use super::TreeCache;
use crate::path::{Component, Path};
use crate::storage::{DirEntry, EntryKind};
use crate::{Error, Result};

/// Outcome of one [`TreeCache::refresh`] call.
#[derive(Debug, Default)]
pub struct RefreshSummary {
    /// Nodes inserted into child lists.
    pub inserted: usize,
    /// Nodes removed from child lists (each removed subtree counts once).
    pub removed: usize,
    /// Nodes whose child list changed.
    pub changed_nodes: usize,
    /// Directory subtrees whose listing failed; their previous children were
    /// kept and the rest of the walk continued.
    pub failures: Vec<(Path, Error)>,
}

impl RefreshSummary {
    /// Returns true if any child list changed.
    pub fn has_changes(&self) -> bool {
        self.changed_nodes > 0
    }

    /// Returns true if every subtree was refreshed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Child list being rebuilt in place.
struct Merge {
    node: NodeId,
    index_path: Vec<usize>,
    /// Insertion cursor: children before it are final.
    pos: usize,
    changed: bool,
}

/// Directory currently receiving entries during an archive walk.
struct ActiveDir {
    dir: Path,
    merge: Merge,
}

impl TreeCache {
    /// Brings the subtree at `id` in line with its backing storage.
    ///
    /// Archive-backed nodes are refreshed with one archive-wide listing
    /// below them. Directory-backed nodes are refreshed level by level;
    /// a descendant whose listing fails keeps its previous children and is
    /// reported in [`RefreshSummary::failures`].
    ///
    /// # Errors
    ///
    /// Fails if the node's own listing fails, for instance on a malformed
    /// archive. The tree is left untouched in that case.
    pub fn refresh(
        &mut self,
        id: NodeId,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<RefreshSummary> {
        let mut summary = RefreshSummary::default();
        let Some(node) = self.get(id) else {
            log::warn!("Refresh requested for stale node {:?}", id);
            return Ok(summary);
        };

        if node.storage.is_archive() {
            self.refresh_archive(id, subscriber, &mut summary)?;
        } else {
            self.refresh_dirs(id, subscriber, &mut summary)?;
        }
        Ok(summary)
    }

    fn refresh_dirs(
        &mut self,
        start: NodeId,
        subscriber: &mut dyn TreeChangeSubscriber,
        summary: &mut RefreshSummary,
    ) -> Result<()> {
        if self[start].storage.is_dir() {
            self[start].kind = EntryKind::Dir;
        }

        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            match self.refresh_dir_node(id, subscriber, summary) {
                Ok(children) => pending.extend(children.into_iter().rev()),
                Err(e) if id == start => return Err(e),
                Err(e) => {
                    let path = self[id].storage.path().clone();
                    log::warn!("Failed to refresh {}: {}", path, e);
                    summary.failures.push((path, e));
                }
            }
        }
        Ok(())
    }

    /// Refreshes one directory level and returns the resulting children.
    fn refresh_dir_node(
        &mut self,
        id: NodeId,
        subscriber: &mut dyn TreeChangeSubscriber,
        summary: &mut RefreshSummary,
    ) -> Result<Vec<NodeId>> {
        self.reclassify(id);

        let entries = if self[id].kind == EntryKind::Dir {
            let mut entries = self[id].storage.read_dir()?;
            entries.sort_by(|a, b| a.name().cmp(b.name()));
            entries
        } else {
            Vec::new()
        };

        let mut merge = self.begin_merge(id, 0);
        let mut children = Vec::with_capacity(entries.len());
        for entry in &entries {
            children.push(self.merge_entry(&mut merge, entry, subscriber, summary));
        }
        self.finish_merge(merge, subscriber, summary);

        self[id].state = NodeState::Refreshed;
        Ok(children)
    }

    fn refresh_archive(
        &mut self,
        root: NodeId,
        subscriber: &mut dyn TreeChangeSubscriber,
        summary: &mut RefreshSummary,
    ) -> Result<()> {
        let root_storage = self[root].storage.clone();
        // list before touching the tree so a failure leaves it intact
        let entries = root_storage.read_dir_recursive()?;
        self.reclassify(root);
        if root_storage.is_dir() {
            self[root].kind = EntryKind::Dir;
        }

        let root_path = root_storage.path();
        let mut checkpoints: HashMap<Path, usize> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut active: Option<ActiveDir> = None;

        for entry in &entries {
            let parent = entry.storage().path().parent();

            if active.as_ref().is_none_or(|a| a.dir != parent) {
                if let Some(done) = active.take() {
                    checkpoints.insert(done.dir, done.merge.pos);
                    self.finish_merge(done.merge, subscriber, summary);
                }

                let Some(node) = self.descend(root, &parent.strip_prefix(root_path)) else {
                    log::warn!("Skipping archive entry {} with unknown parent", entry.storage());
                    continue;
                };
                let pos = checkpoints.get(&parent).copied().unwrap_or(0);
                visited.insert(node);
                active = Some(ActiveDir {
                    dir: parent,
                    merge: self.begin_merge(node, pos),
                });
            }

            if let Some(group) = active.as_mut() {
                self.merge_entry(&mut group.merge, entry, subscriber, summary);
            }
        }

        if let Some(done) = active.take() {
            self.finish_merge(done.merge, subscriber, summary);
        }

        // directories with no entries left were never visited as a parent
        for (_, id) in self.walk(root) {
            if self.contains(id) && !visited.contains(&id) && !self[id].children.is_empty() {
                let merge = self.begin_merge(id, 0);
                self.finish_merge(merge, subscriber, summary);
            }
        }

        for (_, id) in self.walk(root) {
            let node = &mut self[id];
            node.file_type = node.storage.file_type();
            node.state = NodeState::Refreshed;
        }
        Ok(())
    }

    /// Follows the normal components of `rel` down from `from`.
    fn descend(&self, from: NodeId, rel: &Path) -> Option<NodeId> {
        if rel.is_null() {
            return None;
        }

        let mut node = from;
        for component in rel.components() {
            if let Component::Normal(name) = component {
                node = self.child_by_name(node, name)?;
            }
        }
        Some(node)
    }

    fn reclassify(&mut self, id: NodeId) {
        let node = &mut self[id];
        node.file_type = node.storage.file_type();
    }

    fn begin_merge(&self, node: NodeId, pos: usize) -> Merge {
        Merge {
            node,
            index_path: self.index_path(node),
            pos,
            changed: false,
        }
    }

    /// Places `entry` at the merge cursor: cached children sorting before it
    /// are gone and get removed, an equal name is kept, otherwise a new node
    /// is inserted.
    fn merge_entry(
        &mut self,
        merge: &mut Merge,
        entry: &DirEntry,
        subscriber: &mut dyn TreeChangeSubscriber,
        summary: &mut RefreshSummary,
    ) -> NodeId {
        let i = merge.pos;
        merge.pos += 1;

        loop {
            let existing = self[merge.node].children.get(i).copied();
            let ordering = existing.map(|child| self[child].name.as_str().cmp(entry.name()));

            match (existing, ordering) {
                (Some(child), Some(Ordering::Less)) => {
                    subscriber.pre_remove(&merge.index_path, i, i);
                    self[merge.node].children.remove(i);
                    self.free_subtree(child);
                    subscriber.post_remove(&merge.index_path);
                    summary.removed += 1;
                    merge.changed = true;
                }
                (Some(child), Some(Ordering::Equal)) => {
                    self[child].kind = entry.kind();
                    return child;
                }
                _ => {
                    subscriber.pre_insert(&merge.index_path, i, i);
                    let node = Node::new(
                        entry.storage().clone(),
                        entry.name().to_string(),
                        entry.kind(),
                        Some(merge.node),
                    );
                    let child = self.alloc(node);
                    self[merge.node].children.insert(i, child);
                    subscriber.post_insert(&merge.index_path);
                    summary.inserted += 1;
                    merge.changed = true;
                    return child;
                }
            }
        }
    }

    /// Drops children past the merge cursor and reports the node once if
    /// anything changed.
    fn finish_merge(
        &mut self,
        merge: Merge,
        subscriber: &mut dyn TreeChangeSubscriber,
        summary: &mut RefreshSummary,
    ) {
        let mut changed = merge.changed;
        let len = self[merge.node].children.len();

        if len > merge.pos {
            subscriber.pre_remove(&merge.index_path, merge.pos, len - 1);
            let surplus: Vec<NodeId> = self[merge.node].children.drain(merge.pos..).collect();
            summary.removed += surplus.len();
            for child in surplus {
                self.free_subtree(child);
            }
            subscriber.post_remove(&merge.index_path);
            changed = true;
        }

        if changed {
            log::debug!("Children of {} changed", self[merge.node].storage);
            subscriber.children_changed(&merge.index_path);
            summary.changed_nodes += 1;
        }
    }
}
