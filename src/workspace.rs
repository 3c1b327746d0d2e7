//! Multi-root container of mirrored trees.
//!
//! A [`Workspace`] is the ordered list of resource packs an editor has open,
//! each mirrored by its own [`TreeCache`]. Notifications address nodes across
//! the whole workspace: the root list itself is the empty index path, and a
//! node inside root `n` is addressed by `n` followed by its index path within
//! that root's tree.

use std::path::Path as StdPath;
use std::rc::Rc;

use crate::options::ArchiveLimits;
use crate::storage::{ArchiveCache, StorageRef};
use crate::tree::{NoTreeEvents, NodeId, RefreshSummary, TreeCache, TreeChangeSubscriber};
use crate::{Error, Result};

/// One top-level entry of a workspace.
#[derive(Debug)]
pub struct WorkspaceRoot {
    name: String,
    tree: TreeCache,
}

impl WorkspaceRoot {
    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mirrored tree.
    pub fn tree(&self) -> &TreeCache {
        &self.tree
    }

    /// The mirrored tree, mutably.
    pub fn tree_mut(&mut self) -> &mut TreeCache {
        &mut self.tree
    }

    /// Storage location of the root node.
    pub fn storage(&self) -> &StorageRef {
        self.tree[self.tree.root()].storage()
    }
}

/// Ordered list of mirrored roots.
#[derive(Default)]
pub struct Workspace {
    roots: Vec<WorkspaceRoot>,
    archives: ArchiveCache,
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty workspace whose archives are indexed with `limits`.
    pub fn with_limits(limits: ArchiveLimits) -> Self {
        Self {
            roots: Vec::new(),
            archives: ArchiveCache::with_limits(ArchiveCache::DEFAULT_CAPACITY, limits),
        }
    }

    /// Adds a directory root named after the directory.
    pub fn add_dir(
        &mut self,
        path: impl AsRef<StdPath>,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<usize> {
        let name = default_name(path.as_ref())?;
        self.add_dir_with_name(path, name, subscriber)
    }

    /// Adds a directory root with an explicit display name.
    ///
    /// The tree is refreshed before it is announced, so a root that cannot
    /// be listed is not added.
    pub fn add_dir_with_name(
        &mut self,
        path: impl AsRef<StdPath>,
        name: impl Into<String>,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<usize> {
        let storage = StorageRef::dir(path)?;
        if !storage.is_dir() {
            return Err(Error::InvalidPath(format!("not a directory: {}", storage)));
        }
        self.attach(storage, name.into(), subscriber)
    }

    /// Adds a ZIP/JAR root named after the archive file.
    pub fn add_zip(
        &mut self,
        path: impl AsRef<StdPath>,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<usize> {
        let name = default_name(path.as_ref())?;
        self.add_zip_with_name(path, name, subscriber)
    }

    /// Adds a ZIP/JAR root with an explicit display name.
    pub fn add_zip_with_name(
        &mut self,
        path: impl AsRef<StdPath>,
        name: impl Into<String>,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<usize> {
        let storage = StorageRef::open_archive_cached(&mut self.archives, path)?;
        self.attach(storage, name.into(), subscriber)
    }

    fn attach(
        &mut self,
        storage: StorageRef,
        name: String,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<usize> {
        let mut tree = TreeCache::new(storage);
        let summary = tree.refresh(tree.root(), &mut NoTreeEvents)?;
        for (path, error) in &summary.failures {
            log::warn!("Root {} is incomplete at {}: {}", name, path, error);
        }

        let index = self.roots.len();
        subscriber.pre_insert(&[], index, index);
        self.roots.push(WorkspaceRoot { name, tree });
        subscriber.post_insert(&[]);
        Ok(index)
    }

    /// Removes the root at `index`; returns it if it existed.
    pub fn detach(
        &mut self,
        index: usize,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Option<WorkspaceRoot> {
        if index >= self.roots.len() {
            return None;
        }

        subscriber.pre_remove(&[], index, index);
        let root = self.roots.remove(index);
        subscriber.post_remove(&[]);
        Some(root)
    }

    /// Removes every root.
    pub fn reset(&mut self, subscriber: &mut dyn TreeChangeSubscriber) {
        if self.roots.is_empty() {
            return;
        }

        subscriber.pre_remove(&[], 0, self.roots.len() - 1);
        self.roots.clear();
        subscriber.post_remove(&[]);
        self.archives.clear();
    }

    /// The roots in display order.
    pub fn roots(&self) -> &[WorkspaceRoot] {
        &self.roots
    }

    /// The root at `index`.
    pub fn by_index(&self, index: usize) -> Option<&WorkspaceRoot> {
        self.roots.get(index)
    }

    /// The root at `index`, mutably.
    pub fn by_index_mut(&mut self, index: usize) -> Option<&mut WorkspaceRoot> {
        self.roots.get_mut(index)
    }

    /// Position of the first root called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.roots.iter().position(|root| root.name == name)
    }

    /// Refreshes `node` of root `index`, addressing notifications across the
    /// workspace.
    ///
    /// Archive roots are first looked up again in the archive cache, so an
    /// archive rewritten on disk is reopened before the diff.
    pub fn refresh(
        &mut self,
        index: usize,
        node: NodeId,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Result<RefreshSummary> {
        let Some(root) = self.roots.get_mut(index) else {
            return Ok(RefreshSummary::default());
        };

        if let StorageRef::Archive(current) = root.storage() {
            let fresh = self
                .archives
                .get_or_open(current.index().identity().to_std_path())?;
            if !Rc::ptr_eq(&fresh, current.index()) {
                root.tree.rebind_archive(&fresh);
            }
        }

        let mut prefixed = Prefixed {
            prefix: index,
            inner: subscriber,
            buf: Vec::new(),
        };
        root.tree.refresh(node, &mut prefixed)
    }

    /// Refreshes every root, collecting one result per root.
    pub fn refresh_all(
        &mut self,
        subscriber: &mut dyn TreeChangeSubscriber,
    ) -> Vec<Result<RefreshSummary>> {
        let mut results = Vec::with_capacity(self.roots.len());
        for index in 0..self.roots.len() {
            let node = self.roots[index].tree.root();
            results.push(self.refresh(index, node, subscriber));
        }
        results
    }
}

fn default_name(path: &StdPath) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    Ok(absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| absolute.display().to_string()))
}

/// Forwards notifications with the root index prepended to every path.
struct Prefixed<'a> {
    prefix: usize,
    inner: &'a mut dyn TreeChangeSubscriber,
    buf: Vec<usize>,
}

impl Prefixed<'_> {
    fn full(&mut self, path: &[usize]) {
        self.buf.clear();
        self.buf.push(self.prefix);
        self.buf.extend_from_slice(path);
    }
}

impl TreeChangeSubscriber for Prefixed<'_> {
    fn pre_insert(&mut self, parent: &[usize], start: usize, end: usize) {
        self.full(parent);
        self.inner.pre_insert(&self.buf, start, end);
    }

    fn post_insert(&mut self, parent: &[usize]) {
        self.full(parent);
        self.inner.post_insert(&self.buf);
    }

    fn pre_remove(&mut self, parent: &[usize], start: usize, end: usize) {
        self.full(parent);
        self.inner.pre_remove(&self.buf, start, end);
    }

    fn post_remove(&mut self, parent: &[usize]) {
        self.full(parent);
        self.inner.post_remove(&self.buf);
    }

    fn children_changed(&mut self, node: &[usize]) {
        self.full(node);
        self.inner.children_changed(&self.buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::tree::{EventLog, TreeEvent};
    use filetime::FileTime;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &StdPath, names: &[&str]) {
        let mut zip = ZipWriter::new(fs::File::create(path).unwrap());
        for name in names {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(b"{}").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_add_detach_reset() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("one")).unwrap();
        fs::create_dir(tmp.path().join("two")).unwrap();

        let mut ws = Workspace::new();
        let mut log = EventLog::new();
        assert_eq!(ws.add_dir(tmp.path().join("one"), &mut log).unwrap(), 0);
        assert_eq!(
            ws.add_dir_with_name(tmp.path().join("two"), "Second", &mut log).unwrap(),
            1
        );
        assert_eq!(ws.index_of("one"), Some(0));
        assert_eq!(ws.index_of("Second"), Some(1));
        assert_eq!(
            log.events[0],
            TreeEvent::PreInsert {
                parent: vec![],
                start: 0,
                end: 0
            }
        );

        log.clear();
        let detached = ws.detach(0, &mut log).unwrap();
        assert_eq!(detached.name(), "one");
        assert_eq!(ws.roots().len(), 1);
        assert!(ws.detach(5, &mut log).is_none());
        assert_eq!(log.removes(), 1);

        ws.reset(&mut log);
        assert!(ws.roots().is_empty());
        assert_eq!(
            log.events.last(),
            Some(&TreeEvent::PostRemove { parent: vec![] })
        );
    }

    #[test]
    fn test_refresh_events_are_prefixed() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        fs::create_dir(tmp.path().join("b")).unwrap();

        let mut ws = Workspace::new();
        ws.add_dir(tmp.path().join("a"), &mut NoTreeEvents).unwrap();
        ws.add_dir(tmp.path().join("b"), &mut NoTreeEvents).unwrap();

        fs::write(tmp.path().join("b/new.txt"), b"x").unwrap();
        let mut log = EventLog::new();
        let results = ws.refresh_all(&mut log);
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(
            log.events,
            vec![
                TreeEvent::PreInsert {
                    parent: vec![1],
                    start: 0,
                    end: 0
                },
                TreeEvent::PostInsert { parent: vec![1] },
                TreeEvent::ChildrenChanged { node: vec![1] },
            ]
        );
    }

    #[test]
    fn test_add_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let mut ws = Workspace::new();
        let mut log = EventLog::new();
        assert!(ws.add_dir(tmp.path().join("missing"), &mut log).is_err());
        assert!(ws.roots().is_empty());
        assert!(log.events.is_empty());
    }

    #[test]
    fn test_rewritten_archive_is_reopened() {
        let tmp = TempDir::new().unwrap();
        let pack = tmp.path().join("pack.zip");
        write_zip(&pack, &["pack.mcmeta", "lang/en_us.json"]);
        filetime::set_file_mtime(&pack, FileTime::from_unix_time(1_000_000, 0)).unwrap();

        let mut ws = Workspace::new();
        let index = ws.add_zip(&pack, &mut NoTreeEvents).unwrap();
        let tree = ws.by_index(index).unwrap().tree();
        let lang = tree.find(&Path::new("lang")).unwrap();
        assert_eq!(tree[lang].children().len(), 1);

        write_zip(&pack, &["pack.mcmeta", "lang/de_de.json", "lang/en_us.json"]);
        filetime::set_file_mtime(&pack, FileTime::from_unix_time(2_000_000, 0)).unwrap();

        let mut log = EventLog::new();
        let summary = ws.refresh(index, lang, &mut log).unwrap();
        assert_eq!(summary.inserted, 1);
        let tree = ws.by_index(index).unwrap().tree();
        assert!(tree.contains(lang));
        assert_eq!(tree[tree[lang].children()[0]].name(), "de_de.json");
        assert_eq!(
            log.events[0],
            TreeEvent::PreInsert {
                parent: vec![0, 0],
                start: 0,
                end: 0
            }
        );
    }
}
