//! Archive backend: ZIP/JAR entries addressed by internal paths.
//!
//! An archive is indexed once into an [`ArchiveIndex`], a sorted set of
//! normalized entry names, and shared as `Rc<ArchiveIndex>` by every
//! reference into it. Directories are mostly implicit: a name is a directory
//! if any entry lives below it, whether or not the archive stores an explicit
//! `name/` record.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::num::NonZeroUsize;
use std::ops::Bound;
use std::path::PathBuf;
use std::rc::Rc;

use filetime::FileTime;
use lru::LruCache;
use zip::ZipArchive;

use super::EntryKind;
use super::listing::{self, FlatEntry};
use super::stream::EntryStream;
use crate::options::ArchiveLimits;
use crate::path::{Component, Path};
use crate::{Error, Result};

/// Seekable byte source an archive can be read from.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// An opened archive with its entry names indexed.
pub struct ArchiveIndex {
    identity: Path,
    archive: RefCell<ZipArchive<Box<dyn ReadSeek>>>,
    /// Normalized key -> raw name as stored in the archive.
    files: BTreeMap<String, String>,
    /// Keys of explicit directory records.
    dirs: BTreeSet<String>,
    limits: ArchiveLimits,
}

impl ArchiveIndex {
    /// Opens and indexes the archive at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Io`] if the file cannot be opened,
    /// [`Error::InvalidArchive`] if it is not a readable ZIP archive, and
    /// [`Error::ResourceLimitExceeded`] if it lists too many entries.
    pub fn open(path: impl AsRef<std::path::Path>, limits: &ArchiveLimits) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let identity = Path::from_std(&path)?;
        let file = File::open(&path)?;
        Self::from_reader(identity, BufReader::new(file), limits)
    }

    /// Indexes an archive read from `reader`; `identity` names it in errors
    /// and in [`StorageRef::archive_path`](crate::StorageRef::archive_path).
    pub fn from_reader<R>(identity: impl Into<Path>, reader: R, limits: &ArchiveLimits) -> Result<Self>
    where
        R: Read + Seek + 'static,
    {
        let identity = identity.into();
        let reader: Box<dyn ReadSeek> = Box::new(reader);
        let archive =
            ZipArchive::new(reader).map_err(|e| Error::from_zip(identity.as_str(), e))?;
        limits.check_entries(archive.len())?;

        let mut files = BTreeMap::new();
        let mut dirs = BTreeSet::new();
        for raw in archive.file_names() {
            let key = entry_key(raw);
            if key.is_empty() {
                log::warn!("Skipping archive entry with empty name: {:?}", raw);
                continue;
            }

            if raw.ends_with('/') || raw.ends_with('\\') {
                dirs.insert(key);
            } else if files.contains_key(&key) {
                log::warn!("Skipping duplicate archive entry '{}'", raw);
            } else {
                files.insert(key, raw.to_string());
            }
        }

        log::debug!(
            "Indexed archive {}: {} files, {} explicit directories",
            identity,
            files.len(),
            dirs.len()
        );

        Ok(Self {
            identity,
            archive: RefCell::new(archive),
            files,
            dirs,
            limits: limits.clone(),
        })
    }

    /// Returns the archive identity (its own path).
    pub fn identity(&self) -> &Path {
        &self.identity
    }

    /// Returns the number of file entries.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns the limits the archive was indexed with.
    pub fn limits(&self) -> &ArchiveLimits {
        &self.limits
    }

    /// Returns true if `key` names a file entry exactly.
    pub(crate) fn is_file(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    /// Returns true if `key` is the root, an explicit directory, or a strict
    /// prefix of any entry name.
    pub(crate) fn is_dir(&self, key: &str) -> bool {
        if key.is_empty() || self.dirs.contains(key) {
            return true;
        }

        let prefix = child_prefix(key);
        map_has_prefix(&self.files, &prefix) || set_has_prefix(&self.dirs, &prefix)
    }

    /// Immediate children of `key`, deduplicated and sorted by name.
    pub(crate) fn children(&self, key: &str) -> Vec<(String, EntryKind)> {
        let prefix = child_prefix(key);
        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();

        let file_names = self
            .files
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|(name, _)| (name.as_str(), EntryKind::File));
        let dir_names = self
            .dirs
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|name| (name.as_str(), EntryKind::Dir));

        for (name, kind) in file_names
            .take_while(|(name, _)| name.starts_with(&prefix))
            .chain(dir_names.take_while(|(name, _)| name.starts_with(&prefix)))
        {
            let rest = &name[prefix.len()..];
            let (child, kind) = match rest.find('/') {
                Some(split) => (&rest[..split], EntryKind::Dir),
                None => (rest, kind),
            };

            // a name that is both a file and a directory prefix is a directory
            let slot = children.entry(child.to_string()).or_insert(kind);
            if kind == EntryKind::Dir {
                *slot = EntryKind::Dir;
            }
        }

        children.into_iter().collect()
    }

    /// Every entry strictly below `key`, with synthesized directories, in
    /// canonical listing order. Keys are relative to `key`.
    pub(crate) fn descendants(&self, key: &str) -> Vec<FlatEntry> {
        let prefix = child_prefix(key);

        let file_names = self
            .files
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|(name, _)| name.as_str())
            .take_while(|name| name.starts_with(&prefix))
            .map(|name| (&name[prefix.len()..], EntryKind::File));
        let dir_names = self
            .dirs
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|name| name.as_str())
            .take_while(|name| name.starts_with(&prefix))
            .map(|name| (&name[prefix.len()..], EntryKind::Dir));

        listing::synthesize(dir_names.chain(file_names))
    }

    /// Decompresses the file entry `key` into memory.
    pub(crate) fn read_entry(&self, key: &str) -> Result<EntryStream> {
        let raw = self
            .files
            .get(key)
            .ok_or_else(|| Error::entry_not_found(format!("{}:/{}", self.identity, key)))?;

        let mut archive = self.archive.borrow_mut();
        let mut entry = archive
            .by_name(raw)
            .map_err(|e| Error::from_zip(self.identity.as_str(), e))?;

        let size = entry.size();
        self.limits.check_entry_size(key, size)?;

        let capacity = usize::try_from(size).unwrap_or(0);
        let mut data = Vec::with_capacity(capacity);
        let read = (&mut entry)
            .take(self.limits.max_entry_size.saturating_add(1))
            .read_to_end(&mut data)?;
        self.limits.check_entry_size(key, read as u64)?;

        Ok(EntryStream::Archive(Cursor::new(data)))
    }
}

impl fmt::Debug for ArchiveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveIndex")
            .field("identity", &self.identity)
            .field("files", &self.files.len())
            .field("dirs", &self.dirs.len())
            .finish()
    }
}

/// Prefix that every descendant key of `key` starts with.
fn child_prefix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{}/", key)
    }
}

fn map_has_prefix(map: &BTreeMap<String, String>, prefix: &str) -> bool {
    map.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .next()
        .is_some_and(|(name, _)| name.starts_with(prefix))
}

fn set_has_prefix(set: &BTreeSet<String>, prefix: &str) -> bool {
    set.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .next()
        .is_some_and(|name| name.starts_with(prefix))
}

/// Normalizes a raw archive name into an index key.
///
/// Backslashes count as separators, `.` is dropped and `..` pops, so the key
/// never escapes the archive root.
pub(crate) fn entry_key(raw: &str) -> String {
    let raw = raw.replace('\\', "/");
    resolve(&Path::new(raw))
}

/// Resolves `path` against the archive root into a key.
pub(crate) fn resolve(path: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => parts.push(name),
            Component::ParentDir => {
                parts.pop();
            }
            Component::Root | Component::CurDir => {}
        }
    }
    parts.join("/")
}

/// A location inside an archive.
#[derive(Clone)]
pub struct ArchiveRef {
    index: Rc<ArchiveIndex>,
    /// Absolute internal path, `/` for the archive root.
    path: Path,
    key: String,
}

impl ArchiveRef {
    /// Creates a reference to the archive root.
    pub fn root(index: Rc<ArchiveIndex>) -> Self {
        Self {
            index,
            path: Path::root(),
            key: String::new(),
        }
    }

    /// Creates a reference to `path` inside the archive; relative paths are
    /// taken from the archive root.
    pub fn new(index: Rc<ArchiveIndex>, path: &Path) -> Self {
        let key = resolve(path);
        let path = Path::root().join(key.as_str());
        Self { index, path, key }
    }

    /// Returns the shared archive index.
    pub fn index(&self) -> &Rc<ArchiveIndex> {
        &self.index
    }

    /// Returns the internal path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true for the archive root.
    pub fn is_root(&self) -> bool {
        self.key.is_empty()
    }

    pub(crate) fn is_file(&self) -> bool {
        self.index.is_file(&self.key)
    }

    pub(crate) fn is_dir(&self) -> bool {
        self.index.is_dir(&self.key)
    }

    pub(crate) fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            self.index.identity().file_name()
        } else {
            self.path.file_name()
        }
    }

    /// Returns a reference to the internal path `path` in the same archive.
    pub(crate) fn with_path(&self, path: &Path) -> Self {
        Self::new(Rc::clone(&self.index), path)
    }

    pub(crate) fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push_name(name);
        let key = if self.key.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.key, name)
        };
        Self {
            index: Rc::clone(&self.index),
            path,
            key,
        }
    }

    pub(crate) fn children(&self) -> Vec<(String, EntryKind)> {
        self.index.children(&self.key)
    }

    pub(crate) fn descendants(&self) -> Vec<FlatEntry> {
        self.index.descendants(&self.key)
    }

    pub(crate) fn open(&self) -> Result<EntryStream> {
        self.index.read_entry(&self.key)
    }
}

impl PartialEq for ArchiveRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.index, &other.index) && self.key == other.key
    }
}

impl Eq for ArchiveRef {}

impl fmt::Debug for ArchiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index.identity(), self.path)
    }
}

struct CachedArchive {
    index: Rc<ArchiveIndex>,
    modified: FileTime,
}

/// Bounded cache of opened archives keyed by their filesystem path.
///
/// A cached index is reused while the archive's modification time is
/// unchanged and reopened otherwise.
pub struct ArchiveCache {
    entries: LruCache<PathBuf, CachedArchive>,
    limits: ArchiveLimits,
}

impl ArchiveCache {
    /// Default number of archives kept open.
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Creates a cache holding up to `capacity` archives.
    pub fn new(capacity: usize) -> Self {
        Self::with_limits(capacity, ArchiveLimits::default())
    }

    /// Creates a cache whose archives are indexed with `limits`.
    pub fn with_limits(capacity: usize, limits: ArchiveLimits) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            limits,
        }
    }

    /// Returns the shared index for `path`, opening or reopening it as needed.
    pub fn get_or_open(&mut self, path: impl AsRef<std::path::Path>) -> Result<Rc<ArchiveIndex>> {
        let path = std::path::absolute(path.as_ref())?;
        let metadata = std::fs::metadata(&path)?;
        let modified = FileTime::from_last_modification_time(&metadata);

        if let Some(cached) = self.entries.get(&path) {
            if cached.modified == modified {
                return Ok(Rc::clone(&cached.index));
            }
            log::debug!("Archive {} changed on disk, reopening", path.display());
        }

        let index = Rc::new(ArchiveIndex::open(&path, &self.limits)?);
        self.entries.put(
            path,
            CachedArchive {
                index: Rc::clone(&index),
                modified,
            },
        );
        Ok(index)
    }

    /// Number of cached archives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached archive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ArchiveCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
