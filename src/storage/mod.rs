//! Uniform references into directories and archives.
//!
//! A [`StorageRef`] names one file or directory in exactly one of two
//! backends:
//!
//! - a real directory tree, addressed by absolute filesystem path
//! - a ZIP/JAR archive, addressed by the archive's identity plus an internal
//!   path; the opened archive index is shared by every reference into it
//!
//! Both backends answer the same questions the same way. Absence is never an
//! error: listing a missing directory yields nothing and type queries on a
//! missing entry are `false`.
//!
//! # Example
//!
//! ```rust,no_run
//! use resvfs::StorageRef;
//!
//! fn main() -> resvfs::Result<()> {
//!     let pack = StorageRef::open_archive("pack.zip")?;
//!     for entry in pack.join("assets/minecraft/lang").read_dir()? {
//!         println!("{} ({:?})", entry.name(), entry.storage().file_type());
//!     }
//!     Ok(())
//! }
//! ```

mod archive;
mod dir;
mod listing;
mod stream;

pub use archive::{ArchiveCache, ArchiveIndex, ArchiveRef, ReadSeek};
pub use dir::DirRef;
pub use stream::EntryStream;

use std::fmt;
use std::rc::Rc;

use crate::file_type::FileType;
use crate::options::{ArchiveLimits, OpenOptions};
use crate::path::Path;
use crate::{Error, Result};

/// What kind of entry a listing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file or archive file entry.
    File,
    /// A directory, explicit or synthesized.
    Dir,
    /// A symbolic link; only the directory backend reports these.
    Symlink,
}

impl EntryKind {
    /// Short lowercase name.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
            EntryKind::Symlink => "symlink",
        }
    }
}

/// One child returned by [`StorageRef::read_dir`] or
/// [`StorageRef::read_dir_recursive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    kind: EntryKind,
    name: String,
    storage: StorageRef,
}

impl DirEntry {
    /// Returns the entry kind.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the entry's own name (not the full path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the entry.
    pub fn storage(&self) -> &StorageRef {
        &self.storage
    }

    /// Consumes the entry and returns its reference.
    pub fn into_storage(self) -> StorageRef {
        self.storage
    }

    /// Returns true for files.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Returns true for directories.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Returns true for symbolic links.
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }
}

/// A location in one of the two storage backends.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageRef {
    /// A real filesystem location.
    Dir(DirRef),
    /// An entry inside an archive.
    Archive(ArchiveRef),
}

impl StorageRef {
    /// References a real filesystem location.
    pub fn dir(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(StorageRef::Dir(DirRef::new(path)?))
    }

    /// Opens the archive at `path` and references its root.
    pub fn open_archive(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::open_archive_with_limits(path, &ArchiveLimits::default())
    }

    /// Opens the archive at `path` with explicit limits.
    pub fn open_archive_with_limits(
        path: impl AsRef<std::path::Path>,
        limits: &ArchiveLimits,
    ) -> Result<Self> {
        let index = ArchiveIndex::open(path, limits)?;
        Ok(Self::archive_root(Rc::new(index)))
    }

    /// References the root of the archive at `path`, reusing an index from
    /// `cache` when the archive is unchanged on disk.
    pub fn open_archive_cached(
        cache: &mut ArchiveCache,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self> {
        Ok(Self::archive_root(cache.get_or_open(path)?))
    }

    /// References the root of an already indexed archive.
    pub fn archive_root(index: Rc<ArchiveIndex>) -> Self {
        StorageRef::Archive(ArchiveRef::root(index))
    }

    /// Returns true for archive-backed references.
    pub fn is_archive(&self) -> bool {
        matches!(self, StorageRef::Archive(_))
    }

    /// Returns the location's path: the absolute filesystem path for the
    /// directory backend, the internal `/`-rooted path for archives.
    pub fn path(&self) -> &Path {
        match self {
            StorageRef::Dir(dir) => dir.path(),
            StorageRef::Archive(archive) => archive.path(),
        }
    }

    /// Returns the archive's own path for archive-backed references.
    pub fn archive_path(&self) -> Option<&Path> {
        match self {
            StorageRef::Dir(_) => None,
            StorageRef::Archive(archive) => Some(archive.index().identity()),
        }
    }

    /// Returns the entry's name. The root of an archive is named after the
    /// archive file.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            StorageRef::Dir(dir) => dir.path().file_name(),
            StorageRef::Archive(archive) => archive.file_name(),
        }
    }

    /// Classifies the entry by its path; no I/O.
    pub fn file_type(&self) -> FileType {
        FileType::classify(self.path())
    }

    /// Returns true if the location cannot be modified in place.
    ///
    /// Archive entries are always read-only. A missing directory-backed
    /// location is not read-only.
    pub fn read_only(&self) -> bool {
        match self {
            StorageRef::Dir(dir) => dir.read_only(),
            StorageRef::Archive(_) => true,
        }
    }

    /// Returns true if the location is a file.
    pub fn is_file(&self) -> bool {
        match self {
            StorageRef::Dir(dir) => dir.is_file(),
            StorageRef::Archive(archive) => archive.is_file(),
        }
    }

    /// Returns true if the location is a directory.
    pub fn is_dir(&self) -> bool {
        match self {
            StorageRef::Dir(dir) => dir.is_dir(),
            StorageRef::Archive(archive) => archive.is_dir(),
        }
    }

    /// Returns true if the location is a symbolic link; never for archives.
    pub fn is_link(&self) -> bool {
        match self {
            StorageRef::Dir(dir) => dir.is_link(),
            StorageRef::Archive(_) => false,
        }
    }

    /// Returns true if the location is a file or a directory.
    pub fn exists(&self) -> bool {
        self.is_file() || self.is_dir() || self.is_link()
    }

    /// Lists immediate children.
    ///
    /// The directory backend returns them in OS order, the archive backend
    /// sorted by name. A missing location or a file has no children.
    ///
    /// # Errors
    ///
    /// Fails only on backend errors such as an unreadable directory.
    pub fn read_dir(&self) -> Result<Vec<DirEntry>> {
        let children = match self {
            StorageRef::Dir(dir) => dir
                .children()?
                .into_iter()
                .map(|(name, kind)| DirEntry {
                    storage: StorageRef::Dir(dir.child(&name)),
                    kind,
                    name,
                })
                .collect(),
            StorageRef::Archive(archive) => archive
                .children()
                .into_iter()
                .map(|(name, kind)| DirEntry {
                    storage: StorageRef::Archive(archive.child(&name)),
                    kind,
                    name,
                })
                .collect(),
        };
        Ok(children)
    }

    /// Lists every descendant, flattened in canonical order.
    ///
    /// Entries are grouped by parent directory: a directory is listed before
    /// its group, groups appear breadth-first, and inside a group children
    /// ascend by name. Archive directories that have no explicit record are
    /// synthesized, each exactly once.
    pub fn read_dir_recursive(&self) -> Result<Vec<DirEntry>> {
        let entries = match self {
            StorageRef::Dir(dir) => dir.descendants()?,
            StorageRef::Archive(archive) => archive.descendants(),
        };

        Ok(entries
            .into_iter()
            .map(|entry| {
                let storage = self.join(entry.rel.as_str());
                let name = storage.file_name().unwrap_or_default().to_string();
                DirEntry {
                    kind: entry.kind,
                    name,
                    storage,
                }
            })
            .collect())
    }

    /// Opens the entry for reading.
    pub fn open(&self) -> Result<EntryStream> {
        self.open_with(&OpenOptions::read_only())
    }

    /// Opens the entry with explicit options.
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] if the entry does not exist,
    /// [`Error::Unsupported`] when asking to write into an archive.
    pub fn open_with(&self, options: &OpenOptions) -> Result<EntryStream> {
        match self {
            StorageRef::Dir(dir) => dir.open(options),
            StorageRef::Archive(_) if options.wants_write() => Err(Error::Unsupported {
                operation: "write archive entry",
            }),
            StorageRef::Archive(archive) => archive.open(),
        }
    }

    /// Deletes the entry; directories require `recursive` unless empty.
    ///
    /// Archive entries cannot be deleted.
    pub fn remove(&self, recursive: bool) -> Result<()> {
        match self {
            StorageRef::Dir(dir) => dir.remove(recursive),
            StorageRef::Archive(_) => Err(Error::Unsupported {
                operation: "remove archive entry",
            }),
        }
    }

    /// Creates the directory, and its parents when `all` is set.
    pub fn create_dir(&self, all: bool) -> Result<()> {
        match self {
            StorageRef::Dir(dir) => dir.create_dir(all),
            StorageRef::Archive(_) => Err(Error::Unsupported {
                operation: "create archive directory",
            }),
        }
    }

    /// Composes a child reference in the same backend.
    ///
    /// Inside an archive an absolute `rel` is taken from the archive root and
    /// `..` never leaves the archive.
    pub fn join(&self, rel: impl Into<Path>) -> StorageRef {
        let rel = rel.into();
        match self {
            StorageRef::Dir(dir) => StorageRef::Dir(DirRef::from_path(dir.path().join(rel))),
            StorageRef::Archive(archive) => {
                StorageRef::Archive(archive.with_path(&archive.path().join(rel)))
            }
        }
    }

    /// Returns the containing location, or `None` at a filesystem or archive
    /// root.
    pub fn parent(&self) -> Option<StorageRef> {
        match self {
            StorageRef::Dir(dir) => {
                let parent = dir.path().parent();
                (!parent.is_null()).then(|| StorageRef::Dir(DirRef::from_path(parent)))
            }
            StorageRef::Archive(archive) if archive.is_root() => None,
            StorageRef::Archive(archive) => {
                Some(StorageRef::Archive(archive.with_path(&archive.path().parent())))
            }
        }
    }
}

impl fmt::Debug for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageRef::Dir(dir) => write!(f, "Dir({})", dir.path()),
            StorageRef::Archive(archive) => write!(f, "Archive({:?})", archive),
        }
    }
}

impl fmt::Display for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageRef::Dir(dir) => write!(f, "{}", dir.path()),
            StorageRef::Archive(archive) => write!(f, "{:?}", archive),
        }
    }
}
