//! Directory backend: entries on the real filesystem.

use std::fs;
use std::io;

use walkdir::WalkDir;

use super::EntryKind;
use super::listing::{self, FlatEntry};
use super::stream::EntryStream;
use crate::options::OpenOptions;
use crate::path::Path;
use crate::{Error, Result};

/// A location on the real filesystem, always held as an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirRef {
    path: Path,
}

impl DirRef {
    /// Creates a reference to `path`; relative paths are resolved against the
    /// current directory. The location does not need to exist.
    pub fn new(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let absolute = std::path::absolute(path.as_ref())?;
        Ok(Self {
            path: Path::from_std(&absolute)?,
        })
    }

    /// Wraps an already absolute lexical path.
    pub(crate) fn from_path(path: Path) -> Self {
        debug_assert!(path.is_absolute());
        Self { path }
    }

    /// Returns the absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn std_path(&self) -> std::path::PathBuf {
        self.path.to_std_path()
    }

    pub(crate) fn is_file(&self) -> bool {
        fs::metadata(self.std_path()).is_ok_and(|m| m.is_file())
    }

    pub(crate) fn is_dir(&self) -> bool {
        fs::metadata(self.std_path()).is_ok_and(|m| m.is_dir())
    }

    pub(crate) fn is_link(&self) -> bool {
        fs::symlink_metadata(self.std_path()).is_ok_and(|m| m.file_type().is_symlink())
    }

    pub(crate) fn read_only(&self) -> bool {
        fs::metadata(self.std_path()).is_ok_and(|m| m.permissions().readonly())
    }

    pub(crate) fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push_name(name);
        Self { path }
    }

    /// Immediate children in directory order. A missing location or one that
    /// is not a directory has no children.
    pub(crate) fn children(&self) -> Result<Vec<(String, EntryKind)>> {
        let read_dir = match fs::read_dir(self.std_path()) {
            Ok(read_dir) => read_dir,
            Err(e) if is_absent(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut children = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_absent(&e) => continue,
                Err(e) => return Err(e.into()),
            };

            let Ok(name) = entry.file_name().into_string() else {
                log::warn!(
                    "Skipping non UTF-8 name in {}: {:?}",
                    self.path,
                    entry.file_name()
                );
                continue;
            };

            let kind = match entry.file_type() {
                Ok(file_type) => EntryKind::from(file_type),
                Err(e) if is_absent(&e) => continue,
                Err(e) => return Err(e.into()),
            };
            children.push((name, kind));
        }

        Ok(children)
    }

    /// Every entry below this directory in canonical listing order.
    pub(crate) fn descendants(&self) -> Result<Vec<FlatEntry>> {
        let root = self.std_path();
        let mut entries = Vec::new();

        for entry in WalkDir::new(&root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if e.io_error().is_some_and(is_absent) {
                        continue;
                    }
                    return Err(Error::Io(e.into()));
                }
            };

            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            let Some(rel) = rel.to_str() else {
                log::warn!("Skipping non UTF-8 path {}", entry.path().display());
                continue;
            };

            entries.push(FlatEntry {
                rel: Path::new(rel.replace(std::path::MAIN_SEPARATOR, "/")).to_string(),
                kind: EntryKind::from(entry.file_type()),
            });
        }

        listing::sort_canonical(&mut entries);
        Ok(entries)
    }

    pub(crate) fn open(&self, options: &OpenOptions) -> Result<EntryStream> {
        match options.to_std().open(self.std_path()) {
            Ok(file) => Ok(EntryStream::File(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::entry_not_found(self.path.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn remove(&self, recursive: bool) -> Result<()> {
        let path = self.std_path();
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::entry_not_found(self.path.as_str()));
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_dir(&path)?;
            }
        } else {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub(crate) fn create_dir(&self, all: bool) -> Result<()> {
        let path = self.std_path();
        if all {
            fs::create_dir_all(path)?;
        } else {
            fs::create_dir(path)?;
        }
        Ok(())
    }
}

/// Absence races are reported as empty results, not errors.
fn is_absent(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

impl From<fs::FileType> for EntryKind {
    fn from(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DirRef) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/c.txt"), b"c").unwrap();
        fs::write(tmp.path().join("a/b/d.txt"), b"d").unwrap();
        let root = DirRef::new(tmp.path()).unwrap();
        (tmp, root)
    }

    #[test]
    fn test_queries() {
        let (_tmp, root) = setup();
        assert!(root.is_dir());
        assert!(!root.is_file());
        assert!(root.child("a").child("c.txt").is_file());
        assert!(!root.child("missing").is_dir());
        assert!(!root.child("missing").is_file());
        assert!(!root.child("missing").read_only());
    }

    #[test]
    fn test_children_of_missing_or_file_is_empty() {
        let (_tmp, root) = setup();
        assert!(root.child("missing").children().unwrap().is_empty());
        assert!(root.child("a").child("c.txt").children().unwrap().is_empty());
    }

    #[test]
    fn test_descendants_canonical_order() {
        let (_tmp, root) = setup();
        let keys: Vec<_> = root
            .descendants()
            .unwrap()
            .into_iter()
            .map(|e| e.rel)
            .collect();
        assert_eq!(keys, vec!["a", "a/b", "a/c.txt", "a/b/d.txt"]);
    }

    #[test]
    fn test_descendants_of_missing_is_empty() {
        let (_tmp, root) = setup();
        assert!(root.child("missing").descendants().unwrap().is_empty());
    }

    #[test]
    fn test_open_and_remove() {
        let (_tmp, root) = setup();
        let file = root.child("a").child("c.txt");
        let mut content = String::new();
        file.open(&OpenOptions::read_only())
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "c");

        file.remove(false).unwrap();
        assert!(!file.is_file());
        assert!(matches!(
            file.open(&OpenOptions::read_only()),
            Err(Error::EntryNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_non_recursive_fails_on_populated_dir() {
        let (_tmp, root) = setup();
        let dir = root.child("a");
        assert!(dir.remove(false).is_err());
        dir.remove(true).unwrap();
        assert!(!dir.is_dir());
    }

    #[test]
    fn test_create_dir() {
        let (_tmp, root) = setup();
        let nested = root.child("x").child("y");
        assert!(nested.create_dir(false).is_err());
        nested.create_dir(true).unwrap();
        assert!(nested.is_dir());
    }
}
