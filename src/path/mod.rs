//! Lexical path algebra shared by every storage backend.
//!
//! A [`Path`] is a plain string value normalized to `/` separators. Nothing in
//! this module touches the filesystem: composition, comparison and component
//! iteration are pure string operations, so the same path type addresses real
//! directories and entries inside an archive alike.
//!
//! # Null and empty paths
//!
//! A path can be *null* (no value at all, returned when an operation has no
//! answer, e.g. the parent of `"a"`) or *empty* (the zero-length relative
//! path, returned by [`Path::strip_prefix`] when both sides are equal). The two
//! states are distinct and compare unequal.
//!
//! # Example
//!
//! ```
//! use resvfs::Path;
//!
//! let file = Path::new("/assets//mod/./lang/en_us.json");
//! assert_eq!(file.as_str(), "/assets/mod/lang/en_us.json");
//! assert_eq!(file.parent().file_name(), Some("lang"));
//! assert_eq!(file.extension(), Some("json"));
//!
//! let rel = file.strip_prefix(&Path::new("/assets"));
//! assert_eq!(rel.as_str(), "mod/lang/en_us.json");
//! assert_eq!(Path::new("/assets").join(&rel), file);
//! ```

mod components;

pub use components::{Component, Components, SEPARATOR};

use std::fmt;

use crate::{Error, Result};

/// A normalized, immutable lexical path.
///
/// Equality, ordering and hashing are defined on the normalized string.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    inner: Option<String>,
}

impl Path {
    /// Parses and normalizes `path`.
    ///
    /// Repeated separators collapse, interior `.` segments are dropped and a
    /// trailing separator is removed. A leading `.` of a relative path is
    /// preserved.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            inner: Some(normalize(path.as_ref())),
        }
    }

    /// Returns the null path.
    pub const fn null() -> Self {
        Self { inner: None }
    }

    /// Returns the empty relative path.
    pub fn empty() -> Self {
        Self {
            inner: Some(String::new()),
        }
    }

    /// Returns the root path `/`.
    pub fn root() -> Self {
        Self {
            inner: Some(SEPARATOR.to_string()),
        }
    }

    /// Returns the path as a string slice; the null path renders as `""`.
    pub fn as_str(&self) -> &str {
        self.inner.as_deref().unwrap_or("")
    }

    /// Returns true for the null path.
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Returns true for the null path and the empty path.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Returns true if the path starts with the root component.
    pub fn is_absolute(&self) -> bool {
        self.as_str().starts_with(SEPARATOR)
    }

    /// Returns true if the path is not absolute.
    pub fn is_relative(&self) -> bool {
        !self.is_absolute()
    }

    /// Returns a cursor over the components of this path.
    pub fn components(&self) -> Components<'_> {
        Components::new(self.as_str())
    }

    /// Returns the path without its last component.
    ///
    /// Yields the null path when nothing remains (`"a"`, `"/"`, `""`).
    pub fn parent(&self) -> Path {
        let mut iter = self.components();
        if iter.is_empty() {
            return Path::null();
        }
        iter.advance_back(1);
        iter.to_path()
    }

    /// Returns the last component if it is a normal name.
    ///
    /// `"/"`, `""` and paths ending in `..` have no file name.
    pub fn file_name(&self) -> Option<&str> {
        match self.components().next_back() {
            Some(Component::Normal(name)) => Some(name),
            _ => None,
        }
    }

    /// Returns the file name without its extension.
    ///
    /// A leading `.` is part of the stem (`.gitignore` has no extension).
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match split_extension(name) {
            Some((stem, _)) => Some(stem),
            None => Some(name),
        }
    }

    /// Returns the extension of the file name, if any.
    ///
    /// `"file."` has the empty extension, `".gitignore"` has none.
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(split_extension)
            .map(|(_, extension)| extension)
    }

    /// Returns `self` with `other` appended, see [`Path::push`].
    pub fn join(&self, other: impl Into<Path>) -> Path {
        let mut joined = self.clone();
        joined.push(other);
        joined
    }

    /// Appends `other` to this path.
    ///
    /// An absolute `other` replaces the receiver. Otherwise a single leading
    /// `.` of `other` is dropped and the remainder is appended with exactly one
    /// separator.
    pub fn push(&mut self, other: impl Into<Path>) {
        let other = other.into();
        if other.is_absolute() {
            *self = other;
            return;
        }

        let mut tail = other.components();
        if tail.peek() == Some(Component::CurDir) {
            tail.advance(1);
        }
        if tail.is_empty() {
            return;
        }

        let tail = tail.as_str();
        match &mut self.inner {
            Some(inner) if !inner.is_empty() => {
                if !inner.ends_with(SEPARATOR) {
                    inner.push(SEPARATOR);
                }
                inner.push_str(tail);
            }
            _ => self.inner = Some(tail.to_string()),
        }
    }

    /// Appends a single raw name with no further parsing.
    ///
    /// Used by backends that already hold normalized child names.
    pub(crate) fn push_name(&mut self, name: &str) {
        debug_assert!(!name.is_empty() && !name.contains(SEPARATOR));
        match &mut self.inner {
            Some(inner) if !inner.is_empty() => {
                if !inner.ends_with(SEPARATOR) {
                    inner.push(SEPARATOR);
                }
                inner.push_str(name);
            }
            _ => self.inner = Some(name.to_string()),
        }
    }

    /// Removes `base` from the front of this path, component by component.
    ///
    /// Returns the null path when `base` is not a prefix on component
    /// boundaries (`"/ab"` is not a prefix of `"/abc"`) and the empty path
    /// when both are equal.
    ///
    /// The two results compare unequal. Test a mismatch with
    /// [`is_null`](Self::is_null), or use [`is_empty`](Self::is_empty) to
    /// accept either.
    ///
    /// ```
    /// use resvfs::Path;
    ///
    /// let path = Path::new("/assets/lang");
    /// let missing = path.strip_prefix(&Path::new("/textures"));
    /// assert!(missing.is_null());
    /// assert!(missing.is_empty());
    /// assert_ne!(missing, Path::empty());
    /// assert!(!path.strip_prefix(&path).is_null());
    /// ```
    pub fn strip_prefix(&self, base: &Path) -> Path {
        let mut this = self.components();

        for expected in base.components() {
            if this.next() != Some(expected) {
                return Path::null();
            }
        }

        if this.is_empty() {
            Path::empty()
        } else {
            this.to_path()
        }
    }

    /// Returns true if `base` is a component-wise prefix of this path.
    pub fn starts_with(&self, base: &Path) -> bool {
        let mut this = self.components();
        base.components().all(|expected| this.next() == Some(expected))
    }

    /// Returns true if `child` is a component-wise suffix of this path.
    pub fn ends_with(&self, child: &Path) -> bool {
        let mut this = self.components();
        child
            .components()
            .rev()
            .all(|expected| this.next_back() == Some(expected))
    }

    /// Converts to a standard library path for OS calls.
    pub fn to_std_path(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(self.as_str())
    }

    /// Converts a standard library path, normalizing separators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the path is not valid UTF-8.
    pub fn from_std(path: &std::path::Path) -> Result<Path> {
        path.to_str()
            .map(Path::new)
            .ok_or_else(|| Error::InvalidPath(path.display().to_string()))
    }
}

/// Splits a file name at its last `.`; a leading `.` never counts.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(index) => Some((&name[..index], &name[index + 1..])),
    }
}

fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for component in Components::new(path) {
        if !out.is_empty() && !out.ends_with(SEPARATOR) {
            out.push(SEPARATOR);
        }
        out.push_str(component.as_str());
    }
    out
}

impl From<&str> for Path {
    fn from(value: &str) -> Self {
        Path::new(value)
    }
}

impl From<String> for Path {
    fn from(value: String) -> Self {
        Path::new(value)
    }
}

impl From<&String> for Path {
    fn from(value: &String) -> Self {
        Path::new(value)
    }
}

impl From<&Path> for Path {
    fn from(value: &Path) -> Self {
        value.clone()
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "Path({:?})", inner),
            None => f.write_str("Path(null)"),
        }
    }
}
