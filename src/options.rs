//! Configuration for opening entries and indexing archives.

use crate::{Error, Result};

/// How an entry should be opened by [`StorageRef::open_with`].
///
/// Mirrors [`std::fs::OpenOptions`] so the directory backend can forward the
/// flags unchanged. Archive-backed references only honour read access; any
/// write flag is rejected with [`Error::Unsupported`].
///
/// [`StorageRef::open_with`]: crate::StorageRef::open_with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file if it does not exist.
    pub create: bool,
    /// Append to the end of the file.
    pub append: bool,
    /// Truncate the file on open.
    pub truncate: bool,
}

impl Default for OpenOptions {
    /// Read-only access, the same as [`OpenOptions::read_only()`].
    fn default() -> Self {
        Self::read_only()
    }
}

impl OpenOptions {
    /// Creates options with every flag cleared.
    pub fn new() -> Self {
        Self {
            read: false,
            write: false,
            create: false,
            append: false,
            truncate: false,
        }
    }

    /// Read-only access.
    pub fn read_only() -> Self {
        Self::new().read(true)
    }

    /// Write access that replaces existing content, optionally creating the
    /// file.
    pub fn write_only(create: bool) -> Self {
        Self::new().write(true).create(create).truncate(true)
    }

    /// Sets read access.
    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Sets write access.
    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Sets whether a missing file is created.
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Sets append mode.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Sets truncation on open.
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Returns true if any flag asks for modification.
    pub fn wants_write(&self) -> bool {
        self.write || self.create || self.append || self.truncate
    }

    pub(crate) fn to_std(self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .create(self.create)
            .append(self.append)
            .truncate(self.truncate);
        options
    }
}

/// Limits applied while indexing an archive and buffering its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Maximum number of entries an archive may list.
    pub max_entries: usize,
    /// Maximum uncompressed size of a single entry opened for reading.
    pub max_entry_size: u64,
}

impl Default for ArchiveLimits {
    /// Creates limits with the following default values:
    ///
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_entries` | 1,000,000 |
    /// | `max_entry_size` | 256 MiB |
    ///
    /// Use [`ArchiveLimits::unlimited()`] to disable both.
    fn default() -> Self {
        Self {
            max_entries: 1_000_000,
            max_entry_size: 256 << 20,
        }
    }
}

impl ArchiveLimits {
    /// Creates limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates limits with no restrictions.
    pub fn unlimited() -> Self {
        Self {
            max_entries: usize::MAX,
            max_entry_size: u64::MAX,
        }
    }

    /// Sets the maximum number of entries.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Sets the maximum entry size.
    pub fn max_entry_size(mut self, max: u64) -> Self {
        self.max_entry_size = max;
        self
    }

    pub(crate) fn check_entries(&self, count: usize) -> Result<()> {
        if count > self.max_entries {
            return Err(Error::ResourceLimitExceeded(format!(
                "too many archive entries: {} (limit {})",
                count, self.max_entries
            )));
        }
        Ok(())
    }

    pub(crate) fn check_entry_size(&self, name: &str, size: u64) -> Result<()> {
        if size > self.max_entry_size {
            return Err(Error::ResourceLimitExceeded(format!(
                "entry {} is {} bytes (limit {})",
                name, size, self.max_entry_size
            )));
        }
        Ok(())
    }
}
