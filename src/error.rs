//! Error types for storage and tree operations.
//!
//! This module provides the [`Error`] enum, which represents every failure
//! mode of the storage backends and the tree cache, along with the
//! [`Result<T>`] type alias.
//!
//! # Absence is not an error
//!
//! Queries and listings never fail because something is missing: asking for
//! the children of a vanished directory yields an empty list, and `is_file` on
//! a missing entry is simply `false`. Errors are reserved for:
//!
//! | Class | Variants | Typical Cause |
//! |-------|----------|---------------|
//! | Backend | [`Io`][Error::Io], [`InvalidArchive`][Error::InvalidArchive], [`EntryNotFound`][Error::EntryNotFound], [`ResourceLimitExceeded`][Error::ResourceLimitExceeded] | Malformed archive, unreadable directory, opening a missing entry |
//! | Unsupported | [`Unsupported`][Error::Unsupported] | Deleting or writing inside an archive |
//! | Input | [`InvalidPath`][Error::InvalidPath] | Path not representable by the backend |
//!
//! # Example
//!
//! ```rust,no_run
//! use resvfs::{Error, StorageRef};
//!
//! fn delete(storage: &StorageRef) -> resvfs::Result<()> {
//!     match storage.remove(true) {
//!         Err(Error::Unsupported { operation }) => {
//!             eprintln!("cannot {} inside an archive", operation);
//!             Ok(())
//!         }
//!         other => other,
//!     }
//! }
//! ```

use std::io;

/// The main error type for storage and tree operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred on the real filesystem or while reading an
    /// archive stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive could not be indexed or one of its entries is malformed.
    #[error("Invalid archive {archive}: {reason}")]
    InvalidArchive {
        /// Identity of the archive (usually its filesystem path).
        archive: String,
        /// What went wrong.
        reason: String,
    },

    /// An entry was opened that does not exist.
    ///
    /// Listings and type queries never produce this error; they report
    /// absence as an empty result instead.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The path that was requested.
        path: String,
    },

    /// The backend does not support the requested operation.
    ///
    /// Archive-backed references are read-only, so deleting, creating
    /// directories or opening for writing all report this error.
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// An archive exceeded the configured [`ArchiveLimits`](crate::ArchiveLimits).
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// A path cannot be represented by the backend.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl Error {
    /// Returns `true` for the backend error class: malformed archives, I/O
    /// failures and unreadable entries.
    ///
    /// The tree cache reports these as a refresh abort for the affected
    /// subtree only.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::InvalidArchive { .. }
                | Error::EntryNotFound { .. }
                | Error::ResourceLimitExceeded(_)
        )
    }

    /// Returns `true` if the operation is not supported by the backend.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported { .. })
    }

    /// Returns `true` if the error means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::EntryNotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Creates an [`Error::InvalidArchive`].
    pub fn invalid_archive(archive: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArchive {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::EntryNotFound`].
    pub fn entry_not_found(path: impl Into<String>) -> Self {
        Error::EntryNotFound { path: path.into() }
    }

    /// Maps a ZIP library error for the archive named `archive`.
    pub(crate) fn from_zip(archive: &str, error: zip::result::ZipError) -> Self {
        use zip::result::ZipError;

        match error {
            ZipError::Io(e) => Error::Io(e),
            ZipError::FileNotFound => Error::entry_not_found(archive),
            other => Error::invalid_archive(archive, other.to_string()),
        }
    }
}

/// A specialized Result type for storage and tree operations.
pub type Result<T> = std::result::Result<T, Error>;
