//! # resvfs
//!
//! A virtual filesystem and incremental tree cache for resource packs.
//!
//! Resource packs ship either as plain directories or as ZIP/JAR archives.
//! This crate lets an editor treat both the same way: one path algebra, one
//! storage reference type with identical semantics over either backend, and a
//! cached tree that mirrors a pack's hierarchy and reports, on each refresh,
//! exactly which children appeared or disappeared.
//!
//! ## Quick Start
//!
//! ### Listing a Pack
//!
//! ```rust,no_run
//! use resvfs::{Result, StorageRef};
//!
//! fn main() -> Result<()> {
//!     // Directory or archive, the API is the same
//!     let pack = StorageRef::open_archive("MyPack.zip")?;
//!
//!     for entry in pack.read_dir_recursive()? {
//!         println!("{} [{}]", entry.storage().path(), entry.storage().file_type());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Mirroring a Tree
//!
//! ```rust,no_run
//! use resvfs::{EventLog, NoTreeEvents, Result, StorageRef, TreeCache};
//!
//! fn main() -> Result<()> {
//!     let mut tree = TreeCache::new(StorageRef::dir("resourcepacks/MyPack")?);
//!
//!     // First refresh discovers everything
//!     tree.refresh(tree.root(), &mut NoTreeEvents)?;
//!
//!     // Later refreshes only report what changed
//!     let mut events = EventLog::new();
//!     let summary = tree.refresh(tree.root(), &mut events)?;
//!     println!("+{} -{}", summary.inserted, summary.removed);
//!     Ok(())
//! }
//! ```
//!
//! ## Paths
//!
//! [`Path`] is a normalized, `/`-separated path with three distinguished
//! states: null (no path at all, the result of a failed
//! [`Path::strip_prefix`]), empty, and non-empty. Paths are values; storage
//! backends translate them to filesystem paths or archive entry names.
//!
//! ```rust
//! use resvfs::Path;
//!
//! let file = Path::new("assets/minecraft/lang/en_us.json");
//! assert_eq!(file.parent(), Path::new("assets/minecraft/lang"));
//! assert_eq!(file.file_stem(), Some("en_us"));
//! assert!(file.strip_prefix(&Path::new("textures")).is_null());
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Absence is not an error:
//! listing a missing directory yields no entries and type queries on a
//! missing entry return `false`. Opening a missing entry, reading a
//! malformed archive, or asking an archive to change its contents fails.
//!
//! ```rust,no_run
//! use resvfs::StorageRef;
//!
//! fn delete(storage: &StorageRef) -> resvfs::Result<()> {
//!     match storage.remove(true) {
//!         Err(e) if e.is_unsupported() => {
//!             eprintln!("{} is read-only", storage);
//!             Ok(())
//!         }
//!         other => other,
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Threading
//!
//! Archive indices are shared through `Rc` and the tree cache is not `Sync`.
//! Everything is meant to be driven from a single (UI) thread.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod file_type;
pub mod options;
pub mod path;
pub mod storage;
pub mod tree;
pub mod workspace;

pub use error::{Error, Result};
pub use file_type::FileType;
pub use options::{ArchiveLimits, OpenOptions};
pub use path::{Component, Components, Path};

// Re-export storage API at crate root for convenience
pub use storage::{
    ArchiveCache, ArchiveIndex, ArchiveRef, DirEntry, DirRef, EntryKind, EntryStream, StorageRef,
};

// Re-export tree API
pub use tree::{
    EventLog, NoTreeEvents, Node, NodeId, NodeState, RefreshSummary, TreeCache,
    TreeChangeSubscriber, TreeEvent,
};

pub use workspace::{Workspace, WorkspaceRoot};
