//! Shared test utilities for integration tests.
//!
//! Fixture packs are built on the fly: ZIP archives with `zip::ZipWriter`,
//! directory packs inside a `tempfile::TempDir`.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use resvfs::{ArchiveIndex, ArchiveLimits, NodeId, StorageRef, TreeCache};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builds an in-memory ZIP archive.
///
/// Names ending in `/` become explicit directory records; everything else is
/// a deflated file holding `data`.
pub fn create_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in entries {
        if let Some(dir) = name.strip_suffix('/') {
            zip.add_directory(dir, options).expect("add directory");
        } else {
            zip.start_file(*name, options).expect("start file");
            zip.write_all(data).expect("write file");
        }
    }

    zip.finish().expect("finish zip").into_inner()
}

/// Same as [`create_zip`] with every file holding `{}`.
pub fn create_zip_names(names: &[&str]) -> Vec<u8> {
    let entries: Vec<(&str, &[u8])> = names.iter().map(|n| (*n, b"{}" as &[u8])).collect();
    create_zip(&entries)
}

/// Writes an archive into `dir` and returns its path.
pub fn write_zip(dir: &Path, file_name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, create_zip(entries)).expect("write zip");
    path
}

/// Opens an in-memory archive as a storage root.
pub fn archive_storage(identity: &str, bytes: Vec<u8>) -> StorageRef {
    let index = ArchiveIndex::from_reader(identity, Cursor::new(bytes), &ArchiveLimits::default())
        .expect("index archive");
    StorageRef::archive_root(Rc::new(index))
}

/// Creates a temporary directory pack. Names ending in `/` become
/// directories; files are created with their parents.
pub fn create_dir_pack(entries: &[(&str, &[u8])]) -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    for (name, data) in entries {
        let path = tmp.path().join(name.trim_end_matches('/'));
        if name.ends_with('/') {
            fs::create_dir_all(&path).expect("create dir");
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent");
            }
            fs::write(&path, data).expect("write file");
        }
    }
    tmp
}

/// Names of the children of `id`, in order.
pub fn child_names(tree: &TreeCache, id: NodeId) -> Vec<String> {
    tree[id]
        .children()
        .iter()
        .map(|&c| tree[c].name().to_string())
        .collect()
}

/// Every node below the root as an indented line, for whole-tree asserts.
pub fn render(tree: &TreeCache) -> Vec<String> {
    tree.walk(tree.root())
        .into_iter()
        .skip(1)
        .map(|(depth, id)| format!("{}{}", "  ".repeat(depth - 1), tree[id].name()))
        .collect()
}
