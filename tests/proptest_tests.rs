//! Property-based tests using proptest.
//!
//! These tests verify the laws of the path algebra, the grouping invariant of
//! recursive listings, and node identity across refreshes using randomly
//! generated inputs.

mod common;

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use resvfs::{NoTreeEvents, Path, StorageRef, TreeCache};

/// Strategy for a single normal path segment.
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,7}".prop_filter("must be a normal segment", |s| {
        s != "." && s != ".."
    })
}

/// Strategy for a relative path of 1-4 normal segments.
fn relative_path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment_strategy(), 1..5).prop_map(|parts| parts.join("/"))
}

/// Strategy for archive entry names: up to three directory levels drawn
/// from a small alphabet, then a file name. Directory and file names never
/// collide because only file names carry an extension.
fn entry_name_strategy() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..4),
        prop::sample::select(vec!["x.json", "y.txt", "z.png"]),
    )
        .prop_map(|(dirs, file)| {
            let mut parts = dirs;
            parts.push(file);
            parts.join("/")
        })
}

fn entry_set_strategy() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set(entry_name_strategy(), 1..24)
}

fn archive(names: &BTreeSet<String>) -> StorageRef {
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    common::archive_storage("/packs/prop.zip", common::create_zip_names(&refs))
}

/// Path of every node below the root, keyed to its handle.
fn node_paths(tree: &TreeCache) -> HashMap<String, resvfs::NodeId> {
    tree.walk(tree.root())
        .into_iter()
        .skip(1)
        .map(|(_, id)| (tree[id].storage().path().as_str().to_string(), id))
        .collect()
}

proptest! {
    /// Removing and re-appending the file name is the identity.
    #[test]
    fn parent_join_file_name(path in relative_path_strategy(), absolute in any::<bool>()) {
        let raw = if absolute { format!("/{}", path) } else { path };
        let p = Path::new(&raw);
        let name = p.file_name().unwrap().to_string();

        prop_assert_eq!(p.parent().join(name.as_str()), p);
    }

    /// `strip_prefix` undoes `join`.
    #[test]
    fn strip_prefix_inverts_join(
        base in relative_path_strategy(),
        rel in relative_path_strategy(),
        absolute in any::<bool>()
    ) {
        let base = if absolute { Path::new(format!("/{}", base)) } else { Path::new(base) };
        let rel = Path::new(rel);

        let joined = base.join(&rel);
        prop_assert!(joined.starts_with(&base));
        prop_assert!(joined.ends_with(&rel));
        prop_assert_eq!(joined.strip_prefix(&base), rel);
    }

    /// A prefix that does not end on a component boundary never strips.
    #[test]
    fn partial_segment_is_not_a_prefix(
        dir in segment_strategy(),
        suffix in "[a-z]{1,4}",
        rest in relative_path_strategy()
    ) {
        let path = Path::new(format!("/{}{}/{}", dir, suffix, rest));
        let base = Path::new(format!("/{}", dir));

        prop_assert!(path.strip_prefix(&base).is_null());
        prop_assert!(!path.starts_with(&base));
    }

    /// Peeking never advances the cursor, from either end.
    #[test]
    fn peek_is_idempotent(raw in "[a-z./]{0,16}") {
        let path = Path::new(&raw);
        let mut components = path.components();

        loop {
            let front = components.peek();
            prop_assert_eq!(components.peek(), front);
            let back = components.peek_back();
            prop_assert_eq!(components.peek_back(), back);
            if front.is_none() {
                prop_assert!(back.is_none());
                break;
            }
            components.advance(1);
        }
    }

    /// Recursive archive listings keep each directory's children in one
    /// contiguous, name-sorted group, placed after the directory itself, and
    /// list every synthesized directory exactly once.
    #[test]
    fn recursive_listing_groups_are_contiguous(names in entry_set_strategy()) {
        let root = archive(&names);
        let listing = root.read_dir_recursive().unwrap();

        let mut seen_paths = BTreeSet::new();
        let mut closed_groups = BTreeSet::new();
        let mut current: Option<Path> = None;
        let mut last_name: Option<String> = None;

        for entry in &listing {
            let path = entry.storage().path().clone();
            prop_assert!(seen_paths.insert(path.clone()), "{} listed twice", path);

            let parent = path.parent();
            if current.as_ref() != Some(&parent) {
                if let Some(done) = current.take() {
                    closed_groups.insert(done);
                }
                prop_assert!(!closed_groups.contains(&parent), "group {} reopened", parent);
                prop_assert!(
                    parent == Path::root() || seen_paths.contains(&parent),
                    "{} listed before its directory",
                    path
                );
                current = Some(parent);
                last_name = None;
            }

            let name = entry.name().to_string();
            if let Some(previous) = &last_name {
                prop_assert!(previous.as_str() < name.as_str());
            }
            last_name = Some(name);
        }

        for name in &names {
            prop_assert!(seen_paths.contains(&Path::root().join(name.as_str())));
        }
    }

    /// After any refresh each node's children are exactly the backend's
    /// children, sorted, and nodes that survive keep their handle.
    #[test]
    fn refresh_preserves_identity(
        before in entry_set_strategy(),
        after in entry_set_strategy()
    ) {
        let mut tree = TreeCache::new(archive(&before));
        tree.refresh(tree.root(), &mut NoTreeEvents).unwrap();
        let old = node_paths(&tree);

        let next = archive(&after);
        let StorageRef::Archive(index) = &next else {
            unreachable!("archive_storage returns an archive root");
        };
        tree.rebind_archive(index.index());
        tree.refresh(tree.root(), &mut NoTreeEvents).unwrap();
        let new = node_paths(&tree);

        for (_, id) in tree.walk(tree.root()) {
            let mut expected: Vec<String> = tree[id]
                .storage()
                .read_dir()
                .unwrap()
                .into_iter()
                .map(|e| e.name().to_string())
                .collect();
            expected.sort();
            prop_assert_eq!(common::child_names(&tree, id), expected);
        }

        for (path, id) in &new {
            if let Some(previous) = old.get(path) {
                prop_assert_eq!(previous, id, "{} was recreated", path);
            } else {
                prop_assert!(!old.values().any(|o| o == id));
            }
        }
        for (path, id) in &old {
            if !new.contains_key(path) {
                prop_assert!(!tree.contains(*id), "{} should be gone", path);
            }
        }
    }
}
