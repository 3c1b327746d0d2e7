//! Canonical ordering and directory synthesis for recursive listings.
//!
//! Recursive listings are flattened into a single sequence that the tree
//! cache replays in one pass. The order is breadth-first by depth; inside a
//! depth, entries compare component by component, so every directory's
//! children form one contiguous run sorted by name and each directory is
//! listed before any of its descendants.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::EntryKind;

/// One entry of a flattened listing, relative to the listing root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlatEntry {
    /// Normalized relative key, components joined by `/`.
    pub rel: String,
    pub kind: EntryKind,
}

fn depth(key: &str) -> usize {
    key.split('/').count()
}

/// Compares two relative keys in canonical listing order.
pub(crate) fn canonical_cmp(a: &str, b: &str) -> Ordering {
    depth(a)
        .cmp(&depth(b))
        .then_with(|| a.split('/').cmp(b.split('/')))
}

/// Sorts `entries` into canonical listing order.
pub(crate) fn sort_canonical(entries: &mut [FlatEntry]) {
    entries.sort_by(|a, b| canonical_cmp(&a.rel, &b.rel));
}

/// Builds a flattened listing from raw archive names.
///
/// Every ancestor directory of an entry is emitted exactly once, even when no
/// explicit directory entry exists for it. A name that is both listed as a
/// file and has descendants is reported as a directory. Duplicate names keep
/// their first occurrence.
pub(crate) fn synthesize<'a, I>(entries: I) -> Vec<FlatEntry>
where
    I: IntoIterator<Item = (&'a str, EntryKind)>,
{
    let mut out: Vec<FlatEntry> = Vec::new();
    let mut seen: HashMap<&'a str, usize> = HashMap::new();

    for (rel, kind) in entries {
        if rel.is_empty() {
            continue;
        }

        let mut missing = Vec::new();
        let mut cursor = rel;
        while let Some(split) = cursor.rfind('/') {
            cursor = &cursor[..split];
            if let Some(&index) = seen.get(cursor) {
                // every ancestor of an emitted entry has been emitted too
                out[index].kind = EntryKind::Dir;
                break;
            }
            missing.push(cursor);
        }

        for dir in missing.into_iter().rev() {
            seen.insert(dir, out.len());
            out.push(FlatEntry {
                rel: dir.to_string(),
                kind: EntryKind::Dir,
            });
        }

        match seen.get(rel) {
            Some(&index) => {
                if kind == EntryKind::Dir {
                    out[index].kind = EntryKind::Dir;
                }
            }
            None => {
                seen.insert(rel, out.len());
                out.push(FlatEntry {
                    rel: rel.to_string(),
                    kind,
                });
            }
        }
    }

    sort_canonical(&mut out);
    out
}
