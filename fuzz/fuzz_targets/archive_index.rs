//! Fuzz target for indexing arbitrary bytes as a ZIP/JAR archive.
//!
//! Run with: cargo +nightly fuzz run archive_index
//!
//! Malformed input must be rejected with an error, never a panic. Anything
//! that indexes must list and mirror cleanly.

#![no_main]

use std::io::{Cursor, Read};
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;
use resvfs::{ArchiveIndex, ArchiveLimits, NoTreeEvents, StorageRef, TreeCache};

fuzz_target!(|data: &[u8]| {
    let limits = ArchiveLimits::new().max_entries(4096).max_entry_size(1 << 20);
    let Ok(index) = ArchiveIndex::from_reader("/fuzz.zip", Cursor::new(data.to_vec()), &limits)
    else {
        return;
    };

    let root = StorageRef::archive_root(Rc::new(index));
    let Ok(listing) = root.read_dir_recursive() else {
        return;
    };

    for entry in listing.iter().take(64) {
        if entry.is_file() {
            if let Ok(mut stream) = entry.storage().open() {
                let mut sink = Vec::new();
                let _ = stream.read_to_end(&mut sink);
            }
        }
    }

    let mut tree = TreeCache::new(root);
    let root_id = tree.root();
    if tree.refresh(root_id, &mut NoTreeEvents).is_ok() {
        assert!(tree.len() <= listing.len() + 1);
    }
});
