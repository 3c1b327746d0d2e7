//! Fuzz target for the lexical path algebra.
//!
//! Run with: cargo +nightly fuzz run path_components
//!
//! Properties checked on every input:
//! - normalization is idempotent
//! - forward and backward iteration yield the same components
//! - `parent` joined with `file_name` reproduces the path
//! - `strip_prefix` undoes `join`

#![no_main]

use libfuzzer_sys::fuzz_target;
use resvfs::{Component, Path};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let path = Path::new(raw);
    assert_eq!(Path::new(path.as_str()), path);

    let forward: Vec<Component<'_>> = path.components().collect();
    let mut backward: Vec<Component<'_>> = path.components().rev().collect();
    backward.reverse();
    assert_eq!(forward, backward);

    if let Some(name) = path.file_name() {
        assert_eq!(path.parent().join(name), path);
    }

    let base = path.parent();
    if !base.is_null() {
        let rel = path.strip_prefix(&base);
        assert!(!rel.is_null());
        assert_eq!(base.join(&rel), path);
    }
});
