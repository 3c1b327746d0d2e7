//! Storage reference behavior across both backends.
//!
//! Each scenario is run against a directory pack and an equivalent archive
//! pack where the backends are expected to agree.

mod common;

use std::io::Read;

use resvfs::{
    ArchiveCache, ArchiveLimits, EntryKind, Error, FileType, OpenOptions, Path, StorageRef,
};
use tempfile::TempDir;

const PACK: &[(&str, &[u8])] = &[
    ("pack.mcmeta", b"{\"pack\":{}}"),
    ("assets/mod/lang/en_us.json", b"{\"a\":\"b\"}"),
    ("assets/mod/lang/de_de.json", b"{}"),
    ("assets/mod/textures/block.png", b"png"),
];

fn both_backends() -> (TempDir, StorageRef, StorageRef) {
    let dir = common::create_dir_pack(PACK);
    let dir_ref = StorageRef::dir(dir.path()).unwrap();
    let zip_ref = common::archive_storage("/packs/pack.zip", common::create_zip(PACK));
    (dir, dir_ref, zip_ref)
}

fn sorted_children(storage: &StorageRef) -> Vec<(String, EntryKind)> {
    let mut children: Vec<_> = storage
        .read_dir()
        .unwrap()
        .into_iter()
        .map(|e| (e.name().to_string(), e.kind()))
        .collect();
    children.sort_by(|a, b| a.0.cmp(&b.0));
    children
}

fn relative_listing(storage: &StorageRef) -> Vec<(String, EntryKind)> {
    storage
        .read_dir_recursive()
        .unwrap()
        .into_iter()
        .map(|e| {
            let rel = e.storage().path().strip_prefix(storage.path());
            (rel.as_str().to_string(), e.kind())
        })
        .collect()
}

// =============================================================================
// Backend parity
// =============================================================================

#[test]
fn test_backends_agree_on_queries() {
    let (_tmp, dir, zip) = both_backends();

    for storage in [&dir, &zip] {
        assert!(storage.is_dir(), "{}", storage);
        assert!(storage.join("pack.mcmeta").is_file());
        assert!(storage.join("assets/mod").is_dir());
        assert!(!storage.join("assets/mod").is_file());
        assert!(!storage.join("assets/mo").is_dir());
        assert!(!storage.join("missing.txt").exists());
        assert!(!storage.join("pack.mcmeta").is_link());
    }
}

#[test]
fn test_backends_agree_on_read_dir() {
    let (_tmp, dir, zip) = both_backends();

    let expected = vec![
        ("assets".to_string(), EntryKind::Dir),
        ("pack.mcmeta".to_string(), EntryKind::File),
    ];
    assert_eq!(sorted_children(&dir), expected);
    assert_eq!(sorted_children(&zip), expected);

    let lang_dir = sorted_children(&dir.join("assets/mod/lang"));
    let lang_zip = sorted_children(&zip.join("assets/mod/lang"));
    assert_eq!(lang_dir, lang_zip);
    assert_eq!(lang_zip.len(), 2);
}

#[test]
fn test_backends_agree_on_recursive_listing() {
    let (_tmp, dir, zip) = both_backends();

    let from_dir = relative_listing(&dir);
    let from_zip = relative_listing(&zip);
    assert_eq!(from_dir, from_zip);

    let names: Vec<&str> = from_zip.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "assets",
            "pack.mcmeta",
            "assets/mod",
            "assets/mod/lang",
            "assets/mod/textures",
            "assets/mod/lang/de_de.json",
            "assets/mod/lang/en_us.json",
            "assets/mod/textures/block.png",
        ]
    );
}

#[test]
fn test_missing_location_lists_nothing() {
    let (_tmp, dir, zip) = both_backends();

    for storage in [&dir, &zip] {
        assert!(storage.join("nope").read_dir().unwrap().is_empty());
        assert!(storage.join("nope").read_dir_recursive().unwrap().is_empty());
        assert!(storage.join("pack.mcmeta").read_dir().unwrap().is_empty());
    }
}

#[test]
fn test_open_reads_entry_bytes() {
    let (_tmp, dir, zip) = both_backends();

    for storage in [&dir, &zip] {
        let mut stream = storage.join("assets/mod/lang/en_us.json").open().unwrap();
        let mut text = String::new();
        stream.read_to_string(&mut text).unwrap();
        assert_eq!(text, "{\"a\":\"b\"}");
    }
}

#[test]
fn test_open_missing_entry_is_backend_error() {
    let (_tmp, dir, zip) = both_backends();

    for storage in [&dir, &zip] {
        let err = storage.join("nope.json").open().unwrap_err();
        assert!(err.is_not_found(), "{}: {:?}", storage, err);
        assert!(err.is_backend_error());
    }
}

// =============================================================================
// Archive specifics
// =============================================================================

#[test]
fn test_single_deep_file_synthesizes_each_directory_once() {
    let zip = common::archive_storage("/packs/deep.zip", common::create_zip_names(&["a/b/c.txt"]));

    let listing = relative_listing(&zip);
    assert_eq!(
        listing,
        vec![
            ("a".to_string(), EntryKind::Dir),
            ("a/b".to_string(), EntryKind::Dir),
            ("a/b/c.txt".to_string(), EntryKind::File),
        ]
    );
}

#[test]
fn test_shared_prefix_is_listed_once() {
    let zip = common::archive_storage(
        "/packs/shared.zip",
        common::create_zip_names(&["a/c.txt", "a/b/d.txt"]),
    );

    let names: Vec<String> = relative_listing(&zip).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["a", "a/b", "a/c.txt", "a/b/d.txt"]);
    assert_eq!(sorted_children(&zip), vec![("a".to_string(), EntryKind::Dir)]);
}

#[test]
fn test_recursive_listing_below_inner_path() {
    let zip = common::archive_storage("/packs/pack.zip", common::create_zip(PACK));
    let lang = zip.join("/assets/mod/lang");

    let names: Vec<String> = relative_listing(&lang).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["de_de.json", "en_us.json"]);
}

#[test]
fn test_explicit_directory_records() {
    let zip = common::archive_storage(
        "/packs/explicit.zip",
        common::create_zip(&[("empty/", b""), ("lang/", b""), ("lang/en_us.json", b"{}")]),
    );

    assert!(zip.join("empty").is_dir());
    assert!(zip.join("empty").read_dir().unwrap().is_empty());
    let names: Vec<String> = relative_listing(&zip).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["empty", "lang", "lang/en_us.json"]);
}

#[test]
fn test_archive_is_read_only() {
    let zip = common::archive_storage("/packs/pack.zip", common::create_zip(PACK));
    let entry = zip.join("pack.mcmeta");

    assert!(entry.read_only());
    assert!(entry.remove(false).unwrap_err().is_unsupported());
    assert!(zip.join("new").create_dir(false).unwrap_err().is_unsupported());
    let err = entry.open_with(&OpenOptions::write_only(false)).unwrap_err();
    assert!(err.is_unsupported());
    assert!(!err.is_backend_error());
}

#[test]
fn test_join_and_parent_stay_in_archive() {
    let zip = common::archive_storage("/packs/pack.zip", common::create_zip(PACK));
    let en = zip.join("assets/mod/lang/en_us.json");

    assert!(en.is_archive());
    assert_eq!(en.archive_path(), Some(&Path::new("/packs/pack.zip")));
    assert_eq!(en.path(), &Path::new("/assets/mod/lang/en_us.json"));

    let lang = en.parent().unwrap();
    assert_eq!(lang.file_type(), FileType::Language);
    assert_eq!(en.file_type(), FileType::LanguagePart);
    assert_eq!(lang.join("../../..").parent(), None);
    assert_eq!(zip.file_name(), Some("pack.zip"));
}

#[test]
fn test_malformed_archive_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.zip");
    std::fs::write(&path, b"PK\x03\x04 definitely not a zip").unwrap();

    let err = StorageRef::open_archive(&path).unwrap_err();
    assert!(err.is_backend_error());
    assert!(!err.is_unsupported());
}

#[test]
fn test_entry_count_limit() {
    let tmp = TempDir::new().unwrap();
    let path = common::write_zip(tmp.path(), "many.zip", PACK);

    let limits = ArchiveLimits::new().max_entries(2);
    let err = StorageRef::open_archive_with_limits(&path, &limits).unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));

    assert!(StorageRef::open_archive_with_limits(&path, &ArchiveLimits::unlimited()).is_ok());
}

#[test]
fn test_cached_opens_share_index() {
    let tmp = TempDir::new().unwrap();
    let path = common::write_zip(tmp.path(), "pack.zip", PACK);

    let mut cache = ArchiveCache::default();
    let first = StorageRef::open_archive_cached(&mut cache, &path).unwrap();
    let second = StorageRef::open_archive_cached(&mut cache, &path).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

// =============================================================================
// Directory specifics
// =============================================================================

#[test]
fn test_directory_remove_and_create() {
    let (tmp, dir, _zip) = both_backends();

    let assets = dir.join("assets");
    assert!(assets.remove(false).is_err());
    assets.remove(true).unwrap();
    assert!(!assets.exists());
    assert!(!tmp.path().join("assets").exists());

    let err = assets.remove(true).unwrap_err();
    assert!(err.is_not_found());

    let nested = dir.join("a/b/c");
    nested.create_dir(true).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn test_directory_open_for_write() {
    let (_tmp, dir, _zip) = both_backends();
    let target = dir.join("notes.txt");

    {
        use std::io::Write;
        let mut stream = target.open_with(&OpenOptions::write_only(true)).unwrap();
        assert!(stream.is_writable());
        stream.write_all(b"hello").unwrap();
    }

    assert_eq!(target.open().unwrap().read_to_vec().unwrap(), b"hello");
}
