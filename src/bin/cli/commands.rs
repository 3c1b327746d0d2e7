//! Command implementations for the CLI tool.

use std::io::{self, Write};
use std::path::Path;

use resvfs::{Error, NoTreeEvents, Result, StorageRef, TreeCache};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;

/// Opens a pack: regular files are read as ZIP/JAR archives, anything else
/// as a directory.
pub fn open_pack(path: &Path) -> Result<StorageRef> {
    if path.is_file() {
        StorageRef::open_archive(path)
    } else if path.is_dir() {
        StorageRef::dir(path)
    } else {
        Err(Error::entry_not_found(path.display().to_string()))
    }
}

/// Tree command implementation
pub fn tree(pack: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let storage = match open_pack(pack) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let mut tree = TreeCache::new(storage);
    let summary = match tree.refresh(tree.root(), &mut NoTreeEvents) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    print!("{}", formatter.format_tree(&tree, &summary));

    if summary.is_complete() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

/// Ls command implementation
pub fn ls(pack: &Path, inner: Option<&str>, recursive: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let storage = match open_pack(pack) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };
    let target = match inner {
        Some(inner) => storage.join(inner),
        None => storage,
    };

    if !target.exists() {
        eprintln!("Error: {} does not exist", target);
        return ExitCode::NotFound;
    }

    let listing = if recursive {
        target.read_dir_recursive()
    } else {
        target.read_dir().map(|mut entries| {
            entries.sort_by(|a, b| a.name().cmp(b.name()));
            entries
        })
    };

    match listing {
        Ok(entries) => {
            print!("{}", formatter.format_listing(&entries));
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Cat command implementation
pub fn cat(pack: &Path, inner: &str) -> ExitCode {
    let storage = match open_pack(pack) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let mut stream = match storage.join(inner).open() {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = io::copy(&mut stream, &mut out).and_then(|_| out.flush()) {
        eprintln!("Error writing output: {}", e);
        return ExitCode::IoError;
    }

    ExitCode::Success
}

fn report(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_pack_dispatch() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("pack")).unwrap();
        fs::write(tmp.path().join("not-a-zip.zip"), b"garbage").unwrap();

        let dir = open_pack(&tmp.path().join("pack")).unwrap();
        assert!(!dir.is_archive());

        let err = open_pack(&tmp.path().join("not-a-zip.zip")).unwrap_err();
        assert_eq!(error_to_exit_code(&err), ExitCode::BadArchive);

        let err = open_pack(&tmp.path().join("missing")).unwrap_err();
        assert_eq!(error_to_exit_code(&err), ExitCode::NotFound);
    }

    #[test]
    fn test_ls_missing_inner_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let code = ls(tmp.path(), Some("nope"), false, OutputFormat::Json);
        assert_eq!(code, ExitCode::NotFound);
    }
}
