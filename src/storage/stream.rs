//! Byte streams returned by [`StorageRef::open`](super::StorageRef::open).

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// An open entry.
///
/// Directory-backed entries are real file handles and may be written when
/// opened for writing. Archive-backed entries are decompressed into memory
/// when opened and are read-only.
#[derive(Debug)]
pub enum EntryStream {
    /// A real file.
    File(File),
    /// The decompressed contents of an archive entry.
    Archive(Cursor<Vec<u8>>),
}

impl EntryStream {
    /// Returns true if the stream accepts writes.
    pub fn is_writable(&self) -> bool {
        matches!(self, EntryStream::File(_))
    }

    /// Reads the remaining contents into a vector.
    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for EntryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntryStream::File(file) => file.read(buf),
            EntryStream::Archive(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for EntryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            EntryStream::File(file) => file.seek(pos),
            EntryStream::Archive(cursor) => cursor.seek(pos),
        }
    }
}

impl Write for EntryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EntryStream::File(file) => file.write(buf),
            EntryStream::Archive(_) => Err(read_only_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EntryStream::File(file) => file.flush(),
            EntryStream::Archive(_) => Ok(()),
        }
    }
}

fn read_only_error() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "archive entries are read-only")
}
