use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use super::RangeReader;
use crate::error::IoError;

/// Local-file implementation of RangeReader.
///
/// Holds one open handle for its lifetime. The file size is taken once on
/// open; bundle files are static so it never changes underneath the reader.
/// The handle is released when the reader is dropped, on every exit path.
#[derive(Debug)]
pub struct FileRangeReader {
    file: File,
    size: u64,
    identifier: String,
}

impl FileRangeReader {
    /// Open a file for range reads.
    ///
    /// Returns `IoError::NotFound` if the file does not exist; any other
    /// failure (permissions, a directory in its place) is `IoError::Io`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let identifier = path.display().to_string();

        let file = File::open(path).map_err(|e| IoError::from_std(identifier.as_str(), e))?;
        let size = file
            .metadata()
            .map_err(|e| IoError::from_std(identifier.as_str(), e))?
            .len();

        Ok(Self {
            file,
            size,
            identifier,
        })
    }
}

impl RangeReader for FileRangeReader {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        let end = offset.checked_add(len as u64);
        if end.map_or(true, |end| end > self.size) {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.size,
            });
        }

        if len == 0 {
            return Ok(Bytes::new());
        }

        // `&File` implements Read + Seek, so a shared reader can still seek
        let mut handle = &self.file;
        handle
            .seek(SeekFrom::Start(offset))
            .map_err(|e| IoError::from_std(self.identifier.as_str(), e))?;

        let mut buf = vec![0u8; len];
        handle
            .read_exact(&mut buf)
            .map_err(|e| IoError::from_std(self.identifier.as_str(), e))?;

        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
