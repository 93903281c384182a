//! Byte sources and binary parsing primitives.
//!
//! This module abstracts over where class file and archive bytes come from and provides the
//! bounds-checked readers every decoder in the crate is built upon.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - Cheaply clonable handle over a byte backend
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//! - [`crate::file::parser::Parser`] - Cursor-based big-endian reader
//! - [`crate::file::io`] - Primitive big-endian decoding
//! - [`crate::file::physical::Physical`] - Memory-mapped file backend for disk access
//! - [`crate::file::memory::Memory`] - In-memory buffer backend
//!
//! # Examples
//!
//! ```rust
//! use classpool::File;
//!
//! let file = File::from_mem(vec![0xCA, 0xFE, 0xBA, 0xBE])?;
//! assert_eq!(file.len(), 4);
//! assert_eq!(file.data_slice(0, 2)?, &[0xCA, 0xFE]);
//! # Ok::<(), classpool::Error>(())
//! ```

pub mod io;
pub mod memory;
pub mod parser;
pub mod physical;

use std::{fmt, path::Path, sync::Arc};

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// Implementations provide read access to an immutable byte buffer, either mapped from disk
/// or held in memory.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded, immutable byte source.
///
/// `File` is a cheap, clonable handle around a [`Backend`]; clones share the same mapping or
/// buffer. It implements `AsRef<[u8]>`, so it can be wrapped in a [`std::io::Cursor`] and
/// handed to readers that need `Read + Seek`, such as the jar reader used by
/// [`crate::locator::ArchiveLocator`].
#[derive(Clone)]
pub struct File {
    backend: Arc<dyn Backend>,
}

impl File {
    /// Memory-map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped and
    /// [`crate::Error::Empty`] for zero-length files.
    pub fn from_file(path: &Path) -> Result<File> {
        Self::load(Physical::new(path)?)
    }

    /// Take ownership of an in-memory buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Memory::new(data))
    }

    fn load<T: Backend + 'static>(backend: T) -> Result<File> {
        if backend.len() == 0 {
            return Err(Empty);
        }

        Ok(File {
            backend: Arc::new(backend),
        })
    }

    /// Returns the total length of the loaded data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns true if the file holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }

    /// Returns the complete data buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.backend.data()
    }

    /// Returns a bounds-checked slice of the data.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the data.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.backend.data_slice(offset, len)
    }
}

impl AsRef<[u8]> for File {
    fn as_ref(&self) -> &[u8] {
        self.backend.data()
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Seek, SeekFrom};

    use super::*;
    use crate::Error;

    #[test]
    fn from_mem() {
        let file = File::from_mem(vec![1, 2, 3, 4]).unwrap();
        assert_eq!(file.len(), 4);
        assert!(!file.is_empty());
        assert_eq!(file.data(), &[1, 2, 3, 4]);
        assert_eq!(file.data_slice(1, 2).unwrap(), &[2, 3]);
        assert!(file.data_slice(3, 2).is_err());
    }

    #[test]
    fn from_mem_empty() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Error::Empty)));
    }

    #[test]
    fn clones_share_data() {
        let file = File::from_mem(vec![9; 16]).unwrap();
        let clone = file.clone();
        assert_eq!(file.data().as_ptr(), clone.data().as_ptr());
    }

    #[test]
    fn cursor_over_file() {
        let file = File::from_mem(b"hello world".to_vec()).unwrap();
        let mut cursor = Cursor::new(file);
        cursor.seek(SeekFrom::Start(6)).unwrap();
        let mut rest = String::new();
        cursor.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");
    }

    #[test]
    fn from_file_missing() {
        let result = File::from_file(Path::new("/definitely/not/here.jar"));
        assert!(matches!(result, Err(Error::FileError(_))));
    }
}
