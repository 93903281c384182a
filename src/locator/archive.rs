use std::{
    fmt,
    io::{Cursor, Read},
    path::Path,
    sync::Mutex,
};

use tracing::{debug, trace};
use zip::ZipArchive;

use super::{resource_path, Binary, ClassFileLocator};
use crate::{file::File, Result};

/// Largest entry size taken from an archive header at face value when reserving memory.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// A locator over the entries of a jar or zip archive.
///
/// The archive is opened once: from disk it is memory-mapped and its central directory read
/// at construction time. Entry reads share one archive reader behind a mutex.
pub struct ArchiveLocator {
    archive: Mutex<ZipArchive<Cursor<File>>>,
    entries: usize,
}

impl ArchiveLocator {
    /// Open the archive at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be mapped and
    /// [`crate::Error::ArchiveError`] if it is not a readable archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let locator = Self::from_file(File::from_file(path)?)?;
        debug!(path = %path.display(), entries = locator.entries, "opened archive");
        Ok(locator)
    }

    /// Read an archive held in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] or [`crate::Error::ArchiveError`].
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_file(File::from_mem(data)?)
    }

    fn from_file(file: File) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(file))?;
        let entries = archive.len();
        Ok(ArchiveLocator {
            archive: Mutex::new(archive),
            entries,
        })
    }

    /// Number of entries in the archive, directories included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Returns true if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    fn read_entry(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = lock!(self.archive)?;
        let mut entry = archive.by_name(path)?;
        let mut bytes = Vec::with_capacity(preallocation(entry.size()));
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl ClassFileLocator for ArchiveLocator {
    fn locate(&self, name: &str) -> Binary {
        let path = resource_path(name);
        match self.read_entry(&path) {
            Ok(bytes) => Binary::Valid(bytes.into()),
            Err(error) => {
                trace!(name, path, %error, "archive entry not readable");
                Binary::Invalid(name.to_string())
            }
        }
    }
}

fn preallocation(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}

impl fmt::Debug for ArchiveLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveLocator")
            .field("entries", &self.entries)
            .finish()
    }
}
