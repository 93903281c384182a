use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{ArchiveLocator, Binary, ClassFileLocator, CompoundLocator, FolderLocator};
use crate::Result;

/// A locator over an ordered class path of directories and archives.
///
/// Entries are inspected once at construction: existing directories become
/// [`FolderLocator`]s, existing files are opened as [`ArchiveLocator`]s and missing entries
/// are skipped. Lookups then follow the class path order, the first entry that contains the
/// type wins.
#[derive(Clone)]
pub struct ClassPathLocator {
    entries: Vec<PathBuf>,
    chain: CompoundLocator,
}

impl ClassPathLocator {
    /// Build a locator from a platform path list, as found in the `CLASSPATH` environment
    /// variable (`a.jar:classes` on Unix, `a.jar;classes` on Windows).
    ///
    /// # Errors
    /// Returns [`crate::Error::ArchiveError`] or [`crate::Error::FileError`] if an existing
    /// file entry cannot be opened as an archive.
    pub fn from_path_list(list: &str) -> Result<Self> {
        Self::from_entries(env::split_paths(list))
    }

    /// Build a locator from explicit class path entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArchiveError`] or [`crate::Error::FileError`] if an existing
    /// file entry cannot be opened as an archive.
    pub fn from_entries<I, P>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut kept = Vec::new();
        let mut chain = CompoundLocator::default();

        for entry in entries {
            let path = entry.as_ref();
            if path.as_os_str().is_empty() {
                continue;
            }
            if path.is_dir() {
                chain.push(FolderLocator::new(path).into_rc());
            } else if path.is_file() {
                chain.push(ArchiveLocator::open(path)?.into_rc());
            } else {
                debug!(path = %path.display(), "skipping missing class path entry");
                continue;
            }
            kept.push(path.to_path_buf());
        }

        Ok(ClassPathLocator {
            entries: kept,
            chain,
        })
    }

    /// The class path entries that were found, in lookup order.
    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl ClassFileLocator for ClassPathLocator {
    fn locate(&self, name: &str) -> Binary {
        self.chain.locate(name)
    }
}
