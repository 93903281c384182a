//! Source locators: turning a type name into class file bytes.
//!
//! A [`ClassFileLocator`] answers a single question: given the binary name of a type, what
//! are the bytes of its class file? The answer is a [`Binary`], which is either valid or
//! invalid. Locators never fail loudly; any read problem, including plain absence, degrades
//! to [`Binary::Invalid`] and is logged at `trace` level. Locators do not cache, that is the
//! responsibility of the [`crate::TypePool`] in front of them.
//!
//! # Key Components
//!
//! - [`SimpleLocator`] - Explicit name to bytes table
//! - [`FolderLocator`] - Class files below a directory root
//! - [`ArchiveLocator`] - Entries of a jar or zip archive
//! - [`ClassPathLocator`] - An ordered search path of directories and archives
//! - [`ResourceLocator`] - Any [`ResourceLoader`], queried by resource path
//! - [`CompoundLocator`] - Ordered fallback chain over other locators
//! - [`NoOpLocator`] - Locates nothing
//!
//! # Examples
//!
//! ```rust
//! use classpool::locator::{ClassFileLocator, CompoundLocator, NoOpLocator, SimpleLocator};
//!
//! let locator = CompoundLocator::new(vec![
//!     NoOpLocator.into_rc(),
//!     SimpleLocator::of("foo.Bar", vec![0xCA, 0xFE, 0xBA, 0xBE]).into_rc(),
//! ]);
//!
//! assert!(locator.locate("foo.Bar").is_valid());
//! assert!(!locator.locate("foo.Qux").is_valid());
//! ```

mod archive;
mod classpath;
mod compound;
mod folder;
mod loader;
mod simple;

pub use archive::ArchiveLocator;
pub use classpath::ClassPathLocator;
pub use compound::CompoundLocator;
pub use folder::FolderLocator;
pub use loader::{ResourceLoader, ResourceLocator};
pub use simple::SimpleLocator;

use std::sync::Arc;

use crate::{Error::NoSuchType, Result};

/// Reference-counted locator handle.
pub type LocatorRc = Arc<dyn ClassFileLocator>;

/// The outcome of a [`ClassFileLocator::locate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binary {
    /// The class file was found
    Valid(Arc<[u8]>),
    /// The class file could not be read; holds the queried name
    Invalid(String),
}

impl Binary {
    /// Returns true if bytes are available.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Binary::Valid(_))
    }

    /// The bytes, if available.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Binary::Valid(bytes) => Some(bytes),
            Binary::Invalid(_) => None,
        }
    }

    /// The bytes, or [`crate::Error::NoSuchType`] carrying the queried name.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] for invalid representations.
    pub fn resolve(&self) -> Result<Arc<[u8]>> {
        match self {
            Binary::Valid(bytes) => Ok(bytes.clone()),
            Binary::Invalid(name) => Err(NoSuchType(name.clone())),
        }
    }
}

/// A strategy that finds the class file of a type by its binary name.
pub trait ClassFileLocator: Send + Sync {
    /// Look up the class file of the type with the given binary name, `java.lang.Object` for
    /// example.
    fn locate(&self, name: &str) -> Binary;

    /// Wrap this locator into a [`LocatorRc`].
    fn into_rc(self) -> LocatorRc
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<T: ClassFileLocator + ?Sized> ClassFileLocator for Arc<T> {
    fn locate(&self, name: &str) -> Binary {
        (**self).locate(name)
    }
}

/// A locator that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLocator;

impl ClassFileLocator for NoOpLocator {
    fn locate(&self, name: &str) -> Binary {
        Binary::Invalid(name.to_string())
    }
}

/// Convert a binary name into the relative path of its class file, `java/lang/Object.class`.
#[must_use]
pub fn resource_path(name: &str) -> String {
    format!("{}.class", name.replace('.', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn binary_accessors() {
        let valid = Binary::Valid(Arc::from(vec![1_u8, 2]));
        assert!(valid.is_valid());
        assert_eq!(valid.bytes(), Some(&[1_u8, 2][..]));
        assert_eq!(&*valid.resolve().unwrap(), &[1, 2]);

        let invalid = Binary::Invalid("foo.Bar".into());
        assert!(!invalid.is_valid());
        assert_eq!(invalid.bytes(), None);
        assert!(matches!(invalid.resolve(), Err(Error::NoSuchType(name)) if name == "foo.Bar"));
    }

    #[test]
    fn no_op_locator() {
        assert_eq!(
            NoOpLocator.locate("java.lang.Object"),
            Binary::Invalid("java.lang.Object".into())
        );
    }

    #[test]
    fn resource_paths() {
        assert_eq!(resource_path("java.lang.Object"), "java/lang/Object.class");
        assert_eq!(resource_path("foo.Outer$Inner"), "foo/Outer$Inner.class");
        assert_eq!(resource_path("Top"), "Top.class");
    }
}
