use std::{io, sync::Arc};

use tracing::trace;

use super::{resource_path, Binary, ClassFileLocator};

/// An active source of resources, the equivalent of a running class loader.
///
/// `resource` receives a relative resource path such as `java/lang/Object.class` and
/// returns `Ok(None)` when the resource does not exist.
pub trait ResourceLoader: Send + Sync {
    /// Read the resource at `path` fully.
    ///
    /// # Errors
    /// Any I/O failure; the locator treats it like absence.
    fn resource(&self, path: &str) -> io::Result<Option<Vec<u8>>>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&str) -> io::Result<Option<Vec<u8>>> + Send + Sync,
{
    fn resource(&self, path: &str) -> io::Result<Option<Vec<u8>>> {
        self(path)
    }
}

/// A locator that asks a [`ResourceLoader`] for the class file resource of a type.
#[derive(Clone)]
pub struct ResourceLocator {
    loader: Arc<dyn ResourceLoader>,
}

impl ResourceLocator {
    /// Create a locator over `loader`.
    #[must_use]
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        ResourceLocator { loader }
    }
}

impl ClassFileLocator for ResourceLocator {
    fn locate(&self, name: &str) -> Binary {
        let path = resource_path(name);
        match self.loader.resource(&path) {
            Ok(Some(bytes)) => Binary::Valid(bytes.into()),
            Ok(None) => {
                trace!(name, path, "loader has no such resource");
                Binary::Invalid(name.to_string())
            }
            Err(error) => {
                trace!(name, path, %error, "loader failed to read resource");
                Binary::Invalid(name.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_resource_path() {
        let loader = |path: &str| -> io::Result<Option<Vec<u8>>> {
            match path {
                "foo/Bar.class" => Ok(Some(vec![7])),
                "foo/Broken.class" => Err(io::Error::new(io::ErrorKind::Other, "boom")),
                _ => Ok(None),
            }
        };
        let locator = ResourceLocator::new(Arc::new(loader));

        assert_eq!(locator.locate("foo.Bar").bytes(), Some(&[7_u8][..]));
        assert!(!locator.locate("foo.Baz").is_valid());
        assert!(!locator.locate("foo.Broken").is_valid());
    }
}
