//! Type pools: name-keyed access to lazily decoded type descriptions.
//!
//! A [`TypePool`] answers [`TypePool::describe`] with a [`Resolution`]. Pools validate the
//! queried name, serve primitive and array names without decoding anything, consult their
//! cache and finally their [`crate::locator::ClassFileLocator`]. Decoded types are wrapped
//! into lazy descriptions that hold a weak reference back to the pool and describe related
//! types through it on first access.
//!
//! # Key Components
//!
//! - [`DefaultPool`] - Cache, locator and optional parent pool
//! - [`HierarchyPool`] - Ordered candidates, the first that resolves wins
//! - [`ExplicitPool`] - Fixed descriptions in front of a delegate
//! - [`LazyFacadePool`] - Defers even the initial decode until a property is read
//! - [`CacheProvider`], [`SimpleCache`], [`NoOpCache`] - Resolution caches
//! - [`PoolConfig`] - Read mode, signature depth and cache choice
//!
//! # Examples
//!
//! ```rust,no_run
//! use classpool::prelude::*;
//!
//! let locator = ClassPathLocator::from_path_list("lib/app.jar:target/classes")?;
//! let pool = DefaultPool::new(locator.into_rc(), PoolConfig::default());
//!
//! let list = pool.describe("java.util.ArrayList")?.resolve()?;
//! for method in list.declared_methods()? {
//!     println!("{}{}", method.name(), method.descriptor());
//! }
//! # Ok::<(), classpool::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod token;

mod compose;
mod default;
mod extractor;
mod resolution;

pub use cache::{CacheProvider, NoOpCache, SimpleCache};
pub use compose::{ExplicitPool, HierarchyPool, LazyFacadePool};
pub use config::{CacheMode, PoolConfig};
pub use default::DefaultPool;
pub use extractor::TypeExtractor;
pub use resolution::{DeferredResolution, Resolution};

use std::sync::{Arc, Weak};

use crate::{
    classfile::descriptor::Primitive,
    description::TypeDescription,
    Error::{IllegalName, PoolReleased},
    Result,
};

/// Reference-counted pool handle.
pub type PoolRc = Arc<dyn TypePool>;

/// A pool of type descriptions, looked up by binary name.
pub trait TypePool: Send + Sync {
    /// Describe the type with the given binary name, `java.lang.String`, `int` or
    /// `[Ljava.lang.String;` for example.
    ///
    /// # Errors
    /// Returns [`crate::Error::IllegalName`] for names that can never denote a type. Absence
    /// is reported as [`Resolution::Unresolved`], not as an error.
    fn describe(&self, name: &str) -> Result<Resolution>;

    /// Drop every cached resolution, including those of the pools this pool delegates to.
    fn clear(&self);
}

impl<T: TypePool + ?Sized> TypePool for Arc<T> {
    fn describe(&self, name: &str) -> Result<Resolution> {
        (**self).describe(name)
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// A weak pool handle, held by descriptions so that they do not keep their pool alive.
#[derive(Clone)]
pub struct PoolRef(Weak<dyn TypePool>);

impl PoolRef {
    /// Downgrade a pool handle.
    #[must_use]
    pub fn new(pool: &PoolRc) -> Self {
        PoolRef(Arc::downgrade(pool))
    }

    pub(crate) fn from_weak(pool: Weak<dyn TypePool>) -> Self {
        PoolRef(pool)
    }

    /// The pool, if it is still alive.
    ///
    /// # Errors
    /// Returns [`crate::Error::PoolReleased`] once the pool was dropped.
    pub fn upgrade(&self) -> Result<PoolRc> {
        self.0.upgrade().ok_or(PoolReleased)
    }
}

/// Reject names that can never denote a type.
///
/// Besides the empty name, this covers names with path separators and names with an empty
/// package segment, `.foo.Bar`, `foo..Bar` or `foo.Bar.`.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains(['/', '\\'])
        || name.split('.').any(str::is_empty)
    {
        return Err(IllegalName(name.to_string()));
    }
    Ok(())
}

/// Serve primitive and array names without decoding.
///
/// Array components are described through `describe`, which lets the calling pool apply its
/// own cache and delegation. Returns `None` for every other name.
pub(crate) fn describe_special<F>(name: &str, pool: &PoolRef, describe: F) -> Result<Option<Resolution>>
where
    F: FnOnce(&str) -> Result<Resolution>,
{
    if let Some(primitive) = Primitive::from_name(name) {
        return Ok(Some(Resolution::Resolved(TypeDescription::for_primitive(
            primitive,
        ))));
    }

    let element = name.trim_start_matches('[');
    let arity = name.len() - element.len();
    if arity == 0 {
        return Ok(None);
    }

    let component = match element.as_bytes() {
        [b'L', .., b';'] if element.len() > 2 => element[1..element.len() - 1].to_string(),
        [code] => match Primitive::from_descriptor(*code) {
            Some(primitive) if primitive != Primitive::Void => primitive.name().to_string(),
            _ => return Err(IllegalName(name.to_string())),
        },
        _ => return Err(IllegalName(name.to_string())),
    };

    let resolution = describe(&component)?;
    if !resolution.is_resolved() {
        return Ok(Some(Resolution::Unresolved(component)));
    }
    Ok(Some(Resolution::Resolved(TypeDescription::array_of(
        resolution.resolve()?,
        arity,
        pool.clone(),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert!(validate_name("java.lang.Object").is_ok());
        assert!(validate_name("[I").is_ok());
        assert!(matches!(validate_name(""), Err(IllegalName(_))));
        assert!(matches!(
            validate_name("java/lang/Object"),
            Err(IllegalName(name)) if name == "java/lang/Object"
        ));
        assert!(validate_name("[Ljava.lang.String;").is_ok());
        assert!(validate_name("foo.Outer$Inner").is_ok());
        for name in [".tmp.escape.Secret", "foo..Bar", "foo.Bar.", "..", "foo\\Bar"] {
            assert!(matches!(validate_name(name), Err(IllegalName(_))), "{name}");
        }
    }
}
