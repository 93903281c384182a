use std::fmt;

use crate::{
    description::TypeDescription,
    pool::PoolRef,
    Error::NoSuchType,
    Result, TypeDescriptionRc,
};

/// The outcome of [`crate::TypePool::describe`]: whether a name was found.
///
/// Absence is a value, not an error. Only [`Resolution::resolve`] on an unresolved
/// resolution fails, with [`crate::Error::NoSuchType`] carrying the queried name.
#[derive(Clone)]
pub enum Resolution {
    /// The type was found
    Resolved(TypeDescriptionRc),
    /// No locator in the chain found the type; holds the queried name
    Unresolved(String),
    /// Produced by [`crate::LazyFacadePool`]: nothing was decoded yet
    Deferred(DeferredResolution),
}

/// A resolution that has not looked anything up yet.
#[derive(Clone)]
pub struct DeferredResolution {
    name: String,
    pool: PoolRef,
}

impl DeferredResolution {
    pub(crate) fn new(name: &str, pool: PoolRef) -> Self {
        DeferredResolution {
            name: name.to_string(),
            pool,
        }
    }

    /// The queried name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Resolution {
    /// Returns true if the type was found.
    ///
    /// A deferred resolution answers by describing the type through the pool it defers to;
    /// failures of that lookup count as absence.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        match self {
            Resolution::Resolved(_) => true,
            Resolution::Unresolved(_) => false,
            Resolution::Deferred(deferred) => deferred
                .pool
                .upgrade()
                .and_then(|pool| pool.describe(&deferred.name))
                .is_ok_and(|resolution| resolution.is_resolved()),
        }
    }

    /// The description of the type.
    ///
    /// A deferred resolution returns a description that decodes the type only when one of
    /// its properties is read.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] with the queried name if the type was not found.
    pub fn resolve(&self) -> Result<TypeDescriptionRc> {
        match self {
            Resolution::Resolved(description) => Ok(description.clone()),
            Resolution::Unresolved(name) => Err(NoSuchType(name.clone())),
            Resolution::Deferred(deferred) => Ok(TypeDescription::deferred(
                &deferred.name,
                deferred.pool.clone(),
            )),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Resolved(description) => {
                f.debug_tuple("Resolved").field(&description.name()).finish()
            }
            Resolution::Unresolved(name) => f.debug_tuple("Unresolved").field(name).finish(),
            Resolution::Deferred(deferred) => {
                f.debug_tuple("Deferred").field(&deferred.name).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classfile::descriptor::Primitive, Error};

    #[test]
    fn resolved_and_unresolved() {
        let int = TypeDescription::for_primitive(Primitive::Int);
        let resolved = Resolution::Resolved(int.clone());
        assert!(resolved.is_resolved());
        assert!(std::sync::Arc::ptr_eq(&resolved.resolve().unwrap(), &int));

        let unresolved = Resolution::Unresolved("foo.Missing".into());
        assert!(!unresolved.is_resolved());
        assert!(matches!(
            unresolved.resolve(),
            Err(Error::NoSuchType(name)) if name == "foo.Missing"
        ));
        assert_eq!(format!("{unresolved:?}"), "Unresolved(\"foo.Missing\")");
    }
}
