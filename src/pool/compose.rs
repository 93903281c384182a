use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use tracing::trace;

use crate::{
    classfile::descriptor::Primitive,
    pool::{
        describe_special, validate_name, DeferredResolution, PoolRc, PoolRef, Resolution,
        TypePool,
    },
    Result, TypeDescriptionRc,
};

/// An ordered chain of pools; the first one that resolves a name wins.
pub struct HierarchyPool {
    pools: Vec<PoolRc>,
}

impl HierarchyPool {
    /// Create a chain over `pools`, queried in order.
    #[must_use]
    pub fn new(pools: Vec<PoolRc>) -> Arc<Self> {
        Arc::new(HierarchyPool { pools })
    }

    /// The pools of this chain.
    #[must_use]
    pub fn pools(&self) -> &[PoolRc] {
        &self.pools
    }
}

impl TypePool for HierarchyPool {
    fn describe(&self, name: &str) -> Result<Resolution> {
        validate_name(name)?;
        for pool in &self.pools {
            let resolution = pool.describe(name)?;
            if resolution.is_resolved() {
                return Ok(resolution);
            }
        }
        Ok(Resolution::Unresolved(name.to_string()))
    }

    fn clear(&self) {
        for pool in &self.pools {
            pool.clear();
        }
    }
}

/// A pool answering a fixed set of names from pre-built descriptions and delegating the
/// rest.
///
/// Arrays are built here, so an array of an explicit type resolves as well.
pub struct ExplicitPool {
    this: Weak<ExplicitPool>,
    types: HashMap<String, TypeDescriptionRc>,
    delegate: PoolRc,
}

impl ExplicitPool {
    /// Create a pool over `types` in front of `delegate`.
    #[must_use]
    pub fn new<I>(types: I, delegate: PoolRc) -> Arc<Self>
    where
        I: IntoIterator<Item = TypeDescriptionRc>,
    {
        let types = types
            .into_iter()
            .map(|description| (description.name().to_string(), description))
            .collect();
        Arc::new_cyclic(|this| ExplicitPool {
            this: this.clone(),
            types,
            delegate,
        })
    }

    /// Number of explicit descriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no explicit descriptions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypePool for ExplicitPool {
    fn describe(&self, name: &str) -> Result<Resolution> {
        validate_name(name)?;
        let this: Weak<dyn TypePool> = self.this.clone();
        if let Some(resolution) =
            describe_special(name, &PoolRef::from_weak(this), |component| self.describe(component))?
        {
            return Ok(resolution);
        }
        match self.types.get(name) {
            Some(description) => Ok(Resolution::Resolved(description.clone())),
            None => self.delegate.describe(name),
        }
    }

    fn clear(&self) {
        self.delegate.clear();
    }
}

/// A pool that defers every lookup of a non-array, non-primitive type.
///
/// `describe` never touches the delegate for such names and always returns a
/// [`Resolution::Deferred`]. The delegate is consulted the first time the resolution is
/// checked or a property of the resulting description is read.
pub struct LazyFacadePool {
    delegate: PoolRc,
}

impl LazyFacadePool {
    /// Create a facade over `delegate`.
    #[must_use]
    pub fn new(delegate: PoolRc) -> Arc<Self> {
        Arc::new(LazyFacadePool { delegate })
    }

    /// The pool doing the actual work.
    #[must_use]
    pub fn delegate(&self) -> &PoolRc {
        &self.delegate
    }
}

impl TypePool for LazyFacadePool {
    fn describe(&self, name: &str) -> Result<Resolution> {
        validate_name(name)?;
        if name.starts_with('[') || Primitive::from_name(name).is_some() {
            return self.delegate.describe(name);
        }
        trace!(name, "deferring lookup");
        Ok(Resolution::Deferred(DeferredResolution::new(
            name,
            PoolRef::new(&self.delegate),
        )))
    }

    fn clear(&self) {
        self.delegate.clear();
    }
}
