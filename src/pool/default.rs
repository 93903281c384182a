use std::sync::{Arc, Weak};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{
    description::{LazyTypeDescription, TypeDescription},
    locator::{Binary, ClassPathLocator, ClassFileLocator, LocatorRc},
    pool::{
        describe_special, validate_name, CacheProvider, PoolConfig, PoolRc, PoolRef, Resolution,
        TypeExtractor, TypePool,
    },
    Result,
};

/// The standard pool: a cache in front of a locator, with an optional parent pool.
///
/// Lookups are parent-first. The parent is asked for every name and only names it cannot
/// resolve are looked up in this pool's own cache and locator. Resolutions, including
/// unresolved ones, are cached until [`TypePool::clear`] is called.
///
/// Pools are always handed out as `Arc`s because the descriptions they create hold a weak
/// reference back to them.
pub struct DefaultPool {
    this: Weak<DefaultPool>,
    locator: LocatorRc,
    cache: Arc<dyn CacheProvider>,
    config: PoolConfig,
    extractor: TypeExtractor,
    parent: Option<PoolRc>,
}

impl DefaultPool {
    /// Create a pool without parent, with the cache selected by `config`.
    #[must_use]
    pub fn new(locator: LocatorRc, config: PoolConfig) -> Arc<Self> {
        Self::build(locator, config, config.cache.provider(), None)
    }

    /// Create a pool that asks `parent` first.
    #[must_use]
    pub fn with_parent(locator: LocatorRc, config: PoolConfig, parent: PoolRc) -> Arc<Self> {
        Self::build(locator, config, config.cache.provider(), Some(parent))
    }

    /// Create a pool with an explicit cache instead of the one selected by `config`.
    #[must_use]
    pub fn with_cache(
        locator: LocatorRc,
        config: PoolConfig,
        cache: Arc<dyn CacheProvider>,
        parent: Option<PoolRc>,
    ) -> Arc<Self> {
        Self::build(locator, config, cache, parent)
    }

    /// Create a pool over a platform path list of directories and archives.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArchiveError`] or [`crate::Error::FileError`] if an existing
    /// file entry cannot be opened as an archive.
    pub fn of_class_path(list: &str, config: PoolConfig) -> Result<Arc<Self>> {
        Ok(Self::new(ClassPathLocator::from_path_list(list)?.into_rc(), config))
    }

    fn build(
        locator: LocatorRc,
        config: PoolConfig,
        cache: Arc<dyn CacheProvider>,
        parent: Option<PoolRc>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| DefaultPool {
            this: this.clone(),
            locator,
            cache,
            config,
            extractor: TypeExtractor::new(&config),
            parent,
        })
    }

    /// The configuration this pool was created with.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The locator this pool reads class files from.
    #[must_use]
    pub fn locator(&self) -> &LocatorRc {
        &self.locator
    }

    /// The parent pool, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&PoolRc> {
        self.parent.as_ref()
    }

    /// Describe many names in parallel, warming the cache.
    ///
    /// Results are returned in the order of `names`.
    pub fn describe_all<S>(&self, names: &[S]) -> Vec<Result<Resolution>>
    where
        S: AsRef<str> + Sync,
    {
        names
            .par_iter()
            .map(|name| self.describe(name.as_ref()))
            .collect()
    }

    fn pool_ref(&self) -> PoolRef {
        let this: Weak<dyn TypePool> = self.this.clone();
        PoolRef::from_weak(this)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn decode(&self, name: &str) -> Result<Resolution> {
        let bytes = match self.locator.locate(name) {
            Binary::Valid(bytes) => bytes,
            Binary::Invalid(_) => {
                trace!(name, "locator did not find type");
                return Ok(Resolution::Unresolved(name.to_string()));
            }
        };

        let token = self.extractor.extract(&bytes)?;
        debug!(name, size = bytes.len(), "decoded type");
        let description = LazyTypeDescription::new(Arc::new(token), self.pool_ref());
        Ok(Resolution::Resolved(Arc::new(TypeDescription::Lazy(description))))
    }
}

impl TypePool for DefaultPool {
    fn describe(&self, name: &str) -> Result<Resolution> {
        validate_name(name)?;

        if let Some(parent) = &self.parent {
            let resolution = parent.describe(name)?;
            if resolution.is_resolved() {
                trace!(name, "resolved by parent pool");
                return Ok(resolution);
            }
        }

        if let Some(resolution) = self.cache.find(name) {
            return Ok(resolution);
        }

        let resolution = match describe_special(name, &self.pool_ref(), |component| {
            self.describe(component)
        })? {
            Some(resolution) => resolution,
            None => self.decode(name)?,
        };
        Ok(self.cache.register(name, resolution))
    }

    fn clear(&self) {
        self.cache.clear();
        if let Some(parent) = &self.parent {
            parent.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        locator::SimpleLocator,
        pool::{CacheMode, SimpleCache},
        test::{ClassFileBuilder, CountingLocator, FieldSpec, MethodSpec},
        Error,
    };

    fn locator() -> SimpleLocator {
        SimpleLocator::default()
            .with("java.lang.Object", ClassFileBuilder::new("java/lang/Object").super_class(None).build())
            .with(
                "foo.Bar",
                ClassFileBuilder::new("foo/Bar")
                    .field(FieldSpec::new(0x0002, "count", "I"))
                    .method(MethodSpec::new(0x0001, "<init>", "()V"))
                    .build(),
            )
    }

    #[test]
    fn describes_and_caches() {
        let counting = Arc::new(CountingLocator::new(locator()));
        let pool = DefaultPool::new(counting.clone(), PoolConfig::default());

        let first = pool.describe("foo.Bar").unwrap().resolve().unwrap();
        let second = pool.describe("foo.Bar").unwrap().resolve().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counting.count("foo.Bar"), 1);

        assert_eq!(first.name(), "foo.Bar");
        assert_eq!(first.declared_fields().unwrap()[0].name(), "count");
        assert_eq!(
            first.super_class().unwrap().map(|s| s.name().to_string()),
            Some("java.lang.Object".into())
        );

        pool.clear();
        let third = pool.describe("foo.Bar").unwrap().resolve().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
        assert_eq!(counting.count("foo.Bar"), 2);
    }

    #[test]
    fn unresolved_is_cached() {
        let counting = Arc::new(CountingLocator::new(SimpleLocator::default()));
        let pool = DefaultPool::new(counting.clone(), PoolConfig::default());

        assert!(!pool.describe("foo.Missing").unwrap().is_resolved());
        assert!(!pool.describe("foo.Missing").unwrap().is_resolved());
        assert_eq!(counting.count("foo.Missing"), 1);
        assert!(matches!(
            pool.describe("foo.Missing").unwrap().resolve(),
            Err(Error::NoSuchType(name)) if name == "foo.Missing"
        ));
    }

    #[test]
    fn no_cache_mode() {
        let counting = Arc::new(CountingLocator::new(locator()));
        let pool = DefaultPool::new(
            counting.clone(),
            PoolConfig::default().with_cache(CacheMode::None),
        );
        pool.describe("foo.Bar").unwrap();
        pool.describe("foo.Bar").unwrap();
        assert_eq!(counting.count("foo.Bar"), 2);
    }

    #[test]
    fn primitives_and_arrays_short_circuit() {
        let counting = Arc::new(CountingLocator::new(locator()));
        let pool = DefaultPool::new(counting.clone(), PoolConfig::default());

        let int = pool.describe("int").unwrap().resolve().unwrap();
        assert!(int.is_primitive());

        let ints = pool.describe("[[I").unwrap().resolve().unwrap();
        assert!(ints.is_array());
        assert_eq!(ints.arity(), 2);
        assert_eq!(ints.name(), "[[I");
        assert_eq!(ints.component_type().unwrap().name(), "[I");
        assert_eq!(ints.simple_name().unwrap(), "int[][]");
        assert_eq!(counting.total(), 0);

        let bars = pool.describe("[Lfoo.Bar;").unwrap().resolve().unwrap();
        assert!(Arc::ptr_eq(&bars, &pool.describe("[Lfoo.Bar;").unwrap().resolve().unwrap()));
        assert_eq!(bars.component_type().unwrap().name(), "foo.Bar");
        assert_eq!(bars.descriptor(), "[Lfoo/Bar;");
        assert_eq!(bars.super_class().unwrap().unwrap().name(), "java.lang.Object");

        let missing = pool.describe("[[Lfoo.Missing;").unwrap();
        assert!(matches!(missing.resolve(), Err(Error::NoSuchType(name)) if name == "foo.Missing"));

        pool.clear();
        let rebuilt = pool.describe("[Lfoo.Bar;").unwrap().resolve().unwrap();
        assert!(!Arc::ptr_eq(&bars, &rebuilt));
        assert_eq!(rebuilt, bars);
    }

    #[test]
    fn illegal_names() {
        let pool = DefaultPool::new(locator().into_rc(), PoolConfig::default());
        assert!(matches!(pool.describe("foo/Bar"), Err(Error::IllegalName(_))));
        assert!(matches!(pool.describe(""), Err(Error::IllegalName(_))));
        assert!(matches!(pool.describe("[V"), Err(Error::IllegalName(_))));
        assert!(matches!(pool.describe("[Q"), Err(Error::IllegalName(_))));
    }

    #[test]
    fn unresolvable_signature_constant_degrades() {
        let locator = locator().with(
            "foo.Sig",
            ClassFileBuilder::new("foo/Sig")
                .raw_attribute("Signature", vec![0xFF, 0xFF])
                .build(),
        );
        let pool = DefaultPool::new(locator.into_rc(), PoolConfig::default());

        let description = pool.describe("foo.Sig").unwrap().resolve().unwrap();
        assert!(matches!(
            description.type_variables(),
            Err(Error::MalformedSignature(_))
        ));
        let super_class = description.generic_super_class().unwrap().unwrap();
        assert_eq!(super_class.to_string(), "java.lang.Object");
    }

    #[test]
    fn corrupt_class_file() {
        let locator = SimpleLocator::of("foo.Corrupt", vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00]);
        let pool = DefaultPool::new(locator.into_rc(), PoolConfig::default());
        assert!(pool.describe("foo.Corrupt").is_err());
    }

    #[test]
    fn parent_first() {
        let parent_locator = Arc::new(CountingLocator::new(locator()));
        let parent = DefaultPool::new(parent_locator.clone(), PoolConfig::default());

        let child_locator = Arc::new(CountingLocator::new(
            SimpleLocator::default()
                .with("foo.Bar", ClassFileBuilder::new("foo/Bar").access(0x0011).build())
                .with("foo.Child", ClassFileBuilder::new("foo/Child").build()),
        ));
        let child = DefaultPool::with_parent(child_locator.clone(), PoolConfig::default(), parent);

        let bar = child.describe("foo.Bar").unwrap().resolve().unwrap();
        assert!(bar.declared_fields().unwrap().len() == 1);
        assert_eq!(child_locator.count("foo.Bar"), 0);

        assert!(child.describe("foo.Child").unwrap().is_resolved());
        assert_eq!(parent_locator.count("foo.Child"), 1);
        assert_eq!(child_locator.count("foo.Child"), 1);

        child.clear();
        child.describe("foo.Bar").unwrap();
        assert_eq!(parent_locator.count("foo.Bar"), 2);
    }

    #[test]
    fn explicit_cache_is_shared() {
        let cache = Arc::new(SimpleCache::default());
        let pool = DefaultPool::with_cache(
            locator().into_rc(),
            PoolConfig::default(),
            cache.clone(),
            None,
        );
        pool.describe("foo.Bar").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn parallel_warm_up() {
        let counting = Arc::new(CountingLocator::new(locator()));
        let pool = DefaultPool::new(counting.clone(), PoolConfig::default());
        let names = vec!["foo.Bar"; 32];

        let results = pool.describe_all(&names);
        let canonical = pool.describe("foo.Bar").unwrap().resolve().unwrap();
        for result in results {
            assert!(Arc::ptr_eq(&result.unwrap().resolve().unwrap(), &canonical));
        }
    }

    #[test]
    fn released_pool() {
        let pool = DefaultPool::new(locator().into_rc(), PoolConfig::default());
        let bar = pool.describe("foo.Bar").unwrap().resolve().unwrap();
        drop(pool);
        assert!(matches!(bar.super_class(), Err(Error::PoolReleased)));
        assert_eq!(bar.name(), "foo.Bar");
    }
}
