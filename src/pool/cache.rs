//! Resolution cache for the type pool.

use dashmap::DashMap;
use tracing::debug;

use crate::pool::Resolution;

/// Per-pool memoization of resolutions by name.
///
/// Unresolved resolutions are cached like resolved ones, so a missing type is looked up
/// only once between clears.
pub trait CacheProvider: Send + Sync {
    /// The cached resolution for `name`, if any.
    fn find(&self, name: &str) -> Option<Resolution>;

    /// Store `resolution` unless an entry for `name` exists already, and return the entry
    /// that is stored afterwards.
    ///
    /// Callers must use the returned resolution: when two threads decode the same type
    /// concurrently, only the first registration is kept.
    fn register(&self, name: &str, resolution: Resolution) -> Resolution;

    /// Drop every entry.
    fn clear(&self);
}

/// A cache that never retains anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

impl CacheProvider for NoOpCache {
    fn find(&self, _name: &str) -> Option<Resolution> {
        None
    }

    fn register(&self, _name: &str, resolution: Resolution) -> Resolution {
        resolution
    }

    fn clear(&self) {}
}

/// A concurrent cache where the first registration for a name wins.
#[derive(Default)]
pub struct SimpleCache {
    entries: DashMap<String, Resolution>,
}

impl SimpleCache {
    /// Number of cached names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheProvider for SimpleCache {
    fn find(&self, name: &str) -> Option<Resolution> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    fn register(&self, name: &str, resolution: Resolution) -> Resolution {
        self.entries
            .entry(name.to_string())
            .or_insert(resolution)
            .value()
            .clone()
    }

    fn clear(&self) {
        debug!(entries = self.entries.len(), "clearing type cache");
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rayon::prelude::*;

    use super::*;
    use crate::{classfile::descriptor::Primitive, TypeDescription};

    #[test]
    fn no_op_never_retains() {
        let cache = NoOpCache;
        let stored = cache.register("a.B", Resolution::Unresolved("a.B".into()));
        assert!(!stored.is_resolved());
        assert!(cache.find("a.B").is_none());
    }

    #[test]
    fn first_write_wins() {
        let cache = SimpleCache::default();
        let int = TypeDescription::for_primitive(Primitive::Int);
        let long = TypeDescription::for_primitive(Primitive::Long);

        let first = cache.register("x", Resolution::Resolved(int.clone()));
        let second = cache.register("x", Resolution::Resolved(long));
        assert!(Arc::ptr_eq(&first.resolve().unwrap(), &int));
        assert!(Arc::ptr_eq(&second.resolve().unwrap(), &int));
        assert!(Arc::ptr_eq(&cache.find("x").unwrap().resolve().unwrap(), &int));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.find("x").is_none());
    }

    #[test]
    fn concurrent_registration_is_canonical() {
        let cache = SimpleCache::default();
        let winners: Vec<_> = (0..64)
            .into_par_iter()
            .map(|index| {
                let primitive = if index % 2 == 0 {
                    Primitive::Int
                } else {
                    Primitive::Long
                };
                let candidate = Resolution::Resolved(TypeDescription::for_primitive(primitive));
                cache.register("race", candidate).resolve().unwrap()
            })
            .collect();

        let canonical = cache.find("race").unwrap().resolve().unwrap();
        assert!(winners.iter().all(|winner| Arc::ptr_eq(winner, &canonical)));
    }
}
