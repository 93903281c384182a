use tracing::trace;

use super::{Binary, ClassFileLocator, LocatorRc};

/// An ordered fallback chain of locators.
///
/// Delegates are queried in order and the first valid result is returned without querying
/// the remaining ones. If no delegate finds the type, the last invalid result is returned.
#[derive(Clone, Default)]
pub struct CompoundLocator {
    locators: Vec<LocatorRc>,
}

impl CompoundLocator {
    /// Create a chain over `locators`, queried in the given order.
    #[must_use]
    pub fn new(locators: Vec<LocatorRc>) -> Self {
        CompoundLocator { locators }
    }

    /// Append a locator to the end of the chain.
    pub fn push(&mut self, locator: LocatorRc) {
        self.locators.push(locator);
    }

    /// Number of delegates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Returns true if the chain has no delegates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

impl ClassFileLocator for CompoundLocator {
    fn locate(&self, name: &str) -> Binary {
        let mut last = Binary::Invalid(name.to_string());
        for (index, locator) in self.locators.iter().enumerate() {
            let binary = locator.locate(name);
            if binary.is_valid() {
                return binary;
            }
            trace!(name, delegate = index, "delegate did not locate type");
            last = binary;
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use super::*;
    use crate::locator::{NoOpLocator, SimpleLocator};

    /// Records the order in which delegates are queried.
    struct Recording {
        id: usize,
        log: Arc<Mutex<Vec<usize>>>,
        inner: SimpleLocator,
    }

    impl ClassFileLocator for Recording {
        fn locate(&self, name: &str) -> Binary {
            self.log.lock().unwrap().push(self.id);
            self.inner.locate(name)
        }
    }

    #[test]
    fn first_valid_wins_after_failures() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let compound = CompoundLocator::new(vec![
            Recording {
                id: 0,
                log: log.clone(),
                inner: SimpleLocator::default(),
            }
            .into_rc(),
            Recording {
                id: 1,
                log: log.clone(),
                inner: SimpleLocator::of("foo.Y", vec![2]),
            }
            .into_rc(),
            Recording {
                id: 2,
                log: log.clone(),
                inner: SimpleLocator::of("foo.Y", vec![3]),
            }
            .into_rc(),
        ]);

        assert_eq!(compound.locate("foo.Y").bytes(), Some(&[2_u8][..]));
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn last_invalid_when_nothing_found() {
        struct Named(AtomicUsize);
        impl ClassFileLocator for Named {
            fn locate(&self, _name: &str) -> Binary {
                self.0.fetch_add(1, Ordering::SeqCst);
                Binary::Invalid("from-last".into())
            }
        }

        let last = Arc::new(Named(AtomicUsize::new(0)));
        let compound = CompoundLocator::new(vec![NoOpLocator.into_rc(), last.clone() as LocatorRc]);

        assert_eq!(compound.locate("foo.Z"), Binary::Invalid("from-last".into()));
        assert_eq!(last.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_chain() {
        let mut compound = CompoundLocator::default();
        assert!(compound.is_empty());
        assert_eq!(compound.locate("a.B"), Binary::Invalid("a.B".into()));

        compound.push(SimpleLocator::of("a.B", vec![1]).into_rc());
        assert_eq!(compound.len(), 1);
        assert!(compound.locate("a.B").is_valid());
    }
}
