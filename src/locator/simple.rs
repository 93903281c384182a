use std::{collections::HashMap, sync::Arc};

use tracing::trace;

use super::{Binary, ClassFileLocator};

/// A locator over an explicit name to bytes table.
///
/// Lookups are exact matches on the binary name.
#[derive(Debug, Clone, Default)]
pub struct SimpleLocator {
    types: HashMap<String, Arc<[u8]>>,
}

impl SimpleLocator {
    /// Create a locator over the given table.
    #[must_use]
    pub fn new(types: HashMap<String, Vec<u8>>) -> Self {
        SimpleLocator {
            types: types
                .into_iter()
                .map(|(name, bytes)| (name, Arc::from(bytes)))
                .collect(),
        }
    }

    /// Create a locator that knows exactly one type.
    #[must_use]
    pub fn of(name: &str, bytes: Vec<u8>) -> Self {
        SimpleLocator::default().with(name, bytes)
    }

    /// Add a type to the table, replacing an existing entry of the same name.
    #[must_use]
    pub fn with(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.types.insert(name.to_string(), Arc::from(bytes));
        self
    }

    /// Number of types in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ClassFileLocator for SimpleLocator {
    fn locate(&self, name: &str) -> Binary {
        match self.types.get(name) {
            Some(bytes) => Binary::Valid(bytes.clone()),
            None => {
                trace!(name, "type not in explicit table");
                Binary::Invalid(name.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let locator = SimpleLocator::of("foo.Bar", vec![1, 2, 3]).with("foo.Qux", vec![4]);

        assert_eq!(locator.len(), 2);
        assert_eq!(locator.locate("foo.Bar").bytes(), Some(&[1_u8, 2, 3][..]));
        assert_eq!(locator.locate("foo.Qux").bytes(), Some(&[4_u8][..]));
        assert!(!locator.locate("foo/Bar").is_valid());
        assert!(!locator.locate("Bar").is_valid());
    }

    #[test]
    fn from_table() {
        let mut table = HashMap::new();
        table.insert("a.B".to_string(), vec![0xCA]);
        let locator = SimpleLocator::new(table);
        assert!(locator.locate("a.B").is_valid());
        assert!(SimpleLocator::default().is_empty());
    }
}
