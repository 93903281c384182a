//! Pool configuration
//!
//! This module provides the knobs of a [`crate::DefaultPool`]: how much of a class file is
//! decoded, how deep generic signatures may nest and whether resolutions are cached.

use std::sync::Arc;

use crate::{
    classfile::ReadMode,
    pool::cache::{CacheProvider, NoOpCache, SimpleCache},
    signature::MAX_RECURSION_DEPTH,
};

/// Which cache a pool creates for itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Nothing is retained; every `describe` decodes again
    None,
    /// A concurrent first-write-wins map
    #[default]
    Simple,
}

impl CacheMode {
    /// Create a fresh cache of this kind.
    #[must_use]
    pub fn provider(self) -> Arc<dyn CacheProvider> {
        match self {
            CacheMode::None => Arc::new(NoOpCache),
            CacheMode::Simple => Arc::new(SimpleCache::default()),
        }
    }
}

/// Configuration of a [`crate::DefaultPool`]
///
/// The fast preset decodes shape metadata only and is the default. The extended preset also
/// decodes method bodies, which makes local variable names, line numbers and stack map frame
/// counts available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// How much of each class file is decoded
    pub read_mode: ReadMode,

    /// Maximum nesting depth of generic signatures (default: 50)
    /// Deeper signatures are treated as malformed
    pub max_signature_depth: usize,

    /// The cache the pool creates for itself
    pub cache: CacheMode,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::fast()
    }
}

impl PoolConfig {
    /// Shape metadata only, method bodies are skipped
    #[must_use]
    pub fn fast() -> Self {
        Self {
            read_mode: ReadMode::Fast,
            max_signature_depth: MAX_RECURSION_DEPTH,
            cache: CacheMode::Simple,
        }
    }

    /// Shape metadata plus method body debug information
    #[must_use]
    pub fn extended() -> Self {
        Self {
            read_mode: ReadMode::Extended,
            ..Self::fast()
        }
    }

    /// Replace the read mode.
    #[must_use]
    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    /// Replace the signature depth limit.
    #[must_use]
    pub fn with_max_signature_depth(mut self, depth: usize) -> Self {
        self.max_signature_depth = depth;
        self
    }

    /// Replace the cache mode.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }
}
