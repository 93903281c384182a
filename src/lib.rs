// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # classpool
//!
//! Type metadata for JVM class files, without a JVM.
//!
//! `classpool` answers questions about compiled Java types by name: what is the superclass of
//! `java.util.ArrayList`, which methods does it declare, what are the generic bounds of its
//! type variables, which annotations does it carry and with what values. Class files are
//! found by pluggable locators (directories, jars, class paths), decoded once into compact
//! tokens and exposed through lazy descriptions that only decode the types they actually
//! touch.
//!
//! ## Features
//!
//! - **📦 Pluggable sources** - Directories, jar archives, class paths and in-memory tables
//! - **⚡ Lazy by default** - Related types are described on first access and memoized
//! - **🧵 Concurrent** - Pools and descriptions are `Send + Sync`; caches are lock-free maps
//! - **🧬 Full generics** - Class, method and field signatures with lazily bound type variables
//! - **🏷️ Annotations** - Declared values, defaults and fully loaded annotation instances
//! - **🛡️ Resilient** - Missing types and malformed signatures degrade instead of failing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use classpool::prelude::*;
//!
//! let pool = DefaultPool::new(FolderLocator::new("target/classes").into_rc(), PoolConfig::default());
//!
//! let description = pool.describe("com.example.Service")?.resolve()?;
//! println!("{} extends {:?}", description.name(), description.super_class()?);
//! for method in description.declared_methods()? {
//!     println!("  {}{}", method.name(), method.descriptor());
//! }
//! # Ok::<(), classpool::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`locator`] - Turns a binary name into class file bytes
//! - [`classfile`] - Structural class file decoding
//! - [`signature`] - Generic signature tokenizing
//! - [`pool`] - Type pools, caches and the token extractor
//! - [`description`] - Lazy type, member and generic descriptions
//! - [`annotation`] - Annotation values and materialized annotation instances
//! - [`Error`] and [`Result`] - Error handling
//!
//! ### Resolution
//!
//! [`TypePool::describe`] never fails because a type is missing. It returns a
//! [`Resolution`] that is either resolved, unresolved or deferred; only
//! [`Resolution::resolve`] turns absence into [`Error::NoSuchType`]. Descriptions keep a weak
//! reference to their pool, so dropping the pool releases every cached type; reading a
//! cross-type property afterwards fails with [`Error::PoolReleased`].
//!
//! ### Logging
//!
//! The crate logs through [`tracing`]. Decoding is logged at `debug`, misses and degraded
//! inputs at `trace`. Install any subscriber to see them.
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Byte sources and the big-endian parsing primitives.
pub mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use classpool::prelude::*;
///
/// let pool = DefaultPool::new(NoOpLocator.into_rc(), PoolConfig::default());
/// assert!(pool.describe("int")?.is_resolved());
/// # Ok::<(), classpool::Error>(())
/// ```
pub mod prelude;

/// Class file decoding: constant pool, members, attributes and descriptors.
pub mod classfile;

/// Generic signature parsing into context-free token trees.
pub mod signature;

/// Class file locators: directories, archives, class paths and explicit tables.
pub mod locator;

/// Type pools, resolution caching and the class file to token extractor.
pub mod pool;

/// Lazy type, member and generic type descriptions.
pub mod description;

/// Annotation descriptions, values and loaded annotation instances.
pub mod annotation;

/// `classpool` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use classpool::{prelude::*, Result};
///
/// fn super_class_name(pool: &dyn TypePool, name: &str) -> Result<Option<String>> {
///     let description = pool.describe(name)?.resolve()?;
///     Ok(description.super_class()?.map(|s| s.name().to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `classpool` Error type
///
/// # Examples
///
/// ```rust
/// use classpool::{prelude::*, Error};
///
/// let pool = DefaultPool::new(NoOpLocator.into_rc(), PoolConfig::default());
/// match pool.describe("java/lang/Object") {
///     Err(Error::IllegalName(name)) => println!("not a binary name: {name}"),
///     other => println!("{other:?}"),
/// }
/// ```
pub use error::Error;

/// Low-level byte access and parsing.
pub use file::{parser::Parser, File};

/// Access flag bitset shared by types, members and parameters.
pub use classfile::AccessFlags;

/// Pools and resolutions.
///
/// See [`pool`] for an overview.
pub use pool::{
    DefaultPool, ExplicitPool, HierarchyPool, LazyFacadePool, PoolConfig, PoolRc, Resolution,
    TypePool,
};

/// Type descriptions.
///
/// See [`description`] for an overview.
pub use description::{TypeDescription, TypeDescriptionRc};
