//! # classpool Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the classpool library. Import this module to get quick access to the essential
//! types for describing JVM types.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all classpool operations
pub use crate::Error;

/// The result type used throughout classpool
pub use crate::Result;

/// Low-level byte access
pub use crate::{File, Parser};

// ================================================================================================
// Locators
// ================================================================================================

/// Class file locators and their shared handle type
pub use crate::locator::{
    ArchiveLocator, Binary, ClassFileLocator, ClassPathLocator, CompoundLocator, FolderLocator,
    LocatorRc, NoOpLocator, ResourceLoader, ResourceLocator, SimpleLocator,
};

// ================================================================================================
// Pools
// ================================================================================================

/// Pools, resolutions and configuration
pub use crate::pool::{
    CacheMode, CacheProvider, DefaultPool, ExplicitPool, HierarchyPool, LazyFacadePool,
    NoOpCache, PoolConfig, PoolRc, PoolRef, Resolution, SimpleCache, TypePool,
};

/// Class file read mode
pub use crate::classfile::ReadMode;

// ================================================================================================
// Descriptions
// ================================================================================================

/// Type and member descriptions
pub use crate::description::{
    DeclarationContext, FieldDescription, MethodDescription, ParameterDescription,
    TypeDescription, TypeDescriptionRc,
};

/// The generic view
pub use crate::description::{GenericType, TypeVariable, TypeVariableSource};

/// Access flags
pub use crate::classfile::AccessFlags;

// ================================================================================================
// Annotations
// ================================================================================================

/// Annotation descriptions and loaded instances
pub use crate::annotation::{
    Annotation, AnnotationDescription, AnnotationInstance, AnnotationValue, ArrayComponent,
    ConstantValue, LoadedValue,
};
