//! Structural decoding of JVM class files.
//!
//! This module is the lowest layer of the binary decoder. [`ClassFile::parse`] walks the
//! class file tables in a single pass and produces plain records: constant pool references
//! are dereferenced, names stay in internal form and no other type is ever consulted.
//! Turning these records into context-free tokens is the job of
//! [`crate::pool::TypeExtractor`].
//!
//! # Key Components
//!
//! - [`ClassFile`], [`FieldInfo`], [`MethodInfo`] - The decoded records
//! - [`ReadMode`] - Whether method bodies are skipped or retained
//! - [`constant_pool::ConstantPool`] - Constant pool decoding and lookups
//! - [`attributes`] - Annotation, inner class, parameter and code attribute payloads
//! - [`descriptor`] - Descriptor parsing and name conversions
//! - [`access::AccessFlags`] - Access flag bitsets

pub mod access;
pub mod attributes;
pub mod constant_pool;
pub mod descriptor;
mod reader;

pub use access::AccessFlags;
pub use reader::{ClassFile, FieldInfo, MethodInfo, ReadMode, CLASS_FILE_MAGIC};
