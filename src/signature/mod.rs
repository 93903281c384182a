//! Generic signature tokenizing.
//!
//! Generic type information survives compilation only as `Signature` attribute strings. This
//! module turns those strings into [`GenericTypeToken`] trees. Tokenizing needs no context:
//! type variable references stay symbolic and class references stay names, so a signature is
//! parsed once at decode time and resolved lazily, possibly many times, against whatever type
//! or method declares it.
//!
//! # Key Components
//!
//! - [`parse_class_signature`], [`parse_method_signature`], [`parse_field_signature`] -
//!   Entry points
//! - [`parser::SignatureParser`] - The recursive descent parser
//! - [`GenericTypeToken`], [`TypeVariableToken`] - The token tree
//! - [`Signature`] - Raw, malformed or tokenized state of a declaration's signature
//!
//! # Examples
//!
//! ```rust
//! use classpool::signature::{parse_field_signature, GenericTypeToken};
//!
//! let token = parse_field_signature("Ljava/util/List<+Ljava/lang/Number;>;")?;
//! assert_eq!(token.to_string(), "java.util.List<? extends java.lang.Number>");
//! assert_eq!(token.erasure(), "java.util.List");
//! # Ok::<(), classpool::Error>(())
//! ```

pub mod parser;
mod types;

pub use parser::MAX_RECURSION_DEPTH;
pub use types::{ClassSignature, GenericTypeToken, MethodSignature, Signature, TypeVariableToken};

use crate::Result;
use parser::SignatureParser;

/// Parse the `Signature` attribute of a class.
///
/// # Errors
/// Returns [`crate::Error::MalformedSignature`] or [`crate::Error::RecursionLimit`].
pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    SignatureParser::new(signature).parse_class_signature()
}

/// Parse the `Signature` attribute of a method.
///
/// # Errors
/// Returns [`crate::Error::MalformedSignature`] or [`crate::Error::RecursionLimit`].
pub fn parse_method_signature(signature: &str) -> Result<MethodSignature> {
    SignatureParser::new(signature).parse_method_signature()
}

/// Parse the `Signature` attribute of a field.
///
/// # Errors
/// Returns [`crate::Error::MalformedSignature`] or [`crate::Error::RecursionLimit`].
pub fn parse_field_signature(signature: &str) -> Result<GenericTypeToken> {
    SignatureParser::new(signature).parse_field_signature()
}
