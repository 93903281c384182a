use std::fmt;

use tracing::debug;

use crate::{
    classfile::descriptor::{name_to_descriptor, Primitive},
    Result,
};

/// A node of a tokenized generic signature.
///
/// Names are binary names (`java.util.Map$Entry`). A token never refers to a description;
/// it is resolved against a pool and a type variable source only when a generic view is
/// requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericTypeToken {
    /// A primitive type or `void`
    Primitive(Primitive),
    /// A non-generic reference type
    Raw(String),
    /// A reference to a type variable by its symbol
    TypeVariable(String),
    /// A parameterized type, possibly nested in a generic owner type
    Parameterized {
        /// Binary name of the raw type
        name: String,
        /// Type arguments; empty for a non-generic inner type of a generic owner
        arguments: Vec<GenericTypeToken>,
        /// The owner type for inner types written as `Outer<T>.Inner`
        owner: Option<Box<GenericTypeToken>>,
    },
    /// An array whose component is itself written as a signature
    GenericArray(Box<GenericTypeToken>),
    /// `?`
    UnboundWildcard,
    /// `? extends bound`
    UpperBoundWildcard(Box<GenericTypeToken>),
    /// `? super bound`
    LowerBoundWildcard(Box<GenericTypeToken>),
}

impl GenericTypeToken {
    /// Binary name of the erasure of this token.
    ///
    /// Type variables and unbound or lower-bound wildcards erase to `java.lang.Object` at this
    /// level; the bound-aware erasure of a type variable is available on the resolved
    /// [`crate::description::GenericType`].
    #[must_use]
    pub fn erasure(&self) -> String {
        match self {
            GenericTypeToken::Primitive(primitive) => primitive.name().to_string(),
            GenericTypeToken::Raw(name) | GenericTypeToken::Parameterized { name, .. } => {
                name.clone()
            }
            GenericTypeToken::TypeVariable(_)
            | GenericTypeToken::UnboundWildcard
            | GenericTypeToken::LowerBoundWildcard(_) => "java.lang.Object".to_string(),
            GenericTypeToken::UpperBoundWildcard(bound) => bound.erasure(),
            GenericTypeToken::GenericArray(component) => {
                format!("[{}", name_to_descriptor(&component.erasure()).replace('/', "."))
            }
        }
    }

    /// Returns true for the three wildcard variants.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(
            self,
            GenericTypeToken::UnboundWildcard
                | GenericTypeToken::UpperBoundWildcard(_)
                | GenericTypeToken::LowerBoundWildcard(_)
        )
    }
}

impl fmt::Display for GenericTypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericTypeToken::Primitive(primitive) => write!(f, "{primitive}"),
            GenericTypeToken::Raw(name) | GenericTypeToken::TypeVariable(name) => {
                write!(f, "{name}")
            }
            GenericTypeToken::Parameterized {
                name, arguments, ..
            } => {
                write!(f, "{name}")?;
                if !arguments.is_empty() {
                    write!(f, "<")?;
                    for (index, argument) in arguments.iter().enumerate() {
                        if index > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            GenericTypeToken::GenericArray(component) => write!(f, "{component}[]"),
            GenericTypeToken::UnboundWildcard => write!(f, "?"),
            GenericTypeToken::UpperBoundWildcard(bound) => write!(f, "? extends {bound}"),
            GenericTypeToken::LowerBoundWildcard(bound) => write!(f, "? super {bound}"),
        }
    }
}

/// A formal type variable declaration, `T extends Number & Comparable<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVariableToken {
    /// The variable's symbol
    pub symbol: String,
    /// Declared bounds in order; an omitted class bound is not represented
    pub bounds: Vec<GenericTypeToken>,
}

/// The tokenized `Signature` attribute of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    /// Formal type variables
    pub type_variables: Vec<TypeVariableToken>,
    /// Generic superclass
    pub super_class: GenericTypeToken,
    /// Generic superinterfaces
    pub interfaces: Vec<GenericTypeToken>,
}

/// The tokenized `Signature` attribute of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Formal type variables
    pub type_variables: Vec<TypeVariableToken>,
    /// Generic parameter types
    pub parameters: Vec<GenericTypeToken>,
    /// Generic return type
    pub return_type: GenericTypeToken,
    /// Generic exception types
    pub exceptions: Vec<GenericTypeToken>,
}

/// The state of a declaration's generic signature after decoding.
///
/// Decoding never fails because of a signature: a missing attribute yields
/// [`Signature::Raw`] and an unparsable one [`Signature::Malformed`], both of which make
/// generic accessors fall back to the erasure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature<T> {
    /// No signature attribute was present
    Raw,
    /// A signature attribute was present but could not be tokenized; holds the raw text
    Malformed(String),
    /// The tokenized signature
    Tokenized(T),
}

impl<T> Signature<T> {
    /// Tokenize an optional raw signature, degrading parse failures to
    /// [`Signature::Malformed`].
    pub fn tokenize<F>(raw: Option<&str>, parse: F) -> Signature<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        let Some(raw) = raw else {
            return Signature::Raw;
        };

        match parse(raw) {
            Ok(tokens) => Signature::Tokenized(tokens),
            Err(error) => {
                debug!(signature = raw, %error, "degrading malformed generic signature");
                Signature::Malformed(raw.to_string())
            }
        }
    }

    /// The tokens, if the signature was tokenized.
    #[must_use]
    pub fn tokens(&self) -> Option<&T> {
        match self {
            Signature::Tokenized(tokens) => Some(tokens),
            _ => None,
        }
    }

    /// Returns true if a signature was present but could not be tokenized.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Signature::Malformed(_))
    }
}
