use std::fmt;

use crate::{
    description::{MethodDescription, TypeDescription},
    pool::PoolRef,
    signature::GenericTypeToken,
    Error::IllegalState,
    Result, TypeDescriptionRc,
};

/// The resolved generic view of a type.
#[derive(Clone)]
pub enum GenericType {
    /// A type without generic information
    NonGeneric(TypeDescriptionRc),
    /// A parameterized type, `java.util.List<T>`
    Parameterized {
        /// The erasure
        raw: TypeDescriptionRc,
        /// The type arguments
        arguments: Vec<GenericType>,
        /// The owner type for inner types of generic types
        owner: Option<Box<GenericType>>,
    },
    /// A type variable
    TypeVariable(TypeVariable),
    /// An array of a generic component type
    GenericArray(Box<GenericType>),
    /// A wildcard; an unbound wildcard has no bounds at all
    Wildcard {
        /// `? extends` bounds
        upper_bounds: Vec<GenericType>,
        /// `? super` bounds
        lower_bounds: Vec<GenericType>,
    },
}

impl GenericType {
    /// The erased type.
    ///
    /// # Errors
    /// Wildcards have no erasure and fail with [`crate::Error::IllegalState`]; type
    /// variables erase to their first bound, which may need further descriptions.
    pub fn erasure(&self) -> Result<TypeDescriptionRc> {
        match self {
            GenericType::NonGeneric(description) => Ok(description.clone()),
            GenericType::Parameterized { raw, .. } => Ok(raw.clone()),
            GenericType::TypeVariable(variable) => variable.erasure(),
            GenericType::GenericArray(component) => {
                let erasure = component.erasure()?;
                let pool = erasure
                    .pool()
                    .cloned()
                    .ok_or_else(|| IllegalState(format!("array of {erasure} has no pool")))?;
                Ok(TypeDescription::array_of(erasure, 1, pool))
            }
            GenericType::Wildcard { .. } => {
                Err(IllegalState(format!("wildcard {self} has no erasure")))
            }
        }
    }

    /// Returns true for wildcards.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, GenericType::Wildcard { .. })
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericType::NonGeneric(description) => write!(f, "{}", description.name()),
            GenericType::Parameterized { raw, arguments, .. } => {
                write!(f, "{}", raw.name())?;
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
            GenericType::TypeVariable(variable) => write!(f, "{}", variable.symbol()),
            GenericType::GenericArray(component) => write!(f, "{component}[]"),
            GenericType::Wildcard {
                upper_bounds,
                lower_bounds,
            } => {
                write!(f, "?")?;
                if let Some(bound) = lower_bounds.first() {
                    write!(f, " super {bound}")?;
                } else if let Some(bound) = upper_bounds.first() {
                    write!(f, " extends {bound}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenericType({self})")
    }
}

/// A declaration that can define type variables.
#[derive(Clone)]
pub enum TypeVariableSource {
    /// A generic type
    Type(TypeDescriptionRc),
    /// A generic method or constructor
    Method(MethodDescription),
}

impl TypeVariableSource {
    /// Find the type variable `symbol` declared by this source or by an enclosing one.
    ///
    /// # Errors
    /// Fails if an enclosing declaration cannot be described.
    pub fn find_type_variable(&self, symbol: &str) -> Result<Option<TypeVariable>> {
        let own = match self {
            TypeVariableSource::Type(description) => description.type_variables(),
            TypeVariableSource::Method(method) => method.type_variables(),
        };
        // Malformed declarations contribute no variables.
        if let Ok(variables) = own {
            if let Some(variable) = variables.into_iter().find(|v| v.symbol() == symbol) {
                return Ok(Some(variable));
            }
        }

        match self.enclosing_source()? {
            Some(enclosing) => enclosing.find_type_variable(symbol),
            None => Ok(None),
        }
    }

    /// The declaration whose type variables are visible inside this one.
    ///
    /// For a type that is the enclosing method of a local class or, for non-static nested
    /// types, the enclosing type. For a non-static method it is the declaring type.
    ///
    /// # Errors
    /// Fails if the enclosing declaration cannot be described.
    pub fn enclosing_source(&self) -> Result<Option<TypeVariableSource>> {
        match self {
            TypeVariableSource::Type(description) => {
                if let Some(method) = description.enclosing_method()? {
                    return Ok(Some(TypeVariableSource::Method(method)));
                }
                if description.modifiers()?.is_static() {
                    return Ok(None);
                }
                Ok(description.enclosing_type()?.map(TypeVariableSource::Type))
            }
            TypeVariableSource::Method(method) => {
                if method.is_static() {
                    return Ok(None);
                }
                Ok(Some(TypeVariableSource::Type(method.declaring_type().clone())))
            }
        }
    }
}

impl fmt::Display for TypeVariableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeVariableSource::Type(description) => write!(f, "{}", description.name()),
            TypeVariableSource::Method(method) => write!(
                f,
                "{}.{}{}",
                method.declaring_type().name(),
                method.name(),
                method.descriptor()
            ),
        }
    }
}

/// A formal type variable bound to the declaration that defines it.
///
/// Bounds are resolved on request only, so recursive bounds such as
/// `T extends Comparable<T>` terminate.
#[derive(Clone)]
pub struct TypeVariable {
    symbol: String,
    bounds: Vec<GenericTypeToken>,
    source: TypeVariableSource,
    pool: PoolRef,
}

impl TypeVariable {
    pub(crate) fn new(
        symbol: String,
        bounds: Vec<GenericTypeToken>,
        source: TypeVariableSource,
        pool: PoolRef,
    ) -> Self {
        TypeVariable {
            symbol,
            bounds,
            source,
            pool,
        }
    }

    /// The variable's symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The declaration defining this variable.
    #[must_use]
    pub fn source(&self) -> &TypeVariableSource {
        &self.source
    }

    /// The resolved bounds; `java.lang.Object` if none are declared.
    ///
    /// # Errors
    /// Fails if a bound cannot be described.
    pub fn bounds(&self) -> Result<Vec<GenericType>> {
        if self.bounds.is_empty() {
            let object = self.pool.upgrade()?.describe("java.lang.Object")?.resolve()?;
            return Ok(vec![GenericType::NonGeneric(object)]);
        }
        self.bounds
            .iter()
            .map(|bound| bound.resolve(&self.pool, &self.source))
            .collect()
    }

    /// The erasure of the first bound.
    ///
    /// # Errors
    /// Fails if the bound cannot be described.
    pub fn erasure(&self) -> Result<TypeDescriptionRc> {
        match self.bounds.first() {
            Some(bound) => bound.resolve(&self.pool, &self.source)?.erasure(),
            None => self.pool.upgrade()?.describe("java.lang.Object")?.resolve(),
        }
    }
}

impl GenericTypeToken {
    /// Resolve this token against a pool, looking up type variables in `source`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] for missing types and
    /// [`crate::Error::IllegalState`] for a type variable `source` does not see.
    pub fn resolve(&self, pool: &PoolRef, source: &TypeVariableSource) -> Result<GenericType> {
        let describe = |name: &str| -> Result<TypeDescriptionRc> {
            pool.upgrade()?.describe(name)?.resolve()
        };

        match self {
            GenericTypeToken::Primitive(primitive) => Ok(GenericType::NonGeneric(
                TypeDescription::for_primitive(*primitive),
            )),
            GenericTypeToken::Raw(name) => Ok(GenericType::NonGeneric(describe(name)?)),
            GenericTypeToken::TypeVariable(symbol) => source
                .find_type_variable(symbol)?
                .map(GenericType::TypeVariable)
                .ok_or_else(|| {
                    IllegalState(format!("type variable {symbol} is not visible in {source}"))
                }),
            GenericTypeToken::Parameterized {
                name,
                arguments,
                owner,
            } => Ok(GenericType::Parameterized {
                raw: describe(name)?,
                arguments: arguments
                    .iter()
                    .map(|argument| argument.resolve(pool, source))
                    .collect::<Result<_>>()?,
                owner: match owner {
                    Some(owner) => Some(Box::new(owner.resolve(pool, source)?)),
                    None => None,
                },
            }),
            GenericTypeToken::GenericArray(component) => match component.resolve(pool, source)? {
                GenericType::NonGeneric(description) => Ok(GenericType::NonGeneric(
                    TypeDescription::array_of(description, 1, pool.clone()),
                )),
                generic => Ok(GenericType::GenericArray(Box::new(generic))),
            },
            GenericTypeToken::UnboundWildcard => Ok(GenericType::Wildcard {
                upper_bounds: Vec::new(),
                lower_bounds: Vec::new(),
            }),
            GenericTypeToken::UpperBoundWildcard(bound) => Ok(GenericType::Wildcard {
                upper_bounds: vec![bound.resolve(pool, source)?],
                lower_bounds: Vec::new(),
            }),
            GenericTypeToken::LowerBoundWildcard(bound) => Ok(GenericType::Wildcard {
                upper_bounds: Vec::new(),
                lower_bounds: vec![bound.resolve(pool, source)?],
            }),
        }
    }
}

/// Resolve a token, or fall back to `erasure` when the token is absent.
pub(crate) fn resolve_or_erasure(
    token: Option<&GenericTypeToken>,
    pool: &PoolRef,
    source: &TypeVariableSource,
    erasure: impl FnOnce() -> Result<TypeDescriptionRc>,
) -> Result<GenericType> {
    match token {
        Some(token) => token.resolve(pool, source),
        None => Ok(GenericType::NonGeneric(erasure()?)),
    }
}
