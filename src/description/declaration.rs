use crate::{
    description::member::MethodDescription,
    pool::PoolRc,
    Error::IllegalState,
    Result, TypeDescriptionRc,
};

/// How a type is nested.
///
/// Names are binary names; the method of [`DeclarationContext::DeclaredInMethod`] is
/// identified by name and descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DeclarationContext {
    /// A top-level type
    #[default]
    SelfDeclared,
    /// A member type, or a local or anonymous type declared in an initializer
    DeclaredInType(String),
    /// A local or anonymous type declared inside a method or constructor
    DeclaredInMethod {
        /// Binary name of the type declaring the method
        owner: String,
        /// Method name
        name: String,
        /// Method descriptor
        descriptor: String,
    },
}

impl DeclarationContext {
    /// Returns true for top-level types.
    #[must_use]
    pub fn is_self_declared(&self) -> bool {
        matches!(self, DeclarationContext::SelfDeclared)
    }

    /// Returns true for types nested directly in another type.
    #[must_use]
    pub fn is_declared_in_type(&self) -> bool {
        matches!(self, DeclarationContext::DeclaredInType(_))
    }

    /// Returns true for types declared inside a method.
    #[must_use]
    pub fn is_declared_in_method(&self) -> bool {
        matches!(self, DeclarationContext::DeclaredInMethod { .. })
    }

    /// Binary name of the enclosing type, if any.
    #[must_use]
    pub fn owner_name(&self) -> Option<&str> {
        match self {
            DeclarationContext::SelfDeclared => None,
            DeclarationContext::DeclaredInType(owner)
            | DeclarationContext::DeclaredInMethod { owner, .. } => Some(owner),
        }
    }

    /// Describe the enclosing type through `pool`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the enclosing type cannot be found.
    pub fn enclosing_type(&self, pool: &PoolRc) -> Result<Option<TypeDescriptionRc>> {
        match self.owner_name() {
            Some(owner) => Ok(Some(pool.describe(owner)?.resolve()?)),
            None => Ok(None),
        }
    }

    /// Locate the enclosing method among the declared methods of `owner_type`, the already
    /// described enclosing type.
    ///
    /// # Errors
    /// Returns [`crate::Error::IllegalState`] if `owner_type` does not declare the recorded
    /// method.
    pub fn enclosing_method(&self, owner_type: &TypeDescriptionRc) -> Result<Option<MethodDescription>> {
        let DeclarationContext::DeclaredInMethod {
            owner,
            name,
            descriptor,
        } = self
        else {
            return Ok(None);
        };

        owner_type
            .declared_methods()?
            .into_iter()
            .find(|method| method.name() == name && method.descriptor() == descriptor)
            .map(Some)
            .ok_or_else(|| {
                IllegalState(format!("{owner} does not declare enclosing method {name}{descriptor}"))
            })
    }
}
