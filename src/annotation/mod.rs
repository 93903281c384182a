//! Annotation values and their materialization.
//!
//! Annotations are decoded into [`crate::pool::token::AnnotationToken`]s that refer to every
//! type by descriptor only. This module turns them into something useful in two steps:
//!
//! - [`AnnotationDescription`] binds a token to its pool. It answers questions about the
//!   declared values and falls back to the defaults declared on the annotation type.
//! - [`AnnotationInstance`] is the materialized annotation. Its property values are
//!   [`LoadedValue`]s with every type, enumeration and nested annotation resolved, using
//!   the error vocabulary of annotation loading ([`crate::Error::ClassNotFound`],
//!   [`crate::Error::EnumConstantNotPresent`], [`crate::Error::AnnotationTypeMismatch`],
//!   [`crate::Error::IncompleteAnnotation`]).
//!
//! Array values need a component type that the class file does not record. The
//! [`ComponentTypeLocator`] used while decoding decides where it comes from and the bound
//! [`ComponentTypeReference`] recovers it on load.

mod component;
mod instance;
mod loaded;
mod value;

pub use component::{ComponentTypeLocator, ComponentTypeReference};
pub use instance::{Annotation, AnnotationInstance};
pub use loaded::{ArrayComponent, LoadedValue};
pub use value::{AnnotationValue, ConstantValue};

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{
    description::memoize,
    pool::{token::AnnotationToken, PoolRc, PoolRef},
    Error::{ClassNotFound, IllegalState, NoSuchType},
    Result, TypeDescriptionRc,
};

/// An annotation declared on a type, member or parameter.
#[derive(Clone)]
pub struct AnnotationDescription {
    token: Arc<AnnotationToken>,
    pool: PoolRef,
    annotation_type: OnceLock<TypeDescriptionRc>,
}

impl AnnotationDescription {
    pub(crate) fn new(token: Arc<AnnotationToken>, pool: PoolRef) -> Self {
        AnnotationDescription {
            token,
            pool,
            annotation_type: OnceLock::new(),
        }
    }

    /// The decoded token.
    #[must_use]
    pub fn token(&self) -> &Arc<AnnotationToken> {
        &self.token
    }

    /// Binary name of the annotation type.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.token.type_name()
    }

    /// Describe the annotation type.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the annotation type cannot be found and
    /// [`crate::Error::PoolReleased`] if the pool is gone.
    pub fn annotation_type(&self) -> Result<TypeDescriptionRc> {
        memoize(&self.annotation_type, || {
            self.pool.upgrade()?.describe(&self.type_name())?.resolve()
        })
    }

    /// The explicitly given values; properties left at their default are absent.
    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.token.values
    }

    /// The value of a property, falling back to the default declared on the annotation type.
    ///
    /// Returns `None` if the property has neither a value nor a default.
    ///
    /// # Errors
    /// The annotation type is described only if no explicit value exists; failures to do
    /// so propagate.
    pub fn value(&self, property: &str) -> Result<Option<AnnotationValue>> {
        if let Some(value) = self.token.values.get(property) {
            return Ok(Some(value.clone()));
        }

        let default = self
            .annotation_type()?
            .declared_methods()?
            .into_iter()
            .find(|method| method.name() == property && method.descriptor().starts_with("()"))
            .and_then(|method| method.default_value().cloned());
        Ok(default)
    }

    /// Materialize this annotation, resolving types through `loader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ClassNotFound`] if the annotation type cannot be found and
    /// [`crate::Error::IllegalState`] if the type is not an annotation type.
    pub fn load(&self, loader: &PoolRc) -> Result<Arc<AnnotationInstance>> {
        let name = self.type_name();
        let annotation_type = loader
            .describe(&name)?
            .resolve()
            .map_err(|error| match error {
                NoSuchType(name) => ClassNotFound(name),
                other => other,
            })?;
        if !annotation_type.is_annotation()? {
            return Err(IllegalState(format!("{name} is not an annotation type")));
        }

        Ok(Arc::new(AnnotationInstance::new(
            annotation_type,
            self.token.values.clone(),
            loader.clone(),
        )?))
    }
}

impl Annotation for AnnotationDescription {
    fn annotation_type_name(&self) -> String {
        self.type_name()
    }

    fn property_values(&self) -> Result<BTreeMap<String, LoadedValue>> {
        self.load(&self.pool.upgrade()?)?.property_values()
    }
}

impl fmt::Debug for AnnotationDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationDescription")
            .field("type", &self.type_name())
            .field("values", &self.token.values)
            .finish()
    }
}
