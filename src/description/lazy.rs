use std::sync::{Arc, OnceLock, Weak};

use crate::{
    annotation::AnnotationDescription,
    classfile::AccessFlags,
    description::{
        memoize, FieldDescription, GenericType, MethodDescription, TypeVariable,
        TypeVariableSource,
    },
    pool::{token::TypeToken, PoolRef},
    signature::Signature,
    Error::MalformedSignature,
    Result, TypeDescription, TypeDescriptionRc,
};

/// A type description backed by a decoded [`TypeToken`].
///
/// Cross-type properties are described through the owning pool on first access and
/// memoized. Failed lookups are not memoized and are retried on the next access.
///
/// Member types are remembered weakly: they hold their declaring type strongly, and the
/// two links together would otherwise form a cycle.
pub struct LazyTypeDescription {
    token: Arc<TypeToken>,
    pool: PoolRef,
    super_class: OnceLock<Option<TypeDescriptionRc>>,
    interfaces: OnceLock<Vec<TypeDescriptionRc>>,
    declared_types: OnceLock<Vec<Weak<TypeDescription>>>,
    enclosing_type: OnceLock<Option<TypeDescriptionRc>>,
    enclosing_method: OnceLock<Option<MethodDescription>>,
    declaring_type: OnceLock<Option<TypeDescriptionRc>>,
}

impl LazyTypeDescription {
    pub(crate) fn new(token: Arc<TypeToken>, pool: PoolRef) -> Self {
        LazyTypeDescription {
            token,
            pool,
            super_class: OnceLock::new(),
            interfaces: OnceLock::new(),
            declared_types: OnceLock::new(),
            enclosing_type: OnceLock::new(),
            enclosing_method: OnceLock::new(),
            declaring_type: OnceLock::new(),
        }
    }

    /// The decoded token.
    #[must_use]
    pub fn token(&self) -> &Arc<TypeToken> {
        &self.token
    }

    pub(crate) fn pool(&self) -> &PoolRef {
        &self.pool
    }

    pub(crate) fn name(&self) -> &str {
        &self.token.name
    }

    pub(crate) fn modifiers(&self) -> AccessFlags {
        self.token.modifiers
    }

    pub(crate) fn simple_name(&self) -> String {
        if self.token.anonymous {
            return String::new();
        }
        if let Some(inner_name) = &self.token.inner_name {
            return inner_name.clone();
        }
        match self.token.name.rsplit_once('.') {
            Some((_, simple)) => simple.to_string(),
            None => self.token.name.clone(),
        }
    }

    fn describe(&self, name: &str) -> Result<TypeDescriptionRc> {
        self.pool.upgrade()?.describe(name)?.resolve()
    }

    pub(crate) fn super_class(&self) -> Result<Option<TypeDescriptionRc>> {
        memoize(&self.super_class, || match &self.token.super_class {
            Some(name) => Ok(Some(self.describe(name)?)),
            None => Ok(None),
        })
    }

    pub(crate) fn interfaces(&self) -> Result<Vec<TypeDescriptionRc>> {
        memoize(&self.interfaces, || {
            self.token
                .interfaces
                .iter()
                .map(|name| self.describe(name))
                .collect()
        })
    }

    pub(crate) fn generic_super_class(
        &self,
        this: &TypeDescriptionRc,
    ) -> Result<Option<GenericType>> {
        if self.token.super_class.is_none() {
            return Ok(None);
        }
        match &self.token.signature {
            Signature::Tokenized(signature) => Ok(Some(
                signature
                    .super_class
                    .resolve(&self.pool, &TypeVariableSource::Type(this.clone()))?,
            )),
            _ => Ok(self.super_class()?.map(GenericType::NonGeneric)),
        }
    }

    pub(crate) fn generic_interfaces(&self, this: &TypeDescriptionRc) -> Result<Vec<GenericType>> {
        match &self.token.signature {
            Signature::Tokenized(signature)
                if signature.interfaces.len() == self.token.interfaces.len() =>
            {
                let source = TypeVariableSource::Type(this.clone());
                signature
                    .interfaces
                    .iter()
                    .map(|interface| interface.resolve(&self.pool, &source))
                    .collect()
            }
            _ => Ok(self
                .interfaces()?
                .into_iter()
                .map(GenericType::NonGeneric)
                .collect()),
        }
    }

    pub(crate) fn type_variables(&self, this: &TypeDescriptionRc) -> Result<Vec<TypeVariable>> {
        match &self.token.signature {
            Signature::Raw => Ok(Vec::new()),
            Signature::Malformed(raw) => Err(MalformedSignature(raw.clone())),
            Signature::Tokenized(signature) => Ok(signature
                .type_variables
                .iter()
                .map(|variable| {
                    TypeVariable::new(
                        variable.symbol.clone(),
                        variable.bounds.clone(),
                        TypeVariableSource::Type(this.clone()),
                        self.pool.clone(),
                    )
                })
                .collect()),
        }
    }

    pub(crate) fn declared_fields(&self, this: &TypeDescriptionRc) -> Vec<FieldDescription> {
        self.token
            .fields
            .iter()
            .map(|field| FieldDescription::new(this.clone(), field.clone(), self.pool.clone()))
            .collect()
    }

    pub(crate) fn declared_methods(&self, this: &TypeDescriptionRc) -> Vec<MethodDescription> {
        self.token
            .methods
            .iter()
            .map(|method| MethodDescription::new(this.clone(), method.clone(), self.pool.clone()))
            .collect()
    }

    pub(crate) fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        self.token
            .annotations
            .iter()
            .map(|annotation| AnnotationDescription::new(annotation.clone(), self.pool.clone()))
            .collect()
    }

    pub(crate) fn declared_types(&self) -> Result<Vec<TypeDescriptionRc>> {
        if let Some(types) = self
            .declared_types
            .get()
            .and_then(|known| known.iter().map(Weak::upgrade).collect::<Option<Vec<_>>>())
        {
            return Ok(types);
        }

        let types = self
            .token
            .declared_types
            .iter()
            .map(|name| self.describe(name))
            .collect::<Result<Vec<_>>>()?;
        let _ = self
            .declared_types
            .set(types.iter().map(Arc::downgrade).collect());
        Ok(types)
    }

    /// Describe an enclosing or declaring type, reusing whichever of the two is already
    /// memoized under the same name.
    fn describe_outer(&self, name: &str) -> Result<TypeDescriptionRc> {
        let known = [&self.enclosing_type, &self.declaring_type]
            .into_iter()
            .filter_map(|cell| cell.get().cloned().flatten())
            .find(|outer| outer.name() == name);
        match known {
            Some(outer) => Ok(outer),
            None => self.describe(name),
        }
    }

    pub(crate) fn enclosing_type(&self) -> Result<Option<TypeDescriptionRc>> {
        memoize(&self.enclosing_type, || {
            match self.token.declaration_context.owner_name() {
                Some(owner) => Ok(Some(self.describe_outer(owner)?)),
                None => Ok(None),
            }
        })
    }

    pub(crate) fn enclosing_method(&self) -> Result<Option<MethodDescription>> {
        if !self.token.declaration_context.is_declared_in_method() {
            return Ok(None);
        }
        memoize(&self.enclosing_method, || match self.enclosing_type()? {
            Some(owner_type) => self.token.declaration_context.enclosing_method(&owner_type),
            None => Ok(None),
        })
    }

    pub(crate) fn declaring_type(&self) -> Result<Option<TypeDescriptionRc>> {
        memoize(&self.declaring_type, || match &self.token.declaring_type {
            Some(name) => Ok(Some(self.describe_outer(name)?)),
            None => Ok(None),
        })
    }
}
