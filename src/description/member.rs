use std::{fmt, sync::Arc};

use crate::{
    annotation::{AnnotationDescription, AnnotationValue},
    classfile::{
        attributes::LineNumber,
        descriptor::{descriptor_to_name, parse_method_descriptor, stack_size},
        AccessFlags,
    },
    description::{generic::resolve_or_erasure, GenericType, TypeVariable, TypeVariableSource},
    pool::{
        token::{AnnotationToken, FieldToken, MethodToken},
        PoolRef,
    },
    signature::Signature,
    Error::MalformedSignature,
    Result, TypeDescriptionRc,
};

fn describe(pool: &PoolRef, descriptor: &str) -> Result<TypeDescriptionRc> {
    let name = if descriptor == "V" {
        "void".to_string()
    } else {
        descriptor_to_name(descriptor)?
    };
    pool.upgrade()?.describe(&name)?.resolve()
}

fn annotations(pool: &PoolRef, tokens: &[Arc<AnnotationToken>]) -> Vec<AnnotationDescription> {
    tokens
        .iter()
        .map(|token| AnnotationDescription::new(token.clone(), pool.clone()))
        .collect()
}

/// A field bound to its declaring type.
#[derive(Clone)]
pub struct FieldDescription {
    declaring_type: TypeDescriptionRc,
    token: Arc<FieldToken>,
    pool: PoolRef,
}

impl FieldDescription {
    pub(crate) fn new(declaring_type: TypeDescriptionRc, token: Arc<FieldToken>, pool: PoolRef) -> Self {
        FieldDescription {
            declaring_type,
            token,
            pool,
        }
    }

    /// The decoded token.
    #[must_use]
    pub fn token(&self) -> &Arc<FieldToken> {
        &self.token
    }

    /// The declaring type.
    #[must_use]
    pub fn declaring_type(&self) -> &TypeDescriptionRc {
        &self.declaring_type
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.token.name
    }

    /// Field descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.token.descriptor
    }

    /// Access flags.
    #[must_use]
    pub fn modifiers(&self) -> AccessFlags {
        self.token.modifiers
    }

    /// The erased field type.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the type cannot be found.
    pub fn field_type(&self) -> Result<TypeDescriptionRc> {
        describe(&self.pool, &self.token.descriptor)
    }

    /// The generic field type, falling back to the erasure for raw or malformed signatures.
    ///
    /// # Errors
    /// Fails if a referenced type cannot be found.
    pub fn generic_type(&self) -> Result<GenericType> {
        resolve_or_erasure(
            self.token.signature.tokens(),
            &self.pool,
            &TypeVariableSource::Type(self.declaring_type.clone()),
            || self.field_type(),
        )
    }

    /// Declared annotations.
    #[must_use]
    pub fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        annotations(&self.pool, &self.token.annotations)
    }
}

impl PartialEq for FieldDescription {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type && self.token.name == other.token.name
    }
}

impl fmt::Debug for FieldDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}:{}",
            self.declaring_type.name(),
            self.token.name,
            self.token.descriptor
        )
    }
}

/// A method or constructor bound to its declaring type.
#[derive(Clone)]
pub struct MethodDescription {
    declaring_type: TypeDescriptionRc,
    token: Arc<MethodToken>,
    pool: PoolRef,
}

impl MethodDescription {
    pub(crate) fn new(declaring_type: TypeDescriptionRc, token: Arc<MethodToken>, pool: PoolRef) -> Self {
        MethodDescription {
            declaring_type,
            token,
            pool,
        }
    }

    /// The decoded token.
    #[must_use]
    pub fn token(&self) -> &Arc<MethodToken> {
        &self.token
    }

    /// The declaring type.
    #[must_use]
    pub fn declaring_type(&self) -> &TypeDescriptionRc {
        &self.declaring_type
    }

    /// Method name, `<init>` for constructors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.token.name
    }

    /// Method descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.token.descriptor
    }

    /// Access flags.
    #[must_use]
    pub fn modifiers(&self) -> AccessFlags {
        self.token.modifiers
    }

    /// Returns true for static methods.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.token.modifiers.is_static()
    }

    /// Returns true for constructors.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.token.name == "<init>"
    }

    /// The erased return type, `void` included.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the type cannot be found.
    pub fn return_type(&self) -> Result<TypeDescriptionRc> {
        let descriptor = parse_method_descriptor(&self.token.descriptor)?;
        describe(&self.pool, &descriptor.return_type)
    }

    /// The erased parameter types.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if a type cannot be found.
    pub fn parameter_types(&self) -> Result<Vec<TypeDescriptionRc>> {
        parse_method_descriptor(&self.token.descriptor)?
            .parameters
            .iter()
            .map(|parameter| describe(&self.pool, parameter))
            .collect()
    }

    /// The declared exception types.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if a type cannot be found.
    pub fn exception_types(&self) -> Result<Vec<TypeDescriptionRc>> {
        let pool = self.pool.upgrade()?;
        self.token
            .exceptions
            .iter()
            .map(|name| pool.describe(name)?.resolve())
            .collect()
    }

    /// The formal parameters.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the method descriptor is invalid.
    pub fn parameters(&self) -> Result<Vec<ParameterDescription>> {
        let descriptor = parse_method_descriptor(&self.token.descriptor)?;
        let mut offset = usize::from(!self.is_static());
        let mut parameters = Vec::with_capacity(descriptor.parameters.len());
        for (index, parameter) in descriptor.parameters.iter().enumerate() {
            parameters.push(ParameterDescription {
                method: self.clone(),
                index,
                offset,
                descriptor: parameter.clone(),
            });
            offset += stack_size(parameter);
        }
        Ok(parameters)
    }

    fn source(&self) -> TypeVariableSource {
        TypeVariableSource::Method(self.clone())
    }

    /// The generic return type, falling back to the erasure for raw or malformed
    /// signatures.
    ///
    /// # Errors
    /// Fails if a referenced type cannot be found.
    pub fn generic_return_type(&self) -> Result<GenericType> {
        resolve_or_erasure(
            self.token.signature.tokens().map(|signature| &signature.return_type),
            &self.pool,
            &self.source(),
            || self.return_type(),
        )
    }

    /// The generic parameter types.
    ///
    /// Signatures of some synthetic constructors omit parameters; if the parameter count of
    /// the signature disagrees with the descriptor, the erasures are used.
    ///
    /// # Errors
    /// Fails if a referenced type cannot be found.
    pub fn generic_parameter_types(&self) -> Result<Vec<GenericType>> {
        let erased = parse_method_descriptor(&self.token.descriptor)?.parameters;
        match self.token.signature.tokens() {
            Some(signature) if signature.parameters.len() == erased.len() => {
                let source = self.source();
                signature
                    .parameters
                    .iter()
                    .map(|parameter| parameter.resolve(&self.pool, &source))
                    .collect()
            }
            _ => self
                .parameter_types()?
                .into_iter()
                .map(|parameter| Ok(GenericType::NonGeneric(parameter)))
                .collect(),
        }
    }

    /// The generic exception types; the erasures if the signature declares none.
    ///
    /// # Errors
    /// Fails if a referenced type cannot be found.
    pub fn generic_exception_types(&self) -> Result<Vec<GenericType>> {
        match self.token.signature.tokens() {
            Some(signature) if !signature.exceptions.is_empty() => {
                let source = self.source();
                signature
                    .exceptions
                    .iter()
                    .map(|exception| exception.resolve(&self.pool, &source))
                    .collect()
            }
            _ => Ok(self
                .exception_types()?
                .into_iter()
                .map(GenericType::NonGeneric)
                .collect()),
        }
    }

    /// The formal type variables of a generic method.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSignature`] if the signature could not be tokenized.
    pub fn type_variables(&self) -> Result<Vec<TypeVariable>> {
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
                        self.source(),
                        self.pool.clone(),
                    )
                })
                .collect()),
        }
    }

    /// Find a type variable visible in this method.
    ///
    /// # Errors
    /// Fails if the declaring type's enclosing declarations cannot be described.
    pub fn find_type_variable(&self, symbol: &str) -> Result<Option<TypeVariable>> {
        self.source().find_type_variable(symbol)
    }

    /// Declared annotations.
    #[must_use]
    pub fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        annotations(&self.pool, &self.token.annotations)
    }

    /// The default value of an annotation property.
    #[must_use]
    pub fn default_value(&self) -> Option<&AnnotationValue> {
        self.token.default_value.as_ref()
    }

    /// Line number table entries; empty unless decoded in extended mode.
    #[must_use]
    pub fn line_numbers(&self) -> &[LineNumber] {
        &self.token.line_numbers
    }
}

impl PartialEq for MethodDescription {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.token.name == other.token.name
            && self.token.descriptor == other.token.descriptor
    }
}

impl fmt::Debug for MethodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}",
            self.declaring_type.name(),
            self.token.name,
            self.token.descriptor
        )
    }
}

/// A formal parameter of a method.
#[derive(Clone)]
pub struct ParameterDescription {
    method: MethodDescription,
    index: usize,
    offset: usize,
    descriptor: String,
}

impl ParameterDescription {
    /// The declaring method.
    #[must_use]
    pub fn declaring_method(&self) -> &MethodDescription {
        &self.method
    }

    /// Zero-based position in the parameter list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Local variable slot of the parameter.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Field descriptor of the parameter type.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The recorded name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.method
            .token
            .parameters
            .get(self.index)
            .and_then(|parameter| parameter.name.as_deref())
    }

    /// Name for display: the recorded name or `arg` followed by the index.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("arg{}", self.index),
        }
    }

    /// Returns true if a name was recorded.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.name().is_some()
    }

    /// Returns true if modifiers were recorded by a `MethodParameters` attribute.
    #[must_use]
    pub fn has_modifiers(&self) -> bool {
        self.method
            .token
            .parameters
            .get(self.index)
            .is_some_and(|parameter| parameter.modifiers.is_some())
    }

    /// Recorded modifiers, empty if none were recorded.
    #[must_use]
    pub fn modifiers(&self) -> AccessFlags {
        self.method
            .token
            .parameters
            .get(self.index)
            .and_then(|parameter| parameter.modifiers)
            .unwrap_or_else(AccessFlags::empty)
    }

    /// The erased parameter type.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the type cannot be found.
    pub fn parameter_type(&self) -> Result<TypeDescriptionRc> {
        describe(&self.method.pool, &self.descriptor)
    }

    /// The generic parameter type.
    ///
    /// # Errors
    /// Fails if a referenced type cannot be found.
    pub fn generic_type(&self) -> Result<GenericType> {
        let mut types = self.method.generic_parameter_types()?;
        if self.index < types.len() {
            Ok(types.swap_remove(self.index))
        } else {
            Ok(GenericType::NonGeneric(self.parameter_type()?))
        }
    }

    /// Declared annotations.
    #[must_use]
    pub fn declared_annotations(&self) -> Vec<AnnotationDescription> {
        self.method
            .token
            .parameter_annotations
            .get(&self.index)
            .map(|tokens| annotations(&self.method.pool, tokens))
            .unwrap_or_default()
    }
}

impl fmt::Debug for ParameterDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.method, self.index)
    }
}
