//! Lazy type descriptions.
//!
//! A [`TypeDescription`] is the navigable view of a type. Decoded types are backed by their
//! [`crate::pool::token::TypeToken`] and a weak reference to the pool that produced them;
//! every property that refers to another type (superclass, interfaces, member types,
//! generic views, annotation types) describes it through that pool on first access and
//! memoizes the result. Constructing a description is therefore cheap, and a type whose
//! superclass is missing still describes fine until the superclass is actually asked for.
//!
//! Primitive and array descriptions are synthesized without any class file.
//!
//! # Key Components
//!
//! - [`TypeDescription`] - Primitive, array, decoded or deferred type
//! - [`FieldDescription`], [`MethodDescription`], [`ParameterDescription`] - Member views
//! - [`GenericType`], [`TypeVariable`], [`TypeVariableSource`] - The generic view
//! - [`DeclarationContext`] - How a type is nested
//!
//! Equality and hashing of descriptions are defined by the type name alone.

mod declaration;
mod generic;
mod lazy;
mod member;

pub use declaration::DeclarationContext;
pub use generic::{GenericType, TypeVariable, TypeVariableSource};
pub use lazy::LazyTypeDescription;
pub use member::{FieldDescription, MethodDescription, ParameterDescription};

use std::{
    collections::{HashMap, HashSet},
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock},
};

use strum::IntoEnumIterator;

use crate::{
    annotation::AnnotationDescription,
    classfile::{
        descriptor::{binary_to_internal, name_to_descriptor, Primitive},
        AccessFlags,
    },
    pool::PoolRef,
    Result,
};

/// Shared handle to a description.
pub type TypeDescriptionRc = Arc<TypeDescription>;

/// A described type.
pub enum TypeDescription {
    /// A primitive type or `void`
    Primitive(Primitive),
    /// An array type
    Array(ArrayType),
    /// A type decoded from its class file
    Lazy(LazyTypeDescription),
    /// A type that is decoded on first property access
    Deferred(DeferredType),
}

/// The array projection of a component type.
pub struct ArrayType {
    element: TypeDescriptionRc,
    arity: usize,
    name: String,
    pool: PoolRef,
}

/// A description that decodes its type only when a property is read.
pub struct DeferredType {
    name: String,
    pool: PoolRef,
    delegate: OnceLock<TypeDescriptionRc>,
}

impl DeferredType {
    /// The decoded description, described through the deferred-to pool on first call.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the type does not exist.
    pub fn delegate(&self) -> Result<TypeDescriptionRc> {
        memoize(&self.delegate, || {
            self.pool.upgrade()?.describe(&self.name)?.resolve()
        })
    }
}

/// Memoize a fallible computation in a `OnceLock`; failures are not cached.
pub(crate) fn memoize<T, F>(cell: &OnceLock<T>, compute: F) -> Result<T>
where
    T: Clone,
    F: FnOnce() -> Result<T>,
{
    if let Some(value) = cell.get() {
        return Ok(value.clone());
    }
    let value = compute()?;
    Ok(cell.get_or_init(|| value).clone())
}

const ARRAY_MODIFIERS: AccessFlags = AccessFlags::PUBLIC
    .union(AccessFlags::FINAL)
    .union(AccessFlags::ABSTRACT);

impl TypeDescription {
    /// The shared description of a primitive type.
    #[must_use]
    pub fn for_primitive(primitive: Primitive) -> TypeDescriptionRc {
        static PRIMITIVES: OnceLock<HashMap<Primitive, TypeDescriptionRc>> = OnceLock::new();
        let table = PRIMITIVES.get_or_init(|| {
            Primitive::iter()
                .map(|primitive| (primitive, Arc::new(TypeDescription::Primitive(primitive))))
                .collect()
        });
        match table.get(&primitive) {
            Some(description) => description.clone(),
            None => Arc::new(TypeDescription::Primitive(primitive)),
        }
    }

    /// The `arity`-dimensional array of `component`.
    ///
    /// Arrays of arrays are flattened, so the element type is never itself an array.
    #[must_use]
    pub fn array_of(component: TypeDescriptionRc, arity: usize, pool: PoolRef) -> TypeDescriptionRc {
        let (element, arity) = match &*component {
            TypeDescription::Array(array) => (array.element.clone(), array.arity + arity),
            _ => (component, arity),
        };
        let name = format!(
            "{}{}",
            "[".repeat(arity),
            name_to_descriptor(element.name()).replace('/', ".")
        );
        Arc::new(TypeDescription::Array(ArrayType {
            element,
            arity,
            name,
            pool,
        }))
    }

    pub(crate) fn deferred(name: &str, pool: PoolRef) -> TypeDescriptionRc {
        Arc::new(TypeDescription::Deferred(DeferredType {
            name: name.to_string(),
            pool,
            delegate: OnceLock::new(),
        }))
    }

    pub(crate) fn pool(&self) -> Option<&PoolRef> {
        match self {
            TypeDescription::Primitive(_) => None,
            TypeDescription::Array(array) => Some(&array.pool),
            TypeDescription::Lazy(lazy) => Some(lazy.pool()),
            TypeDescription::Deferred(deferred) => Some(&deferred.pool),
        }
    }

    /// Binary name: `java.lang.String`, `int`, `[Ljava.lang.String;`.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeDescription::Primitive(primitive) => primitive.name(),
            TypeDescription::Array(array) => &array.name,
            TypeDescription::Lazy(lazy) => lazy.name(),
            TypeDescription::Deferred(deferred) => &deferred.name,
        }
    }

    /// Field descriptor.
    #[must_use]
    pub fn descriptor(&self) -> String {
        name_to_descriptor(self.name())
    }

    /// Internal name as used in class files, the descriptor for arrays.
    #[must_use]
    pub fn internal_name(&self) -> String {
        binary_to_internal(self.name())
    }

    /// Returns true for primitive types.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescription::Primitive(_))
    }

    /// Returns true for array types.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescription::Array(_))
    }

    /// Number of array dimensions, 0 for non-arrays.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            TypeDescription::Array(array) => array.arity,
            _ => 0,
        }
    }

    /// The component type of an array, one dimension less.
    #[must_use]
    pub fn component_type(&self) -> Option<TypeDescriptionRc> {
        match self {
            TypeDescription::Array(array) if array.arity > 1 => Some(TypeDescription::array_of(
                array.element.clone(),
                array.arity - 1,
                array.pool.clone(),
            )),
            TypeDescription::Array(array) => Some(array.element.clone()),
            _ => None,
        }
    }

    /// Name without package or enclosing type; empty for anonymous classes.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn simple_name(&self) -> Result<String> {
        match self {
            TypeDescription::Primitive(primitive) => Ok(primitive.name().to_string()),
            TypeDescription::Array(_) => {
                let mut element = self.component_type();
                let mut suffix = String::from("[]");
                while let Some(component) = element {
                    if !component.is_array() {
                        return Ok(format!("{}{suffix}", component.simple_name()?));
                    }
                    suffix.push_str("[]");
                    element = component.component_type();
                }
                Ok(suffix)
            }
            TypeDescription::Lazy(lazy) => Ok(lazy.simple_name()),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.simple_name(),
        }
    }

    /// Package of a class or interface, empty for the default package and `None` for
    /// primitives and arrays.
    #[must_use]
    pub fn package_name(&self) -> Option<String> {
        match self {
            TypeDescription::Primitive(_) | TypeDescription::Array(_) => None,
            TypeDescription::Lazy(_) | TypeDescription::Deferred(_) => Some(
                self.name()
                    .rsplit_once('.')
                    .map(|(package, _)| package.to_string())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Modifiers; for member types those recorded in the type's own inner class entry.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn modifiers(&self) -> Result<AccessFlags> {
        match self {
            TypeDescription::Primitive(_) | TypeDescription::Array(_) => Ok(ARRAY_MODIFIERS),
            TypeDescription::Lazy(lazy) => Ok(lazy.modifiers()),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.modifiers(),
        }
    }

    /// Returns true for interfaces, annotation types included.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn is_interface(&self) -> Result<bool> {
        Ok(self.modifiers()?.contains(AccessFlags::INTERFACE))
    }

    /// Returns true for annotation types.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn is_annotation(&self) -> Result<bool> {
        Ok(self.modifiers()?.contains(AccessFlags::ANNOTATION))
    }

    /// Returns true for enumerations.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn is_enum(&self) -> Result<bool> {
        Ok(self.modifiers()?.contains(AccessFlags::ENUM))
    }

    /// The superclass; `None` for `java.lang.Object`, interfaces, primitives.
    ///
    /// Arrays extend `java.lang.Object`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the superclass cannot be found and
    /// [`crate::Error::PoolReleased`] if the pool is gone.
    pub fn super_class(&self) -> Result<Option<TypeDescriptionRc>> {
        match self {
            TypeDescription::Primitive(_) => Ok(None),
            TypeDescription::Array(array) => Ok(Some(
                array.pool.upgrade()?.describe("java.lang.Object")?.resolve()?,
            )),
            TypeDescription::Lazy(lazy) => lazy.super_class(),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.super_class(),
        }
    }

    /// The direct superinterfaces, in declaration order.
    ///
    /// Arrays implement `java.lang.Cloneable` and `java.io.Serializable`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if an interface cannot be found and
    /// [`crate::Error::PoolReleased`] if the pool is gone.
    pub fn interfaces(&self) -> Result<Vec<TypeDescriptionRc>> {
        match self {
            TypeDescription::Primitive(_) => Ok(Vec::new()),
            TypeDescription::Array(array) => {
                let pool = array.pool.upgrade()?;
                ["java.lang.Cloneable", "java.io.Serializable"]
                    .into_iter()
                    .map(|name| pool.describe(name)?.resolve())
                    .collect()
            }
            TypeDescription::Lazy(lazy) => lazy.interfaces(),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.interfaces(),
        }
    }

    /// The generic superclass, falling back to the erasure for raw or malformed signatures.
    ///
    /// # Errors
    /// See [`TypeDescription::super_class`]; resolving a type variable that no enclosing
    /// declaration defines fails with [`crate::Error::IllegalState`].
    pub fn generic_super_class(self: &Arc<Self>) -> Result<Option<GenericType>> {
        match &**self {
            TypeDescription::Lazy(lazy) => lazy.generic_super_class(self),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.generic_super_class(),
            _ => Ok(self.super_class()?.map(GenericType::NonGeneric)),
        }
    }

    /// The generic superinterfaces, falling back to the erasures for raw or malformed
    /// signatures.
    ///
    /// # Errors
    /// See [`TypeDescription::generic_super_class`].
    pub fn generic_interfaces(self: &Arc<Self>) -> Result<Vec<GenericType>> {
        match &**self {
            TypeDescription::Lazy(lazy) => lazy.generic_interfaces(self),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.generic_interfaces(),
            _ => Ok(self
                .interfaces()?
                .into_iter()
                .map(GenericType::NonGeneric)
                .collect()),
        }
    }

    /// The formal type variables, empty for non-generic types.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedSignature`] if the signature could not be tokenized.
    pub fn type_variables(self: &Arc<Self>) -> Result<Vec<TypeVariable>> {
        match &**self {
            TypeDescription::Lazy(lazy) => lazy.type_variables(self),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.type_variables(),
            _ => Ok(Vec::new()),
        }
    }

    /// Find a type variable visible in this type: its own, then those of the enclosing
    /// method or, for non-static nested types, of the enclosing type.
    ///
    /// # Errors
    /// Fails if an enclosing declaration cannot be described.
    pub fn find_type_variable(self: &Arc<Self>, symbol: &str) -> Result<Option<TypeVariable>> {
        TypeVariableSource::Type(self.clone()).find_type_variable(symbol)
    }

    /// Declared fields in class file order.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn declared_fields(self: &Arc<Self>) -> Result<Vec<FieldDescription>> {
        match &**self {
            TypeDescription::Lazy(lazy) => Ok(lazy.declared_fields(self)),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.declared_fields(),
            _ => Ok(Vec::new()),
        }
    }

    /// Declared methods and constructors in class file order, without the static
    /// initializer.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn declared_methods(self: &Arc<Self>) -> Result<Vec<MethodDescription>> {
        match &**self {
            TypeDescription::Lazy(lazy) => Ok(lazy.declared_methods(self)),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.declared_methods(),
            _ => Ok(Vec::new()),
        }
    }

    /// Declared annotations, runtime visible and invisible.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn declared_annotations(&self) -> Result<Vec<AnnotationDescription>> {
        match self {
            TypeDescription::Lazy(lazy) => Ok(lazy.declared_annotations()),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.declared_annotations(),
            _ => Ok(Vec::new()),
        }
    }

    /// Member types declared by this type.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if a member type cannot be found.
    pub fn declared_types(&self) -> Result<Vec<TypeDescriptionRc>> {
        match self {
            TypeDescription::Lazy(lazy) => lazy.declared_types(),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.declared_types(),
            _ => Ok(Vec::new()),
        }
    }

    /// The type this type is nested in, for member, local and anonymous types.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the enclosing type cannot be found.
    pub fn enclosing_type(&self) -> Result<Option<TypeDescriptionRc>> {
        match self {
            TypeDescription::Lazy(lazy) => lazy.enclosing_type(),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.enclosing_type(),
            _ => Ok(None),
        }
    }

    /// The method this type is declared in, for local and anonymous types.
    ///
    /// # Errors
    /// Returns [`crate::Error::IllegalState`] if the enclosing type does not declare the
    /// recorded method.
    pub fn enclosing_method(&self) -> Result<Option<MethodDescription>> {
        match self {
            TypeDescription::Lazy(lazy) => lazy.enclosing_method(),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.enclosing_method(),
            _ => Ok(None),
        }
    }

    /// The declaring type of a member type.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the declaring type cannot be found.
    pub fn declaring_type(&self) -> Result<Option<TypeDescriptionRc>> {
        match self {
            TypeDescription::Lazy(lazy) => lazy.declaring_type(),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.declaring_type(),
            _ => Ok(None),
        }
    }

    /// Returns true for anonymous classes.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn is_anonymous_class(&self) -> Result<bool> {
        match self {
            TypeDescription::Lazy(lazy) => Ok(lazy.token().anonymous),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.is_anonymous_class(),
            _ => Ok(false),
        }
    }

    /// Returns true for named classes declared inside a method or initializer.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn is_local_class(&self) -> Result<bool> {
        match self {
            TypeDescription::Lazy(lazy) => {
                let token = lazy.token();
                Ok(!token.anonymous
                    && token.declaring_type.is_none()
                    && !token.declaration_context.is_self_declared())
            }
            TypeDescription::Deferred(deferred) => deferred.delegate()?.is_local_class(),
            _ => Ok(false),
        }
    }

    /// Returns true for member types.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn is_member_class(&self) -> Result<bool> {
        match self {
            TypeDescription::Lazy(lazy) => Ok(lazy.token().declaring_type.is_some()),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.is_member_class(),
            _ => Ok(false),
        }
    }

    /// Major and minor class file version of decoded types.
    ///
    /// # Errors
    /// Fails only for deferred descriptions of missing types.
    pub fn class_file_version(&self) -> Result<Option<(u16, u16)>> {
        match self {
            TypeDescription::Lazy(lazy) => Ok(Some(lazy.token().class_file_version)),
            TypeDescription::Deferred(deferred) => deferred.delegate()?.class_file_version(),
            _ => Ok(None),
        }
    }

    /// Returns true if a value of `other` can be assigned to a variable of this type,
    /// following superclasses and interfaces through the pool.
    ///
    /// # Errors
    /// Fails if a supertype of `other` cannot be described.
    pub fn is_assignable_from(&self, other: &TypeDescriptionRc) -> Result<bool> {
        if self.name() == other.name() {
            return Ok(true);
        }
        if self.is_primitive() || other.is_primitive() {
            return Ok(false);
        }
        if let (Some(target), Some(source)) = (self.component_type(), other.component_type()) {
            return target.is_assignable_from(&source);
        }

        let mut visited = HashSet::new();
        let mut pending = vec![other.clone()];
        while let Some(current) = pending.pop() {
            if current.name() == self.name() {
                return Ok(true);
            }
            if !visited.insert(current.name().to_string()) {
                continue;
            }
            if let Some(super_class) = current.super_class()? {
                pending.push(super_class);
            }
            pending.extend(current.interfaces()?);
        }
        Ok(false)
    }
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TypeDescription::Primitive(_) => "Primitive",
            TypeDescription::Array(_) => "Array",
            TypeDescription::Lazy(_) => "Lazy",
            TypeDescription::Deferred(_) => "Deferred",
        };
        f.debug_tuple(kind).field(&self.name()).finish()
    }
}
