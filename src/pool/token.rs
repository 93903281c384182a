//! Context-free records produced by decoding a class file.
//!
//! Tokens refer to other types only by name or descriptor and are immutable once built, so
//! the same token can be bound to any number of resolving contexts. They are shared through
//! `Arc` between the description that owns them and every member binding created from it.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    annotation::AnnotationValue,
    classfile::{attributes::LineNumber, AccessFlags},
    description::DeclarationContext,
    signature::{ClassSignature, GenericTypeToken, MethodSignature, Signature},
};

/// A declared annotation: its type descriptor and the explicitly given property values.
///
/// Properties left at their default value are absent from `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationToken {
    /// Field descriptor of the annotation type, `Lfoo/Marker;`
    pub descriptor: String,
    /// Explicit property values by property name
    pub values: BTreeMap<String, AnnotationValue>,
}

impl AnnotationToken {
    /// Binary name of the annotation type.
    #[must_use]
    pub fn type_name(&self) -> String {
        descriptor_type_name(&self.descriptor)
    }
}

/// One formal parameter of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterToken {
    /// Parameter name, if recorded
    pub name: Option<String>,
    /// Parameter modifiers, if recorded by a `MethodParameters` attribute
    pub modifiers: Option<AccessFlags>,
}

/// A declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldToken {
    /// Field name
    pub name: String,
    /// Access flags
    pub modifiers: AccessFlags,
    /// Field descriptor
    pub descriptor: String,
    /// The raw generic signature
    pub raw_signature: Option<String>,
    /// Tokenized generic signature
    pub signature: Signature<GenericTypeToken>,
    /// Declared annotations
    pub annotations: Vec<Arc<AnnotationToken>>,
}

/// A declared method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodToken {
    /// Method name, `<init>` for constructors
    pub name: String,
    /// Access flags
    pub modifiers: AccessFlags,
    /// Method descriptor
    pub descriptor: String,
    /// The raw generic signature
    pub raw_signature: Option<String>,
    /// Tokenized generic signature
    pub signature: Signature<MethodSignature>,
    /// Binary names of the declared exception types
    pub exceptions: Vec<String>,
    /// Declared annotations
    pub annotations: Vec<Arc<AnnotationToken>>,
    /// Declared annotations by parameter index
    pub parameter_annotations: BTreeMap<usize, Vec<Arc<AnnotationToken>>>,
    /// One entry per descriptor parameter
    pub parameters: Vec<ParameterToken>,
    /// Default value of an annotation property
    pub default_value: Option<AnnotationValue>,
    /// Line numbers, only decoded in extended read mode
    pub line_numbers: Vec<LineNumber>,
    /// Number of stack map frames, only decoded in extended read mode
    pub frame_count: Option<u16>,
}

/// The complete decoded shape of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeToken {
    /// Binary name
    pub name: String,
    /// Modifiers, taken from the type's own inner class entry when one exists
    pub modifiers: AccessFlags,
    /// Binary name of the superclass
    pub super_class: Option<String>,
    /// Binary names of the direct superinterfaces
    pub interfaces: Vec<String>,
    /// The raw generic signature
    pub raw_signature: Option<String>,
    /// Tokenized generic signature
    pub signature: Signature<ClassSignature>,
    /// How the type is nested
    pub declaration_context: DeclarationContext,
    /// Binary name of the declaring type of a member type
    pub declaring_type: Option<String>,
    /// Whether the type is an anonymous class
    pub anonymous: bool,
    /// Simple name recorded in the type's own inner class entry
    pub inner_name: Option<String>,
    /// Binary names of member types declared by this type
    pub declared_types: Vec<String>,
    /// Declared annotations
    pub annotations: Vec<Arc<AnnotationToken>>,
    /// Declared fields
    pub fields: Vec<Arc<FieldToken>>,
    /// Declared methods and constructors, without the static initializer
    pub methods: Vec<Arc<MethodToken>>,
    /// Major and minor class file version
    pub class_file_version: (u16, u16),
    /// The `SourceFile` attribute
    pub source_file: Option<String>,
}

/// Binary name of the type named by an object descriptor, or the descriptor's binary name
/// otherwise.
pub(crate) fn descriptor_type_name(descriptor: &str) -> String {
    crate::classfile::descriptor::descriptor_to_name(descriptor)
        .unwrap_or_else(|_| descriptor.to_string())
}
