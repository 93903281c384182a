//! Conversion of decoded class files into tokens.
//!
//! [`TypeExtractor`] walks a [`ClassFile`] once and produces a [`TypeToken`]. It reconciles
//! the different places a class file records the same information: modifiers of member
//! types live in the `InnerClasses` attribute, nesting is recorded both there and in
//! `EnclosingMethod`, and parameter names come either from `MethodParameters` or from the
//! local variable table of the method body.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use tracing::debug;

use crate::{
    annotation::{AnnotationValue, ComponentTypeLocator, ConstantValue},
    classfile::{
        attributes::{ElementConstant, ElementValue, RawAnnotation},
        descriptor::{internal_to_binary, parse_method_descriptor, stack_size},
        AccessFlags, ClassFile, FieldInfo, MethodInfo, ReadMode,
    },
    description::DeclarationContext,
    pool::{
        config::PoolConfig,
        token::{AnnotationToken, FieldToken, MethodToken, ParameterToken, TypeToken},
    },
    signature::{parser::SignatureParser, Signature},
    Result,
};

/// Turns class file bytes into [`TypeToken`]s.
#[derive(Debug, Clone, Copy)]
pub struct TypeExtractor {
    read_mode: ReadMode,
    max_signature_depth: usize,
}

impl TypeExtractor {
    /// Create an extractor with the read mode and signature depth of `config`.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        TypeExtractor {
            read_mode: config.read_mode,
            max_signature_depth: config.max_signature_depth,
        }
    }

    /// Decode class file bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`], [`crate::Error::OutOfBounds`] or
    /// [`crate::Error::Empty`] for structurally broken class files. Unparsable generic
    /// signatures do not fail decoding.
    pub fn extract(&self, data: &[u8]) -> Result<TypeToken> {
        let class = ClassFile::parse(data, self.read_mode)?;
        self.convert(class)
    }

    /// Convert an already decoded class file.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid method descriptors or array values
    /// nested directly in arrays.
    pub fn convert(&self, class: ClassFile) -> Result<TypeToken> {
        let name = internal_to_binary(&class.this_class);
        debug!(name, fields = class.fields.len(), methods = class.methods.len(), "extracting type");

        let own_entry = class.own_inner_class_entry().cloned();
        let modifiers = own_entry
            .as_ref()
            .map_or(class.access, |entry| entry.access)
            .difference(AccessFlags::SUPER);

        let declaration_context = match (&class.enclosing_method, &own_entry) {
            (Some(enclosing), _) => match &enclosing.method {
                Some((method, descriptor)) => DeclarationContext::DeclaredInMethod {
                    owner: internal_to_binary(&enclosing.class),
                    name: method.clone(),
                    descriptor: descriptor.clone(),
                },
                None => DeclarationContext::DeclaredInType(internal_to_binary(&enclosing.class)),
            },
            (None, Some(entry)) => match &entry.outer_class {
                Some(outer) => DeclarationContext::DeclaredInType(internal_to_binary(outer)),
                None => DeclarationContext::SelfDeclared,
            },
            (None, None) => DeclarationContext::SelfDeclared,
        };

        let declared_types = class
            .inner_classes
            .iter()
            .filter(|entry| {
                entry.inner_class != class.this_class
                    && entry.outer_class.as_deref() == Some(class.this_class.as_str())
            })
            .map(|entry| internal_to_binary(&entry.inner_class))
            .collect();

        let signature = Signature::tokenize(class.signature.as_deref(), |raw| {
            SignatureParser::with_max_depth(raw, self.max_signature_depth).parse_class_signature()
        });

        let fields = class
            .fields
            .iter()
            .map(|field| self.field(field).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let methods = class
            .methods
            .iter()
            .filter(|method| method.name != "<clinit>")
            .map(|method| self.method(method).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(TypeToken {
            name,
            modifiers,
            super_class: class.super_class.as_deref().map(internal_to_binary),
            interfaces: class.interfaces.iter().map(|i| internal_to_binary(i)).collect(),
            raw_signature: class.signature.clone(),
            signature,
            declaration_context,
            declaring_type: own_entry
                .as_ref()
                .and_then(|entry| entry.outer_class.as_deref())
                .map(internal_to_binary),
            anonymous: own_entry
                .as_ref()
                .is_some_and(|entry| entry.inner_name.is_none()),
            inner_name: own_entry.and_then(|entry| entry.inner_name),
            declared_types,
            annotations: annotations(&class.annotations)?,
            fields,
            methods,
            class_file_version: (class.major_version, class.minor_version),
            source_file: class.source_file,
        })
    }

    fn field(&self, field: &FieldInfo) -> Result<FieldToken> {
        Ok(FieldToken {
            name: field.name.clone(),
            modifiers: field.access,
            descriptor: field.descriptor.clone(),
            raw_signature: field.signature.clone(),
            signature: Signature::tokenize(field.signature.as_deref(), |raw| {
                SignatureParser::with_max_depth(raw, self.max_signature_depth)
                    .parse_field_signature()
            }),
            annotations: annotations(&field.annotations)?,
        })
    }

    fn method(&self, method: &MethodInfo) -> Result<MethodToken> {
        let descriptor = parse_method_descriptor(&method.descriptor)?;

        let mut bag = ParameterBag::default();
        if let Some(code) = &method.code {
            for local in code.local_variables.iter().filter(|local| local.start_pc == 0) {
                bag.register(usize::from(local.index), &local.name);
            }
        }
        let mut parameters = bag.resolve(&descriptor.parameters, method.access.is_static());
        if method.parameters.len() == descriptor.parameters.len() {
            for (parameter, recorded) in parameters.iter_mut().zip(&method.parameters) {
                if recorded.name.is_some() {
                    parameter.name.clone_from(&recorded.name);
                }
                parameter.modifiers = Some(recorded.access);
            }
        }

        let mut parameter_annotations = BTreeMap::new();
        for (index, raw) in method.parameter_annotations.iter().enumerate() {
            if !raw.is_empty() {
                parameter_annotations.insert(index, annotations(raw)?);
            }
        }

        let default_value = match &method.annotation_default {
            Some(value) => {
                let locator = ComponentTypeLocator::for_array_type(&method.descriptor)?;
                Some(element_value(value, &method.name, &locator)?)
            }
            None => None,
        };

        Ok(MethodToken {
            name: method.name.clone(),
            modifiers: method.access,
            descriptor: method.descriptor.clone(),
            raw_signature: method.signature.clone(),
            signature: Signature::tokenize(method.signature.as_deref(), |raw| {
                SignatureParser::with_max_depth(raw, self.max_signature_depth)
                    .parse_method_signature()
            }),
            exceptions: method.exceptions.iter().map(|e| internal_to_binary(e)).collect(),
            annotations: annotations(&method.annotations)?,
            parameter_annotations,
            parameters,
            default_value,
            line_numbers: method
                .code
                .as_ref()
                .map(|code| code.line_numbers.clone())
                .unwrap_or_default(),
            frame_count: method.code.as_ref().map(|code| code.frame_count),
        })
    }
}

/// Parameter names collected from a local variable table, keyed by slot.
///
/// Registration may be sparse; [`ParameterBag::resolve`] lines the slots up with the
/// descriptor's parameter types and leaves unregistered parameters unnamed.
#[derive(Debug, Default)]
pub(crate) struct ParameterBag {
    names: HashMap<usize, String>,
}

impl ParameterBag {
    pub(crate) fn register(&mut self, slot: usize, name: &str) {
        self.names.insert(slot, name.to_string());
    }

    /// One token per parameter descriptor; `this` occupies slot 0 of instance methods and
    /// `long` and `double` parameters take two slots.
    pub(crate) fn resolve(&self, parameters: &[String], is_static: bool) -> Vec<ParameterToken> {
        let mut slot = usize::from(!is_static);
        parameters
            .iter()
            .map(|descriptor| {
                let token = ParameterToken {
                    name: self.names.get(&slot).cloned(),
                    modifiers: None,
                };
                slot += stack_size(descriptor);
                token
            })
            .collect()
    }
}

fn annotations(raw: &[RawAnnotation]) -> Result<Vec<Arc<AnnotationToken>>> {
    raw.iter().map(|annotation| annotation_token(annotation).map(Arc::new)).collect()
}

fn annotation_token(raw: &RawAnnotation) -> Result<AnnotationToken> {
    let locator = ComponentTypeLocator::for_annotation(&raw.descriptor);
    let values = raw
        .elements
        .iter()
        .map(|(name, value)| Ok((name.clone(), element_value(value, name, &locator)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(AnnotationToken {
        descriptor: raw.descriptor.clone(),
        values,
    })
}

fn constant(value: &ElementConstant) -> ConstantValue {
    match value {
        ElementConstant::Byte(v) => ConstantValue::Byte(*v),
        ElementConstant::Char(v) => ConstantValue::Char(*v),
        ElementConstant::Double(v) => ConstantValue::Double(*v),
        ElementConstant::Float(v) => ConstantValue::Float(*v),
        ElementConstant::Int(v) => ConstantValue::Int(*v),
        ElementConstant::Long(v) => ConstantValue::Long(*v),
        ElementConstant::Short(v) => ConstantValue::Short(*v),
        ElementConstant::Boolean(v) => ConstantValue::Boolean(*v),
        ElementConstant::String(v) => ConstantValue::String(v.clone()),
    }
}

/// Returns the elements as constants if the array is a non-empty array of one primitive
/// type.
fn primitive_array(values: &[ElementValue]) -> Option<Vec<ConstantValue>> {
    let mut kind = None;
    let mut constants = Vec::with_capacity(values.len());
    for value in values {
        let ElementValue::Constant(element) = value else {
            return None;
        };
        if matches!(element, ElementConstant::String(_)) {
            return None;
        }
        let discriminant = std::mem::discriminant(element);
        if *kind.get_or_insert(discriminant) != discriminant {
            return None;
        }
        constants.push(constant(element));
    }
    (!constants.is_empty()).then_some(constants)
}

fn element_value(
    value: &ElementValue,
    property: &str,
    locator: &ComponentTypeLocator,
) -> Result<AnnotationValue> {
    Ok(match value {
        ElementValue::Constant(element) => AnnotationValue::Constant(constant(element)),
        ElementValue::Enum {
            descriptor,
            constant,
        } => AnnotationValue::Enumeration {
            descriptor: descriptor.clone(),
            constant: constant.clone(),
        },
        ElementValue::Class(descriptor) => AnnotationValue::Type(descriptor.clone()),
        ElementValue::Annotation(raw) => AnnotationValue::Annotation(Arc::new(annotation_token(raw)?)),
        ElementValue::Array(values) => match primitive_array(values) {
            Some(constants) => AnnotationValue::Constant(ConstantValue::Array(constants)),
            None => {
                let component = locator
                    .bind(property)
                    .map_err(|error| malformed_error!("{}", error))?;
                AnnotationValue::Array {
                    component,
                    values: values
                        .iter()
                        .map(|value| element_value(value, property, &ComponentTypeLocator::Illegal))
                        .collect::<Result<_>>()?,
                }
            }
        },
    })
}
