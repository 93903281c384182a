use std::{fmt, sync::Arc};

use crate::{
    annotation::{
        component::ComponentTypeReference,
        instance::AnnotationInstance,
        loaded::{ArrayComponent, LoadedValue},
    },
    classfile::descriptor::descriptor_to_name,
    pool::{token::AnnotationToken, PoolRc},
    Error::{AnnotationTypeMismatch, ClassNotFound, EnumConstantNotPresent},
    Result,
};

/// A primitive, string or primitive array annotation value.
///
/// Non-empty arrays of a single primitive type are constants as well; arrays of strings,
/// of references and empty arrays are [`AnnotationValue::Array`] values.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ConstantValue {
    Boolean(bool),
    Byte(i8),
    /// A UTF-16 code unit
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<ConstantValue>),
}

impl ConstantValue {
    /// Field descriptor of the value's type.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            ConstantValue::Boolean(_) => "Z".into(),
            ConstantValue::Byte(_) => "B".into(),
            ConstantValue::Char(_) => "C".into(),
            ConstantValue::Short(_) => "S".into(),
            ConstantValue::Int(_) => "I".into(),
            ConstantValue::Long(_) => "J".into(),
            ConstantValue::Float(_) => "F".into(),
            ConstantValue::Double(_) => "D".into(),
            ConstantValue::String(_) => "Ljava/lang/String;".into(),
            ConstantValue::Array(values) => match values.first() {
                Some(first) => format!("[{}", first.descriptor()),
                None => "[Ljava/lang/Object;".into(),
            },
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Boolean(v) => write!(f, "{v}"),
            ConstantValue::Byte(v) => write!(f, "(byte)0x{:02x}", *v as u8),
            ConstantValue::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "'\\u{v:04x}'"),
            },
            ConstantValue::Short(v) => write!(f, "{v}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}L"),
            ConstantValue::Float(v) => write!(f, "{v}f"),
            ConstantValue::Double(v) => write!(f, "{v}"),
            ConstantValue::String(v) => write!(f, "{v:?}"),
            ConstantValue::Array(values) => {
                write!(f, "{{")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// An annotation property value as decoded, not yet materialized.
///
/// Values reference types only by descriptor. [`AnnotationValue::load`] resolves those
/// references through a pool and produces a [`LoadedValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// Primitive, string or primitive array
    Constant(ConstantValue),
    /// Class literal given by its descriptor, `V` for `void.class`
    Type(String),
    /// Enumeration constant
    Enumeration {
        /// Field descriptor of the enumeration type
        descriptor: String,
        /// Name of the constant
        constant: String,
    },
    /// Nested annotation
    Annotation(Arc<AnnotationToken>),
    /// Array of non-constant values, or an empty array
    Array {
        /// Where the component type of the array comes from
        component: ComponentTypeReference,
        /// The elements
        values: Vec<AnnotationValue>,
    },
}

impl AnnotationValue {
    /// Materialize this value, resolving every type it references through `loader`.
    ///
    /// Failures use the annotation error vocabulary: a referenced type that cannot be found
    /// is [`crate::Error::ClassNotFound`], a missing enumeration constant is
    /// [`crate::Error::EnumConstantNotPresent`] and a reference to a type of the wrong kind is
    /// [`crate::Error::AnnotationTypeMismatch`]. Mismatches raised here carry an empty
    /// property name; [`AnnotationInstance`] fills it in.
    ///
    /// # Errors
    /// See above; pool errors other than absence propagate unchanged.
    pub fn load(&self, loader: &PoolRc) -> Result<LoadedValue> {
        match self {
            AnnotationValue::Constant(value) => Ok(LoadedValue::Constant(value.clone())),
            AnnotationValue::Type(descriptor) => {
                let name = if descriptor == "V" {
                    "void".to_string()
                } else {
                    descriptor_to_name(descriptor)?
                };
                Ok(LoadedValue::Type(describe_present(loader, &name)?))
            }
            AnnotationValue::Enumeration {
                descriptor,
                constant,
            } => {
                let name = descriptor_to_name(descriptor)?;
                let enum_type = describe_present(loader, &name)?;
                if !enum_type.is_enum()? {
                    return Err(AnnotationTypeMismatch {
                        property: String::new(),
                        found: format!("{name} is not an enumeration"),
                    });
                }

                let declared = enum_type.declared_fields()?.into_iter().any(|field| {
                    field.name() == constant && field.modifiers().contains(crate::AccessFlags::ENUM)
                });
                if !declared {
                    return Err(EnumConstantNotPresent {
                        enum_type: name,
                        constant: constant.clone(),
                    });
                }

                Ok(LoadedValue::Enumeration {
                    enum_type,
                    constant: constant.clone(),
                })
            }
            AnnotationValue::Annotation(token) => {
                let name = token.type_name();
                let annotation_type = describe_present(loader, &name)?;
                if !annotation_type.is_annotation()? {
                    return Err(AnnotationTypeMismatch {
                        property: String::new(),
                        found: format!("{name} is not an annotation type"),
                    });
                }
                let instance =
                    AnnotationInstance::new(annotation_type, token.values.clone(), loader.clone())?;
                Ok(LoadedValue::Annotation(Arc::new(instance)))
            }
            AnnotationValue::Array { component, values } => {
                let component_name = component.resolve(loader).map_err(|error| match error {
                    crate::Error::NoSuchType(name) => ClassNotFound(name),
                    other => other,
                })?;
                let component = if ArrayComponent::is_named(&component_name) {
                    ArrayComponent::Named(component_name.clone())
                } else {
                    ArrayComponent::Described(describe_present(loader, &component_name)?)
                };
                let values = values
                    .iter()
                    .map(|value| value.load(loader))
                    .collect::<Result<Vec<_>>>()?;

                if let Some(element) = values
                    .iter()
                    .find(|value| !value.conforms_to(&component.descriptor()))
                {
                    return Err(AnnotationTypeMismatch {
                        property: String::new(),
                        found: format!("{element} in an array of {component_name}"),
                    });
                }

                Ok(LoadedValue::Array { component, values })
            }
        }
    }
}

/// Describe `name` and translate absence into [`crate::Error::ClassNotFound`].
fn describe_present(loader: &PoolRc, name: &str) -> Result<crate::TypeDescriptionRc> {
    let resolution = loader.describe(name)?;
    if !resolution.is_resolved() {
        return Err(ClassNotFound(name.to_string()));
    }
    resolution.resolve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_descriptors() {
        assert_eq!(ConstantValue::Int(1).descriptor(), "I");
        assert_eq!(
            ConstantValue::String("x".into()).descriptor(),
            "Ljava/lang/String;"
        );
        assert_eq!(
            ConstantValue::Array(vec![ConstantValue::Long(1), ConstantValue::Long(2)])
                .descriptor(),
            "[J"
        );
    }

    #[test]
    fn constant_display() {
        assert_eq!(ConstantValue::Long(3).to_string(), "3L");
        assert_eq!(ConstantValue::Char(u16::from(b'a')).to_string(), "'a'");
        assert_eq!(ConstantValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
        assert_eq!(
            ConstantValue::Array(vec![ConstantValue::Int(1), ConstantValue::Int(2)]).to_string(),
            "{1, 2}"
        );
        assert_eq!(ConstantValue::Byte(-1).to_string(), "(byte)0xff");
    }
}
