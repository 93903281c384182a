use std::{fmt, sync::Arc};

use crate::{
    annotation::{instance::AnnotationInstance, value::ConstantValue},
    TypeDescriptionRc,
};

/// Component type of a loaded array value.
///
/// Strings and class literals are self-describing, so arrays of them keep the component
/// by name and never ask the pool for `java.lang.String` or `java.lang.Class`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayComponent {
    /// `java.lang.String` or `java.lang.Class`
    Named(String),
    /// Any other component type, described through the pool
    Described(TypeDescriptionRc),
}

impl ArrayComponent {
    const NAMED: [&'static str; 2] = ["java.lang.String", "java.lang.Class"];

    /// Returns true if arrays of `name` load without describing `name`.
    #[must_use]
    pub fn is_named(name: &str) -> bool {
        Self::NAMED.contains(&name)
    }

    /// Binary name of the component type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ArrayComponent::Named(name) => name,
            ArrayComponent::Described(description) => description.name(),
        }
    }

    /// Field descriptor of the component type.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            ArrayComponent::Named(name) => format!("L{};", name.replace('.', "/")),
            ArrayComponent::Described(description) => description.descriptor(),
        }
    }

    /// The description, unless the component is kept by name.
    #[must_use]
    pub fn description(&self) -> Option<&TypeDescriptionRc> {
        match self {
            ArrayComponent::Named(_) => None,
            ArrayComponent::Described(description) => Some(description),
        }
    }
}

/// A materialized annotation value: every type reference is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedValue {
    /// Primitive, string or primitive array
    Constant(ConstantValue),
    /// Class literal
    Type(TypeDescriptionRc),
    /// Enumeration constant
    Enumeration {
        /// The enumeration type
        enum_type: TypeDescriptionRc,
        /// Name of the constant
        constant: String,
    },
    /// Nested annotation
    Annotation(Arc<AnnotationInstance>),
    /// Array of non-constant values
    Array {
        /// The component type
        component: ArrayComponent,
        /// The elements
        values: Vec<LoadedValue>,
    },
}

impl LoadedValue {
    /// The constant, if this is one.
    #[must_use]
    pub fn as_constant(&self) -> Option<&ConstantValue> {
        match self {
            LoadedValue::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true if a property declared with the field descriptor `descriptor` may hold
    /// this value.
    #[must_use]
    pub fn conforms_to(&self, descriptor: &str) -> bool {
        match self {
            LoadedValue::Constant(value) => value.descriptor() == descriptor,
            LoadedValue::Type(_) => descriptor == "Ljava/lang/Class;",
            LoadedValue::Enumeration { enum_type, .. } => enum_type.descriptor() == descriptor,
            LoadedValue::Annotation(instance) => {
                instance.annotation_type().descriptor() == descriptor
            }
            LoadedValue::Array { component, .. } => descriptor
                .strip_prefix('[')
                .is_some_and(|inner| inner == component.descriptor()),
        }
    }
}

impl fmt::Display for LoadedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedValue::Constant(value) => write!(f, "{value}"),
            LoadedValue::Type(described) => write!(f, "{}.class", described.name()),
            LoadedValue::Enumeration {
                enum_type,
                constant,
            } => write!(f, "{}.{constant}", enum_type.name()),
            LoadedValue::Annotation(instance) => write!(f, "{instance}"),
            LoadedValue::Array { values, .. } => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classfile::descriptor::Primitive, TypeDescription};

    #[test]
    fn conformity() {
        assert!(LoadedValue::Constant(ConstantValue::Int(3)).conforms_to("I"));
        assert!(!LoadedValue::Constant(ConstantValue::Int(3)).conforms_to("J"));

        let int = TypeDescription::for_primitive(Primitive::Int);
        assert!(LoadedValue::Type(int.clone()).conforms_to("Ljava/lang/Class;"));

        let array = LoadedValue::Array {
            component: ArrayComponent::Described(int),
            values: Vec::new(),
        };
        assert!(array.conforms_to("[I"));
        assert!(!array.conforms_to("I"));
        assert_eq!(array.to_string(), "{}");

        let strings = LoadedValue::Array {
            component: ArrayComponent::Named("java.lang.String".into()),
            values: vec![LoadedValue::Constant(ConstantValue::String("a".into()))],
        };
        assert!(strings.conforms_to("[Ljava/lang/String;"));
        assert!(!strings.conforms_to("[Ljava/lang/Class;"));
        assert!(ArrayComponent::is_named("java.lang.Class"));
        assert!(!ArrayComponent::is_named("java.lang.Object"));
    }
}
