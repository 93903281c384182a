use std::{
    collections::BTreeMap,
    fmt,
    sync::OnceLock,
};

use crate::{
    annotation::{loaded::LoadedValue, value::AnnotationValue},
    classfile::descriptor::parse_method_descriptor,
    pool::PoolRc,
    Error::{self, AnnotationTypeMismatch, ClassNotFound, IllegalState, IncompleteAnnotation, NoSuchType},
    Result, TypeDescriptionRc,
};

/// Anything that can present itself as an annotation: a type and a set of property values.
///
/// Equality between implementations is structural: two annotations are equal if they have
/// the same annotation type and every declared property loads to an equal value.
pub trait Annotation {
    /// Binary name of the annotation type.
    fn annotation_type_name(&self) -> String;

    /// Every declared property with its loaded value, defaults included.
    ///
    /// # Errors
    /// Any failure of loading a property value.
    fn property_values(&self) -> Result<BTreeMap<String, LoadedValue>>;

    /// Structural comparison; annotations whose values fail to load are never equal.
    fn annotation_eq(&self, other: &dyn Annotation) -> bool {
        if self.annotation_type_name() != other.annotation_type_name() {
            return false;
        }
        match (self.property_values(), other.property_values()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

struct Property {
    name: String,
    return_descriptor: String,
    value: Option<AnnotationValue>,
    loaded: OnceLock<LoadedValue>,
}

/// A materialized annotation: answers property queries by loading the stored values.
///
/// Each declared property is loaded on first access and cached once it loads successfully.
/// Failures are not cached and are reported again on the next access.
pub struct AnnotationInstance {
    annotation_type: TypeDescriptionRc,
    properties: Vec<Property>,
    loader: PoolRc,
}

impl AnnotationInstance {
    /// Create an instance of `annotation_type` with the given explicit values.
    ///
    /// Properties without an explicit value fall back to the default declared on the
    /// annotation type. Values for names the type does not declare are ignored.
    ///
    /// # Errors
    /// Fails if the declared methods of `annotation_type` cannot be read.
    pub fn new(
        annotation_type: TypeDescriptionRc,
        mut values: BTreeMap<String, AnnotationValue>,
        loader: PoolRc,
    ) -> Result<Self> {
        let mut properties = Vec::new();
        for method in annotation_type.declared_methods()? {
            if method.is_static() || !method.descriptor().starts_with("()") {
                continue;
            }
            let return_descriptor = parse_method_descriptor(method.descriptor())?.return_type;
            let value = values
                .remove(method.name())
                .or_else(|| method.default_value().cloned());
            properties.push(Property {
                name: method.name().to_string(),
                return_descriptor,
                value,
                loaded: OnceLock::new(),
            });
        }

        Ok(AnnotationInstance {
            annotation_type,
            properties,
            loader,
        })
    }

    /// The annotation type.
    #[must_use]
    pub fn annotation_type(&self) -> &TypeDescriptionRc {
        &self.annotation_type
    }

    /// Names of the declared properties, in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|property| property.name.as_str())
    }

    /// The loaded value of a property.
    ///
    /// # Errors
    /// - [`crate::Error::IllegalState`] if the annotation type declares no such property
    /// - [`crate::Error::IncompleteAnnotation`] if there is neither a value nor a default
    /// - [`crate::Error::AnnotationTypeMismatch`] if the value does not fit the property
    /// - [`crate::Error::ClassNotFound`] if a referenced type cannot be found
    /// - [`crate::Error::EnumConstantNotPresent`] for a missing enumeration constant
    pub fn property(&self, name: &str) -> Result<LoadedValue> {
        let property = self
            .properties
            .iter()
            .find(|property| property.name == name)
            .ok_or_else(|| {
                IllegalState(format!(
                    "{} does not declare property {name}",
                    self.annotation_type.name()
                ))
            })?;

        if let Some(loaded) = property.loaded.get() {
            return Ok(loaded.clone());
        }

        let value = property.value.as_ref().ok_or_else(|| IncompleteAnnotation {
            annotation_type: self.annotation_type.name().to_string(),
            property: name.to_string(),
        })?;

        let loaded = value
            .load(&self.loader)
            .map_err(|error| translate(name, error))?;
        if !loaded.conforms_to(&property.return_descriptor) {
            return Err(AnnotationTypeMismatch {
                property: name.to_string(),
                found: loaded.to_string(),
            });
        }

        Ok(property.loaded.get_or_init(|| loaded).clone())
    }
}

fn translate(property: &str, error: Error) -> Error {
    match error {
        AnnotationTypeMismatch {
            property: unnamed,
            found,
        } if unnamed.is_empty() => AnnotationTypeMismatch {
            property: property.to_string(),
            found,
        },
        NoSuchType(name) => ClassNotFound(name),
        other => other,
    }
}

impl Annotation for AnnotationInstance {
    fn annotation_type_name(&self) -> String {
        self.annotation_type.name().to_string()
    }

    fn property_values(&self) -> Result<BTreeMap<String, LoadedValue>> {
        self.properties
            .iter()
            .map(|property| Ok((property.name.clone(), self.property(&property.name)?)))
            .collect()
    }
}

impl PartialEq for AnnotationInstance {
    fn eq(&self, other: &Self) -> bool {
        self.annotation_eq(other)
    }
}

impl fmt::Debug for AnnotationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationInstance")
            .field("annotation_type", &self.annotation_type.name())
            .field("properties", &self.property_names().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for AnnotationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.annotation_type.name())?;
        for (index, property) in self.properties.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match self.property(&property.name) {
                Ok(value) => write!(f, "{}={value}", property.name)?,
                Err(error) => write!(f, "{}=<{error}>", property.name)?,
            }
        }
        write!(f, ")")
    }
}
