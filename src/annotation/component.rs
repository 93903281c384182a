use crate::{
    classfile::descriptor::{component_descriptor, descriptor_to_name, parse_method_descriptor},
    pool::{token::descriptor_type_name, PoolRc},
    Error::IllegalState,
    Result,
};

/// Tells a decoder where the component type of an array valued annotation property comes
/// from.
///
/// A class file records array values without their component type, so an empty array of
/// annotations is indistinguishable from an empty array of strings. The component type is
/// recovered from the declaration of the property instead, lazily, once a pool is at hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentTypeLocator {
    /// Arrays are not legal in this position, such as inside another array
    Illegal,
    /// The value belongs to an annotation; the component type is the return type of the
    /// property method of the same name on the annotation type
    ForAnnotationProperty {
        /// Binary name of the annotation type
        annotation: String,
    },
    /// The value is the default of an annotation property whose descriptor is known
    ForArrayType {
        /// Binary name of the component type
        component: String,
    },
}

impl ComponentTypeLocator {
    /// Locator for the properties of the annotation with the given descriptor.
    #[must_use]
    pub fn for_annotation(descriptor: &str) -> Self {
        ComponentTypeLocator::ForAnnotationProperty {
            annotation: descriptor_type_name(descriptor),
        }
    }

    /// Locator for the default value of a property method with the given descriptor.
    ///
    /// Properties that do not return arrays yield [`ComponentTypeLocator::Illegal`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an invalid method descriptor.
    pub fn for_array_type(method_descriptor: &str) -> Result<Self> {
        let descriptor = parse_method_descriptor(method_descriptor)?;
        Ok(match component_descriptor(&descriptor.return_type) {
            Some(component) => ComponentTypeLocator::ForArrayType {
                component: descriptor_to_name(component)?,
            },
            None => ComponentTypeLocator::Illegal,
        })
    }

    /// Bind this locator to the property whose value is being decoded.
    ///
    /// # Errors
    /// Returns [`crate::Error::IllegalState`] for [`ComponentTypeLocator::Illegal`].
    pub fn bind(&self, property: &str) -> Result<ComponentTypeReference> {
        match self {
            ComponentTypeLocator::Illegal => Err(IllegalState(format!(
                "unexpected array value for property {property}"
            ))),
            ComponentTypeLocator::ForAnnotationProperty { annotation } => {
                Ok(ComponentTypeReference::AnnotationProperty {
                    annotation: annotation.clone(),
                    property: property.to_string(),
                })
            }
            ComponentTypeLocator::ForArrayType { component } => {
                Ok(ComponentTypeReference::Fixed(component.clone()))
            }
        }
    }
}

/// A bound [`ComponentTypeLocator`]: names the component type of one array value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentTypeReference {
    /// The component type is known by its binary name
    Fixed(String),
    /// The component type is the component of the return type of a property method
    AnnotationProperty {
        /// Binary name of the annotation type
        annotation: String,
        /// Name of the property method
        property: String,
    },
}

impl ComponentTypeReference {
    /// Binary name of the component type, describing the annotation type through `pool` if
    /// needed.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoSuchType`] if the annotation type cannot be described and
    /// [`crate::Error::IllegalState`] if it declares no array valued property of that name.
    pub fn resolve(&self, pool: &PoolRc) -> Result<String> {
        match self {
            ComponentTypeReference::Fixed(name) => Ok(name.clone()),
            ComponentTypeReference::AnnotationProperty {
                annotation,
                property,
            } => {
                let annotation_type = pool.describe(annotation)?.resolve()?;
                let method = annotation_type
                    .declared_methods()?
                    .into_iter()
                    .find(|method| method.name() == property && method.descriptor().starts_with("()"))
                    .ok_or_else(|| {
                        IllegalState(format!("{annotation} does not declare property {property}"))
                    })?;

                let descriptor = parse_method_descriptor(method.descriptor())?;
                let component = component_descriptor(&descriptor.return_type).ok_or_else(|| {
                    IllegalState(format!("{annotation}.{property} is not array valued"))
                })?;
                descriptor_to_name(component)
            }
        }
    }
}
