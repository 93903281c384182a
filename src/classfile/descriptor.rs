//! Field and method descriptors and the naming schemes of the class file format.
//!
//! Three spellings of a type name circulate through this crate:
//!
//! - **binary names** as callers use them: `java.lang.String`, `int`, `[Ljava.lang.String;`
//! - **internal names** as stored in `CONSTANT_Class` entries: `java/lang/String`
//! - **descriptors**: `Ljava/lang/String;`, `I`, `[Ljava/lang/String;`
//!
//! The helpers here convert between them and split method descriptors into their parts.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::Result;

/// The primitive types of the JVM, including `void`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum Primitive {
    /// `boolean`, descriptor `Z`
    #[strum(serialize = "boolean")]
    Boolean,
    /// `byte`, descriptor `B`
    #[strum(serialize = "byte")]
    Byte,
    /// `char`, descriptor `C`
    #[strum(serialize = "char")]
    Char,
    /// `short`, descriptor `S`
    #[strum(serialize = "short")]
    Short,
    /// `int`, descriptor `I`
    #[strum(serialize = "int")]
    Int,
    /// `long`, descriptor `J`
    #[strum(serialize = "long")]
    Long,
    /// `float`, descriptor `F`
    #[strum(serialize = "float")]
    Float,
    /// `double`, descriptor `D`
    #[strum(serialize = "double")]
    Double,
    /// `void`, descriptor `V`
    #[strum(serialize = "void")]
    Void,
}

impl Primitive {
    /// The Java keyword of this primitive.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The single-character descriptor of this primitive.
    #[must_use]
    pub fn descriptor(self) -> char {
        match self {
            Primitive::Boolean => 'Z',
            Primitive::Byte => 'B',
            Primitive::Char => 'C',
            Primitive::Short => 'S',
            Primitive::Int => 'I',
            Primitive::Long => 'J',
            Primitive::Float => 'F',
            Primitive::Double => 'D',
            Primitive::Void => 'V',
        }
    }

    /// Look up a primitive by its descriptor character.
    #[must_use]
    pub fn from_descriptor(code: u8) -> Option<Primitive> {
        Some(match code {
            b'Z' => Primitive::Boolean,
            b'B' => Primitive::Byte,
            b'C' => Primitive::Char,
            b'S' => Primitive::Short,
            b'I' => Primitive::Int,
            b'J' => Primitive::Long,
            b'F' => Primitive::Float,
            b'D' => Primitive::Double,
            b'V' => Primitive::Void,
            _ => return None,
        })
    }

    /// Look up a primitive by its keyword, `int` for example.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::from_str(name).ok()
    }

    /// Number of local variable slots a value of this type occupies.
    #[must_use]
    pub fn stack_size(self) -> usize {
        match self {
            Primitive::Long | Primitive::Double => 2,
            Primitive::Void => 0,
            _ => 1,
        }
    }
}

/// A method descriptor split into its parameter and return descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Field descriptors of the parameters, in declaration order
    pub parameters: Vec<String>,
    /// Field descriptor of the return type, `V` for void
    pub return_type: String,
}

/// Convert an internal name (`java/lang/String`) into a binary name (`java.lang.String`).
#[must_use]
pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Convert a binary name (`java.lang.String`) into an internal name (`java/lang/String`).
#[must_use]
pub fn binary_to_internal(name: &str) -> String {
    name.replace('.', "/")
}

/// Convert a binary name into a field descriptor.
///
/// Primitive keywords map onto their descriptor character, array names already are
/// descriptors modulo the separator, and every other name becomes an object descriptor.
#[must_use]
pub fn name_to_descriptor(name: &str) -> String {
    if let Some(primitive) = Primitive::from_name(name) {
        return primitive.descriptor().to_string();
    }
    if name.starts_with('[') {
        return binary_to_internal(name);
    }
    format!("L{};", binary_to_internal(name))
}

/// Convert a field descriptor into the binary name of the type it denotes.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `descriptor` is not exactly one field descriptor.
pub fn descriptor_to_name(descriptor: &str) -> Result<String> {
    let bytes = descriptor.as_bytes();
    let end = field_descriptor_end(bytes, 0)?;
    if end != bytes.len() {
        return Err(malformed_error!("Trailing data in descriptor {}", descriptor));
    }

    match bytes[0] {
        b'L' => Ok(internal_to_binary(&descriptor[1..descriptor.len() - 1])),
        b'[' => Ok(internal_to_binary(descriptor)),
        code => Primitive::from_descriptor(code)
            .map(|primitive| primitive.name().to_string())
            .ok_or_else(|| malformed_error!("Invalid descriptor {}", descriptor)),
    }
}

/// Split a method descriptor such as `(IJLjava/lang/String;)V`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the descriptor is not well formed.
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(malformed_error!("Method descriptor must start with '(' - {}", descriptor));
    }

    let mut parameters = Vec::new();
    let mut position = 1;
    loop {
        match bytes.get(position) {
            Some(b')') => break,
            Some(b'V') => {
                return Err(malformed_error!("void parameter in {}", descriptor));
            }
            Some(_) => {
                let end = field_descriptor_end(bytes, position)?;
                parameters.push(descriptor[position..end].to_string());
                position = end;
            }
            None => {
                return Err(malformed_error!("Unterminated parameter list in {}", descriptor));
            }
        }
    }

    let return_start = position + 1;
    let return_type = &descriptor[return_start..];
    if return_type != "V" {
        let end = field_descriptor_end(bytes, return_start)?;
        if end != bytes.len() {
            return Err(malformed_error!("Trailing data in descriptor {}", descriptor));
        }
    }

    Ok(MethodDescriptor {
        parameters,
        return_type: return_type.to_string(),
    })
}

/// Number of local variable slots taken by a value of the given field descriptor.
#[must_use]
pub fn stack_size(descriptor: &str) -> usize {
    match descriptor.as_bytes().first() {
        Some(b'J' | b'D') => 2,
        Some(b'V') => 0,
        _ => 1,
    }
}

/// Strip one array dimension from an array descriptor, `None` for non-array descriptors.
#[must_use]
pub fn component_descriptor(descriptor: &str) -> Option<&str> {
    descriptor.strip_prefix('[')
}

fn field_descriptor_end(bytes: &[u8], start: usize) -> Result<usize> {
    let mut position = start;
    while bytes.get(position) == Some(&b'[') {
        position += 1;
    }

    match bytes.get(position) {
        Some(b'L') => {
            let Some(length) = bytes[position..].iter().position(|&b| b == b';') else {
                return Err(malformed_error!("Unterminated object type in descriptor"));
            };
            if length == 1 {
                return Err(malformed_error!("Empty class name in descriptor"));
            }
            Ok(position + length + 1)
        }
        Some(&code) if code != b'V' && Primitive::from_descriptor(code).is_some() => {
            Ok(position + 1)
        }
        Some(&code) => Err(malformed_error!(
            "Invalid descriptor character '{}'",
            char::from(code)
        )),
        None => Err(malformed_error!("Descriptor ends unexpectedly")),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn primitive_lookup() {
        for primitive in Primitive::iter() {
            let code = primitive.descriptor() as u8;
            assert_eq!(Primitive::from_descriptor(code), Some(primitive));
            assert_eq!(Primitive::from_name(primitive.name()), Some(primitive));
        }
        assert_eq!(Primitive::from_name("Integer"), None);
        assert_eq!(Primitive::Long.stack_size(), 2);
        assert_eq!(Primitive::Void.stack_size(), 0);
        assert_eq!(Primitive::Char.to_string(), "char");
    }

    #[test]
    fn name_conversions() {
        assert_eq!(internal_to_binary("java/util/Map$Entry"), "java.util.Map$Entry");
        assert_eq!(binary_to_internal("java.lang.Object"), "java/lang/Object");
        assert_eq!(name_to_descriptor("int"), "I");
        assert_eq!(name_to_descriptor("java.lang.String"), "Ljava/lang/String;");
        assert_eq!(name_to_descriptor("[Ljava.lang.String;"), "[Ljava/lang/String;");
    }

    #[test]
    fn descriptor_names() {
        assert_eq!(descriptor_to_name("J").unwrap(), "long");
        assert_eq!(descriptor_to_name("Ljava/lang/String;").unwrap(), "java.lang.String");
        assert_eq!(descriptor_to_name("[[I").unwrap(), "[[I");
        assert_eq!(descriptor_to_name("[Lfoo/Bar;").unwrap(), "[Lfoo.Bar;");
        assert!(descriptor_to_name("Lfoo/Bar").is_err());
        assert!(descriptor_to_name("II").is_err());
        assert!(descriptor_to_name("Q").is_err());
        assert!(descriptor_to_name("").is_err());
    }

    #[test]
    fn method_descriptor() {
        let parsed = parse_method_descriptor("(IJ[Ljava/lang/String;D)V").unwrap();
        assert_eq!(parsed.parameters, vec!["I", "J", "[Ljava/lang/String;", "D"]);
        assert_eq!(parsed.return_type, "V");

        let parsed = parse_method_descriptor("()Ljava/util/List;").unwrap();
        assert!(parsed.parameters.is_empty());
        assert_eq!(parsed.return_type, "Ljava/util/List;");
    }

    #[test]
    fn method_descriptor_invalid() {
        assert!(parse_method_descriptor("I)V").is_err());
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("(V)V").is_err());
        assert!(parse_method_descriptor("()").is_err());
        assert!(parse_method_descriptor("()VV").is_err());
    }

    #[test]
    fn slots() {
        assert_eq!(stack_size("J"), 2);
        assert_eq!(stack_size("D"), 2);
        assert_eq!(stack_size("[J"), 1);
        assert_eq!(stack_size("Ljava/lang/Object;"), 1);
        assert_eq!(component_descriptor("[[I"), Some("[I"));
        assert_eq!(component_descriptor("I"), None);
    }
}
