//! The constant pool of a class file.
//!
//! Entries are decoded once, eagerly, into [`Constant`] values. Indices are 1-based and the
//! slot following a `Long` or `Double` entry is unusable, mirrored here by
//! [`Constant::Unusable`] so that indices map directly onto vector positions.

use strum::{Display, FromRepr};

use crate::{file::parser::Parser, Result};

/// Tag byte of a constant pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

/// A decoded constant pool entry.
///
/// References to other entries are kept as raw indices.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Constant {
    /// Index 0 and the second slot of 8-byte constants
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef { class: u16, name_and_type: u16 },
    MethodRef { class: u16, name_and_type: u16 },
    InterfaceMethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle { kind: u8, reference: u16 },
    MethodType(u16),
    Dynamic { bootstrap: u16, name_and_type: u16 },
    InvokeDynamic { bootstrap: u16, name_and_type: u16 },
    Module(u16),
    Package(u16),
}

/// The constant pool of one class file.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Read `constant_pool_count` followed by the entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unknown tags and [`crate::Error::OutOfBounds`]
    /// on truncation.
    pub fn read(parser: &mut Parser) -> Result<ConstantPool> {
        let count = parser.read_be::<u16>()? as usize;
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable);

        while entries.len() < count {
            let tag_byte = parser.read_be::<u8>()?;
            let Some(tag) = ConstantTag::from_repr(tag_byte) else {
                return Err(malformed_error!(
                    "Unknown constant pool tag {} at index {}",
                    tag_byte,
                    entries.len()
                ));
            };

            let constant = match tag {
                ConstantTag::Utf8 => {
                    let length = parser.read_be::<u16>()? as usize;
                    Constant::Utf8(parser.read_utf8(length)?)
                }
                ConstantTag::Integer => Constant::Integer(parser.read_be()?),
                ConstantTag::Float => Constant::Float(parser.read_be()?),
                ConstantTag::Long => Constant::Long(parser.read_be()?),
                ConstantTag::Double => Constant::Double(parser.read_be()?),
                ConstantTag::Class => Constant::Class(parser.read_be()?),
                ConstantTag::String => Constant::String(parser.read_be()?),
                ConstantTag::FieldRef => Constant::FieldRef {
                    class: parser.read_be()?,
                    name_and_type: parser.read_be()?,
                },
                ConstantTag::MethodRef => Constant::MethodRef {
                    class: parser.read_be()?,
                    name_and_type: parser.read_be()?,
                },
                ConstantTag::InterfaceMethodRef => Constant::InterfaceMethodRef {
                    class: parser.read_be()?,
                    name_and_type: parser.read_be()?,
                },
                ConstantTag::NameAndType => Constant::NameAndType {
                    name: parser.read_be()?,
                    descriptor: parser.read_be()?,
                },
                ConstantTag::MethodHandle => Constant::MethodHandle {
                    kind: parser.read_be()?,
                    reference: parser.read_be()?,
                },
                ConstantTag::MethodType => Constant::MethodType(parser.read_be()?),
                ConstantTag::Dynamic => Constant::Dynamic {
                    bootstrap: parser.read_be()?,
                    name_and_type: parser.read_be()?,
                },
                ConstantTag::InvokeDynamic => Constant::InvokeDynamic {
                    bootstrap: parser.read_be()?,
                    name_and_type: parser.read_be()?,
                },
                ConstantTag::Module => Constant::Module(parser.read_be()?),
                ConstantTag::Package => Constant::Package(parser.read_be()?),
            };

            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            if wide {
                if entries.len() >= count {
                    return Err(malformed_error!("8-byte constant in the last pool slot"));
                }
                entries.push(Constant::Unusable);
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots, including the unusable slot 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool holds no entries besides slot 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Fetch the entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for index 0, unusable slots and indices past the
    /// end of the pool.
    pub fn get(&self, index: u16) -> Result<&Constant> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => {
                Err(malformed_error!("Invalid constant pool index {}", index))
            }
            Some(constant) => Ok(constant),
        }
    }

    /// Fetch a `CONSTANT_Utf8` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entry is missing or of another kind.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            other => Err(malformed_error!(
                "Expected Utf8 at constant pool index {}, found {:?}",
                index,
                other
            )),
        }
    }

    /// Like [`ConstantPool::utf8`] but maps index 0 to `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for non-zero indices that are not Utf8 entries.
    pub fn optional_utf8(&self, index: u16) -> Result<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.utf8(index).map(Some)
    }

    /// Fetch the internal name referenced by a `CONSTANT_Class` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entry is missing or of another kind.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Constant::Class(name) => self.utf8(*name),
            other => Err(malformed_error!(
                "Expected Class at constant pool index {}, found {:?}",
                index,
                other
            )),
        }
    }

    /// Like [`ConstantPool::class_name`] but maps index 0 to `None`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for non-zero indices that are not Class entries.
    pub fn optional_class_name(&self, index: u16) -> Result<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    /// Fetch the name and descriptor of a `CONSTANT_NameAndType` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the entry is missing or of another kind.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            other => Err(malformed_error!(
                "Expected NameAndType at constant pool index {}, found {:?}",
                index,
                other
            )),
        }
    }
}
