//! Attribute payloads the decoder keeps.
//!
//! Constant pool references are dereferenced while reading, so none of these records carry
//! indices; strings are owned and names stay in their internal or descriptor form.

use crate::{
    classfile::{access::AccessFlags, constant_pool::Constant, constant_pool::ConstantPool},
    file::parser::Parser,
    Result,
};

/// A `RuntimeVisibleAnnotations` or `RuntimeInvisibleAnnotations` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    /// Field descriptor of the annotation type
    pub descriptor: String,
    /// Element name and value pairs in declaration order
    pub elements: Vec<(String, ElementValue)>,
}

/// A constant `element_value`.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ElementConstant {
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(String),
}

/// The `element_value` structure of annotations and annotation defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Primitive or string constant
    Constant(ElementConstant),
    /// Enumeration constant given by its type descriptor and constant name
    Enum {
        /// Field descriptor of the enumeration type
        descriptor: String,
        /// Name of the constant
        constant: String,
    },
    /// Class literal given by its return descriptor, `V` for `void.class`
    Class(String),
    /// Nested annotation
    Annotation(RawAnnotation),
    /// Array of element values
    Array(Vec<ElementValue>),
}

/// One entry of the `InnerClasses` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassEntry {
    /// Internal name of the inner class
    pub inner_class: String,
    /// Internal name of the declaring class, absent for local and anonymous classes
    pub outer_class: Option<String>,
    /// Simple name, absent for anonymous classes
    pub inner_name: Option<String>,
    /// Access flags as declared in source
    pub access: AccessFlags,
}

/// The `EnclosingMethod` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    /// Internal name of the innermost enclosing class
    pub class: String,
    /// Name and descriptor of the enclosing method, absent for initializer blocks
    pub method: Option<(String, String)>,
}

/// One entry of the `MethodParameters` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// Parameter name, absent for unnamed formal parameters
    pub name: Option<String>,
    /// `FINAL`, `SYNTHETIC` and `MANDATED`
    pub access: AccessFlags,
}

/// One entry of the `LocalVariableTable` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// First code offset the variable is live at
    pub start_pc: u16,
    /// Length of the live range
    pub length: u16,
    /// Variable name
    pub name: String,
    /// Field descriptor of the variable
    pub descriptor: String,
    /// Local variable slot
    pub index: u16,
}

/// One entry of the `LineNumberTable` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    /// Code offset where the line starts
    pub start_pc: u16,
    /// Source line number
    pub line: u16,
}

/// The parts of a `Code` attribute retained in extended read mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeInfo {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// Length of the bytecode in bytes
    pub code_length: u32,
    /// Local variable table entries
    pub local_variables: Vec<LocalVariable>,
    /// Line number table entries
    pub line_numbers: Vec<LineNumber>,
    /// Number of stack map frames
    pub frame_count: u16,
}

pub(crate) fn read_annotations(parser: &mut Parser, pool: &ConstantPool) -> Result<Vec<RawAnnotation>> {
    let count = parser.read_be::<u16>()?;
    (0..count).map(|_| read_annotation(parser, pool)).collect()
}

pub(crate) fn read_parameter_annotations(
    parser: &mut Parser,
    pool: &ConstantPool,
) -> Result<Vec<Vec<RawAnnotation>>> {
    let count = parser.read_be::<u8>()?;
    (0..count).map(|_| read_annotations(parser, pool)).collect()
}

pub(crate) fn read_annotation(parser: &mut Parser, pool: &ConstantPool) -> Result<RawAnnotation> {
    let descriptor = pool.utf8(parser.read_be()?)?.to_string();
    let pairs = parser.read_be::<u16>()?;

    let mut elements = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        let name = pool.utf8(parser.read_be()?)?.to_string();
        elements.push((name, read_element_value(parser, pool)?));
    }

    Ok(RawAnnotation {
        descriptor,
        elements,
    })
}

pub(crate) fn read_element_value(parser: &mut Parser, pool: &ConstantPool) -> Result<ElementValue> {
    let tag = parser.read_be::<u8>()?;
    let value = match tag {
        b'B' | b'C' | b'I' | b'S' | b'Z' => {
            let index = parser.read_be::<u16>()?;
            let Constant::Integer(value) = pool.get(index)? else {
                return Err(malformed_error!("Element value '{}' needs an Integer constant", char::from(tag)));
            };
            // Narrowing mirrors how the compiler stored the value
            ElementValue::Constant(match tag {
                b'B' => ElementConstant::Byte(*value as i8),
                b'C' => ElementConstant::Char(*value as u16),
                b'S' => ElementConstant::Short(*value as i16),
                b'Z' => ElementConstant::Boolean(*value != 0),
                _ => ElementConstant::Int(*value),
            })
        }
        b'J' => match pool.get(parser.read_be()?)? {
            Constant::Long(value) => ElementValue::Constant(ElementConstant::Long(*value)),
            _ => return Err(malformed_error!("Element value 'J' needs a Long constant")),
        },
        b'F' => match pool.get(parser.read_be()?)? {
            Constant::Float(value) => ElementValue::Constant(ElementConstant::Float(*value)),
            _ => return Err(malformed_error!("Element value 'F' needs a Float constant")),
        },
        b'D' => match pool.get(parser.read_be()?)? {
            Constant::Double(value) => ElementValue::Constant(ElementConstant::Double(*value)),
            _ => return Err(malformed_error!("Element value 'D' needs a Double constant")),
        },
        b's' => {
            let value = pool.utf8(parser.read_be()?)?;
            ElementValue::Constant(ElementConstant::String(value.to_string()))
        }
        b'e' => {
            let descriptor = pool.utf8(parser.read_be()?)?.to_string();
            let constant = pool.utf8(parser.read_be()?)?.to_string();
            ElementValue::Enum {
                descriptor,
                constant,
            }
        }
        b'c' => ElementValue::Class(pool.utf8(parser.read_be()?)?.to_string()),
        b'@' => ElementValue::Annotation(read_annotation(parser, pool)?),
        b'[' => {
            let count = parser.read_be::<u16>()?;
            let values = (0..count)
                .map(|_| read_element_value(parser, pool))
                .collect::<Result<Vec<_>>>()?;
            ElementValue::Array(values)
        }
        _ => {
            return Err(malformed_error!(
                "Unknown element value tag '{}'",
                char::from(tag)
            ))
        }
    };

    Ok(value)
}

pub(crate) fn read_inner_classes(
    parser: &mut Parser,
    pool: &ConstantPool,
) -> Result<Vec<InnerClassEntry>> {
    let count = parser.read_be::<u16>()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner_class = pool.class_name(parser.read_be()?)?.to_string();
        let outer_class = pool.optional_class_name(parser.read_be()?)?.map(str::to_string);
        let inner_name = pool.optional_utf8(parser.read_be()?)?.map(str::to_string);
        let access = AccessFlags::from_bits_retain(parser.read_be()?);
        entries.push(InnerClassEntry {
            inner_class,
            outer_class,
            inner_name,
            access,
        });
    }
    Ok(entries)
}

pub(crate) fn read_enclosing_method(
    parser: &mut Parser,
    pool: &ConstantPool,
) -> Result<EnclosingMethod> {
    let class = pool.class_name(parser.read_be()?)?.to_string();
    let method_index = parser.read_be::<u16>()?;
    let method = if method_index == 0 {
        None
    } else {
        let (name, descriptor) = pool.name_and_type(method_index)?;
        Some((name.to_string(), descriptor.to_string()))
    };
    Ok(EnclosingMethod { class, method })
}

pub(crate) fn read_method_parameters(
    parser: &mut Parser,
    pool: &ConstantPool,
) -> Result<Vec<MethodParameter>> {
    let count = parser.read_be::<u8>()?;
    let mut parameters = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.optional_utf8(parser.read_be()?)?.map(str::to_string);
        let access = AccessFlags::from_bits_retain(parser.read_be()?);
        parameters.push(MethodParameter { name, access });
    }
    Ok(parameters)
}

pub(crate) fn read_exceptions(parser: &mut Parser, pool: &ConstantPool) -> Result<Vec<String>> {
    let count = parser.read_be::<u16>()?;
    (0..count)
        .map(|_| Ok(pool.class_name(parser.read_be()?)?.to_string()))
        .collect()
}

pub(crate) fn read_code(parser: &mut Parser, pool: &ConstantPool) -> Result<CodeInfo> {
    let max_stack = parser.read_be::<u16>()?;
    let max_locals = parser.read_be::<u16>()?;
    let code_length = parser.read_be::<u32>()?;
    parser.advance_by(code_length as usize)?;

    let exception_table_length = parser.read_be::<u16>()?;
    parser.advance_by(exception_table_length as usize * 8)?;

    let mut code = CodeInfo {
        max_stack,
        max_locals,
        code_length,
        ..CodeInfo::default()
    };

    let attribute_count = parser.read_be::<u16>()?;
    for _ in 0..attribute_count {
        let name = pool.utf8(parser.read_be()?)?;
        let length = parser.read_be::<u32>()? as usize;
        let mut body = Parser::new(parser.read_bytes(length)?);

        match name {
            "LineNumberTable" => {
                let count = body.read_be::<u16>()?;
                for _ in 0..count {
                    code.line_numbers.push(LineNumber {
                        start_pc: body.read_be()?,
                        line: body.read_be()?,
                    });
                }
            }
            "LocalVariableTable" => {
                let count = body.read_be::<u16>()?;
                for _ in 0..count {
                    let start_pc = body.read_be()?;
                    let length = body.read_be()?;
                    let name = pool.utf8(body.read_be()?)?.to_string();
                    let descriptor = pool.utf8(body.read_be()?)?.to_string();
                    let index = body.read_be()?;
                    code.local_variables.push(LocalVariable {
                        start_pc,
                        length,
                        name,
                        descriptor,
                        index,
                    });
                }
            }
            "StackMapTable" => code.frame_count = body.read_be()?,
            _ => {}
        }
    }

    Ok(code)
}
