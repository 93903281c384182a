use tracing::{debug, trace};

use crate::{
    classfile::{
        access::AccessFlags,
        attributes::{
            read_annotations, read_code, read_element_value, read_enclosing_method,
            read_exceptions, read_inner_classes, read_method_parameters,
            read_parameter_annotations, CodeInfo, ElementValue, EnclosingMethod, InnerClassEntry,
            MethodParameter, RawAnnotation,
        },
        constant_pool::{Constant, ConstantPool},
    },
    file::parser::Parser,
    Result,
};

/// Magic number every class file starts with.
pub const CLASS_FILE_MAGIC: u32 = 0xCAFE_BABE;

/// How much of a class file is decoded.
///
/// Both modes produce identical shape data: fields, methods, annotations, generic signatures
/// and nesting information. They differ only in what is kept from method bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadMode {
    /// Skip `Code` attributes entirely.
    #[default]
    Fast,
    /// Decode `Code` attributes and keep local variables, line numbers and the stack map
    /// frame count. Parameter names recorded only in local variable tables are available in
    /// this mode.
    Extended,
}

impl ReadMode {
    /// Returns true for [`ReadMode::Extended`].
    #[must_use]
    pub fn is_extended(self) -> bool {
        self == ReadMode::Extended
    }
}

/// A field record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Access flags
    pub access: AccessFlags,
    /// Field name
    pub name: String,
    /// Field descriptor
    pub descriptor: String,
    /// Raw generic signature, if present
    pub signature: Option<String>,
    /// Visible annotations followed by invisible annotations
    pub annotations: Vec<RawAnnotation>,
    /// Compile time constant from the `ConstantValue` attribute
    pub constant_value: Option<Constant>,
}

/// A method record.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// Access flags
    pub access: AccessFlags,
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Raw generic signature, if present
    pub signature: Option<String>,
    /// Internal names of the declared exceptions
    pub exceptions: Vec<String>,
    /// Visible annotations followed by invisible annotations
    pub annotations: Vec<RawAnnotation>,
    /// Per-parameter annotations, visible before invisible for every index
    pub parameter_annotations: Vec<Vec<RawAnnotation>>,
    /// Default value of an annotation interface element
    pub annotation_default: Option<ElementValue>,
    /// Entries of the `MethodParameters` attribute
    pub parameters: Vec<MethodParameter>,
    /// Body information, only in [`ReadMode::Extended`]
    pub code: Option<CodeInfo>,
}

/// A decoded class file.
///
/// Names are kept in internal form. Cross-type references are not followed.
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Minor format version
    pub minor_version: u16,
    /// Major format version
    pub major_version: u16,
    /// The constant pool
    pub constant_pool: ConstantPool,
    /// Access flags from the class header
    pub access: AccessFlags,
    /// Internal name of this class
    pub this_class: String,
    /// Internal name of the superclass, absent for `java/lang/Object` and module descriptors
    pub super_class: Option<String>,
    /// Internal names of the direct superinterfaces
    pub interfaces: Vec<String>,
    /// Field records
    pub fields: Vec<FieldInfo>,
    /// Method records
    pub methods: Vec<MethodInfo>,
    /// Raw generic signature, if present
    pub signature: Option<String>,
    /// Entries of the `InnerClasses` attribute
    pub inner_classes: Vec<InnerClassEntry>,
    /// The `EnclosingMethod` attribute
    pub enclosing_method: Option<EnclosingMethod>,
    /// Visible annotations followed by invisible annotations
    pub annotations: Vec<RawAnnotation>,
    /// The `SourceFile` attribute
    pub source_file: Option<String>,
}

#[derive(Default)]
struct AnnotationSets {
    visible: Vec<RawAnnotation>,
    invisible: Vec<RawAnnotation>,
}

impl AnnotationSets {
    fn merged(self) -> Vec<RawAnnotation> {
        let mut merged = self.visible;
        merged.extend(self.invisible);
        merged
    }
}

impl ClassFile {
    /// Decode `data` as a class file.
    ///
    /// Attributes this crate has no use for are skipped by length. A structurally broken file
    /// (wrong magic, truncated tables, dangling constant pool references) is rejected.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`], [`crate::Error::Malformed`] or
    /// [`crate::Error::OutOfBounds`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use classpool::classfile::{ClassFile, ReadMode};
    ///
    /// let data = std::fs::read("target/classes/com/example/Foo.class")?;
    /// let class = ClassFile::parse(&data, ReadMode::Fast)?;
    /// println!("{} extends {:?}", class.this_class, class.super_class);
    /// # Ok::<(), classpool::Error>(())
    /// ```
    pub fn parse(data: &[u8], mode: ReadMode) -> Result<ClassFile> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        let mut parser = Parser::new(data);
        let magic = parser.read_be::<u32>()?;
        if magic != CLASS_FILE_MAGIC {
            return Err(malformed_error!("Invalid class file magic 0x{:08X}", magic));
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        let pool = ConstantPool::read(&mut parser)?;

        let access = AccessFlags::from_bits_retain(parser.read_be()?);
        let this_class = pool.class_name(parser.read_be()?)?.to_string();
        let super_class = pool
            .optional_class_name(parser.read_be()?)?
            .map(str::to_string);

        let interface_count = parser.read_be::<u16>()?;
        let interfaces = (0..interface_count)
            .map(|_| Ok(pool.class_name(parser.read_be()?)?.to_string()))
            .collect::<Result<Vec<_>>>()?;

        let field_count = parser.read_be::<u16>()?;
        let fields = (0..field_count)
            .map(|_| read_field(&mut parser, &pool))
            .collect::<Result<Vec<_>>>()?;

        let method_count = parser.read_be::<u16>()?;
        let methods = (0..method_count)
            .map(|_| read_method(&mut parser, &pool, mode))
            .collect::<Result<Vec<_>>>()?;

        let mut class = ClassFile {
            minor_version,
            major_version,
            constant_pool: ConstantPool::default(),
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: None,
            inner_classes: Vec::new(),
            enclosing_method: None,
            annotations: Vec::new(),
            source_file: None,
        };

        let mut annotations = AnnotationSets::default();
        let attribute_count = parser.read_be::<u16>()?;
        for _ in 0..attribute_count {
            let name = pool.utf8(parser.read_be()?)?;
            let length = parser.read_be::<u32>()? as usize;
            let mut body = Parser::new(parser.read_bytes(length)?);

            let owner = class.this_class.as_str();
            match name {
                "Signature" => class.signature = Some(read_signature(&mut body, &pool, owner)),
                "SourceFile" => {
                    class.source_file = optional(name, owner, read_utf8(&mut body, &pool));
                }
                "InnerClasses" => {
                    class.inner_classes =
                        optional(name, owner, read_inner_classes(&mut body, &pool))
                            .unwrap_or_default();
                }
                "EnclosingMethod" => {
                    class.enclosing_method =
                        optional(name, owner, read_enclosing_method(&mut body, &pool));
                }
                "RuntimeVisibleAnnotations" => {
                    annotations.visible =
                        optional(name, owner, read_annotations(&mut body, &pool)).unwrap_or_default();
                }
                "RuntimeInvisibleAnnotations" => {
                    annotations.invisible =
                        optional(name, owner, read_annotations(&mut body, &pool)).unwrap_or_default();
                }
                _ => trace!(attribute = name, class = owner, "skipping attribute"),
            }
        }

        class.annotations = annotations.merged();
        class.constant_pool = pool;
        Ok(class)
    }

    /// Look up the `InnerClasses` entry describing this class itself.
    #[must_use]
    pub fn own_inner_class_entry(&self) -> Option<&InnerClassEntry> {
        self.inner_classes
            .iter()
            .find(|entry| entry.inner_class == self.this_class)
    }
}

fn read_field(parser: &mut Parser, pool: &ConstantPool) -> Result<FieldInfo> {
    let access = AccessFlags::from_bits_retain(parser.read_be()?);
    let name = pool.utf8(parser.read_be()?)?.to_string();
    let descriptor = pool.utf8(parser.read_be()?)?.to_string();

    let mut field = FieldInfo {
        access,
        name,
        descriptor,
        signature: None,
        annotations: Vec::new(),
        constant_value: None,
    };

    let mut annotations = AnnotationSets::default();
    let attribute_count = parser.read_be::<u16>()?;
    for _ in 0..attribute_count {
        let name = pool.utf8(parser.read_be()?)?;
        let length = parser.read_be::<u32>()? as usize;
        let mut body = Parser::new(parser.read_bytes(length)?);

        let owner = field.name.as_str();
        match name {
            "Signature" => field.signature = Some(read_signature(&mut body, pool, owner)),
            "ConstantValue" => {
                let constant = body.read_be().and_then(|index| Ok(pool.get(index)?.clone()));
                field.constant_value = optional(name, owner, constant);
            }
            "RuntimeVisibleAnnotations" => {
                annotations.visible =
                    optional(name, owner, read_annotations(&mut body, pool)).unwrap_or_default();
            }
            "RuntimeInvisibleAnnotations" => {
                annotations.invisible =
                    optional(name, owner, read_annotations(&mut body, pool)).unwrap_or_default();
            }
            _ => {}
        }
    }

    field.annotations = annotations.merged();
    Ok(field)
}

fn read_method(parser: &mut Parser, pool: &ConstantPool, mode: ReadMode) -> Result<MethodInfo> {
    let access = AccessFlags::from_bits_retain(parser.read_be()?);
    let name = pool.utf8(parser.read_be()?)?.to_string();
    let descriptor = pool.utf8(parser.read_be()?)?.to_string();

    let mut method = MethodInfo {
        access,
        name,
        descriptor,
        signature: None,
        exceptions: Vec::new(),
        annotations: Vec::new(),
        parameter_annotations: Vec::new(),
        annotation_default: None,
        parameters: Vec::new(),
        code: None,
    };

    let mut annotations = AnnotationSets::default();
    let mut visible_parameters = Vec::new();
    let mut invisible_parameters = Vec::new();

    let attribute_count = parser.read_be::<u16>()?;
    for _ in 0..attribute_count {
        let name = pool.utf8(parser.read_be()?)?;
        let length = parser.read_be::<u32>()? as usize;
        let mut body = Parser::new(parser.read_bytes(length)?);

        let owner = method.name.as_str();
        match name {
            "Signature" => method.signature = Some(read_signature(&mut body, pool, owner)),
            "Exceptions" => {
                method.exceptions =
                    optional(name, owner, read_exceptions(&mut body, pool)).unwrap_or_default();
            }
            "AnnotationDefault" => {
                method.annotation_default =
                    optional(name, owner, read_element_value(&mut body, pool));
            }
            "MethodParameters" => {
                method.parameters = optional(name, owner, read_method_parameters(&mut body, pool))
                    .unwrap_or_default();
            }
            "RuntimeVisibleAnnotations" => {
                annotations.visible =
                    optional(name, owner, read_annotations(&mut body, pool)).unwrap_or_default();
            }
            "RuntimeInvisibleAnnotations" => {
                annotations.invisible =
                    optional(name, owner, read_annotations(&mut body, pool)).unwrap_or_default();
            }
            "RuntimeVisibleParameterAnnotations" => {
                visible_parameters =
                    optional(name, owner, read_parameter_annotations(&mut body, pool))
                        .unwrap_or_default();
            }
            "RuntimeInvisibleParameterAnnotations" => {
                invisible_parameters =
                    optional(name, owner, read_parameter_annotations(&mut body, pool))
                        .unwrap_or_default();
            }
            "Code" if mode.is_extended() => {
                method.code = optional(name, owner, read_code(&mut body, pool));
            }
            _ => {}
        }
    }

    method.annotations = annotations.merged();

    let count = visible_parameters.len().max(invisible_parameters.len());
    let mut visible = visible_parameters.into_iter();
    let mut invisible = invisible_parameters.into_iter();
    method.parameter_annotations = (0..count)
        .map(|_| {
            let mut merged = visible.next().unwrap_or_default();
            merged.extend(invisible.next().unwrap_or_default());
            merged
        })
        .collect();

    Ok(method)
}

/// Text of a `Signature` attribute.
///
/// An unresolvable index is kept as `#<index>`, which never tokenizes and so surfaces as a
/// malformed signature.
fn read_signature(body: &mut Parser, pool: &ConstantPool, owner: &str) -> String {
    let index = match body.read_be::<u16>() {
        Ok(index) => index,
        Err(error) => {
            debug!(owner, %error, "truncated signature attribute");
            return "#".to_string();
        }
    };
    match pool.utf8(index) {
        Ok(text) => text.to_string(),
        Err(error) => {
            debug!(owner, index, %error, "unresolvable signature constant");
            format!("#{index}")
        }
    }
}

fn read_utf8(body: &mut Parser, pool: &ConstantPool) -> Result<String> {
    Ok(pool.utf8(body.read_be()?)?.to_string())
}

/// Degrade a broken optional attribute to `None`.
fn optional<T>(attribute: &str, owner: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(attribute, owner, %error, "ignoring unreadable attribute");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::attributes::ElementConstant,
        test::{AnnotationSpec, ClassFileBuilder, ElementSpec, FieldSpec, MethodSpec},
        Error,
    };

    #[test]
    fn header_and_members() {
        let bytes = ClassFileBuilder::new("foo/Bar")
            .access(0x0021)
            .interface("java/io/Serializable")
            .field(FieldSpec::new(0x0002, "count", "I"))
            .method(MethodSpec::new(0x0001, "<init>", "()V").with_code())
            .method(MethodSpec::new(0x0009, "run", "(JLjava/lang/String;)V"))
            .build();

        let class = ClassFile::parse(&bytes, ReadMode::Fast).unwrap();

        assert_eq!(class.major_version, 52);
        assert_eq!(class.this_class, "foo/Bar");
        assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
        assert_eq!(class.interfaces, vec!["java/io/Serializable"]);
        assert_eq!(class.access, AccessFlags::PUBLIC | AccessFlags::SUPER);
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.fields[0].name, "count");
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class.methods[1].descriptor, "(JLjava/lang/String;)V");
        assert!(class.methods[0].code.is_none());
    }

    #[test]
    fn extended_mode_keeps_code() {
        let bytes = ClassFileBuilder::new("foo/Bar")
            .method(
                MethodSpec::new(0x0001, "sum", "(IJ)J")
                    .with_local(0, "this", "Lfoo/Bar;", 0)
                    .with_local(0, "a", "I", 1)
                    .with_local(0, "b", "J", 2)
                    .with_line(0, 12),
            )
            .build();

        let fast = ClassFile::parse(&bytes, ReadMode::Fast).unwrap();
        assert!(fast.methods[0].code.is_none());

        let extended = ClassFile::parse(&bytes, ReadMode::Extended).unwrap();
        let code = extended.methods[0].code.as_ref().unwrap();
        assert_eq!(code.local_variables.len(), 3);
        assert_eq!(code.local_variables[2].name, "b");
        assert_eq!(code.local_variables[2].index, 2);
        assert_eq!(code.line_numbers[0].line, 12);
        assert_eq!(code.frame_count, 0);
    }

    #[test]
    fn broken_optional_attributes_degrade() {
        let bytes = ClassFileBuilder::new("foo/Sig")
            .raw_attribute("Signature", vec![0xFF, 0xFF])
            .raw_attribute("EnclosingMethod", vec![0xFF, 0xFF, 0x00, 0x00])
            .raw_attribute("InnerClasses", vec![0x00, 0x05])
            .raw_attribute("RuntimeVisibleAnnotations", vec![0x00, 0x01, 0xFF, 0xFF, 0x00, 0x00])
            .raw_attribute("SourceFile", Vec::new())
            .build();

        let class = ClassFile::parse(&bytes, ReadMode::Fast).unwrap();
        assert_eq!(class.this_class, "foo/Sig");
        assert_eq!(class.signature.as_deref(), Some("#65535"));
        assert!(class.enclosing_method.is_none());
        assert!(class.inner_classes.is_empty());
        assert!(class.annotations.is_empty());
        assert!(class.source_file.is_none());
    }

    #[test]
    fn class_attributes() {
        let bytes = ClassFileBuilder::new("foo/Outer$1")
            .signature("Ljava/lang/Object;Ljava/lang/Runnable;")
            .inner_class("foo/Outer$1", None, None, 0x0000)
            .enclosing_method("foo/Outer", Some(("run", "()V")))
            .annotation(AnnotationSpec::new("Lfoo/Marker;"))
            .invisible_annotation(
                AnnotationSpec::new("Lfoo/Hidden;").with("value", ElementSpec::Int(3)),
            )
            .build();

        let class = ClassFile::parse(&bytes, ReadMode::Fast).unwrap();

        assert_eq!(
            class.signature.as_deref(),
            Some("Ljava/lang/Object;Ljava/lang/Runnable;")
        );
        let entry = class.own_inner_class_entry().unwrap();
        assert_eq!(entry.outer_class, None);
        assert_eq!(entry.inner_name, None);
        let enclosing = class.enclosing_method.as_ref().unwrap();
        assert_eq!(enclosing.class, "foo/Outer");
        assert_eq!(
            enclosing.method,
            Some(("run".to_string(), "()V".to_string()))
        );
        assert_eq!(class.annotations.len(), 2);
        assert_eq!(class.annotations[0].descriptor, "Lfoo/Marker;");
        assert_eq!(
            class.annotations[1].elements[0].1,
            ElementValue::Constant(ElementConstant::Int(3))
        );
    }

    #[test]
    fn method_attributes() {
        let bytes = ClassFileBuilder::new("foo/Ann")
            .access(0x2601)
            .method(
                MethodSpec::new(0x0401, "value", "()[Ljava/lang/String;")
                    .with_default(ElementSpec::Array(vec![ElementSpec::String("a".into())])),
            )
            .method(
                MethodSpec::new(0x0001, "call", "(ILjava/lang/String;)V")
                    .with_exception("java/io/IOException")
                    .with_parameter(Some("first"), 0x0010)
                    .with_parameter(None, 0x1000)
                    .with_parameter_annotations(vec![
                        vec![],
                        vec![AnnotationSpec::new("Lfoo/NotNull;")],
                    ]),
            )
            .build();

        let class = ClassFile::parse(&bytes, ReadMode::Fast).unwrap();

        assert_eq!(
            class.methods[0].annotation_default,
            Some(ElementValue::Array(vec![ElementValue::Constant(
                ElementConstant::String("a".into())
            )]))
        );
        let call = &class.methods[1];
        assert_eq!(call.exceptions, vec!["java/io/IOException"]);
        assert_eq!(call.parameters.len(), 2);
        assert_eq!(call.parameters[0].name.as_deref(), Some("first"));
        assert_eq!(call.parameters[1].name, None);
        assert_eq!(call.parameters[1].access, AccessFlags::SYNTHETIC);
        assert_eq!(call.parameter_annotations.len(), 2);
        assert!(call.parameter_annotations[0].is_empty());
        assert_eq!(call.parameter_annotations[1][0].descriptor, "Lfoo/NotNull;");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = ClassFileBuilder::new("foo/Bar").build();
        bytes[0] = 0xCB;
        assert!(matches!(
            ClassFile::parse(&bytes, ReadMode::Fast),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_truncation() {
        let bytes = ClassFileBuilder::new("foo/Bar")
            .field(FieldSpec::new(0x0001, "x", "I"))
            .build();
        let truncated = &bytes[..bytes.len() - 6];
        assert!(ClassFile::parse(truncated, ReadMode::Fast).is_err());
        assert!(matches!(
            ClassFile::parse(&[], ReadMode::Fast),
            Err(Error::Empty)
        ));
    }
}
