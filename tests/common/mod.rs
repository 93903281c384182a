//! Class file writer shared by the integration tests and benchmarks.
//!
//! Emits the subset of the format the pool reads: constant pool, members, `Signature`,
//! `Exceptions`, `InnerClasses`, `RuntimeVisibleAnnotations` and `AnnotationDefault`.
#![allow(dead_code)]

use std::{collections::HashMap, fs, path::Path};

#[derive(Clone)]
pub enum Element {
    Int(i32),
    String(String),
    /// Return descriptor of the class literal
    Class(String),
    /// Type descriptor and constant name
    Enum(String, String),
    Annotation(String, Vec<(String, Element)>),
    Array(Vec<Element>),
}

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    next: u16,
    cache: HashMap<(u8, Vec<u8>), u16>,
}

impl Pool {
    fn entry(&mut self, tag: u8, payload: Vec<u8>) -> u16 {
        if let Some(&index) = self.cache.get(&(tag, payload.clone())) {
            return index;
        }
        if self.next == 0 {
            self.next = 1;
        }
        let index = self.next;
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&payload);
        self.next += 1;
        self.cache.insert((tag, payload), index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut payload = (value.len() as u16).to_be_bytes().to_vec();
        payload.extend_from_slice(value.as_bytes());
        self.entry(1, payload)
    }

    fn integer(&mut self, value: i32) -> u16 {
        self.entry(3, value.to_be_bytes().to_vec())
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.entry(7, name.to_be_bytes().to_vec())
    }
}

struct Member {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    exceptions: Vec<String>,
    default_value: Option<Element>,
}

/// Builds one class file, major version 52.
pub struct ClassWriter {
    name: String,
    access: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    signature: Option<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    annotations: Vec<(String, Vec<(String, Element)>)>,
    inner_classes: Vec<(String, Option<String>, Option<String>, u16)>,
}

impl ClassWriter {
    pub fn new(internal_name: &str) -> Self {
        ClassWriter {
            name: internal_name.to_string(),
            access: 0x0021,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            signature: None,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, internal_name: Option<&str>) -> Self {
        self.super_class = internal_name.map(str::to_string);
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str, signature: Option<&str>) -> Self {
        self.fields.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
            exceptions: Vec::new(),
            default_value: None,
        });
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str, signature: Option<&str>) -> Self {
        self.methods.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
            exceptions: Vec::new(),
            default_value: None,
        });
        self
    }

    /// Add a throws clause entry to the most recently added method.
    pub fn throws(mut self, internal_name: &str) -> Self {
        if let Some(method) = self.methods.last_mut() {
            method.exceptions.push(internal_name.to_string());
        }
        self
    }

    /// Set the `AnnotationDefault` of the most recently added method.
    pub fn default_value(mut self, value: Element) -> Self {
        if let Some(method) = self.methods.last_mut() {
            method.default_value = Some(value);
        }
        self
    }

    pub fn annotation(mut self, descriptor: &str, values: Vec<(&str, Element)>) -> Self {
        self.annotations.push((
            descriptor.to_string(),
            values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        ));
        self
    }

    pub fn inner_class(
        mut self,
        inner: &str,
        outer: Option<&str>,
        simple_name: Option<&str>,
        access: u16,
    ) -> Self {
        self.inner_classes.push((
            inner.to_string(),
            outer.map(str::to_string),
            simple_name.map(str::to_string),
            access,
        ));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        put_u16(&mut body, self.access);
        put_u16(&mut body, pool.class(&self.name));
        let super_index = self.super_class.as_deref().map_or(0, |name| pool.class(name));
        put_u16(&mut body, super_index);
        put_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            put_u16(&mut body, pool.class(interface));
        }

        for members in [&self.fields, &self.methods] {
            put_u16(&mut body, members.len() as u16);
            for member in members {
                put_u16(&mut body, member.access);
                put_u16(&mut body, pool.utf8(&member.name));
                put_u16(&mut body, pool.utf8(&member.descriptor));

                let mut attributes = Vec::new();
                if let Some(signature) = &member.signature {
                    attributes.push(signature_attribute(&mut pool, signature));
                }
                if !member.exceptions.is_empty() {
                    let mut payload = Vec::new();
                    put_u16(&mut payload, member.exceptions.len() as u16);
                    for exception in &member.exceptions {
                        put_u16(&mut payload, pool.class(exception));
                    }
                    attributes.push((pool.utf8("Exceptions"), payload));
                }
                if let Some(value) = &member.default_value {
                    let mut payload = Vec::new();
                    write_element(&mut pool, &mut payload, value);
                    attributes.push((pool.utf8("AnnotationDefault"), payload));
                }
                put_attributes(&mut body, attributes);
            }
        }

        let mut attributes = Vec::new();
        if let Some(signature) = &self.signature {
            attributes.push(signature_attribute(&mut pool, signature));
        }
        if !self.inner_classes.is_empty() {
            let mut payload = Vec::new();
            put_u16(&mut payload, self.inner_classes.len() as u16);
            for (inner, outer, simple_name, access) in &self.inner_classes {
                put_u16(&mut payload, pool.class(inner));
                put_u16(&mut payload, outer.as_deref().map_or(0, |name| pool.class(name)));
                put_u16(&mut payload, simple_name.as_deref().map_or(0, |name| pool.utf8(name)));
                put_u16(&mut payload, *access);
            }
            attributes.push((pool.utf8("InnerClasses"), payload));
        }
        if !self.annotations.is_empty() {
            let mut payload = Vec::new();
            put_u16(&mut payload, self.annotations.len() as u16);
            for (descriptor, values) in &self.annotations {
                write_annotation(&mut pool, &mut payload, descriptor, values);
            }
            attributes.push((pool.utf8("RuntimeVisibleAnnotations"), payload));
        }
        put_attributes(&mut body, attributes);

        let mut out = Vec::with_capacity(body.len() + pool.bytes.len() + 10);
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        put_u16(&mut out, 0);
        put_u16(&mut out, 52);
        put_u16(&mut out, pool.next.max(1));
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }

    /// Write the class file below `root`, at the path derived from its internal name.
    pub fn write_to(self, root: &Path) {
        let path = root.join(format!("{}.class", self.name));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, self.build()).unwrap();
    }
}

fn signature_attribute(pool: &mut Pool, signature: &str) -> (u16, Vec<u8>) {
    let name = pool.utf8("Signature");
    (name, pool.utf8(signature).to_be_bytes().to_vec())
}

fn write_annotation(pool: &mut Pool, out: &mut Vec<u8>, descriptor: &str, values: &[(String, Element)]) {
    put_u16(out, pool.utf8(descriptor));
    put_u16(out, values.len() as u16);
    for (name, value) in values {
        put_u16(out, pool.utf8(name));
        write_element(pool, out, value);
    }
}

fn write_element(pool: &mut Pool, out: &mut Vec<u8>, value: &Element) {
    match value {
        Element::Int(v) => {
            out.push(b'I');
            put_u16(out, pool.integer(*v));
        }
        Element::String(v) => {
            out.push(b's');
            put_u16(out, pool.utf8(v));
        }
        Element::Class(v) => {
            out.push(b'c');
            put_u16(out, pool.utf8(v));
        }
        Element::Enum(descriptor, constant) => {
            out.push(b'e');
            put_u16(out, pool.utf8(descriptor));
            put_u16(out, pool.utf8(constant));
        }
        Element::Annotation(descriptor, values) => {
            out.push(b'@');
            write_annotation(pool, out, descriptor, values);
        }
        Element::Array(values) => {
            out.push(b'[');
            put_u16(out, values.len() as u16);
            for value in values {
                write_element(pool, out, value);
            }
        }
    }
}

fn put_attributes(out: &mut Vec<u8>, attributes: Vec<(u16, Vec<u8>)>) {
    put_u16(out, attributes.len() as u16);
    for (name, payload) in attributes {
        put_u16(out, name);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// A minimal `java.lang.Object`.
pub fn object() -> Vec<u8> {
    ClassWriter::new("java/lang/Object")
        .super_class(None)
        .method(0x0001, "<init>", "()V", None)
        .build()
}
