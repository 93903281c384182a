//! Generic signatures resolved through a pool: type variables, wildcards, nesting.

mod common;

use std::sync::Arc;

use classpool::{prelude::*, Error};
use common::{object, ClassWriter};

const INNER: u16 = 0x0001;
const STATIC_INNER: u16 = 0x0009;

fn pool() -> Arc<DefaultPool> {
    let locator = SimpleLocator::default()
        .with("java.lang.Object", object())
        .with(
            "java.lang.Number",
            ClassWriter::new("java/lang/Number").access(0x0421).build(),
        )
        .with(
            "java.lang.Comparable",
            ClassWriter::new("java/lang/Comparable")
                .access(0x0601)
                .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
                .build(),
        )
        .with(
            "java.util.List",
            ClassWriter::new("java/util/List")
                .access(0x0601)
                .signature("<E:Ljava/lang/Object;>Ljava/lang/Object;")
                .build(),
        )
        .with(
            "java.util.function.Function",
            ClassWriter::new("java/util/function/Function")
                .access(0x0601)
                .signature("<T:Ljava/lang/Object;R:Ljava/lang/Object;>Ljava/lang/Object;")
                .build(),
        )
        .with(
            "foo.Box",
            ClassWriter::new("foo/Box")
                .signature(
                    "<T:Ljava/lang/Number;>Ljava/lang/Object;Ljava/lang/Comparable<Lfoo/Box<TT;>;>;",
                )
                .interface("java/lang/Comparable")
                .field(0x0002, "items", "Ljava/util/List;", Some("Ljava/util/List<TT;>;"))
                .field(0x0002, "broken", "Ljava/util/List;", Some("Ljava/util/List<TT"))
                .field(0x0002, "grid", "[[Ljava/util/List;", Some("[[Ljava/util/List<*>;"))
                .method(
                    0x0001,
                    "map",
                    "(Ljava/util/function/Function;)Ljava/lang/Object;",
                    Some("<R:Ljava/lang/Object;>(Ljava/util/function/Function<-TT;+TR;>;)TR;"),
                )
                .method(0x0001, "first", "()Ljava/lang/Number;", Some("()TT;"))
                .inner_class("foo/Box$Cursor", Some("foo/Box"), Some("Cursor"), INNER)
                .inner_class("foo/Box$Loose", Some("foo/Box"), Some("Loose"), STATIC_INNER)
                .build(),
        )
        .with(
            "foo.Box$Cursor",
            ClassWriter::new("foo/Box$Cursor")
                .field(0x0002, "current", "Ljava/lang/Number;", Some("TT;"))
                .inner_class("foo/Box$Cursor", Some("foo/Box"), Some("Cursor"), INNER)
                .build(),
        )
        .with(
            "foo.Box$Loose",
            ClassWriter::new("foo/Box$Loose")
                .field(0x0002, "current", "Ljava/lang/Number;", Some("TT;"))
                .inner_class("foo/Box$Loose", Some("foo/Box"), Some("Loose"), STATIC_INNER)
                .build(),
        );
    DefaultPool::new(locator.into_rc(), PoolConfig::default())
}

fn field(description: &TypeDescriptionRc, name: &str) -> FieldDescription {
    description
        .declared_fields()
        .unwrap()
        .into_iter()
        .find(|field| field.name() == name)
        .unwrap()
}

fn method(description: &TypeDescriptionRc, name: &str) -> MethodDescription {
    description
        .declared_methods()
        .unwrap()
        .into_iter()
        .find(|method| method.name() == name)
        .unwrap()
}

#[test]
fn class_type_variables_and_super_types() {
    let pool = pool();
    let boxed = pool.describe("foo.Box").unwrap().resolve().unwrap();

    let variables = boxed.type_variables().unwrap();
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].symbol(), "T");
    let bounds = variables[0].bounds().unwrap();
    assert_eq!(bounds[0].to_string(), "java.lang.Number");
    assert_eq!(variables[0].erasure().unwrap().name(), "java.lang.Number");

    let super_class = boxed.generic_super_class().unwrap().unwrap();
    assert_eq!(super_class.to_string(), "java.lang.Object");

    let interfaces = boxed.generic_interfaces().unwrap();
    assert_eq!(interfaces[0].to_string(), "java.lang.Comparable<foo.Box<T>>");
    assert_eq!(
        interfaces[0].erasure().unwrap().name(),
        "java.lang.Comparable"
    );
}

#[test]
fn member_signatures() {
    let pool = pool();
    let boxed = pool.describe("foo.Box").unwrap().resolve().unwrap();

    let items = field(&boxed, "items").generic_type().unwrap();
    assert_eq!(items.to_string(), "java.util.List<T>");
    match &items {
        GenericType::Parameterized { arguments, .. } => match &arguments[0] {
            GenericType::TypeVariable(variable) => {
                assert!(matches!(variable.source(), TypeVariableSource::Type(t) if t.name() == "foo.Box"));
            }
            other => panic!("unexpected argument {other}"),
        },
        other => panic!("unexpected type {other}"),
    }

    let grid = field(&boxed, "grid").generic_type().unwrap();
    assert_eq!(grid.to_string(), "java.util.List<?>[][]");
    assert_eq!(grid.erasure().unwrap().name(), "[[Ljava.util.List;");

    let map = method(&boxed, "map");
    let method_variables = map.type_variables().unwrap();
    assert_eq!(method_variables[0].symbol(), "R");
    assert_eq!(map.generic_return_type().unwrap().to_string(), "R");
    assert_eq!(
        map.generic_parameter_types().unwrap()[0].to_string(),
        "java.util.function.Function<? super T, ? extends R>"
    );
    assert_eq!(map.return_type().unwrap().name(), "java.lang.Object");

    let first = method(&boxed, "first").generic_return_type().unwrap();
    assert_eq!(first.erasure().unwrap().name(), "java.lang.Number");
}

#[test]
fn malformed_signature_falls_back_to_erasure() {
    let pool = pool();
    let boxed = pool.describe("foo.Box").unwrap().resolve().unwrap();

    let broken = field(&boxed, "broken");
    assert!(broken.token().signature.is_malformed());
    let generic = broken.generic_type().unwrap();
    assert!(matches!(&generic, GenericType::NonGeneric(raw) if raw.name() == "java.util.List"));
}

#[test]
fn inner_types_see_outer_type_variables() {
    let pool = pool();
    let cursor = pool.describe("foo.Box$Cursor").unwrap().resolve().unwrap();

    assert!(cursor.is_member_class().unwrap());
    assert_eq!(cursor.simple_name().unwrap(), "Cursor");
    assert_eq!(
        cursor.declaring_type().unwrap().unwrap().name(),
        "foo.Box"
    );

    let current = field(&cursor, "current").generic_type().unwrap();
    match current {
        GenericType::TypeVariable(variable) => {
            assert_eq!(variable.symbol(), "T");
            assert_eq!(variable.source().to_string(), "foo.Box");
        }
        other => panic!("unexpected type {other}"),
    }

    let boxed = pool.describe("foo.Box").unwrap().resolve().unwrap();
    let nested: Vec<_> = boxed
        .declared_types()
        .unwrap()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(nested, ["foo.Box$Cursor", "foo.Box$Loose"]);
}

#[test]
fn static_nested_types_do_not_see_outer_type_variables() {
    let pool = pool();
    let loose = pool.describe("foo.Box$Loose").unwrap().resolve().unwrap();

    assert!(loose.modifiers().unwrap().is_static());
    assert!(matches!(
        field(&loose, "current").generic_type(),
        Err(Error::IllegalState(_))
    ));
}
