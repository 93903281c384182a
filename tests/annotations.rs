//! Annotation values from class files, loaded into annotation instances.

mod common;

use std::sync::Arc;

use classpool::{prelude::*, Error};
use common::{object, ClassWriter, Element};

fn annotated(internal_name: &str, values: Vec<(&str, Element)>) -> Vec<u8> {
    ClassWriter::new(internal_name)
        .annotation("Lfoo/Retry;", values)
        .build()
}

fn pool() -> PoolRc {
    let locator = SimpleLocator::default()
        .with("java.lang.Object", object())
        .with(
            "java.io.IOException",
            ClassWriter::new("java/io/IOException").build(),
        )
        .with(
            "foo.Level",
            ClassWriter::new("foo/Level")
                .access(0x4031)
                .super_class(Some("java/lang/Enum"))
                .field(0x4019, "LOW", "Lfoo/Level;", None)
                .field(0x4019, "HIGH", "Lfoo/Level;", None)
                .build(),
        )
        .with(
            "foo.Retry",
            ClassWriter::new("foo/Retry")
                .access(0x2601)
                .interface("java/lang/annotation/Annotation")
                .method(0x0401, "attempts", "()I", None)
                .default_value(Element::Int(3))
                .method(0x0401, "on", "()[Ljava/lang/Class;", None)
                .default_value(Element::Array(Vec::new()))
                .method(0x0401, "level", "()Lfoo/Level;", None)
                .default_value(Element::Enum("Lfoo/Level;".into(), "LOW".into()))
                .method(0x0401, "tag", "()Ljava/lang/String;", None)
                .build(),
        )
        .with(
            "foo.Service",
            annotated(
                "foo/Service",
                vec![
                    ("attempts", Element::Int(5)),
                    (
                        "on",
                        Element::Array(vec![Element::Class("Ljava/io/IOException;".into())]),
                    ),
                    ("level", Element::Enum("Lfoo/Level;".into(), "HIGH".into())),
                    ("tag", Element::String("x".into())),
                ],
            ),
        )
        .with(
            "foo.Labels",
            ClassWriter::new("foo/Labels")
                .access(0x2601)
                .interface("java/lang/annotation/Annotation")
                .method(0x0401, "names", "()[Ljava/lang/String;", None)
                .method(0x0401, "origin", "()Lfoo/Origin;", None)
                .build(),
        )
        .with(
            "foo.Labelled",
            ClassWriter::new("foo/Labelled")
                .annotation(
                    "Lfoo/Labels;",
                    vec![
                        (
                            "names",
                            Element::Array(vec![
                                Element::String("a".into()),
                                Element::String("b".into()),
                            ]),
                        ),
                        ("origin", Element::Annotation("Lfoo/Origin;".into(), Vec::new())),
                    ],
                )
                .build(),
        )
        .with(
            "foo.Partial",
            annotated("foo/Partial", vec![("attempts", Element::Int(1))]),
        )
        .with(
            "foo.Stale",
            annotated(
                "foo/Stale",
                vec![
                    ("level", Element::Enum("Lfoo/Level;".into(), "MEDIUM".into())),
                    ("tag", Element::String("y".into())),
                ],
            ),
        )
        .with(
            "foo.Mismatch",
            annotated(
                "foo/Mismatch",
                vec![
                    ("attempts", Element::String("three".into())),
                    ("tag", Element::String("z".into())),
                ],
            ),
        )
        .with(
            "foo.Lost",
            annotated(
                "foo/Lost",
                vec![
                    (
                        "on",
                        Element::Array(vec![Element::Class("Lfoo/Vanished;".into())]),
                    ),
                    ("tag", Element::String("w".into())),
                ],
            ),
        );
    DefaultPool::new(locator.into_rc(), PoolConfig::default())
}

fn load(pool: &PoolRc, name: &str) -> Arc<AnnotationInstance> {
    let description = pool.describe(name).unwrap().resolve().unwrap();
    let annotations = description.declared_annotations().unwrap();
    assert_eq!(annotations.len(), 1);
    annotations[0].load(pool).unwrap()
}

#[test]
fn explicit_values() {
    let pool = pool();
    let service = pool.describe("foo.Service").unwrap().resolve().unwrap();
    let annotation = &service.declared_annotations().unwrap()[0];

    assert_eq!(annotation.type_name(), "foo.Retry");
    assert!(annotation.annotation_type().unwrap().is_annotation().unwrap());
    assert_eq!(annotation.values().len(), 4);

    let instance = annotation.load(&pool).unwrap();
    assert_eq!(
        instance.to_string(),
        "@foo.Retry(attempts=5, on={java.io.IOException.class}, level=foo.Level.HIGH, tag=\"x\")"
    );
    assert_eq!(
        instance.property("attempts").unwrap().as_constant(),
        Some(&ConstantValue::Int(5))
    );
    match instance.property("on").unwrap() {
        LoadedValue::Array { component, values } => {
            assert_eq!(component.name(), "java.lang.Class");
            assert!(matches!(&values[0], LoadedValue::Type(t) if t.name() == "java.io.IOException"));
        }
        other => panic!("unexpected value {other}"),
    }
}

#[test]
fn string_and_class_arrays_need_no_platform_types() {
    let pool = pool();
    assert!(!pool.describe("java.lang.String").unwrap().is_resolved());
    assert!(!pool.describe("java.lang.Class").unwrap().is_resolved());

    let labelled = load(&pool, "foo.Labelled");
    match labelled.property("names").unwrap() {
        LoadedValue::Array { component, values } => {
            assert_eq!(component.name(), "java.lang.String");
            assert!(component.description().is_none());
            assert_eq!(
                values,
                [
                    LoadedValue::Constant(ConstantValue::String("a".into())),
                    LoadedValue::Constant(ConstantValue::String("b".into())),
                ]
            );
        }
        other => panic!("unexpected value {other}"),
    }

    let service = load(&pool, "foo.Service");
    assert_eq!(
        service.property("on").unwrap().to_string(),
        "{java.io.IOException.class}"
    );
}

#[test]
fn defaults_fill_missing_values() {
    let pool = pool();
    let partial = pool.describe("foo.Partial").unwrap().resolve().unwrap();
    let annotation = &partial.declared_annotations().unwrap()[0];

    assert!(matches!(
        annotation.value("level").unwrap(),
        Some(AnnotationValue::Enumeration { constant, .. }) if constant == "LOW"
    ));
    assert!(annotation.value("tag").unwrap().is_none());

    let instance = annotation.load(&pool).unwrap();
    assert_eq!(instance.property("level").unwrap().to_string(), "foo.Level.LOW");
    assert_eq!(instance.property("on").unwrap().to_string(), "{}");
    assert!(matches!(
        instance.property("tag"),
        Err(Error::IncompleteAnnotation { .. })
    ));
}

#[test]
fn loading_errors_name_the_culprit() {
    let pool = pool();

    let stale = load(&pool, "foo.Stale");
    assert!(matches!(
        stale.property("level"),
        Err(Error::EnumConstantNotPresent { constant, .. }) if constant == "MEDIUM"
    ));
    assert!(stale.property("tag").is_ok());

    let mismatch = load(&pool, "foo.Mismatch");
    assert!(matches!(
        mismatch.property("attempts"),
        Err(Error::AnnotationTypeMismatch { property, .. }) if property == "attempts"
    ));

    let labelled = load(&pool, "foo.Labelled");
    assert!(matches!(
        labelled.property("origin"),
        Err(Error::ClassNotFound(name)) if name == "foo.Origin"
    ));

    let lost = load(&pool, "foo.Lost");
    assert!(matches!(
        lost.property("on"),
        Err(Error::ClassNotFound(name)) if name == "foo.Vanished"
    ));
    assert!(matches!(
        lost.property_values(),
        Err(Error::ClassNotFound(_))
    ));
}

#[test]
fn instances_compare_structurally() {
    let pool = pool();
    let first = load(&pool, "foo.Service");
    let second = load(&pool, "foo.Service");
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert!(first.annotation_eq(&*second));

    // Incomplete annotations never compare equal.
    let partial = load(&pool, "foo.Partial");
    assert_ne!(*first, *partial);
    assert_ne!(*partial, *load(&pool, "foo.Partial"));
}
