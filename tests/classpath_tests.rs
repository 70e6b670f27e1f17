mod common;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use common::ClassBuilder;
use stubjar::classfile::flag::access_flags::*;
use stubjar::frontend::element::{AnnotationMirror, ElementKind, Modifier, TypeElement, TypeMirror, VariableElement};
use stubjar::model::{Annotation, AnnotationValue};
use stubjar::{canonical_class, stub_element, Config, ResolutionContext};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// `dep.Outer` with a public static member `Nested`
fn outer_class() -> Vec<u8> {
    let mut b = ClassBuilder::new("dep/Outer", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
    let rows = b.inner_classes(&[("dep/Outer$Nested", Some("dep/Outer"), Some("Nested"), ACC_PUBLIC | ACC_STATIC)]);
    b.class_attribute(rows);
    b.build()
}

/// `@Retention(RUNTIME) @interface dep.Marker`
fn marker_annotation() -> Vec<u8> {
    let mut b = ClassBuilder::new(
        "dep/Marker",
        Some("java/lang/Object"),
        ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION,
    );
    b.interface("java/lang/annotation/Annotation");
    let retention = Annotation::new("Ljava/lang/annotation/Retention;").with_value(
        "value",
        AnnotationValue::Enum {
            type_descriptor: "Ljava/lang/annotation/RetentionPolicy;".into(),
            name: "RUNTIME".into(),
        },
    );
    let meta = b.annotations(true, &[retention]);
    b.class_attribute(meta);
    b.build()
}

fn classpath_entries() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("dep/Outer.class", outer_class()),
        ("dep/Marker.class", marker_annotation()),
        ("dep/Broken.class", vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0]),
    ]
}

fn write_directory(root: &Path) {
    for (name, bytes) in classpath_entries() {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }
}

fn write_jar(path: &Path) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in classpath_entries() {
        zip.start_file(name, options).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.start_file("dep/readme.txt", options).unwrap();
    zip.write_all(b"not a class").unwrap();
    zip.finish().unwrap();
}

/// `@dep.Marker public class p.Client { public dep.Outer.Nested nested; }`
fn client() -> TypeElement {
    let mut element = TypeElement::new("p.Client", ElementKind::Class, vec![Modifier::Public]);
    element.annotations.push(AnnotationMirror::new(TypeMirror::class("dep.Marker")));
    element
        .fields
        .push(VariableElement::new("nested", vec![Modifier::Public], TypeMirror::class("dep.Outer$Nested")));
    element
}

fn assert_resolved_through_classpath(context: &ResolutionContext) {
    let bytes = stub_element(&client(), context, &Config::default()).unwrap().unwrap();
    let stub = canonical_class(&bytes).unwrap().unwrap();

    assert_eq!(stub.inner_classes.len(), 1);
    let row = &stub.inner_classes[0];
    assert_eq!(row.name, "dep/Outer$Nested");
    assert_eq!(row.outer_name.as_deref(), Some("dep/Outer"));
    assert_eq!(row.inner_name.as_deref(), Some("Nested"));
    assert_eq!(row.access_flags, ACC_PUBLIC | ACC_STATIC);

    assert_eq!(stub.annotations.visible, [Annotation::new("Ldep/Marker;")]);
    assert!(stub.annotations.invisible.is_empty());
}

#[test]
fn directory_classpath_supplies_nesting_and_retention() {
    let dir = tempfile::tempdir().unwrap();
    write_directory(dir.path());

    let context = ResolutionContext::from_classpath(&[dir.path().to_path_buf()]).unwrap();
    let platform = ResolutionContext::with_platform_defaults().len();
    // Outer, its member Nested and Marker; the broken class is skipped
    assert_eq!(context.len(), platform + 3);
    assert!(context.contains("dep/Outer$Nested"));
    assert_resolved_through_classpath(&context);
}

#[test]
fn jar_classpath_given_as_an_argument() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("dep.jar");
    write_jar(&jar);
    let missing = dir.path().join("absent");
    let separator = if cfg!(windows) { ";" } else { ":" };
    let classpath = format!("{}{}{}", jar.display(), separator, missing.display());

    let context = ResolutionContext::from_classpath_arg(Some(&classpath)).unwrap();
    assert_resolved_through_classpath(&context);
}

#[test]
fn without_the_classpath_nesting_and_retention_are_unknown() {
    let context = ResolutionContext::with_platform_defaults();
    let bytes = stub_element(&client(), &context, &Config::default()).unwrap().unwrap();
    let stub = canonical_class(&bytes).unwrap().unwrap();

    assert!(stub.inner_classes.is_empty());
    assert!(stub.annotations.visible.is_empty());
    assert_eq!(stub.annotations.invisible, [Annotation::new("Ldep/Marker;")]);
    assert_eq!(stub.fields[0].descriptor, "Ldep/Outer$Nested;");
}

#[test]
fn unreadable_classpath_archive_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.jar");
    fs::write(&bogus, b"not a zip").unwrap();
    assert!(ResolutionContext::from_classpath(&[bogus]).is_err());
}
