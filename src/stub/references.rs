//! Class names mentioned by a stub's retained surface

use std::collections::BTreeSet;

use crate::classfile::descriptor::{FieldType, MethodDescriptor};
use crate::classfile::signature::{referenced_classes, SignatureKind};
use crate::model::{Annotation, AnnotationValue, ClassStub, Retained, TypeAnnotation};

/// Every internal class name reachable from the surface of `class`: supertypes,
/// descriptors, signatures, thrown types, annotation types and annotation values.
///
/// Invalid descriptors or signatures contribute nothing; front ends reject
/// them before a stub is built.
pub fn referenced_types(class: &ClassStub) -> BTreeSet<String> {
    let mut names = Collector::default();

    names.extend(class.super_name.iter().cloned());
    names.extend(class.interfaces.iter().cloned());
    names.signature(SignatureKind::Class, class.signature.as_deref());
    names.annotations(&class.annotations);
    names.type_annotations(&class.type_annotations);

    for field in &class.fields {
        names.field_descriptor(&field.descriptor);
        names.signature(SignatureKind::Field, field.signature.as_deref());
        names.annotations(&field.annotations);
        names.type_annotations(&field.type_annotations);
    }

    for method in &class.methods {
        if let Ok(descriptor) = MethodDescriptor::parse(&method.descriptor) {
            names.extend(descriptor.class_names().map(str::to_string));
        }
        names.signature(SignatureKind::Method, method.signature.as_deref());
        names.extend(method.exceptions.iter().cloned());
        names.annotations(&method.annotations);
        names.type_annotations(&method.type_annotations);
        for parameter in method.parameter_annotations.iter() {
            for annotation in parameter {
                names.annotation(annotation);
            }
        }
        if let Some(default) = &method.annotation_default {
            names.value(default);
        }
    }

    names.0
}

#[derive(Default)]
struct Collector(BTreeSet<String>);

impl Collector {
    fn extend(&mut self, names: impl IntoIterator<Item = String>) {
        self.0.extend(names);
    }

    fn field_descriptor(&mut self, descriptor: &str) {
        if let Some(name) = FieldType::parse(descriptor).ok().as_ref().and_then(FieldType::class_name) {
            self.0.insert(name.to_string());
        }
    }

    fn signature(&mut self, kind: SignatureKind, signature: Option<&str>) {
        if let Some(signature) = signature {
            self.extend(referenced_classes(kind, signature).unwrap_or_default());
        }
    }

    fn annotations(&mut self, annotations: &Retained<Annotation>) {
        for annotation in annotations.iter() {
            self.annotation(annotation);
        }
    }

    fn type_annotations(&mut self, annotations: &Retained<TypeAnnotation>) {
        for type_annotation in annotations.iter() {
            self.annotation(&type_annotation.annotation);
        }
    }

    fn annotation(&mut self, annotation: &Annotation) {
        self.field_descriptor(&annotation.type_descriptor);
        for (_, value) in &annotation.values {
            self.value(value);
        }
    }

    fn value(&mut self, value: &AnnotationValue) {
        match value {
            // `V` for void.class is not a field descriptor and contributes nothing
            AnnotationValue::Class(descriptor) => self.field_descriptor(descriptor),
            AnnotationValue::Enum { type_descriptor, .. } => self.field_descriptor(type_descriptor),
            AnnotationValue::Annotation(annotation) => self.annotation(annotation),
            AnnotationValue::Array(values) => values.iter().for_each(|value| self.value(value)),
            _ => {}
        }
    }
}
