//! Front end over compiler semantic elements
//!
//! Lowers a [`TypeElement`] into the same [`ClassModel`] the bytecode front end
//! reads from a compiled class, applying the compiler's own translation rules:
//! implicit flags, erased descriptors, synthesized constructor parameters,
//! generic signatures and retention-driven annotation placement.

use std::collections::BTreeSet;

use crate::classfile::defs::{
    major_versions, CONSTRUCTOR_METHOD_NAME, OBJECT_CLASS_NAME, STATIC_INITIALIZER_METHOD_NAME,
};
use crate::classfile::descriptor::{validate_internal_name, validate_member_name, FieldType, MethodDescriptor};
use crate::classfile::flag::{access_flags, has};
use crate::classfile::signature::{self, SignatureKind};
use crate::common::config::Config;
use crate::common::consts::ANNOTATION_MAX_DEPTH;
use crate::common::error::{Error, Result};
use crate::model::{
    Annotation, AnnotationValue, ClassModel, ClassStub, ConstantValue, EnclosingMethod, FieldStub, InnerClassRef,
    MethodStub, ParameterStub, Retained, TypeAnnotation,
};
use crate::stub::references::referenced_types;

use super::context::{ResolutionContext, Retention, TypeSymbol};
use super::element::{
    internal_name, AnnotationMirror, ElementKind, ElementValue, ExecutableElement, ExecutableKind, Modifier,
    NestingKind, TypeAnnotationMirror, TypeElement, TypeMirror, TypeParameterElement, VariableElement, WildcardBound,
};
use super::StubSource;

const DEPRECATED_TYPE: &str = "java/lang/Deprecated";

/// Builds models from semantic elements, resolving references through a
/// [`ResolutionContext`]
pub struct SemanticFrontEnd<'a> {
    context: &'a ResolutionContext,
    config: &'a Config,
}

impl<'a> SemanticFrontEnd<'a> {
    pub fn new(context: &'a ResolutionContext, config: &'a Config) -> Self {
        Self { context, config }
    }
}

impl StubSource for SemanticFrontEnd<'_> {
    type Input = TypeElement;

    fn read_model(&self, element: &TypeElement) -> Result<ClassModel> {
        let lowering = Lowering { context: self.context, config: self.config, element, name: element.internal_name() };
        lowering.lower()
    }
}

/// `InnerClasses` flags of a nested type
pub fn inner_class_flags(element: &TypeElement) -> u16 {
    let mut flags = 0;
    for modifier in &element.modifiers {
        flags |= match modifier {
            Modifier::Public => access_flags::ACC_PUBLIC,
            Modifier::Protected => access_flags::ACC_PROTECTED,
            Modifier::Private => access_flags::ACC_PRIVATE,
            Modifier::Static => access_flags::ACC_STATIC,
            Modifier::Final => access_flags::ACC_FINAL,
            Modifier::Abstract => access_flags::ACC_ABSTRACT,
            _ => 0,
        };
    }
    let member = element.nesting == NestingKind::Member;
    flags |= match element.kind {
        ElementKind::Class => 0,
        ElementKind::Enum if member => access_flags::ACC_ENUM | access_flags::ACC_STATIC,
        ElementKind::Enum => access_flags::ACC_ENUM,
        ElementKind::Interface if member => {
            access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT | access_flags::ACC_STATIC
        }
        ElementKind::Interface => access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT,
        ElementKind::Annotation if member => {
            access_flags::ACC_ANNOTATION
                | access_flags::ACC_INTERFACE
                | access_flags::ACC_ABSTRACT
                | access_flags::ACC_STATIC
        }
        ElementKind::Annotation => {
            access_flags::ACC_ANNOTATION | access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT
        }
    };
    flags
}

/// Class-level flags: the class file has no private, protected or static
/// class, so nested types widen to public or package access
fn class_flags(element: &TypeElement) -> u16 {
    let mut flags = 0;
    for modifier in &element.modifiers {
        flags |= match modifier {
            Modifier::Public | Modifier::Protected => access_flags::ACC_PUBLIC,
            Modifier::Final => access_flags::ACC_FINAL,
            Modifier::Abstract => access_flags::ACC_ABSTRACT,
            _ => 0,
        };
    }
    flags
        | match element.kind {
            ElementKind::Class => access_flags::ACC_SUPER,
            ElementKind::Enum => access_flags::ACC_SUPER | access_flags::ACC_ENUM,
            ElementKind::Interface => access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT,
            ElementKind::Annotation => {
                access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT | access_flags::ACC_ANNOTATION
            }
        }
}

/// Type parameters visible at one point, innermost scope first
struct Scope<'s> {
    layers: [&'s [TypeParameterElement]; 3],
}

impl<'s> Scope<'s> {
    fn lookup(&self, name: &str) -> Option<&'s TypeParameterElement> {
        self.layers.iter().flat_map(|layer| layer.iter()).find(|parameter| parameter.name == name)
    }
}

struct Lowering<'a> {
    context: &'a ResolutionContext,
    config: &'a Config,
    element: &'a TypeElement,
    name: String,
}

impl<'a> Lowering<'a> {
    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::malformed(&self.name, message)
    }

    fn class_scope(&self) -> Scope<'a> {
        Scope { layers: [&[], &self.element.type_parameters, &self.element.outer_type_parameters] }
    }

    fn method_scope(&self, method: &'a ExecutableElement) -> Scope<'a> {
        Scope {
            layers: [&method.type_parameters, &self.element.type_parameters, &self.element.outer_type_parameters],
        }
    }

    fn is_member_class(&self) -> bool {
        self.element.nesting == NestingKind::Member
    }

    /// An inner class: a member class whose instances carry an outer instance
    fn is_inner_class(&self) -> bool {
        self.is_member_class() && self.element.kind == ElementKind::Class && !self.element.has(Modifier::Static)
    }

    fn lower(&self) -> Result<ClassModel> {
        validate_internal_name(&self.name).map_err(|err| Error::from_class_file(&self.name, err))?;
        match self.element.nesting {
            NestingKind::Local | NestingKind::Anonymous => return self.local_model(),
            NestingKind::TopLevel | NestingKind::Member => {}
        }

        let element = self.element;
        let scope = self.class_scope();
        let mut class = ClassStub::new(
            self.name.clone(),
            self.config.target_major_version,
            self.config.target_minor_version,
            class_flags(element),
        );

        class.super_name = match &element.superclass {
            Some(superclass) => Some(self.class_name(superclass, &scope)?),
            None if element.kind.is_interface() => Some(OBJECT_CLASS_NAME.to_string()),
            None => None,
        };
        for interface in &element.interfaces {
            class.interfaces.push(self.class_name(interface, &scope)?);
        }
        class.signature = self.class_signature()?;
        class.annotations = self.annotations(&element.annotations)?;
        class.type_annotations = self.type_annotations(&element.type_annotations)?;
        class.deprecated = element.deprecated || mentions_deprecated(&class.annotations);

        for field in &element.fields {
            class.fields.push(self.field(field)?);
        }
        for method in &element.methods {
            class.methods.push(self.method(method)?);
        }

        class.inner_classes = self.inner_classes(&class)?;
        Ok(ClassModel::new(class))
    }

    /// Local and anonymous classes only need enough shape to be recognized
    /// and dropped
    fn local_model(&self) -> Result<ClassModel> {
        let element = self.element;
        let owner = element
            .enclosing_type
            .as_deref()
            .map(internal_name)
            .ok_or_else(|| self.malformed("local or anonymous class without an enclosing type"))?;
        let mut class = ClassStub::new(
            self.name.clone(),
            self.config.target_major_version,
            self.config.target_minor_version,
            class_flags(element),
        );
        if element.nesting == NestingKind::Anonymous {
            class.inner_classes.push(InnerClassRef {
                name: self.name.clone(),
                outer_name: None,
                inner_name: None,
                access_flags: 0,
            });
        }
        Ok(ClassModel { class, enclosing_method: Some(EnclosingMethod { owner, method: None }) })
    }

    fn inner_classes(&self, class: &ClassStub) -> Result<Vec<InnerClassRef>> {
        let element = self.element;
        let mut rows: Vec<InnerClassRef> = Vec::new();
        let mut seen = BTreeSet::new();
        let mut push = |row: InnerClassRef, rows: &mut Vec<InnerClassRef>| {
            if seen.insert(row.name.clone()) {
                rows.push(row);
            }
        };

        if self.is_member_class() {
            let outer = element
                .enclosing_type
                .as_deref()
                .map(internal_name)
                .ok_or_else(|| self.malformed("member class without an enclosing type"))?;
            push(
                InnerClassRef {
                    name: self.name.clone(),
                    outer_name: Some(outer),
                    inner_name: element.simple_name.clone(),
                    access_flags: inner_class_flags(element),
                },
                &mut rows,
            );
            for symbol in self.context.enclosing_chain(&self.name) {
                if let Some(row) = symbol_row(symbol) {
                    push(row, &mut rows);
                }
            }
        }

        for member in &element.member_types {
            push(
                InnerClassRef {
                    name: member.internal_name(),
                    outer_name: Some(self.name.clone()),
                    inner_name: member.simple_name.clone(),
                    access_flags: inner_class_flags(member),
                },
                &mut rows,
            );
        }

        for referenced in referenced_types(class) {
            let Some(symbol) = self.context.get(&referenced) else {
                continue;
            };
            let chain = std::iter::once(symbol).chain(self.context.enclosing_chain(&referenced));
            for symbol in chain {
                if let Some(row) = symbol_row(symbol) {
                    push(row, &mut rows);
                }
            }
        }

        Ok(rows)
    }

    fn field(&self, field: &'a VariableElement) -> Result<FieldStub> {
        validate_member_name(&field.name, false).map_err(|err| Error::from_class_file(&self.name, err))?;
        let scope = self.class_scope();
        let descriptor = self.erasure(&field.ty, &scope)?;

        let mut stub = FieldStub::new(self.field_flags(field), field.name.as_str(), descriptor.as_str());
        if is_generic(&field.ty) {
            let mut signature = String::new();
            self.type_signature(&field.ty, &mut signature)?;
            stub.signature = Some(self.checked_signature(SignatureKind::Field, signature)?);
        }
        if let Some(value) = &field.constant_value {
            stub.constant_value = Some(self.constant_value(field, &descriptor, value)?);
        }
        stub.annotations = self.annotations(&field.annotations)?;
        stub.type_annotations = self.type_annotations(&field.type_annotations)?;
        stub.deprecated = field.deprecated || mentions_deprecated(&stub.annotations);
        Ok(stub)
    }

    fn field_flags(&self, field: &VariableElement) -> u16 {
        let mut flags = 0;
        for modifier in &field.modifiers {
            flags |= match modifier {
                Modifier::Public => access_flags::ACC_PUBLIC,
                Modifier::Protected => access_flags::ACC_PROTECTED,
                Modifier::Private => access_flags::ACC_PRIVATE,
                Modifier::Static => access_flags::ACC_STATIC,
                Modifier::Final => access_flags::ACC_FINAL,
                Modifier::Transient => access_flags::ACC_TRANSIENT,
                Modifier::Volatile => access_flags::ACC_VOLATILE,
                _ => 0,
            };
        }
        if self.element.kind.is_interface() {
            flags |= access_flags::ACC_PUBLIC | access_flags::ACC_STATIC | access_flags::ACC_FINAL;
        }
        if field.enum_constant {
            flags |= access_flags::ACC_PUBLIC | access_flags::ACC_STATIC | access_flags::ACC_FINAL | access_flags::ACC_ENUM;
        }
        flags
    }

    /// Narrow the compile-time constant to the pool constant its descriptor
    /// calls for
    fn constant_value(&self, field: &VariableElement, descriptor: &str, value: &ElementValue) -> Result<ConstantValue> {
        let constant = match (descriptor, value) {
            ("I", ElementValue::Int(v)) => ConstantValue::Int(*v),
            ("S", ElementValue::Short(v)) => ConstantValue::Int(i32::from(*v)),
            ("B", ElementValue::Byte(v)) => ConstantValue::Int(i32::from(*v)),
            ("Z", ElementValue::Boolean(v)) => ConstantValue::Int(i32::from(*v)),
            ("C", ElementValue::Char(v)) => ConstantValue::Int(i32::from(self.utf16_unit(*v)?)),
            ("J", ElementValue::Long(v)) => ConstantValue::Long(*v),
            ("F", ElementValue::Float(v)) => ConstantValue::Float(*v),
            ("D", ElementValue::Double(v)) => ConstantValue::Double(*v),
            ("Ljava/lang/String;", ElementValue::String(v)) => ConstantValue::String(v.clone()),
            _ => {
                return Err(self.malformed(format!(
                    "constant value of field {} does not fit its type {}",
                    field.name, descriptor
                )))
            }
        };
        Ok(constant)
    }

    fn utf16_unit(&self, c: char) -> Result<u16> {
        u16::try_from(u32::from(c)).map_err(|_| self.malformed(format!("char constant {:?} is outside the BMP", c)))
    }

    fn method(&self, method: &'a ExecutableElement) -> Result<MethodStub> {
        let name = match method.kind {
            ExecutableKind::Constructor => CONSTRUCTOR_METHOD_NAME,
            ExecutableKind::StaticInit => STATIC_INITIALIZER_METHOD_NAME,
            ExecutableKind::Method => method.name.as_str(),
        };
        validate_member_name(name, true).map_err(|err| Error::from_class_file(&self.name, err))?;
        let scope = self.method_scope(method);

        let mut descriptor = String::from("(");
        for implicit in self.implicit_parameters(method) {
            descriptor.push_str(&implicit.0);
        }
        for parameter in &method.parameters {
            descriptor.push_str(&self.erasure(&parameter.ty, &scope)?);
        }
        descriptor.push(')');
        match method.kind {
            ExecutableKind::Method => descriptor.push_str(&self.erasure(&method.return_type, &scope)?),
            ExecutableKind::Constructor | ExecutableKind::StaticInit => descriptor.push('V'),
        }
        MethodDescriptor::parse(&descriptor).map_err(|err| Error::from_class_file(&self.name, err))?;

        let mut stub = MethodStub::new(self.method_flags(method), name, descriptor);
        stub.signature = self.method_signature(method)?;

        for thrown in &method.thrown {
            let erased = self.erasure(thrown, &scope)?;
            match FieldType::parse(&erased) {
                Ok(FieldType::Object(class)) => stub.exceptions.push(class),
                _ => return Err(self.malformed(format!("{} throws non-class type {}", name, erased))),
            }
        }

        if self.config.emit_parameter_names {
            stub.parameters = self
                .implicit_parameters(method)
                .into_iter()
                .map(|(_, parameter)| parameter)
                .chain(method.parameters.iter().map(|parameter| ParameterStub {
                    access_flags: if parameter.is_final { access_flags::ACC_FINAL } else { 0 },
                    name: Some(parameter.name.clone()),
                }))
                .collect();
        }

        stub.annotations = self.annotations(&method.annotations)?;
        stub.type_annotations = self.type_annotations(&method.type_annotations)?;
        stub.deprecated = method.deprecated || mentions_deprecated(&stub.annotations);
        stub.parameter_annotations = self.parameter_annotations(method)?;
        if let Some(default) = &method.default_value {
            stub.annotation_default = Some(self.element_value(default, 0)?);
        }
        Ok(stub)
    }

    /// Parameters the compiler adds in front of the declared ones, with their
    /// descriptor and `MethodParameters` entry
    fn implicit_parameters(&self, method: &ExecutableElement) -> Vec<(String, ParameterStub)> {
        if method.kind != ExecutableKind::Constructor {
            return Vec::new();
        }
        if self.is_inner_class() {
            if let Some(outer) = &self.element.enclosing_type {
                return vec![(
                    format!("L{};", internal_name(outer)),
                    ParameterStub {
                        access_flags: access_flags::ACC_FINAL | access_flags::ACC_MANDATED,
                        name: Some("this$0".to_string()),
                    },
                )];
            }
        }
        if self.element.kind == ElementKind::Enum {
            return vec![
                (
                    "Ljava/lang/String;".to_string(),
                    ParameterStub { access_flags: access_flags::ACC_SYNTHETIC, name: Some("$enum$name".to_string()) },
                ),
                (
                    "I".to_string(),
                    ParameterStub {
                        access_flags: access_flags::ACC_SYNTHETIC,
                        name: Some("$enum$ordinal".to_string()),
                    },
                ),
            ];
        }
        Vec::new()
    }

    fn method_flags(&self, method: &ExecutableElement) -> u16 {
        if method.kind == ExecutableKind::StaticInit {
            return access_flags::ACC_STATIC;
        }
        let mut flags = 0;
        for modifier in &method.modifiers {
            flags |= match modifier {
                Modifier::Public => access_flags::ACC_PUBLIC,
                Modifier::Protected => access_flags::ACC_PROTECTED,
                Modifier::Private => access_flags::ACC_PRIVATE,
                Modifier::Static => access_flags::ACC_STATIC,
                Modifier::Final => access_flags::ACC_FINAL,
                Modifier::Synchronized => access_flags::ACC_SYNCHRONIZED,
                Modifier::Native => access_flags::ACC_NATIVE,
                Modifier::Abstract => access_flags::ACC_ABSTRACT,
                // ACC_STRICT is meaningless from Java 17 on
                Modifier::Strictfp if self.config.target_major_version < major_versions::JAVA_17 => {
                    access_flags::ACC_STRICT
                }
                _ => 0,
            };
        }
        if self.element.kind.is_interface() && method.kind == ExecutableKind::Method {
            if !has(flags, access_flags::ACC_PRIVATE) {
                flags |= access_flags::ACC_PUBLIC;
            }
            let has_body = method.modifiers.contains(&Modifier::Default)
                || has(flags, access_flags::ACC_STATIC)
                || has(flags, access_flags::ACC_PRIVATE);
            if !has_body {
                flags |= access_flags::ACC_ABSTRACT;
            }
        }
        if method.varargs {
            flags |= access_flags::ACC_VARARGS;
        }
        flags
    }

    fn parameter_annotations(&self, method: &ExecutableElement) -> Result<Retained<Vec<Annotation>>> {
        let mut visible = Vec::with_capacity(method.parameters.len());
        let mut invisible = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            let retained = self.annotations(&parameter.annotations)?;
            visible.push(retained.visible);
            invisible.push(retained.invisible);
        }
        let keep = |lists: Vec<Vec<Annotation>>| {
            if lists.iter().any(|list| !list.is_empty()) {
                lists
            } else {
                Vec::new()
            }
        };
        Ok(Retained { visible: keep(visible), invisible: keep(invisible) })
    }

    // -- annotations --

    /// Internal name and retention of an annotation type
    fn annotation_type(&self, ty: &TypeMirror) -> Result<(String, Retention)> {
        let name = match ty {
            TypeMirror::Declared { name, .. } => internal_name(name),
            TypeMirror::Error(written) => self.resolve_error(written)?,
            other => return Err(self.malformed(format!("{:?} is not an annotation type", other))),
        };
        let retention = match self.context.retention(&name) {
            Some(retention) => retention,
            None => {
                log::debug!("{}: retention of {} unknown, assuming CLASS", self.name, name);
                Retention::Class
            }
        };
        Ok((name, retention))
    }

    fn annotations(&self, mirrors: &[AnnotationMirror]) -> Result<Retained<Annotation>> {
        let mut retained = Retained::default();
        for mirror in mirrors {
            let (name, retention) = self.annotation_type(&mirror.annotation_type)?;
            let annotation = self.annotation(name, mirror, 0)?;
            match retention {
                Retention::Source => {}
                Retention::Class => retained.invisible.push(annotation),
                Retention::Runtime => retained.visible.push(annotation),
            }
        }
        Ok(retained)
    }

    fn type_annotations(&self, mirrors: &[TypeAnnotationMirror]) -> Result<Retained<TypeAnnotation>> {
        let mut retained = Retained::default();
        for mirror in mirrors {
            let (name, retention) = self.annotation_type(&mirror.annotation.annotation_type)?;
            let type_annotation = TypeAnnotation {
                target: mirror.target,
                path: mirror.path.clone(),
                annotation: self.annotation(name, &mirror.annotation, 0)?,
            };
            match retention {
                Retention::Source => {}
                Retention::Class => retained.invisible.push(type_annotation),
                Retention::Runtime => retained.visible.push(type_annotation),
            }
        }
        Ok(retained)
    }

    fn annotation(&self, name: String, mirror: &AnnotationMirror, depth: usize) -> Result<Annotation> {
        let mut annotation = Annotation::new(format!("L{};", name));
        for (key, value) in &mirror.values {
            annotation.values.push((key.clone(), self.element_value(value, depth + 1)?));
        }
        Ok(annotation)
    }

    fn element_value(&self, value: &ElementValue, depth: usize) -> Result<AnnotationValue> {
        if depth > ANNOTATION_MAX_DEPTH {
            return Err(self.malformed(format!("annotation values nested deeper than {}", ANNOTATION_MAX_DEPTH)));
        }
        let converted = match value {
            ElementValue::Boolean(v) => AnnotationValue::Boolean(*v),
            ElementValue::Byte(v) => AnnotationValue::Byte(*v),
            ElementValue::Char(v) => AnnotationValue::Char(self.utf16_unit(*v)?),
            ElementValue::Short(v) => AnnotationValue::Short(*v),
            ElementValue::Int(v) => AnnotationValue::Int(*v),
            ElementValue::Long(v) => AnnotationValue::Long(*v),
            ElementValue::Float(v) => AnnotationValue::Float(*v),
            ElementValue::Double(v) => AnnotationValue::Double(*v),
            ElementValue::String(v) => AnnotationValue::String(v.clone()),
            ElementValue::Class(ty) => AnnotationValue::Class(self.erasure(ty, &self.class_scope())?),
            ElementValue::Enum { enum_type, name } => AnnotationValue::Enum {
                type_descriptor: self.erasure(enum_type, &self.class_scope())?,
                name: name.clone(),
            },
            ElementValue::Annotation(mirror) => {
                let (name, _) = self.annotation_type(&mirror.annotation_type)?;
                AnnotationValue::Annotation(self.annotation(name, mirror, depth)?)
            }
            ElementValue::Array(values) => AnnotationValue::Array(
                values.iter().map(|v| self.element_value(v, depth + 1)).collect::<Result<Vec<_>>>()?,
            ),
        };
        Ok(converted)
    }

    // -- types --

    /// Best-effort name for a type the compiler could not resolve
    fn resolve_error(&self, written: &str) -> Result<String> {
        if !self.config.allow_missing_dependencies {
            return Err(Error::unresolved(&self.name, written));
        }
        let guess = self.guess_missing(written);
        log::warn!("{}: cannot resolve {}, assuming {}", self.name, written, guess);
        Ok(guess)
    }

    fn guess_missing(&self, written: &str) -> String {
        let imports = &self.element.imports;
        let (head, rest) = match written.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (written, None),
        };

        let single = imports.iter().find(|import| {
            !import.ends_with(".*") && import.rsplit('.').next() == Some(head)
        });
        if let Some(import) = single {
            let base = internal_name(import);
            return match rest {
                Some(rest) => format!("{}${}", base, rest.replace('.', "$")),
                None => base,
            };
        }

        if rest.is_some() {
            return internal_name(written);
        }

        for import in imports {
            if let Some(package) = import.strip_suffix(".*") {
                let candidate = format!("{}/{}", internal_name(package), written);
                if self.context.contains(&candidate) {
                    return candidate;
                }
            }
        }

        match self.element.package() {
            "" => written.to_string(),
            package => format!("{}/{}", internal_name(package), written),
        }
    }

    fn class_name(&self, ty: &TypeMirror, scope: &Scope<'_>) -> Result<String> {
        match FieldType::parse(&self.erasure(ty, scope)?) {
            Ok(FieldType::Object(name)) => Ok(name),
            _ => Err(self.malformed(format!("{:?} is not a class or interface type", ty))),
        }
    }

    /// Erased field descriptor (`V` for void)
    fn erasure(&self, ty: &TypeMirror, scope: &Scope<'_>) -> Result<String> {
        self.erase(ty, scope, &mut Vec::new())
    }

    fn erase(&self, ty: &TypeMirror, scope: &Scope<'_>, visiting: &mut Vec<String>) -> Result<String> {
        let erased = match ty {
            TypeMirror::Primitive(kind) => kind.descriptor().to_string(),
            TypeMirror::Void => "V".to_string(),
            TypeMirror::Declared { name, .. } => format!("L{};", internal_name(name)),
            TypeMirror::Array(component) => format!("[{}", self.erase(component, scope, visiting)?),
            TypeMirror::TypeVar(variable) => {
                if visiting.iter().any(|seen| seen == variable) {
                    return Err(self.malformed(format!("cyclic bound on type variable {}", variable)));
                }
                let parameter = scope
                    .lookup(variable)
                    .ok_or_else(|| self.malformed(format!("type variable {} is not in scope", variable)))?;
                match parameter.bounds.first() {
                    None => format!("L{};", OBJECT_CLASS_NAME),
                    Some(bound) => {
                        visiting.push(variable.clone());
                        let erased = self.erase(bound, scope, visiting)?;
                        visiting.pop();
                        erased
                    }
                }
            }
            TypeMirror::Wildcard(WildcardBound::Extends(bound)) => self.erase(bound, scope, visiting)?,
            TypeMirror::Wildcard(_) => format!("L{};", OBJECT_CLASS_NAME),
            TypeMirror::Error(written) => format!("L{};", self.resolve_error(written)?),
        };
        Ok(erased)
    }

    fn is_interface(&self, ty: &TypeMirror) -> bool {
        match ty {
            TypeMirror::Declared { interface, .. } => *interface,
            TypeMirror::Error(written) if self.config.allow_missing_dependencies => {
                let guess = self.guess_missing(written);
                self.context.get(&guess).is_some_and(|symbol| symbol.kind.is_interface())
            }
            _ => false,
        }
    }

    fn checked_signature(&self, kind: SignatureKind, value: String) -> Result<String> {
        signature::validate(kind, &value).map_err(|err| Error::from_class_file(&self.name, err))?;
        Ok(value)
    }

    fn class_signature(&self) -> Result<Option<String>> {
        let element = self.element;
        let generic = !element.type_parameters.is_empty()
            || element.superclass.iter().chain(element.interfaces.iter()).any(is_generic);
        if !generic {
            return Ok(None);
        }
        let mut out = String::new();
        self.type_parameters(&element.type_parameters, &mut out)?;
        match &element.superclass {
            Some(superclass) => self.type_signature(superclass, &mut out)?,
            None => out.push_str("Ljava/lang/Object;"),
        }
        for interface in &element.interfaces {
            self.type_signature(interface, &mut out)?;
        }
        self.checked_signature(SignatureKind::Class, out).map(Some)
    }

    fn method_signature(&self, method: &ExecutableElement) -> Result<Option<String>> {
        let generic_throws = method.thrown.iter().any(|ty| matches!(ty, TypeMirror::TypeVar(_)));
        let generic = !method.type_parameters.is_empty()
            || generic_throws
            || is_generic(&method.return_type)
            || method.parameters.iter().any(|parameter| is_generic(&parameter.ty));
        if !generic {
            return Ok(None);
        }
        let mut out = String::new();
        self.type_parameters(&method.type_parameters, &mut out)?;
        out.push('(');
        for parameter in &method.parameters {
            self.type_signature(&parameter.ty, &mut out)?;
        }
        out.push(')');
        match method.kind {
            ExecutableKind::Method => self.type_signature(&method.return_type, &mut out)?,
            ExecutableKind::Constructor | ExecutableKind::StaticInit => out.push('V'),
        }
        if generic_throws {
            for thrown in &method.thrown {
                out.push('^');
                self.type_signature(thrown, &mut out)?;
            }
        }
        self.checked_signature(SignatureKind::Method, out).map(Some)
    }

    fn type_parameters(&self, parameters: &[TypeParameterElement], out: &mut String) -> Result<()> {
        if parameters.is_empty() {
            return Ok(());
        }
        out.push('<');
        for parameter in parameters {
            out.push_str(&parameter.name);
            match parameter.bounds.split_first() {
                None => out.push_str(":Ljava/lang/Object;"),
                Some((first, rest)) => {
                    // an interface first bound leaves the class bound empty
                    out.push_str(if self.is_interface(first) { "::" } else { ":" });
                    self.type_signature(first, out)?;
                    for bound in rest {
                        out.push(':');
                        self.type_signature(bound, out)?;
                    }
                }
            }
        }
        out.push('>');
        Ok(())
    }

    fn type_signature(&self, ty: &TypeMirror, out: &mut String) -> Result<()> {
        match ty {
            TypeMirror::Primitive(kind) => out.push(kind.descriptor()),
            TypeMirror::Void => out.push('V'),
            TypeMirror::Declared { .. } => {
                self.class_type_signature(ty, out)?;
                out.push(';');
            }
            TypeMirror::Array(component) => {
                out.push('[');
                self.type_signature(component, out)?;
            }
            TypeMirror::TypeVar(name) => {
                out.push('T');
                out.push_str(name);
                out.push(';');
            }
            TypeMirror::Wildcard(WildcardBound::Unbounded) => out.push('*'),
            TypeMirror::Wildcard(WildcardBound::Extends(bound)) => {
                out.push('+');
                self.type_signature(bound, out)?;
            }
            TypeMirror::Wildcard(WildcardBound::Super(bound)) => {
                out.push('-');
                self.type_signature(bound, out)?;
            }
            TypeMirror::Error(written) => {
                out.push('L');
                out.push_str(&self.resolve_error(written)?);
                out.push(';');
            }
        }
        Ok(())
    }

    /// `Lp/Outer<TT;>.Inner<TU;>` without the closing `;`
    fn class_type_signature(&self, ty: &TypeMirror, out: &mut String) -> Result<()> {
        let TypeMirror::Declared { name, args, outer, .. } = ty else {
            return Err(self.malformed(format!("{:?} is not a class type", ty)));
        };
        let name = internal_name(name);
        let generic_outer = outer.as_deref().filter(|outer_type| is_generic(outer_type));
        match generic_outer {
            Some(outer_type) => {
                self.class_type_signature(outer_type, out)?;
                out.push('.');
                let prefix = match outer_type {
                    TypeMirror::Declared { name: outer_name, .. } => format!("{}$", internal_name(outer_name)),
                    _ => String::new(),
                };
                let simple = match name.strip_prefix(prefix.as_str()) {
                    Some(simple) if !prefix.is_empty() => simple,
                    _ => name.rsplit('$').next().unwrap_or(name.as_str()),
                };
                out.push_str(simple);
            }
            None => {
                out.push('L');
                out.push_str(&name);
            }
        }
        if !args.is_empty() {
            out.push('<');
            for arg in args {
                self.type_signature(arg, out)?;
            }
            out.push('>');
        }
        Ok(())
    }
}

/// Whether writing `ty` needs a generic signature
fn is_generic(ty: &TypeMirror) -> bool {
    match ty {
        TypeMirror::Declared { args, outer, .. } => !args.is_empty() || outer.as_deref().is_some_and(is_generic),
        TypeMirror::Array(component) => is_generic(component),
        TypeMirror::TypeVar(_) | TypeMirror::Wildcard(_) => true,
        TypeMirror::Primitive(_) | TypeMirror::Void | TypeMirror::Error(_) => false,
    }
}

fn mentions_deprecated(annotations: &Retained<Annotation>) -> bool {
    let descriptor = format!("L{};", DEPRECATED_TYPE);
    annotations.iter().any(|annotation| annotation.type_descriptor == descriptor)
}

fn symbol_row(symbol: &TypeSymbol) -> Option<InnerClassRef> {
    let outer = symbol.outer.clone()?;
    Some(InnerClassRef {
        name: symbol.name.clone(),
        outer_name: Some(outer),
        inner_name: symbol.simple_name.clone(),
        access_flags: symbol.inner_access_flags,
    })
}
