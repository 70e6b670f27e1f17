//! Front end over compiled class files

use crate::classfile::annotation::{
    read_annotations, read_element_value, read_parameter_annotations, read_type_annotations,
};
use crate::classfile::attribute::AttributeInfo;
use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;
use crate::classfile::defs::attribute_names::*;
use crate::classfile::descriptor::{validate_internal_name, validate_member_name, FieldType, MethodDescriptor};
use crate::classfile::error::{ClassFileError, ClassFileResult};
use crate::classfile::flag::access_flags;
use crate::classfile::member::{FieldInfo, MethodInfo};
use crate::classfile::reader::ClassReader;
use crate::classfile::signature::{self, SignatureKind};
use crate::common::error::{Error, Result};
use crate::model::{
    Annotation, ClassModel, ClassStub, ConstantValue, EnclosingMethod, FieldStub, InnerClassRef, MethodStub,
    ParameterStub, Retained, TypeAnnotation,
};

use super::StubSource;

/// Name used in errors raised before the class name is known
const UNKNOWN_CLASS: &str = "<unknown>";

/// Reads class-file bytes into a [`ClassModel`]
#[derive(Debug, Default, Clone, Copy)]
pub struct BytecodeFrontEnd;

impl BytecodeFrontEnd {
    pub fn new() -> Self {
        Self
    }
}

impl StubSource for BytecodeFrontEnd {
    type Input = [u8];

    fn read_model(&self, bytes: &[u8]) -> Result<ClassModel> {
        let class_file = ClassFile::parse(bytes).map_err(|err| Error::from_class_file(UNKNOWN_CLASS, err))?;
        let name = class_file
            .constant_pool
            .class_name(class_file.this_class)
            .map_err(|err| Error::from_class_file(UNKNOWN_CLASS, err))?
            .to_string();
        Decoder { class_file: &class_file, name }.decode()
    }
}

struct Decoder<'a> {
    class_file: &'a ClassFile,
    name: String,
}

/// Raw attributes with ABI meaning, keyed by name; executable and debug
/// payloads are dropped while collecting.
struct Attributes<'a> {
    entries: Vec<(&'a str, &'a [u8])>,
}

impl<'a> Attributes<'a> {
    fn get(&self, name: &str) -> Option<&'a [u8]> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, info)| *info)
    }

    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<'a> Decoder<'a> {
    fn error(&self, err: ClassFileError) -> Error {
        match err {
            ClassFileError::InvalidTypeAnnotationTarget(target) => Error::unsupported(
                &self.name,
                format!("type annotation target 0x{:02x} outside a method body", target),
            ),
            other => Error::from_class_file(&self.name, other),
        }
    }

    fn check<T>(&self, result: ClassFileResult<T>) -> Result<T> {
        result.map_err(|err| self.error(err))
    }

    fn utf8(&self, index: u16) -> Result<&'a str> {
        self.check(self.class_file.constant_pool.utf8(index))
    }

    fn class_name(&self, index: u16) -> Result<String> {
        let name = self.check(self.class_file.constant_pool.class_name(index))?;
        self.check(validate_internal_name(name))?;
        Ok(name.to_string())
    }

    fn optional_class_name(&self, index: u16) -> Result<Option<String>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    /// Resolve attribute names. Unknown attributes are ignored and
    /// attributes the model cannot represent are refused.
    fn attributes(&self, owner: &str, attributes: &'a [AttributeInfo], known: &[&str]) -> Result<Attributes<'a>> {
        let mut entries = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            let name = self.utf8(attribute.name_index)?;
            if known.contains(&name) {
                entries.push((name, attribute.info.as_slice()));
            } else if SKIPPED.contains(&name) {
                continue;
            } else if UNSUPPORTED.contains(&name) {
                return Err(Error::unsupported(&self.name, format!("{} attribute on {}", name, owner)));
            } else {
                log::debug!("{}: ignoring unknown attribute {} on {}", self.name, name, owner);
            }
        }
        Ok(Attributes { entries })
    }

    /// Decode a payload completely with `f`, rejecting trailing bytes
    fn payload<T>(
        &self,
        name: &str,
        info: &'a [u8],
        f: impl FnOnce(&mut ClassReader<'a>) -> ClassFileResult<T>,
    ) -> Result<T> {
        let mut reader = ClassReader::new(info);
        let value = self.check(f(&mut reader))?;
        self.check(reader.expect_end(name))?;
        Ok(value)
    }

    fn signature(&self, attributes: &Attributes<'a>, kind: SignatureKind) -> Result<Option<String>> {
        let Some(info) = attributes.get(SIGNATURE) else {
            return Ok(None);
        };
        let index = self.payload(SIGNATURE, info, |r| r.read_u2())?;
        let value = self.utf8(index)?;
        self.check(signature::validate(kind, value))?;
        Ok(Some(value.to_string()))
    }

    fn annotations(&self, attributes: &Attributes<'a>) -> Result<Retained<Annotation>> {
        let pool = &self.class_file.constant_pool;
        let mut retained = Retained::default();
        if let Some(info) = attributes.get(RUNTIME_VISIBLE_ANNOTATIONS) {
            retained.visible = self.payload(RUNTIME_VISIBLE_ANNOTATIONS, info, |r| read_annotations(r, pool))?;
        }
        if let Some(info) = attributes.get(RUNTIME_INVISIBLE_ANNOTATIONS) {
            retained.invisible = self.payload(RUNTIME_INVISIBLE_ANNOTATIONS, info, |r| read_annotations(r, pool))?;
        }
        Ok(retained)
    }

    fn type_annotations(&self, attributes: &Attributes<'a>) -> Result<Retained<TypeAnnotation>> {
        let pool = &self.class_file.constant_pool;
        let mut retained = Retained::default();
        if let Some(info) = attributes.get(RUNTIME_VISIBLE_TYPE_ANNOTATIONS) {
            retained.visible =
                self.payload(RUNTIME_VISIBLE_TYPE_ANNOTATIONS, info, |r| read_type_annotations(r, pool))?;
        }
        if let Some(info) = attributes.get(RUNTIME_INVISIBLE_TYPE_ANNOTATIONS) {
            retained.invisible =
                self.payload(RUNTIME_INVISIBLE_TYPE_ANNOTATIONS, info, |r| read_type_annotations(r, pool))?;
        }
        Ok(retained)
    }

    fn decode(self) -> Result<ClassModel> {
        let class_file = self.class_file;
        self.check(validate_internal_name(&self.name))?;

        let mut class = ClassStub::new(
            self.name.clone(),
            class_file.major_version,
            class_file.minor_version,
            class_file.access_flags,
        );
        class.super_name = self.optional_class_name(class_file.super_class)?;
        for interface in &class_file.interfaces {
            class.interfaces.push(self.class_name(*interface)?);
        }

        let attributes = self.attributes(
            "class",
            &class_file.attributes,
            &[
                SIGNATURE,
                DEPRECATED,
                SYNTHETIC,
                INNER_CLASSES,
                ENCLOSING_METHOD,
                RUNTIME_VISIBLE_ANNOTATIONS,
                RUNTIME_INVISIBLE_ANNOTATIONS,
                RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
                RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
            ],
        )?;
        class.signature = self.signature(&attributes, SignatureKind::Class)?;
        class.deprecated = attributes.has(DEPRECATED);
        if attributes.has(SYNTHETIC) {
            class.access_flags |= access_flags::ACC_SYNTHETIC;
        }
        class.annotations = self.annotations(&attributes)?;
        class.type_annotations = self.type_annotations(&attributes)?;
        if let Some(info) = attributes.get(INNER_CLASSES) {
            class.inner_classes = self.inner_classes(info)?;
        }
        let enclosing_method = match attributes.get(ENCLOSING_METHOD) {
            Some(info) => Some(self.enclosing_method(info)?),
            None => None,
        };

        for field in &class_file.fields {
            class.fields.push(self.field(field)?);
        }
        for method in &class_file.methods {
            class.methods.push(self.method(method)?);
        }

        Ok(ClassModel { class, enclosing_method })
    }

    fn inner_classes(&self, info: &'a [u8]) -> Result<Vec<InnerClassRef>> {
        let raw = self.payload(INNER_CLASSES, info, |r| {
            let count = r.read_u2()?;
            let mut rows = Vec::with_capacity(count as usize);
            for _ in 0..count {
                rows.push((r.read_u2()?, r.read_u2()?, r.read_u2()?, r.read_u2()?));
            }
            Ok(rows)
        })?;

        let pool = &self.class_file.constant_pool;
        raw.into_iter()
            .map(|(inner, outer, simple, flags)| -> Result<InnerClassRef> {
                Ok(InnerClassRef {
                    name: self.class_name(inner)?,
                    outer_name: self.optional_class_name(outer)?,
                    inner_name: self.check(pool.optional_utf8(simple))?.map(str::to_string),
                    access_flags: flags,
                })
            })
            .collect()
    }

    fn enclosing_method(&self, info: &'a [u8]) -> Result<EnclosingMethod> {
        let (class_index, method_index) =
            self.payload(ENCLOSING_METHOD, info, |r| Ok((r.read_u2()?, r.read_u2()?)))?;
        let owner = self.class_name(class_index)?;
        let method = if method_index == 0 {
            None
        } else {
            let (name, descriptor) = self.check(self.class_file.constant_pool.name_and_type(method_index))?;
            Some((name.to_string(), descriptor.to_string()))
        };
        Ok(EnclosingMethod { owner, method })
    }

    fn field(&self, field: &'a FieldInfo) -> Result<FieldStub> {
        let name = self.utf8(field.name_index)?;
        let descriptor = self.utf8(field.descriptor_index)?;
        self.check(validate_member_name(name, false))?;
        let field_type = self.check(FieldType::parse(descriptor))?;

        let owner = format!("field {}", name);
        let attributes = self.attributes(
            &owner,
            &field.attributes,
            &[
                CONSTANT_VALUE,
                SIGNATURE,
                DEPRECATED,
                SYNTHETIC,
                RUNTIME_VISIBLE_ANNOTATIONS,
                RUNTIME_INVISIBLE_ANNOTATIONS,
                RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
                RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
            ],
        )?;

        let mut stub = FieldStub::new(field.access_flags, name, descriptor);
        if attributes.has(SYNTHETIC) {
            stub.access_flags |= access_flags::ACC_SYNTHETIC;
        }
        stub.signature = self.signature(&attributes, SignatureKind::Field)?;
        stub.deprecated = attributes.has(DEPRECATED);
        stub.annotations = self.annotations(&attributes)?;
        stub.type_annotations = self.type_annotations(&attributes)?;
        if let Some(info) = attributes.get(CONSTANT_VALUE) {
            let index = self.payload(CONSTANT_VALUE, info, |r| r.read_u2())?;
            stub.constant_value = Some(self.constant_value(name, &field_type, index)?);
        }
        Ok(stub)
    }

    fn constant_value(&self, field: &str, field_type: &FieldType, index: u16) -> Result<ConstantValue> {
        let pool = &self.class_file.constant_pool;
        let constant = self.check(pool.get(index))?;
        let value = match (field_type, constant) {
            (FieldType::Base('I' | 'S' | 'C' | 'B' | 'Z'), Constant::Integer(v)) => ConstantValue::Int(*v),
            (FieldType::Base('F'), Constant::Float(v)) => ConstantValue::Float(*v),
            (FieldType::Base('J'), Constant::Long(v)) => ConstantValue::Long(*v),
            (FieldType::Base('D'), Constant::Double(v)) => ConstantValue::Double(*v),
            (FieldType::Object(class), Constant::String(_)) if class == "java/lang/String" => {
                ConstantValue::String(self.check(pool.string(index))?)
            }
            _ => {
                return Err(Error::malformed(
                    &self.name,
                    format!("ConstantValue of field {} does not match descriptor {}", field, field_type.descriptor()),
                ))
            }
        };
        Ok(value)
    }

    fn method(&self, method: &'a MethodInfo) -> Result<MethodStub> {
        let name = self.utf8(method.name_index)?;
        let descriptor = self.utf8(method.descriptor_index)?;
        self.check(validate_member_name(name, true))?;
        self.check(MethodDescriptor::parse(descriptor))?;

        let owner = format!("method {}{}", name, descriptor);
        let attributes = self.attributes(
            &owner,
            &method.attributes,
            &[
                EXCEPTIONS,
                SIGNATURE,
                DEPRECATED,
                SYNTHETIC,
                METHOD_PARAMETERS,
                ANNOTATION_DEFAULT,
                RUNTIME_VISIBLE_ANNOTATIONS,
                RUNTIME_INVISIBLE_ANNOTATIONS,
                RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
                RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
                RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS,
                RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS,
            ],
        )?;

        let pool = &self.class_file.constant_pool;
        let mut stub = MethodStub::new(method.access_flags, name, descriptor);
        if attributes.has(SYNTHETIC) {
            stub.access_flags |= access_flags::ACC_SYNTHETIC;
        }
        stub.signature = self.signature(&attributes, SignatureKind::Method)?;
        stub.deprecated = attributes.has(DEPRECATED);
        stub.annotations = self.annotations(&attributes)?;
        stub.type_annotations = self.type_annotations(&attributes)?;

        if let Some(info) = attributes.get(EXCEPTIONS) {
            let indices = self.payload(EXCEPTIONS, info, |r| {
                let count = r.read_u2()?;
                (0..count).map(|_| r.read_u2()).collect::<ClassFileResult<Vec<_>>>()
            })?;
            for index in indices {
                stub.exceptions.push(self.class_name(index)?);
            }
        }

        if let Some(info) = attributes.get(METHOD_PARAMETERS) {
            let raw = self.payload(METHOD_PARAMETERS, info, |r| {
                let count = r.read_u1()?;
                (0..count)
                    .map(|_| -> ClassFileResult<(u16, u16)> { Ok((r.read_u2()?, r.read_u2()?)) })
                    .collect::<ClassFileResult<Vec<_>>>()
            })?;
            for (name_index, flags) in raw {
                let name = self.check(pool.optional_utf8(name_index))?.map(str::to_string);
                stub.parameters.push(ParameterStub { access_flags: flags, name });
            }
        }

        if let Some(info) = attributes.get(ANNOTATION_DEFAULT) {
            stub.annotation_default =
                Some(self.payload(ANNOTATION_DEFAULT, info, |r| read_element_value(r, pool, 0))?);
        }

        if let Some(info) = attributes.get(RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS) {
            stub.parameter_annotations.visible =
                self.payload(RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS, info, |r| read_parameter_annotations(r, pool))?;
        }
        if let Some(info) = attributes.get(RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS) {
            stub.parameter_annotations.invisible =
                self.payload(RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS, info, |r| read_parameter_annotations(r, pool))?;
        }

        Ok(stub)
    }
}
