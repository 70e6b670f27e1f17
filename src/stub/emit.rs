//! Serialize a filtered, ordered stub into class-file bytes
//!
//! The constant pool is rebuilt from scratch and filled in traversal order
//! (header, fields, methods, class attributes), so equal models always yield
//! equal bytes. Attribute order is fixed per element kind.

use crate::classfile::annotation::{write_annotations, write_element_value, write_parameter_annotations, write_type_annotations};
use crate::classfile::attribute::{u1_count, u2_count, u2_payload, AttributeInfo};
use crate::classfile::class::ClassFile;
use crate::classfile::constpool::ConstantPool;
use crate::classfile::defs::attribute_names::*;
use crate::classfile::error::ClassFileResult;
use crate::classfile::member::{FieldInfo, MethodInfo};
use crate::classfile::writer::ClassfileWritable;
use crate::common::error::{Error, Result};
use crate::model::{
    Annotation, ClassStub, ConstantValue, FieldStub, InnerClassRef, MethodStub, Retained, TypeAnnotation,
};
use crate::verify;

/// Emit `class` as a verified class file without any executable content
pub fn emit(class: &ClassStub) -> Result<Vec<u8>> {
    let class_file = build_class_file(class).map_err(|err| Error::from_class_file(&class.name, err))?;
    verify::verify(&class_file).map_err(|err| Error::malformed(&class.name, err.to_string()))?;
    Ok(class_file.to_classfile_bytes())
}

/// Lower a stub into raw class-file structures
pub fn build_class_file(class: &ClassStub) -> ClassFileResult<ClassFile> {
    let mut class_file = ClassFile::new();
    class_file.major_version = class.major_version;
    class_file.minor_version = class.minor_version;
    class_file.access_flags = class.access_flags;

    let pool = &mut class_file.constant_pool;
    class_file.this_class = pool.add_class(&class.name)?;
    class_file.super_class = match &class.super_name {
        Some(super_name) => pool.add_class(super_name)?,
        None => 0,
    };
    u2_count("interface", class.interfaces.len())?;
    for interface in &class.interfaces {
        class_file.interfaces.push(pool.add_class(interface)?);
    }

    u2_count("field", class.fields.len())?;
    for field in &class.fields {
        class_file.fields.push(build_field(pool, field)?);
    }

    u2_count("method", class.methods.len())?;
    for method in &class.methods {
        class_file.methods.push(build_method(pool, method)?);
    }

    let mut attributes = Vec::new();
    if let Some(signature) = &class.signature {
        attributes.push(signature_attribute(pool, signature)?);
    }
    if class.deprecated {
        attributes.push(AttributeInfo::named(pool, DEPRECATED, Vec::new())?);
    }
    if !class.inner_classes.is_empty() {
        attributes.push(inner_classes_attribute(pool, &class.inner_classes)?);
    }
    push_annotations(pool, &mut attributes, &class.annotations)?;
    push_type_annotations(pool, &mut attributes, &class.type_annotations)?;
    class_file.attributes = attributes;

    Ok(class_file)
}

fn build_field(pool: &mut ConstantPool, field: &FieldStub) -> ClassFileResult<FieldInfo> {
    let name_index = pool.add_utf8(&field.name)?;
    let descriptor_index = pool.add_utf8(&field.descriptor)?;
    let mut info = FieldInfo::new(field.access_flags, name_index, descriptor_index);

    if let Some(value) = &field.constant_value {
        let value_index = match value {
            ConstantValue::Int(v) => pool.add_integer(*v)?,
            ConstantValue::Float(v) => pool.add_float(*v)?,
            ConstantValue::Long(v) => pool.add_long(*v)?,
            ConstantValue::Double(v) => pool.add_double(*v)?,
            ConstantValue::String(v) => pool.add_java_string(v)?,
        };
        info.attributes.push(AttributeInfo::named(pool, CONSTANT_VALUE, u2_payload(value_index))?);
    }
    if let Some(signature) = &field.signature {
        info.attributes.push(signature_attribute(pool, signature)?);
    }
    if field.deprecated {
        info.attributes.push(AttributeInfo::named(pool, DEPRECATED, Vec::new())?);
    }
    push_annotations(pool, &mut info.attributes, &field.annotations)?;
    push_type_annotations(pool, &mut info.attributes, &field.type_annotations)?;
    Ok(info)
}

fn build_method(pool: &mut ConstantPool, method: &MethodStub) -> ClassFileResult<MethodInfo> {
    let name_index = pool.add_utf8(&method.name)?;
    let descriptor_index = pool.add_utf8(&method.descriptor)?;
    let mut info = MethodInfo::new(method.access_flags, name_index, descriptor_index);

    if !method.exceptions.is_empty() {
        let mut payload = u2_count("exception", method.exceptions.len())?.to_be_bytes().to_vec();
        for exception in &method.exceptions {
            payload.extend_from_slice(&pool.add_class(exception)?.to_be_bytes());
        }
        info.attributes.push(AttributeInfo::named(pool, EXCEPTIONS, payload)?);
    }
    if let Some(signature) = &method.signature {
        info.attributes.push(signature_attribute(pool, signature)?);
    }
    if method.deprecated {
        info.attributes.push(AttributeInfo::named(pool, DEPRECATED, Vec::new())?);
    }
    if !method.parameters.is_empty() {
        let mut payload = vec![u1_count("parameter", method.parameters.len())?];
        for parameter in &method.parameters {
            let name_index = match &parameter.name {
                Some(name) => pool.add_utf8(name)?,
                None => 0,
            };
            payload.extend_from_slice(&name_index.to_be_bytes());
            payload.extend_from_slice(&parameter.access_flags.to_be_bytes());
        }
        info.attributes.push(AttributeInfo::named(pool, METHOD_PARAMETERS, payload)?);
    }
    if let Some(default) = &method.annotation_default {
        let mut payload = Vec::new();
        write_element_value(&mut payload, pool, default, 0)?;
        info.attributes.push(AttributeInfo::named(pool, ANNOTATION_DEFAULT, payload)?);
    }
    push_annotations(pool, &mut info.attributes, &method.annotations)?;
    push_type_annotations(pool, &mut info.attributes, &method.type_annotations)?;
    push_parameter_annotations(pool, &mut info.attributes, &method.parameter_annotations)?;
    Ok(info)
}

fn signature_attribute(pool: &mut ConstantPool, signature: &str) -> ClassFileResult<AttributeInfo> {
    let index = pool.add_utf8(signature)?;
    AttributeInfo::named(pool, SIGNATURE, u2_payload(index))
}

fn inner_classes_attribute(pool: &mut ConstantPool, rows: &[InnerClassRef]) -> ClassFileResult<AttributeInfo> {
    let mut payload = u2_count("inner class", rows.len())?.to_be_bytes().to_vec();
    for row in rows {
        let inner_index = pool.add_class(&row.name)?;
        let outer_index = match &row.outer_name {
            Some(outer) => pool.add_class(outer)?,
            None => 0,
        };
        let name_index = match &row.inner_name {
            Some(simple) => pool.add_utf8(simple)?,
            None => 0,
        };
        payload.extend_from_slice(&inner_index.to_be_bytes());
        payload.extend_from_slice(&outer_index.to_be_bytes());
        payload.extend_from_slice(&name_index.to_be_bytes());
        payload.extend_from_slice(&row.access_flags.to_be_bytes());
    }
    AttributeInfo::named(pool, INNER_CLASSES, payload)
}

fn push_annotations(
    pool: &mut ConstantPool,
    attributes: &mut Vec<AttributeInfo>,
    annotations: &Retained<Annotation>,
) -> ClassFileResult<()> {
    for (name, list) in [
        (RUNTIME_VISIBLE_ANNOTATIONS, &annotations.visible),
        (RUNTIME_INVISIBLE_ANNOTATIONS, &annotations.invisible),
    ] {
        if !list.is_empty() {
            let mut payload = Vec::new();
            write_annotations(&mut payload, pool, list)?;
            attributes.push(AttributeInfo::named(pool, name, payload)?);
        }
    }
    Ok(())
}

fn push_type_annotations(
    pool: &mut ConstantPool,
    attributes: &mut Vec<AttributeInfo>,
    annotations: &Retained<TypeAnnotation>,
) -> ClassFileResult<()> {
    for (name, list) in [
        (RUNTIME_VISIBLE_TYPE_ANNOTATIONS, &annotations.visible),
        (RUNTIME_INVISIBLE_TYPE_ANNOTATIONS, &annotations.invisible),
    ] {
        if !list.is_empty() {
            let mut payload = Vec::new();
            write_type_annotations(&mut payload, pool, list)?;
            attributes.push(AttributeInfo::named(pool, name, payload)?);
        }
    }
    Ok(())
}

fn push_parameter_annotations(
    pool: &mut ConstantPool,
    attributes: &mut Vec<AttributeInfo>,
    annotations: &Retained<Vec<Annotation>>,
) -> ClassFileResult<()> {
    for (name, list) in [
        (RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS, &annotations.visible),
        (RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS, &annotations.invisible),
    ] {
        if !list.is_empty() {
            let mut payload = Vec::new();
            write_parameter_annotations(&mut payload, pool, list)?;
            attributes.push(AttributeInfo::named(pool, name, payload)?);
        }
    }
    Ok(())
}
