//! Annotation attribute payloads (JVMS 4.7.16 - 4.7.22)
//!
//! Decoding turns constant-pool indices into model values; encoding interns
//! every value into the pool being built for the stub.

use crate::common::consts::ANNOTATION_MAX_DEPTH;
use crate::model::{Annotation, AnnotationValue, TypeAnnotation, TypeAnnotationTarget, TypePathEntry};

use super::attribute::{u1_count, u2_count};
use super::constpool::ConstantPool;
use super::error::{ClassFileError, ClassFileResult};
use super::reader::ClassReader;

/// Target types that may appear on classes, fields and methods
mod target_types {
    pub const CLASS_TYPE_PARAMETER: u8 = 0x00;
    pub const METHOD_TYPE_PARAMETER: u8 = 0x01;
    pub const CLASS_EXTENDS: u8 = 0x10;
    pub const CLASS_TYPE_PARAMETER_BOUND: u8 = 0x11;
    pub const METHOD_TYPE_PARAMETER_BOUND: u8 = 0x12;
    pub const FIELD: u8 = 0x13;
    pub const METHOD_RETURN: u8 = 0x14;
    pub const METHOD_RECEIVER: u8 = 0x15;
    pub const METHOD_FORMAL_PARAMETER: u8 = 0x16;
    pub const THROWS: u8 = 0x17;
}

/// `u2 num_annotations` followed by the annotations
pub fn read_annotations(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> ClassFileResult<Vec<Annotation>> {
    let count = reader.read_u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(read_annotation(reader, pool, 0)?);
    }
    Ok(annotations)
}

/// `u1 num_parameters`, then one annotation list per parameter
pub fn read_parameter_annotations(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> ClassFileResult<Vec<Vec<Annotation>>> {
    let count = reader.read_u1()?;
    let mut parameters = Vec::with_capacity(count as usize);
    for _ in 0..count {
        parameters.push(read_annotations(reader, pool)?);
    }
    Ok(parameters)
}

pub fn read_type_annotations(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> ClassFileResult<Vec<TypeAnnotation>> {
    use target_types::*;

    let count = reader.read_u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let target = match reader.read_u1()? {
            CLASS_TYPE_PARAMETER => TypeAnnotationTarget::ClassTypeParameter(reader.read_u1()?),
            METHOD_TYPE_PARAMETER => TypeAnnotationTarget::MethodTypeParameter(reader.read_u1()?),
            CLASS_EXTENDS => TypeAnnotationTarget::Supertype(reader.read_u2()?),
            CLASS_TYPE_PARAMETER_BOUND => TypeAnnotationTarget::ClassTypeParameterBound {
                parameter: reader.read_u1()?,
                bound: reader.read_u1()?,
            },
            METHOD_TYPE_PARAMETER_BOUND => TypeAnnotationTarget::MethodTypeParameterBound {
                parameter: reader.read_u1()?,
                bound: reader.read_u1()?,
            },
            FIELD => TypeAnnotationTarget::Field,
            METHOD_RETURN => TypeAnnotationTarget::Return,
            METHOD_RECEIVER => TypeAnnotationTarget::Receiver,
            METHOD_FORMAL_PARAMETER => TypeAnnotationTarget::FormalParameter(reader.read_u1()?),
            THROWS => TypeAnnotationTarget::Throws(reader.read_u2()?),
            // local variables, casts, instanceof, ...: only meaningful inside Code
            other => return Err(ClassFileError::InvalidTypeAnnotationTarget(other)),
        };

        let path_length = reader.read_u1()?;
        let mut path = Vec::with_capacity(path_length as usize);
        for _ in 0..path_length {
            path.push(TypePathEntry { kind: reader.read_u1()?, argument_index: reader.read_u1()? });
        }

        let annotation = read_annotation(reader, pool, 0)?;
        annotations.push(TypeAnnotation { target, path, annotation });
    }
    Ok(annotations)
}

fn read_annotation(reader: &mut ClassReader<'_>, pool: &ConstantPool, depth: usize) -> ClassFileResult<Annotation> {
    let type_descriptor = pool.utf8(reader.read_u2()?)?.to_string();
    let count = reader.read_u2()?;
    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.utf8(reader.read_u2()?)?.to_string();
        values.push((name, read_element_value(reader, pool, depth + 1)?));
    }
    Ok(Annotation { type_descriptor, values })
}

/// A single `element_value`, as found in annotations and `AnnotationDefault`
pub fn read_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
    depth: usize,
) -> ClassFileResult<AnnotationValue> {
    if depth > ANNOTATION_MAX_DEPTH {
        return Err(ClassFileError::AnnotationTooDeep(ANNOTATION_MAX_DEPTH));
    }

    let tag = reader.read_u1()? as char;
    let value = match tag {
        'B' => AnnotationValue::Byte(pool.integer(reader.read_u2()?)? as i8),
        'C' => AnnotationValue::Char(pool.integer(reader.read_u2()?)? as u16),
        'D' => AnnotationValue::Double(pool.double(reader.read_u2()?)?),
        'F' => AnnotationValue::Float(pool.float(reader.read_u2()?)?),
        'I' => AnnotationValue::Int(pool.integer(reader.read_u2()?)?),
        'J' => AnnotationValue::Long(pool.long(reader.read_u2()?)?),
        'S' => AnnotationValue::Short(pool.integer(reader.read_u2()?)? as i16),
        'Z' => AnnotationValue::Boolean(pool.integer(reader.read_u2()?)? != 0),
        's' => AnnotationValue::String(pool.text(reader.read_u2()?)?),
        'c' => AnnotationValue::Class(pool.utf8(reader.read_u2()?)?.to_string()),
        'e' => {
            let type_descriptor = pool.utf8(reader.read_u2()?)?.to_string();
            let name = pool.utf8(reader.read_u2()?)?.to_string();
            AnnotationValue::Enum { type_descriptor, name }
        }
        '@' => AnnotationValue::Annotation(read_annotation(reader, pool, depth + 1)?),
        '[' => {
            let count = reader.read_u2()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(reader, pool, depth + 1)?);
            }
            AnnotationValue::Array(values)
        }
        other => return Err(ClassFileError::InvalidElementValueTag(other)),
    };
    Ok(value)
}

pub fn write_annotations(
    out: &mut Vec<u8>,
    pool: &mut ConstantPool,
    annotations: &[Annotation],
) -> ClassFileResult<()> {
    out.extend_from_slice(&u2_count("annotation", annotations.len())?.to_be_bytes());
    for annotation in annotations {
        write_annotation(out, pool, annotation, 0)?;
    }
    Ok(())
}

pub fn write_parameter_annotations(
    out: &mut Vec<u8>,
    pool: &mut ConstantPool,
    parameters: &[Vec<Annotation>],
) -> ClassFileResult<()> {
    out.push(u1_count("annotated parameter", parameters.len())?);
    for annotations in parameters {
        write_annotations(out, pool, annotations)?;
    }
    Ok(())
}

pub fn write_type_annotations(
    out: &mut Vec<u8>,
    pool: &mut ConstantPool,
    annotations: &[TypeAnnotation],
) -> ClassFileResult<()> {
    use target_types::*;

    out.extend_from_slice(&u2_count("type annotation", annotations.len())?.to_be_bytes());
    for type_annotation in annotations {
        match type_annotation.target {
            TypeAnnotationTarget::ClassTypeParameter(index) => out.extend_from_slice(&[CLASS_TYPE_PARAMETER, index]),
            TypeAnnotationTarget::MethodTypeParameter(index) => out.extend_from_slice(&[METHOD_TYPE_PARAMETER, index]),
            TypeAnnotationTarget::Supertype(index) => {
                out.push(CLASS_EXTENDS);
                out.extend_from_slice(&index.to_be_bytes());
            }
            TypeAnnotationTarget::ClassTypeParameterBound { parameter, bound } => {
                out.extend_from_slice(&[CLASS_TYPE_PARAMETER_BOUND, parameter, bound])
            }
            TypeAnnotationTarget::MethodTypeParameterBound { parameter, bound } => {
                out.extend_from_slice(&[METHOD_TYPE_PARAMETER_BOUND, parameter, bound])
            }
            TypeAnnotationTarget::Field => out.push(FIELD),
            TypeAnnotationTarget::Return => out.push(METHOD_RETURN),
            TypeAnnotationTarget::Receiver => out.push(METHOD_RECEIVER),
            TypeAnnotationTarget::FormalParameter(index) => out.extend_from_slice(&[METHOD_FORMAL_PARAMETER, index]),
            TypeAnnotationTarget::Throws(index) => {
                out.push(THROWS);
                out.extend_from_slice(&index.to_be_bytes());
            }
        }
        out.push(u1_count("type path entry", type_annotation.path.len())?);
        for entry in &type_annotation.path {
            out.extend_from_slice(&[entry.kind, entry.argument_index]);
        }
        write_annotation(out, pool, &type_annotation.annotation, 0)?;
    }
    Ok(())
}

fn write_annotation(
    out: &mut Vec<u8>,
    pool: &mut ConstantPool,
    annotation: &Annotation,
    depth: usize,
) -> ClassFileResult<()> {
    out.extend_from_slice(&pool.add_utf8(&annotation.type_descriptor)?.to_be_bytes());
    out.extend_from_slice(&u2_count("element value pair", annotation.values.len())?.to_be_bytes());
    for (name, value) in &annotation.values {
        out.extend_from_slice(&pool.add_utf8(name)?.to_be_bytes());
        write_element_value(out, pool, value, depth + 1)?;
    }
    Ok(())
}

pub fn write_element_value(
    out: &mut Vec<u8>,
    pool: &mut ConstantPool,
    value: &AnnotationValue,
    depth: usize,
) -> ClassFileResult<()> {
    if depth > ANNOTATION_MAX_DEPTH {
        return Err(ClassFileError::AnnotationTooDeep(ANNOTATION_MAX_DEPTH));
    }

    let (tag, index) = match value {
        AnnotationValue::Byte(v) => (b'B', pool.add_integer(*v as i32)?),
        AnnotationValue::Char(v) => (b'C', pool.add_integer(*v as i32)?),
        AnnotationValue::Double(v) => (b'D', pool.add_double(*v)?),
        AnnotationValue::Float(v) => (b'F', pool.add_float(*v)?),
        AnnotationValue::Int(v) => (b'I', pool.add_integer(*v)?),
        AnnotationValue::Long(v) => (b'J', pool.add_long(*v)?),
        AnnotationValue::Short(v) => (b'S', pool.add_integer(*v as i32)?),
        AnnotationValue::Boolean(v) => (b'Z', pool.add_integer(*v as i32)?),
        AnnotationValue::String(v) => (b's', pool.add_text(v)?),
        AnnotationValue::Class(descriptor) => (b'c', pool.add_utf8(descriptor)?),
        AnnotationValue::Enum { type_descriptor, name } => {
            out.push(b'e');
            out.extend_from_slice(&pool.add_utf8(type_descriptor)?.to_be_bytes());
            out.extend_from_slice(&pool.add_utf8(name)?.to_be_bytes());
            return Ok(());
        }
        AnnotationValue::Annotation(annotation) => {
            out.push(b'@');
            return write_annotation(out, pool, annotation, depth + 1);
        }
        AnnotationValue::Array(values) => {
            out.push(b'[');
            out.extend_from_slice(&u2_count("array element", values.len())?.to_be_bytes());
            for element in values {
                write_element_value(out, pool, element, depth + 1)?;
            }
            return Ok(());
        }
    };
    out.push(tag);
    out.extend_from_slice(&index.to_be_bytes());
    Ok(())
}
