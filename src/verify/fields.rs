use std::collections::HashSet;

use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;
use crate::classfile::defs::attribute_names::*;
use crate::classfile::descriptor::{validate_member_name, FieldType};
use crate::classfile::flag::access_flags;
use crate::classfile::signature::SignatureKind;

use super::attributes;
use super::constant_pool;
use super::verifier::{VerifyError, VerifyResult};

const FIELD_ATTRIBUTES: &[&str] = &[
    CONSTANT_VALUE,
    SIGNATURE,
    DEPRECATED,
    SYNTHETIC,
    RUNTIME_VISIBLE_ANNOTATIONS,
    RUNTIME_INVISIBLE_ANNOTATIONS,
    RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
    RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
];

pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    let mut seen = HashSet::new();
    for field in &class_file.fields {
        let name = constant_pool::utf8(class_file, field.name_index)?;
        let descriptor = constant_pool::utf8(class_file, field.descriptor_index)?;
        validate_member_name(name, false).map_err(|_| VerifyError::InvalidDescriptor(name.to_string()))?;
        let field_type =
            FieldType::parse(descriptor).map_err(|_| VerifyError::InvalidDescriptor(descriptor.to_string()))?;
        if !seen.insert((name, descriptor)) {
            return Err(VerifyError::DuplicateMember(format!("{}:{}", name, descriptor)));
        }

        verify_access_flags(class_file, name, field.access_flags)?;

        let owner = format!("field {}", name);
        for (attribute_name, attribute) in attributes::named(class_file, &owner, &field.attributes, FIELD_ATTRIBUTES)? {
            match attribute_name {
                CONSTANT_VALUE => {
                    let index = attributes::single_index(&owner, attribute_name, attribute)?;
                    verify_constant_value(class_file, name, &field_type, index)?;
                }
                SIGNATURE => attributes::verify_signature(class_file, attribute, SignatureKind::Field)?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn verify_access_flags(class_file: &ClassFile, name: &str, flags: u16) -> VerifyResult<()> {
    let invalid = || Err(VerifyError::InvalidFieldAccessFlags { name: name.to_string(), flags });

    if (flags & access_flags::VISIBILITY_MASK).count_ones() > 1 {
        return invalid();
    }

    let class_is_interface = class_file.access_flags & access_flags::ACC_INTERFACE != 0;
    if class_is_interface {
        let must = access_flags::ACC_PUBLIC | access_flags::ACC_STATIC | access_flags::ACC_FINAL;
        let illegal = access_flags::ACC_PRIVATE
            | access_flags::ACC_PROTECTED
            | access_flags::ACC_VOLATILE
            | access_flags::ACC_TRANSIENT
            | access_flags::ACC_ENUM;
        if flags & must != must || flags & illegal != 0 {
            return invalid();
        }
    } else if flags & access_flags::ACC_FINAL != 0 && flags & access_flags::ACC_VOLATILE != 0 {
        return invalid();
    }
    Ok(())
}

// The constant kind must match the descriptor; javac also writes ConstantValue
// on final instance fields, so static is not required.
fn verify_constant_value(class_file: &ClassFile, name: &str, field_type: &FieldType, index: u16) -> VerifyResult<()> {
    let constant = class_file
        .constant_pool
        .get(index)
        .map_err(|_| VerifyError::InvalidConstantPoolIndex(index))?;
    let matches = match (field_type, constant) {
        (FieldType::Base('I' | 'S' | 'C' | 'B' | 'Z'), Constant::Integer(_)) => true,
        (FieldType::Base('F'), Constant::Float(_)) => true,
        (FieldType::Base('J'), Constant::Long(_)) => true,
        (FieldType::Base('D'), Constant::Double(_)) => true,
        (FieldType::Object(class), Constant::String(_)) => class == "java/lang/String",
        _ => false,
    };
    if !matches {
        return Err(VerifyError::InvalidConstantValue(name.to_string()));
    }
    Ok(())
}
