use std::collections::HashSet;

use crate::classfile::class::ClassFile;
use crate::classfile::defs::attribute_names::*;
use crate::classfile::descriptor::{validate_member_name, MethodDescriptor};
use crate::classfile::signature::SignatureKind;

use super::attributes;
use super::constant_pool;
use super::method_access_flags;
use super::verifier::{VerifyError, VerifyResult};

/// A stub method never carries `Code` or any debug attribute
const METHOD_ATTRIBUTES: &[&str] = &[
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
];

pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    let mut seen = HashSet::new();
    for method in &class_file.methods {
        let name = constant_pool::utf8(class_file, method.name_index)?;
        let descriptor = constant_pool::utf8(class_file, method.descriptor_index)?;
        validate_member_name(name, true).map_err(|_| VerifyError::InvalidDescriptor(name.to_string()))?;
        MethodDescriptor::parse(descriptor).map_err(|_| VerifyError::InvalidDescriptor(descriptor.to_string()))?;
        if !seen.insert((name, descriptor)) {
            return Err(VerifyError::DuplicateMember(format!("{}{}", name, descriptor)));
        }

        method_access_flags::verify(class_file, method, name)?;

        let owner = format!("method {}{}", name, descriptor);
        for (attribute_name, attribute) in attributes::named(class_file, &owner, &method.attributes, METHOD_ATTRIBUTES)? {
            match attribute_name {
                SIGNATURE => attributes::verify_signature(class_file, attribute, SignatureKind::Method)?,
                EXCEPTIONS => verify_exceptions(class_file, &owner, &attribute.info)?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn verify_exceptions(class_file: &ClassFile, owner: &str, info: &[u8]) -> VerifyResult<()> {
    let malformed = || VerifyError::ForbiddenAttribute {
        owner: owner.to_string(),
        attribute: format!("{} (length {})", EXCEPTIONS, info.len()),
    };
    let (count, entries) = match info {
        [high, low, rest @ ..] => (u16::from_be_bytes([*high, *low]) as usize, rest),
        _ => return Err(malformed()),
    };
    if entries.len() != count * 2 {
        return Err(malformed());
    }
    for entry in entries.chunks_exact(2) {
        constant_pool::expect_class(class_file, u16::from_be_bytes([entry[0], entry[1]]))?;
    }
    Ok(())
}
