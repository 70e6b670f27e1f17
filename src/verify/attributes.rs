use crate::classfile::attribute::AttributeInfo;
use crate::classfile::class::ClassFile;
use crate::classfile::signature::{self, SignatureKind};

use super::constant_pool;
use super::verifier::{VerifyError, VerifyResult};

/// Resolve attribute names, refusing anything outside `allowed` and any
/// attribute that appears twice
pub fn named<'a>(
    class_file: &'a ClassFile,
    owner: &str,
    attributes: &'a [AttributeInfo],
    allowed: &[&str],
) -> VerifyResult<Vec<(&'a str, &'a AttributeInfo)>> {
    let mut seen: Vec<(&'a str, &'a AttributeInfo)> = Vec::with_capacity(attributes.len());
    for attribute in attributes {
        let name = constant_pool::utf8(class_file, attribute.name_index)?;
        if !allowed.contains(&name) {
            return Err(VerifyError::ForbiddenAttribute { owner: owner.to_string(), attribute: name.to_string() });
        }
        if seen.iter().any(|(existing, _)| *existing == name) {
            return Err(VerifyError::DuplicateAttribute { owner: owner.to_string(), attribute: name.to_string() });
        }
        seen.push((name, attribute));
    }
    Ok(seen)
}

/// Payload of a single-index attribute (Signature, ConstantValue)
pub fn single_index(owner: &str, name: &str, attribute: &AttributeInfo) -> VerifyResult<u16> {
    match attribute.info.as_slice() {
        [high, low] => Ok(u16::from_be_bytes([*high, *low])),
        _ => Err(VerifyError::ForbiddenAttribute {
            owner: owner.to_string(),
            attribute: format!("{} (length {})", name, attribute.info.len()),
        }),
    }
}

pub fn verify_signature(class_file: &ClassFile, attribute: &AttributeInfo, kind: SignatureKind) -> VerifyResult<()> {
    let index = single_index("Signature", "Signature", attribute)?;
    let value = constant_pool::utf8(class_file, index)?;
    signature::validate(kind, value).map_err(|_| VerifyError::InvalidSignature(value.to_string()))
}
