use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;
use crate::classfile::defs::{major_versions, OBJECT_CLASS_NAME};
use crate::classfile::defs::attribute_names::*;
use crate::classfile::flag::access_flags;

use super::{attributes, class_access_flags, constant_pool, fields, interfaces, methods};

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Constant pool index {index} is not a {expected}")]
    InvalidConstantPoolIndexType { index: u16, expected: &'static str },
    #[error("Invalid class access flags: 0x{0:04x}")]
    InvalidClassAccessFlags(u16),
    #[error("Invalid access flags 0x{flags:04x} on field {name}")]
    InvalidFieldAccessFlags { name: String, flags: u16 },
    #[error("Invalid access flags 0x{flags:04x} on method {name}")]
    InvalidMethodAccessFlags { name: String, flags: u16 },
    #[error("Invalid name or descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Invalid Signature attribute: {0}")]
    InvalidSignature(String),
    #[error("Attribute {attribute} is not allowed on {owner}")]
    ForbiddenAttribute { owner: String, attribute: String },
    #[error("Duplicate attribute {attribute} on {owner}")]
    DuplicateAttribute { owner: String, attribute: String },
    #[error("ConstantValue of field {0} does not match its descriptor")]
    InvalidConstantValue(String),
    #[error("Duplicate member {0}")]
    DuplicateMember(String),
    #[error("Only {OBJECT_CLASS_NAME} may omit its superclass")]
    MissingSuperclass,
}

/// Attributes a stub class may carry
const CLASS_ATTRIBUTES: &[&str] = &[
    SIGNATURE,
    DEPRECATED,
    SYNTHETIC,
    INNER_CLASSES,
    RUNTIME_VISIBLE_ANNOTATIONS,
    RUNTIME_INVISIBLE_ANNOTATIONS,
    RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
    RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
];

/// Verify an emitted stub by orchestrating all sub-verifiers
pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    verify_version(class_file)?;
    constant_pool::verify(class_file)?;
    let name = verify_this_class(class_file)?;
    class_access_flags::verify(class_file, Some(name))?;
    verify_super_class(class_file, name)?;
    interfaces::verify(class_file)?;
    fields::verify(class_file)?;
    methods::verify(class_file)?;

    let owner = format!("class {}", name);
    let attributes = attributes::named(class_file, &owner, &class_file.attributes, CLASS_ATTRIBUTES)?;
    for (attribute_name, attribute) in attributes {
        if attribute_name == SIGNATURE {
            attributes::verify_signature(
                class_file,
                attribute,
                crate::classfile::signature::SignatureKind::Class,
            )?;
        }
    }
    Ok(())
}

fn verify_version(class_file: &ClassFile) -> VerifyResult<()> {
    let major = class_file.major_version;
    let minor = class_file.minor_version;
    // since Java 12 the minor version is either 0 or 0xFFFF (preview features)
    let minor_ok = major < 56 || minor == 0 || minor == 0xFFFF;
    if major < major_versions::JAVA_1_1 || !minor_ok {
        return Err(VerifyError::UnsupportedVersion { major, minor });
    }
    Ok(())
}

fn verify_this_class(class_file: &ClassFile) -> VerifyResult<&str> {
    let this_class = class_file.this_class;
    match class_file.constant_pool.get(this_class) {
        Ok(Constant::Class(_)) => class_file
            .constant_pool
            .class_name(this_class)
            .map_err(|_| VerifyError::InvalidConstantPoolIndex(this_class)),
        Ok(_) => Err(VerifyError::InvalidConstantPoolIndexType { index: this_class, expected: "Class" }),
        Err(_) => Err(VerifyError::InvalidConstantPoolIndex(this_class)),
    }
}

fn verify_super_class(class_file: &ClassFile, name: &str) -> VerifyResult<()> {
    let super_class = class_file.super_class;
    if super_class == 0 {
        let is_interface = class_file.access_flags & access_flags::ACC_INTERFACE != 0;
        if name == OBJECT_CLASS_NAME && !is_interface {
            return Ok(());
        }
        return Err(VerifyError::MissingSuperclass);
    }
    constant_pool::expect_class(class_file, super_class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::attribute::AttributeInfo;
    use crate::classfile::member::MethodInfo;

    fn class_named(name: &str) -> ClassFile {
        let mut class_file = ClassFile::new();
        class_file.access_flags = access_flags::ACC_PUBLIC | access_flags::ACC_SUPER;
        class_file.this_class = class_file.constant_pool.add_class(name).unwrap();
        class_file.super_class = class_file.constant_pool.add_class(OBJECT_CLASS_NAME).unwrap();
        class_file
    }

    #[test]
    fn minimal_class_verifies() {
        assert_eq!(verify(&class_named("p/A")), Ok(()));
    }

    #[test]
    fn only_object_may_lack_a_superclass() {
        let mut class_file = class_named("p/A");
        class_file.super_class = 0;
        assert_eq!(verify(&class_file), Err(VerifyError::MissingSuperclass));

        let mut object = ClassFile::new();
        object.access_flags = access_flags::ACC_PUBLIC | access_flags::ACC_SUPER;
        object.this_class = object.constant_pool.add_class(OBJECT_CLASS_NAME).unwrap();
        assert_eq!(verify(&object), Ok(()));
    }

    #[test]
    fn code_attribute_is_rejected() {
        let mut class_file = class_named("p/A");
        let name = class_file.constant_pool.add_utf8("run").unwrap();
        let descriptor = class_file.constant_pool.add_utf8("()V").unwrap();
        let mut method = MethodInfo::new(access_flags::ACC_PUBLIC, name, descriptor);
        method
            .attributes
            .push(AttributeInfo::named(&mut class_file.constant_pool, CODE, vec![0; 12]).unwrap());
        class_file.methods.push(method);

        assert_eq!(
            verify(&class_file),
            Err(VerifyError::ForbiddenAttribute { owner: "method run()V".into(), attribute: CODE.into() })
        );
    }

    #[test]
    fn enclosing_method_is_not_a_stub_attribute() {
        let mut class_file = class_named("p/A");
        let attribute =
            AttributeInfo::named(&mut class_file.constant_pool, ENCLOSING_METHOD, vec![0, 0, 0, 0]).unwrap();
        class_file.attributes.push(attribute);
        assert!(matches!(verify(&class_file), Err(VerifyError::ForbiddenAttribute { .. })));
    }

    #[test]
    fn preview_minor_version_is_accepted_only_as_ffff() {
        let mut class_file = class_named("p/A");
        class_file.major_version = major_versions::JAVA_17;
        class_file.minor_version = 0xFFFF;
        assert_eq!(verify(&class_file), Ok(()));
        class_file.minor_version = 3;
        assert!(matches!(verify(&class_file), Err(VerifyError::UnsupportedVersion { .. })));
    }
}
