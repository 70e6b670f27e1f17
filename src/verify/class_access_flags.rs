use crate::classfile::class::ClassFile;
use crate::classfile::flag::access_flags;

use super::verifier::{VerifyError, VerifyResult};

/// Verify the class access flags (JVMS 4.1, table 4.1-B)
pub fn verify(class_file: &ClassFile, class_name: Option<&str>) -> VerifyResult<()> {
    let flags = class_file.access_flags;
    let has = |bit: u16| flags & bit != 0;
    let invalid = Err(VerifyError::InvalidClassAccessFlags(flags));

    // nested-only bits never appear on a top-level class_info
    if has(access_flags::ACC_PRIVATE) || has(access_flags::ACC_PROTECTED) || has(access_flags::ACC_STATIC) {
        return invalid;
    }

    // @interface must also be interface
    if has(access_flags::ACC_ANNOTATION) && !has(access_flags::ACC_INTERFACE) {
        return invalid;
    }

    if has(access_flags::ACC_INTERFACE) {
        // interface must be abstract unless it's package-info
        if !has(access_flags::ACC_ABSTRACT) {
            let is_package_info = class_name
                .and_then(|full| full.rsplit('/').next())
                .map_or(false, |simple| simple == "package-info");
            if !is_package_info {
                return invalid;
            }
        }
        if has(access_flags::ACC_FINAL)
            || has(access_flags::ACC_SUPER)
            || has(access_flags::ACC_ENUM)
            || has(access_flags::ACC_MODULE)
        {
            return invalid;
        }
    } else if has(access_flags::ACC_FINAL) && has(access_flags::ACC_ABSTRACT) {
        return invalid;
    }

    Ok(())
}
