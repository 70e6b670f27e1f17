use crate::classfile::class::ClassFile;
use crate::classfile::defs::major_versions;
use crate::classfile::flag::access_flags;
use crate::classfile::member::MethodInfo;

use super::verifier::{VerifyError, VerifyResult};

/// Verify method access flags (JVMS 4.6, table 4.6-A)
pub fn verify(class_file: &ClassFile, method: &MethodInfo, name: &str) -> VerifyResult<()> {
    let flags = method.access_flags;
    let invalid = || Err(VerifyError::InvalidMethodAccessFlags { name: name.to_string(), flags });

    if (flags & access_flags::VISIBILITY_MASK).count_ones() > 1 {
        return invalid();
    }

    let class_is_interface = class_file.access_flags & access_flags::ACC_INTERFACE != 0;
    if class_is_interface
        && (flags & access_flags::ACC_PROTECTED != 0
            || flags & access_flags::ACC_FINAL != 0
            || flags & access_flags::ACC_SYNCHRONIZED != 0
            || flags & access_flags::ACC_NATIVE != 0)
    {
        return invalid();
    }

    if flags & access_flags::ACC_ABSTRACT != 0 {
        if flags & access_flags::ACC_PRIVATE != 0
            || flags & access_flags::ACC_STATIC != 0
            || flags & access_flags::ACC_FINAL != 0
            || flags & access_flags::ACC_SYNCHRONIZED != 0
            || flags & access_flags::ACC_NATIVE != 0
        {
            return invalid();
        }

        // strictfp is meaningful between Java 1.2 and Java 16 only
        let strict_matters = (46..major_versions::JAVA_17).contains(&class_file.major_version);
        if strict_matters && flags & access_flags::ACC_STRICT != 0 {
            return invalid();
        }
    }

    Ok(())
}
