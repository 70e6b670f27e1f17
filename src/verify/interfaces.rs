use crate::classfile::class::ClassFile;

use super::constant_pool::expect_class;
use super::verifier::VerifyResult;

/// Verify that every implemented interface names a class constant
pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    for interface in &class_file.interfaces {
        expect_class(class_file, *interface)?;
    }
    Ok(())
}
