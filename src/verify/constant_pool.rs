use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;

use super::verifier::{VerifyError, VerifyResult};

/// Verify that every constant refers to constants of the right kind.
///
/// Stubs carry no code, so dynamic constants and method handles are refused.
pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    let pool = &class_file.constant_pool;
    for (i, constant) in pool.constants().iter().enumerate() {
        let index = (i + 1) as u16;
        match constant {
            Constant::String(text_index) => match pool.get(*text_index) {
                Ok(Constant::Utf8(_) | Constant::Utf8Units(_)) => {}
                Ok(_) => {
                    return Err(VerifyError::InvalidConstantPoolIndexType { index: *text_index, expected: "Utf8" })
                }
                Err(_) => return Err(VerifyError::InvalidConstantPoolIndex(*text_index)),
            },
            Constant::Class(name_index)
            | Constant::Module(name_index)
            | Constant::Package(name_index)
            | Constant::MethodType(name_index) => expect_utf8(class_file, *name_index)?,
            Constant::FieldRef(class_index, nat_index)
            | Constant::MethodRef(class_index, nat_index)
            | Constant::InterfaceMethodRef(class_index, nat_index) => {
                expect_class(class_file, *class_index)?;
                match pool.get(*nat_index) {
                    Ok(Constant::NameAndType(_, _)) => {}
                    Ok(_) => {
                        return Err(VerifyError::InvalidConstantPoolIndexType {
                            index: *nat_index,
                            expected: "NameAndType",
                        })
                    }
                    Err(_) => return Err(VerifyError::InvalidConstantPoolIndex(*nat_index)),
                }
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                expect_utf8(class_file, *name_index)?;
                expect_utf8(class_file, *descriptor_index)?;
            }
            Constant::MethodHandle(_, _) | Constant::Dynamic(_, _) | Constant::InvokeDynamic(_, _) => {
                return Err(VerifyError::InvalidConstantPoolIndexType { index, expected: "loadable constant" });
            }
            Constant::Utf8(_)
            | Constant::Utf8Units(_)
            | Constant::Integer(_)
            | Constant::Float(_)
            | Constant::Long(_)
            | Constant::Double(_)
            | Constant::Unusable => {}
        }
    }
    Ok(())
}

pub fn expect_utf8(class_file: &ClassFile, index: u16) -> VerifyResult<()> {
    match class_file.constant_pool.get(index) {
        Ok(Constant::Utf8(_)) => Ok(()),
        Ok(_) => Err(VerifyError::InvalidConstantPoolIndexType { index, expected: "Utf8" }),
        Err(_) => Err(VerifyError::InvalidConstantPoolIndex(index)),
    }
}

pub fn expect_class(class_file: &ClassFile, index: u16) -> VerifyResult<()> {
    match class_file.constant_pool.get(index) {
        Ok(Constant::Class(_)) => Ok(()),
        Ok(_) => Err(VerifyError::InvalidConstantPoolIndexType { index, expected: "Class" }),
        Err(_) => Err(VerifyError::InvalidConstantPoolIndex(index)),
    }
}

/// Resolve a Utf8 constant, mapping lookup failures to verifier errors
pub fn utf8(class_file: &ClassFile, index: u16) -> VerifyResult<&str> {
    expect_utf8(class_file, index)?;
    class_file
        .constant_pool
        .utf8(index)
        .map_err(|_| VerifyError::InvalidConstantPoolIndex(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_class_name_is_reported() {
        let mut class_file = ClassFile::new();
        class_file.constant_pool.constants.push(Constant::Class(7));
        assert_eq!(verify(&class_file), Err(VerifyError::InvalidConstantPoolIndex(7)));
    }

    #[test]
    fn wide_constants_skip_their_second_slot() {
        let mut class_file = ClassFile::new();
        class_file.constant_pool.add_double(1.5).unwrap();
        class_file.constant_pool.add_class("p/A").unwrap();
        assert_eq!(verify(&class_file), Ok(()));
    }
}
