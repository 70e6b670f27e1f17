//! Raw attributes for Java class files

use super::constpool::ConstantPool;
use super::error::{ClassFileError, ClassFileResult};

/// An attribute whose payload is kept as raw bytes; decoding happens where the
/// attribute's owner is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    pub fn new(name_index: u16, info: Vec<u8>) -> Self {
        Self { name_index, info }
    }

    /// Build an attribute, interning its name in `constant_pool`
    pub fn named(constant_pool: &mut ConstantPool, name: &str, info: Vec<u8>) -> ClassFileResult<Self> {
        if info.len() > u32::MAX as usize {
            return Err(ClassFileError::TooMany { what: "attribute byte", count: info.len() });
        }
        let name_index = constant_pool.add_utf8(name)?;
        Ok(Self::new(name_index, info))
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> ClassFileResult<&'a str> {
        constant_pool.utf8(self.name_index)
    }
}

/// Payload holding a single constant-pool index (Signature, ConstantValue, ...)
pub fn u2_payload(index: u16) -> Vec<u8> {
    index.to_be_bytes().to_vec()
}

/// Checked conversion of a collection length into a u2 count
pub fn u2_count(what: &'static str, count: usize) -> ClassFileResult<u16> {
    u16::try_from(count).map_err(|_| ClassFileError::TooMany { what, count })
}

/// Checked conversion of a collection length into a u1 count
pub fn u1_count(what: &'static str, count: usize) -> ClassFileResult<u8> {
    u8::try_from(count).map_err(|_| ClassFileError::TooMany { what, count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_attribute_interns_its_name() {
        let mut pool = ConstantPool::new();
        let attribute = AttributeInfo::named(&mut pool, "Deprecated", Vec::new()).unwrap();
        assert_eq!(attribute.name(&pool).unwrap(), "Deprecated");
        assert!(attribute.info.is_empty());
    }

    #[test]
    fn counts_beyond_u1_are_rejected() {
        assert!(u1_count("parameter", 255).is_ok());
        assert_eq!(
            u1_count("parameter", 256),
            Err(ClassFileError::TooMany { what: "parameter", count: 256 })
        );
    }
}
