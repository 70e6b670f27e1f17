//! Bounds-checked big-endian cursor and class-file parsing

use super::attribute::AttributeInfo;
use super::class::ClassFile;
use super::constpool::ConstantPool;
use super::defs::MAGIC;
use super::error::{ClassFileError, ClassFileResult};
use super::member::{FieldInfo, MethodInfo};

pub struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn expect_magic(&mut self) -> ClassFileResult<()> {
        let magic = self.read_u4()?;
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }
        Ok(())
    }

    pub fn read_u1(&mut self) -> ClassFileResult<u8> {
        let slice = self.read_slice(1)?;
        Ok(slice[0])
    }

    pub fn read_u2(&mut self) -> ClassFileResult<u16> {
        let slice = self.read_slice(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    pub fn read_u4(&mut self) -> ClassFileResult<u32> {
        let slice = self.read_slice(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    pub fn read_u8(&mut self) -> ClassFileResult<u64> {
        let high = self.read_u4()? as u64;
        let low = self.read_u4()? as u64;
        Ok((high << 32) | low)
    }

    pub fn read_slice(&mut self, len: usize) -> ClassFileResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ClassFileError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Fail unless every byte of the attribute payload has been consumed
    pub fn expect_end(&self, attribute: &str) -> ClassFileResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(ClassFileError::TrailingBytes {
                name: attribute.to_string(),
                remaining,
            }),
        }
    }
}

fn read_attributes(reader: &mut ClassReader<'_>) -> ClassFileResult<Vec<AttributeInfo>> {
    let count = reader.read_u2()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_slice(length)?.to_vec();
        attributes.push(AttributeInfo::new(name_index, info));
    }
    Ok(attributes)
}

impl ClassFile {
    /// Parse raw class-file bytes. Attribute payloads stay undecoded.
    pub fn parse(bytes: &[u8]) -> ClassFileResult<Self> {
        let mut reader = ClassReader::new(bytes);
        reader.expect_magic()?;
        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let constant_pool = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = reader.read_u2()?;
        let super_class = reader.read_u2()?;

        let interfaces_count = reader.read_u2()?;
        let mut interfaces = Vec::with_capacity(interfaces_count as usize);
        for _ in 0..interfaces_count {
            interfaces.push(reader.read_u2()?);
        }

        let fields_count = reader.read_u2()?;
        let mut fields = Vec::with_capacity(fields_count as usize);
        for _ in 0..fields_count {
            let access_flags = reader.read_u2()?;
            let name_index = reader.read_u2()?;
            let descriptor_index = reader.read_u2()?;
            let mut field = FieldInfo::new(access_flags, name_index, descriptor_index);
            field.attributes = read_attributes(&mut reader)?;
            fields.push(field);
        }

        let methods_count = reader.read_u2()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            let access_flags = reader.read_u2()?;
            let name_index = reader.read_u2()?;
            let descriptor_index = reader.read_u2()?;
            let mut method = MethodInfo::new(access_flags, name_index, descriptor_index);
            method.attributes = read_attributes(&mut reader)?;
            methods.push(method);
        }

        let attributes = read_attributes(&mut reader)?;
        reader.expect_end("ClassFile")?;

        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_values() {
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, 0x2A, 0xFF];
        let mut reader = ClassReader::new(&data);
        assert_eq!(reader.read_u2().unwrap(), 0x0102);
        assert_eq!(reader.read_u4().unwrap(), 42);
        assert_eq!(reader.read_u1().unwrap(), 0xFF);
        assert_eq!(reader.read_u1(), Err(ClassFileError::UnexpectedEof));
    }

    #[test]
    fn rejects_bad_magic() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52];
        assert_eq!(ClassFile::parse(&data).unwrap_err(), ClassFileError::InvalidMagic(0xDEADBEEF));
    }

    #[test]
    fn truncated_file_is_eof() {
        let data = [0xCA, 0xFE, 0xBA, 0xBE, 0, 0];
        assert_eq!(ClassFile::parse(&data).unwrap_err(), ClassFileError::UnexpectedEof);
    }

    #[test]
    fn trailing_attribute_bytes_are_reported() {
        let data = [0, 1, 2];
        let mut reader = ClassReader::new(&data);
        reader.read_u2().unwrap();
        assert_eq!(
            reader.expect_end("Exceptions"),
            Err(ClassFileError::TrailingBytes { name: "Exceptions".into(), remaining: 1 })
        );
    }
}
