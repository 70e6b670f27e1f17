//! Constant pool and constants for Java class files

use std::collections::HashMap;

use super::error::{ClassFileError, ClassFileResult};
use crate::model::JavaString;
use super::reader::ClassReader;
use super::writer::ClassfileWritable;

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    /// Utf8 entry holding unpaired surrogates; only usable as string text
    Utf8Units(Vec<u16>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
    /// Second slot occupied by a preceding long or double
    Unusable,
}

pub(crate) mod constant_tags {
    pub const CONSTANT_UTF8: u8 = 1;
    pub const CONSTANT_INTEGER: u8 = 3;
    pub const CONSTANT_FLOAT: u8 = 4;
    pub const CONSTANT_LONG: u8 = 5;
    pub const CONSTANT_DOUBLE: u8 = 6;
    pub const CONSTANT_CLASS: u8 = 7;
    pub const CONSTANT_STRING: u8 = 8;
    pub const CONSTANT_FIELDREF: u8 = 9;
    pub const CONSTANT_METHODREF: u8 = 10;
    pub const CONSTANT_INTERFACEMETHODREF: u8 = 11;
    pub const CONSTANT_NAMEANDTYPE: u8 = 12;
    pub const CONSTANT_METHODHANDLE: u8 = 15;
    pub const CONSTANT_METHODTYPE: u8 = 16;
    pub const CONSTANT_DYNAMIC: u8 = 17;
    pub const CONSTANT_INVOKEDYNAMIC: u8 = 18;
    pub const CONSTANT_MODULE: u8 = 19;
    pub const CONSTANT_PACKAGE: u8 = 20;
}

impl Constant {
    fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }
}

/// Constant pool with 1-based indexing.
///
/// `add_*` helpers deduplicate by encoded bytes, so the pool built for a model
/// depends only on the order in which entries are first requested.
#[derive(Debug, Default)]
pub struct ConstantPool {
    pub(crate) constants: Vec<Constant>,
    lookup: HashMap<Vec<u8>, u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots in use, excluding the unused index 0
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    fn push(&mut self, constant: Constant) -> ClassFileResult<u16> {
        let key = constant.to_classfile_bytes();
        if let Some(&index) = self.lookup.get(&key) {
            return Ok(index);
        }
        let slots = if constant.is_wide() { 2 } else { 1 };
        // count written to the file is len + 1 and must fit in u16
        if self.constants.len() + slots >= u16::MAX as usize {
            return Err(ClassFileError::ConstantPoolOverflow);
        }
        let wide = constant.is_wide();
        self.constants.push(constant);
        let index = self.constants.len() as u16;
        if wide {
            self.constants.push(Constant::Unusable);
        }
        self.lookup.insert(key, index);
        Ok(index)
    }

    fn push_utf8(&mut self, constant: Constant, encoded_len: usize) -> ClassFileResult<u16> {
        if encoded_len > u16::MAX as usize {
            return Err(ClassFileError::Utf8TooLong { length: encoded_len });
        }
        self.push(constant)
    }

    pub fn add_utf8(&mut self, value: &str) -> ClassFileResult<u16> {
        let encoded_len = modified_utf8_len(value.encode_utf16());
        self.push_utf8(Constant::Utf8(value.to_string()), encoded_len)
    }

    /// Utf8 entry for arbitrary string text, unpaired surrogates included
    pub fn add_text(&mut self, value: &JavaString) -> ClassFileResult<u16> {
        match value.to_rust_string() {
            Some(text) => self.add_utf8(&text),
            None => {
                let encoded_len = modified_utf8_len(value.units().iter().copied());
                self.push_utf8(Constant::Utf8Units(value.units().to_vec()), encoded_len)
            }
        }
    }

    pub fn add_class(&mut self, name: &str) -> ClassFileResult<u16> {
        let name_index = self.add_utf8(name)?;
        self.push(Constant::Class(name_index))
    }

    pub fn add_string(&mut self, value: &str) -> ClassFileResult<u16> {
        self.add_java_string(&JavaString::from(value))
    }

    pub fn add_java_string(&mut self, value: &JavaString) -> ClassFileResult<u16> {
        let utf8_index = self.add_text(value)?;
        self.push(Constant::String(utf8_index))
    }

    pub fn add_integer(&mut self, value: i32) -> ClassFileResult<u16> {
        self.push(Constant::Integer(value))
    }

    pub fn add_float(&mut self, value: f32) -> ClassFileResult<u16> {
        self.push(Constant::Float(value))
    }

    pub fn add_long(&mut self, value: i64) -> ClassFileResult<u16> {
        self.push(Constant::Long(value))
    }

    pub fn add_double(&mut self, value: f64) -> ClassFileResult<u16> {
        self.push(Constant::Double(value))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> ClassFileResult<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.push(Constant::NameAndType(name_index, descriptor_index))
    }

    pub fn get(&self, index: u16) -> ClassFileResult<&Constant> {
        if index == 0 {
            return Err(ClassFileError::InvalidConstantIndex { index });
        }
        match self.constants.get(index as usize - 1) {
            Some(Constant::Unusable) | None => Err(ClassFileError::InvalidConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    pub fn utf8(&self, index: u16) -> ClassFileResult<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            Constant::Utf8Units(_) => Err(ClassFileError::UnpairedSurrogate { index }),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Utf8" }),
        }
    }

    /// Any Utf8 entry as string text, without requiring well-formed UTF-16
    pub fn text(&self, index: u16) -> ClassFileResult<JavaString> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(JavaString::from(value.as_str())),
            Constant::Utf8Units(units) => Ok(JavaString::from_units(units.clone())),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Utf8" }),
        }
    }

    /// Like `utf8`, but index 0 means "absent"
    pub fn optional_utf8(&self, index: u16) -> ClassFileResult<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.utf8(index).map(Some)
    }

    pub fn class_name(&self, index: u16) -> ClassFileResult<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Class" }),
        }
    }

    /// Like `class_name`, but index 0 means "absent"
    pub fn optional_class_name(&self, index: u16) -> ClassFileResult<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.class_name(index).map(Some)
    }

    pub fn name_and_type(&self, index: u16) -> ClassFileResult<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType(name_index, descriptor_index) => {
                Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
            }
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "NameAndType" }),
        }
    }

    pub fn integer(&self, index: u16) -> ClassFileResult<i32> {
        match self.get(index)? {
            Constant::Integer(value) => Ok(*value),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Integer" }),
        }
    }

    pub fn float(&self, index: u16) -> ClassFileResult<f32> {
        match self.get(index)? {
            Constant::Float(value) => Ok(*value),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Float" }),
        }
    }

    pub fn long(&self, index: u16) -> ClassFileResult<i64> {
        match self.get(index)? {
            Constant::Long(value) => Ok(*value),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Long" }),
        }
    }

    pub fn double(&self, index: u16) -> ClassFileResult<f64> {
        match self.get(index)? {
            Constant::Double(value) => Ok(*value),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "Double" }),
        }
    }

    /// Text of a `CONSTANT_String`
    pub fn string(&self, index: u16) -> ClassFileResult<JavaString> {
        match self.get(index)? {
            Constant::String(utf8_index) => self.text(*utf8_index),
            _ => Err(ClassFileError::UnexpectedConstantKind { index, expected: "String" }),
        }
    }

    pub fn parse(reader: &mut ClassReader<'_>) -> ClassFileResult<Self> {
        use constant_tags::*;

        let count = reader.read_u2()? as usize;
        let mut pool = Self::new();
        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let constant = match tag {
                CONSTANT_UTF8 => {
                    let length = reader.read_u2()? as usize;
                    let units = decode_modified_utf8_units(reader.read_slice(length)?)?;
                    match String::from_utf16(&units) {
                        Ok(text) => Constant::Utf8(text),
                        Err(_) => Constant::Utf8Units(units),
                    }
                }
                CONSTANT_INTEGER => Constant::Integer(reader.read_u4()? as i32),
                CONSTANT_FLOAT => Constant::Float(f32::from_bits(reader.read_u4()?)),
                CONSTANT_LONG => Constant::Long(reader.read_u8()? as i64),
                CONSTANT_DOUBLE => Constant::Double(f64::from_bits(reader.read_u8()?)),
                CONSTANT_CLASS => Constant::Class(reader.read_u2()?),
                CONSTANT_STRING => Constant::String(reader.read_u2()?),
                CONSTANT_FIELDREF => Constant::FieldRef(reader.read_u2()?, reader.read_u2()?),
                CONSTANT_METHODREF => Constant::MethodRef(reader.read_u2()?, reader.read_u2()?),
                CONSTANT_INTERFACEMETHODREF => {
                    Constant::InterfaceMethodRef(reader.read_u2()?, reader.read_u2()?)
                }
                CONSTANT_NAMEANDTYPE => Constant::NameAndType(reader.read_u2()?, reader.read_u2()?),
                CONSTANT_METHODHANDLE => Constant::MethodHandle(reader.read_u1()?, reader.read_u2()?),
                CONSTANT_METHODTYPE => Constant::MethodType(reader.read_u2()?),
                CONSTANT_DYNAMIC => Constant::Dynamic(reader.read_u2()?, reader.read_u2()?),
                CONSTANT_INVOKEDYNAMIC => Constant::InvokeDynamic(reader.read_u2()?, reader.read_u2()?),
                CONSTANT_MODULE => Constant::Module(reader.read_u2()?),
                CONSTANT_PACKAGE => Constant::Package(reader.read_u2()?),
                other => return Err(ClassFileError::UnsupportedConstant { tag: other }),
            };

            let wide = constant.is_wide();
            pool.constants.push(constant);
            index += 1;
            if wide {
                pool.constants.push(Constant::Unusable);
                index += 1;
            }
        }

        // Parsed pools are read-only; `lookup` stays empty on purpose.
        Ok(pool)
    }
}

/// Decode the JVM's modified UTF-8 (`C0 80` for NUL, surrogate pairs for supplementary chars)
pub fn decode_modified_utf8(bytes: &[u8]) -> ClassFileResult<String> {
    String::from_utf16(&decode_modified_utf8_units(bytes)?).map_err(|_| ClassFileError::InvalidUtf8)
}

/// Decode modified UTF-8 into UTF-16 code units; unpaired surrogates are allowed
pub fn decode_modified_utf8_units(bytes: &[u8]) -> ClassFileResult<Vec<u16>> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return Err(ClassFileError::InvalidUtf8);
            }
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes.get(i + 1).ok_or(ClassFileError::InvalidUtf8)? as u16;
            if b1 & 0xC0 != 0x80 {
                return Err(ClassFileError::InvalidUtf8);
            }
            units.push(((b0 & 0x1F) << 6) | (b1 & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = *bytes.get(i + 1).ok_or(ClassFileError::InvalidUtf8)? as u16;
            let b2 = *bytes.get(i + 2).ok_or(ClassFileError::InvalidUtf8)? as u16;
            if b1 & 0xC0 != 0x80 || b2 & 0xC0 != 0x80 {
                return Err(ClassFileError::InvalidUtf8);
            }
            units.push(((b0 & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F));
            i += 3;
        } else {
            return Err(ClassFileError::InvalidUtf8);
        }
    }
    Ok(units)
}

/// Encode a string as the JVM's modified UTF-8
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    encode_modified_utf8_units(value.encode_utf16())
}

/// Encode UTF-16 code units as modified UTF-8, one to three bytes per unit
pub fn encode_modified_utf8_units(units: impl IntoIterator<Item = u16>) -> Vec<u8> {
    let mut bytes = Vec::new();
    for unit in units {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push((0xC0 | ((unit >> 6) & 0x1F)) as u8);
                bytes.push((0x80 | (unit & 0x3F)) as u8);
            }
            _ => {
                bytes.push((0xE0 | ((unit >> 12) & 0x0F)) as u8);
                bytes.push((0x80 | ((unit >> 6) & 0x3F)) as u8);
                bytes.push((0x80 | (unit & 0x3F)) as u8);
            }
        }
    }
    bytes
}

fn modified_utf8_len(units: impl Iterator<Item = u16>) -> usize {
    units
        .map(|unit| match unit {
            0x0001..=0x007F => 1,
            0x0000 | 0x0080..=0x07FF => 2,
            _ => 3,
        })
        .sum()
}
