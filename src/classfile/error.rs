//! Errors raised while decoding or encoding class-file structures

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header 0x{0:08x}")]
    InvalidMagic(u32),
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("constant pool index {index} is not a {expected}")]
    UnexpectedConstantKind { index: u16, expected: &'static str },
    #[error("constant pool is out of space")]
    ConstantPoolOverflow,
    #[error("invalid modified UTF-8 string in constant pool")]
    InvalidUtf8,
    #[error("constant pool entry {index} has unpaired surrogates and cannot name anything")]
    UnpairedSurrogate { index: u16 },
    #[error("string of {length} encoded bytes exceeds the 65535-byte constant limit")]
    Utf8TooLong { length: usize },
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("malformed signature: {0}")]
    InvalidSignature(String),
    #[error("invalid element value tag '{0}'")]
    InvalidElementValueTag(char),
    #[error("annotation values nested deeper than {0} levels")]
    AnnotationTooDeep(usize),
    #[error("type annotation target 0x{0:02x} is not valid outside method bodies")]
    InvalidTypeAnnotationTarget(u8),
    #[error("attribute {name} has {remaining} trailing bytes")]
    TrailingBytes { name: String, remaining: usize },
    #[error("{what} count {count} exceeds class-file limits")]
    TooMany { what: &'static str, count: usize },
}

pub type ClassFileResult<T> = Result<T, ClassFileError>;
