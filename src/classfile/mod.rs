//! Minimal class-file codec
//!
//! Reads compiled classes into raw structures with a bounds-checked cursor and
//! writes them back with the `ClassfileWritable` trait. Descriptor, signature
//! and annotation payloads have their own modules.

pub mod annotation;
pub mod attribute;
pub mod class;
pub mod constpool;
pub mod defs;
pub mod descriptor;
pub mod error;
pub mod flag;
pub mod member;
pub mod reader;
pub mod signature;
pub mod writer;

pub use attribute::AttributeInfo;
pub use class::ClassFile;
pub use constpool::{Constant, ConstantPool};
pub use error::{ClassFileError, ClassFileResult};
pub use member::{FieldInfo, MethodInfo};
pub use reader::ClassReader;
pub use writer::ClassfileWritable;
