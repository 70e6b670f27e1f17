//! Annotations, element values and type annotations

use serde::Serialize;

use super::text::JavaString;

/// A visible/invisible pair, mirroring the class file's split between
/// `RuntimeVisible*` and `RuntimeInvisible*` attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Retained<T> {
    pub visible: Vec<T>,
    pub invisible: Vec<T>,
}

impl<T> Default for Retained<T> {
    fn default() -> Self {
        Self { visible: Vec::new(), invisible: Vec::new() }
    }
}

impl<T> Retained<T> {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.invisible.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().chain(self.invisible.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Field descriptor of the annotation interface, e.g. `Lcom/example/Foo;`
    pub type_descriptor: String,
    /// Element name/value pairs in the order they were written
    pub values: Vec<(String, AnnotationValue)>,
}

impl Annotation {
    pub fn new(type_descriptor: impl Into<String>) -> Self {
        Self { type_descriptor: type_descriptor.into(), values: Vec::new() }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: AnnotationValue) -> Self {
        self.values.push((name.into(), value));
        self
    }
}

/// Constant value of an annotation element
#[derive(Debug, Clone, Serialize)]
pub enum AnnotationValue {
    Byte(i8),
    /// UTF-16 code unit, as stored in the class file
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(JavaString),
    /// Class literal, stored as a return descriptor (`V` for `void.class`)
    Class(String),
    Enum { type_descriptor: String, name: String },
    Annotation(Annotation),
    Array(Vec<AnnotationValue>),
}

impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        use AnnotationValue::*;
        match (self, other) {
            (Byte(a), Byte(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            // bit patterns keep NaN == NaN and -0.0 != 0.0
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Class(a), Class(b)) => a == b,
            (
                Enum { type_descriptor: ta, name: na },
                Enum { type_descriptor: tb, name: nb },
            ) => ta == tb && na == nb,
            (Annotation(a), Annotation(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AnnotationValue {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAnnotation {
    pub target: TypeAnnotationTarget,
    pub path: Vec<TypePathEntry>,
    pub annotation: Annotation,
}

/// Targets that can occur outside method bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeAnnotationTarget {
    ClassTypeParameter(u8),
    MethodTypeParameter(u8),
    /// Index into the interfaces list; `0xFFFF` is the superclass
    Supertype(u16),
    ClassTypeParameterBound { parameter: u8, bound: u8 },
    MethodTypeParameterBound { parameter: u8, bound: u8 },
    Field,
    Return,
    Receiver,
    FormalParameter(u8),
    Throws(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypePathEntry {
    pub kind: u8,
    pub argument_index: u8,
}
