//! Field and method stubs

use serde::Serialize;

use super::annotation::{Annotation, AnnotationValue, Retained, TypeAnnotation};
use super::text::JavaString;

/// Compile-time constant of a `final` field.
///
/// Booleans, bytes, chars and shorts are stored as `Int`, as the class file does.
#[derive(Debug, Clone, Serialize)]
pub enum ConstantValue {
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(JavaString),
}

impl PartialEq for ConstantValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstantValue::Int(a), ConstantValue::Int(b)) => a == b,
            (ConstantValue::Float(a), ConstantValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::Long(a), ConstantValue::Long(b)) => a == b,
            (ConstantValue::Double(a), ConstantValue::Double(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::String(a), ConstantValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConstantValue {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub constant_value: Option<ConstantValue>,
    pub deprecated: bool,
    pub annotations: Retained<Annotation>,
    pub type_annotations: Retained<TypeAnnotation>,
}

impl FieldStub {
    pub fn new(access_flags: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access_flags,
            name: name.into(),
            descriptor: descriptor.into(),
            signature: None,
            constant_value: None,
            deprecated: false,
            annotations: Retained::default(),
            type_annotations: Retained::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterStub {
    pub access_flags: u16,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names of declared thrown types, in declaration order
    pub exceptions: Vec<String>,
    /// Empty unless the class carries `MethodParameters` data
    pub parameters: Vec<ParameterStub>,
    pub deprecated: bool,
    pub annotations: Retained<Annotation>,
    pub type_annotations: Retained<TypeAnnotation>,
    /// One list per parameter; an empty outer list means no attribute
    pub parameter_annotations: Retained<Vec<Annotation>>,
    pub annotation_default: Option<AnnotationValue>,
}

impl MethodStub {
    pub fn new(access_flags: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access_flags,
            name: name.into(),
            descriptor: descriptor.into(),
            signature: None,
            exceptions: Vec::new(),
            parameters: Vec::new(),
            deprecated: false,
            annotations: Retained::default(),
            type_annotations: Retained::default(),
            parameter_annotations: Retained::default(),
            annotation_default: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_values_compare_structurally() {
        assert_eq!(ConstantValue::Double(f64::NAN), ConstantValue::Double(f64::NAN));
        assert_ne!(ConstantValue::Int(1), ConstantValue::Long(1));
        assert_eq!(ConstantValue::String("a".into()), ConstantValue::String("a".into()));
    }

    #[test]
    fn new_members_carry_no_optional_data() {
        let method = MethodStub::new(0x0001, "run", "()V");
        assert!(method.exceptions.is_empty());
        assert!(method.parameter_annotations.is_empty());
        assert!(method.annotation_default.is_none());
        let field = FieldStub::new(0x0019, "X", "I");
        assert!(field.constant_value.is_none());
    }
}
