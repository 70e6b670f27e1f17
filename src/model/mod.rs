//! Structural model of a class's ABI surface
//!
//! Plain value snapshots shared by both front ends, the filter, the orderer and
//! the emitter. Names are internal binary names (`com/example/A$B`).

pub mod annotation;
pub mod class;
pub mod member;
pub mod text;

pub use annotation::{
    Annotation, AnnotationValue, Retained, TypeAnnotation, TypeAnnotationTarget, TypePathEntry,
};
pub use class::{ClassModel, ClassStub, EnclosingMethod, InnerClassRef};
pub use member::{ConstantValue, FieldStub, MethodStub, ParameterStub};
pub use text::JavaString;
