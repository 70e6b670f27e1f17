//! Extraction front ends
//!
//! Both front ends produce the same unfiltered [`ClassModel`]: one from
//! compiled class files, one from compiler semantic elements.

pub mod bytecode;
pub mod context;
pub mod element;
pub mod semantic;

pub use bytecode::BytecodeFrontEnd;
pub use context::{ResolutionContext, TypeSymbol};
pub use semantic::SemanticFrontEnd;

use crate::common::error::Result;
use crate::model::ClassModel;

/// A producer of structural models
pub trait StubSource {
    type Input: ?Sized;

    fn read_model(&self, input: &Self::Input) -> Result<ClassModel>;
}
