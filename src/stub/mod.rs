//! The stub pipeline: filter, order, emit
//!
//! Front ends produce a [`ClassModel`]; everything after that is shared, so the
//! pipeline never knows which front end ran.

pub mod emit;
pub mod filter;
pub mod order;
pub mod references;

pub use emit::emit;
pub use filter::{filter, StubMember};
pub use order::order;

use crate::common::error::Result;
use crate::frontend::StubSource;
use crate::model::{ClassModel, ClassStub};

/// Filter and order a model; `None` for local and anonymous classes
pub fn canonical_stub(model: ClassModel) -> Option<ClassStub> {
    filter(model).map(order)
}

/// Run a model through the whole pipeline
pub fn stub_model(model: ClassModel) -> Result<Option<Vec<u8>>> {
    match canonical_stub(model) {
        Some(class) => emit(&class).map(Some),
        None => Ok(None),
    }
}

/// Read `input` with `source` and stub the result
pub fn extract<S: StubSource + ?Sized>(source: &S, input: &S::Input) -> Result<Option<Vec<u8>>> {
    let model = source.read_model(input)?;
    log::debug!("stubbing {}", model.class.name);
    stub_model(model)
}
