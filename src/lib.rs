//! stubjar
//!
//! Deterministic ABI stub extraction for JVM classes.
//!
//! ## Architecture
//!
//! A stub keeps exactly what a caller compiles against: the class header,
//! non-private members, signatures, constants, annotations and the inner-class
//! entries those mention. Method bodies and private detail are gone, so any
//! change that leaves the stub byte-identical is ABI-safe.
//!
//! - **frontend**: produce a structural model from class-file bytes or from
//!   compiler semantic elements
//! - **stub**: filter, order and emit the model
//! - **classfile**: class-file codec shared by reading and emitting
//! - **verify**: structural checks on every emitted stub
//! - **jar**: stub whole archives reproducibly
//!
//! ```text
//! class bytes ─┐
//!              ├→ ClassModel → filter → order → emit → stub bytes
//! TypeElement ─┘
//! ```

pub mod classfile;
pub mod common;
pub mod frontend;
pub mod jar;
pub mod model;
pub mod stub;
pub mod verify;

pub use common::{Config, Error, Result};
pub use frontend::{BytecodeFrontEnd, ResolutionContext, SemanticFrontEnd, StubSource};
pub use jar::{StubJar, StubReport};

use frontend::element::TypeElement;
use model::ClassStub;

/// Stub one compiled class; `None` when the class is local or anonymous
pub fn stub_class_bytes(bytes: &[u8]) -> Result<Option<Vec<u8>>> {
    stub::extract(&BytecodeFrontEnd, bytes)
}

/// The filtered, ordered model of one compiled class, before emission
pub fn canonical_class(bytes: &[u8]) -> Result<Option<ClassStub>> {
    let model = BytecodeFrontEnd.read_model(bytes)?;
    Ok(stub::canonical_stub(model))
}

/// Stub one semantic element; `None` when the class is local or anonymous
pub fn stub_element(element: &TypeElement, context: &ResolutionContext, config: &Config) -> Result<Option<Vec<u8>>> {
    stub::extract(&SemanticFrontEnd::new(context, config), element)
}

/// Stub an element and, recursively, its member types. Member types inherit
/// the imports of the compilation unit. Results are keyed by internal name.
pub fn stub_element_tree(
    element: &TypeElement,
    context: &ResolutionContext,
    config: &Config,
) -> Vec<(String, Result<Option<Vec<u8>>>)> {
    let mut results = Vec::new();
    collect_element_stubs(element, &element.imports, context, config, &mut results);
    results
}

fn collect_element_stubs(
    element: &TypeElement,
    imports: &[String],
    context: &ResolutionContext,
    config: &Config,
    results: &mut Vec<(String, Result<Option<Vec<u8>>>)>,
) {
    let result = if element.imports.is_empty() && !imports.is_empty() {
        let mut scoped = element.clone();
        scoped.imports = imports.to_vec();
        stub_element(&scoped, context, config)
    } else {
        stub_element(element, context, config)
    };
    results.push((element.internal_name(), result));
    for member in &element.member_types {
        collect_element_stubs(member, imports, context, config, results);
    }
}
