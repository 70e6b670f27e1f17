//! Structural verifier for emitted stubs
//!
//! Runs over the raw `ClassFile` just before serialization and rejects
//! anything a JVM or compiler would refuse to load: dangling or mistyped
//! constant-pool indices, illegal flag combinations, malformed descriptors
//! and signatures, and executable or debug attributes that have no place in a
//! stub.

mod attributes;
pub mod class_access_flags;
pub mod constant_pool;
pub mod fields;
pub mod interfaces;
pub mod method_access_flags;
pub mod methods;
mod verifier;

pub use verifier::{verify, VerifyError, VerifyResult};
