//! Common utilities and definitions shared across modules
//!
//! Configuration, error definitions, safety caps and classpath string handling
//! used by the front ends, the stub pipeline and the archive driver.

pub mod classpath;
pub mod config;
pub mod consts;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
