use thiserror::Error;

use crate::classfile::error::ClassFileError;

/// Result type for stub extraction
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stub extraction.
///
/// Every per-class variant names the class it belongs to so that a batch
/// driver can report failures without aborting sibling extractions.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Malformed input in {class}: {message}")]
    MalformedInput { class: String, message: String },

    #[error("Unresolved dependency in {class}: cannot resolve {type_name}")]
    UnresolvedDependency { class: String, type_name: String },

    #[error("Unsupported construct in {class}: {construct}")]
    UnsupportedConstruct { class: String, construct: String },
}

impl Error {
    /// Create a malformed-input error for a class
    pub fn malformed(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Create an unresolved-dependency error
    pub fn unresolved(class: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnresolvedDependency {
            class: class.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an unsupported-construct error
    pub fn unsupported(class: impl Into<String>, construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            class: class.into(),
            construct: construct.into(),
        }
    }

    /// Wrap a codec failure as malformed input of `class`
    pub fn from_class_file(class: impl Into<String>, err: ClassFileError) -> Self {
        Self::malformed(class, err.to_string())
    }
}
