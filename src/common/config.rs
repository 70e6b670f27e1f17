//! Extraction settings shared by the front ends and the archive driver

use crate::classfile::defs::major_versions;

/// Stub extraction configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Class-file major version stamped on models built from semantic elements
    pub target_major_version: u16,
    /// Class-file minor version stamped on models built from semantic elements
    pub target_minor_version: u16,
    /// Mirror of the compiler's `-parameters` flag
    pub emit_parameter_names: bool,
    /// Degrade unresolved types to best-effort names instead of failing
    pub allow_missing_dependencies: bool,
    /// Stub archive entries on the rayon thread pool
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_major_version: major_versions::JAVA_8,
            target_minor_version: 0,
            emit_parameter_names: false,
            allow_missing_dependencies: true,
            parallel: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_version(mut self, major: u16, minor: u16) -> Self {
        self.target_major_version = major;
        self.target_minor_version = minor;
        self
    }

    pub fn with_parameter_names(mut self, enabled: bool) -> Self {
        self.emit_parameter_names = enabled;
        self
    }

    pub fn with_missing_dependencies_allowed(mut self, allowed: bool) -> Self {
        self.allow_missing_dependencies = allowed;
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
