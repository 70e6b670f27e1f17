//! Classpath string resolution
//!
//! Priority order, same as javac:
//! 1. `--classpath`/`-cp` command line argument
//! 2. `CLASSPATH` environment variable
//! 3. empty (stubbing never needs the current directory implicitly)

use std::env;
use std::path::PathBuf;

pub struct ClasspathResolver;

impl ClasspathResolver {
    /// Resolve the classpath string from an explicit argument or the environment
    pub fn resolve_classpath(cp_arg: Option<&str>) -> String {
        if let Some(cp) = cp_arg {
            log::debug!("classpath from argument: {}", cp);
            return cp.to_string();
        }

        if let Ok(classpath_env) = env::var("CLASSPATH") {
            if !classpath_env.is_empty() {
                log::debug!("classpath from CLASSPATH: {}", classpath_env);
                return classpath_env;
            }
        }

        String::new()
    }

    /// Split a classpath string on the platform separator (`:` on Unix, `;` on Windows)
    pub fn parse_classpath_entries(classpath: &str) -> Vec<PathBuf> {
        if classpath.is_empty() {
            return vec![];
        }

        let separator = if cfg!(windows) { ';' } else { ':' };
        classpath
            .split(separator)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wins() {
        let result = ClasspathResolver::resolve_classpath(Some("/path/cp"));
        assert_eq!(result, "/path/cp");
    }

    #[test]
    fn test_parse_classpath_entries() {
        let separator = if cfg!(windows) { ";" } else { ":" };
        let joined = ["/path1", "/path2", " ", "/path3"].join(separator);
        let entries = ClasspathResolver::parse_classpath_entries(&joined);
        assert_eq!(
            entries,
            vec![PathBuf::from("/path1"), PathBuf::from("/path2"), PathBuf::from("/path3")]
        );
    }

    #[test]
    fn test_empty_classpath_has_no_entries() {
        assert!(ClasspathResolver::parse_classpath_entries("").is_empty());
    }
}
