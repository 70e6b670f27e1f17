//! Java string values

use std::fmt;

use serde::{Serialize, Serializer};

/// A `java.lang.String` value as UTF-16 code units.
///
/// Java strings may hold unpaired surrogates (`"\uD800"` is a legal literal),
/// which a Rust `String` cannot represent. Constant and annotation string values
/// keep the exact units so they round-trip through a stub unchanged.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct JavaString {
    units: Vec<u16>,
}

impl JavaString {
    pub fn from_units(units: Vec<u16>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The value as a Rust string, if it has no unpaired surrogates
    pub fn to_rust_string(&self) -> Option<String> {
        String::from_utf16(&self.units).ok()
    }

    /// The value with unpaired surrogates replaced by U+FFFD
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

impl From<&str> for JavaString {
    fn from(value: &str) -> Self {
        Self { units: value.encode_utf16().collect() }
    }
}

impl From<String> for JavaString {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in char::decode_utf16(self.units.iter().copied()) {
            match c {
                Ok(c) => write!(f, "{}", c)?,
                Err(unpaired) => write!(f, "\\u{:04X}", unpaired.unpaired_surrogate())?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl Serialize for JavaString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_strings_convert_losslessly() {
        let text = JavaString::from("a\u{1F600}");
        assert_eq!(text.len(), 3);
        assert_eq!(text.to_rust_string().as_deref(), Some("a\u{1F600}"));
    }

    #[test]
    fn unpaired_surrogates_are_kept_and_escaped_for_display() {
        let text = JavaString::from_units(vec![0x61, 0xD800]);
        assert_eq!(text.to_rust_string(), None);
        assert_eq!(text.to_string(), "a\\uD800");
        assert_eq!(text.to_string_lossy(), "a\u{FFFD}");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"a\\\\uD800\"");
    }
}
