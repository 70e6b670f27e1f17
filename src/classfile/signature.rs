//! JVMS 4.7.9.1 signatures: strict grammar check plus referenced-class collection

use crate::common::consts::SIGNATURE_MAX_ITERS;

use super::error::{ClassFileError, ClassFileResult};

/// Which grammar a `Signature` attribute must follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    Class,
    Field,
    Method,
}

/// Validate `signature` and return every class it names, in order of first
/// appearance. Inner classes written as `Outer<..>.Inner` are reported as
/// `Outer$Inner`.
pub fn referenced_classes(kind: SignatureKind, signature: &str) -> ClassFileResult<Vec<String>> {
    let mut parser = Parser::new(signature);
    match kind {
        SignatureKind::Class => parser.class_signature()?,
        SignatureKind::Field => parser.reference_type()?,
        SignatureKind::Method => parser.method_signature()?,
    }
    if !parser.eof() {
        return Err(parser.error());
    }
    Ok(parser.classes)
}

pub fn validate(kind: SignatureKind, signature: &str) -> ClassFileResult<()> {
    referenced_classes(kind, signature).map(drop)
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    steps: usize,
    classes: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, chars: source.chars().peekable(), steps: 0, classes: Vec::new() }
    }

    fn error(&self) -> ClassFileError {
        ClassFileError::InvalidSignature(self.source.to_string())
    }

    // Safety cap: every loop iteration of the grammar counts one step
    fn step(&mut self) -> ClassFileResult<()> {
        self.steps += 1;
        if self.steps > SIGNATURE_MAX_ITERS {
            return Err(self.error());
        }
        Ok(())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eof(&mut self) -> bool {
        self.peek().is_none()
    }

    fn consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> ClassFileResult<()> {
        if self.consume(c) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn identifier(&mut self) -> ClassFileResult<String> {
        let mut identifier = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | ':') {
                break;
            }
            self.step()?;
            identifier.push(c);
            self.chars.next();
        }
        if identifier.is_empty() {
            return Err(self.error());
        }
        Ok(identifier)
    }

    fn record(&mut self, name: String) {
        if !self.classes.contains(&name) {
            self.classes.push(name);
        }
    }

    fn class_signature(&mut self) -> ClassFileResult<()> {
        if self.peek() == Some('<') {
            self.type_parameters()?;
        }
        // superclass, then superinterfaces
        self.class_type()?;
        while !self.eof() {
            self.step()?;
            self.class_type()?;
        }
        Ok(())
    }

    fn method_signature(&mut self) -> ClassFileResult<()> {
        if self.peek() == Some('<') {
            self.type_parameters()?;
        }
        self.expect('(')?;
        while !self.consume(')') {
            self.step()?;
            self.java_type()?;
        }
        if !self.consume('V') {
            self.java_type()?;
        }
        while self.consume('^') {
            self.step()?;
            if self.peek() == Some('T') {
                self.type_variable()?;
            } else {
                self.class_type()?;
            }
        }
        Ok(())
    }

    fn type_parameters(&mut self) -> ClassFileResult<()> {
        self.expect('<')?;
        loop {
            self.step()?;
            self.identifier()?;
            self.expect(':')?;
            // class bound may be empty when only interface bounds follow
            if !matches!(self.peek(), Some(':') | Some('>')) {
                self.reference_type()?;
            }
            while self.consume(':') {
                self.step()?;
                self.reference_type()?;
            }
            if self.consume('>') {
                return Ok(());
            }
        }
    }

    fn java_type(&mut self) -> ClassFileResult<()> {
        match self.peek() {
            Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => {
                self.chars.next();
                Ok(())
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> ClassFileResult<()> {
        match self.peek() {
            Some('L') => self.class_type(),
            Some('T') => self.type_variable(),
            Some('[') => {
                self.chars.next();
                self.java_type()
            }
            _ => Err(self.error()),
        }
    }

    fn type_variable(&mut self) -> ClassFileResult<()> {
        self.expect('T')?;
        self.identifier()?;
        self.expect(';')
    }

    fn class_type(&mut self) -> ClassFileResult<()> {
        self.expect('L')?;
        let mut name = self.identifier()?;
        while self.consume('/') {
            self.step()?;
            name.push('/');
            name.push_str(&self.identifier()?);
        }
        self.record(name.clone());
        if self.peek() == Some('<') {
            self.type_arguments()?;
        }
        while self.consume('.') {
            self.step()?;
            name.push('$');
            name.push_str(&self.identifier()?);
            self.record(name.clone());
            if self.peek() == Some('<') {
                self.type_arguments()?;
            }
        }
        self.expect(';')
    }

    fn type_arguments(&mut self) -> ClassFileResult<()> {
        self.expect('<')?;
        loop {
            self.step()?;
            match self.peek() {
                Some('*') => {
                    self.chars.next();
                }
                Some('+' | '-') => {
                    self.chars.next();
                    self.reference_type()?;
                }
                _ => self.reference_type()?,
            }
            if self.consume('>') {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_signature_with_bounds() {
        let signature = "<T:Ljava/lang/Object;U::Ljava/lang/Comparable<TU;>;>Ljava/lang/Object;Ljava/util/List<TT;>;";
        let classes = referenced_classes(SignatureKind::Class, signature).unwrap();
        assert_eq!(classes, ["java/lang/Object", "java/lang/Comparable", "java/util/List"]);
    }

    #[test]
    fn inner_class_through_parameterized_outer() {
        let classes = referenced_classes(SignatureKind::Field, "Lp/Outer<TT;>.Inner<*>;").unwrap();
        assert_eq!(classes, ["p/Outer", "p/Outer$Inner"]);
    }

    #[test]
    fn method_signature_with_throws() {
        let signature = "<X:Ljava/lang/Exception;>(Ljava/util/List<+Ljava/lang/Number;>;[I)V^TX;^Ljava/io/IOException;";
        let classes = referenced_classes(SignatureKind::Method, signature).unwrap();
        assert_eq!(
            classes,
            ["java/lang/Exception", "java/util/List", "java/lang/Number", "java/io/IOException"]
        );
    }

    #[test]
    fn rejects_malformed_signatures() {
        assert!(validate(SignatureKind::Field, "I").is_err());
        assert!(validate(SignatureKind::Field, "Ljava/util/List<>;").is_err());
        assert!(validate(SignatureKind::Field, "Ljava/util/List<TT;>").is_err());
        assert!(validate(SignatureKind::Method, "()").is_err());
        assert!(validate(SignatureKind::Class, "<T>Ljava/lang/Object;").is_err());
        assert!(validate(SignatureKind::Field, "TT;x").is_err());
    }

    #[test]
    fn primitive_arrays_are_reference_types() {
        assert!(validate(SignatureKind::Field, "[I").is_ok());
        assert!(validate(SignatureKind::Field, "[[TT;").is_ok());
    }
}
