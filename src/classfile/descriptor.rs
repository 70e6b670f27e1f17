//! Field and method descriptors (JVMS 4.3)

use super::error::{ClassFileError, ClassFileResult};

/// Maximum array dimensions allowed by the JVM
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// One of `B C D F I J S Z`
    Base(char),
    /// Internal class name, without the `L` and `;`
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> ClassFileResult<Self> {
        let mut cursor = Cursor::new(descriptor);
        let field_type = cursor.field_type()?;
        cursor.finish()?;
        Ok(field_type)
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            FieldType::Base(c) => out.push(*c),
            FieldType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            FieldType::Array(component) => {
                out.push('[');
                component.write_descriptor(out);
            }
        }
    }

    /// Innermost class name, if the type is a class or an array of one
    pub fn class_name(&self) -> Option<&str> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Object(name) => Some(name),
            FieldType::Array(component) => component.class_name(),
        }
    }

    /// Long and double take two local/parameter slots
    pub fn is_wide(&self) -> bool {
        matches!(self, FieldType::Base('J') | FieldType::Base('D'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `void`
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> ClassFileResult<Self> {
        let mut cursor = Cursor::new(descriptor);
        cursor.expect('(')?;
        let mut parameters = Vec::new();
        while cursor.peek() != Some(')') {
            parameters.push(cursor.field_type()?);
        }
        cursor.expect(')')?;
        let return_type = if cursor.peek() == Some('V') {
            cursor.bump();
            None
        } else {
            Some(cursor.field_type()?)
        };
        cursor.finish()?;
        Ok(Self { parameters, return_type })
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for parameter in &self.parameters {
            parameter.write_descriptor(&mut out);
        }
        out.push(')');
        match &self.return_type {
            Some(return_type) => return_type.write_descriptor(&mut out),
            None => out.push('V'),
        }
        out
    }

    /// Class names mentioned by parameters and the return type
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .chain(self.return_type.iter())
            .filter_map(FieldType::class_name)
    }
}

/// Check an internal class name such as `java/lang/String` or `a/B$C`
pub fn validate_internal_name(name: &str) -> ClassFileResult<()> {
    let valid = !name.is_empty()
        && name.split('/').all(|segment| {
            !segment.is_empty() && !segment.contains(&['.', ';', '[', '<', '>'][..])
        });
    if valid {
        Ok(())
    } else {
        Err(ClassFileError::InvalidDescriptor(name.to_string()))
    }
}

/// Check an unqualified member name (JVMS 4.2.2); `<init>`/`<clinit>` are
/// accepted only for methods
pub fn validate_member_name(name: &str, is_method: bool) -> ClassFileResult<()> {
    if is_method && (name == "<init>" || name == "<clinit>") {
        return Ok(());
    }
    let forbidden: &[char] = if is_method { &['.', ';', '[', '/', '<', '>'] } else { &['.', ';', '[', '/'] };
    if name.is_empty() || name.contains(forbidden) {
        return Err(ClassFileError::InvalidDescriptor(name.to_string()));
    }
    Ok(())
}

struct Cursor<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, chars: source.chars().peekable() }
    }

    fn error(&self) -> ClassFileError {
        ClassFileError::InvalidDescriptor(self.source.to_string())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn expect(&mut self, c: char) -> ClassFileResult<()> {
        if self.bump() == Some(c) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&mut self) -> ClassFileResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error()),
        }
    }

    fn field_type(&mut self) -> ClassFileResult<FieldType> {
        let mut dimensions = 0;
        while self.peek() == Some('[') {
            self.bump();
            dimensions += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(self.error());
        }
        let mut field_type = match self.bump() {
            Some(c @ ('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z')) => FieldType::Base(c),
            Some('L') => {
                let mut name = String::new();
                loop {
                    match self.bump() {
                        Some(';') => break,
                        Some(c) => name.push(c),
                        None => return Err(self.error()),
                    }
                }
                validate_internal_name(&name).map_err(|_| self.error())?;
                FieldType::Object(name)
            }
            _ => return Err(self.error()),
        };
        for _ in 0..dimensions {
            field_type = FieldType::Array(Box::new(field_type));
        }
        Ok(field_type)
    }
}
