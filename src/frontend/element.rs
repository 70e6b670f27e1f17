//! Compiler view of a declaration
//!
//! Mirrors what an annotation processor sees after attribution: elements with
//! their modifiers (implicit ones included, as the compiler reports them) and
//! type mirrors that are already resolved, or `Error` when a dependency was
//! missing from the compile classpath. Declared names are dotted binary names
//! such as `com.example.Outer$Inner`.

use crate::model::{JavaString, TypeAnnotationTarget, TypePathEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ElementKind {
    pub fn is_interface(self) -> bool {
        matches!(self, ElementKind::Interface | ElementKind::Annotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingKind {
    TopLevel,
    Member,
    Local,
    Anonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    // Java 8: default interface method
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<TypeMirror>),
    Super(Box<TypeMirror>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMirror {
    Primitive(PrimitiveKind),
    Void,
    Declared {
        /// Dotted binary name, e.g. `java.util.Map$Entry`
        name: String,
        interface: bool,
        args: Vec<TypeMirror>,
        /// Parameterized enclosing type of an inner class (`Outer<T>.Inner`)
        outer: Option<Box<TypeMirror>>,
    },
    Array(Box<TypeMirror>),
    TypeVar(String),
    Wildcard(WildcardBound),
    /// A type the compiler could not resolve, as written in source
    Error(String),
}

impl TypeMirror {
    pub fn class(name: impl Into<String>) -> Self {
        TypeMirror::Declared { name: name.into(), interface: false, args: Vec::new(), outer: None }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        TypeMirror::Declared { name: name.into(), interface: true, args: Vec::new(), outer: None }
    }

    pub fn with_args(self, new_args: Vec<TypeMirror>) -> Self {
        match self {
            TypeMirror::Declared { name, interface, outer, .. } => {
                TypeMirror::Declared { name, interface, args: new_args, outer }
            }
            other => other,
        }
    }

    pub fn array_of(component: TypeMirror) -> Self {
        TypeMirror::Array(Box::new(component))
    }

    pub fn string() -> Self {
        TypeMirror::class("java.lang.String")
    }

    pub fn object() -> Self {
        TypeMirror::class("java.lang.Object")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterElement {
    pub name: String,
    /// Empty means `java.lang.Object`
    pub bounds: Vec<TypeMirror>,
}

impl TypeParameterElement {
    pub fn new(name: impl Into<String>, bounds: Vec<TypeMirror>) -> Self {
        Self { name: name.into(), bounds }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(JavaString),
    Class(TypeMirror),
    Enum { enum_type: TypeMirror, name: String },
    Annotation(AnnotationMirror),
    Array(Vec<ElementValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationMirror {
    pub annotation_type: TypeMirror,
    /// Explicitly written values only, in source order
    pub values: Vec<(String, ElementValue)>,
}

impl AnnotationMirror {
    pub fn new(annotation_type: TypeMirror) -> Self {
        Self { annotation_type, values: Vec::new() }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: ElementValue) -> Self {
        self.values.push((name.into(), value));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotationMirror {
    pub target: TypeAnnotationTarget,
    pub path: Vec<TypePathEntry>,
    pub annotation: AnnotationMirror,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableElement {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeMirror,
    pub enum_constant: bool,
    /// Compile-time constant of a `final` field with a constant initializer
    pub constant_value: Option<ElementValue>,
    pub deprecated: bool,
    pub annotations: Vec<AnnotationMirror>,
    pub type_annotations: Vec<TypeAnnotationMirror>,
}

impl VariableElement {
    pub fn new(name: impl Into<String>, modifiers: Vec<Modifier>, ty: TypeMirror) -> Self {
        Self {
            name: name.into(),
            modifiers,
            ty,
            enum_constant: false,
            constant_value: None,
            deprecated: false,
            annotations: Vec::new(),
            type_annotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterElement {
    pub name: String,
    pub is_final: bool,
    pub ty: TypeMirror,
    pub annotations: Vec<AnnotationMirror>,
}

impl ParameterElement {
    pub fn new(name: impl Into<String>, ty: TypeMirror) -> Self {
        Self { name: name.into(), is_final: false, ty, annotations: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    Constructor,
    Method,
    StaticInit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutableElement {
    pub kind: ExecutableKind,
    /// Ignored for constructors and static initializers
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub type_parameters: Vec<TypeParameterElement>,
    pub parameters: Vec<ParameterElement>,
    pub return_type: TypeMirror,
    pub thrown: Vec<TypeMirror>,
    pub varargs: bool,
    /// Default value of an annotation interface element
    pub default_value: Option<ElementValue>,
    pub deprecated: bool,
    pub annotations: Vec<AnnotationMirror>,
    pub type_annotations: Vec<TypeAnnotationMirror>,
}

impl ExecutableElement {
    pub fn method(name: impl Into<String>, modifiers: Vec<Modifier>, return_type: TypeMirror) -> Self {
        Self {
            kind: ExecutableKind::Method,
            name: name.into(),
            modifiers,
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type,
            thrown: Vec::new(),
            varargs: false,
            default_value: None,
            deprecated: false,
            annotations: Vec::new(),
            type_annotations: Vec::new(),
        }
    }

    pub fn constructor(modifiers: Vec<Modifier>) -> Self {
        Self {
            kind: ExecutableKind::Constructor,
            ..Self::method("<init>", modifiers, TypeMirror::Void)
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterElement) -> Self {
        self.parameters.push(parameter);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeElement {
    /// Dotted binary name, e.g. `com.example.Outer$Inner`
    pub binary_name: String,
    /// `None` for anonymous classes
    pub simple_name: Option<String>,
    pub kind: ElementKind,
    pub nesting: NestingKind,
    /// Binary name of the directly enclosing type, for nested classes
    pub enclosing_type: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub type_parameters: Vec<TypeParameterElement>,
    /// Type parameters of enclosing classes that are in scope
    pub outer_type_parameters: Vec<TypeParameterElement>,
    /// `None` only for `java.lang.Object` and interfaces
    pub superclass: Option<TypeMirror>,
    pub interfaces: Vec<TypeMirror>,
    pub deprecated: bool,
    pub annotations: Vec<AnnotationMirror>,
    pub type_annotations: Vec<TypeAnnotationMirror>,
    pub fields: Vec<VariableElement>,
    pub methods: Vec<ExecutableElement>,
    pub member_types: Vec<TypeElement>,
    /// Import declarations of the compilation unit, e.g. `java.util.List` or `java.util.*`
    pub imports: Vec<String>,
}

impl TypeElement {
    pub fn new(binary_name: impl Into<String>, kind: ElementKind, modifiers: Vec<Modifier>) -> Self {
        let binary_name = binary_name.into();
        let simple_name = binary_name
            .rsplit(|c| c == '.' || c == '$')
            .next()
            .map(str::to_string);
        let superclass = match kind {
            ElementKind::Class => Some(TypeMirror::object()),
            ElementKind::Enum => Some(
                TypeMirror::class("java.lang.Enum").with_args(vec![TypeMirror::class(binary_name.clone())]),
            ),
            ElementKind::Interface | ElementKind::Annotation => None,
        };
        let interfaces = match kind {
            ElementKind::Annotation => vec![TypeMirror::interface("java.lang.annotation.Annotation")],
            _ => Vec::new(),
        };
        Self {
            binary_name,
            simple_name,
            kind,
            nesting: NestingKind::TopLevel,
            enclosing_type: None,
            modifiers,
            type_parameters: Vec::new(),
            outer_type_parameters: Vec::new(),
            superclass,
            interfaces,
            deprecated: false,
            annotations: Vec::new(),
            type_annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            member_types: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Make this a member of `enclosing`
    pub fn nested_in(mut self, enclosing: impl Into<String>) -> Self {
        self.nesting = NestingKind::Member;
        self.enclosing_type = Some(enclosing.into());
        self
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Package part of the binary name in internal form, empty for the default package
    pub fn package(&self) -> &str {
        self.binary_name.rsplit_once('.').map_or("", |(package, _)| package)
    }

    /// Internal name, e.g. `com/example/Outer$Inner`
    pub fn internal_name(&self) -> String {
        internal_name(&self.binary_name)
    }
}

/// Convert a dotted binary name to internal form
pub fn internal_name(binary_name: &str) -> String {
    binary_name.replace('.', "/")
}
