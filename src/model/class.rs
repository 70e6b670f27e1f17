//! Class-level stub and the unfiltered front-end product

use serde::Serialize;

use super::annotation::{Annotation, Retained, TypeAnnotation};
use super::member::{FieldStub, MethodStub};

/// One row of the `InnerClasses` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InnerClassRef {
    pub name: String,
    pub outer_name: Option<String>,
    /// Simple name; `None` for anonymous classes
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl InnerClassRef {
    /// Anonymous and local classes lack an outer name or a simple name
    pub fn is_named_member(&self) -> bool {
        self.outer_name.is_some() && self.inner_name.is_some()
    }
}

/// ABI surface of a single named class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassStub {
    pub name: String,
    pub major_version: u16,
    pub minor_version: u16,
    pub access_flags: u16,
    pub deprecated: bool,
    pub signature: Option<String>,
    /// `None` only for `java/lang/Object`
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub annotations: Retained<Annotation>,
    pub type_annotations: Retained<TypeAnnotation>,
    pub inner_classes: Vec<InnerClassRef>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<MethodStub>,
}

impl ClassStub {
    pub fn new(name: impl Into<String>, major_version: u16, minor_version: u16, access_flags: u16) -> Self {
        Self {
            name: name.into(),
            major_version,
            minor_version,
            access_flags,
            deprecated: false,
            signature: None,
            super_name: None,
            interfaces: Vec::new(),
            annotations: Retained::default(),
            type_annotations: Retained::default(),
            inner_classes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The row of the inner-class table describing this class itself
    pub fn own_inner_entry(&self) -> Option<&InnerClassRef> {
        self.inner_classes.iter().find(|inner| inner.name == self.name)
    }
}

/// `EnclosingMethod` reference of a local or anonymous class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnclosingMethod {
    pub owner: String,
    /// Name and descriptor; `None` when declared in an initializer
    pub method: Option<(String, String)>,
}

/// Unfiltered front-end output.
///
/// May still hold private members, `<clinit>`, synthetic or bridge members and
/// every inner-class row the compiler wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    pub class: ClassStub,
    pub enclosing_method: Option<EnclosingMethod>,
}

impl ClassModel {
    pub fn new(class: ClassStub) -> Self {
        Self { class, enclosing_method: None }
    }

    /// Local and anonymous classes never produce a stub
    pub fn is_local_or_anonymous(&self) -> bool {
        if self.enclosing_method.is_some() {
            return true;
        }
        matches!(self.class.own_inner_entry(), Some(own) if own.inner_name.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_entry_without_simple_name_is_anonymous() {
        let mut class = ClassStub::new("p/A$1", 52, 0, 0x0020);
        class.inner_classes.push(InnerClassRef {
            name: "p/A$1".into(),
            outer_name: None,
            inner_name: None,
            access_flags: 0,
        });
        assert!(ClassModel::new(class).is_local_or_anonymous());
    }

    #[test]
    fn enclosing_method_marks_local_class() {
        let mut model = ClassModel::new(ClassStub::new("p/A$1Local", 52, 0, 0x0020));
        assert!(!model.is_local_or_anonymous());
        model.enclosing_method = Some(EnclosingMethod {
            owner: "p/A".into(),
            method: Some(("run".into(), "()V".into())),
        });
        assert!(model.is_local_or_anonymous());
    }

    #[test]
    fn member_class_is_named() {
        let inner = InnerClassRef {
            name: "p/A$B".into(),
            outer_name: Some("p/A".into()),
            inner_name: Some("B".into()),
            access_flags: 0x0009,
        };
        assert!(inner.is_named_member());
    }
}
