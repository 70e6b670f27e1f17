//! Class- and member-level inclusion rules

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::classfile::defs::STATIC_INITIALIZER_METHOD_NAME;
use crate::classfile::flag::{access_flags, has};
use crate::common::consts::INNER_CLASS_MAX_CHAIN;
use crate::model::{ClassModel, ClassStub, FieldStub, InnerClassRef, MethodStub};

use super::references::referenced_types;

/// A field, method or inner-class row as seen by the filter and the orderer
pub trait StubMember {
    fn name(&self) -> &str;

    fn access_flags(&self) -> u16;

    /// Canonical ordering key; compared by UTF-16 code units, first part first
    fn sort_key(&self) -> (Cow<'_, str>, &str);

    /// Whether the member belongs to the ABI surface at all
    fn is_abi_visible(&self) -> bool {
        let flags = self.access_flags();
        !has(flags, access_flags::ACC_PRIVATE) && !has(flags, access_flags::ACC_SYNTHETIC)
    }
}

impl StubMember for FieldStub {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_flags(&self) -> u16 {
        self.access_flags
    }

    fn sort_key(&self) -> (Cow<'_, str>, &str) {
        (Cow::Borrowed(&self.name), &self.descriptor)
    }
}

impl StubMember for MethodStub {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_flags(&self) -> u16 {
        self.access_flags
    }

    fn sort_key(&self) -> (Cow<'_, str>, &str) {
        (Cow::Owned(format!("{}:{}", self.name, self.descriptor)), "")
    }

    fn is_abi_visible(&self) -> bool {
        let flags = self.access_flags;
        self.name != STATIC_INITIALIZER_METHOD_NAME
            && !has(flags, access_flags::ACC_PRIVATE)
            && !has(flags, access_flags::ACC_SYNTHETIC)
            && !has(flags, access_flags::ACC_BRIDGE)
    }
}

impl StubMember for InnerClassRef {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_flags(&self) -> u16 {
        self.access_flags
    }

    fn sort_key(&self) -> (Cow<'_, str>, &str) {
        (Cow::Borrowed(&self.name), "")
    }

    fn is_abi_visible(&self) -> bool {
        self.is_named_member()
            && !has(self.access_flags, access_flags::ACC_PRIVATE)
            && !has(self.access_flags, access_flags::ACC_SYNTHETIC)
    }
}

/// Keep only the members that are part of the ABI
pub fn retain_visible<M: StubMember>(members: &mut Vec<M>) {
    members.retain(M::is_abi_visible);
}

/// Turn a front-end model into a stub, or `None` for local/anonymous classes
pub fn filter(model: ClassModel) -> Option<ClassStub> {
    if model.is_local_or_anonymous() {
        log::debug!("dropping local or anonymous class {}", model.class.name);
        return None;
    }

    let mut class = model.class;
    retain_visible(&mut class.fields);
    retain_visible(&mut class.methods);

    for field in &mut class.fields {
        if !has(field.access_flags, access_flags::ACC_FINAL) {
            field.constant_value = None;
        }
    }

    prune_inner_classes(&mut class);
    Some(class)
}

/// Keep the class's own row, its enclosing chain, its non-private direct
/// members and every nested type the retained surface mentions, together with
/// the enclosing chains of those types.
fn prune_inner_classes(class: &mut ClassStub) {
    let rows = std::mem::take(&mut class.inner_classes);
    let named: Vec<InnerClassRef> = rows.into_iter().filter(InnerClassRef::is_named_member).collect();

    let mut keep: BTreeSet<String> = referenced_types(class);
    keep.insert(class.name.clone());

    // close over outer classes: a kept nested type needs its enclosing rows
    for _ in 0..INNER_CLASS_MAX_CHAIN {
        let outers: Vec<String> = named
            .iter()
            .filter(|row| keep.contains(&row.name))
            .filter_map(|row| row.outer_name.clone())
            .filter(|outer| !keep.contains(outer))
            .collect();
        if outers.is_empty() {
            break;
        }
        keep.extend(outers);
    }

    class.inner_classes = named
        .into_iter()
        .filter(|row| {
            keep.contains(&row.name)
                || (row.outer_name.as_deref() == Some(class.name.as_str()) && row.is_abi_visible())
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConstantValue;

    fn inner(name: &str, outer: Option<&str>, simple: Option<&str>, flags: u16) -> InnerClassRef {
        InnerClassRef {
            name: name.into(),
            outer_name: outer.map(str::to_string),
            inner_name: simple.map(str::to_string),
            access_flags: flags,
        }
    }

    fn model() -> ClassModel {
        let mut class = ClassStub::new("p/A", 52, 0, access_flags::ACC_PUBLIC | access_flags::ACC_SUPER);
        class.super_name = Some("java/lang/Object".into());
        ClassModel::new(class)
    }

    #[test]
    fn drops_private_clinit_synthetic_and_bridge_methods() {
        let mut model = model();
        model.class.methods = vec![
            MethodStub::new(access_flags::ACC_PUBLIC, "run", "()V"),
            MethodStub::new(access_flags::ACC_PRIVATE, "helper", "()V"),
            MethodStub::new(access_flags::ACC_STATIC, "<clinit>", "()V"),
            MethodStub::new(access_flags::ACC_SYNTHETIC | access_flags::ACC_STATIC, "access$000", "()V"),
            MethodStub::new(
                access_flags::ACC_PUBLIC | access_flags::ACC_BRIDGE | access_flags::ACC_SYNTHETIC,
                "compareTo",
                "(Ljava/lang/Object;)I",
            ),
            MethodStub::new(0, "packagePrivate", "()V"),
            MethodStub::new(access_flags::ACC_PROTECTED, "hook", "()V"),
        ];
        let stub = filter(model).unwrap();
        let names: Vec<_> = stub.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["run", "packagePrivate", "hook"]);
    }

    #[test]
    fn constant_values_survive_only_on_final_fields() {
        let mut model = model();
        let mut constant = FieldStub::new(access_flags::ACC_PUBLIC | access_flags::ACC_FINAL, "K", "I");
        constant.constant_value = Some(ConstantValue::Int(42));
        let mut mutable = FieldStub::new(access_flags::ACC_PUBLIC | access_flags::ACC_STATIC, "m", "I");
        mutable.constant_value = Some(ConstantValue::Int(7));
        model.class.fields = vec![constant, mutable];

        let stub = filter(model).unwrap();
        assert_eq!(stub.fields[0].constant_value, Some(ConstantValue::Int(42)));
        assert_eq!(stub.fields[1].constant_value, None);
    }

    #[test]
    fn anonymous_class_is_dropped() {
        let mut model = model();
        model.class.name = "p/A$1".into();
        model.class.inner_classes.push(inner("p/A$1", None, None, 0));
        assert!(filter(model).is_none());
    }

    #[test]
    fn inner_class_table_is_pruned_to_the_surface() {
        let mut model = model();
        model.class.inner_classes = vec![
            inner("p/A$Member", Some("p/A"), Some("Member"), access_flags::ACC_PUBLIC | access_flags::ACC_STATIC),
            inner("p/A$Hidden", Some("p/A"), Some("Hidden"), access_flags::ACC_PRIVATE | access_flags::ACC_STATIC),
            inner("p/A$1", None, None, 0),
            inner("p/A$1Local", None, Some("Local"), 0),
            inner("q/Other$Used", Some("q/Other"), Some("Used"), access_flags::ACC_PUBLIC),
            inner("q/Other$Body", Some("q/Other"), Some("Body"), access_flags::ACC_PUBLIC),
        ];
        model
            .class
            .methods
            .push(MethodStub::new(access_flags::ACC_PUBLIC, "use", "(Lq/Other$Used;)V"));

        let stub = filter(model).unwrap();
        let names: Vec<_> = stub.inner_classes.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["p/A$Member", "q/Other$Used"]);
    }

    #[test]
    fn own_row_and_enclosing_chain_are_kept() {
        let mut model = model();
        model.class.name = "p/A$B$C".into();
        model.class.access_flags = access_flags::ACC_PUBLIC | access_flags::ACC_SUPER;
        model.class.inner_classes = vec![
            inner("p/A$B", Some("p/A"), Some("B"), access_flags::ACC_PRIVATE | access_flags::ACC_STATIC),
            inner("p/A$B$C", Some("p/A$B"), Some("C"), access_flags::ACC_PUBLIC | access_flags::ACC_STATIC),
            inner("p/A$Sibling", Some("p/A"), Some("Sibling"), access_flags::ACC_PUBLIC),
        ];
        let stub = filter(model).unwrap();
        let names: Vec<_> = stub.inner_classes.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["p/A$B", "p/A$B$C"]);
    }
}
