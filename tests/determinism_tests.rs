mod common;

use common::{greeter, ClassBuilder, GreeterVariant};
use stubjar::classfile::flag::access_flags::*;
use stubjar::stub_class_bytes;

fn stub(variant: GreeterVariant<'_>) -> Vec<u8> {
    stub_class_bytes(&greeter(variant)).unwrap().unwrap()
}

#[test]
fn same_input_gives_same_bytes() {
    let input = greeter(GreeterVariant::default());
    let first = stub_class_bytes(&input).unwrap();
    for _ in 0..5 {
        assert_eq!(stub_class_bytes(&input).unwrap(), first);
    }
}

#[test]
fn changing_a_non_constant_initializer_keeps_the_stub() {
    let base = stub(GreeterVariant::default());
    assert_eq!(stub(GreeterVariant { count_initializer: 43, ..Default::default() }), base);
}

#[test]
fn changing_a_method_body_keeps_the_stub() {
    let base = stub(GreeterVariant::default());
    let edited = stub(GreeterVariant { greeting: "bonjour, tout le monde", line: 57, ..Default::default() });
    assert_eq!(edited, base);
}

#[test]
fn member_declaration_order_does_not_matter() {
    assert_eq!(stub(GreeterVariant { reversed: true, ..Default::default() }), stub(GreeterVariant::default()));
}

#[test]
fn private_members_do_not_matter() {
    let with_helpers = stub(GreeterVariant { private_helpers: true, reversed: true, ..Default::default() });
    assert_eq!(with_helpers, stub(GreeterVariant::default()));
}

#[test]
fn abi_changes_change_the_stub() {
    let base = {
        let mut b = ClassBuilder::new("p/A", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
        let constant = b.constant_int(1);
        b.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "LIMIT", "I", vec![constant]);
        b.method(ACC_PUBLIC, "run", "()V", vec![]);
        stub_class_bytes(&b.build()).unwrap()
    };
    let new_constant = {
        let mut b = ClassBuilder::new("p/A", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
        let constant = b.constant_int(2);
        b.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "LIMIT", "I", vec![constant]);
        b.method(ACC_PUBLIC, "run", "()V", vec![]);
        stub_class_bytes(&b.build()).unwrap()
    };
    let narrower = {
        let mut b = ClassBuilder::new("p/A", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
        let constant = b.constant_int(1);
        b.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "LIMIT", "I", vec![constant]);
        b.method(ACC_PROTECTED, "run", "()V", vec![]);
        stub_class_bytes(&b.build()).unwrap()
    };
    assert_ne!(base, new_constant);
    assert_ne!(base, narrower);
}
