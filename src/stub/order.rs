//! Canonical member order

use std::cmp::Ordering;

use crate::model::ClassStub;

use super::filter::StubMember;

/// Order by UTF-16 code units, as `String.compareTo` does. This differs from
/// byte order once supplementary characters meet U+E000..U+FFFF.
fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn by_sort_key<M: StubMember>(a: &M, b: &M) -> Ordering {
    let (a_first, a_second) = a.sort_key();
    let (b_first, b_second) = b.sort_key();
    utf16_cmp(&a_first, &b_first).then_with(|| utf16_cmp(a_second, b_second))
}

/// Stable sort of `members` by their canonical key
pub fn sort_members<M: StubMember>(members: &mut [M]) {
    members.sort_by(by_sort_key);
}

/// Fields by (name, descriptor), methods by `name:descriptor`, inner-class
/// rows by binary name. Interfaces, thrown types, parameters and annotations
/// keep their declared order.
pub fn order(mut class: ClassStub) -> ClassStub {
    sort_members(&mut class.fields);
    sort_members(&mut class.methods);
    sort_members(&mut class.inner_classes);
    class
}
