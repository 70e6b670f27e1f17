// Shared fixtures: class files assembled through the crate's own codec, with
// everything a real compiler leaves in them (bodies, debug tables, private
// helpers, static initializers, bridges).
#![allow(dead_code)]

use stubjar::classfile::annotation::{write_annotations, write_parameter_annotations};
use stubjar::classfile::attribute::u2_payload;
use stubjar::classfile::flag::access_flags::*;
use stubjar::classfile::{AttributeInfo, ClassFile, ClassfileWritable, ConstantPool, FieldInfo, MethodInfo};
use stubjar::model::{Annotation, JavaString};

pub type Attr = (&'static str, Vec<u8>);

pub struct ClassBuilder {
    class_file: ClassFile,
}

impl ClassBuilder {
    pub fn new(name: &str, super_name: Option<&str>, flags: u16) -> Self {
        let mut class_file = ClassFile::new();
        class_file.access_flags = flags;
        class_file.this_class = class_file.constant_pool.add_class(name).unwrap();
        class_file.super_class = match super_name {
            Some(super_name) => class_file.constant_pool.add_class(super_name).unwrap(),
            None => 0,
        };
        Self { class_file }
    }

    pub fn pool(&mut self) -> &mut ConstantPool {
        &mut self.class_file.constant_pool
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.pool().add_class(name).unwrap();
        self.class_file.interfaces.push(index);
        self
    }

    fn attributes(&mut self, attributes: Vec<Attr>) -> Vec<AttributeInfo> {
        attributes
            .into_iter()
            .map(|(name, info)| AttributeInfo::named(self.pool(), name, info).unwrap())
            .collect()
    }

    pub fn class_attribute(&mut self, attribute: Attr) -> &mut Self {
        let mut built = self.attributes(vec![attribute]);
        self.class_file.attributes.append(&mut built);
        self
    }

    pub fn field(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<Attr>) -> &mut Self {
        let name_index = self.pool().add_utf8(name).unwrap();
        let descriptor_index = self.pool().add_utf8(descriptor).unwrap();
        let mut field = FieldInfo::new(flags, name_index, descriptor_index);
        field.attributes = self.attributes(attributes);
        self.class_file.fields.push(field);
        self
    }

    pub fn method(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<Attr>) -> &mut Self {
        let name_index = self.pool().add_utf8(name).unwrap();
        let descriptor_index = self.pool().add_utf8(descriptor).unwrap();
        let mut method = MethodInfo::new(flags, name_index, descriptor_index);
        method.attributes = self.attributes(attributes);
        self.class_file.methods.push(method);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.class_file.to_classfile_bytes()
    }

    // -- attribute payloads --

    pub fn signature(&mut self, signature: &str) -> Attr {
        ("Signature", u2_payload(self.pool().add_utf8(signature).unwrap()))
    }

    pub fn constant_int(&mut self, value: i32) -> Attr {
        ("ConstantValue", u2_payload(self.pool().add_integer(value).unwrap()))
    }

    pub fn constant_string(&mut self, value: &str) -> Attr {
        ("ConstantValue", u2_payload(self.pool().add_string(value).unwrap()))
    }

    pub fn constant_java_string(&mut self, value: &JavaString) -> Attr {
        ("ConstantValue", u2_payload(self.pool().add_java_string(value).unwrap()))
    }

    pub fn source_file(&mut self, name: &str) -> Attr {
        ("SourceFile", u2_payload(self.pool().add_utf8(name).unwrap()))
    }

    pub fn deprecated(&mut self) -> Attr {
        ("Deprecated", Vec::new())
    }

    /// A `Code` attribute running `body` with a nested `LineNumberTable`
    pub fn code(&mut self, body: &[u8], line: u16) -> Attr {
        let line_table_name = self.pool().add_utf8("LineNumberTable").unwrap();
        let mut info = Vec::new();
        info.extend_from_slice(&4u16.to_be_bytes()); // max_stack
        info.extend_from_slice(&4u16.to_be_bytes()); // max_locals
        info.extend_from_slice(&(body.len() as u32).to_be_bytes());
        info.extend_from_slice(body);
        info.extend_from_slice(&0u16.to_be_bytes()); // exception table
        info.extend_from_slice(&1u16.to_be_bytes());
        info.extend_from_slice(&line_table_name.to_be_bytes());
        info.extend_from_slice(&6u32.to_be_bytes());
        info.extend_from_slice(&1u16.to_be_bytes());
        info.extend_from_slice(&0u16.to_be_bytes());
        info.extend_from_slice(&line.to_be_bytes());
        ("Code", info)
    }

    /// `ldc "text"; areturn`
    pub fn returns_string(&mut self, text: &str, line: u16) -> Attr {
        let index = self.pool().add_string(text).unwrap();
        assert!(index <= u8::MAX as u16, "fixture pool too large for ldc");
        self.code(&[0x12, index as u8, 0xB0], line)
    }

    pub fn exceptions(&mut self, names: &[&str]) -> Attr {
        let mut info = (names.len() as u16).to_be_bytes().to_vec();
        for name in names {
            info.extend_from_slice(&self.pool().add_class(name).unwrap().to_be_bytes());
        }
        ("Exceptions", info)
    }

    pub fn enclosing_method(&mut self, owner: &str, method: Option<(&str, &str)>) -> Attr {
        let mut info = self.pool().add_class(owner).unwrap().to_be_bytes().to_vec();
        let method_index = match method {
            Some((name, descriptor)) => self.pool().add_name_and_type(name, descriptor).unwrap(),
            None => 0,
        };
        info.extend_from_slice(&method_index.to_be_bytes());
        ("EnclosingMethod", info)
    }

    /// Rows of `(inner, outer, simple name, flags)`
    pub fn inner_classes(&mut self, rows: &[(&str, Option<&str>, Option<&str>, u16)]) -> Attr {
        let mut info = (rows.len() as u16).to_be_bytes().to_vec();
        for (inner, outer, simple, flags) in rows {
            let inner = self.pool().add_class(inner).unwrap();
            let outer = outer.map_or(0, |outer| self.pool().add_class(outer).unwrap());
            let simple = simple.map_or(0, |simple| self.pool().add_utf8(simple).unwrap());
            for value in [inner, outer, simple, *flags] {
                info.extend_from_slice(&value.to_be_bytes());
            }
        }
        ("InnerClasses", info)
    }

    pub fn annotations(&mut self, visible: bool, annotations: &[Annotation]) -> Attr {
        let mut info = Vec::new();
        write_annotations(&mut info, self.pool(), annotations).unwrap();
        let name = if visible { "RuntimeVisibleAnnotations" } else { "RuntimeInvisibleAnnotations" };
        (name, info)
    }

    pub fn parameter_annotations(&mut self, visible: bool, parameters: &[Vec<Annotation>]) -> Attr {
        let mut info = Vec::new();
        write_parameter_annotations(&mut info, self.pool(), parameters).unwrap();
        let name = if visible { "RuntimeVisibleParameterAnnotations" } else { "RuntimeInvisibleParameterAnnotations" };
        (name, info)
    }
}

/// How a compiler might produce `p/Greeter` after various edits
#[derive(Clone, Copy)]
pub struct GreeterVariant<'a> {
    /// Initializer of the non-final `count` field, compiled into `<init>`
    pub count_initializer: u8,
    /// String returned by `getGreeting`
    pub greeting: &'a str,
    /// Emit members in reverse order
    pub reversed: bool,
    /// Add a private helper method and field
    pub private_helpers: bool,
    /// Line number of the greeting body
    pub line: u16,
}

impl Default for GreeterVariant<'_> {
    fn default() -> Self {
        Self { count_initializer: 42, greeting: "hello", reversed: false, private_helpers: false, line: 10 }
    }
}

/// A "full" class as a compiler would leave it:
///
/// ```java
/// public class Greeter implements Comparable<Greeter> {
///     public static final String PREFIX = "Hi";
///     protected int count = 42;
///     public Greeter() {}
///     public String getGreeting() { return "hello"; }
///     public int compareTo(Greeter other) throws IllegalStateException { ... }
///     // + bridge compareTo(Object), <clinit>, private helpers
/// }
/// ```
pub fn greeter(variant: GreeterVariant<'_>) -> Vec<u8> {
    let mut b = ClassBuilder::new("p/Greeter", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
    b.interface("java/lang/Comparable");
    let class_signature = b.signature("Ljava/lang/Object;Ljava/lang/Comparable<Lp/Greeter;>;");
    b.class_attribute(class_signature);
    let source_file = b.source_file("Greeter.java");
    b.class_attribute(source_file);

    let mut members: Vec<Box<dyn Fn(&mut ClassBuilder)>> = Vec::new();
    members.push(Box::new(|b| {
        let constant = b.constant_string("Hi");
        b.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "PREFIX", "Ljava/lang/String;", vec![constant]);
    }));
    members.push(Box::new(|b| {
        b.field(ACC_PROTECTED, "count", "I", vec![]);
    }));
    let initializer = variant.count_initializer;
    members.push(Box::new(move |b| {
        // aload_0; invokespecial omitted; aload_0; bipush n; putfield omitted; return
        let code = b.code(&[0x2A, 0x10, initializer, 0xB1], 3);
        b.method(ACC_PUBLIC, "<init>", "()V", vec![code]);
    }));
    let greeting = variant.greeting.to_string();
    let line = variant.line;
    members.push(Box::new(move |b| {
        let code = b.returns_string(&greeting, line);
        b.method(ACC_PUBLIC, "getGreeting", "()Ljava/lang/String;", vec![code]);
    }));
    members.push(Box::new(|b| {
        let code = b.code(&[0x03, 0xAC], 20);
        let exceptions = b.exceptions(&["java/lang/IllegalStateException"]);
        b.method(ACC_PUBLIC, "compareTo", "(Lp/Greeter;)I", vec![code, exceptions]);
    }));
    members.push(Box::new(|b| {
        let code = b.code(&[0x03, 0xAC], 1);
        b.method(ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC, "compareTo", "(Ljava/lang/Object;)I", vec![code]);
    }));
    members.push(Box::new(|b| {
        let code = b.code(&[0xB1], 2);
        b.method(ACC_STATIC, "<clinit>", "()V", vec![code]);
    }));
    if variant.private_helpers {
        members.push(Box::new(|b| {
            b.field(ACC_PRIVATE, "cache", "Ljava/util/Map;", vec![]);
        }));
        members.push(Box::new(|b| {
            let code = b.code(&[0xB1], 30);
            b.method(ACC_PRIVATE, "refresh", "(Ljava/util/List;)V", vec![code]);
        }));
    }

    if variant.reversed {
        members.reverse();
    }
    for member in &members {
        member(&mut b);
    }
    b.build()
}
