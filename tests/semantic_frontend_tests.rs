mod common;

use common::{greeter, ClassBuilder, GreeterVariant};
use stubjar::classfile::flag::access_flags::*;
use stubjar::frontend::element::{
    AnnotationMirror, ElementKind, ElementValue, ExecutableElement, Modifier, ParameterElement,
    PrimitiveKind, TypeElement, TypeMirror, TypeParameterElement, VariableElement,
};
use stubjar::model::{Annotation, ConstantValue, JavaString};
use stubjar::{canonical_class, stub_class_bytes, stub_element, stub_element_tree, Config, Error, ResolutionContext};

/// `p.Greeter` as the compiler's element model reports it
fn greeter_element() -> TypeElement {
    let mut element = TypeElement::new("p.Greeter", ElementKind::Class, vec![Modifier::Public]);
    element.interfaces.push(TypeMirror::interface("java.lang.Comparable").with_args(vec![TypeMirror::class("p.Greeter")]));

    let mut prefix = VariableElement::new(
        "PREFIX",
        vec![Modifier::Public, Modifier::Static, Modifier::Final],
        TypeMirror::string(),
    );
    prefix.constant_value = Some(ElementValue::String("Hi".into()));
    element.fields.push(prefix);
    element.fields.push(VariableElement::new("count", vec![Modifier::Protected], TypeMirror::Primitive(PrimitiveKind::Int)));

    element.methods.push(ExecutableElement::method("getGreeting", vec![Modifier::Public], TypeMirror::string()));
    let mut compare = ExecutableElement::method("compareTo", vec![Modifier::Public], TypeMirror::Primitive(PrimitiveKind::Int))
        .with_parameter(ParameterElement::new("other", TypeMirror::class("p.Greeter")));
    compare.thrown.push(TypeMirror::class("java.lang.IllegalStateException"));
    element.methods.push(compare);
    element.methods.push(ExecutableElement::constructor(vec![Modifier::Public]));
    element
}

fn context() -> ResolutionContext {
    ResolutionContext::with_platform_defaults()
}

#[test]
fn both_front_ends_produce_identical_stubs() {
    let from_bytecode = stub_class_bytes(&greeter(GreeterVariant::default())).unwrap().unwrap();
    let from_elements = stub_element(&greeter_element(), &context(), &Config::default()).unwrap().unwrap();
    assert_eq!(from_elements, from_bytecode);
}

#[test]
fn retention_places_annotations_like_the_compiler() {
    let mut element = TypeElement::new("p.Api", ElementKind::Class, vec![Modifier::Public]);
    element.annotations.push(AnnotationMirror::new(TypeMirror::class("java.lang.Deprecated")));
    element.annotations.push(AnnotationMirror::new(TypeMirror::class("com.example.Marker")));
    element.annotations.push(AnnotationMirror::new(TypeMirror::class("java.lang.SuppressWarnings")).with_value(
        "value",
        ElementValue::Array(vec![ElementValue::String("unchecked".into())]),
    ));
    let from_elements = stub_element(&element, &context(), &Config::default()).unwrap().unwrap();

    let mut b = ClassBuilder::new("p/Api", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
    let deprecated = b.deprecated();
    let visible = b.annotations(true, &[Annotation::new("Ljava/lang/Deprecated;")]);
    let invisible = b.annotations(false, &[Annotation::new("Lcom/example/Marker;")]);
    b.class_attribute(deprecated).class_attribute(visible).class_attribute(invisible);
    let from_bytecode = stub_class_bytes(&b.build()).unwrap().unwrap();

    assert_eq!(from_elements, from_bytecode);
}

#[test]
fn missing_dependencies_degrade_to_best_effort_names() {
    let mut element = TypeElement::new("p.Client", ElementKind::Class, vec![Modifier::Public]);
    element.imports = vec!["com.lib.Widget".into()];
    element.fields.push(VariableElement::new("widget", vec![Modifier::Public], TypeMirror::Error("Widget".into())));
    element.methods.push(
        ExecutableElement::method("make", vec![Modifier::Public], TypeMirror::Error("Gadget".into()))
            .with_parameter(ParameterElement::new("w", TypeMirror::Error("Widget".into()))),
    );

    let bytes = stub_element(&element, &context(), &Config::default()).unwrap().unwrap();
    let stub = canonical_class(&bytes).unwrap().unwrap();
    assert_eq!(stub.fields[0].descriptor, "Lcom/lib/Widget;");
    assert_eq!(stub.methods[0].descriptor, "(Lcom/lib/Widget;)Lp/Gadget;");
}

#[test]
fn strict_context_reports_the_missing_type() {
    let mut element = TypeElement::new("p.Client", ElementKind::Class, vec![Modifier::Public]);
    element.fields.push(VariableElement::new("widget", vec![Modifier::Public], TypeMirror::Error("Widget".into())));
    let config = Config::default().with_missing_dependencies_allowed(false);

    match stub_element(&element, &context(), &config) {
        Err(Error::UnresolvedDependency { class, type_name }) => {
            assert_eq!(class, "p/Client");
            assert_eq!(type_name, "Widget");
        }
        other => panic!("expected an unresolved dependency, got {:?}", other),
    }
}

#[test]
fn cyclic_type_variable_bounds_are_malformed() {
    let mut element = TypeElement::new("p.Cycle", ElementKind::Class, vec![Modifier::Public]);
    let mut method = ExecutableElement::method("pick", vec![Modifier::Public], TypeMirror::TypeVar("A".into()));
    method.type_parameters.push(TypeParameterElement::new("A", vec![TypeMirror::TypeVar("B".into())]));
    method.type_parameters.push(TypeParameterElement::new("B", vec![TypeMirror::TypeVar("A".into())]));
    element.methods.push(method);

    let result = stub_element(&element, &context(), &Config::default());
    assert!(matches!(result, Err(Error::MalformedInput { .. })));
}

#[test]
fn generic_method_signature_and_erasure() {
    let mut element = TypeElement::new("p.Util", ElementKind::Class, vec![Modifier::Public, Modifier::Final]);
    let mut method = ExecutableElement::method(
        "max",
        vec![Modifier::Public, Modifier::Static],
        TypeMirror::TypeVar("T".into()),
    )
    .with_parameter(ParameterElement::new(
        "items",
        TypeMirror::interface("java.util.List").with_args(vec![TypeMirror::TypeVar("T".into())]),
    ));
    method.type_parameters.push(TypeParameterElement::new(
        "T",
        vec![TypeMirror::interface("java.lang.Comparable").with_args(vec![TypeMirror::TypeVar("T".into())])],
    ));
    element.methods.push(method);

    let bytes = stub_element(&element, &context(), &Config::default()).unwrap().unwrap();
    let stub = canonical_class(&bytes).unwrap().unwrap();
    let max = &stub.methods[0];
    assert_eq!(max.descriptor, "(Ljava/util/List;)Ljava/lang/Comparable;");
    assert_eq!(
        max.signature.as_deref(),
        Some("<T::Ljava/lang/Comparable<TT;>;>(Ljava/util/List<TT;>;)TT;")
    );
}

#[test]
fn member_types_are_stubbed_with_their_rows() {
    let mut outer = TypeElement::new("p.Outer", ElementKind::Class, vec![Modifier::Public]);
    outer.imports = vec!["com.lib.Widget".into()];
    let mut listener = TypeElement::new(
        "p.Outer$Listener",
        ElementKind::Interface,
        vec![Modifier::Public, Modifier::Static, Modifier::Abstract],
    )
    .nested_in("p.Outer");
    listener.methods.push(
        ExecutableElement::method("on", vec![Modifier::Public, Modifier::Abstract], TypeMirror::Void)
            .with_parameter(ParameterElement::new("w", TypeMirror::Error("Widget".into()))),
    );
    outer.member_types.push(listener);
    let hidden = TypeElement::new("p.Outer$Hidden", ElementKind::Class, vec![Modifier::Private]).nested_in("p.Outer");
    outer.member_types.push(hidden);

    let mut context = context();
    context.add_element(&outer);
    let results = stub_element_tree(&outer, &context, &Config::default());
    let names: Vec<_> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["p/Outer", "p/Outer$Listener", "p/Outer$Hidden"]);

    let outer_stub = canonical_class(results[0].1.as_ref().unwrap().as_ref().unwrap()).unwrap().unwrap();
    let rows: Vec<_> = outer_stub.inner_classes.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(rows, ["p/Outer$Listener"]);
    assert_eq!(
        outer_stub.inner_classes[0].access_flags,
        ACC_PUBLIC | ACC_STATIC | ACC_ABSTRACT | ACC_INTERFACE
    );

    let listener_stub = canonical_class(results[1].1.as_ref().unwrap().as_ref().unwrap()).unwrap().unwrap();
    assert_eq!(listener_stub.methods[0].descriptor, "(Lcom/lib/Widget;)V");
    assert_eq!(listener_stub.own_inner_entry().unwrap().outer_name.as_deref(), Some("p/Outer"));

    let hidden_stub = canonical_class(results[2].1.as_ref().unwrap().as_ref().unwrap()).unwrap().unwrap();
    assert_eq!(hidden_stub.access_flags, ACC_SUPER);
    assert_eq!(hidden_stub.own_inner_entry().unwrap().access_flags, ACC_PRIVATE);
}

#[test]
fn unresolved_supertypes_with_an_empty_classpath_degrade_to_guesses() {
    let mut element = TypeElement::new("p.Child", ElementKind::Class, vec![Modifier::Public]);
    element.imports = vec!["com.lib.Listener".into()];
    element.superclass = Some(TypeMirror::Error("Base".into()));
    element.interfaces.push(TypeMirror::Error("Listener".into()));
    element.fields.push(VariableElement::new("size", vec![Modifier::Public], TypeMirror::Primitive(PrimitiveKind::Int)));
    element.methods.push(ExecutableElement::method("run", vec![Modifier::Public], TypeMirror::Void));
    element.methods.push(ExecutableElement::constructor(vec![Modifier::Public]));

    let bytes = stub_element(&element, &ResolutionContext::new(), &Config::default()).unwrap().unwrap();
    let stub = canonical_class(&bytes).unwrap().unwrap();
    assert_eq!(stub.super_name.as_deref(), Some("p/Base"));
    assert_eq!(stub.interfaces, ["com/lib/Listener"]);
    assert_eq!(stub.signature, None);

    let fields: Vec<_> = stub.fields.iter().map(|f| format!("{}:{}", f.name, f.descriptor)).collect();
    assert_eq!(fields, ["size:I"]);
    let methods: Vec<_> = stub.methods.iter().map(|m| format!("{}{}", m.name, m.descriptor)).collect();
    assert_eq!(methods, ["<init>()V", "run()V"]);
    assert_eq!(stub.access_flags, ACC_PUBLIC | ACC_SUPER);
}

#[test]
fn unresolved_superclass_fails_in_strict_mode() {
    let mut element = TypeElement::new("p.Child", ElementKind::Class, vec![Modifier::Public]);
    element.superclass = Some(TypeMirror::Error("Base".into()));
    let config = Config::default().with_missing_dependencies_allowed(false);
    assert!(matches!(
        stub_element(&element, &ResolutionContext::new(), &config),
        Err(Error::UnresolvedDependency { .. })
    ));
}

#[test]
fn string_constants_with_unpaired_surrogates_match_the_compiled_class() {
    let lone = JavaString::from_units(vec![0x41, 0xD800]);
    let mut element = TypeElement::new("p.Text", ElementKind::Class, vec![Modifier::Public]);
    let mut field = VariableElement::new(
        "LONE",
        vec![Modifier::Public, Modifier::Static, Modifier::Final],
        TypeMirror::string(),
    );
    field.constant_value = Some(ElementValue::String(lone.clone()));
    element.fields.push(field);
    let from_elements = stub_element(&element, &context(), &Config::default()).unwrap().unwrap();

    let mut b = ClassBuilder::new("p/Text", Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER);
    let constant = b.constant_java_string(&lone);
    b.field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "LONE", "Ljava/lang/String;", vec![constant]);
    let from_bytecode = stub_class_bytes(&b.build()).unwrap().unwrap();

    assert_eq!(from_elements, from_bytecode);
    let stub = canonical_class(&from_elements).unwrap().unwrap();
    assert_eq!(stub.fields[0].constant_value, Some(ConstantValue::String(lone)));
}

#[test]
fn constant_too_long_for_the_class_file_is_malformed() {
    let mut element = TypeElement::new("p.Big", ElementKind::Class, vec![Modifier::Public]);
    let mut field = VariableElement::new(
        "BIG",
        vec![Modifier::Public, Modifier::Static, Modifier::Final],
        TypeMirror::string(),
    );
    field.constant_value = Some(ElementValue::String("x".repeat(70_000).into()));
    element.fields.push(field);

    match stub_element(&element, &context(), &Config::default()) {
        Err(Error::MalformedInput { class, message }) => {
            assert_eq!(class, "p/Big");
            assert!(message.contains("65535"), "{}", message);
        }
        other => panic!("expected malformed input, got {:?}", other),
    }
}
