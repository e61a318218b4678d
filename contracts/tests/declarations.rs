//! End-to-end declarations through the public library API.

use contracts::test_support::{constant, greeter, single_method};
use contracts::{
    ContractError, ImplementationBuilder, Member, PropertyImpl, Registry, Slot, TypeRef,
};
use serde_json::Value;

#[test]
fn english_greeter_uses_default_farewell() {
    let mut registry = Registry::new();
    let (greeter, _) = greeter(&mut registry);

    let mut builder =
        ImplementationBuilder::new("EnglishGreeter").method("greet", constant("hello"));
    registry
        .declare_implements(&mut builder, &[greeter])
        .expect("declare");
    let english = registry.build(builder).expect("build");

    let mut instance = registry
        .instantiate(TypeRef::Implementation(english))
        .expect("instantiate");
    assert_eq!(instance.call("farewell", &[]).expect("farewell"), "goodbye");
    assert!(registry.implementations(greeter).expect("set").contains(&english));
    assert!(registry.implemented_by(greeter, instance.type_ref()));
    assert!(!registry.is_interface(instance.type_ref()));
    assert!(registry.is_interface(TypeRef::Interface(greeter)));
}

/// Conflicting interfaces abort the declaration before anything registers.
#[test]
fn flyer_and_swimmer_can_not_be_combined() {
    let mut registry = Registry::new();
    let flyer = single_method(&mut registry, "Flyer", "move");
    let swimmer = single_method(&mut registry, "Swimmer", "move");

    let mut builder = ImplementationBuilder::new("Duck").method("move", constant("waddle"));
    let err = registry
        .declare_implements(&mut builder, &[flyer, swimmer])
        .expect_err("conflict");

    let conflict = match err {
        ContractError::Conflict(conflict) => conflict,
        other => panic!("expected conflict, got {other:?}"),
    };
    assert_eq!(conflict.members, vec!["move".to_string()]);
    assert!(registry.implementation_named("Duck").is_none());
    assert!(registry.implementations(flyer).expect("flyer").is_empty());
    assert!(registry.implementations(swimmer).expect("swimmer").is_empty());
}

/// A rejected declaration leaves earlier registrations untouched.
#[test]
fn rejected_declaration_does_not_disturb_registry() {
    let mut registry = Registry::new();
    let (greeter, _) = greeter(&mut registry);

    let mut good = ImplementationBuilder::new("Good").method("greet", constant("hi"));
    registry
        .declare_implements(&mut good, &[greeter])
        .expect("declare");
    let good = registry.build(good).expect("build");

    let mut bad = ImplementationBuilder::new("Bad");
    registry
        .declare_implements(&mut bad, &[greeter])
        .expect("declare");
    let err = registry.build(bad).expect_err("missing greet");
    assert!(err.to_string().contains("missing method: greet()"));

    let registered: Vec<_> = registry
        .implementations(greeter)
        .expect("set")
        .iter()
        .copied()
        .collect();
    assert_eq!(registered, vec![good]);
}

#[test]
fn getter_default_with_concrete_setter() {
    let mut registry = Registry::new();
    let moody = registry
        .define(
            "Moody",
            &[],
            vec![(
                "mood",
                Member::property(Slot::Default(constant("calm")), Slot::Absent, Slot::Absent),
            )],
        )
        .expect("define");

    let setter = contracts::Callable::new(|instance, args| {
        instance.set_attr("last_set", args.first().cloned().unwrap_or(Value::Null));
        Ok(Value::Null)
    });
    let mut builder = ImplementationBuilder::new("Settable")
        .property("mood", PropertyImpl::new().with_setter(setter));
    registry
        .declare_implements(&mut builder, &[moody])
        .expect("declare");
    let id = registry.build(builder).expect("build");

    let mut instance = registry.instantiate(id.into()).expect("instantiate");
    assert_eq!(instance.get("mood").expect("get"), "calm");
    instance.set("mood", Value::from("happy")).expect("set");
    assert_eq!(instance.attr("last_set"), Some(&Value::from("happy")));
}
