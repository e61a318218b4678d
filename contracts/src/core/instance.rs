//! Instances of registered implementations.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use crate::core::callable::Callable;
use crate::core::error::ContractError;
use crate::core::implementation::MemberTable;
use crate::core::interface::HookKind;
use crate::core::member::SlotKind;
use crate::core::registry::{ImplId, Registry, TypeRef};

/// A value of a registered implementation.
#[derive(Debug, Clone)]
pub struct Instance {
    implementation: ImplId,
    type_name: String,
    table: Arc<MemberTable>,
    fields: BTreeMap<String, Value>,
}

impl Instance {
    pub fn implementation(&self) -> ImplId {
        self.implementation
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Implementation(self.implementation)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let body = self
            .table
            .methods
            .get(method)
            .cloned()
            .ok_or_else(|| self.unknown("method", method))?;
        body.call(self, args)
    }

    pub fn get(&mut self, property: &str) -> Result<Value> {
        let getter = self.slot(property, SlotKind::Getter)?;
        getter.call(self, &[])
    }

    pub fn set(&mut self, property: &str, value: Value) -> Result<()> {
        let setter = self.slot(property, SlotKind::Setter)?;
        setter.call(self, &[value])?;
        Ok(())
    }

    pub fn delete(&mut self, property: &str) -> Result<()> {
        let deleter = self.slot(property, SlotKind::Deleter)?;
        deleter.call(self, &[])?;
        Ok(())
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_attr(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    fn slot(&self, property: &str, kind: SlotKind) -> Result<Callable, ContractError> {
        let triple = self
            .table
            .properties
            .get(property)
            .ok_or_else(|| self.unknown("property", property))?;
        triple
            .slot(kind)
            .cloned()
            .ok_or_else(|| ContractError::MissingSlot {
                implementation: self.type_name.clone(),
                property: property.to_string(),
                slot: kind,
            })
    }

    fn unknown(&self, kind: &'static str, member: &str) -> ContractError {
        ContractError::UnknownMember {
            implementation: self.type_name.clone(),
            kind,
            member: member.to_string(),
        }
    }
}

impl Registry {
    /// Construct an instance of `candidate`.
    ///
    /// Interfaces are never instantiable. For implementations, every `init`
    /// hook of the implemented interfaces runs in implements order, followed
    /// by every `constructed` hook.
    pub fn instantiate(&self, candidate: TypeRef) -> Result<Instance> {
        let id = match candidate {
            TypeRef::Interface(id) => {
                let name = self.interface(id)?.name().to_string();
                return Err(ContractError::InterfaceNotInstantiable(name).into());
            }
            TypeRef::Implementation(id) => id,
        };
        let implementation = self.implementation(id)?;
        let mut instance = Instance {
            implementation: id,
            type_name: implementation.name().to_string(),
            table: Arc::clone(&implementation.table),
            fields: implementation.attributes().clone(),
        };

        for kind in [HookKind::Init, HookKind::Constructed] {
            for interface in implementation.interfaces() {
                if let Some(hook) = self.hook(*interface, kind) {
                    debug!(
                        implementation = implementation.name(),
                        interface = %interface,
                        hook = ?kind,
                        "running hook"
                    );
                    hook.call(&mut instance, &[])?;
                }
            }
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::member::{Member, PropertyImpl, Slot};
    use crate::test_support::{constant, greeter, implementation};

    fn append_log(entry: &'static str) -> Callable {
        Callable::new(move |instance, _| {
            let mut log = instance
                .attr("log")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            log.push(Value::from(entry));
            instance.set_attr("log", Value::Array(log));
            Ok(Value::Null)
        })
    }

    /// Greeter end to end: defaults are callable on the built type.
    #[test]
    fn greeter_default_is_callable() {
        let mut registry = Registry::new();
        let (greeter, _) = greeter(&mut registry);
        let builder = implementation(&registry, "EnglishGreeter", &[greeter])
            .expect("declare")
            .method("greet", constant("hello"));
        let id = registry.build(builder).expect("build");

        let mut instance = registry.instantiate(id.into()).expect("instantiate");
        assert_eq!(instance.call("greet", &[]).expect("greet"), "hello");
        assert_eq!(instance.call("farewell", &[]).expect("farewell"), "goodbye");
        assert!(registry.implemented_by(greeter, instance.type_ref()));
    }

    #[test]
    fn interfaces_can_not_be_instantiated() {
        let mut registry = Registry::new();
        let (greeter, _) = greeter(&mut registry);
        let err = registry
            .instantiate(greeter.into())
            .expect_err("interface instantiation");
        let err = err.downcast::<ContractError>().expect("contract error");
        assert_eq!(
            err,
            ContractError::InterfaceNotInstantiable("Greeter".to_string())
        );
    }

    /// All init hooks run before any constructed hook, in implements order.
    #[test]
    fn hooks_run_init_then_constructed() {
        let mut registry = Registry::new();
        let first = registry
            .define(
                "First",
                &[],
                vec![
                    ("init", Member::default_method(append_log("first.init"))),
                    (
                        "constructed",
                        Member::default_method(append_log("first.constructed")),
                    ),
                ],
            )
            .expect("first");
        let second = registry
            .define(
                "Second",
                &[],
                vec![
                    ("init", Member::default_method(append_log("second.init"))),
                    (
                        "constructed",
                        Member::default_method(append_log("second.constructed")),
                    ),
                ],
            )
            .expect("second");
        let builder = implementation(&registry, "Both", &[first, second]).expect("declare");
        let id = registry.build(builder).expect("build");

        let instance = registry.instantiate(id.into()).expect("instantiate");
        assert_eq!(
            instance.attr("log").expect("log"),
            &serde_json::json!([
                "first.init",
                "second.init",
                "first.constructed",
                "second.constructed"
            ])
        );
    }

    /// A parent hook inherited through a multi-parent subtype runs once even
    /// when the parent is also listed directly.
    #[test]
    fn inherited_hook_runs_once_per_instance() {
        let mut registry = Registry::new();
        let plain = registry.define("Plain", &[], Vec::new()).expect("plain");
        let counted = registry
            .define(
                "Counted",
                &[],
                vec![("init", Member::default_method(append_log("counted.init")))],
            )
            .expect("counted");
        let joined = registry
            .define("Joined", &[plain, counted], Vec::new())
            .expect("joined");
        let builder =
            implementation(&registry, "Thing", &[plain, counted, joined]).expect("declare");
        let id = registry.build(builder).expect("build");
        assert_eq!(
            registry.implementation(id).expect("thing").interfaces(),
            &[joined]
        );

        let instance = registry.instantiate(id.into()).expect("instantiate");
        assert_eq!(
            instance.attr("log").expect("log"),
            &serde_json::json!(["counted.init"])
        );
    }

    #[test]
    fn properties_dispatch_to_resolved_slots() {
        let mut registry = Registry::new();
        let getter = Callable::new(|instance, _| {
            Ok(instance.attr("raw").cloned().unwrap_or(Value::Null))
        });
        let moody = registry
            .define(
                "Moody",
                &[],
                vec![(
                    "mood",
                    Member::property(Slot::Default(getter), Slot::Absent, Slot::Absent),
                )],
            )
            .expect("define");
        let setter = Callable::new(|instance, args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            instance.set_attr("raw", value);
            Ok(Value::Null)
        });
        let builder = implementation(&registry, "Settable", &[moody])
            .expect("declare")
            .property("mood", PropertyImpl::new().with_setter(setter))
            .attribute("raw", Value::from("calm"));
        let id = registry.build(builder).expect("build");

        let mut instance = registry.instantiate(id.into()).expect("instantiate");
        assert_eq!(instance.get("mood").expect("get"), "calm");
        instance.set("mood", Value::from("happy")).expect("set");
        assert_eq!(instance.get("mood").expect("get"), "happy");

        let err = instance.delete("mood").expect_err("no deleter");
        assert!(err.to_string().contains("has no deleter"));
        let err = instance.call("missing", &[]).expect_err("no method");
        assert!(err.to_string().contains("has no method 'missing'"));
    }
}
