//! TOML manifests declaring interfaces and implementations.
//!
//! Manifests cannot carry code, so bodies are data-driven: methods return a
//! constant JSON value and property slots read, write or remove the instance
//! field named after the property.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::callable::Callable;
use crate::core::implementation::ImplementationBuilder;
use crate::core::member::{Member, PropertyImpl, Slot, SlotKind};
use crate::core::policy::INIT_HOOK;

const MANIFEST_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/manifest/v1.schema.json"
));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Manifest {
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
    #[serde(default)]
    pub implementations: Vec<ImplementationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub name: String,
    /// Parent interfaces; each must be declared earlier in the manifest.
    #[serde(default)]
    pub extends: Vec<String>,
    /// Fields the `init` hook seeds on every instance.
    #[serde(default)]
    pub init_fields: BTreeMap<String, Value>,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberSpec {
    Method {
        name: String,
        #[serde(default)]
        default: Option<Value>,
        #[serde(default, rename = "final")]
        is_final: bool,
    },
    Attribute {
        name: String,
        #[serde(default, rename = "type")]
        value_type: Option<String>,
    },
    Property {
        name: String,
        #[serde(default = "required_slot")]
        getter: SlotSpec,
        #[serde(default)]
        setter: SlotSpec,
        #[serde(default)]
        deleter: SlotSpec,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotSpec {
    #[default]
    Absent,
    Required,
    Default,
    Final,
}

fn required_slot() -> SlotSpec {
    SlotSpec::Required
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationSpec {
    pub name: String,
    pub implements: Vec<String>,
    #[serde(default)]
    pub members: Vec<ImplMemberSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImplMemberSpec {
    Method {
        name: String,
        #[serde(default)]
        returns: Value,
        #[serde(default, rename = "override")]
        is_override: bool,
    },
    Attribute {
        name: String,
        value: Value,
    },
    Property {
        name: String,
        #[serde(default)]
        getter: bool,
        #[serde(default)]
        setter: bool,
        #[serde(default)]
        deleter: bool,
    },
}

impl InterfaceSpec {
    /// Member declarations in manifest order, plus the `init` hook when
    /// `init_fields` is set.
    pub fn declarations(&self) -> Vec<(&str, Member)> {
        let mut declarations: Vec<(&str, Member)> = self
            .members
            .iter()
            .map(|spec| (spec.name(), spec.to_member()))
            .collect();
        if !self.init_fields.is_empty() {
            let fields = self.init_fields.clone();
            let hook = Callable::new(move |instance, _| {
                for (name, value) in &fields {
                    instance.set_attr(name, value.clone());
                }
                Ok(Value::Null)
            });
            declarations.push((INIT_HOOK, Member::default_method(hook)));
        }
        declarations
    }
}

impl MemberSpec {
    pub fn name(&self) -> &str {
        match self {
            MemberSpec::Method { name, .. }
            | MemberSpec::Attribute { name, .. }
            | MemberSpec::Property { name, .. } => name,
        }
    }

    pub fn to_member(&self) -> Member {
        match self {
            // `final` without `default` never passes the schema.
            MemberSpec::Method {
                default, is_final, ..
            } => match default.clone().map(Callable::constant) {
                Some(body) if *is_final => Member::final_method(body),
                Some(body) => Member::default_method(body),
                None => Member::method(),
            },
            MemberSpec::Attribute { value_type, .. } => Member::attribute(value_type.as_deref()),
            MemberSpec::Property {
                name,
                getter,
                setter,
                deleter,
            } => Member::property(
                getter.to_slot(name, SlotKind::Getter),
                setter.to_slot(name, SlotKind::Setter),
                deleter.to_slot(name, SlotKind::Deleter),
            ),
        }
    }
}

impl SlotSpec {
    fn to_slot(self, field: &str, kind: SlotKind) -> Slot {
        match self {
            SlotSpec::Absent => Slot::Absent,
            SlotSpec::Required => Slot::Required,
            SlotSpec::Default => Slot::Default(field_accessor(field, kind)),
            SlotSpec::Final => Slot::Final(field_accessor(field, kind)),
        }
    }
}

impl ImplementationSpec {
    /// Builder carrying the supplied members; interfaces are resolved by
    /// the caller.
    pub fn builder(&self) -> ImplementationBuilder {
        self.members
            .iter()
            .fold(ImplementationBuilder::new(&self.name), |builder, spec| {
                match spec {
                    ImplMemberSpec::Method {
                        name,
                        returns,
                        is_override: true,
                    } => builder.override_method(name, Callable::constant(returns.clone())),
                    ImplMemberSpec::Method { name, returns, .. } => {
                        builder.method(name, Callable::constant(returns.clone()))
                    }
                    ImplMemberSpec::Attribute { name, value } => {
                        builder.attribute(name, value.clone())
                    }
                    ImplMemberSpec::Property {
                        name,
                        getter,
                        setter,
                        deleter,
                    } => {
                        let accessor = |wanted: bool, kind: SlotKind| {
                            wanted.then(|| field_accessor(name, kind))
                        };
                        builder.property(
                            name,
                            PropertyImpl {
                                getter: accessor(*getter, SlotKind::Getter),
                                setter: accessor(*setter, SlotKind::Setter),
                                deleter: accessor(*deleter, SlotKind::Deleter),
                            },
                        )
                    }
                }
            })
    }
}

/// Slot body backed by the instance field `field`.
pub fn field_accessor(field: &str, kind: SlotKind) -> Callable {
    let field = field.to_string();
    match kind {
        SlotKind::Getter => Callable::new(move |instance, _| {
            Ok(instance.attr(&field).cloned().unwrap_or(Value::Null))
        }),
        SlotKind::Setter => Callable::new(move |instance, args| {
            let value = args.first().cloned().unwrap_or(Value::Null);
            instance.set_attr(&field, value);
            Ok(Value::Null)
        }),
        SlotKind::Deleter => Callable::new(move |instance, _| {
            Ok(instance.remove_attr(&field).unwrap_or(Value::Null))
        }),
    }
}

/// Read, schema-validate and deserialize a manifest.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read manifest {}", path.display()))?;
    parse_manifest(&contents).with_context(|| format!("load manifest {}", path.display()))
}

pub fn parse_manifest(contents: &str) -> Result<Manifest> {
    let value: Value = toml::from_str(contents).context("parse manifest toml")?;
    validate_schema(&value)?;
    serde_json::from_value(value).context("deserialize manifest")
}

fn validate_schema(manifest: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(MANIFEST_SCHEMA).context("parse manifest schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    let messages: Vec<String> = compiled
        .iter_errors(manifest)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!(
            "manifest schema validation failed:\n- {}",
            messages.join("\n- ")
        );
    }
    Ok(())
}
