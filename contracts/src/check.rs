//! Manifest orchestration for `contracts check`, `members` and `call`.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::debug;

use crate::core::error::ContractError;
use crate::core::member::{Member, MemberKind, Slot};
use crate::core::registry::{ImplId, InterfaceId, Registry};
use crate::io::config::load_config;
use crate::io::manifest::{Manifest, load_manifest};

/// Result of declaring one implementation from a manifest.
#[derive(Debug)]
pub struct ImplementationOutcome {
    pub name: String,
    pub result: Result<ImplId, ContractError>,
}

/// Per-implementation outcomes, in manifest order.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub outcomes: Vec<ImplementationOutcome>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn rejected(&self) -> impl Iterator<Item = (&str, &ContractError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((outcome.name.as_str(), err)),
        })
    }
}

/// Load config and manifest, then declare everything into a fresh registry.
pub fn check_manifest(manifest_path: &Path, config_path: &Path) -> Result<(Registry, CheckReport)> {
    let cfg = load_config(config_path).context("load config")?;
    let manifest = load_manifest(manifest_path)?;
    let mut registry = Registry::with_policy(cfg.policy);
    let report = declare_manifest(&mut registry, &manifest)?;
    Ok((registry, report))
}

/// Declare every interface, then every implementation.
///
/// Broken interface declarations and unknown names make the manifest invalid
/// and abort. Rejected implementations are recorded in the report instead.
pub fn declare_manifest(registry: &mut Registry, manifest: &Manifest) -> Result<CheckReport> {
    for spec in &manifest.interfaces {
        let parents = spec
            .extends
            .iter()
            .map(|parent| {
                registry.interface_named(parent).ok_or_else(|| {
                    anyhow!(
                        "interface '{}' extends unknown interface '{}'",
                        spec.name,
                        parent
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        registry
            .define(&spec.name, &parents, spec.declarations())
            .with_context(|| format!("define interface '{}'", spec.name))?;
    }

    let mut report = CheckReport::default();
    for spec in &manifest.implementations {
        let interfaces = resolve_interfaces(registry, &spec.name, &spec.implements)?;
        let mut builder = spec.builder();
        let result = registry
            .declare_implements(&mut builder, &interfaces)
            .and_then(|()| registry.build(builder));
        debug!(implementation = %spec.name, ok = result.is_ok(), "implementation declared");
        report.outcomes.push(ImplementationOutcome {
            name: spec.name.clone(),
            result,
        });
    }
    Ok(report)
}

fn resolve_interfaces(
    registry: &Registry,
    implementation: &str,
    names: &[String],
) -> Result<Vec<InterfaceId>> {
    names
        .iter()
        .map(|name| {
            registry.interface_named(name).ok_or_else(|| {
                anyhow!(
                    "implementation '{}' implements unknown interface '{}'",
                    implementation,
                    name
                )
            })
        })
        .collect()
}

/// One line per member visible on `interface`, in `members_of` order.
pub fn describe_members(registry: &Registry, interface: &str) -> Result<Vec<String>> {
    let id = registry
        .interface_named(interface)
        .ok_or_else(|| anyhow!("unknown interface '{}'", interface))?;
    let lines = registry
        .members_of(id)?
        .into_iter()
        .map(|member| describe_member(registry, id, member))
        .collect();
    Ok(lines)
}

fn describe_member(registry: &Registry, owner: InterfaceId, member: &Member) -> String {
    let mut line = format!("{} {}", member.kind().label(), member.bound_name());
    match member.kind() {
        MemberKind::Method(method) => match (&method.default, method.is_final) {
            (Some(_), true) => line.push_str(" (final)"),
            (Some(_), false) => line.push_str(" (default)"),
            (None, _) => {}
        },
        MemberKind::Attribute(attribute) => {
            if let Some(value_type) = &attribute.value_type {
                line.push_str(&format!(": {value_type}"));
            }
        }
        MemberKind::Property(property) => {
            line.push_str(&format!(
                " [getter={} setter={} deleter={}]",
                slot_label(&property.getter),
                slot_label(&property.setter),
                slot_label(&property.deleter)
            ));
        }
    }
    if let Some(origin) = member.interface().filter(|origin| *origin != owner) {
        if let Ok(origin) = registry.interface(origin) {
            line.push_str(&format!(" from {}", origin.name()));
        }
    }
    line
}

fn slot_label(slot: &Slot) -> &'static str {
    match slot {
        Slot::Absent => "absent",
        Slot::Required => "required",
        Slot::Default(_) => "default",
        Slot::Final(_) => "final",
    }
}

/// Instantiate `implementation` and invoke `method` with `args`.
pub fn call_method(
    registry: &Registry,
    implementation: &str,
    method: &str,
    args: &[Value],
) -> Result<Value> {
    let id = registry
        .implementation_named(implementation)
        .ok_or_else(|| anyhow!("unknown implementation '{}'", implementation))?;
    let mut instance = registry
        .instantiate(id.into())
        .with_context(|| format!("instantiate '{}'", implementation))?;
    instance
        .call(method, args)
        .with_context(|| format!("call {}.{}()", implementation, method))
}
