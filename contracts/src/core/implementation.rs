//! Building concrete types against their implemented interfaces.
//!
//! [`Registry::build`] runs the whole declaration in one pass: reduce the
//! implements-list, merge method defaults, validate every member, check
//! override markers, then register. Nothing is registered unless every step
//! succeeds.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::callable::Callable;
use crate::core::error::{ContractError, ImplementationError};
use crate::core::member::{MemberKind, PropertyImpl};
use crate::core::registry::{ImplId, InterfaceId, Registry};

/// A member supplied by the concrete type.
#[derive(Debug, Clone)]
pub enum Supplied {
    Method { body: Callable, is_override: bool },
    Property(PropertyImpl),
    Attribute(Value),
}

impl Supplied {
    pub fn label(&self) -> &'static str {
        match self {
            Supplied::Method { .. } => "method",
            Supplied::Property(_) => "property",
            Supplied::Attribute(_) => "attribute",
        }
    }
}

/// A concrete type under construction.
#[derive(Debug, Clone)]
pub struct ImplementationBuilder {
    name: String,
    pub(crate) implements: Vec<InterfaceId>,
    members: Vec<(String, Supplied)>,
}

impl ImplementationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interfaces accumulated by [`Registry::declare_implements`].
    pub fn implements(&self) -> &[InterfaceId] {
        &self.implements
    }

    pub fn method(self, name: &str, body: Callable) -> Self {
        self.supply(
            name,
            Supplied::Method {
                body,
                is_override: false,
            },
        )
    }

    /// Method asserted to override a member of an implemented interface.
    pub fn override_method(self, name: &str, body: Callable) -> Self {
        self.supply(
            name,
            Supplied::Method {
                body,
                is_override: true,
            },
        )
    }

    pub fn property(self, name: &str, property: PropertyImpl) -> Self {
        self.supply(name, Supplied::Property(property))
    }

    pub fn attribute(self, name: &str, value: Value) -> Self {
        self.supply(name, Supplied::Attribute(value))
    }

    /// Supply `name`, replacing an earlier member of the same name.
    pub fn supply(mut self, name: &str, member: Supplied) -> Self {
        match self.members.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = member,
            None => self.members.push((name.to_string(), member)),
        }
        self
    }
}

/// Resolved members shared by every instance of an implementation.
#[derive(Debug, Default)]
pub(crate) struct MemberTable {
    pub(crate) methods: BTreeMap<String, Callable>,
    pub(crate) properties: BTreeMap<String, PropertyImpl>,
}

/// A concrete type registered as satisfying its interfaces.
#[derive(Debug)]
pub struct Implementation {
    id: ImplId,
    name: String,
    interfaces: Vec<InterfaceId>,
    attributes: BTreeMap<String, Value>,
    pub(crate) table: Arc<MemberTable>,
}

impl Implementation {
    pub fn id(&self) -> ImplId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Implemented interfaces after subsumption, in declaration order.
    pub fn interfaces(&self) -> &[InterfaceId] {
        &self.interfaces
    }

    /// Attribute values every new instance starts with.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn method(&self, name: &str) -> Option<&Callable> {
        self.table.methods.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyImpl> {
        self.table.properties.get(name)
    }
}

impl Registry {
    /// Validate `builder` against its interfaces and register it.
    pub fn build(&mut self, builder: ImplementationBuilder) -> Result<ImplId, ContractError> {
        let ImplementationBuilder {
            name,
            implements,
            members: declared,
        } = builder;
        if self.implementation_named(&name).is_some() {
            return Err(ContractError::DuplicateImplementation(name));
        }

        let interfaces = self.reduce_interfaces(&implements);
        let mut members: BTreeMap<String, Supplied> = declared.iter().cloned().collect();
        self.merge_defaults(&name, &interfaces, &mut members)?;
        let resolved = self.validate_members(&name, &interfaces, &members)?;
        self.check_overrides(&name, &interfaces, &declared)?;

        let id = ImplId::new(self.implementations.len());
        self.register(id, &interfaces);

        let mut table = MemberTable::default();
        let mut attributes = BTreeMap::new();
        for (member_name, supplied) in members {
            match supplied {
                Supplied::Method { body, .. } => {
                    table.methods.insert(member_name, body);
                }
                Supplied::Property(property) => {
                    table.properties.insert(member_name, property);
                }
                Supplied::Attribute(value) => {
                    attributes.insert(member_name, value);
                }
            }
        }
        table.properties.extend(resolved);

        info!(
            implementation = %name,
            interfaces = interfaces.len(),
            "implementation registered"
        );
        self.implementations.push(Implementation {
            id,
            name,
            interfaces,
            attributes,
            table: Arc::new(table),
        });
        Ok(id)
    }

    /// Install default method bodies the concrete type did not supply.
    fn merge_defaults(
        &self,
        name: &str,
        interfaces: &[InterfaceId],
        members: &mut BTreeMap<String, Supplied>,
    ) -> Result<(), ContractError> {
        for interface in interfaces {
            for member in self.members_of(*interface)? {
                let MemberKind::Method(method) = member.kind() else {
                    continue;
                };
                let Some(default) = &method.default else {
                    continue;
                };
                if members.contains_key(member.bound_name()) {
                    continue;
                }
                debug!(
                    implementation = name,
                    member = member.bound_name(),
                    "using default method"
                );
                members.insert(
                    member.bound_name().to_string(),
                    Supplied::Method {
                        body: default.clone(),
                        is_override: false,
                    },
                );
            }
        }
        Ok(())
    }

    /// Check every member of every interface, collecting all errors.
    ///
    /// Returns the resolved property triples to install.
    fn validate_members(
        &self,
        name: &str,
        interfaces: &[InterfaceId],
        members: &BTreeMap<String, Supplied>,
    ) -> Result<BTreeMap<String, PropertyImpl>, ContractError> {
        let mut errors = Vec::new();
        let mut first_offender = None;
        let mut resolved = BTreeMap::new();
        let mut checked = HashSet::new();

        for interface in interfaces {
            let before = errors.len();
            for member in self.members_of(*interface)? {
                let member_name = member.bound_name();
                if !checked.insert((member.interface(), member_name)) {
                    continue;
                }
                let supplied = members.get(member_name);
                match member.kind() {
                    MemberKind::Method(method) => {
                        if method.is_final {
                            let same_body = match (supplied, &method.default) {
                                (Some(Supplied::Method { body, .. }), Some(default)) => {
                                    body.same_as(default)
                                }
                                (None, _) => true,
                                _ => false,
                            };
                            if !same_body {
                                errors.push(format!("implemented final method: {member_name}()"));
                                continue;
                            }
                        }
                        match supplied {
                            None => errors.push(format!("missing method: {member_name}()")),
                            Some(Supplied::Method { .. }) => {}
                            Some(other) => errors.push(format!(
                                "expected method, got {}: {member_name}()",
                                other.label()
                            )),
                        }
                    }
                    MemberKind::Property(property) => match supplied {
                        None if property.is_pure_default() => {
                            match property.satisfy(member_name, &PropertyImpl::default()) {
                                Ok(triple) => {
                                    resolved.insert(member_name.to_string(), triple);
                                }
                                Err(violation) => errors.push(violation.to_string()),
                            }
                        }
                        None => errors.push(format!("missing property: {member_name}")),
                        Some(Supplied::Property(candidate)) => {
                            match property.satisfy(member_name, candidate) {
                                Ok(triple) => {
                                    resolved.insert(member_name.to_string(), triple);
                                }
                                Err(violation) => errors.push(violation.to_string()),
                            }
                        }
                        Some(other) => errors.push(format!(
                            "expected property, got {}: {member_name}",
                            other.label()
                        )),
                    },
                    MemberKind::Attribute(_) => {}
                }
            }
            if errors.len() > before && first_offender.is_none() {
                first_offender = Some(*interface);
            }
        }

        let Some(offender) = first_offender else {
            return Ok(resolved);
        };
        let err = ImplementationError {
            implementation: name.to_string(),
            interface: self.interface(offender)?.name().to_string(),
            errors,
        };
        warn!(implementation = name, errors = err.errors.len(), "implementation rejected");
        Err(err.into())
    }

    /// Every override-marked method must match a member of some interface.
    fn check_overrides(
        &self,
        name: &str,
        interfaces: &[InterfaceId],
        declared: &[(String, Supplied)],
    ) -> Result<(), ContractError> {
        for (member_name, supplied) in declared {
            let Supplied::Method {
                is_override: true, ..
            } = supplied
            else {
                continue;
            };
            if !interfaces
                .iter()
                .any(|interface| self.has_member(*interface, member_name))
            {
                warn!(implementation = name, member = %member_name, "override matches nothing");
                return Err(ContractError::NotAnOverride {
                    implementation: name.to_string(),
                    member: member_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Record `id` on every implemented interface and all of its ancestors.
    fn register(&mut self, id: ImplId, interfaces: &[InterfaceId]) {
        for interface in interfaces {
            let mut targets = vec![*interface];
            targets.extend(self.ancestors(*interface));
            for target in targets {
                if let Some(entry) = self.interface_mut(target) {
                    entry.implementations.insert(id);
                }
            }
        }
    }
}
