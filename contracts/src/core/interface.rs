//! Interface definition and membership queries.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::core::callable::Callable;
use crate::core::error::ContractError;
use crate::core::member::{Member, MemberKind};
use crate::core::policy::{CONSTRUCTED_HOOK, INIT_HOOK};
use crate::core::registry::{ImplId, InterfaceId, Registry, TypeRef};

/// Post-construction hooks declared on an interface.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    pub init: Option<Callable>,
    pub constructed: Option<Callable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Init,
    Constructed,
}

/// A named, non-instantiable set of member contracts.
#[derive(Debug)]
pub struct Interface {
    id: InterfaceId,
    name: String,
    parents: Vec<InterfaceId>,
    members: Vec<Member>,
    hooks: Hooks,
    pub(crate) implementations: BTreeSet<ImplId>,
}

impl Interface {
    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parents(&self) -> &[InterfaceId] {
        &self.parents
    }

    /// Members declared directly on this interface, in declaration order.
    pub fn own_members(&self) -> &[Member] {
        &self.members
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn implementations(&self) -> &BTreeSet<ImplId> {
        &self.implementations
    }
}

impl Registry {
    /// Normalize `declarations` into a new interface extending `parents`.
    ///
    /// Private names are dropped. Reserved method names never become members;
    /// `init` and `constructed` bodies are kept as hooks. Unbound members are
    /// bound to the new interface; bound members keep their provenance.
    pub fn define(
        &mut self,
        name: &str,
        parents: &[InterfaceId],
        declarations: Vec<(&str, Member)>,
    ) -> Result<InterfaceId, ContractError> {
        if self.interface_named(name).is_some() {
            return Err(ContractError::DuplicateInterface(name.to_string()));
        }
        for parent in parents {
            self.interface(*parent)?;
        }

        let id = InterfaceId::new(self.interfaces.len());
        let mut members: Vec<Member> = Vec::new();
        let mut hooks = Hooks::default();

        for (key, mut member) in declarations {
            if self.policy.is_private(key) {
                debug!(interface = name, member = key, "skipping private declaration");
                continue;
            }
            if self.policy.is_reserved(key) {
                if let MemberKind::Method(method) = member.kind() {
                    match (key, &method.default) {
                        (INIT_HOOK, Some(body)) => hooks.init = Some(body.clone()),
                        (CONSTRUCTED_HOOK, Some(body)) => hooks.constructed = Some(body.clone()),
                        _ => debug!(interface = name, member = key, "skipping reserved method"),
                    }
                    continue;
                }
            }

            if member.is_bound() {
                if member.bound_name() != key {
                    return Err(ContractError::AlreadyBound {
                        member: member.bound_name().to_string(),
                    });
                }
            } else {
                member.bind(id, key)?;
            }

            if members.iter().any(|existing| existing.bound_name() == key) {
                return Err(ContractError::DuplicateMember {
                    interface: name.to_string(),
                    member: key.to_string(),
                });
            }
            members.push(member);
        }

        debug!(interface = name, members = members.len(), "interface defined");
        self.interfaces.push(Interface {
            id,
            name: name.to_string(),
            parents: parents.to_vec(),
            members,
            hooks,
            implementations: BTreeSet::new(),
        });
        Ok(id)
    }

    /// Every member visible on `id`: own members in declaration order, then
    /// inherited ones not shadowed by a nearer declaration.
    pub fn members_of(&self, id: InterfaceId) -> Result<Vec<&Member>, ContractError> {
        let mut seen = HashSet::new();
        let mut members = Vec::new();
        self.collect_members(id, &mut seen, &mut members)?;
        Ok(members)
    }

    fn collect_members<'a>(
        &'a self,
        id: InterfaceId,
        seen: &mut HashSet<&'a str>,
        members: &mut Vec<&'a Member>,
    ) -> Result<(), ContractError> {
        let interface = self.interface(id)?;
        for member in &interface.members {
            if seen.insert(member.bound_name()) {
                members.push(member);
            }
        }
        for parent in &interface.parents {
            self.collect_members(*parent, seen, members)?;
        }
        Ok(())
    }

    pub fn lookup(&self, id: InterfaceId, name: &str) -> Option<&Member> {
        self.members_of(id)
            .ok()?
            .into_iter()
            .find(|member| member.bound_name() == name)
    }

    /// True if `name` is a visible member that override markers may target.
    pub fn has_member(&self, id: InterfaceId, name: &str) -> bool {
        if !self.policy.is_visible(name) {
            return false;
        }
        match self.lookup(id, name).map(Member::kind) {
            Some(MemberKind::Method(_)) | Some(MemberKind::Attribute(_)) => true,
            Some(MemberKind::Property(_)) => self.policy.properties_count_as_members,
            None => false,
        }
    }

    /// True if `sub` is `sup` or extends it, directly or transitively.
    pub fn is_subtype(&self, sub: InterfaceId, sup: InterfaceId) -> bool {
        if sub == sup {
            return true;
        }
        match self.interface(sub) {
            Ok(interface) => interface
                .parents
                .iter()
                .any(|parent| self.is_subtype(*parent, sup)),
            Err(_) => false,
        }
    }

    /// Every interface `id` extends, nearest first, without duplicates.
    pub fn ancestors(&self, id: InterfaceId) -> Vec<InterfaceId> {
        let mut seen = HashSet::from([id]);
        let mut ancestors = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Ok(interface) = self.interface(current) else {
                continue;
            };
            for parent in &interface.parents {
                if seen.insert(*parent) {
                    ancestors.push(*parent);
                    queue.push_back(*parent);
                }
            }
        }
        ancestors
    }

    /// True if `candidate` is a registered implementation of `id` or of one
    /// of its subtypes.
    pub fn implemented_by(&self, id: InterfaceId, candidate: TypeRef) -> bool {
        let TypeRef::Implementation(impl_id) = candidate else {
            return false;
        };
        match self.implementation(impl_id) {
            Ok(implementation) => implementation
                .interfaces()
                .iter()
                .any(|implemented| self.is_subtype(*implemented, id)),
            Err(_) => false,
        }
    }

    pub fn implementations(&self, id: InterfaceId) -> Result<&BTreeSet<ImplId>, ContractError> {
        Ok(self.interface(id)?.implementations())
    }

    /// Nearest hook of `kind` declared on `id` or inherited from a parent.
    pub fn hook(&self, id: InterfaceId, kind: HookKind) -> Option<&Callable> {
        let interface = self.interface(id).ok()?;
        let own = match kind {
            HookKind::Init => interface.hooks.init.as_ref(),
            HookKind::Constructed => interface.hooks.constructed.as_ref(),
        };
        own.or_else(|| {
            interface
                .parents
                .iter()
                .find_map(|parent| self.hook(*parent, kind))
        })
    }
}
