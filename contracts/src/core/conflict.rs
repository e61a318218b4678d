//! Joint-implementability checks and subsumption of implements-lists.

use std::collections::BTreeSet;

use crate::core::error::{ConflictingInterfacesError, ContractError};
use crate::core::implementation::ImplementationBuilder;
use crate::core::registry::{InterfaceId, Registry};

impl Registry {
    /// Names of members of `a` that clash with a non-identical member of `b`.
    ///
    /// Interfaces related by subtyping never conflict. Only `a`'s members are
    /// scanned; identity is symmetric, so callers may check either order.
    pub fn conflicting_members(
        &self,
        a: InterfaceId,
        b: InterfaceId,
    ) -> Result<BTreeSet<String>, ContractError> {
        let mut conflicts = BTreeSet::new();
        if self.is_subtype(a, b) || self.is_subtype(b, a) {
            return Ok(conflicts);
        }

        let theirs = self.members_of(b)?;
        for ours in self.members_of(a)? {
            let name = ours.bound_name();
            let clash = theirs
                .iter()
                .find(|member| member.bound_name() == name)
                .is_some_and(|member| !member.same_as(ours));
            if clash {
                conflicts.insert(name.to_string());
            }
        }
        Ok(conflicts)
    }

    /// Collapse `interfaces` so no kept pair is related by subtyping.
    ///
    /// Scanning left to right, a subtype takes the place of the first kept
    /// supertype and evicts any other kept supertypes; a supertype of a kept
    /// interface is dropped.
    pub fn reduce_interfaces(&self, interfaces: &[InterfaceId]) -> Vec<InterfaceId> {
        let mut reduced: Vec<InterfaceId> = Vec::with_capacity(interfaces.len());
        for &interface in interfaces {
            if reduced.iter().any(|kept| self.is_subtype(*kept, interface)) {
                continue;
            }
            match reduced.iter().position(|kept| self.is_subtype(interface, *kept)) {
                Some(slot) => {
                    reduced[slot] = interface;
                    reduced.retain(|kept| {
                        *kept == interface || !self.is_subtype(interface, *kept)
                    });
                }
                None => reduced.push(interface),
            }
        }
        reduced
    }

    /// Add `interfaces` to the implements-list of `builder`.
    ///
    /// Each new interface is checked against everything already on the list;
    /// the first conflict rejects the whole call and leaves `builder` as it was.
    pub fn declare_implements(
        &self,
        builder: &mut ImplementationBuilder,
        interfaces: &[InterfaceId],
    ) -> Result<(), ContractError> {
        let mut staged = builder.implements.clone();
        for interface in interfaces {
            let candidate = self.interface(*interface)?;
            for existing in &staged {
                let members = self.conflicting_members(*interface, *existing)?;
                if !members.is_empty() {
                    return Err(ConflictingInterfacesError {
                        first: candidate.name().to_string(),
                        second: self.interface(*existing)?.name().to_string(),
                        members: members.into_iter().collect(),
                    }
                    .into());
                }
            }
            if !staged.contains(interface) {
                staged.push(*interface);
            }
        }
        builder.implements = staged;
        Ok(())
    }
}
