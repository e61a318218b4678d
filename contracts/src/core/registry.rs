//! Process-wide store of declared interfaces and implementations.
//!
//! Declarations take `&mut Registry`, so the borrow checker enforces a single
//! writer. Callers declaring from several threads share a [`SharedRegistry`].

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::core::error::ContractError;
use crate::core::implementation::Implementation;
use crate::core::interface::Interface;
use crate::core::policy::MemberPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterfaceId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImplId(usize);

impl InterfaceId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }
}

impl ImplId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ImplId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything a query may be asked about: an interface or an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Interface(InterfaceId),
    Implementation(ImplId),
}

impl From<InterfaceId> for TypeRef {
    fn from(id: InterfaceId) -> Self {
        TypeRef::Interface(id)
    }
}

impl From<ImplId> for TypeRef {
    fn from(id: ImplId) -> Self {
        TypeRef::Implementation(id)
    }
}

pub type SharedRegistry = Arc<Mutex<Registry>>;

#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) policy: MemberPolicy,
    pub(crate) interfaces: Vec<Interface>,
    pub(crate) implementations: Vec<Implementation>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MemberPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    pub fn policy(&self) -> &MemberPolicy {
        &self.policy
    }

    pub fn interface(&self, id: InterfaceId) -> Result<&Interface, ContractError> {
        self.interfaces
            .get(id.0)
            .ok_or(ContractError::UnknownInterface(id))
    }

    pub fn implementation(&self, id: ImplId) -> Result<&Implementation, ContractError> {
        self.implementations
            .get(id.0)
            .ok_or(ContractError::UnknownImplementation(id))
    }

    pub fn interface_named(&self, name: &str) -> Option<InterfaceId> {
        self.interfaces
            .iter()
            .find(|interface| interface.name() == name)
            .map(Interface::id)
    }

    pub fn implementation_named(&self, name: &str) -> Option<ImplId> {
        self.implementations
            .iter()
            .find(|implementation| implementation.name() == name)
            .map(Implementation::id)
    }

    pub fn is_interface(&self, candidate: TypeRef) -> bool {
        match candidate {
            TypeRef::Interface(id) => self.interfaces.get(id.0).is_some(),
            TypeRef::Implementation(_) => false,
        }
    }

    pub(crate) fn interface_mut(&mut self, id: InterfaceId) -> Option<&mut Interface> {
        self.interfaces.get_mut(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_are_reported() {
        let registry = Registry::new();
        let err = registry
            .interface(InterfaceId::new(3))
            .expect_err("unknown interface");
        assert_eq!(err.to_string(), "unknown interface #3");
        assert!(!registry.is_interface(TypeRef::Interface(InterfaceId::new(3))));
    }

    #[test]
    fn shared_registry_serializes_access() {
        let shared = Registry::new().into_shared();
        let handle = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                let mut registry = shared.lock().expect("lock");
                registry.define("Named", &[], Vec::new()).expect("define")
            })
        };
        let id = handle.join().expect("join");
        let registry = shared.lock().expect("lock");
        assert_eq!(registry.interface(id).expect("interface").name(), "Named");
    }
}
