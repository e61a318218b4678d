//! Errors raised while declaring interfaces and implementations.

use thiserror::Error;

use crate::core::member::SlotKind;
use crate::core::registry::{ImplId, InterfaceId};

/// A single property slot that could not be resolved.
///
/// Only ever surfaces folded into an [`ImplementationError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("property {property}: {slot} must not be implemented")]
    FinalSlotImplemented { property: String, slot: SlotKind },

    #[error("property {property}: missing {slot}")]
    MissingSlot { property: String, slot: SlotKind },
}

/// Every unmet obligation of one implementation declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "'{implementation}' does not meet requirements of interface '{interface}'{}",
    bullet_list(.errors)
)]
pub struct ImplementationError {
    pub implementation: String,
    /// First interface that reported an error.
    pub interface: String,
    pub errors: Vec<String>,
}

/// Two interfaces declared together share non-identical members.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{first}' conflicts with '{second}'{}", bullet_list(.members))]
pub struct ConflictingInterfacesError {
    pub first: String,
    pub second: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error(transparent)]
    Implementation(#[from] ImplementationError),

    #[error(transparent)]
    Conflict(#[from] ConflictingInterfacesError),

    #[error("interface '{0}' can not be instantiated")]
    InterfaceNotInstantiable(String),

    #[error(
        "'{member}' of '{implementation}' does not override a member of any of the implemented interfaces"
    )]
    NotAnOverride {
        implementation: String,
        member: String,
    },

    #[error("interface '{0}' is already defined")]
    DuplicateInterface(String),

    #[error("implementation '{0}' is already defined")]
    DuplicateImplementation(String),

    #[error("duplicate member '{member}' in interface '{interface}'")]
    DuplicateMember { interface: String, member: String },

    #[error("member '{member}' is already bound")]
    AlreadyBound { member: String },

    #[error("unknown interface {0}")]
    UnknownInterface(InterfaceId),

    #[error("unknown implementation {0}")]
    UnknownImplementation(ImplId),

    #[error("'{implementation}' has no {kind} '{member}'")]
    UnknownMember {
        implementation: String,
        kind: &'static str,
        member: String,
    },

    #[error("property '{property}' of '{implementation}' has no {slot}")]
    MissingSlot {
        implementation: String,
        property: String,
        slot: SlotKind,
    },
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|item| format!("\n  - {item}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implementation_error_lists_every_violation() {
        let err = ImplementationError {
            implementation: "EnglishGreeter".to_string(),
            interface: "Greeter".to_string(),
            errors: vec![
                "missing method: greet()".to_string(),
                "missing property: mood".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "'EnglishGreeter' does not meet requirements of interface 'Greeter'\n  - missing method: greet()\n  - missing property: mood"
        );
    }

    #[test]
    fn conflict_error_names_members() {
        let err = ConflictingInterfacesError {
            first: "Flyer".to_string(),
            second: "Swimmer".to_string(),
            members: vec!["move".to_string()],
        };
        assert_eq!(err.to_string(), "'Flyer' conflicts with 'Swimmer'\n  - move");
    }
}
