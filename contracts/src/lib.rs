//! Declarative interface contracts with declaration-time validation.
//!
//! Interfaces name method, attribute and property obligations. Concrete types
//! declare which interfaces they implement and are checked once, when they are
//! built, for completeness, finality and override correctness.
//!
//! - **[`core`]**: Pure, deterministic logic (members, registry, conflicts,
//!   validation, instances). No I/O, fully testable in isolation.
//! - **[`io`]**: Configuration and manifest loading.
//!
//! [`check`] coordinates both to implement the CLI commands.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::callable::Callable;
pub use crate::core::error::{
    ConflictingInterfacesError, ContractError, ContractViolation, ImplementationError,
};
pub use crate::core::implementation::{Implementation, ImplementationBuilder, Supplied};
pub use crate::core::instance::Instance;
pub use crate::core::interface::Interface;
pub use crate::core::member::{Member, MemberKind, PropertyImpl, Slot, SlotKind};
pub use crate::core::policy::MemberPolicy;
pub use crate::core::registry::{ImplId, InterfaceId, Registry, SharedRegistry, TypeRef};
