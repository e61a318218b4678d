//! Contract obligations declared on interfaces.
//!
//! A [`Member`] starts unbound (a declaration) and is bound exactly once, when
//! the interface that declares it is defined. The binding records the member's
//! name and its origin interface; that pair is the member's identity.

use std::fmt;

use crate::core::callable::Callable;
use crate::core::error::{ContractError, ContractViolation};
use crate::core::registry::InterfaceId;

/// One of the three accessor slots of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Getter,
    Setter,
    Deleter,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotKind::Getter => "getter",
            SlotKind::Setter => "setter",
            SlotKind::Deleter => "deleter",
        };
        f.write_str(label)
    }
}

/// Interface-side declaration of a single property slot.
#[derive(Debug, Clone)]
pub enum Slot {
    /// Optional; the implementer may supply it or leave it out.
    Absent,
    /// The implementer must supply it.
    Required,
    /// Used unless the implementer supplies its own.
    Default(Callable),
    /// Default that the implementer may not replace.
    Final(Callable),
}

impl Slot {
    pub fn default_body(&self) -> Option<&Callable> {
        match self {
            Slot::Default(body) | Slot::Final(body) => Some(body),
            Slot::Absent | Slot::Required => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Slot::Final(_))
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub default: Option<Callable>,
    pub is_final: bool,
}

/// Attribute obligation. The type is informational only.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub value_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub getter: Slot,
    pub setter: Slot,
    pub deleter: Slot,
}

/// Concrete getter/setter/deleter triple supplied by an implementation.
#[derive(Debug, Clone, Default)]
pub struct PropertyImpl {
    pub getter: Option<Callable>,
    pub setter: Option<Callable>,
    pub deleter: Option<Callable>,
}

impl PropertyImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_getter(mut self, body: Callable) -> Self {
        self.getter = Some(body);
        self
    }

    pub fn with_setter(mut self, body: Callable) -> Self {
        self.setter = Some(body);
        self
    }

    pub fn with_deleter(mut self, body: Callable) -> Self {
        self.deleter = Some(body);
        self
    }

    pub fn slot(&self, kind: SlotKind) -> Option<&Callable> {
        match kind {
            SlotKind::Getter => self.getter.as_ref(),
            SlotKind::Setter => self.setter.as_ref(),
            SlotKind::Deleter => self.deleter.as_ref(),
        }
    }
}

impl Property {
    pub fn slot(&self, kind: SlotKind) -> &Slot {
        match kind {
            SlotKind::Getter => &self.getter,
            SlotKind::Setter => &self.setter,
            SlotKind::Deleter => &self.deleter,
        }
    }

    /// True if every slot carries a default, so implementers may omit the
    /// property entirely.
    pub fn is_pure_default(&self) -> bool {
        SLOTS
            .iter()
            .all(|kind| self.slot(*kind).default_body().is_some())
    }

    /// Resolve the triple to install for `candidate`.
    ///
    /// Concrete slots win over defaults. Final slots reject any concrete body
    /// other than the default itself; required slots reject a missing body.
    pub fn satisfy(
        &self,
        name: &str,
        candidate: &PropertyImpl,
    ) -> Result<PropertyImpl, ContractViolation> {
        for kind in SLOTS {
            if let (Slot::Final(default), Some(body)) = (self.slot(kind), candidate.slot(kind)) {
                if !default.same_as(body) {
                    return Err(ContractViolation::FinalSlotImplemented {
                        property: name.to_string(),
                        slot: kind,
                    });
                }
            }
        }
        for kind in SLOTS {
            if matches!(self.slot(kind), Slot::Required) && candidate.slot(kind).is_none() {
                return Err(ContractViolation::MissingSlot {
                    property: name.to_string(),
                    slot: kind,
                });
            }
        }

        let resolve = |kind: SlotKind| {
            candidate
                .slot(kind)
                .or_else(|| self.slot(kind).default_body())
                .cloned()
        };
        Ok(PropertyImpl {
            getter: resolve(SlotKind::Getter),
            setter: resolve(SlotKind::Setter),
            deleter: resolve(SlotKind::Deleter),
        })
    }
}

const SLOTS: [SlotKind; 3] = [SlotKind::Getter, SlotKind::Setter, SlotKind::Deleter];

#[derive(Debug, Clone)]
pub enum MemberKind {
    Method(Method),
    Attribute(Attribute),
    Property(Property),
}

impl MemberKind {
    pub fn label(&self) -> &'static str {
        match self {
            MemberKind::Method(_) => "method",
            MemberKind::Attribute(_) => "attribute",
            MemberKind::Property(_) => "property",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    name: Option<String>,
    interface: Option<InterfaceId>,
    kind: MemberKind,
}

impl Member {
    /// Required method with no default.
    pub fn method() -> Self {
        Self::unbound(MemberKind::Method(Method {
            default: None,
            is_final: false,
        }))
    }

    /// Method whose default body is used when an implementer omits it.
    pub fn default_method(body: Callable) -> Self {
        Self::unbound(MemberKind::Method(Method {
            default: Some(body),
            is_final: false,
        }))
    }

    /// Method with a default body that implementers may not replace.
    pub fn final_method(body: Callable) -> Self {
        Self::unbound(MemberKind::Method(Method {
            default: Some(body),
            is_final: true,
        }))
    }

    /// Attribute placeholder, bound when the declaring interface is defined.
    pub fn attribute(value_type: Option<&str>) -> Self {
        Self::unbound(MemberKind::Attribute(Attribute {
            value_type: value_type.map(str::to_string),
        }))
    }

    pub fn property(getter: Slot, setter: Slot, deleter: Slot) -> Self {
        Self::unbound(MemberKind::Property(Property {
            getter,
            setter,
            deleter,
        }))
    }

    fn unbound(kind: MemberKind) -> Self {
        Self {
            name: None,
            interface: None,
            kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Interface the member was originally declared on.
    pub fn interface(&self) -> Option<InterfaceId> {
        self.interface
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn is_bound(&self) -> bool {
        self.name.is_some() && self.interface.is_some()
    }

    /// True if both members stem from the same declaration.
    pub fn same_as(&self, other: &Member) -> bool {
        self.is_bound() && self.name == other.name && self.interface == other.interface
    }

    pub(crate) fn bind(&mut self, interface: InterfaceId, name: &str) -> Result<(), ContractError> {
        if let (Some(bound_name), Some(_)) = (&self.name, self.interface) {
            return Err(ContractError::AlreadyBound {
                member: bound_name.clone(),
            });
        }
        self.name = Some(name.to_string());
        self.interface = Some(interface);
        Ok(())
    }

    /// Name of a bound member; empty for declarations.
    pub(crate) fn bound_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}
