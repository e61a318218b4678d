//! Name rules applied when interface declarations are normalized.

use serde::{Deserialize, Serialize};

/// Hook invoked once per implemented interface before `constructed`.
pub const INIT_HOOK: &str = "init";
/// Hook invoked once per implemented interface after every `init` hook ran.
pub const CONSTRUCTED_HOOK: &str = "constructed";

/// Which declared names become members and which count for override checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberPolicy {
    /// Names starting (but not also ending) with this marker are private.
    pub private_prefix: String,

    /// Constructor-like names that never become methods.
    pub reserved_names: Vec<String>,

    /// Whether properties satisfy `has_member` (and thus override markers).
    pub properties_count_as_members: bool,
}

impl Default for MemberPolicy {
    fn default() -> Self {
        Self {
            private_prefix: "_".to_string(),
            reserved_names: vec![
                "new".to_string(),
                INIT_HOOK.to_string(),
                CONSTRUCTED_HOOK.to_string(),
            ],
            properties_count_as_members: true,
        }
    }
}

impl MemberPolicy {
    pub fn is_private(&self, name: &str) -> bool {
        !self.private_prefix.is_empty()
            && name.starts_with(&self.private_prefix)
            && !name.ends_with(&self.private_prefix)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|reserved| reserved == name)
    }

    /// Private and reserved names are never visible to lookups.
    pub fn is_visible(&self, name: &str) -> bool {
        !self.is_private(name) && !self.is_reserved(name)
    }
}
