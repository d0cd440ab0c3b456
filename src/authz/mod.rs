//! Permission model: (module, resource, action) triples with O(1) membership
//! checks, built once per session from the JWT permissions snapshot.

use std::collections::HashSet;

/// A single (module, resource, action) permission key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionKey {
    pub module: String,
    pub resource: String,
    pub action: String,
}

impl PermissionKey {
    pub fn new(
        module: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Parse a flattened "module:resource:action" string.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, ':');
        let module = parts.next()?.trim();
        let resource = parts.next()?.trim();
        let action = parts.next()?.trim();
        if module.is_empty() || resource.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self::new(module, resource, action))
    }

    /// Render as the flattened "module:resource:action" form used in claims.
    pub fn flatten(&self) -> String {
        format!("{}:{}:{}", self.module, self.resource, self.action)
    }
}

/// Precomputed permission set for a session.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    keys: HashSet<PermissionKey>,
}

impl PermissionSet {
    /// Build from the flattened strings embedded in JWT claims.
    /// Malformed entries are dropped rather than failing the session.
    pub fn from_flattened(entries: &[String]) -> Self {
        let keys = entries
            .iter()
            .filter_map(|s| PermissionKey::parse(s))
            .collect();
        Self { keys }
    }

    pub fn from_keys(keys: impl IntoIterator<Item = PermissionKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn allows(&self, module: &str, resource: &str, action: &str) -> bool {
        self.keys.contains(&PermissionKey {
            module: module.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Static permission catalog seeded into the database and used to build
/// system roles. Immutable reference data.
pub const PERMISSION_CATALOG: &[(&str, &str, &str)] = &[
    ("admin", "admin", "create"),
    ("admin", "admin", "read"),
    ("admin", "employee", "create"),
    ("admin", "employee", "read"),
    ("admin", "employee", "update"),
    ("admin", "employee", "delete"),
    ("admin", "role", "create"),
    ("admin", "role", "read"),
    ("admin", "permission", "read"),
    ("onboarding", "workflow", "read"),
    ("onboarding", "workflow", "update"),
];
