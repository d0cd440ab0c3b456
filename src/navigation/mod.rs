//! Static navigation and role-theme tables, fixed at startup.
//! Navigation entries are filtered per session by the permission set.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::authz::PermissionSet;

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    /// (module, resource, action) required to see this entry
    #[serde(skip)]
    pub required: (&'static str, &'static str, &'static str),
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleTheme {
    pub primary: &'static str,
    pub accent: &'static str,
    pub badge: &'static str,
}

static NAV_ITEMS: Lazy<Vec<NavItem>> = Lazy::new(|| {
    vec![
        NavItem {
            label: "Dashboard",
            path: "/dashboard",
            required: ("admin", "employee", "read"),
        },
        NavItem {
            label: "Employees",
            path: "/employees",
            required: ("admin", "employee", "read"),
        },
        NavItem {
            label: "Onboarding",
            path: "/onboarding",
            required: ("onboarding", "workflow", "read"),
        },
        NavItem {
            label: "Administrators",
            path: "/admins",
            required: ("admin", "admin", "read"),
        },
        NavItem {
            label: "Roles",
            path: "/roles",
            required: ("admin", "role", "read"),
        },
        NavItem {
            label: "Permissions",
            path: "/permissions",
            required: ("admin", "permission", "read"),
        },
    ]
});

static ROLE_THEMES: Lazy<HashMap<&'static str, RoleTheme>> = Lazy::new(|| {
    HashMap::from([
        (
            "super_admin",
            RoleTheme {
                primary: "#7c3aed",
                accent: "#a78bfa",
                badge: "violet",
            },
        ),
        (
            "hr_admin",
            RoleTheme {
                primary: "#2563eb",
                accent: "#60a5fa",
                badge: "blue",
            },
        ),
        (
            "employee",
            RoleTheme {
                primary: "#059669",
                accent: "#34d399",
                badge: "green",
            },
        ),
    ])
});

const DEFAULT_THEME: RoleTheme = RoleTheme {
    primary: "#475569",
    accent: "#94a3b8",
    badge: "slate",
};

/// Navigation entries the given permission set may see, in display order.
pub fn nav_for(permissions: &PermissionSet) -> Vec<&'static NavItem> {
    NAV_ITEMS
        .iter()
        .filter(|item| {
            let (module, resource, action) = item.required;
            permissions.allows(module, resource, action)
        })
        .collect()
}

/// Colour theme for a role, falling back to the neutral default.
pub fn theme_for(role: &str) -> &'static RoleTheme {
    ROLE_THEMES.get(role).unwrap_or(&DEFAULT_THEME)
}
