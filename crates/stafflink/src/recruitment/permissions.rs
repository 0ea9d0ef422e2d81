//! Role-based authorization driven by IAM permission names.

use std::collections::BTreeSet;

/// Lowercased permission names attached to an authenticated request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    names: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.names.contains(&permission.trim().to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// How a multi-valued requirement combines its permission names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    All,
    Any,
}

/// Declarative permission requirement attached to a route action.
#[derive(Debug, Clone, Copy)]
pub struct RequiredPermissions {
    pub names: &'static [&'static str],
    pub mode: PermissionMode,
}

impl RequiredPermissions {
    pub const fn all(names: &'static [&'static str]) -> Self {
        Self {
            names,
            mode: PermissionMode::All,
        }
    }

    pub const fn any(names: &'static [&'static str]) -> Self {
        Self {
            names,
            mode: PermissionMode::Any,
        }
    }

    /// An empty requirement allows everyone, mirroring unset action maps.
    pub fn allows(&self, granted: &PermissionSet) -> bool {
        if self.names.is_empty() {
            return true;
        }
        match self.mode {
            PermissionMode::All => self.names.iter().all(|name| granted.contains(name)),
            PermissionMode::Any => self.names.iter().any(|name| granted.contains(name)),
        }
    }
}
