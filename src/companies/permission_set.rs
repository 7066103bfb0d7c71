//! Permission strings granted by a role or an API token.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Grants every permission.
pub const WILDCARD: &str = "*";
/// Grants every `<resource>:create` permission.
pub const CREATE_WILDCARD: &str = "*:create";
/// Grants every `<resource>:update` permission.
pub const UPDATE_WILDCARD: &str = "*:update";

/// An ordered set of permission strings with wildcard matching.
///
/// ```
/// use companies::companies::PermissionSet;
///
/// let perms = PermissionSet::from_iter(["read", "*:create"]);
///
/// assert!(perms.can("read"));
/// assert!(perms.can("post:create"));
/// assert!(!perms.can("post:delete"));
/// assert!(PermissionSet::all().can("anything"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The owner's permission set: `{"*"}`.
    pub fn all() -> Self {
        Self::from_iter([WILDCARD])
    }

    pub fn grant(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
    }

    pub fn revoke(&mut self, permission: &str) {
        self.permissions.remove(permission);
    }

    /// Exact membership, without wildcard expansion.
    pub fn contains(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Checks `permission` with wildcard rules applied.
    pub fn can(&self, permission: &str) -> bool {
        self.contains(permission)
            || self.contains(WILDCARD)
            || (permission.ends_with(":create") && self.contains(CREATE_WILDCARD))
            || (permission.ends_with(":update") && self.contains(UPDATE_WILDCARD))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.permissions.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Keeps only the permissions also present in `allowed`.
    #[must_use]
    pub fn intersect(&self, allowed: &PermissionSet) -> Self {
        Self {
            permissions: self
                .permissions
                .intersection(&allowed.permissions)
                .cloned()
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Fluent construction of a [`PermissionSet`].
#[must_use]
#[derive(Default)]
pub struct PermissionSetBuilder {
    set: PermissionSet,
}

impl PermissionSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.set.grant(permission);
        self
    }

    pub fn build(self) -> PermissionSet {
        self.set
    }
}
