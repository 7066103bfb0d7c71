//! Roles that can be assigned to company employees.
//!
//! Roles are configured once at startup and are not persisted; membership
//! and invitation rows store only the role key.

use serde::Serialize;

use super::PermissionSet;
use crate::CompanyError;

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Role {
    pub key: String,
    pub name: String,
    pub permissions: PermissionSet,
    pub description: Option<String>,
}

impl Role {
    pub fn new<I, S>(key: impl Into<String>, name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            name: name.into(),
            permissions: permissions.into_iter().collect(),
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A user's role within a specific company.
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyRole {
    /// Implied by `companies.user_id`; holds every permission.
    Owner,
    Employee(Role),
}

impl CompanyRole {
    pub fn key(&self) -> &str {
        match self {
            Self::Owner => "owner",
            Self::Employee(role) => &role.key,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Owner => "Owner",
            Self::Employee(role) => &role.name,
        }
    }

    pub fn permissions(&self) -> PermissionSet {
        match self {
            Self::Owner => PermissionSet::all(),
            Self::Employee(role) => role.permissions.clone(),
        }
    }
}

/// The set of roles available to every company, in display order.
///
/// An empty registry means roles are not used: memberships and invitations
/// then carry no role.
///
/// ```
/// use companies::companies::{Role, RoleRegistry};
///
/// let roles = RoleRegistry::new()
///     .role(Role::new("admin", "Administrator", ["create", "read", "update", "delete"]))
///     .role(Role::new("viewer", "Viewer", ["read"]));
///
/// assert!(roles.find("viewer").is_some());
/// assert!(roles.validate(Some("owner")).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleRegistry {
    roles: Vec<Role>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role, replacing any earlier role with the same key.
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.add(role);
        self
    }

    pub fn add(&mut self, role: Role) {
        self.roles.retain(|r| r.key != role.key);
        self.roles.push(role);
    }

    pub fn find(&self, key: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.key == key)
    }

    pub fn has_roles(&self) -> bool {
        !self.roles.is_empty()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Union of every role's permissions.
    pub fn all_permissions(&self) -> PermissionSet {
        self.roles
            .iter()
            .flat_map(|r| r.permissions.iter().map(str::to_owned))
            .collect()
    }

    /// Checks a requested role key and returns what should be stored.
    ///
    /// With roles configured the key is required and must exist. Without
    /// roles any input is discarded.
    pub fn validate(&self, role: Option<&str>) -> Result<Option<String>, CompanyError> {
        if !self.has_roles() {
            return Ok(None);
        }

        let key = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| CompanyError::Validation("The role field is required".to_owned()))?;

        self.find(key)
            .map(|r| Some(r.key.clone()))
            .ok_or_else(|| CompanyError::InvalidRole(key.to_owned()))
    }
}
