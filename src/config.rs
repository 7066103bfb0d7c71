//! Configuration for the companies library.
//!
//! ```rust
//! use companies::config::{CompaniesConfig, Features};
//! use companies::companies::{Role, RoleRegistry};
//!
//! // defaults: admin and editor roles, invitations on
//! let config = CompaniesConfig::default();
//!
//! // or customize
//! let config = CompaniesConfig {
//!     roles: RoleRegistry::new().role(Role::new("viewer", "Viewer", ["read"])),
//!     features: Features {
//!         sends_invitations: false,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use crate::companies::{PermissionSet, Role, RoleRegistry};
use crate::crypto::DEFAULT_TOKEN_LENGTH;
use crate::validators::PasswordPolicy;

#[derive(Debug, Clone)]
pub struct CompaniesConfig {
    pub features: Features,

    /// Roles assignable to employees. Empty disables roles.
    pub roles: RoleRegistry,

    /// Abilities an API token may be granted. Anything else requested on
    /// token creation or update is dropped.
    pub api_permissions: PermissionSet,

    /// Abilities preselected for new API tokens.
    pub default_api_permissions: PermissionSet,

    /// Length of generated API and invitation tokens (in characters).
    pub token_length: usize,

    pub password_policy: PasswordPolicy,
}

impl Default for CompaniesConfig {
    fn default() -> Self {
        Self {
            features: Features::default(),
            roles: RoleRegistry::new()
                .role(
                    Role::new("admin", "Administrator", ["create", "read", "update", "delete"])
                        .description("Administrator users can perform any action."),
                )
                .role(
                    Role::new("editor", "Editor", ["read", "create", "update"])
                        .description("Editor users have the ability to read, create, and update."),
                ),
            api_permissions: PermissionSet::from_iter(["create", "read", "update", "delete"]),
            default_api_permissions: PermissionSet::from_iter(["read"]),
            token_length: DEFAULT_TOKEN_LENGTH,
            password_policy: PasswordPolicy::default(),
        }
    }
}

impl CompaniesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default roles with a short minimum password length.
    pub fn development() -> Self {
        Self {
            password_policy: PasswordPolicy::default().min(4),
            ..Self::default()
        }
    }

    /// No roles: memberships and invitations carry no role.
    pub fn without_roles() -> Self {
        Self {
            roles: RoleRegistry::new(),
            ..Self::default()
        }
    }

    /// Drops requested abilities that are not in `api_permissions`.
    pub fn filter_api_permissions<I, S>(&self, requested: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        requested
            .into_iter()
            .collect::<PermissionSet>()
            .intersect(&self.api_permissions)
            .to_vec()
    }
}

/// Optional parts of the library.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct Features {
    /// Creating companies beyond the personal one, and managing employees.
    pub company_features: bool,

    /// Personal API tokens.
    pub api_features: bool,

    /// Adding an employee sends an invitation instead of attaching an
    /// existing user directly.
    pub sends_invitations: bool,

    /// Users may delete their own account.
    pub account_deletion: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            company_features: true,
            api_features: true,
            sends_invitations: true,
            account_deletion: true,
        }
    }
}
