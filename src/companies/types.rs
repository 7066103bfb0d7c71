//! Rows of the company tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant grouping of users. Ownership is `user_id`; the owner never has a
/// membership row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    /// The owner.
    pub user_id: i64,
    pub name: String,
    /// Created at registration. Cannot be deleted through
    /// [`DeleteCompanyAction`](super::DeleteCompanyAction).
    pub personal_company: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

/// A row of the `company_user` pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMembership {
    pub id: i64,
    pub company_id: i64,
    pub user_id: i64,
    /// Role key from the [`RoleRegistry`](super::RoleRegistry). `None` when
    /// roles are not configured.
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member joined with their user row, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEmployee {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// A pending invitation. Deleted once accepted or cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInvitation {
    pub id: i64,
    pub company_id: i64,
    pub email: String,
    pub role: Option<String>,
    /// SHA-256 hash of the invitation token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyInvitation {
    /// E-mail addresses are compared case-insensitively.
    pub fn is_for(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}
