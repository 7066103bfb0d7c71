use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CompanyError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub current_company_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// First whitespace-separated word of the name, used to title the
    /// personal company.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    pub fn is_current_company(&self, company_id: i64) -> bool {
        self.current_company_id == Some(company_id)
    }
}

#[cfg(any(test, feature = "mocks"))]
impl User {
    pub fn mock(id: i64, name: &str, email: &str) -> Self {
        let now = Utc::now();
        User {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            hashed_password: "fakehashedpassword".to_owned(),
            current_company_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CompanyError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CompanyError>;
    async fn create_user(&self, data: NewUser) -> Result<User, CompanyError>;
    async fn update_profile(
        &self,
        user_id: i64,
        name: &str,
        email: &str,
    ) -> Result<User, CompanyError>;
    async fn update_password(&self, user_id: i64, hashed_password: &str)
    -> Result<(), CompanyError>;
    /// Deletes the account in one unit: every company the user owns (with
    /// its invitations, memberships and current-company pointers), the
    /// user's memberships elsewhere, their API tokens and the user row.
    /// Nothing is removed when the user does not exist.
    async fn delete_user(&self, user_id: i64) -> Result<(), CompanyError>;
}
