use async_trait::async_trait;

use super::types::{Company, CompanyEmployee, CompanyInvitation, CompanyMembership};
use crate::CompanyError;

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub user_id: i64,
    pub name: String,
    pub personal_company: bool,
}

#[derive(Debug, Clone)]
pub struct NewMembership {
    pub company_id: i64,
    pub user_id: i64,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub company_id: i64,
    pub email: String,
    pub role: Option<String>,
    pub token_hash: String,
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create_company(&self, data: NewCompany) -> Result<Company, CompanyError>;
    async fn find_company(&self, id: i64) -> Result<Option<Company>, CompanyError>;
    /// Ordered by name.
    async fn owned_companies(&self, user_id: i64) -> Result<Vec<Company>, CompanyError>;
    async fn personal_company(&self, user_id: i64) -> Result<Option<Company>, CompanyError>;
    async fn update_company_name(&self, id: i64, name: &str) -> Result<Company, CompanyError>;
    /// Deletes the company with its memberships and invitations, and clears
    /// it as the current company of every user, atomically.
    async fn purge_company(&self, id: i64) -> Result<(), CompanyError>;
}

#[async_trait]
pub trait CompanyMembershipRepository: Send + Sync {
    /// Fails with [`CompanyError::AlreadyMember`] on a duplicate pair.
    async fn add_member(&self, data: NewMembership) -> Result<CompanyMembership, CompanyError>;
    async fn find_membership(
        &self,
        company_id: i64,
        user_id: i64,
    ) -> Result<Option<CompanyMembership>, CompanyError>;
    /// Members joined with their users, ordered by name.
    async fn employees(&self, company_id: i64) -> Result<Vec<CompanyEmployee>, CompanyError>;
    /// Companies `user_id` has a membership row for, ordered by name.
    async fn member_companies(&self, user_id: i64) -> Result<Vec<Company>, CompanyError>;
    async fn update_role(
        &self,
        company_id: i64,
        user_id: i64,
        role: Option<&str>,
    ) -> Result<CompanyMembership, CompanyError>;
    /// Deletes the membership and clears the user's current company if it
    /// pointed at `company_id`.
    async fn remove_member(&self, company_id: i64, user_id: i64) -> Result<(), CompanyError>;
}

#[async_trait]
pub trait CompanyInvitationRepository: Send + Sync {
    /// Fails with [`CompanyError::AlreadyInvited`] on a duplicate
    /// company/e-mail pair.
    async fn create_invitation(
        &self,
        data: NewInvitation,
    ) -> Result<CompanyInvitation, CompanyError>;
    async fn find_invitation(&self, id: i64) -> Result<Option<CompanyInvitation>, CompanyError>;
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<CompanyInvitation>, CompanyError>;
    async fn find_by_company_and_email(
        &self,
        company_id: i64,
        email: &str,
    ) -> Result<Option<CompanyInvitation>, CompanyError>;
    async fn invitations_for_company(
        &self,
        company_id: i64,
    ) -> Result<Vec<CompanyInvitation>, CompanyError>;
    async fn delete_invitation(&self, id: i64) -> Result<(), CompanyError>;
    /// Deletes the invitation and inserts the membership for `user_id` with
    /// the invitation's role in one transaction. On failure the invitation
    /// is left in place.
    async fn accept_invitation(
        &self,
        invitation_id: i64,
        user_id: i64,
    ) -> Result<CompanyMembership, CompanyError>;
}

/// The `current_company_id` column of the users table.
#[async_trait]
pub trait CurrentCompanyRepository: Send + Sync {
    async fn set_current_company(
        &self,
        user_id: i64,
        company_id: Option<i64>,
    ) -> Result<(), CompanyError>;
}
