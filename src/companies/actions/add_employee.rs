use chrono::Utc;

use super::find_owned_company;
use crate::companies::{
    CompanyMembership, CompanyMembershipRepository, CompanyRepository, NewMembership,
    RoleRegistry,
};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::{User, UserRepository};
use crate::validators::{normalize_email, validate_email};
use crate::CompanyError;

/// Attaches an existing user, found by e-mail, to a company. Used when
/// invitations are disabled. Owner only.
pub struct AddCompanyEmployeeAction<C, U, M>
where
    C: CompanyRepository,
    U: UserRepository,
    M: CompanyMembershipRepository,
{
    companies: C,
    users: U,
    memberships: M,
    roles: RoleRegistry,
}

impl<C, U, M> AddCompanyEmployeeAction<C, U, M>
where
    C: CompanyRepository,
    U: UserRepository,
    M: CompanyMembershipRepository,
{
    pub fn new(companies: C, users: U, memberships: M, roles: RoleRegistry) -> Self {
        Self {
            companies,
            users,
            memberships,
            roles,
        }
    }

    /// # Errors
    ///
    /// - `CompanyNotFound` / `Forbidden` for a missing or foreign company
    /// - `Validation` / `InvalidRole` for bad input
    /// - `UserNotFound` when no user has the e-mail
    /// - `AlreadyMember` when the user is the owner or already employed
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "add_company_employee", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        company_id: i64,
        email: &str,
        role: Option<&str>,
    ) -> Result<CompanyMembership, CompanyError> {
        let company = find_owned_company(&self.companies, user, company_id).await?;

        let email = normalize_email(email);
        validate_email(&email)?;
        let role = self.roles.validate(role)?;

        let employee = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(CompanyError::UserNotFound)?;

        if company.is_owned_by(employee.id)
            || self
                .memberships
                .find_membership(company.id, employee.id)
                .await?
                .is_some()
        {
            return Err(CompanyError::AlreadyMember);
        }

        let membership = self
            .memberships
            .add_member(NewMembership {
                company_id: company.id,
                user_id: employee.id,
                role,
            })
            .await?;

        dispatch(CompanyEvent::CompanyEmployeeAdded {
            company_id: company.id,
            user_id: employee.id,
            role: membership.role.clone(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"employee added\", company_id={}, user_id={}",
            company.id,
            employee.id
        );

        Ok(membership)
    }
}
