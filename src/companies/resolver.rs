use chrono::Utc;

use super::{
    Company, CompanyMembershipRepository, CompanyRepository, CompanyRole, CurrentCompanyRepository,
    PermissionSet, RoleRegistry,
};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::{ApiToken, User};
use crate::CompanyError;

/// Resolves which companies a user belongs to, which one they are working
/// in, and what they may do there.
pub struct CompanyResolver<C, M, U>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
    U: CurrentCompanyRepository,
{
    companies: C,
    memberships: M,
    current: U,
    roles: RoleRegistry,
}

impl<C, M, U> CompanyResolver<C, M, U>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
    U: CurrentCompanyRepository,
{
    pub fn new(companies: C, memberships: M, current: U, roles: RoleRegistry) -> Self {
        Self {
            companies,
            memberships,
            current,
            roles,
        }
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn owns_company(&self, user: &User, company: &Company) -> bool {
        company.is_owned_by(user.id)
    }

    /// Owner or employee.
    pub async fn belongs_to_company(
        &self,
        user: &User,
        company: &Company,
    ) -> Result<bool, CompanyError> {
        if self.owns_company(user, company) {
            return Ok(true);
        }

        Ok(self
            .memberships
            .find_membership(company.id, user.id)
            .await?
            .is_some())
    }

    pub async fn owned_companies(&self, user: &User) -> Result<Vec<Company>, CompanyError> {
        self.companies.owned_companies(user.id).await
    }

    /// Owned and employee-of companies, ordered by name.
    pub async fn all_companies(&self, user: &User) -> Result<Vec<Company>, CompanyError> {
        let mut companies = self.companies.owned_companies(user.id).await?;
        for company in self.memberships.member_companies(user.id).await? {
            if !companies.iter().any(|c| c.id == company.id) {
                companies.push(company);
            }
        }
        companies.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(companies)
    }

    pub async fn personal_company(&self, user: &User) -> Result<Option<Company>, CompanyError> {
        self.companies.personal_company(user.id).await
    }

    /// The company the user is working in.
    ///
    /// When `current_company_id` is unset, or points at a company the user
    /// no longer belongs to, the personal company is selected and stored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "current_company", skip_all, err)
    )]
    pub async fn current_company(&self, user: &User) -> Result<Option<Company>, CompanyError> {
        if let Some(company_id) = user.current_company_id {
            if let Some(company) = self.companies.find_company(company_id).await? {
                if self.belongs_to_company(user, &company).await? {
                    return Ok(Some(company));
                }
            }
        }

        let personal = self.companies.personal_company(user.id).await?;
        let personal_id = personal.as_ref().map(|c| c.id);
        if personal_id != user.current_company_id {
            self.current
                .set_current_company(user.id, personal_id)
                .await?;

            log::debug!(
                target: "companies",
                "msg=\"current company reset\", user_id={}, company_id={personal_id:?}",
                user.id
            );
        }

        Ok(personal)
    }

    pub async fn is_current_company(
        &self,
        user: &User,
        company: &Company,
    ) -> Result<bool, CompanyError> {
        Ok(self
            .current_company(user)
            .await?
            .is_some_and(|c| c.id == company.id))
    }

    /// Makes `company_id` the user's current company. Fails with
    /// [`CompanyError::Forbidden`] unless the user belongs to it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "switch_company", skip_all, err)
    )]
    pub async fn switch_company(
        &self,
        user: &User,
        company_id: i64,
    ) -> Result<Company, CompanyError> {
        let company = self
            .companies
            .find_company(company_id)
            .await?
            .ok_or(CompanyError::CompanyNotFound)?;

        if !self.belongs_to_company(user, &company).await? {
            return Err(CompanyError::Forbidden);
        }

        self.current
            .set_current_company(user.id, Some(company.id))
            .await?;

        dispatch(CompanyEvent::CompanySwitched {
            user_id: user.id,
            company_id: company.id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"company switched\", user_id={}, company_id={}",
            user.id,
            company.id
        );

        Ok(company)
    }

    /// `Owner` for the owner, the configured role for an employee, `None`
    /// for strangers and for employees without a known role.
    pub async fn company_role(
        &self,
        user: &User,
        company: &Company,
    ) -> Result<Option<CompanyRole>, CompanyError> {
        if self.owns_company(user, company) {
            return Ok(Some(CompanyRole::Owner));
        }

        let Some(membership) = self
            .memberships
            .find_membership(company.id, user.id)
            .await?
        else {
            return Ok(None);
        };

        Ok(membership
            .role
            .as_deref()
            .and_then(|key| self.roles.find(key))
            .cloned()
            .map(CompanyRole::Employee))
    }

    pub async fn company_permissions(
        &self,
        user: &User,
        company: &Company,
    ) -> Result<PermissionSet, CompanyError> {
        Ok(self
            .company_role(user, company)
            .await?
            .map(|role| role.permissions())
            .unwrap_or_default())
    }

    /// Owners pass every check and strangers fail all of them. For an
    /// employee authenticated by `token`, the token must also allow
    /// `permission`.
    pub async fn has_company_permission(
        &self,
        user: &User,
        company: &Company,
        permission: &str,
        token: Option<&ApiToken>,
    ) -> Result<bool, CompanyError> {
        if self.owns_company(user, company) {
            return Ok(true);
        }

        if !self.belongs_to_company(user, company).await? {
            return Ok(false);
        }

        if token.is_some_and(|t| t.cant(permission)) {
            return Ok(false);
        }

        Ok(self
            .company_permissions(user, company)
            .await?
            .can(permission))
    }
}
