use chrono::Utc;

use super::find_owned_company;
use crate::companies::{
    CompanyMembership, CompanyMembershipRepository, CompanyRepository, RoleRegistry,
};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::CompanyError;

/// Changes an employee's role. Owner only.
pub struct UpdateCompanyEmployeeRoleAction<C, M>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
{
    companies: C,
    memberships: M,
    roles: RoleRegistry,
}

impl<C, M> UpdateCompanyEmployeeRoleAction<C, M>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
{
    pub fn new(companies: C, memberships: M, roles: RoleRegistry) -> Self {
        Self {
            companies,
            memberships,
            roles,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_company_employee_role", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        company_id: i64,
        employee_id: i64,
        role: &str,
    ) -> Result<CompanyMembership, CompanyError> {
        let company = find_owned_company(&self.companies, user, company_id).await?;
        let role = self.roles.validate(Some(role))?;

        let membership = self
            .memberships
            .update_role(company.id, employee_id, role.as_deref())
            .await?;

        dispatch(CompanyEvent::CompanyEmployeeRoleUpdated {
            company_id: company.id,
            user_id: employee_id,
            role: membership.role.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(membership)
    }
}
