use chrono::Utc;

use crate::companies::{CompanyMembershipRepository, CompanyRepository};
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::CompanyError;

/// Removes an employee from a company.
///
/// The owner may remove anyone but themself; an employee may remove
/// themself (leave). The removed user's current company is cleared if it
/// pointed at this company.
pub struct RemoveCompanyEmployeeAction<C, M>
where
    C: CompanyRepository,
    M: CompanyMembershipRepository,
{
    companies: C,
    memberships: M,
}

impl<C: CompanyRepository, M: CompanyMembershipRepository> RemoveCompanyEmployeeAction<C, M> {
    pub fn new(companies: C, memberships: M) -> Self {
        Self {
            companies,
            memberships,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "remove_company_employee", skip_all, err)
    )]
    pub async fn execute(
        &self,
        user: &User,
        company_id: i64,
        employee_id: i64,
    ) -> Result<(), CompanyError> {
        let company = self
            .companies
            .find_company(company_id)
            .await?
            .ok_or(CompanyError::CompanyNotFound)?;

        if user.id != employee_id && !company.is_owned_by(user.id) {
            return Err(CompanyError::Forbidden);
        }

        if company.is_owned_by(employee_id) {
            return Err(CompanyError::CannotRemoveOwner);
        }

        self.memberships
            .remove_member(company.id, employee_id)
            .await?;

        dispatch(CompanyEvent::CompanyEmployeeRemoved {
            company_id: company.id,
            user_id: employee_id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"employee removed\", company_id={}, user_id={employee_id}, by={}",
            company.id,
            user.id
        );

        Ok(())
    }
}
