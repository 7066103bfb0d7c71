use chrono::Utc;

use super::find_owned_company;
use crate::companies::CompanyRepository;
use crate::events::{CompanyEvent, dispatch};
use crate::repository::User;
use crate::CompanyError;

/// Deletes a company together with its memberships and invitations.
///
/// Owner only. Personal companies are refused with
/// [`CompanyError::CannotDeletePersonalCompany`].
pub struct DeleteCompanyAction<C: CompanyRepository> {
    companies: C,
}

impl<C: CompanyRepository> DeleteCompanyAction<C> {
    pub fn new(companies: C) -> Self {
        Self { companies }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_company", skip_all, err)
    )]
    pub async fn execute(&self, user: &User, company_id: i64) -> Result<(), CompanyError> {
        let company = find_owned_company(&self.companies, user, company_id).await?;

        if company.personal_company {
            return Err(CompanyError::CannotDeletePersonalCompany);
        }

        self.companies.purge_company(company.id).await?;

        dispatch(CompanyEvent::CompanyDeleted {
            company_id: company.id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "companies",
            "msg=\"company deleted\", company_id={}, user_id={}",
            company.id,
            user.id
        );

        Ok(())
    }
}
